use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency_whole, format_max};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct EventInput {
    pub guests: f64,
    pub hours: f64,
    pub venue: f64,
    pub decor: f64,
    pub entertainment: f64,
    pub staff: f64,
    pub food_per_guest: f64,
    pub drink_per_guest: f64,
    pub extras_per_guest: f64,
    pub service_percent: f64,
    pub contingency_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventBudget {
    pub guests: f64,
    pub fixed: f64,
    pub variable: f64,
    pub subtotal: f64,
    pub service: f64,
    pub contingency: f64,
    pub total: f64,
    pub per_guest: f64,
    pub per_hour: Option<f64>,
    pub items: Vec<LineItem>,
}

pub fn budget(input: &EventInput) -> Result<EventBudget> {
    if !input.guests.is_finite() || input.guests <= 0.0 {
        return Err(CalcError::invalid("Enter the guest count to build a budget."));
    }
    let guests = input.guests;
    let fixed = input.venue + input.decor + input.entertainment + input.staff;
    let variable = (input.food_per_guest + input.drink_per_guest + input.extras_per_guest) * guests;
    let subtotal = fixed + variable;
    let service = input.service_percent / 100.0 * subtotal;
    let contingency = input.contingency_percent / 100.0 * (subtotal + service);
    let total = subtotal + service + contingency;

    let items = [
        ("Venue & rentals".to_string(), input.venue),
        ("Decor & design".to_string(), input.decor),
        ("Entertainment".to_string(), input.entertainment),
        ("Staffing & labor".to_string(), input.staff),
        ("Food (variable)".to_string(), input.food_per_guest * guests),
        ("Beverage (variable)".to_string(), input.drink_per_guest * guests),
        ("Extras (variable)".to_string(), input.extras_per_guest * guests),
        (format!("Service charge ({:.1}%)", input.service_percent), service),
        (format!("Contingency ({:.1}%)", input.contingency_percent), contingency),
    ]
    .into_iter()
    .filter(|(_, amount)| *amount > 0.0)
    .map(|(label, amount)| LineItem { label, amount })
    .collect();

    Ok(EventBudget {
        guests,
        fixed,
        variable,
        subtotal,
        service,
        contingency,
        total,
        per_guest: total / guests,
        per_hour: (input.hours.is_finite() && input.hours > 0.0).then(|| total / input.hours),
        items,
    })
}

fn percent(form: &Form, field: &str) -> f64 {
    let v = form.value(field);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

pub struct EventBudgetCalculator;

#[async_trait]
impl Calculator for EventBudgetCalculator {
    fn key(&self) -> &'static str {
        "event-budget-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let input = EventInput {
            guests: form.value("guests"),
            hours: form.value("hours"),
            venue: form.money("venue"),
            decor: form.money("decor"),
            entertainment: form.money("entertainment"),
            staff: form.money("staff"),
            food_per_guest: form.money("food"),
            drink_per_guest: form.money("drink"),
            extras_per_guest: form.money("extras"),
            service_percent: percent(form, "service"),
            contingency_percent: percent(form, "contingency"),
        };
        let result = budget(&input)?;
        let name = form.text_or("name", "Your event");

        let mut table = Table::new(&["Line item", "Amount"]).captioned("Line-item breakdown");
        for item in &result.items {
            table.push(&[item.label.clone(), format_currency_whole(item.amount)]);
        }

        let mut card = Card::new(format!("{} budget summary", name))
            .headline(format!(
                "Estimated total budget: {} ({} per guest).",
                format_currency_whole(result.total),
                format_currency_whole(result.per_guest)
            ))
            .stat("Guests", format_max(result.guests, 0))
            .stat("Per-guest spend", format_currency_whole(result.per_guest))
            .stat("Subtotal before fees", format_currency_whole(result.subtotal))
            .stat("Service & contingency", format_currency_whole(result.service + result.contingency))
            .stat("Total event cost", format_currency_whole(result.total));
        if let Some(per_hour) = result.per_hour {
            card = card.stat("Cost per hour (approx.)", format_currency_whole(per_hour));
        }
        card.table(table)
            .note("Variable costs scale directly with guest count. Try adjusting service or contingency percentages to build in a safety buffer for tips, overtime, or last-minute add-ons.")
            .data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fees_compound_on_subtotal() {
        let input = EventInput {
            guests: 100.0,
            venue: 5_000.0,
            food_per_guest: 50.0,
            service_percent: 20.0,
            contingency_percent: 10.0,
            hours: 5.0,
            ..EventInput::default()
        };
        let result = budget(&input).unwrap();
        assert_eq!(result.subtotal, 10_000.0);
        assert_eq!(result.service, 2_000.0);
        assert!((result.contingency - 1_200.0).abs() < 1e-9);
        assert!((result.total - 13_200.0).abs() < 1e-9);
        assert!((result.per_hour.unwrap() - 2_640.0).abs() < 1e-9);
        // zero-amount lines dropped
        assert_eq!(result.items.len(), 4);
    }

    #[test]
    fn test_guest_count_required() {
        assert!(budget(&EventInput::default()).is_err());
    }
}
