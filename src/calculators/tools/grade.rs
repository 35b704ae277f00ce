use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::{Form, Tone};
use crate::utils::error::{CalcError, Result};
use crate::utils::format::format_max;
use async_trait::async_trait;
use serde::Serialize;

pub const LETTER_SCALE: [(f64, &str); 11] = [
    (3.85, "A"),
    (3.7, "A-"),
    (3.3, "B+"),
    (3.0, "B"),
    (2.7, "B-"),
    (2.3, "C+"),
    (2.0, "C"),
    (1.7, "C-"),
    (1.3, "D+"),
    (1.0, "D"),
    (0.0, "F"),
];

pub fn letter(gpa: f64) -> &'static str {
    let gpa = gpa.clamp(0.0, 4.0);
    LETTER_SCALE
        .iter()
        .find(|(min, _)| gpa >= *min)
        .map_or("F", |(_, l)| l)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GpaPlan {
    pub required: f64,
    pub quality_needed: f64,
    pub achievable: bool,
    pub already_there: bool,
}

pub fn gpa_needed(current: f64, completed: f64, target: f64, upcoming: f64) -> Result<GpaPlan> {
    if ![current, completed, target, upcoming].iter().all(|v| v.is_finite())
        || completed < 0.0
        || upcoming <= 0.0
    {
        return Err(CalcError::invalid("Enter valid GPA values and credit hours."));
    }
    let current = current.clamp(0.0, 4.0);
    let target = target.clamp(0.0, 4.0);
    let quality_needed = target * (completed + upcoming) - current * completed;
    let required = quality_needed / upcoming;
    Ok(GpaPlan {
        required,
        quality_needed,
        achievable: required <= 4.0,
        already_there: quality_needed <= 0.0,
    })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FinalPlan {
    pub required: f64,
    /// Course grade if the exam lands on the (0-100 clamped) required score.
    pub projected: f64,
    pub best_case: f64,
}

pub fn final_needed(current: f64, weight_percent: f64, target: f64) -> Result<FinalPlan> {
    if ![current, weight_percent, target].iter().all(|v| v.is_finite())
        || weight_percent <= 0.0
        || weight_percent > 100.0
    {
        return Err(CalcError::invalid("Enter valid grade percentages and exam weight."));
    }
    let weight = weight_percent / 100.0;
    let rest = current * (1.0 - weight);
    let required = (target - rest) / weight;
    Ok(FinalPlan {
        required,
        projected: rest + required.clamp(0.0, 100.0) * weight,
        best_case: rest + 100.0 * weight,
    })
}

fn scale_table() -> Table {
    let mut table = Table::new(&["Minimum GPA", "Letter"]).captioned("Letter scale");
    for (min, label) in LETTER_SCALE {
        table.push(&[format!("{:.2}", min), label.to_string()]);
    }
    table
}

fn gpa_card(form: &Form) -> Result<Card> {
    let completed = form.value("completed");
    let upcoming = form.value("upcoming");
    let target = form.value("target");
    let plan = gpa_needed(form.value("current"), completed, target, upcoming)?;

    if plan.already_there {
        return Card::new("Great news")
            .headline("You're already at or above the target GPA.")
            .note(format!(
                "Your existing GPA keeps you on track for a {:.2} goal.",
                target.clamp(0.0, 4.0)
            ))
            .table(scale_table())
            .data(&plan);
    }

    let mut card = Card::new("Required upcoming GPA")
        .headline(if plan.achievable {
            format!(
                "You need an average GPA of {:.2} across the remaining {} credits.",
                plan.required,
                format_max(upcoming, 2)
            )
        } else {
            "The target GPA is out of reach with the credits remaining.".to_string()
        })
        .stat(
            "Needed GPA in remaining credits",
            format!("{:.2} ({})", plan.required, letter(plan.required)),
        )
        .stat("Total quality points to earn", format!("{:.2}", plan.quality_needed))
        .stat("Credits remaining", format_max(upcoming, 2))
        .stat("Credits completed", format_max(completed, 2));
    if plan.achievable {
        let cushion = 4.0 - plan.required;
        card = card.note(format!(
            "You have a cushion of {:.2} GPA point{} before hitting a 4.0.",
            cushion,
            if cushion == 1.0 { "" } else { "s" }
        ));
    } else {
        card = card
            .tone(Tone::Warning)
            .note("Consider adding more credit hours or adjusting your target GPA.");
    }
    card.note(format!(
        "Aim for {:.2} or better each term to stay ahead of schedule.",
        (plan.required + 0.25).min(4.0)
    ))
    .table(scale_table())
    .data(&plan)
}

fn final_card(form: &Form) -> Result<Card> {
    let current = form.value("current");
    let weight = form.value("weight");
    let target = form.value("target");
    let plan = final_needed(current, weight, target)?;

    let outcome = if plan.required > 100.0 {
        format!(
            "Even a 100% on the final would finish at {:.1}%. Consider adjusting your target or grading weights.",
            plan.best_case
        )
    } else if plan.required < 0.0 {
        "You could skip the final and still meet your target, though we don't recommend it!".to_string()
    } else {
        format!(
            "You need about {:.1}% on the final exam to earn {:.1}%.",
            plan.required, target
        )
    };

    let mut card = Card::new("Final exam breakdown")
        .headline(outcome)
        .stat("Current average (weighted so far)", format!("{:.1}%", current))
        .stat("Final exam weight", format!("{:.1}%", weight))
        .stat("Required exam score", format!("{:.1}%", plan.required.max(0.0)))
        .stat(
            "Projected overall grade (if exam hits the target)",
            format!("{:.1}%", plan.projected),
        );
    if plan.required > 100.0 {
        card = card.tone(Tone::Warning);
    }
    if let Some(floor) = form.get("floor").and_then(|f| f.parse::<f64>().ok()) {
        card = card.note(if plan.required >= floor {
            format!("Aiming for {:.1}% keeps you above your personal minimum.", floor)
        } else {
            format!(
                "Your minimum of {:.1}% would land at {:.1}%.",
                floor,
                current * (1.0 - weight / 100.0) + floor * weight / 100.0
            )
        });
    }
    card.note("Double-check with your syllabus. Different schools round grades differently.")
        .data(&plan)
}

pub struct GradeCalculator;

#[async_trait]
impl Calculator for GradeCalculator {
    fn key(&self) -> &'static str {
        "grade-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        match form.text_or("mode", "gpa") {
            "final" | "exam" => final_card(form),
            _ => gpa_card(form),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters() {
        assert_eq!(letter(3.9), "A");
        assert_eq!(letter(3.3), "B+");
        assert_eq!(letter(0.5), "F");
        assert_eq!(letter(5.0), "A");
    }

    #[test]
    fn test_gpa_needed() {
        let plan = gpa_needed(3.0, 60.0, 3.3, 30.0).unwrap();
        assert!((plan.required - 3.9).abs() < 1e-9);
        assert!(plan.achievable);
        let out_of_reach = gpa_needed(2.0, 90.0, 3.5, 15.0).unwrap();
        assert!(!out_of_reach.achievable);
        assert!(gpa_needed(4.0, 90.0, 3.0, 15.0).unwrap().already_there);
        assert!(gpa_needed(3.0, 30.0, 3.0, 0.0).is_err());
    }

    #[test]
    fn test_final_needed() {
        let plan = final_needed(85.0, 25.0, 90.0).unwrap();
        assert!((plan.required - 105.0).abs() < 1e-9);
        assert!((plan.best_case - 88.75).abs() < 1e-9);
        let easy = final_needed(95.0, 20.0, 70.0).unwrap();
        assert!(easy.required < 0.0);
        assert!(final_needed(80.0, 0.0, 90.0).is_err());
    }
}
