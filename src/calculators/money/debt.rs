use crate::calculators::time::date::add_months_clamped;
use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_currency, format_months};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

pub const MAX_MONTHS: u32 = 600;
/// Consecutive months with no net progress before a plan counts as stalled.
pub const STALL_MONTHS: u32 = 6;
const MAX_DEBT_ROWS: usize = 20;
const EPSILON: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    pub rate: f64,
    pub min_payment: f64,
}

impl Debt {
    pub fn new(name: &str, balance: f64, rate: f64, min_payment: f64) -> Self {
        Self {
            name: name.to_string(),
            balance,
            rate,
            min_payment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Smallest balance first.
    Snowball,
    /// Highest rate first.
    Avalanche,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountResult {
    pub name: String,
    pub total_paid: f64,
    pub interest_paid: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayoffPlan {
    pub strategy: Strategy,
    pub months: u32,
    pub total_paid: f64,
    pub total_interest: f64,
    pub stalled: bool,
    pub remaining: f64,
    pub accounts: Vec<AccountResult>,
}

struct Account {
    debt: Debt,
    paid: f64,
    interest: f64,
}

fn pick_target(accounts: &[Account], strategy: Strategy) -> Option<usize> {
    let mut active: Vec<usize> = (0..accounts.len())
        .filter(|&i| accounts[i].debt.balance > EPSILON)
        .collect();
    active.sort_by(|&a, &b| {
        let (a, b) = (&accounts[a].debt, &accounts[b].debt);
        match strategy {
            Strategy::Avalanche => b
                .rate
                .total_cmp(&a.rate)
                .then(a.balance.total_cmp(&b.balance)),
            Strategy::Snowball => {
                if (a.balance - b.balance).abs() > EPSILON {
                    a.balance.total_cmp(&b.balance)
                } else {
                    b.rate.total_cmp(&a.rate)
                }
            }
        }
    });
    active.first().copied()
}

fn outstanding(accounts: &[Account]) -> f64 {
    accounts.iter().map(|a| a.debt.balance.max(0.0)).sum()
}

/// Month-by-month payoff: interest accrues, minimums are paid, then the extra
/// goes to the strategy's target debt. Minimums of paid-off debts are not rolled over.
pub fn simulate(debts: &[Debt], strategy: Strategy, extra: f64) -> PayoffPlan {
    let mut accounts: Vec<Account> = debts
        .iter()
        .map(|d| Account {
            debt: d.clone(),
            paid: 0.0,
            interest: 0.0,
        })
        .collect();

    let mut months = 0;
    let mut stalled = false;
    let mut no_progress = 0;

    while months < MAX_MONTHS {
        let before = outstanding(&accounts);
        if before <= EPSILON {
            break;
        }
        months += 1;

        let mut month_interest = 0.0;
        for account in accounts.iter_mut().filter(|a| a.debt.balance > 0.0) {
            let interest = account.debt.balance * account.debt.rate / 100.0 / 12.0;
            account.debt.balance += interest;
            account.interest += interest;
            month_interest += interest;
        }

        let mut available = extra.max(0.0);
        let mut month_payment = 0.0;
        for account in accounts.iter_mut().filter(|a| a.debt.balance > 0.0) {
            let pay = account.debt.min_payment.min(account.debt.balance);
            if pay > 0.0 {
                account.debt.balance -= pay;
                account.paid += pay;
                month_payment += pay;
            }
        }

        while available > EPSILON {
            let Some(i) = pick_target(&accounts, strategy) else {
                break;
            };
            let target = &mut accounts[i];
            let pay = available.min(target.debt.balance);
            target.debt.balance -= pay;
            target.paid += pay;
            month_payment += pay;
            available -= pay;
        }

        let after = outstanding(&accounts);
        if after >= before - EPSILON && month_interest >= month_payment - EPSILON {
            no_progress += 1;
        } else {
            no_progress = 0;
        }
        if no_progress >= STALL_MONTHS {
            stalled = true;
            break;
        }
    }

    let remaining = outstanding(&accounts);
    if remaining > EPSILON {
        stalled = true;
    }

    PayoffPlan {
        strategy,
        months,
        total_paid: accounts.iter().map(|a| a.paid).sum(),
        total_interest: accounts.iter().map(|a| a.interest).sum(),
        stalled,
        remaining,
        accounts: accounts
            .into_iter()
            .map(|a| AccountResult {
                name: a.debt.name,
                total_paid: a.paid,
                interest_paid: a.interest,
            })
            .collect(),
    }
}

pub fn default_debts() -> Vec<Debt> {
    vec![
        Debt::new("Credit Card", 6500.0, 19.99, 175.0),
        Debt::new("Auto Loan", 13000.0, 6.5, 325.0),
    ]
}

fn parse_amount(raw: Option<&str>) -> f64 {
    raw.map(|v| v.trim().trim_start_matches('$').replace(',', ""))
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<f64>().unwrap_or(f64::NAN))
        .unwrap_or(0.0)
}

/// Validates one row. Rows with no positive balance are skipped.
fn push_row(
    debts: &mut Vec<Debt>,
    index: usize,
    name: Option<&str>,
    balance: Option<&str>,
    rate: Option<&str>,
    payment: Option<&str>,
) -> Result<()> {
    let balance = parse_amount(balance);
    if !balance.is_finite() || balance <= 0.0 {
        return Ok(());
    }
    let rate = parse_amount(rate.map(|r| r.trim_end_matches('%')));
    if !rate.is_finite() || rate < 0.0 {
        return Err(CalcError::invalid("Interest rates must be zero or positive."));
    }
    let payment = parse_amount(payment);
    if !payment.is_finite() || payment <= 0.0 {
        return Err(CalcError::invalid("Minimum payments must be above zero."));
    }
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Debt {}", index));
    debts.push(Debt {
        name,
        balance,
        rate,
        min_payment: payment,
    });
    Ok(())
}

/// Reads `debt_N_*` fields, then any `debts` block of
/// `name, balance, rate, payment` lines. A form with neither gets the sample
/// pair of debts.
pub fn parse_debts(form: &Form) -> Result<Vec<Debt>> {
    let mut debts = Vec::new();
    let mut seen_any = false;

    for n in 1..=MAX_DEBT_ROWS {
        let field = |part: &str| form.get(&format!("debt_{}_{}", n, part));
        if ["name", "balance", "rate", "payment"].iter().any(|p| field(p).is_some()) {
            seen_any = true;
            push_row(&mut debts, n, field("name"), field("balance"), field("rate"), field("payment"))?;
        }
    }

    if let Some(block) = form.raw("debts") {
        for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
            seen_any = true;
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            let index = debts.len() + 1;
            push_row(
                &mut debts,
                index,
                parts.first().copied(),
                parts.get(1).copied(),
                parts.get(2).copied(),
                parts.get(3).copied(),
            )?;
        }
    }

    if !seen_any {
        return Ok(default_debts());
    }
    if debts.is_empty() {
        return Err(CalcError::invalid(
            "Please enter at least one debt with a positive balance.",
        ));
    }
    Ok(debts)
}

/// `2024-05` plus `months`, shown as `October 2025`.
pub fn payoff_date(start: Option<&str>, months: u32) -> String {
    let parsed = start.and_then(|s| {
        let (year, month) = s.split_once('-')?;
        let year: i32 = year.trim().parse().ok()?;
        let month: u32 = month.split('-').next()?.trim().parse().ok()?;
        add_months_clamped(NaiveDate::from_ymd_opt(year, month, 1)?, months as i32, 1)
    });
    match parsed {
        Some(date) => date.format("%B %Y").to_string(),
        None => "—".to_string(),
    }
}

pub fn recommendation(snowball: &PayoffPlan, avalanche: &PayoffPlan) -> String {
    if snowball.stalled {
        return "Minimum payments and extra cash aren't enough to pay off the debts. Increase the budget or negotiate lower rates.".to_string();
    }
    if avalanche.stalled {
        return "Avalanche results couldn't pay off the debts with the current budget.".to_string();
    }
    let difference = snowball.total_interest - avalanche.total_interest;
    if difference > 0.0 {
        format!(
            "Avalanche saves {} in interest versus snowball.",
            format_currency(difference)
        )
    } else if difference < 0.0 {
        format!(
            "Snowball costs {} less interest than avalanche.",
            format_currency(difference.abs())
        )
    } else {
        "Both methods cost the same in interest with this debt mix.".to_string()
    }
}

fn timeline(plan: &PayoffPlan) -> String {
    if plan.stalled {
        "Not paid off".to_string()
    } else {
        format_months(plan.months)
    }
}

fn account_table(caption: &str, plan: &PayoffPlan) -> Table {
    let mut table = Table::new(&["Debt", "Total paid", "Interest paid"]).captioned(caption);
    for account in &plan.accounts {
        table.push(&[
            account.name.clone(),
            format_currency(account.total_paid),
            format_currency(account.interest_paid),
        ]);
    }
    table
}

#[derive(Serialize)]
struct DebtReport<'a> {
    debts: &'a [Debt],
    extra: f64,
    snowball: &'a PayoffPlan,
    avalanche: &'a PayoffPlan,
}

pub struct DebtPayoffCalculator;

#[async_trait]
impl Calculator for DebtPayoffCalculator {
    fn key(&self) -> &'static str {
        "debt-payoff-calculator"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let debts = parse_debts(form)?;
        let extra = form.value_or("extra", 0.0);
        let extra = if extra.is_finite() && extra > 0.0 { extra } else { 0.0 };
        let start = form.get("start");

        let snowball = simulate(&debts, Strategy::Snowball, extra);
        let avalanche = simulate(&debts, Strategy::Avalanche, extra);

        let minimums: f64 = debts.iter().map(|d| d.min_payment).sum();
        let total_balance: f64 = debts.iter().map(|d| d.balance).sum();

        let mut methods = Table::new(&["Method", "Months", "Interest paid", "Total paid", "Payoff date"]);
        for (label, plan) in [("Snowball", &snowball), ("Avalanche", &avalanche)] {
            let (months, date) = if plan.stalled {
                ("—".to_string(), "—".to_string())
            } else {
                (plan.months.to_string(), payoff_date(start, plan.months))
            };
            methods.push(&[
                label.to_string(),
                months,
                format_currency(plan.total_interest),
                format_currency(plan.total_paid),
                date,
            ]);
        }

        Card::new("Debt-free game plan")
            .stat("Starting balance", format_currency(total_balance))
            .stat("Minimum payments", format_currency(minimums))
            .stat("Extra payment", format_currency(extra))
            .stat("Monthly budget", format_currency(minimums + extra))
            .stat("Snowball timeline", timeline(&snowball))
            .stat("Avalanche timeline", timeline(&avalanche))
            .stat("Snowball interest", format_currency(snowball.total_interest))
            .stat("Avalanche interest", format_currency(avalanche.total_interest))
            .table(methods)
            .note(recommendation(&snowball, &avalanche))
            .table(account_table("Snowball payoff by account", &snowball))
            .table(account_table("Avalanche payoff by account", &avalanche))
            .data(&DebtReport {
                debts: &debts,
                extra,
                snowball: &snowball,
                avalanche: &avalanche,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avalanche_never_costs_more_interest() {
        let debts = default_debts();
        let snowball = simulate(&debts, Strategy::Snowball, 200.0);
        let avalanche = simulate(&debts, Strategy::Avalanche, 200.0);
        assert!(!snowball.stalled && !avalanche.stalled);
        assert!(avalanche.total_interest <= snowball.total_interest + 1e-6);

        let balance: f64 = debts.iter().map(|d| d.balance).sum();
        assert!((avalanche.total_paid - balance - avalanche.total_interest).abs() < 0.05);
    }

    #[test]
    fn test_underwater_plan_stalls() {
        let debts = vec![Debt::new("Card", 10_000.0, 24.0, 100.0)];
        let plan = simulate(&debts, Strategy::Avalanche, 0.0);
        assert!(plan.stalled);
        assert_eq!(plan.months, STALL_MONTHS);
        let other = simulate(&debts, Strategy::Snowball, 0.0);
        assert!(recommendation(&other, &plan).starts_with("Minimum payments"));
    }

    #[test]
    fn test_parse_rows_and_block() {
        let form = Form::new()
            .with("debt_1_balance", "1200")
            .with("debt_1_rate", "18")
            .with("debt_1_payment", "50")
            .with("debts", "Store card, 800, 24.9%, 35\n\nMedical, 0, 0, 10");
        let debts = parse_debts(&form).unwrap();
        assert_eq!(debts.len(), 2);
        assert_eq!(debts[0].name, "Debt 1");
        assert_eq!(debts[1].name, "Store card");
        assert_eq!(debts[1].rate, 24.9);
    }

    #[test]
    fn test_parse_errors() {
        let zero_payment = Form::new().with("debts", "Card, 500, 10, 0");
        assert_eq!(
            parse_debts(&zero_payment).unwrap_err().to_string(),
            "Minimum payments must be above zero."
        );
        let nothing = Form::new().with("debt_1_balance", "0");
        assert!(parse_debts(&nothing).is_err());
        assert_eq!(parse_debts(&Form::new()).unwrap(), default_debts());
    }

    #[test]
    fn test_payoff_date() {
        assert_eq!(payoff_date(Some("2024-05"), 17), "October 2025");
        assert_eq!(payoff_date(None, 3), "—");
        assert_eq!(payoff_date(Some("soon"), 3), "—");
    }
}
