//! Loans, savings, pay and everyday money calculators.

pub mod car_affordability;
pub mod compound;
pub mod credit_card;
pub mod currency;
pub mod debt;
pub mod event_budget;
pub mod freelancer;
pub mod inflation;
pub mod loan;
pub mod mortgage;
pub mod overtime;
pub mod paycheck;
pub mod salary;
pub mod savings_goal;
pub mod savings_vs_investing;
pub mod tip;

/// Longest loan term accepted, in years.
pub const MAX_LOAN_YEARS: u32 = 50;
/// Longest savings or investing horizon accepted, in years.
pub const MAX_HORIZON_YEARS: u32 = 100;

pub use car_affordability::CarLoanAffordability;
pub use compound::CompoundInterestCalculator;
pub use credit_card::CreditCardInterestCalculator;
pub use currency::CurrencyConverter;
pub use debt::DebtPayoffCalculator;
pub use event_budget::EventBudgetCalculator;
pub use freelancer::FreelancerRateCalculator;
pub use inflation::InflationCalculator;
pub use loan::LoanCalculator;
pub use mortgage::MortgageCalculator;
pub use overtime::OvertimePayCalculator;
pub use paycheck::PaycheckTaxCalculator;
pub use salary::SalaryToHourly;
pub use savings_goal::SavingsGoalCalculator;
pub use savings_vs_investing::SavingsVsInvesting;
pub use tip::TipCalculator;
