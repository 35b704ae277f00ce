//! Calculator registry.
//!
//! Every widget is a stateless unit struct, so the registry is a static
//! slice of trait objects in catalog order.

pub mod conversions;
pub mod health;
pub mod money;
pub mod time;
pub mod tools;

use crate::domain::ports::Calculator;

static CALCULATORS: &[&dyn Calculator] = &[
    &time::DaysFromDate,
    &time::AgeCalculator,
    &time::DaysUntilBirthday,
    &time::AnniversaryCountdown,
    &time::HolidayCountdownCalculator,
    &time::FlightTimeCalculator,
    &money::PaycheckTaxCalculator,
    &money::OvertimePayCalculator,
    &money::FreelancerRateCalculator,
    &money::SalaryToHourly,
    &money::LoanCalculator,
    &money::CarLoanAffordability,
    &money::MortgageCalculator,
    &money::DebtPayoffCalculator,
    &money::CreditCardInterestCalculator,
    &money::CompoundInterestCalculator,
    &money::SavingsGoalCalculator,
    &money::SavingsVsInvesting,
    &money::CurrencyConverter,
    &money::InflationCalculator,
    &money::TipCalculator,
    &money::EventBudgetCalculator,
    &conversions::UnitConverter,
    &time::TimeZoneConverter,
    &conversions::CookingConverter,
    &conversions::FuelEconomyConverter,
    &conversions::SpeedConverter,
    &conversions::ShoeSizeConverter,
    &conversions::ClothingSizeConverter,
    &conversions::PetAgeConverter,
    &health::BmiCalculator,
    &health::BmrCalorieCalculator,
    &health::BodyFatEstimator,
    &health::WaterIntakeCalculator,
    &health::MacrosCalculator,
    &tools::PasswordGenerator,
    &tools::TextCaseConverter,
    &tools::HexRgbConverter,
    &tools::QrCodeGenerator,
    &tools::WordCounter,
    &tools::PdfToWord,
    &tools::GradeCalculator,
    &tools::MealPlanner,
    &tools::TypingSpeedTest,
];

pub fn all() -> &'static [&'static dyn Calculator] {
    CALCULATORS
}

/// Looks a calculator up by key or by its `/calculators/<key>` href.
pub fn find(key: &str) -> Option<&'static dyn Calculator> {
    let key = key.trim().trim_start_matches("/calculators/").trim_end_matches('/');
    CALCULATORS.iter().copied().find(|calc| calc.key() == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog;

    #[test]
    fn test_registry_matches_catalog() {
        let registered: Vec<_> = all().iter().map(|c| c.key()).collect();
        let listed: Vec<_> = catalog::all().map(|(_, info)| info.key()).collect();
        assert_eq!(registered, listed);
    }

    #[test]
    fn test_find_by_href() {
        assert_eq!(find("/calculators/tip-calculator").map(|c| c.key()), Some("tip-calculator"));
        assert_eq!(find("word-counter").map(|c| c.key()), Some("word-counter"));
        assert!(find("calculators").is_none());
    }
}
