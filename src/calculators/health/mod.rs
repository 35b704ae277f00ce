//! Body metrics and nutrition estimates.

pub mod bmi;
pub mod bmr;
pub mod body_fat;
pub mod macros;
pub mod measure;
pub mod water;

pub use bmi::BmiCalculator;
pub use bmr::BmrCalorieCalculator;
pub use body_fat::BodyFatEstimator;
pub use macros::MacrosCalculator;
pub use water::WaterIntakeCalculator;
