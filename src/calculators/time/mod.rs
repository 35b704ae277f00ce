//! Date and time calculators.

pub mod age;
pub mod anniversary;
pub mod birthday;
pub mod date;
pub mod days_from;
pub mod flight;
pub mod holiday;
pub mod time_zone;

pub use age::AgeCalculator;
pub use anniversary::AnniversaryCountdown;
pub use birthday::DaysUntilBirthday;
pub use days_from::DaysFromDate;
pub use flight::FlightTimeCalculator;
pub use holiday::HolidayCountdownCalculator;
pub use time_zone::TimeZoneConverter;
