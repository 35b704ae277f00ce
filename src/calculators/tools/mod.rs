//! Everyday utilities: text, colour, passwords, files and planning.

pub mod color;
pub mod grade;
pub mod meal_planner;
pub mod password;
pub mod pdf_text;
pub mod qr;
pub mod text_case;
pub mod word_counter;

pub use color::HexRgbConverter;
pub use grade::GradeCalculator;
pub use meal_planner::MealPlanner;
pub use password::PasswordGenerator;
pub use pdf_text::PdfToWord;
pub use qr::QrCodeGenerator;
pub use text_case::TextCaseConverter;
pub use typing_test::TypingSpeedTest;
pub use word_counter::WordCounter;
