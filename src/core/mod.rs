pub mod catalog;
pub mod engine;
pub mod render;

pub use crate::domain::model::{Card, Form, Table, Tone};
pub use crate::domain::ports::{Calculator, ConfigProvider, QrRenderer, RateSource, Storage};
pub use crate::utils::error::Result;
pub use engine::{CalcEngine, Env};
