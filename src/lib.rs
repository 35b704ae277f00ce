pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod calculators;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use config::AppConfig;
pub use crate::core::{CalcEngine, Card, Env, Form};
pub use utils::error::{CalcError, Result};
