pub mod calculations;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use config::{BuiltInSource, YearConfigRegistry, YearConfigSource};
pub use engine::TaxEngine;
pub use error::TaxEngineError;
pub use models::*;
