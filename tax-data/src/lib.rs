//! External year parameters for the tax engine.
//!
//! Bracket schedules come from CSV files keyed by IRS schedule code; every
//! other parameter comes from a TOML year file. [`YearFileSource`] plugs a
//! directory of such files into a `tax_core::YearConfigRegistry`.

mod loader;
mod logging;
mod year_file;

pub use loader::{TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord};
pub use logging::init_logging;
pub use year_file::{YearFileError, YearFileSource, load_year_file};
