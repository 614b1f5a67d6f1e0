use crate::error::TaxEngineError;
use crate::models::YearConfig;

/// Something that can produce year configurations: the in-code literals,
/// a directory of TOML files, a test fixture.
///
/// Sources are registered with a
/// [`YearConfigRegistry`](crate::config::YearConfigRegistry), which asks each
/// one for the years it offers and loads them eagerly.
pub trait YearConfigSource: Send + Sync {
    /// Short identifier used in log lines and error messages.
    fn name(&self) -> &str;

    /// Tax years this source can load.
    fn tax_years(&self) -> Vec<i32>;

    /// Build the configuration for `tax_year`.
    ///
    /// # Errors
    /// * [`TaxEngineError::Configuration`] when the year is not offered or
    ///   its parameters cannot be read.
    fn load(
        &self,
        tax_year: i32,
    ) -> Result<YearConfig, TaxEngineError>;
}

/// Years compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltInSource;

impl YearConfigSource for BuiltInSource {
    fn name(&self) -> &str {
        "built-in"
    }

    fn tax_years(&self) -> Vec<i32> {
        vec![2025]
    }

    fn load(
        &self,
        tax_year: i32,
    ) -> Result<YearConfig, TaxEngineError> {
        match tax_year {
            2025 => Ok(YearConfig::tax_year_2025()),
            other => Err(TaxEngineError::configuration(
                "tax_year",
                format!("no built-in parameters for {other}"),
            )),
        }
    }
}
