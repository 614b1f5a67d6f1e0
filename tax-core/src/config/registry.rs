use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::source::{BuiltInSource, YearConfigSource};
use crate::error::TaxEngineError;
use crate::models::YearConfig;

/// Validated year configurations, keyed by tax year.
///
/// Typical lifetime:
/// 1. Create with `YearConfigRegistry::new()` (or `with_built_in()`).
/// 2. Call `register` or `load_from` once per configuration source.
/// 3. Call `get` whenever an engine for a given year is needed.
///
/// Entries are handed out as `Arc<YearConfig>`, so any number of engines
/// and threads can share one table without copying it.
#[derive(Debug, Clone, Default)]
pub struct YearConfigRegistry {
    configs: BTreeMap<i32, Arc<YearConfig>>,
}

impl YearConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            configs: BTreeMap::new(),
        }
    }

    /// Registry pre-loaded with the years compiled into the crate.
    ///
    /// # Errors
    /// Propagates a validation failure in the in-code literals.
    pub fn with_built_in() -> Result<Self, TaxEngineError> {
        let mut registry = Self::new();
        registry.load_from(&BuiltInSource)?;
        Ok(registry)
    }

    /// Validate and register one configuration.
    ///
    /// If the year is already present it is replaced.
    ///
    /// # Errors
    /// * [`TaxEngineError::Configuration`] from [`YearConfig::validate`].
    pub fn register(
        &mut self,
        config: YearConfig,
    ) -> Result<(), TaxEngineError> {
        config.validate()?;
        debug!(tax_year = config.tax_year, "registered year configuration");
        self.configs.insert(config.tax_year, Arc::new(config));
        Ok(())
    }

    /// Load every year `source` offers. Returns how many were registered.
    ///
    /// # Errors
    /// Stops at the first year that fails to load or validate.
    pub fn load_from(
        &mut self,
        source: &dyn YearConfigSource,
    ) -> Result<usize, TaxEngineError> {
        let years = source.tax_years();
        for &year in &years {
            let config = source.load(year)?;
            if config.tax_year != year {
                return Err(TaxEngineError::configuration(
                    "tax_year",
                    format!(
                        "source '{}' returned {} when asked for {year}",
                        source.name(),
                        config.tax_year
                    ),
                ));
            }
            self.register(config)?;
        }
        debug!(source = source.name(), count = years.len(), "loaded year configurations");
        Ok(years.len())
    }

    /// Registered tax years, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        self.configs.keys().copied().collect()
    }

    /// Shared handle to the configuration for `tax_year`.
    ///
    /// # Errors
    /// * [`TaxEngineError::Configuration`] naming the requested year and the
    ///   years that are available.
    pub fn get(
        &self,
        tax_year: i32,
    ) -> Result<Arc<YearConfig>, TaxEngineError> {
        self.configs.get(&tax_year).cloned().ok_or_else(|| {
            TaxEngineError::configuration(
                "tax_year",
                format!(
                    "no configuration for {tax_year}; available: {:?}",
                    self.available_years()
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{FilingStatus, PerStatus};

    // ── stub sources ─────────────────────────────────────────────────────
    /// Serves the 2025 literals relabelled as each requested year and
    /// counts how often `load` is reached.
    struct RelabellingSource {
        years: Vec<i32>,
        loads: AtomicUsize,
    }

    impl YearConfigSource for RelabellingSource {
        fn name(&self) -> &str {
            "relabelling"
        }

        fn tax_years(&self) -> Vec<i32> {
            self.years.clone()
        }

        fn load(
            &self,
            tax_year: i32,
        ) -> Result<YearConfig, TaxEngineError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(YearConfig {
                tax_year,
                ..YearConfig::tax_year_2025()
            })
        }
    }

    /// Claims 2030 but hands back 2025.
    struct MislabelledSource;

    impl YearConfigSource for MislabelledSource {
        fn name(&self) -> &str {
            "mislabelled"
        }

        fn tax_years(&self) -> Vec<i32> {
            vec![2030]
        }

        fn load(
            &self,
            _tax_year: i32,
        ) -> Result<YearConfig, TaxEngineError> {
            Ok(YearConfig::tax_year_2025())
        }
    }

    // ── construction ─────────────────────────────────────────────────────
    #[test]
    fn new_registry_has_no_years() {
        assert!(YearConfigRegistry::new().available_years().is_empty());
    }

    #[test]
    fn built_in_registry_serves_2025() {
        let registry = YearConfigRegistry::with_built_in().unwrap();

        assert_eq!(registry.available_years(), vec![2025]);
        assert_eq!(registry.get(2025).unwrap().tax_year, 2025);
    }

    // ── registration ─────────────────────────────────────────────────────
    #[test]
    fn load_from_registers_every_offered_year_sorted() {
        let source = RelabellingSource {
            years: vec![2026, 2024],
            loads: AtomicUsize::new(0),
        };
        let mut registry = YearConfigRegistry::new();

        let count = registry.load_from(&source).unwrap();

        assert_eq!(count, 2);
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
        assert_eq!(registry.available_years(), vec![2024, 2026]);
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut registry = YearConfigRegistry::with_built_in().unwrap();
        let mut replacement = YearConfig::tax_year_2025();
        replacement.penalty.annual_rate = rust_decimal_macros::dec!(0.08);

        registry.register(replacement).unwrap();

        assert_eq!(registry.available_years(), vec![2025]);
        assert_eq!(
            registry.get(2025).unwrap().penalty.annual_rate,
            rust_decimal_macros::dec!(0.08)
        );
    }

    #[test]
    fn register_rejects_invalid_configuration() {
        let mut broken = YearConfig::tax_year_2025();
        broken.brackets = PerStatus {
            single: Some(Vec::new()),
            ..PerStatus::empty()
        };

        let result = YearConfigRegistry::new().register(broken);

        assert!(matches!(result, Err(TaxEngineError::Configuration { .. })));
    }

    #[test]
    fn load_from_rejects_mislabelled_year() {
        let mut registry = YearConfigRegistry::new();

        let err = registry.load_from(&MislabelledSource).unwrap_err();

        assert!(err.to_string().contains("mislabelled"), "{err}");
        assert!(registry.available_years().is_empty());
    }

    // ── lookup ───────────────────────────────────────────────────────────
    #[test]
    fn lookups_share_one_allocation() {
        let registry = YearConfigRegistry::with_built_in().unwrap();

        let a = registry.get(2025).unwrap();
        let b = registry.get(2025).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.brackets_for(FilingStatus::Single).is_ok());
    }

    #[test]
    fn missing_year_names_requested_and_available_years() {
        let registry = YearConfigRegistry::with_built_in().unwrap();

        match registry.get(2031) {
            Err(TaxEngineError::Configuration { message, .. }) => {
                assert!(message.contains("2031"), "should name the requested year");
                assert!(message.contains("2025"), "should list available years");
            }
            other => panic!("expected Configuration error, got {other:#?}"),
        }
    }
}
