//! Integration tests for year files loaded from the `test-data` fixtures.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::{
    FilingStatus, TaxEngine, TaxEngineError, TaxReturnInput, W2, YearConfig, YearConfigRegistry,
};
use tax_data::{TaxBracketLoader, YearFileError, YearFileSource, load_year_file};

const TEST_CSV_2025: &str = include_str!("../test-data/tax_brackets_2025.csv");

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

fn load_2025() -> YearConfig {
    let dir = fixtures();
    load_year_file(&dir.join("year_2025.toml"), Some(&dir.join("tax_brackets_2025.csv")))
        .expect("Fixture year should load")
}

#[test]
fn test_year_file_matches_built_in_parameters() {
    assert_eq!(load_2025(), YearConfig::tax_year_2025());
}

#[test]
fn test_csv_schedules_match_built_in_brackets() {
    let records = TaxBracketLoader::parse(TEST_CSV_2025.as_bytes()).expect("Failed to parse CSV");

    let brackets = TaxBracketLoader::schedules(&records, 2025).expect("Schedules should be consistent");

    assert_eq!(brackets, YearConfig::tax_year_2025().brackets);
}

#[test]
fn test_csv_brackets_replace_toml_brackets() {
    let dir = fixtures();
    let year_toml = std::fs::read_to_string(dir.join("year_2025.toml")).unwrap();
    let with_flat_table = format!(
        "{year_toml}\n[brackets]\nsingle = [{{ floor = \"0\", rate = \"0.20\" }}]\n"
    );
    let scratch = std::env::temp_dir().join(format!("year-file-{}", std::process::id()));
    std::fs::create_dir_all(&scratch).unwrap();
    let year_path = scratch.join("year_2025.toml");
    std::fs::write(&year_path, with_flat_table).unwrap();

    let from_toml_only = load_year_file(&year_path, None).unwrap();
    let with_csv = load_year_file(&year_path, Some(&dir.join("tax_brackets_2025.csv"))).unwrap();
    std::fs::remove_dir_all(&scratch).unwrap();

    assert_eq!(from_toml_only.brackets_for(FilingStatus::Single).unwrap().len(), 1);
    assert!(from_toml_only.brackets_for(FilingStatus::HeadOfHousehold).is_err());
    assert_eq!(with_csv.brackets_for(FilingStatus::Single).unwrap().len(), 7);
}

#[test]
fn test_bracket_file_for_other_year_is_rejected() {
    let dir = fixtures();
    let scratch = std::env::temp_dir().join(format!("year-mismatch-{}", std::process::id()));
    std::fs::create_dir_all(&scratch).unwrap();
    let year_toml = std::fs::read_to_string(dir.join("year_2025.toml")).unwrap();
    let year_path = scratch.join("year_2026.toml");
    std::fs::write(&year_path, year_toml.replacen("tax_year = 2025", "tax_year = 2026", 1)).unwrap();

    let result = load_year_file(&year_path, Some(&dir.join("tax_brackets_2025.csv")));
    std::fs::remove_dir_all(&scratch).unwrap();

    let err = result.expect_err("2025 brackets must not load into a 2026 file");
    assert!(matches!(err, YearFileError::Brackets { .. }), "got: {:?}", err);
}

#[test]
fn test_registry_loads_directory_source() {
    let mut registry = YearConfigRegistry::new();

    let loaded = registry.load_from(&YearFileSource::new(fixtures())).unwrap();

    assert_eq!(loaded, 1);
    assert_eq!(registry.available_years(), vec![2025]);
    assert_eq!(*registry.get(2025).unwrap(), YearConfig::tax_year_2025());
}

#[test]
fn test_registry_reports_missing_year() {
    let mut registry = YearConfigRegistry::new();
    registry.load_from(&YearFileSource::new(fixtures())).unwrap();

    let err = registry.get(2026).unwrap_err();

    assert_eq!(
        err,
        TaxEngineError::configuration("tax_year", "no configuration for 2026; available: [2025]")
    );
}

#[test]
fn test_engine_runs_on_loaded_parameters() {
    let mut registry = YearConfigRegistry::new();
    registry.load_from(&YearFileSource::new(fixtures())).unwrap();
    let engine = TaxEngine::new(registry.get(2025).unwrap());

    let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
    input.income.w2.push(W2 {
        wages: dec!(25750),
        social_security_wages: dec!(25750),
        medicare_wages: dec!(25750),
        ..W2::default()
    });

    let result = engine.calculate(&input).unwrap();

    // 25750 - 15750 standard deduction
    assert_eq!(result.taxable_income, dec!(10000.00));
    assert_eq!(result.regular_tax, dec!(1000.00));
}
