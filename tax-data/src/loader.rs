use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::calculations::common::round_half_up;
use tax_core::{FilingStatus, PerStatus, TaxBracket};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when reading a bracket schedule file.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Row for tax year {found} in a file for {expected}")]
    TaxYearMismatch { expected: i32, found: i32 },

    #[error("Schedule {schedule}: bracket at {min_income} does not start where the previous one ends")]
    Gap { schedule: String, min_income: Decimal },

    #[error("Schedule {schedule}: only the last bracket may be open-ended")]
    OpenEnded { schedule: String },

    #[error("Schedule {schedule}: the last bracket must be open-ended")]
    ClosedTop { schedule: String },

    #[error("Schedule {schedule}: base tax at {min_income} is {found}, brackets imply {expected}")]
    BaseTaxMismatch {
        schedule: String,
        min_income: Decimal,
        expected: Decimal,
        found: Decimal,
    },
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly and Qualifying Surviving Spouse
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_statuses(
    schedule: &str
) -> Result<&'static [FilingStatus], TaxBracketLoaderError> {
    match schedule {
        "X" => Ok(&[FilingStatus::Single]),
        "Y-1" => Ok(&[
            FilingStatus::MarriedFilingJointly,
            FilingStatus::QualifyingSurvivingSpouse,
        ]),
        "Y-2" => Ok(&[FilingStatus::MarriedFilingSeparately]),
        "Z" => Ok(&[FilingStatus::HeadOfHousehold]),
        _ => Err(TaxBracketLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: Tax on `min_income`, used as a cross-check of the rates
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Reads bracket schedules from CSV.
///
/// The CSV uses IRS schedule codes (X, Y-1, Y-2, Z), which are mapped to
/// the filing statuses that share each schedule.
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Turn parsed records into one bracket table per filing status.
    ///
    /// Within each schedule the rows are ordered by `min_income` and must
    /// tile the income line: every bracket starts where the previous one
    /// ends and only the last is open-ended. Each row's `base_tax` must
    /// equal the tax the earlier rows imply at its `min_income`.
    ///
    /// Schedule Y-1 fills both the joint and the surviving-spouse slot.
    pub fn schedules(
        records: &[TaxBracketRecord],
        tax_year: i32,
    ) -> Result<PerStatus<Vec<TaxBracket>>, TaxBracketLoaderError> {
        let mut groups: BTreeMap<&str, Vec<&TaxBracketRecord>> = BTreeMap::new();
        for record in records {
            if record.tax_year != tax_year {
                return Err(TaxBracketLoaderError::TaxYearMismatch {
                    expected: tax_year,
                    found: record.tax_year,
                });
            }
            groups.entry(record.schedule.as_str()).or_default().push(record);
        }

        let mut table = PerStatus::empty();
        for (schedule, mut rows) in groups {
            let statuses = schedule_to_filing_statuses(schedule)?;
            rows.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            check_schedule(schedule, &rows)?;

            let brackets: Vec<TaxBracket> = rows
                .iter()
                .map(|r| TaxBracket::new(r.min_income, r.rate))
                .collect();
            debug!(schedule, tax_year, brackets = brackets.len(), "parsed bracket schedule");

            for &status in statuses {
                table.set(status, brackets.clone());
            }
        }

        Ok(table)
    }
}

fn check_schedule(
    schedule: &str,
    rows: &[&TaxBracketRecord],
) -> Result<(), TaxBracketLoaderError> {
    for pair in rows.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let Some(prev_max) = prev.max_income else {
            return Err(TaxBracketLoaderError::OpenEnded {
                schedule: schedule.to_string(),
            });
        };
        if prev_max != next.min_income {
            return Err(TaxBracketLoaderError::Gap {
                schedule: schedule.to_string(),
                min_income: next.min_income,
            });
        }
        let expected = round_half_up(prev.base_tax + (prev_max - prev.min_income) * prev.rate);
        if expected != next.base_tax {
            return Err(TaxBracketLoaderError::BaseTaxMismatch {
                schedule: schedule.to_string(),
                min_income: next.min_income,
                expected,
                found: next.base_tax,
            });
        }
    }
    if rows.last().is_some_and(|r| r.max_income.is_some()) {
        return Err(TaxBracketLoaderError::ClosedTop {
            schedule: schedule.to_string(),
        });
    }
    Ok(())
}
