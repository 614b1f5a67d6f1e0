use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tax_core::{TaxEngineError, YearConfig, YearConfigSource};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::loader::{TaxBracketLoader, TaxBracketLoaderError};

/// Errors that can occur when reading a year parameter file.
#[derive(Debug, Error)]
pub enum YearFileError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Bracket file {}: {source}", path.display())]
    Brackets {
        path: PathBuf,
        #[source]
        source: TaxBracketLoaderError,
    },

    #[error("{} has no bracket tables and no bracket CSV was given", path.display())]
    MissingBrackets { path: PathBuf },

    #[error(transparent)]
    Invalid(#[from] TaxEngineError),
}

/// Read one year of parameters.
///
/// `year_path` is a TOML rendering of [`YearConfig`]. When `brackets_path`
/// is given its schedules replace any bracket tables in the TOML. The
/// result has passed [`YearConfig::validate`].
pub fn load_year_file(
    year_path: &Path,
    brackets_path: Option<&Path>,
) -> Result<YearConfig, YearFileError> {
    let contents = fs::read_to_string(year_path).map_err(|source| YearFileError::Io {
        path: year_path.to_path_buf(),
        source,
    })?;
    let mut config: YearConfig = toml::from_str(&contents).map_err(|source| YearFileError::Toml {
        path: year_path.to_path_buf(),
        source,
    })?;

    if let Some(csv_path) = brackets_path {
        let brackets_error = |source| YearFileError::Brackets {
            path: csv_path.to_path_buf(),
            source,
        };
        let file = File::open(csv_path).map_err(|source| YearFileError::Io {
            path: csv_path.to_path_buf(),
            source,
        })?;
        let records = TaxBracketLoader::parse(file).map_err(brackets_error)?;
        config.brackets =
            TaxBracketLoader::schedules(&records, config.tax_year).map_err(brackets_error)?;
    }

    if config.brackets.is_empty() {
        return Err(YearFileError::MissingBrackets {
            path: year_path.to_path_buf(),
        });
    }
    config.validate()?;

    info!(
        tax_year = config.tax_year,
        path = %year_path.display(),
        "loaded year parameters"
    );
    Ok(config)
}

/// A directory of year files.
///
/// Year `YYYY` is read from `year_YYYY.toml`, with brackets from
/// `tax_brackets_YYYY.csv` when that file sits next to it.
#[derive(Debug, Clone)]
pub struct YearFileSource {
    dir: PathBuf,
    name: String,
}

impl YearFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = format!("files:{}", dir.display());
        Self { dir, name }
    }

    pub fn year_path(
        &self,
        tax_year: i32,
    ) -> PathBuf {
        self.dir.join(format!("year_{tax_year}.toml"))
    }

    pub fn brackets_path(
        &self,
        tax_year: i32,
    ) -> PathBuf {
        self.dir.join(format!("tax_brackets_{tax_year}.csv"))
    }
}

fn year_from_file_name(name: &str) -> Option<i32> {
    name.strip_prefix("year_")?
        .strip_suffix(".toml")?
        .parse()
        .ok()
}

impl YearConfigSource for YearFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn tax_years(&self) -> Vec<i32> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %self.dir.display(), error = %err, "cannot list year files");
                return Vec::new();
            }
        };
        let mut years: Vec<i32> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| year_from_file_name(&entry.file_name().to_string_lossy()))
            .collect();
        years.sort_unstable();
        debug!(dir = %self.dir.display(), ?years, "found year files");
        years
    }

    fn load(
        &self,
        tax_year: i32,
    ) -> Result<YearConfig, TaxEngineError> {
        let year_path = self.year_path(tax_year);
        let brackets_path = self.brackets_path(tax_year);
        let brackets = brackets_path.is_file().then_some(brackets_path.as_path());

        load_year_file(&year_path, brackets).map_err(|err| match err {
            YearFileError::Invalid(inner) => inner,
            other => TaxEngineError::configuration(year_path.display().to_string(), other.to_string()),
        })
    }
}
