//! ETC table loader
//!
//! The exposure time calculator writes one `.npz` file per observing mode and
//! source type with the parallel arrays:
//!  - `wavelengths`: wavelength [micron]
//!  - `sns`: sensitivity
//!  - `lim_fluxes`: limiting flux
//!  - `sat_limits`: saturation limit
//!  - `configs`: configuration label of each row

use crate::{
    dataset::{ModeDataset, SensitivityRecord},
    mode::ModeKey,
    Error,
};
use regex::Regex;
use std::{
    io,
    path::{Path, PathBuf},
    time::Instant,
};

mod archive;
pub use archive::Archive;

#[derive(thiserror::Error, Debug)]
pub enum FileFormatError {
    #[error("failed to open the ETC table {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ETC table {path:?} is missing the array(s): {}", .names.join(", "))]
    MissingArrays { path: PathBuf, names: Vec<String> },
    #[error("failed to read array `{array}` from {path:?}")]
    Read {
        path: PathBuf,
        array: String,
        #[source]
        source: io::Error,
    },
    #[error("array `{array}` in {path:?} has the unsupported dtype {dtype}")]
    UnsupportedDtype {
        path: PathBuf,
        array: String,
        dtype: String,
    },
    #[error("array `{array}` in {path:?} holds pickled Python objects (dtype |O); re-save the ETC table with a fixed-width string dtype (`<U` or `|S`)")]
    PickledObjects { path: PathBuf, array: String },
    #[error("array `{array}` in {path:?} is not one-dimensional (shape: {shape:?})")]
    NotOneDimensional {
        path: PathBuf,
        array: String,
        shape: Vec<u64>,
    },
    #[error("found {count} files matching {pattern:?}, expected exactly one")]
    NoSingleMatch { pattern: String, count: usize },
    #[error("invalid file pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum DataShapeError {
    #[error("array `{array}` in {path:?} has {found} elements instead of {expected} (`wavelengths` length)")]
    LengthMismatch {
        path: PathBuf,
        array: String,
        expected: usize,
        found: usize,
    },
    #[error("ETC table {path:?} has no rows")]
    Empty { path: PathBuf },
    #[error("configuration {configuration:?} in {path:?} has the non-finite wavelength {value} at row {index}")]
    NonFiniteWavelength {
        path: PathBuf,
        configuration: String,
        index: usize,
        value: f64,
    },
    #[error("wavelengths of configuration {configuration:?} in {path:?} are not strictly increasing at row {index}: {previous} -> {current}")]
    NotIncreasing {
        path: PathBuf,
        configuration: String,
        index: usize,
        previous: f64,
        current: f64,
    },
}

/// Array names, the first one being the name reported when the array is missing
const WAVELENGTHS: &[&str] = &["wavelengths"];
const SENSITIVITIES: &[&str] = &["sns", "sensitivity", "sensitivities"];
const LIMITING_FLUXES: &[&str] = &["lim_fluxes"];
const SATURATION_LIMITS: &[&str] = &["sat_limits"];
const CONFIGURATIONS: &[&str] = &["configs"];

/// Loads an ETC table into a [ModeDataset]
pub struct TableLoader {
    path: PathBuf,
    config_regex: Option<String>,
    exclude_regex: Option<String>,
}
impl TableLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config_regex: None,
            exclude_regex: None,
        }
    }
    /// Keeps only the configurations matching the regular expression
    pub fn config_filter<S: Into<String>>(self, config_regex: S) -> Self {
        Self {
            config_regex: Some(config_regex.into()),
            ..self
        }
    }
    /// Discards the configurations matching the regular expression
    pub fn exclude_filter<S: Into<String>>(self, exclude_regex: S) -> Self {
        Self {
            exclude_regex: Some(exclude_regex.into()),
            ..self
        }
    }
    pub fn load(self) -> Result<ModeDataset, Error> {
        log::info!("Loading {:?}...", self.path);
        let now = Instant::now();

        let re_config = self.config_regex.as_deref().map(Regex::new).transpose()?;
        let re_exclude = self.exclude_regex.as_deref().map(Regex::new).transpose()?;

        let mut archive = Archive::open(&self.path)?;
        let [wavelengths_name, sns_name, lim_name, sat_name, configs_name] =
            schema(&self.path, &archive.names())?;

        let wavelengths = archive.floats(&wavelengths_name)?;
        let sns = archive.floats(&sns_name)?;
        let lim_fluxes = archive.floats(&lim_name)?;
        let sat_limits = archive.floats(&sat_name)?;
        let configs = archive.labels(&configs_name)?;

        let n = wavelengths.len();
        for (array, found) in [
            (&sns_name, sns.len()),
            (&lim_name, lim_fluxes.len()),
            (&sat_name, sat_limits.len()),
            (&configs_name, configs.len()),
        ] {
            if found != n {
                return Err(DataShapeError::LengthMismatch {
                    path: self.path,
                    array: array.to_string(),
                    expected: n,
                    found,
                }
                .into());
            }
        }
        if n == 0 {
            return Err(DataShapeError::Empty { path: self.path }.into());
        }

        let records: Vec<SensitivityRecord> = configs
            .into_iter()
            .zip(wavelengths)
            .zip(sns)
            .zip(lim_fluxes)
            .zip(sat_limits)
            .filter(|((((config, _), _), _), _)| match (&re_config, &re_exclude) {
                (Some(re), Some(re_x)) => re.is_match(config) && !re_x.is_match(config),
                (Some(re), None) => re.is_match(config),
                (None, Some(re_x)) => !re_x.is_match(config),
                (None, None) => true,
            })
            .map(
                |((((configuration, wavelength), sensitivity), limiting_flux), saturation_limit)| {
                    SensitivityRecord {
                        configuration,
                        wavelength,
                        sensitivity,
                        limiting_flux,
                        saturation_limit,
                    }
                },
            )
            .collect();
        if records.len() < n {
            log::info!(
                " - {} of {} rows left after configuration filtering",
                records.len(),
                n
            );
        }

        let key = ModeKey::from_file_name(&self.path);
        let name = match key {
            Some(key) => key.to_string(),
            None => self
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "etc_table".to_string()),
        };
        let dataset = ModeDataset::new(name, key, self.path, records)?;
        log::info!(
            " - {}: {} records in {} configurations ({}ms)",
            dataset.name(),
            dataset.len(),
            dataset.n_groups(),
            now.elapsed().as_millis()
        );
        Ok(dataset)
    }
}

/// Resolves the name of every expected array, failing with all the missing ones
fn schema(path: &Path, names: &[String]) -> Result<[String; 5], FileFormatError> {
    let mut missing = vec![];
    let mut resolve = |aliases: &[&str]| -> String {
        match aliases
            .iter()
            .find(|alias| names.iter().any(|name| name == *alias))
        {
            Some(alias) => alias.to_string(),
            None => {
                missing.push(aliases[0].to_string());
                aliases[0].to_string()
            }
        }
    };
    let resolved = [
        resolve(WAVELENGTHS),
        resolve(SENSITIVITIES),
        resolve(LIMITING_FLUXES),
        resolve(SATURATION_LIMITS),
        resolve(CONFIGURATIONS),
    ];
    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(FileFormatError::MissingArrays {
            path: path.to_path_buf(),
            names: missing,
        })
    }
}
