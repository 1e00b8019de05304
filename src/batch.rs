//! Batch processing of the ETC tables
//!
//! Every table is loaded and plotted independently of the others: a failure is
//! recorded in the [BatchReport] and the batch moves on to the next table.

use crate::{
    dataset::Quantity,
    error::error_chain,
    loader::{FileFormatError, TableLoader},
    mode::ModeKey,
    plot::{ChartOptions, PlottingError, Renderer},
    Error,
};
use glob::glob;
use std::path::{Path, PathBuf};

/// Batch settings
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// ETC tables root directory
    pub input: PathBuf,
    /// ETC version, the tables are then read from `<input>/ETC<version>`
    pub etc_version: Option<String>,
    /// ETC tables, replaces the discovery of the tables in the input directory
    pub files: Vec<PathBuf>,
    /// Charts directory
    pub output: PathBuf,
    /// Configurations regular expression filter
    pub config: Option<String>,
    /// Configurations exclude regular expression filter
    pub exclude: Option<String>,
    /// Adds the limiting flux panel to the charts
    pub limiting_flux: bool,
    /// Writes the tables to CSV files next to the charts
    pub csv: bool,
    /// Logs a summary of each table
    pub summary: bool,
}
impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            etc_version: None,
            files: vec![],
            output: PathBuf::from("plots"),
            config: None,
            exclude: None,
            limiting_flux: false,
            csv: false,
            summary: false,
        }
    }
}
impl BatchConfig {
    /// Directory the ETC tables are discovered in
    pub fn input_dir(&self) -> PathBuf {
        match &self.etc_version {
            Some(version) => self.input.join(format!("ETC{}", version.trim())),
            None => self.input.clone(),
        }
    }
    pub fn chart_options(&self) -> ChartOptions {
        let mut options = ChartOptions::default();
        if self.limiting_flux {
            options.panels = vec![
                Quantity::Sensitivity,
                Quantity::LimitingFlux,
                Quantity::SaturationLimit,
            ];
        }
        options
    }
}

/// Finds the ETC table of each mode and source type in a directory
///
/// A table pattern must match a single file.
pub fn discover<P: AsRef<Path>>(dir: P) -> Vec<(ModeKey, Result<PathBuf, FileFormatError>)> {
    let dir = glob::Pattern::escape(&dir.as_ref().to_string_lossy());
    ModeKey::catalogue()
        .into_iter()
        .map(|key| {
            let pattern = format!("{}/{}", dir, key.file_pattern());
            let matches = glob(&pattern)
                .map(|paths| {
                    let mut paths: Vec<PathBuf> = paths
                        .filter_map(|p| match p {
                            Ok(path) => Some(path),
                            Err(e) => {
                                log::warn!("skipping {:?}: {}", e.path(), e.error());
                                None
                            }
                        })
                        .collect();
                    paths.sort();
                    paths
                })
                .map_err(|source| FileFormatError::Pattern {
                    pattern: pattern.clone(),
                    source,
                });
            let file = matches.and_then(|mut paths| {
                if paths.len() == 1 {
                    Ok(paths.remove(0))
                } else {
                    Err(FileFormatError::NoSingleMatch {
                        pattern,
                        count: paths.len(),
                    })
                }
            });
            (key, file)
        })
        .collect()
}

/// Processing result of an ETC table
#[derive(Debug)]
pub enum Outcome {
    Success {
        input: String,
        outputs: Vec<PathBuf>,
        /// Configurations left out of the chart
        skipped: Vec<PlottingError>,
    },
    Failure {
        input: String,
        error: Error,
    },
}
impl Outcome {
    pub fn input(&self) -> &str {
        match self {
            Outcome::Success { input, .. } => input,
            Outcome::Failure { input, .. } => input,
        }
    }
    /// A table is successful if its chart contains all its configurations
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { skipped, .. } if skipped.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
}
impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }
    pub fn failed(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_success())
    }
    pub fn summary(&self) {
        println!("SUMMARY:");
        println!(
            " - succeeded: {}/{}",
            self.succeeded().count(),
            self.outcomes.len()
        );
        for outcome in self.succeeded() {
            if let Outcome::Success { input, outputs, .. } = outcome {
                println!("  - {}", input);
                for output in outputs {
                    println!("    -> {}", output.display());
                }
            }
        }
        println!(" - failed: {}/{}", self.failed().count(), self.outcomes.len());
        for outcome in self.failed() {
            match outcome {
                Outcome::Success {
                    input,
                    outputs,
                    skipped,
                } => {
                    println!("  - {} (partial chart)", input);
                    for output in outputs {
                        println!("    -> {}", output.display());
                    }
                    for err in skipped {
                        println!("    ! {}", error_chain(err));
                    }
                }
                Outcome::Failure { input, error } => {
                    println!("  - {}", input);
                    println!("    ! {}", error_chain(error));
                }
            }
        }
    }
}

/// Loads and plots all the ETC tables
pub fn run(config: &BatchConfig) -> BatchReport {
    let renderer = Renderer::new(&config.output).options(config.chart_options());
    let inputs: Vec<(String, Result<PathBuf, FileFormatError>)> = if config.files.is_empty() {
        let dir = config.input_dir();
        log::info!("Looking for ETC tables in {:?}", dir);
        discover(dir)
            .into_iter()
            .map(|(key, file)| (key.to_string(), file))
            .collect()
    } else {
        config
            .files
            .iter()
            .map(|file| (file.display().to_string(), Ok(file.clone())))
            .collect()
    };
    let outcomes = inputs
        .into_iter()
        .map(|(name, file)| match file {
            Ok(path) => {
                let input = path.display().to_string();
                match process(config, &renderer, &path) {
                    Ok((outputs, skipped)) => Outcome::Success {
                        input,
                        outputs,
                        skipped,
                    },
                    Err(error) => {
                        log::error!("{}: {}", input, error_chain(&error));
                        Outcome::Failure { input, error }
                    }
                }
            }
            Err(error) => {
                log::error!("{}: {}", name, error);
                Outcome::Failure {
                    input: name,
                    error: error.into(),
                }
            }
        })
        .collect();
    BatchReport { outcomes }
}

fn process(
    config: &BatchConfig,
    renderer: &Renderer,
    path: &Path,
) -> Result<(Vec<PathBuf>, Vec<PlottingError>), Error> {
    let mut loader = TableLoader::new(path);
    if let Some(arg) = &config.config {
        loader = loader.config_filter(arg.as_str());
    }
    if let Some(arg) = &config.exclude {
        loader = loader.exclude_filter(arg.as_str());
    }
    let dataset = loader.load()?;
    if config.summary {
        dataset.summary();
    }
    let rendered = renderer.render(&dataset)?;
    let mut outputs = vec![rendered.path];
    if config.csv {
        let path = renderer
            .output()
            .join(format!("{}.csv", dataset.chart_stem()));
        dataset.to_csv(&path)?;
        outputs.push(path);
    }
    Ok((outputs, rendered.skipped))
}
