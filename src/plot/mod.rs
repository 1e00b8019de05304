//! Sensitivity charts
//!
//! A chart is made of vertically stacked panels sharing the wavelength axis,
//! one panel per tabulated quantity and one line per configuration.
//! The chart is first described by a [ChartSpec] and then drawn into a SVG file.

use crate::dataset::{ModeDataset, Quantity};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

mod render;

#[derive(thiserror::Error, Debug)]
pub enum PlottingError {
    #[error("{dataset} has no configuration to plot")]
    NoGroups { dataset: String },
    #[error("configuration {configuration:?} of {dataset} has {points} point(s), a line needs at least 2")]
    TooFewPoints {
        dataset: String,
        configuration: String,
        points: usize,
    },
    #[error("none of the configurations of {dataset} can be drawn")]
    NothingToDraw { dataset: String },
    #[error("{axis} axis of {dataset} spans {range:?}, beyond the floating point range")]
    InvalidRange {
        dataset: String,
        axis: String,
        range: (f64, f64),
    },
    #[error("failed to create the output directory {path:?}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to draw {path:?}: {message}")]
    Draw { path: PathBuf, message: String },
}

/// Line of a configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: (u8, u8, u8),
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub quantity: Quantity,
    pub y_range: (f64, f64),
    pub log_scale: bool,
    pub series: Vec<Series>,
}

/// Everything needed to draw the chart of a dataset
#[derive(Debug)]
pub struct ChartSpec {
    pub title: String,
    pub file_stem: String,
    pub x_range: (f64, f64),
    pub panels: Vec<PanelSpec>,
    /// Configurations that cannot be drawn
    pub skipped: Vec<PlottingError>,
}
impl ChartSpec {
    /// Builds the chart of a dataset
    ///
    /// Configurations are drawn in label order; those with less than 2 points
    /// are skipped and reported in [ChartSpec::skipped].
    pub fn new(dataset: &ModeDataset, panels: &[Quantity]) -> Result<Self, PlottingError> {
        if dataset.is_empty() {
            return Err(PlottingError::NoGroups {
                dataset: dataset.name().to_string(),
            });
        }
        let mut skipped = vec![];
        let groups: Vec<_> = dataset
            .groups()
            .filter(|group| {
                if group.len() < 2 {
                    skipped.push(PlottingError::TooFewPoints {
                        dataset: dataset.name().to_string(),
                        configuration: group.label().to_string(),
                        points: group.len(),
                    });
                    false
                } else {
                    true
                }
            })
            .collect();
        if groups.is_empty() {
            for err in &skipped {
                log::warn!("{}", err);
            }
            return Err(PlottingError::NothingToDraw {
                dataset: dataset.name().to_string(),
            });
        }

        let wavelengths: Vec<f64> = groups.iter().flat_map(|g| g.wavelengths()).collect();
        let x_range = padded_range(&wavelengths, 0.02);
        check_range(dataset, "Wavelength", x_range, false)?;

        let mut colors = colorous::TABLEAU10.iter().cycle();
        let colors: Vec<(u8, u8, u8)> = groups
            .iter()
            .filter_map(|_| colors.next().map(|c| (c.r, c.g, c.b)))
            .collect();

        let panels = panels
            .iter()
            .map(|&quantity| {
                let series: Vec<Series> = groups
                    .iter()
                    .zip(&colors)
                    .map(|(group, &color)| Series {
                        label: group.label().to_string(),
                        color,
                        points: group
                            .series(quantity)
                            .into_iter()
                            .filter(|(_, y)| y.is_finite())
                            .collect(),
                    })
                    .collect();
                let values: Vec<f64> = series
                    .iter()
                    .flat_map(|s| s.points.iter().map(|(_, y)| *y))
                    .collect();
                let log_scale = !values.is_empty() && values.iter().all(|&y| y > 0.);
                let y_range = if log_scale {
                    log_range(&values)
                } else {
                    padded_range(&values, 0.1)
                };
                check_range(dataset, &quantity.to_string(), y_range, log_scale)?;
                Ok(PanelSpec {
                    quantity,
                    y_range,
                    log_scale,
                    series,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: dataset.title(),
            file_stem: dataset.chart_stem(),
            x_range,
            panels,
            skipped,
        })
    }
    pub fn file_name(&self) -> String {
        format!("{}.svg", self.file_stem)
    }
}

/// Axis ranges must have finite bounds and span, and be positive on a log scale
fn check_range(
    dataset: &ModeDataset,
    axis: &str,
    range: (f64, f64),
    log_scale: bool,
) -> Result<(), PlottingError> {
    let (lo, hi) = range;
    if (hi - lo).is_finite() && lo.is_finite() && hi.is_finite() && (!log_scale || lo > 0.) {
        Ok(())
    } else {
        Err(PlottingError::InvalidRange {
            dataset: dataset.name().to_string(),
            axis: axis.to_string(),
            range,
        })
    }
}

fn min_max(x: &[f64]) -> (f64, f64) {
    x.iter()
        .cloned()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), x| {
            (a.min(x), b.max(x))
        })
}
/// [min,max] range widened by `padding` times its span
fn padded_range(x: &[f64], padding: f64) -> (f64, f64) {
    if x.is_empty() {
        return (0., 1.);
    }
    let (lo, hi) = min_max(x);
    let span = hi - lo;
    if span > 0. {
        (lo - span * padding, hi + span * padding)
    } else {
        let half = if lo != 0. { lo.abs() * 0.1 } else { 1. };
        (lo - half, hi + half)
    }
}
/// [min,max] range of strictly positive values widened by a factor 1.5
fn log_range(x: &[f64]) -> (f64, f64) {
    let (lo, hi) = min_max(x);
    (lo / 1.5, hi * 1.5)
}

/// Panels of the chart, sensitivity and saturation limit by default
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub panels: Vec<Quantity>,
    /// panel size in pixels
    pub panel_size: (u32, u32),
}
impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            panels: vec![Quantity::Sensitivity, Quantity::SaturationLimit],
            panel_size: (768, 384),
        }
    }
}

/// Chart written by the [Renderer]
#[derive(Debug)]
pub struct Rendered {
    pub path: PathBuf,
    /// Configurations left out of the chart
    pub skipped: Vec<PlottingError>,
}

/// Draws the charts into the output directory
pub struct Renderer {
    output: PathBuf,
    options: ChartOptions,
}
impl Renderer {
    pub fn new<P: AsRef<Path>>(output: P) -> Self {
        Self {
            output: output.as_ref().to_path_buf(),
            options: Default::default(),
        }
    }
    pub fn options(self, options: ChartOptions) -> Self {
        Self { options, ..self }
    }
    pub fn output(&self) -> &Path {
        &self.output
    }
    pub fn render(&self, dataset: &ModeDataset) -> Result<Rendered, PlottingError> {
        let spec = ChartSpec::new(dataset, &self.options.panels)?;
        for err in &spec.skipped {
            log::warn!("{}", err);
        }
        fs::create_dir_all(&self.output).map_err(|source| PlottingError::Output {
            path: self.output.clone(),
            source,
        })?;
        let path = self.output.join(spec.file_name());
        render::draw(&spec, &path, self.options.panel_size)?;
        log::info!(" - {} -> {:?}", dataset.name(), path);
        Ok(Rendered {
            path,
            skipped: spec.skipped,
        })
    }
}
