//! MIRI sensitivity and saturation limit charts
//!
//! The charts are drawn from the tables computed by the JWST exposure time
//! calculator (ETC). Each table is a `.npz` archive holding, for one observing
//! mode and source type, the wavelengths, sensitivities, limiting fluxes and
//! saturation limits of every instrument configuration.
//!
//! ```no_run
//! use miri_sensitivity::{Renderer, TableLoader};
//!
//! let dataset = TableLoader::new("data_files/ETC3.0/miri_imaging_sensitivity.npz")
//!     .exclude_filter("^F2550WR$")
//!     .load()?;
//! dataset.summary();
//! Renderer::new("plots").render(&dataset)?;
//! # Ok::<(), miri_sensitivity::Error>(())
//! ```

pub mod batch;
pub mod dataset;
mod error;
pub mod loader;
pub mod mode;
pub mod plot;
#[cfg(test)]
mod testing;

pub use batch::{BatchConfig, BatchReport};
pub use dataset::{ConfigurationGroup, ModeDataset, Quantity, SensitivityRecord};
pub use error::{error_chain, Error};
pub use loader::{DataShapeError, FileFormatError, TableLoader};
pub use mode::{Mode, ModeKey, SourceType};
pub use plot::{ChartOptions, ChartSpec, PlottingError, Renderer};
