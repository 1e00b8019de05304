use crate::{
    loader::{DataShapeError, FileFormatError},
    plot::PlottingError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid ETC table")]
    FileFormat(#[from] FileFormatError),
    #[error("inconsistent ETC table")]
    DataShape(#[from] DataShapeError),
    #[error("failed to plot the ETC table")]
    Plotting(#[from] PlottingError),
    #[error("failed to write the CSV table")]
    Csv(#[from] csv::Error),
    #[error("invalid configuration filter")]
    Filter(#[from] regex::Error),
}

/// Formats an error and its chain of causes on a single line
pub fn error_chain(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut current = e.source();
    while let Some(cause) = current {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        current = cause.source();
    }
    msg
}
