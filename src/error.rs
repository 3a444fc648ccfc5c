use std::path::PathBuf;

use polars::error::PolarsError;
use thiserror::Error;

/// Errors raised while loading or interrogating the reference datasets.
///
/// Empty result states (nothing selected, no matching rows, zero total
/// surface) are not errors; they are variants of [`crate::Composition`].
#[derive(Debug, Error)]
pub enum DataError {
    /// I/O failure reading or writing a local file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network failure fetching a remote archive
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Archive is malformed or cannot be extracted
    #[error("invalid archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    /// Archive extracted cleanly but contains no .shp entry
    #[error("no .shp entry found under {0}")]
    MissingShapefile(PathBuf),

    /// Shapefile could not be opened or read
    #[error("failed to read shapefile {path}: {reason}")]
    Shapefile { path: PathBuf, reason: String },

    /// A shape is not an areal geometry
    #[error("unsupported geometry in {layer} layer: {reason}")]
    Geometry { layer: String, reason: String },

    /// A configured column is absent from the loaded attribute table
    #[error("column {column:?} not found in {layer} attribute table")]
    InvalidColumn { layer: String, column: String },

    /// Attribute-table operation failed
    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),

    /// Malformed column-configuration file
    #[error("invalid column config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}
