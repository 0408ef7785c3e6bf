use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// Failure to bring a dataset into memory.  Always fatal: every dataset is
/// loaded before the window opens.
#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("dataset '{name}': file not found: {}", path.display())]
    Missing { name: String, path: PathBuf },

    #[error("dataset '{name}': cannot read {}: {reason}", path.display())]
    Unreadable {
        name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("dataset '{name}': no '{key}' table in its uns store")]
    MissingKey { name: String, key: String },

    #[error("configuration file {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

// ---------------------------------------------------------------------------
// Per-click errors
// ---------------------------------------------------------------------------

/// Failure while producing a figure.  Shown as a status line; the next click
/// starts from a clean slate.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),

    #[error("dataset '{dataset}' has no '{key}' table to plot")]
    MissingTable { dataset: String, key: String },

    #[error("'{0}' is not a numeric interaction column")]
    UnknownField(String),

    #[error("figure of {width}x{height} px exceeds the raster limit")]
    FigureTooLarge { width: u32, height: u32 },

    #[error("temporary figure file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("encoding figure: {0}")]
    Encode(#[from] image::ImageError),
}
