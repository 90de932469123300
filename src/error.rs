use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The inventory file could not be read from disk.
    #[error("cannot read inventory {path:?}: {source}")]
    InventoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The inventory is not valid YAML or is not shaped as
    /// environment -> hosts -> host -> properties.
    #[error("invalid inventory: {0}")]
    ConfigParse(#[from] serde_yaml_ng::Error),

    /// An output file could not be created or written.
    #[error("cannot write {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot render dashboard: {0}")]
    Render(#[from] minijinja::Error),

    /// The chosen environment has no `hosts` entry.
    #[error("environment not found: {0}")]
    NotFound(String),

    /// The terminal menu failed, e.g. stdin is not a tty.
    #[error("terminal menu failed: {0}")]
    Selection(#[source] io::Error),

    #[error("selection cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Persistence {
            path: path.into(),
            source,
        }
    }
}
