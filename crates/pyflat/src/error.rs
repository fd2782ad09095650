//! Error types for a bundling run
//!
//! Configuration errors are reported and end the run before anything is
//! touched. Everything else is fatal: a partially collected dependency graph
//! cannot produce a trustworthy bundle.

use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("entry file `{}` does not exist", .0.display())]
    MissingEntry(PathBuf),

    #[error("output directory `{}` does not exist", .0.display())]
    MissingOutputDir(PathBuf),

    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse `{}`: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Prune(#[from] PruneError),
}

impl BundleError {
    /// Whether the run should end quietly instead of failing the process
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MissingEntry(_) | Self::MissingOutputDir(_))
    }
}

#[derive(Error, Debug)]
pub enum PruneError {
    #[error("no such file: `{}`", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to run `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` failed to process `{}` ({status})", path.display())]
    Failed {
        program: String,
        path: PathBuf,
        status: ExitStatus,
    },
}
