mod logging;
mod run;

use std::fmt;
use std::path::PathBuf;

pub use logging::init_run_logging;
pub use run::{RunContext, start_run, write_report};

use thiserror::Error;

/// Files a run directory holds besides the exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Config,
    Logs,
    Report,
}

impl Artifact {
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Config => "config.json",
            Artifact::Logs => "logs.ndjson",
            Artifact::Report => "generation_report.json",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Failures while laying out a run directory and its artifacts.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot create run directory {path}: {source}")]
    RunDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {artifact} at {path}: {source}")]
    Write {
        artifact: Artifact,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot serialize {artifact}: {source}")]
    Serialize {
        artifact: Artifact,
        source: serde_json::Error,
    },
    #[error("cannot install log subscriber: {0}")]
    Logging(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
