//! Error types for synthesis and execution.

use std::io;
use std::path::PathBuf;

/// Input the synthesizer refuses to guess about.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("multi-identifier var declarations are not supported: `{0}`")]
    MultiNameVar(String),

    #[error("cannot find a variable name in `{0}` (grouped var blocks are not supported)")]
    UnnamedVar(String),
}

/// Failures of the execution environment, as opposed to a program that ran
/// and failed.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("cannot create scratch directory: {0}")]
    Workspace(#[source] io::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}
