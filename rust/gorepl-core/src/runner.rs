//! The execution capability a REPL hands synthesized programs to.

use crate::error::RunnerError;

/// What came back from running one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Standard output followed by standard error.
    pub output: String,
    /// Whether the toolchain reported success.
    pub success: bool,
}

impl Execution {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: false,
        }
    }
}

/// Builds and runs a complete program, blocking until it exits.
pub trait Runner {
    fn execute(&mut self, source: &str) -> Result<Execution, RunnerError>;
}

impl<R: Runner + ?Sized> Runner for &mut R {
    fn execute(&mut self, source: &str) -> Result<Execution, RunnerError> {
        (**self).execute(source)
    }
}
