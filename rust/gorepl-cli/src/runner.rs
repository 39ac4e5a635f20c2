//! Runs synthesized programs with the Go toolchain.

use std::process::Command;

use gorepl_core::{Execution, Runner, RunnerError};
use tracing::debug;

use crate::config::RunnerSection;

/// Name of the source file written into each scratch directory.
pub const SOURCE_FILE_NAME: &str = "main.go";

const SCRATCH_PREFIX: &str = "gorepl";

/// Writes each program into a fresh scratch directory and invokes
/// `<go> run [args] main.go` on it.
#[derive(Debug, Clone)]
pub struct GoRunner {
    go: String,
    args: Vec<String>,
}

impl GoRunner {
    pub fn new(go: impl Into<String>) -> Self {
        Self {
            go: go.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(section: &RunnerSection) -> Self {
        Self {
            go: section.go.clone(),
            args: section.args.clone(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl Default for GoRunner {
    fn default() -> Self {
        Self::new("go")
    }
}

impl Runner for GoRunner {
    fn execute(&mut self, source: &str) -> Result<Execution, RunnerError> {
        // Removed when dropped, whichever way this function returns.
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(RunnerError::Workspace)?;

        let path = scratch.path().join(SOURCE_FILE_NAME);
        std::fs::write(&path, source).map_err(|source| RunnerError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(go = %self.go, path = %path.display(), "running program");
        let output = Command::new(&self.go)
            .arg("run")
            .args(&self.args)
            .arg(&path)
            .current_dir(scratch.path())
            .output()
            .map_err(|source| RunnerError::Spawn {
                program: self.go.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!(status = %output.status, bytes = text.len(), "program finished");

        Ok(Execution {
            output: text,
            success: output.status.success(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_toolchain_is_a_spawn_error() {
        let mut runner = GoRunner::new("gorepl-definitely-not-a-toolchain");
        let err = runner.execute("package main\n").unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
        assert!(err.to_string().contains("gorepl-definitely-not-a-toolchain"));
    }

    #[test]
    fn from_config_copies_binary_and_args() {
        let section = RunnerSection {
            go: "go1.22".to_string(),
            args: vec!["-race".to_string()],
        };
        let runner = GoRunner::from_config(&section);
        assert_eq!(runner.go, "go1.22");
        assert_eq!(runner.args, vec!["-race"]);
        assert_eq!(GoRunner::default().go, "go");
    }

    #[cfg(unix)]
    mod fake_toolchain {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};

        /// A stand-in for `go` that prints its source file, or fails.
        fn install(dir: &Path, script: &str) -> PathBuf {
            let path = dir.join("fake-go");
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        /// Retry while a concurrently forked test process still holds the
        /// freshly written script open (ETXTBSY).
        fn execute(runner: &mut GoRunner, source: &str) -> Execution {
            for _ in 0..20 {
                match runner.execute(source) {
                    Err(RunnerError::Spawn { source: err, .. }) if err.raw_os_error() == Some(26) => {
                        std::thread::sleep(std::time::Duration::from_millis(25));
                    }
                    other => return other.unwrap(),
                }
            }
            panic!("fake toolchain stayed busy");
        }

        #[test]
        fn success_returns_stdout() {
            let bin = tempfile::tempdir().unwrap();
            let go = install(bin.path(), "#!/bin/sh\n[ \"$1\" = run ] || exit 2\ncat \"$2\"\n");
            let mut runner = GoRunner::new(go.display().to_string());

            let exec = execute(&mut runner, "package main // hello\n");
            assert!(exec.success);
            assert_eq!(exec.output, "package main // hello\n");
        }

        #[test]
        fn failure_returns_combined_diagnostics() {
            let bin = tempfile::tempdir().unwrap();
            let go = install(
                bin.path(),
                "#!/bin/sh\necho partial\necho './main.go:3:2: undefined: y' >&2\nexit 1\n",
            );
            let mut runner = GoRunner::new(go.display().to_string());

            let exec = execute(&mut runner, "package main\n");
            assert!(!exec.success);
            assert_eq!(exec.output, "partial\n./main.go:3:2: undefined: y\n");
        }

        #[test]
        fn extra_args_precede_source_file() {
            let bin = tempfile::tempdir().unwrap();
            let go = install(bin.path(), "#!/bin/sh\necho \"$@\" | sed 's|/.*/||'\n");
            let mut runner =
                GoRunner::new(go.display().to_string()).with_args(vec!["-race".to_string()]);

            let exec = execute(&mut runner, "package main\n");
            assert!(exec.success);
            assert_eq!(exec.output, format!("run -race {SOURCE_FILE_NAME}\n"));
        }

        #[test]
        fn scratch_directory_is_removed_after_run() {
            let bin = tempfile::tempdir().unwrap();
            let record = bin.path().join("seen");
            let script = format!(
                "#!/bin/sh\ndirname \"$2\" > '{}'\nexit 1\n",
                record.display()
            );
            let go = install(bin.path(), &script);
            let mut runner = GoRunner::new(go.display().to_string());

            let exec = execute(&mut runner, "package main\n");
            assert!(!exec.success);
            let scratch = std::fs::read_to_string(&record).unwrap();
            assert!(!Path::new(scratch.trim()).exists());
        }
    }
}
