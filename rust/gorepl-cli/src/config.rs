//! Configuration file parsing for `gorepl.toml`.
//!
//! Searches current directory then ancestors, falling back to
//! `~/.config/gorepl/gorepl.toml` if no project-level file is found.

use std::path::{Path, PathBuf};

use gorepl_core::{CompletenessRule, ImportMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// File name looked up in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = "gorepl.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct GoreplConfig {
    #[serde(default)]
    pub runner: RunnerSection,
    #[serde(default)]
    pub repl: ReplSection,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerSection {
    /// Toolchain binary invoked as `<go> run <file>`.
    pub go: String,
    /// Extra arguments placed between `run` and the source file.
    pub args: Vec<String>,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            go: "go".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReplSection {
    pub completeness: CompletenessRule,
    pub imports: ImportMode,
    /// Drop a fragment from its store when running it failed.
    pub rollback_on_failure: bool,
    /// Persist line-editor history between runs.
    pub history: bool,
    pub color: bool,
}

impl Default for ReplSection {
    fn default() -> Self {
        Self {
            completeness: CompletenessRule::default(),
            imports: ImportMode::default(),
            rollback_on_failure: false,
            history: true,
            color: true,
        }
    }
}

impl GoreplConfig {
    /// Load config from `gorepl.toml`, searching current dir then parents.
    /// Returns `Default` when no file is found; a broken file is reported
    /// and ignored.
    pub fn load() -> Self {
        match Self::find() {
            Some(path) => match Self::load_from(&path) {
                Ok(cfg) => {
                    debug!(path = %path.display(), "loaded config");
                    cfg
                }
                Err(err) => {
                    warn!("{}; using defaults", err);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn find() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok();
        find_config(cwd.as_deref(), dirs::home_dir().as_deref())
    }
}

/// First `gorepl.toml` in `start` or its ancestors, else the global one
/// under `home`.
fn find_config(start: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(start) = start {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    let global = home?.join(".config").join("gorepl").join(CONFIG_FILE_NAME);
    global.is_file().then_some(global)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: GoreplConfig = toml::from_str("").expect("should parse");
        assert_eq!(cfg, GoreplConfig::default());
        assert_eq!(cfg.runner.go, "go");
        assert!(cfg.repl.history);
        assert!(!cfg.repl.rollback_on_failure);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[runner]
go = "/usr/local/go/bin/go"
args = ["-race"]

[repl]
completeness = "simple"
imports = "fixed"
rollback_on_failure = true
history = false
color = false
"#;
        let cfg: GoreplConfig = toml::from_str(toml_str).expect("should parse");
        assert_eq!(cfg.runner.go, "/usr/local/go/bin/go");
        assert_eq!(cfg.runner.args, vec!["-race"]);
        assert_eq!(cfg.repl.completeness, CompletenessRule::Simple);
        assert_eq!(cfg.repl.imports, ImportMode::Fixed);
        assert!(cfg.repl.rollback_on_failure);
        assert!(!cfg.repl.history);
        assert!(!cfg.repl.color);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: GoreplConfig = toml::from_str("[repl]\nimports = \"fixed\"\n").unwrap();
        assert_eq!(cfg.repl.imports, ImportMode::Fixed);
        assert_eq!(cfg.repl.completeness, CompletenessRule::Structural);
        assert!(cfg.repl.color);
        assert_eq!(cfg.runner, RunnerSection::default());
    }

    #[test]
    fn unknown_rule_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[repl]\ncompleteness = \"psychic\"\n").unwrap();
        let err = GoreplConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("invalid toml"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GoreplConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn finds_config_in_ancestor_before_global() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(CONFIG_FILE_NAME), "").unwrap();

        let home = tempfile::tempdir().unwrap();
        let global_dir = home.path().join(".config").join("gorepl");
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(global_dir.join(CONFIG_FILE_NAME), "").unwrap();

        assert_eq!(
            find_config(Some(&nested), Some(home.path())),
            Some(root.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn falls_back_to_global_config() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        assert_eq!(find_config(Some(cwd.path()), Some(home.path())), None);

        let global_dir = home.path().join(".config").join("gorepl");
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(global_dir.join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            find_config(Some(cwd.path()), Some(home.path())),
            Some(global_dir.join(CONFIG_FILE_NAME))
        );
    }
}
