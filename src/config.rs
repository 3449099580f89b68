use crate::parser::MissingFieldPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings loaded from an optional TOML file passed with `--config`.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub parser: ParserConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    pub policy: MissingFieldPolicy,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Apply command-line flags on top of file values. Flags only ever
    /// switch a behavior on.
    pub fn with_overrides(mut self, strict: bool, pretty: bool) -> Self {
        if strict {
            self.parser.policy = MissingFieldPolicy::Strict;
        }
        if pretty {
            self.output.pretty = true;
        }
        self
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read settings {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid settings in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_no_path_gives_defaults() {
        let s = Settings::load(None).unwrap();
        assert_eq!(s.parser.policy, MissingFieldPolicy::Lenient);
        assert!(!s.output.pretty);
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ccache2json.toml");
        std::fs::write(
            &path,
            "[parser]\npolicy = \"strict\"\n\n[output]\npretty = true\n",
        )
        .unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.parser.policy, MissingFieldPolicy::Strict);
        assert!(s.output.pretty);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ccache2json.toml");
        std::fs::write(&path, "[output]\npretty = true\n").unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.parser.policy, MissingFieldPolicy::Lenient);
        assert!(s.output.pretty);
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ccache2json.toml");
        std::fs::write(&path, "[parser]\npolicy = \"sloppy\"\n").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_flags_override_file() {
        let s = Settings::default().with_overrides(true, true);
        assert_eq!(s.parser.policy, MissingFieldPolicy::Strict);
        assert!(s.output.pretty);

        let s = Settings::default().with_overrides(false, false);
        assert_eq!(s, Settings::default());
    }
}
