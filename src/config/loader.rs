//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::RelayerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Path { path: PathBuf, source: std::io::Error },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Path { path, source } => {
                write!(f, "Cannot resolve {}: {}", path.display(), source)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Path { source, .. } => Some(source),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Parse a TOML configuration without validating it.
pub fn parse_config(content: &str) -> Result<RelayerConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Read and parse a TOML file without validating it.
///
/// Used when command-line flags still have to be layered on top.
pub fn read_config(path: &Path) -> Result<RelayerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Make rewards roots absolute and run semantic validation.
///
/// Upload handlers hand the joined path to the external program, so the
/// root must not depend on the program's working directory.
pub fn finalize_config(mut config: RelayerConfig) -> Result<RelayerConfig, ConfigError> {
    for relay in &mut config.relays {
        if relay.rewards_files_path.as_os_str().is_empty() || relay.rewards_files_path.is_absolute() {
            continue;
        }
        relay.rewards_files_path = std::path::absolute(&relay.rewards_files_path).map_err(|source| {
            ConfigError::Path {
                path: relay.rewards_files_path.clone(),
                source,
            }
        })?;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_validates_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("relayer.toml");
        let content = format!(
            "[[relays]]\nname = \"watchtower\"\nsocket_path = \"{}\"\nrewards_files_path = \"{}\"\n",
            dir.path().join("relay.sock").display(),
            dir.path().display(),
        );
        fs::write(&config_path, content).unwrap();

        let config = finalize_config(read_config(&config_path).unwrap()).unwrap();
        assert_eq!(config.relays[0].rewards_files_path, dir.path());
    }

    #[test]
    fn reports_validation_failures() {
        let config = parse_config("").unwrap();
        let err = finalize_config(config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("at least one relay"));
    }

    #[test]
    fn reports_parse_failures() {
        let err = parse_config("relays = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
