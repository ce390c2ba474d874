//! CLI configuration loaded from `sparam.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use sparam_format::DataType;

/// Defaults applied when a command-line flag is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Shared parameter file used when `--file` is not given.
    pub default_file: Option<PathBuf>,
    /// Data type token for `add-param` (TEXT when unset).
    pub default_data_type: Option<String>,
    /// Group id or name for `add-param`.
    pub default_group: Option<String>,
    /// Write generated GUIDs in upper case.
    pub uppercase_guids: bool,
}

impl CliConfig {
    pub const FILE_NAME: &'static str = "sparam.toml";
    pub const ENV_VAR: &'static str = "SPARAM_CONFIG";

    /// Load the config from, in order: an explicit path, `$SPARAM_CONFIG`,
    /// or `sparam.toml` in the working directory. Falls back to defaults
    /// when none of these exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(Self::ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        let local = Path::new(Self::FILE_NAME);
        if local.exists() {
            return Self::from_file(local);
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if let Some(token) = &config.default_data_type {
            token
                .parse::<DataType>()
                .map_err(|e| anyhow::anyhow!("default_data_type: {}", e))?;
        }
        Ok(config)
    }

    pub fn data_type(&self) -> Result<DataType> {
        match &self.default_data_type {
            Some(token) => token.parse().map_err(|e| anyhow::anyhow!("default_data_type: {}", e)),
            None => Ok(DataType::Text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::from_toml("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.data_type().unwrap(), DataType::Text);
    }

    #[test]
    fn test_full_config() {
        let config = CliConfig::from_toml(
            r#"
default_file = "content/SharedParameters.txt"
default_data_type = "LENGTH"
default_group = "Data"
uppercase_guids = true
"#,
        )
        .unwrap();

        assert_eq!(config.default_file, Some(PathBuf::from("content/SharedParameters.txt")));
        assert_eq!(config.data_type().unwrap(), DataType::Length);
        assert_eq!(config.default_group.as_deref(), Some("Data"));
        assert!(config.uppercase_guids);
    }

    #[test]
    fn test_bad_data_type_is_rejected() {
        assert!(CliConfig::from_toml("default_data_type = \"\"").is_err());
        assert!(CliConfig::from_toml("uppercase_guids = \"yes\"").is_err());
    }

    #[test]
    fn test_explicit_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CliConfig::FILE_NAME);
        fs::write(&path, "default_group = \"2\"\n").unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.default_group.as_deref(), Some("2"));

        assert!(CliConfig::load(Some(&temp.path().join("missing.toml"))).is_err());
    }
}
