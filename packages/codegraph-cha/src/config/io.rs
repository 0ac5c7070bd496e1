//! Configuration I/O (YAML loading and export)
//!
//! Files carry a schema version so that future layouts can migrate.

use super::cha_config::ChaConfig;
use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Versions this crate can read
pub const SUPPORTED_VERSIONS: &[u64] = &[1];

const ROOT_FIELDS: &[&str] = &["version", "cha"];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u64,

    #[serde(default)]
    pub cha: ChaConfig,
}

impl ChaConfig {
    /// Load from a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        let root = match value {
            Value::Mapping(root) => root,
            Value::Null => return Err(ConfigError::MissingVersion),
            other => {
                return Err(ConfigError::Validation(format!(
                    "expected a mapping at the top level, found {:?}",
                    other
                )))
            }
        };

        check_version(&root)?;
        check_fields(&root, "root", ROOT_FIELDS)?;
        if let Some(Value::Mapping(section)) = root.get("cha") {
            check_fields(section, "cha", ChaConfig::FIELDS)?;
        }

        let file: ConfigFileV1 = serde_yaml::from_value(Value::Mapping(root))?;
        file.cha.validate()?;
        Ok(file.cha)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as a v1 YAML document
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: 1,
            cha: self.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

fn check_version(root: &Mapping) -> ConfigResult<()> {
    let version = root.get("version").ok_or(ConfigError::MissingVersion)?;
    match version.as_u64() {
        Some(v) if SUPPORTED_VERSIONS.contains(&v) => Ok(()),
        Some(v) => Err(ConfigError::UnsupportedVersion {
            found: v,
            supported: SUPPORTED_VERSIONS.to_vec(),
        }),
        None => Err(ConfigError::Validation(
            "'version' must be a positive integer".to_string(),
        )),
    }
}

fn check_fields(section: &Mapping, name: &str, valid: &[&str]) -> ConfigResult<()> {
    for key in section.keys() {
        let key = key.as_str().unwrap_or_default();
        if !valid.contains(&key) {
            return Err(ConfigError::unknown_field_with_suggestion(key, name, valid));
        }
    }
    Ok(())
}
