use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

fn default_true() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Where the storage slots live; defaults to ~/.userdesk when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Show stored passwords in the dashboard table instead of masking them
    #[serde(default)]
    pub show_password: bool,
    /// Keep readline history across sessions
    #[serde(default = "default_true")]
    pub history: bool,
    /// strftime format for the Created column
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            show_password: false,
            history: default_true(),
            date_format: default_date_format(),
        }
    }
}

impl Config {
    /// Load configuration from default paths.
    /// Priority: project (./.userdesk/config.toml) > user (~/.userdesk/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".userdesk").join("config.toml");
            if user_config.exists() {
                let user = Self::load_from(&user_config)?;
                config.merge(user);
            }
        }

        let project_config = Path::new(".userdesk").join("config.toml");
        if project_config.exists() {
            let project = Self::load_from(&project_config)?;
            config.merge(project);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.show_password {
            self.show_password = true;
        }
        if !other.history {
            self.history = false;
        }
        if other.date_format != default_date_format() {
            self.date_format = other.date_format;
        }
    }

    /// Resolve the data directory: config value, or ~/.userdesk
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        match dirs::home_dir() {
            Some(home) => home.join(".userdesk"),
            None => PathBuf::from(".userdesk"),
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: "data_dir".to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }

        // Reject strftime strings chrono cannot render
        let parsed: std::result::Result<Vec<_>, _> =
            chrono::format::StrftimeItems::new(&self.date_format).parse();
        if parsed.is_err() {
            errors.push(ValidationError {
                field: "date_format".to_string(),
                message: format!("Invalid strftime format '{}'", self.date_format),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.data_dir.is_none());
        assert!(!config.show_password);
        assert!(config.history);
        assert_eq!(config.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data_dir = \"/tmp/accounts\"\nshow_password = true\ndate_format = \"%d.%m.%Y\""
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/accounts")));
        assert!(config.show_password);
        assert_eq!(config.date_format, "%d.%m.%Y");
        assert!(config.history); // untouched default
    }

    #[test]
    fn test_merge_other_takes_priority() {
        let mut base = Config::default();
        let other = Config {
            data_dir: Some(PathBuf::from("/override")),
            show_password: true,
            history: false,
            date_format: "%d %b %Y".to_string(),
        };
        base.merge(other);
        assert_eq!(base.data_dir, Some(PathBuf::from("/override")));
        assert!(base.show_password);
        assert!(!base.history);
        assert_eq!(base.date_format, "%d %b %Y");
    }

    #[test]
    fn test_merge_keeps_base_when_other_is_default() {
        let mut base = Config {
            data_dir: Some(PathBuf::from("/kept")),
            show_password: true,
            history: true,
            date_format: "%d.%m.%Y".to_string(),
        };
        base.merge(Config::default());
        assert_eq!(base.data_dir, Some(PathBuf::from("/kept")));
        assert!(base.show_password);
        assert_eq!(base.date_format, "%d.%m.%Y");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::new()),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("data_dir"));
    }

    #[test]
    fn test_validate_bad_date_format() {
        let config = Config {
            date_format: "%Q".to_string(),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("date_format"));
    }

    #[test]
    fn test_resolve_data_dir_prefers_config_value() {
        let config = Config {
            data_dir: Some(PathBuf::from("/explicit")),
            ..Default::default()
        };
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/explicit"));
    }
}
