// Driver tree settings
// Loaded from ~/.config/drivertree/settings.json, or an explicit TOML file

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // History
    #[serde(rename = "history.limit")]
    pub history_limit: usize,

    // Ripple emphasis
    #[serde(rename = "ripple.staggerMs")]
    pub ripple_stagger_ms: u64,

    #[serde(rename = "ripple.clearAfterMs")]
    pub ripple_clear_after_ms: u64,

    // Formatting
    #[serde(rename = "format.currencySymbol")]
    pub currency_symbol: String,

    #[serde(rename = "format.currencyDecimals")]
    pub currency_decimals: u8,

    #[serde(rename = "format.percentDecimals")]
    pub percent_decimals: u8,

    #[serde(rename = "format.countDecimals")]
    pub count_decimals: u8,

    // Logging (tracing EnvFilter directive)
    #[serde(rename = "log.filter")]
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // History
            history_limit: 50,
            // Ripple
            ripple_stagger_ms: 80,
            ripple_clear_after_ms: 1200,
            // Formatting
            currency_symbol: "$".to_string(),
            currency_decimals: 0,
            percent_decimals: 1,
            count_decimals: 0,
            // Logging
            log_filter: "warn".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    /// File could not be read or written.
    Io(String),
    /// JSON or TOML parse error.
    Parse(String),
    /// A value outside its allowed range.
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "settings IO error: {msg}"),
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Invalid(msg) => write!(f, "invalid setting: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

// TOML files use nested tables instead of dotted JSON keys:
//
//   [history]
//   limit = 50
//
//   [ripple]
//   stagger_ms = 80

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlSettings {
    history: TomlHistory,
    ripple: TomlRipple,
    format: TomlFormat,
    log: TomlLog,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlHistory {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlRipple {
    stagger_ms: Option<u64>,
    clear_after_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlFormat {
    currency_symbol: Option<String>,
    currency_decimals: Option<u8>,
    percent_decimals: Option<u8>,
    count_decimals: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlLog {
    filter: Option<String>,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("drivertree")
            .join("settings.json")
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a JSON file, falling back to defaults.
    ///
    /// A missing file is not an error. Lines starting with `//` are comments.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), "error reading settings: {e}");
                return Self::default();
            }
        };

        match Self::from_json_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), "{e}, using defaults");
                Self::default()
            }
        }
    }

    /// Parse JSON settings, stripping `//` comment lines.
    pub fn from_json_str(contents: &str) -> Result<Self, SettingsError> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let settings: Self =
            serde_json::from_str(&cleaned).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse TOML settings. Keys not present keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let raw: TomlSettings =
            toml::from_str(contents).map_err(|e| SettingsError::Parse(e.to_string()))?;

        let mut settings = Self::default();
        if let Some(v) = raw.history.limit {
            settings.history_limit = v;
        }
        if let Some(v) = raw.ripple.stagger_ms {
            settings.ripple_stagger_ms = v;
        }
        if let Some(v) = raw.ripple.clear_after_ms {
            settings.ripple_clear_after_ms = v;
        }
        if let Some(v) = raw.format.currency_symbol {
            settings.currency_symbol = v;
        }
        if let Some(v) = raw.format.currency_decimals {
            settings.currency_decimals = v;
        }
        if let Some(v) = raw.format.percent_decimals {
            settings.percent_decimals = v;
        }
        if let Some(v) = raw.format.count_decimals {
            settings.count_decimals = v;
        }
        if let Some(v) = raw.log.filter {
            settings.log_filter = v;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Read a TOML settings file.
    pub fn load_toml(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Save current settings to the default path
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))?;
        fs::write(path, json).map_err(|e| SettingsError::Io(e.to_string()))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.history_limit == 0 {
            return Err(SettingsError::Invalid("history.limit must be at least 1".to_string()));
        }
        for (key, decimals) in [
            ("format.currencyDecimals", self.currency_decimals),
            ("format.percentDecimals", self.percent_decimals),
            ("format.countDecimals", self.count_decimals),
        ] {
            if decimals > 6 {
                return Err(SettingsError::Invalid(format!("{key} must be 0-6, got {decimals}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.history_limit, 50);
        assert_eq!(settings.ripple_stagger_ms, 80);
        assert_eq!(settings.currency_symbol, "$");
    }

    #[test]
    fn test_json_with_comments_and_partial_keys() {
        let json = r#"{
    // History
    "history.limit": 20,
    "format.currencySymbol": "€"
}"#;
        let settings = Settings::from_json_str(json).unwrap();
        assert_eq!(settings.history_limit, 20);
        assert_eq!(settings.currency_symbol, "€");
        assert_eq!(settings.ripple_clear_after_ms, 1200);
    }

    #[test]
    fn test_toml_tables() {
        let toml = r#"
[history]
limit = 10

[ripple]
stagger_ms = 40

[log]
filter = "drivertree=debug"
"#;
        let settings = Settings::from_toml_str(toml).unwrap();
        assert_eq!(settings.history_limit, 10);
        assert_eq!(settings.ripple_stagger_ms, 40);
        assert_eq!(settings.ripple_clear_after_ms, 1200);
        assert_eq!(settings.log_filter, "drivertree=debug");
    }

    #[test]
    fn test_toml_unknown_key_rejected() {
        let err = Settings::from_toml_str("[history]\nlimt = 3\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_zero_history_limit_rejected() {
        let err = Settings::from_json_str(r#"{"history.limit": 0}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings { history_limit: 7, ..Settings::default() };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_unparseable_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
