use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::pin_manager::DEFAULT_FROZEN_WIDTH;

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "AIRTABLE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_source: DataSourceConfig,
    pub display: DisplayConfig,
    pub table: TableConfig,
    pub identity: IdentityConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    /// Full table URL, e.g. https://api.airtable.com/v0/<base>/<table>
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the bearer token
    pub api_key_env: String,

    /// Remove records without any non-empty field after loading
    pub drop_empty_records: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for borders and icons
    pub use_glyphs: bool,

    /// Show row numbers in the grid gutter
    pub show_row_numbers: bool,

    /// Icons for different states (can be overridden)
    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// Marks pinned columns in the pin picker
    pub pin: String,
    /// Prefixes the status line warning
    pub warning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Width assumed for a frozen column before it has been measured
    pub default_frozen_width: u32,

    /// Pin columns whose name contains "name" on first load
    pub auto_pin: bool,
}

/// Identity provider settings. Authentication itself happens elsewhere;
/// these are only checked for presence at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub provider_url: Option<String>,
    pub publishable_key: Option<String>,
}

/// The signed-in user as handed over by the identity provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory override (templates, availability, preferences, logs)
    pub data_dir: Option<PathBuf>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: "AIRTABLE_API_KEY".to_string(),
            drop_empty_records: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            pin: "📌".to_string(),
            warning: "⚠".to_string(),
        }
    }
}

impl IconConfig {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            pin: "[P]".to_string(),
            warning: "[!]".to_string(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_frozen_width: DEFAULT_FROZEN_WIDTH,
            auto_pin: true,
        }
    }
}

impl IdentityConfig {
    /// Names of the settings that are missing or blank
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.provider_url) {
            missing.push("identity.provider_url");
        }
        if blank(&self.publishable_key) {
            missing.push("identity.publishable_key");
        }
        missing
    }
}

impl Config {
    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path; a missing file is written with defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(config_path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", config_path.display()))?;

        // Apply simple mode if glyphs are disabled
        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("candidate-grid").join("config.toml"))
    }

    /// Endpoint after applying the `AIRTABLE_URL` override
    pub fn endpoint(&self) -> Option<String> {
        Self::non_blank(std::env::var(ENDPOINT_ENV).ok()).or_else(|| self.data_source.endpoint.clone())
    }

    /// Bearer token read from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        Self::non_blank(std::env::var(&self.data_source.api_key_env).ok())
    }

    fn non_blank(value: Option<String>) -> Option<String> {
        value.filter(|v| !v.trim().is_empty())
    }

    /// Directory for stores and logs: the override, else the platform data dir
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(base.join("candidate-grid"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        format!(
            r#"# candidate-grid configuration file
# Location: ~/.config/candidate-grid/config.toml (Linux)
#           ~/Library/Application Support/candidate-grid/config.toml (macOS)
#           %APPDATA%\candidate-grid\config.toml (Windows)

[data_source]
# Table endpoint. AIRTABLE_URL in the environment takes precedence.
# endpoint = "https://api.airtable.com/v0/appXXXXXXXXXXXXXX/Candidates"

# Environment variable that holds the API token
api_key_env = "AIRTABLE_API_KEY"

# Hide records where every field is empty
drop_empty_records = true

[display]
# Use Unicode glyphs for borders and icons
# Set to false for ASCII-only mode (better compatibility)
use_glyphs = true

# Show row numbers in the grid
show_row_numbers = false

# Icon configuration
# These are automatically set to ASCII when use_glyphs = false
[display.icons]
pin = "📌"
warning = "⚠"

[table]
# Width (in terminal cells) assumed for a pinned column until it is measured
default_frozen_width = {width}

# Pin every column whose name contains "name" when data first loads
auto_pin = true

[identity]
# Identity provider settings; a warning is shown while these are missing
# provider_url = "https://auth.example.com"
# publishable_key = "pk_live_..."

[session]
# Signed-in user, used for template authorship and preferences
# uid = "user_123"
# email = "jane@example.com"
# display_name = "Jane Doe"

[storage]
# Data directory (leave commented to use the platform default)
# data_dir = "/path/to/data"
"#,
            width = DEFAULT_FROZEN_WIDTH
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.display.use_glyphs);
        assert!(config.table.auto_pin);
        assert_eq!(config.table.default_frozen_width, 150);
        assert_eq!(config.data_source.api_key_env, "AIRTABLE_API_KEY");
    }

    #[test]
    fn test_simple_icons() {
        let icons = IconConfig::simple();
        assert_eq!(icons.pin, "[P]");
        assert_eq!(icons.warning, "[!]");
    }

    #[test]
    fn test_commented_default_parses() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(parsed.table.default_frozen_width, DEFAULT_FROZEN_WIDTH);
        assert!(parsed.data_source.endpoint.is_none());
        assert!(parsed.storage.data_dir.is_none());
        assert_eq!(parsed.display.icons.warning, "⚠");
    }

    #[test]
    fn test_retired_icon_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display.icons]\npin = \"*\"\nerror = \"E\"\nsuccess = \"S\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.display.icons.pin, "*");
        assert_eq!(config.display.icons.warning, "⚠");
    }

    #[test]
    fn test_missing_file_written_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert!(config.session.uid.is_none());
    }

    #[test]
    fn test_partial_file_and_ascii_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display]\nuse_glyphs = false\n\n[session]\nemail = \"a@b.c\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.display.icons.pin, "[P]");
        assert_eq!(config.display.icons.warning, "[!]");
        assert_eq!(config.session.email.as_deref(), Some("a@b.c"));
        assert!(config.table.auto_pin);
    }

    #[test]
    fn test_identity_missing_settings() {
        let mut identity = IdentityConfig::default();
        assert_eq!(
            identity.missing_settings(),
            vec!["identity.provider_url", "identity.publishable_key"]
        );
        identity.provider_url = Some("https://auth.example.com".to_string());
        identity.publishable_key = Some("  ".to_string());
        assert_eq!(identity.missing_settings(), vec!["identity.publishable_key"]);
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/tmp/cg"));
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/cg"));
    }
}
