use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, ConfigError};

/// Format used by the SGU portal for semester start dates.
pub const SEMESTER_DATE_FORMAT: &str = "%d/%m/%Y";

/// Google caps popup reminders at four weeks.
const MAX_REMINDER_MINUTES: u32 = 40_320;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml, credentials and the stored token
    #[serde(default)]
    pub config_dir: PathBuf,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub google: GoogleConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub sgu: SguConfig,

    #[serde(default)]
    pub huflit: HuflitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar name used when the user does not type one
    pub default_name: String,

    /// IANA time zone attached to the calendar and every event
    pub time_zone: String,

    /// Popup reminder before each class, in minutes
    pub reminder_minutes: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_name: "School Schedule".to_string(),
            time_zone: "Asia/Ho_Chi_Minh".to_string(),
            reminder_minutes: 30,
        }
    }
}

/// Google OAuth desktop-app settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleConfig {
    /// Client secrets JSON downloaded from the Google Cloud console.
    /// Relative paths resolve against `config_dir`.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Where the OAuth token is persisted. Relative paths resolve against `config_dir`.
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// Local port for the OAuth redirect; 0 picks a free one
    #[serde(default)]
    pub callback_port: u16,

    /// Overrides the client id from the credentials file
    #[serde(default)]
    pub client_id: Option<String>,

    /// Overrides the client secret from the credentials file
    #[serde(default)]
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SguConfig {
    pub base_url: String,

    /// First Monday of each semester, keyed by the portal's semester code
    #[serde(default = "default_semester_starts")]
    pub semester_starts: BTreeMap<String, String>,
}

impl Default for SguConfig {
    fn default() -> Self {
        Self {
            base_url: "http://thongtindaotao.sgu.edu.vn".to_string(),
            semester_starts: default_semester_starts(),
        }
    }
}

impl SguConfig {
    /// Parsed start date for a semester code, if one is known.
    pub fn semester_start(&self, semester: &str) -> Option<NaiveDate> {
        self.semester_starts
            .get(semester)
            .and_then(|s| NaiveDate::parse_from_str(s, SEMESTER_DATE_FORMAT).ok())
    }
}

fn default_semester_starts() -> BTreeMap<String, String> {
    [
        ("20211", "13/09/2021"),
        ("20212", "14/02/2022"),
        ("20221", "05/09/2022"),
        ("20222", "06/02/2023"),
        ("20223", "26/06/2023"),
        ("20231", "04/09/2023"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuflitConfig {
    pub base_url: String,
}

impl Default for HuflitConfig {
    fn default() -> Self {
        Self {
            base_url: "https://portal.huflit.edu.vn".to_string(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sched2cal")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            calendar: CalendarConfig::default(),
            google: GoogleConfig::default(),
            http: HttpConfig::default(),
            sgu: SguConfig::default(),
            huflit: HuflitConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit file, creating it if missing
    ///
    /// Without a `config_dir` setting, the directory holding `path` is used.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self {
                config_dir: Self::directory_of(path),
                ..Self::default()
            };
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;
        if config.config_dir.as_os_str().is_empty() {
            config.config_dir = Self::directory_of(path);
        }

        Ok(config)
    }

    fn directory_of(path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors abort.
    pub fn load_validated(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            let error = ConfigError::Invalid(validation.error_summary());
            return Err(AppError::Config(error).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_url(&self.sgu.base_url, "sgu.base_url", &mut result);
        Self::validate_url(&self.huflit.base_url, "huflit.base_url", &mut result);

        if self.calendar.default_name.trim().is_empty() {
            result.add_error("calendar.default_name", "Calendar name cannot be blank");
        }

        if self.calendar.time_zone.trim().is_empty() {
            result.add_error("calendar.time_zone", "Time zone cannot be blank");
        }

        if self.calendar.reminder_minutes > MAX_REMINDER_MINUTES {
            result.add_error(
                "calendar.reminder_minutes",
                format!("Reminder cannot exceed {} minutes", MAX_REMINDER_MINUTES),
            );
        }

        if self.http.timeout_secs == 0 {
            result.add_error("http.timeout_secs", "Timeout must be greater than 0");
        }

        if self.http.max_retries > 10 {
            result.add_warning("http.max_retries", "More than 10 retries is unusually high");
        }

        for (semester, date) in &self.sgu.semester_starts {
            if NaiveDate::parse_from_str(date, SEMESTER_DATE_FORMAT).is_err() {
                result.add_error(
                    format!("sgu.semester_starts.{}", semester),
                    format!("Expected dd/mm/yyyy, got: {}", date),
                );
            }
        }

        if !self.credentials_path().exists()
            && (self.google.client_id.is_none() || self.google.client_secret.is_none())
        {
            result.add_warning(
                "google.credentials_path",
                format!(
                    "Google client secrets not found at {}",
                    self.credentials_path().display()
                ),
            );
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolved path of the Google client secrets file
    pub fn credentials_path(&self) -> PathBuf {
        self.resolve(self.google.credentials_path.as_deref(), "credentials.json")
    }

    /// Resolved path of the stored Google token
    pub fn token_path(&self) -> PathBuf {
        self.resolve(self.google.token_path.as_deref(), "token.json")
    }

    fn resolve(&self, configured: Option<&Path>, default_name: &str) -> PathBuf {
        match configured {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.config_dir.join(p),
            None => self.config_dir.join(default_name),
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("sched2cal");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.sgu.base_url = "ftp://thongtindaotao.sgu.edu.vn".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.huflit.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "huflit.base_url"));
    }

    #[test]
    fn test_bad_semester_start_is_error() {
        let mut config = Config::default();
        config
            .sgu
            .semester_starts
            .insert("20241".to_string(), "2024-09-02".to_string());
        let result = config.validate();
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "sgu.semester_starts.20241"));
    }

    #[test]
    fn test_reminder_cap() {
        let mut config = Config::default();
        config.calendar.reminder_minutes = 50_000;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_missing_credentials_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            config_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "google.credentials_path"));
    }

    #[test]
    fn test_semester_start_lookup() {
        let config = SguConfig::default();
        assert_eq!(
            config.semester_start("20231"),
            NaiveDate::from_ymd_opt(2023, 9, 4)
        );
        assert_eq!(config.semester_start("19991"), None);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.config_dir, dir.path());
        assert_eq!(config.calendar.reminder_minutes, 30);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.calendar.default_name, config.calendar.default_name);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "config_dir = \"/tmp/s2c\"\n[calendar]\ndefault_name = \"HK1\"\ntime_zone = \"UTC\"\nreminder_minutes = 10\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.calendar.default_name, "HK1");
        assert_eq!(config.http.max_retries, 3);
        assert!(config.sgu.semester_starts.contains_key("20221"));
    }

    #[test]
    fn test_hand_written_file_keeps_secrets_beside_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[calendar]\ndefault_name = \"HK1\"\ntime_zone = \"UTC\"\nreminder_minutes = 10\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.config_dir, dir.path());
        assert_eq!(config.credentials_path(), dir.path().join("credentials.json"));
        assert_eq!(config.token_path(), dir.path().join("token.json"));
    }

    #[test]
    fn test_explicit_config_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_dir = \"/etc/s2c\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.config_dir, PathBuf::from("/etc/s2c"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\ntimeout_secs = 0\nmax_retries = 3\n").unwrap();

        let err = Config::load_validated(Some(&path)).unwrap_err();
        match err.downcast_ref::<AppError>() {
            Some(AppError::Config(ConfigError::Invalid(summary))) => {
                assert!(summary.contains("http.timeout_secs"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let mut config = Config {
            config_dir: PathBuf::from("/etc/s2c"),
            ..Config::default()
        };
        assert_eq!(config.token_path(), PathBuf::from("/etc/s2c/token.json"));

        config.google.credentials_path = Some(PathBuf::from("secrets/client.json"));
        assert_eq!(
            config.credentials_path(),
            PathBuf::from("/etc/s2c/secrets/client.json")
        );
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
