use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Config file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cliptrim.toml";

/// Errors produced while loading the application config.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config {} ({source})", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config {} ({source})", path.display())
            }
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Application settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub trim: TrimConfig,
    pub player: PlayerConfig,
    pub prefs: PrefsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub path: PathBuf,
    pub page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/catalog.json"),
            page_size: catalog::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimConfig {
    pub step: f64,
    pub poll_interval_ms: u64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            step: engine::slider::DEFAULT_STEP,
            poll_interval_ms: engine::CLOCK_POLL_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    pub fallback_duration_secs: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fallback_duration_secs: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrefsConfig {
    pub path: PathBuf,
    /// `false` keeps trim ranges in memory for the session only.
    pub persist: bool,
}

impl Default for PrefsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("trim-ranges.json"),
            persist: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

impl AppConfig {
    /// Loads `explicit`, or [`DEFAULT_CONFIG_FILE`] when it exists, or the
    /// defaults. An explicit path must exist.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.page_size == 0 {
            return Err(ConfigError::Invalid("catalog.page_size must be positive"));
        }
        if self.search.debounce_ms == 0 {
            return Err(ConfigError::Invalid("search.debounce_ms must be positive"));
        }
        if self.trim.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("trim.poll_interval_ms must be positive"));
        }
        if !(self.trim.step.is_finite() && self.trim.step > 0.0) {
            return Err(ConfigError::Invalid("trim.step must be a positive number"));
        }
        if !(self.player.fallback_duration_secs.is_finite()
            && self.player.fallback_duration_secs > 0.0)
        {
            return Err(ConfigError::Invalid(
                "player.fallback_duration_secs must be a positive number",
            ));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.trim.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{AppConfig, ConfigError};

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cliptrim.toml");
        fs::write(&path, "").expect("write config");

        let config = AppConfig::load(&path).expect("load config");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.catalog.page_size, 10);
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn partial_file_overrides_named_fields_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cliptrim.toml");
        fs::write(
            &path,
            r#"
[catalog]
path = "videos.json"

[trim]
step = 0.5

[log]
level = "debug"
"#,
        )
        .expect("write config");

        let config = AppConfig::load(&path).expect("load config");
        assert_eq!(config.catalog.path, PathBuf::from("videos.json"));
        assert_eq!(config.catalog.page_size, 10);
        assert_eq!(config.trim.step, 0.5);
        assert_eq!(config.trim.poll_interval_ms, 100);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cliptrim.toml");
        fs::write(&path, "[search]\ndelay = 3\n").expect("write config");

        let error = AppConfig::load(&path).expect_err("unknown key");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_page_size_is_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cliptrim.toml");
        fs::write(&path, "[catalog]\npage_size = 0\n").expect("write config");

        let error = AppConfig::load(&path).expect_err("invalid page size");
        assert!(error.to_string().contains("page_size"));
    }

    #[test]
    fn prefs_can_be_kept_in_memory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cliptrim.toml");
        fs::write(&path, "[prefs]\npersist = false\n").expect("write config");

        let config = AppConfig::load(&path).expect("load config");
        assert!(!config.prefs.persist);
        assert_eq!(config.prefs.path, PathBuf::from("trim-ranges.json"));
        assert!(AppConfig::default().prefs.persist);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = AppConfig::load_or_default(Some(&dir.path().join("nope.toml")))
            .expect_err("missing config");
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
