//! Configuration for parceltrace hosts.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `parceltrace_core::TrackerConfig`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use parceltrace_core::TrackerConfig;
use parceltrace_core::config::{DEFAULT_ENDPOINT, DEFAULT_POLL_INTERVAL_SECS};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Named tracking profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

/// A named tracking profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Destination country sent with every submission.
    pub destination_country: String,

    /// Service root URL. Defaults to the public Parcels App endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API language code.
    #[serde(default = "default_language")]
    pub language: String,

    /// API key (plaintext -- prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Seconds between poll cycles.
    pub poll_interval_secs: Option<u64>,

    /// Package-store file. Defaults to a per-profile file in the
    /// platform data directory.
    pub storage_path: Option<PathBuf>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_language() -> String {
    "en".into()
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|profile| (name, profile))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "parceltrace", "parceltrace").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve a profile's package-store file: the explicit
/// `storage_path` when set, a per-profile file in the platform data
/// directory otherwise.
pub fn resolve_store_path(profile: &Profile, profile_name: &str) -> PathBuf {
    profile
        .storage_path
        .clone()
        .unwrap_or_else(|| default_store_path(profile_name))
}

fn default_store_path(profile_name: &str) -> PathBuf {
    ProjectDirs::from("com", "parceltrace", "parceltrace").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push(format!("{profile_name}.packages.json"));
            p
        },
        |dirs| dirs.data_dir().join(format!("{profile_name}.packages.json")),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("parceltrace");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("PARCELTRACE_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve an API key for a profile: env var, then system keyring,
/// then plaintext config, in that order.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring::Entry::new("parceltrace", &format!("{profile_name}/api-key")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to TrackerConfig ────────────────────────────────────

/// Build a `TrackerConfig` from a profile.
pub fn profile_to_tracker_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<TrackerConfig, ConfigError> {
    let endpoint: url::Url = profile
        .endpoint
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("invalid URL: {}", profile.endpoint),
        })?;

    let api_key = resolve_api_key(profile, profile_name)?;

    let mut config = TrackerConfig::new(api_key, profile.destination_country.clone());
    config.probe_url = endpoint.clone();
    config.endpoint = endpoint;
    config.language.clone_from(&profile.language);
    if let Some(secs) = profile.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config.poll_interval_secs = profile
        .poll_interval_secs
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            destination_country: "Germany".into(),
            endpoint: default_endpoint(),
            language: "en".into(),
            api_key: Some("plaintext-key".into()),
            api_key_env: None,
            timeout: Some(15),
            poll_interval_secs: None,
            storage_path: None,
        }
    }

    #[test]
    fn plaintext_key_resolves_when_nothing_else_is_set() {
        use secrecy::ExposeSecret;
        let key = resolve_api_key(&profile(), "default").unwrap();
        assert_eq!(key.expose_secret(), "plaintext-key");
    }

    #[test]
    fn profile_translates_to_tracker_config() {
        let config = profile_to_tracker_config(&profile(), "default").unwrap();
        assert_eq!(config.destination_country, "Germany");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.endpoint.as_str(), "https://parcelsapp.com/");
    }

    #[test]
    fn bad_endpoint_is_a_validation_error() {
        let mut p = profile();
        p.endpoint = "not a url".into();
        let err = profile_to_tracker_config(&p, "default").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn missing_profile_reports_its_name() {
        let config = Config::default();
        let err = config.profile(Some("work")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { profile } if profile == "work"));
    }

    #[test]
    fn explicit_storage_path_wins_over_the_default() {
        let mut p = profile();
        p.storage_path = Some(PathBuf::from("/tmp/custom.json"));
        assert_eq!(
            resolve_store_path(&p, "default"),
            PathBuf::from("/tmp/custom.json")
        );
    }

    #[test]
    fn toml_round_trip_keeps_profiles() {
        let mut config = Config::default();
        config.profiles.insert("home".into(), profile());

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert!(parsed.profiles.contains_key("home"));
    }
}
