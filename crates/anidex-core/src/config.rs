//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from an optional JSON file
//! and then overlaid with environment variables. Every section defaults
//! sensibly so a completely empty `{}` file is valid. Configuration is read
//! once at startup and shared read-only afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Locations searched when no explicit config path is given.
const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "./anidex.json",
    "~/.config/anidex/config.json",
    "/etc/anidex/config.json",
];

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub secrets: SecretsConfig,
    pub site: SiteConfig,
    pub captcha: CaptchaConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Resolve the config file (explicit path or first default location that
    /// exists), load it, and overlay the process environment.
    pub fn load(custom_path: Option<&Path>) -> Self {
        let path = match custom_path {
            Some(p) => Some(p.to_path_buf()),
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
                .find(|p| p.exists()),
        };

        let mut config = Self::load_or_default(path.as_deref());
        config.apply_env();
        config
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary key lookup. Recognized keys:
    /// `SECRET_KEY`, `ALTCHA_HMAC_KEY`, `EMAIL`, `SITE_NAME`, `TELEGRAM_USER`,
    /// `ANIDEX_HOST`, `ANIDEX_PORT`, `ANIDEX_DATA_DIR`, `ANIDEX_STATIC_DIR`.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("SECRET_KEY") {
            self.secrets.session_key = Some(v);
        }
        if let Some(v) = get("ALTCHA_HMAC_KEY") {
            self.secrets.captcha_key = Some(v);
        }
        if let Some(v) = get("EMAIL") {
            self.site.email = Some(v);
        }
        if let Some(v) = get("SITE_NAME") {
            self.site.site_name = Some(v);
        }
        if let Some(v) = get("TELEGRAM_USER") {
            self.site.telegram_user = Some(v);
        }
        if let Some(v) = get("ANIDEX_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("ANIDEX_PORT") {
            match v.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!("Invalid ANIDEX_PORT value {v:?}: {e}"),
            }
        }
        if let Some(v) = get("ANIDEX_DATA_DIR") {
            self.server.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ANIDEX_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(v);
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }
        if self.site.site_name.is_none() {
            warnings.push("SITE_NAME is not set; pages will use the default site name".into());
        }
        if self.site.email.is_none() {
            warnings.push("EMAIL is not set; contact links will be omitted".into());
        }
        if self.limits.per_hour == 0 || self.limits.per_day == 0 {
            warnings.push("a submission limit is 0; every submission will be rejected".into());
        }
        if self.captcha.max_number == 0 {
            warnings.push("captcha.max_number is 0; challenges are trivially solvable".into());
        }

        warnings
    }

    /// Fail unless both secret keys are present and non-empty.
    pub fn require_secrets(&self) -> Result<()> {
        let mut missing = Vec::new();
        let unset = |v: &Option<String>| v.as_deref().map_or(true, str::is_empty);
        if unset(&self.secrets.session_key) {
            missing.push("SECRET_KEY");
        }
        if unset(&self.secrets.captcha_key) {
            missing.push("ALTCHA_HMAC_KEY");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "missing required secret(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Path of the catalog document.
    pub fn catalog_path(&self) -> PathBuf {
        self.server.data_dir.join("animes.json")
    }

    /// Path of the title-request document.
    pub fn requests_path(&self) -> PathBuf {
        self.server.data_dir.join("requests.json")
    }

    /// Path of the feedback document.
    pub fn feedbacks_path(&self) -> PathBuf {
        self.server.data_dir.join("feedbacks.json")
    }

    /// Directory holding cover images.
    pub fn covers_dir(&self) -> PathBuf {
        self.server.static_dir.join("covers")
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server and filesystem layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            data_dir: PathBuf::from("./data"),
            static_dir: PathBuf::from("./static"),
        }
    }
}

/// Signing keys. Both are required to start the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Signs flash cookies.
    pub session_key: Option<String>,
    /// Signs and verifies CAPTCHA challenges.
    pub captcha_key: Option<String>,
}

/// Site metadata rendered into every page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub email: Option<String>,
    pub site_name: Option<String>,
    pub telegram_user: Option<String>,
}

/// Proof-of-work challenge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// Upper bound (inclusive) of the secret number.
    pub max_number: u64,
    /// Seconds before an issued challenge stops verifying.
    pub expires_secs: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            max_number: 100_000,
            expires_secs: 1200,
        }
    }
}

/// Per-IP submission caps, shared by both intake forms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub per_hour: usize,
    pub per_day: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            per_hour: 5,
            per_day: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_json_is_valid() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.limits.per_hour, 5);
        assert_eq!(config.limits.per_day, 15);
        assert_eq!(config.captcha.max_number, 100_000);
        assert!(config.secrets.session_key.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            Config::from_json(r#"{"server": {"port": 9000}, "limits": {"per_day": 3}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.limits.per_hour, 5);
        assert_eq!(config.limits.per_day, 3);
    }

    #[test]
    fn invalid_json_is_validation_error() {
        let err = Config::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config =
            Config::from_json(r#"{"site": {"site_name": "From File"}}"#).unwrap();
        let vars = env(&[
            ("SECRET_KEY", "s3cret"),
            ("ALTCHA_HMAC_KEY", "hmac"),
            ("SITE_NAME", "From Env"),
            ("ANIDEX_PORT", "8081"),
            ("ANIDEX_DATA_DIR", "/tmp/anidex"),
        ]);
        config.apply_env_from(|k| vars.get(k).cloned());

        assert_eq!(config.site.site_name.as_deref(), Some("From Env"));
        assert_eq!(config.secrets.session_key.as_deref(), Some("s3cret"));
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.requests_path(), PathBuf::from("/tmp/anidex/requests.json"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = Config::default();
        let vars = env(&[("SECRET_KEY", ""), ("ANIDEX_PORT", "not-a-port")]);
        config.apply_env_from(|k| vars.get(k).cloned());

        assert!(config.secrets.session_key.is_none());
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn require_secrets_names_missing_keys() {
        let mut config = Config::default();
        let err = config.require_secrets().unwrap_err().to_string();
        assert!(err.contains("SECRET_KEY"));
        assert!(err.contains("ALTCHA_HMAC_KEY"));

        config.secrets.session_key = Some("a".into());
        config.secrets.captcha_key = Some("b".into());
        assert!(config.require_secrets().is_ok());
    }

    #[test]
    fn validate_warns_about_missing_site_metadata() {
        let warnings = Config::default().validate();
        assert!(warnings.iter().any(|w| w.contains("SITE_NAME")));
        assert!(warnings.iter().any(|w| w.contains("EMAIL")));
    }

    #[test]
    fn load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(Some(&dir.path().join("nope.json")));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anidex.json");
        std::fs::write(&path, r#"{"captcha": {"max_number": 50}}"#).unwrap();

        let config = Config::load_or_default(Some(&path));
        assert_eq!(config.captcha.max_number, 50);
        assert_eq!(config.captcha.expires_secs, 1200);
    }
}
