//! Application configuration for docsnap.
//!
//! User config lives at `~/.docsnap/docsnap.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocsnapError, Result};
use crate::types::DEFAULT_ORIGIN;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docsnap.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docsnap";

/// Desktop browser UA; the document service rejects unknown agents.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching docsnap.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Remote document service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Session credential settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Base directory under which per-document folders are created.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "~/Documents/docsnap".into()
}

/// `[service]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Origin of the document service (scheme + host, no trailing slash).
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}

/// `[session]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the env var holding the session token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
        }
    }
}

fn default_token_env() -> String {
    "DOCSNAP_COOKIE".into()
}

impl DefaultsConfig {
    /// Resolve `output_dir`, expanding a leading `~` to the home directory.
    pub fn resolved_output_dir(&self) -> Result<PathBuf> {
        expand_home(&self.output_dir)
    }
}

fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| DocsnapError::config("could not determine home directory"))?;
            Ok(home.join(rest.trim_start_matches(['/', '\\'])))
        }
        None => Ok(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docsnap/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocsnapError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docsnap/docsnap.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsnapError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocsnapError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocsnapError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocsnapError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocsnapError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// Credential provider
// ---------------------------------------------------------------------------

/// Resolve the session token: explicit override first, then the env var
/// named by `session.token_env`.
///
/// Fails with [`DocsnapError::Config`] when neither yields a non-empty value.
/// Callers run this before any network I/O.
pub fn resolve_session_token(override_token: Option<&str>, config: &AppConfig) -> Result<String> {
    if let Some(token) = override_token.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    let var_name = &config.session.token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(DocsnapError::config(format!(
            "session token not found. Pass --cookie or set the {var_name} environment variable.\n\
             Copy the Cookie header from a logged-in browser session."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("DOCSNAP_COOKIE"));
        assert!(toml_str.contains(DEFAULT_ORIGIN));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.service.timeout_secs, 30);
        assert_eq!(parsed.session.token_env, "DOCSNAP_COOKIE");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[service]
origin = "http://127.0.0.1:9000"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.service.origin, "http://127.0.0.1:9000");
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.defaults.output_dir, "~/Documents/docsnap");
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docsnap.toml");
        std::fs::write(&path, "[defaults]\noutput_dir = \"/tmp/docs\"\n").expect("write");
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.defaults.output_dir, "/tmp/docs");
        assert_eq!(
            config.defaults.resolved_output_dir().expect("resolve"),
            PathBuf::from("/tmp/docs")
        );
    }

    #[test]
    fn load_config_rejects_bad_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docsnap.toml");
        std::fs::write(&path, "[defaults\n").expect("write");
        let err = load_config_from(&path).unwrap_err();
        assert_eq!(err.code(), "config_error");
    }

    #[test]
    fn token_override_wins() {
        let config = AppConfig::default();
        let token = resolve_session_token(Some(" abc=1 "), &config).expect("token");
        assert_eq!(token, "abc=1");
    }

    #[test]
    fn missing_token_is_config_error() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.session.token_env = "DOCSNAP_TEST_NONEXISTENT_TOKEN_12345".into();
        let err = resolve_session_token(None, &config).unwrap_err();
        assert_eq!(err.code(), "config_error");
        assert!(err.to_string().contains("session token not found"));

        let err = resolve_session_token(Some("   "), &config).unwrap_err();
        assert_eq!(err.code(), "config_error");
    }
}
