use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ErrorCode;
use crate::source::{DEFAULT_SOURCE_URL, SourceLocation};
use tracing::warn;

/// Contents of `<config_dir>/tix/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TixConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub prefs: PrefsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefsConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Settings after CLI flags, environment, and file have been layered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub source: SourceLocation,
    pub timeout: Option<Duration>,
    /// `None` when no config directory can be determined; preferences are
    /// then kept in memory for the session only.
    pub prefs_path: Option<PathBuf>,
    pub output: Option<String>,
}

/// The tix configuration directory: `TIX_CONFIG_DIR`, else
/// `<platform config dir>/tix`.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("TIX_CONFIG_DIR").filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|dir| dir.join("tix"))
}

/// Load `config.toml` from `dir`, or defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_from(dir: &Path) -> Result<TixConfig> {
    let path = dir.join("config.toml");
    if !path.exists() {
        return Ok(TixConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TixConfig>(&content).with_context(|| {
        format!(
            "{}: Failed to parse {}",
            ErrorCode::ConfigParseError.code(),
            path.display()
        )
    })
}

/// Resolve the effective configuration.
///
/// Precedence: `cli_source` > `TIX_SOURCE` / `TIX_PREFS` > config file >
/// built-in defaults.
///
/// # Errors
///
/// Returns an error if the config file is present but malformed.
pub fn resolve_config(cli_source: Option<&str>) -> Result<EffectiveConfig> {
    let dir = config_dir();
    let file = match dir.as_deref() {
        Some(dir) => load_config_from(dir)?,
        None => TixConfig::default(),
    };
    Ok(resolve_from_env(file, cli_source, dir))
}

/// Resolve the effective configuration, falling back to built-in defaults
/// when the config file cannot be loaded.
///
/// For commands that only touch preferences: a broken `config.toml` is
/// logged and skipped rather than fatal.
#[must_use]
pub fn resolve_config_lenient(cli_source: Option<&str>) -> EffectiveConfig {
    let dir = config_dir();
    let file = load_config_or_default(dir.as_deref());
    resolve_from_env(file, cli_source, dir)
}

fn load_config_or_default(dir: Option<&Path>) -> TixConfig {
    let Some(dir) = dir else {
        return TixConfig::default();
    };
    load_config_from(dir).unwrap_or_else(|err| {
        warn!(error = %format!("{err:#}"), "ignoring unreadable config file");
        TixConfig::default()
    })
}

fn resolve_from_env(
    file: TixConfig,
    cli_source: Option<&str>,
    dir: Option<PathBuf>,
) -> EffectiveConfig {
    resolve_inner(
        file,
        cli_source,
        env::var("TIX_SOURCE").ok(),
        env::var_os("TIX_PREFS").map(PathBuf::from),
        dir,
    )
}

fn resolve_inner(
    file: TixConfig,
    cli_source: Option<&str>,
    env_source: Option<String>,
    env_prefs: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> EffectiveConfig {
    let raw_source = cli_source
        .map(ToString::to_string)
        .or(env_source.filter(|value| !value.trim().is_empty()))
        .unwrap_or(file.source.url);

    let prefs_path = env_prefs
        .filter(|path| !path.as_os_str().is_empty())
        .or(file.prefs.path)
        .or_else(|| config_dir.map(|dir| dir.join("prefs.toml")));

    EffectiveConfig {
        source: SourceLocation::parse(&raw_source),
        timeout: file
            .source
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
        prefs_path,
        output: file.output,
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}
