//! Configuration loader
//!
//! Loads pipeline configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the environment when one is present
//! 2. If `VITALTRACE_ENV` is set, builds the configuration from environment
//!    variables
//! 3. Otherwise probes multiple paths for a config file (JSON or TOML)
//! 4. Falls back to the built-in defaults when no file exists
//!
//! ## Environment Variables
//! - `VITALTRACE_ENV`: Runtime mode (`development`, `production`, `test`)
//! - `VITALTRACE_LOG_LEVEL`: Default log filter directive
//! - `VITALTRACE_LOG_JSON`: Emit JSON log lines (true/false)
//! - `VITALTRACE_CONSOLE_PROVIDER`: Force the console provider on or off
//! - `VITALTRACE_MAX_METRICS_PER_TYPE`: Per-type metric buffer cap
//! - `VITALTRACE_CLEANUP_INTERVAL_SECS`: Metric cleanup interval in seconds
//! - `VITALTRACE_MAX_METRIC_AGE_SECS`: Metric TTL in seconds
//! - `VITALTRACE_ERROR_BUFFER_CAPACITY`: Error ring buffer capacity
//! - `VITALTRACE_NOTIFY_MIN_SEVERITY`: Lowest severity shown to the user
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./vitaltrace.json` or `./vitaltrace.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use vitaltrace_domain::constants::ENV_RUNTIME_MODE;
use vitaltrace_domain::{Result, RuntimeMode, Severity, TelemetryConfig, TelemetryError};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["vitaltrace.json", "vitaltrace.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when `VITALTRACE_ENV` is set. Otherwise the
/// first config file found by [`probe_config_paths`] is used, and the
/// built-in defaults apply when there is none.
///
/// # Errors
/// Returns `TelemetryError::Config` if an environment variable has an
/// invalid value or the config file cannot be parsed, and
/// `TelemetryError::Io` if the config file cannot be read.
pub fn load() -> Result<TelemetryConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    if std::env::var(ENV_RUNTIME_MODE).is_ok() {
        let config = load_from_env()?;
        tracing::info!(mode = %config.mode, "Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration file found, using defaults");
            Ok(TelemetryConfig::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `VITALTRACE_ENV` is required; every other variable is optional and
/// overrides the corresponding default.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `TelemetryError::Config` if `VITALTRACE_ENV` is missing or any
/// variable has an invalid value.
pub fn load_from_env() -> Result<TelemetryConfig> {
    let mode = env_var(ENV_RUNTIME_MODE)?
        .parse::<RuntimeMode>()
        .map_err(|e| TelemetryError::Config(format!("{}: {}", ENV_RUNTIME_MODE, e)))?;
    let mut config = TelemetryConfig { mode, ..TelemetryConfig::default() };

    if let Ok(level) = std::env::var("VITALTRACE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("VITALTRACE_LOG_JSON", config.logging.json);
    if std::env::var("VITALTRACE_CONSOLE_PROVIDER").is_ok() {
        config.analytics.console_provider = Some(env_bool("VITALTRACE_CONSOLE_PROVIDER", false));
    }

    if let Some(max) = env_parse::<usize>("VITALTRACE_MAX_METRICS_PER_TYPE")? {
        config.performance.max_metrics_per_type = max;
    }
    if let Some(secs) = env_parse::<u64>("VITALTRACE_CLEANUP_INTERVAL_SECS")? {
        config.performance.cleanup_interval_secs = secs;
    }
    if let Some(secs) = env_parse::<u64>("VITALTRACE_MAX_METRIC_AGE_SECS")? {
        config.performance.max_metric_age_secs = secs;
    }
    if let Some(capacity) = env_parse::<usize>("VITALTRACE_ERROR_BUFFER_CAPACITY")? {
        config.errors.buffer_capacity = capacity;
    }
    if let Some(severity) = env_parse::<Severity>("VITALTRACE_NOTIFY_MIN_SEVERITY")? {
        config.errors.notify_min_severity = severity;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `TelemetryError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
///
/// Returns `TelemetryError::Io` if the file exists but cannot be read.
pub fn load_from_file(path: Option<PathBuf>) -> Result<TelemetryConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TelemetryError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TelemetryError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TelemetryError::Io(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`). Missing
/// sections and fields keep their defaults.
///
/// # Errors
/// Returns `TelemetryError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<TelemetryConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TelemetryError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TelemetryError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(TelemetryError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for `vitaltrace.{json,toml}` and `config.{json,toml}` in the
/// current working directory, its parent and grandparent, then in the same
/// places relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `TelemetryError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        TelemetryError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `TelemetryError::Config` if the variable is set but invalid.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| TelemetryError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
