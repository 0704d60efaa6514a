//! Configuration resolution for crowdmsg modules
//!
//! Values resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (`crowdmsg/config.toml` in the user or system
//!    config directory)
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable naming the submission server listen port
pub const ENV_LISTEN_PORT: &str = "CROWDMSG_SV_PORT";
/// Environment variable naming the server base URL for the round controller
pub const ENV_SERVER_URL: &str = "CROWDMSG_SERVER_URL";
/// Environment variable carrying the generative service credential
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Default listen port for the submission server
pub const DEFAULT_LISTEN_PORT: u16 = 3000;
/// Default base URL the round controller talks to
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Resolve the submission server listen port
pub fn resolve_listen_port(cli_arg: Option<u16>) -> Result<u16> {
    if let Some(port) = cli_arg {
        return Ok(port);
    }

    if let Ok(value) = std::env::var(ENV_LISTEN_PORT) {
        return value
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("Invalid {}: {}", ENV_LISTEN_PORT, value)));
    }

    if let Some(value) = config_file_value("listen_port") {
        if let Some(port) = value.as_integer() {
            return u16::try_from(port)
                .map_err(|_| Error::Config(format!("Invalid listen_port in config: {}", port)));
        }
    }

    Ok(DEFAULT_LISTEN_PORT)
}

/// Resolve the base URL of the submission server for client use
pub fn resolve_server_url(cli_arg: Option<&str>) -> String {
    if let Some(url) = cli_arg {
        return trim_trailing_slash(url);
    }

    if let Ok(url) = std::env::var(ENV_SERVER_URL) {
        return trim_trailing_slash(&url);
    }

    if let Some(value) = config_file_value("server_url") {
        if let Some(url) = value.as_str() {
            return trim_trailing_slash(url);
        }
    }

    DEFAULT_SERVER_URL.to_string()
}

/// Read the generative service credential from the environment
///
/// Returns None when absent; the server keeps running without it and
/// only `/synthesize` calls fail.
pub fn openai_api_key() -> Option<String> {
    std::env::var(ENV_OPENAI_API_KEY)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Look up a top-level key in the config file, if one exists
fn config_file_value(key: &str) -> Option<toml::Value> {
    let path = find_config_file().ok()?;
    let content = std::fs::read_to_string(&path).ok()?;
    let config: toml::Value = toml::from_str(&content).ok()?;
    config.get(key).cloned()
}

/// Locate `crowdmsg/config.toml` for the platform
fn find_config_file() -> Result<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("crowdmsg").join("config.toml")) {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/crowdmsg/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}
