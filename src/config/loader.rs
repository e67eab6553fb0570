//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::PlannerConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use clearance_motion::load_config;
///
/// let config = load_config("shuttle.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PlannerConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(truncate(&e.to_string())).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<PlannerConfig> {
    let config: PlannerConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(truncate(e.message())).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

/// Longest prefix that fits an error message buffer, cut on a char boundary.
fn truncate(msg: &str) -> &str {
    const CAPACITY: usize = 128;
    if msg.len() <= CAPACITY {
        return msg;
    }
    let mut end = CAPACITY;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    &msg[..end]
}
