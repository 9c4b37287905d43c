//! Configuration validation.
//!
//! Validates every field before data is loaded.

use crate::domain::error::FindBetterError;
use crate::domain::trailing::TrailingWindow;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_TOP_N: i64 = 5;
pub const DEFAULT_POOL_SIZE: i64 = 4;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), FindBetterError> {
    validate_data_source(config)?;
    validate_settings(config)?;
    validate_find_better(config)?;
    Ok(())
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), FindBetterError> {
    if !config.has("data", "csv_path") {
        return Err(FindBetterError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_path".to_string(),
        });
    }
    Ok(())
}

fn validate_settings(config: &dyn ConfigPort) -> Result<(), FindBetterError> {
    let pool_size = config.get_int("settings", "pool_size", DEFAULT_POOL_SIZE);
    if pool_size < 1 {
        return Err(FindBetterError::ConfigInvalid {
            section: "settings".to_string(),
            key: "pool_size".to_string(),
            reason: "pool_size must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_find_better(config: &dyn ConfigPort) -> Result<(), FindBetterError> {
    configured_window(config)?;
    let top_n = config.get_int("find_better", "top_n", DEFAULT_TOP_N);
    if top_n < 1 {
        return Err(FindBetterError::ConfigInvalid {
            section: "find_better".to_string(),
            key: "top_n".to_string(),
            reason: "top_n must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// `[find_better] window`, defaulting to one year.
pub fn configured_window(config: &dyn ConfigPort) -> Result<TrailingWindow, FindBetterError> {
    match config.get_string("find_better", "window") {
        None => Ok(TrailingWindow::default()),
        Some(s) => s.parse().map_err(|e: crate::domain::trailing::WindowParseError| {
            FindBetterError::ConfigInvalid {
                section: "find_better".to_string(),
                key: "window".to_string(),
                reason: e.to_string(),
            }
        }),
    }
}

pub fn configured_top_n(config: &dyn ConfigPort) -> usize {
    usize::try_from(config.get_int("find_better", "top_n", DEFAULT_TOP_N))
        .unwrap_or(DEFAULT_TOP_N as usize)
        .max(1)
}
