// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration loading.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tracklink_core::BridgeConfig;
use tracklink_core::error::Result;

use super::data_dir::data_dir;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TRACKLINK_CONFIG";

const CONFIG_FILE: &str = "config.json";

/// Where the config is read from: `$TRACKLINK_CONFIG`, else
/// `<data dir>/config.json`.
pub fn config_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => data_dir().join(CONFIG_FILE),
    }
}

/// Load the config, falling back to defaults when the file is missing or
/// unreadable.
pub fn load_config() -> BridgeConfig {
    let path = config_path();
    match read_config(&path) {
        Ok(Some(config)) => {
            debug!(path = %path.display(), "loaded bridge config");
            config
        }
        Ok(None) => BridgeConfig::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable bridge config");
            BridgeConfig::default()
        }
    }
}

/// Read `path`; `Ok(None)` when it does not exist.
pub fn read_config(path: &Path) -> Result<Option<BridgeConfig>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}
