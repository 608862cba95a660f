// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware configuration file location.

use std::path::PathBuf;

const APP_DIR: &str = "retouch";
const CONFIG_FILE: &str = "config.json";

/// Default config file: `$XDG_CONFIG_HOME/retouch/config.json`, falling back
/// to `~/.config/retouch/config.json`.
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// The application config directory. Not created here; writers create it.
pub fn config_dir() -> PathBuf {
    config_base().join(APP_DIR)
}

fn config_base() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from(".")
}
