// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config file resolution.

use std::path::{Path, PathBuf};

use rectipage_core::RectipageConfig;
use rectipage_core::error::Result;
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";

/// Return the application config directory. Nothing is created on disk.
pub fn config_dir() -> PathBuf {
    dirs_fallback().join("rectipage")
}

/// Location of the config file used when none is given explicitly.
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Load the explicit config file if given, otherwise the default file if it
/// exists, otherwise built-in defaults.
///
/// An explicitly named file that is missing or malformed is an error; a
/// missing default file is not.
pub fn resolve_config(explicit: Option<&Path>) -> Result<RectipageConfig> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "loading config");
        return RectipageConfig::load(path);
    }

    let path = default_config_path();
    if path.is_file() {
        info!(path = %path.display(), "loading default config");
        RectipageConfig::load(&path)
    } else {
        debug!(path = %path.display(), "no config file, using defaults");
        Ok(RectipageConfig::default())
    }
}

fn dirs_fallback() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from("/tmp")
}
