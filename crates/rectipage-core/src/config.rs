// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RectipageError, Result};
use crate::types::Sampling;

/// Persistent rectification settings.
///
/// Stored as JSON; keys missing from the file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectipageConfig {
    /// Sampling policy for the resampler.
    pub sampling: Sampling,
    /// RGBA value written where the inverse mapping leaves the source image.
    pub background: [u8; 4],
    /// Spread row batches across the rayon thread pool.
    pub parallel: bool,
    /// Destination rows per batch (cancellation is checked between batches).
    pub batch_rows: usize,
}

impl Default for RectipageConfig {
    fn default() -> Self {
        Self {
            sampling: Sampling::Nearest,
            background: [0, 0, 0, 0],
            parallel: true,
            batch_rows: 16,
        }
    }
}

impl RectipageConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_rows == 0 {
            return Err(RectipageError::InvalidConfig(
                "batch_rows must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_transparent_nearest() {
        let config = RectipageConfig::default();
        assert_eq!(config.sampling, Sampling::Nearest);
        assert_eq!(config.background, [0, 0, 0, 0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RectipageConfig = serde_json::from_str(r#"{"sampling":"bilinear"}"#).unwrap();
        assert_eq!(config.sampling, Sampling::Bilinear);
        assert_eq!(config.batch_rows, 16);
        assert!(config.parallel);
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rectipage.json");
        let config = RectipageConfig {
            sampling: Sampling::Bilinear,
            background: [255, 255, 255, 255],
            parallel: false,
            batch_rows: 4,
        };
        config.persist(&path).unwrap();
        assert_eq!(RectipageConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn zero_batch_rows_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"batch_rows":0}"#).unwrap();
        assert!(matches!(
            RectipageConfig::load(&path),
            Err(RectipageError::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RectipageConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, RectipageError::Io(_)));
    }
}
