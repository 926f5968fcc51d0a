//! Pipeline configuration
//!
//! Loaded by precedence: system defaults < config file < environment
//! variables. Exposed as an immutable snapshot so a running pipeline can
//! keep using a consistent view of its configuration while [`ConfigHandle::reload`]
//! atomically swaps in a freshly-loaded one for subsequent calls.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use qntx_core::classify::TemporalConfig;
use qntx_sqlite::StorageQuotas;

use crate::error::{PipelineError, Result};

/// Default review threshold below which a conflict requires human review.
const DEFAULT_REVIEW_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database file. `None` means in-memory.
    pub database_path: Option<String>,

    /// Per-(actor,context) / per-actor / per-entity bounded-storage limits.
    pub l_ac: usize,
    pub l_as: usize,
    pub l_ea: usize,

    /// Temporal windows for pattern analysis and confidence scoring, in
    /// milliseconds: `(verify, evolve, obsolete)`.
    pub window_verify_ms: i64,
    pub window_evolve_ms: i64,
    pub window_obsolete_ms: i64,

    /// Confidence below this routes a conflict to `human_review`.
    pub review_threshold: f64,

    /// `debug`, `info`, `warn`, or `error`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            l_ac: 16,
            l_as: 64,
            l_ea: 64,
            window_verify_ms: 60_000,
            window_evolve_ms: 86_400_000,
            window_obsolete_ms: 365 * 86_400_000,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load defaults, overlay a config file if present, then overlay
    /// environment variables (`QNTX_AX_*`).
    pub fn load(file_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = file_path {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| PipelineError::Config(format!("reading {:?}: {}", path, e)))?;
                let from_file: Config = serde_json::from_str(&contents)
                    .map_err(|e| PipelineError::Config(format!("parsing {:?}: {}", path, e)))?;
                config = from_file;
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("QNTX_AX_DATABASE_PATH") {
            self.database_path = Some(v);
        }
        if let Ok(v) = std::env::var("QNTX_AX_L_AC") {
            if let Ok(n) = v.parse() {
                self.l_ac = n;
            }
        }
        if let Ok(v) = std::env::var("QNTX_AX_L_AS") {
            if let Ok(n) = v.parse() {
                self.l_as = n;
            }
        }
        if let Ok(v) = std::env::var("QNTX_AX_L_EA") {
            if let Ok(n) = v.parse() {
                self.l_ea = n;
            }
        }
        if let Ok(v) = std::env::var("QNTX_AX_REVIEW_THRESHOLD") {
            if let Ok(n) = v.parse() {
                self.review_threshold = n;
            }
        }
        if let Ok(v) = std::env::var("QNTX_AX_LOG_LEVEL") {
            self.log_level = v;
        }
    }

    pub fn storage_quotas(&self) -> StorageQuotas {
        StorageQuotas::new(self.l_ac, self.l_as, self.l_ea)
    }

    pub fn temporal_config(&self) -> TemporalConfig {
        TemporalConfig {
            verification_window_ms: self.window_verify_ms,
            evolution_window_ms: self.window_evolve_ms,
            obsolescence_window_ms: self.window_obsolete_ms,
        }
    }
}

/// An atomically-swappable handle to the current configuration snapshot.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<Config>>>,
}

impl ConfigHandle {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Current configuration snapshot. Cheap to clone; callers should grab
    /// one at the start of a pipeline run rather than re-reading per stage.
    pub fn snapshot(&self) -> Arc<Config> {
        self.inner.read().clone()
    }

    /// Reload from disk/env and atomically swap in the new snapshot.
    pub fn reload(&self, file_path: Option<&Path>) -> Result<()> {
        let fresh = Config::load(file_path)?;
        *self.inner.write() = Arc::new(fresh);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.l_ac, 16);
        assert_eq!(config.l_as, 64);
        assert_eq!(config.l_ea, 64);
        assert_eq!(config.window_verify_ms, 60_000);
        assert_eq!(config.review_threshold, 0.3);
    }

    #[test]
    fn env_override_takes_precedence_over_file_default() {
        std::env::set_var("QNTX_AX_L_AC", "42");
        let config = Config::load(None).unwrap();
        assert_eq!(config.l_ac, 42);
        std::env::remove_var("QNTX_AX_L_AC");
    }

    #[test]
    fn reload_swaps_snapshot_atomically() {
        let handle = ConfigHandle::new(Config::default());
        assert_eq!(handle.snapshot().l_ac, 16);

        std::env::set_var("QNTX_AX_L_AC", "7");
        handle.reload(None).unwrap();
        assert_eq!(handle.snapshot().l_ac, 7);
        std::env::remove_var("QNTX_AX_L_AC");
    }
}
