//! On-disk JSON cache keyed by (resource, key).
//!
//! Layout: `<root>/<resource>/<key>.json`, both segments sanitized to a
//! filesystem-safe alphabet. Writes always overwrite: this is write-through
//! memoization keyed by exact request parameters, not a staleness-aware
//! cache. There is no cross-process locking; concurrent writers to the
//! same key may interleave.

use crate::domain::error::TrendevalError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether the process may reach the network. Offline makes the cache
/// authoritative: a miss is a hard failure for the caller, never a
/// fallback to a live fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Online,
    Offline,
}

pub struct CacheStore {
    root: PathBuf,
    mode: RunMode,
}

/// Replace every character outside `[A-Za-z0-9_.=-]` with `_`.
fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '=' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl CacheStore {
    pub fn new<P: Into<PathBuf>>(root: P, mode: RunMode) -> Self {
        Self {
            root: root.into(),
            mode,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.mode == RunMode::Offline
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, resource: &str, key: &str) -> PathBuf {
        self.root
            .join(sanitize_segment(resource))
            .join(format!("{}.json", sanitize_segment(key)))
    }

    /// Retrieve a cached payload, or `None` when no entry exists.
    pub fn get(&self, resource: &str, key: &str) -> Result<Option<Value>, TrendevalError> {
        let path = self.entry_path(resource, key);
        if !path.exists() {
            debug!(resource, key, "cache miss");
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content).map_err(|e| TrendevalError::Cache {
            reason: format!("corrupt cache entry {}: {}", path.display(), e),
        })?;
        debug!(resource, key, "cache hit");
        Ok(Some(value))
    }

    /// Persist a payload, unconditionally overwriting any prior entry for
    /// the same key. Durable and visible to subsequent reads in this
    /// process once this returns.
    pub fn put(&self, resource: &str, key: &str, payload: &Value) -> Result<(), TrendevalError> {
        let path = self.entry_path(resource, key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string(payload).map_err(|e| TrendevalError::Cache {
            reason: format!("unserializable payload for {resource}/{key}: {e}"),
        })?;
        fs::write(&path, content)?;
        debug!(resource, key, path = %path.display(), "cache write");
        Ok(())
    }
}
