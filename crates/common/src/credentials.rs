//! Provider credential pool with rate-limit rotation
//!
//! A deployment may carry several API keys for the same provider; when one
//! key is throttled the pool advances to the next. The pool is constructed
//! once at startup and injected into every client that needs it; there is
//! no module-level singleton.

use std::sync::Mutex;

use crate::errors::{AiError, Result};

/// Ordered API keys with a mutex-guarded cursor.
///
/// The cursor is process-wide shared state; rotation from concurrent call
/// paths is serialized so two callers cannot rotate past each other.
#[derive(Debug)]
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: Mutex<usize>,
}

impl CredentialPool {
    /// Build a pool from an explicit key list. Fails on an empty list.
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(AiError::NotConfigured {
                missing: "provider API keys".to_string(),
            });
        }
        Ok(Self {
            keys,
            cursor: Mutex::new(0),
        })
    }

    /// Scan the environment for numbered keys (`{prefix}_1`, `{prefix}_2`,
    /// ...) and fall back to the bare `{prefix}` variable when no numbered
    /// key exists. Returns `None` when neither form is present.
    pub fn from_env(prefix: &str) -> Option<Self> {
        let mut keys = Vec::new();
        for i in 1.. {
            match std::env::var(format!("{}_{}", prefix, i)) {
                Ok(key) if !key.trim().is_empty() => keys.push(key),
                _ => break,
            }
        }

        if keys.is_empty() {
            if let Ok(key) = std::env::var(prefix) {
                if !key.trim().is_empty() {
                    keys.push(key);
                }
            }
        }

        if keys.is_empty() {
            tracing::warn!(prefix, "no provider API keys found in environment");
            return None;
        }

        tracing::info!(prefix, count = keys.len(), "credential pool loaded");
        Self::new(keys).ok()
    }

    /// The currently active key.
    pub fn current(&self) -> String {
        let cursor = self.cursor.lock().expect("credential cursor poisoned");
        self.keys[*cursor].clone()
    }

    /// Advance the cursor circularly and return the newly active key.
    /// Called when the provider signals a rate limit on the current key.
    pub fn rotate(&self) -> String {
        let mut cursor = self.cursor.lock().expect("credential cursor poisoned");
        *cursor = (*cursor + 1) % self.keys.len();
        tracing::info!(active = *cursor + 1, total = self.keys.len(), "rotated provider key");
        self.keys[*cursor].clone()
    }

    /// Number of keys in the pool; the cap on rotation attempts.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Zero-based cursor position.
    pub fn position(&self) -> usize {
        *self.cursor.lock().expect("credential cursor poisoned")
    }
}
