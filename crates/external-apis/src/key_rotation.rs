// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Round-robin API key rotation
//!
//! CryptoCompare throttles per key, so the proxy spreads requests over a fixed
//! pool. The cursor is lock-free: concurrent requests may interleave their
//! advances, which only affects which key a request sees, never the order of
//! the pool itself.

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use thiserror::Error;

/// Errors raised when building a key pool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyRotationError {
    /// The pool has no keys
    #[error("API key pool cannot be empty")]
    EmptyPool,

    /// A key in the pool is blank
    #[error("API key at position {index} is blank")]
    BlankKey {
        /// Position of the offending key
        index: usize,
    },
}

/// Fixed pool of API keys with a shared rotating cursor
pub struct KeyRotator {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl KeyRotator {
    /// Create a rotator over a non-empty pool of non-blank keys
    ///
    /// # Errors
    ///
    /// Returns [`KeyRotationError`] if the pool is empty or a key is blank.
    pub fn new(keys: Vec<String>) -> Result<Self, KeyRotationError> {
        if keys.is_empty() {
            return Err(KeyRotationError::EmptyPool);
        }
        if let Some(index) = keys.iter().position(|key| key.trim().is_empty()) {
            return Err(KeyRotationError::BlankKey { index });
        }

        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Return the key under the cursor and advance it by one, wrapping
    ///
    /// Successive calls walk the whole pool in order before repeating.
    pub fn next_key(&self) -> &str {
        let len = self.keys.len();
        let index = match self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cursor| {
                Some((cursor + 1) % len)
            }) {
            Ok(previous) | Err(previous) => previous,
        };
        &self.keys[index]
    }

    /// Position the next call to [`Self::next_key`] will read
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Number of keys in the pool
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false, a rotator cannot be built over an empty pool
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// Keys never reach logs
impl fmt::Debug for KeyRotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRotator")
            .field("pool_size", &self.keys.len())
            .field("cursor", &self.cursor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::*;

    fn pool(keys: &[&str]) -> Vec<String> {
        keys.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn rotates_through_pool_in_order() {
        let rotator = KeyRotator::new(pool(&["k1", "k2", "k3"])).unwrap();

        let seen: Vec<&str> = (0..7).map(|_| rotator.next_key()).collect();
        assert_eq!(seen, ["k1", "k2", "k3", "k1", "k2", "k3", "k1"]);
    }

    #[test]
    fn cursor_stays_in_range() {
        let rotator = KeyRotator::new(pool(&["a", "b"])).unwrap();
        for _ in 0..10 {
            rotator.next_key();
            assert!(rotator.cursor() < rotator.len());
        }
    }

    #[test]
    fn single_key_pool_always_returns_it() {
        let rotator = KeyRotator::new(pool(&["only"])).unwrap();
        for _ in 0..3 {
            assert_eq!(rotator.next_key(), "only");
            assert_eq!(rotator.cursor(), 0);
        }
    }

    #[test]
    fn empty_pool_rejected() {
        assert_eq!(
            KeyRotator::new(Vec::new()).unwrap_err(),
            KeyRotationError::EmptyPool
        );
    }

    #[test]
    fn blank_key_rejected() {
        assert_eq!(
            KeyRotator::new(pool(&["k1", "  "])).unwrap_err(),
            KeyRotationError::BlankKey { index: 1 }
        );
    }

    #[test]
    fn independent_instances_do_not_share_cursor() {
        let first = KeyRotator::new(pool(&["k1", "k2"])).unwrap();
        let second = KeyRotator::new(pool(&["k1", "k2"])).unwrap();

        assert_eq!(first.next_key(), "k1");
        assert_eq!(first.next_key(), "k2");
        assert_eq!(second.next_key(), "k1");
    }

    #[test]
    fn debug_output_hides_keys() {
        let rotator = KeyRotator::new(pool(&["super-secret"])).unwrap();
        let debug = format!("{rotator:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("pool_size"));
    }

    #[tokio::test]
    async fn concurrent_callers_spread_evenly() {
        let rotator = Arc::new(KeyRotator::new(pool(&["k1", "k2", "k3", "k4"])).unwrap());

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let rotator = Arc::clone(&rotator);
                tokio::spawn(async move { rotator.next_key().to_string() })
            })
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for handle in handles {
            *counts.entry(handle.await.unwrap()).or_default() += 1;
        }

        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&count| count == 10));
    }
}
