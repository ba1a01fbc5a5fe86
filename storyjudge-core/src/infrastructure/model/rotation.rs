//! Credential rotation for providers configured with a pool of API keys.

use std::sync::{Mutex, MutexGuard};

/// Ordered key pool plus the index of the key currently in use.
///
/// The index is shared by every caller of the owning adapter: a rotation
/// performed by one request is visible to the next.
#[derive(Debug)]
pub struct KeyRotation {
    keys: Box<[String]>,
    current: Mutex<usize>,
}

impl KeyRotation {
    /// Returns `None` when `keys` is empty.
    pub fn new(keys: Vec<String>) -> Option<Self> {
        if keys.is_empty() {
            return None;
        }
        Some(Self {
            keys: keys.into(),
            current: Mutex::new(0),
        })
    }

    /// Parses a comma-separated key list, ignoring blank entries.
    pub fn from_csv(raw: &str) -> Option<Self> {
        let keys = raw
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .collect();
        Self::new(keys)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn index(&self) -> usize {
        *self.lock()
    }

    /// Key currently in use, with its index.
    pub fn current(&self) -> (usize, String) {
        let index = *self.lock();
        (index, self.keys[index].clone())
    }

    /// Moves to `(index + 1) mod len` and returns the new index.
    pub fn advance(&self) -> usize {
        let mut index = self.lock();
        *index = (*index + 1) % self.keys.len();
        *index
    }

    /// Advances only if no other caller rotated away from `seen` meanwhile.
    ///
    /// Keeps two concurrent rate-limited requests from skipping a key.
    pub fn advance_from(&self, seen: usize) -> usize {
        let mut index = self.lock();
        if *index == seen {
            *index = (*index + 1) % self.keys.len();
        }
        *index
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        // A poisoned index is still a valid index.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
