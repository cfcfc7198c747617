//! Single-slot cache of a relation's loaded counterparts.

use crate::error::{Result, SiblingError};

/// Loaded value of one relation instance.
///
/// Filled only by an explicit load. Reading an empty slot fails instead of
/// fetching, so relation access never performs hidden I/O.
#[derive(Debug, Clone)]
pub struct LazyLoadCache<E> {
    value: Option<Vec<E>>,
}

impl<E> Default for LazyLoadCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> LazyLoadCache<E> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self { value: None }
    }

    /// Stores a freshly loaded set, replacing any previous one.
    pub fn store(&mut self, value: Vec<E>) {
        self.value = Some(value);
    }

    /// Returns the loaded set.
    ///
    /// # Returns
    /// `Err(SiblingError::NotLoaded)` naming `relation` if nothing is loaded.
    pub fn get(&self, relation: &str) -> Result<&[E]> {
        self.value
            .as_deref()
            .ok_or_else(|| SiblingError::NotLoaded {
                relation: relation.to_string(),
            })
    }

    /// Drops the loaded set. Returns true if something was loaded.
    pub fn invalidate(&mut self) -> bool {
        self.value.take().is_some()
    }

    /// Takes the loaded set out of the cache.
    pub fn take(&mut self) -> Option<Vec<E>> {
        self.value.take()
    }

    /// Returns whether a set is loaded.
    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }
}
