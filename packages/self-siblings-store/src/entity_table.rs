//! Entity table keyed by identifier.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::Mutex;
use self_siblings_core::{Entity, EntityRepository, Result, SiblingError};

use crate::config::StoreConfig;

/// Identifier lookup used for pivot foreign key checks.
pub trait EntityIndex<I>: Send + Sync {
    /// Table name used in error messages.
    fn table_name(&self) -> &str;

    /// Returns true if an entity with `id` is saved.
    fn contains_id(&self, id: &I) -> bool;
}

/// In-memory entity table.
///
/// Readers load an immutable snapshot through `ArcSwap`; writers are
/// serialized by a mutex, copy the snapshot, modify it and publish it.
pub struct EntityTable<E: Entity> {
    name: String,
    rows: ArcSwap<HashMap<E::Id, E>>,
    write_lock: Mutex<()>,
    config: StoreConfig,
}

impl<E: Entity> EntityTable<E> {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>, config: StoreConfig) -> Self {
        let rows = HashMap::with_capacity(config.initial_capacity);
        Self {
            name: name.into(),
            rows: ArcSwap::new(Arc::new(rows)),
            write_lock: Mutex::new(()),
            config,
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts or replaces a saved entity.
    ///
    /// # Returns
    /// `Err(SiblingError::UnsavedEntity)` if the entity has no identifier.
    pub fn save(&self, entity: E) -> Result<()> {
        let id = entity.id().ok_or_else(|| SiblingError::UnsavedEntity {
            context: format!("Cannot save into '{}' without an id", self.name),
        })?;

        let _guard = self.write_lock.lock();
        let mut rows = HashMap::clone(&self.rows.load_full());
        rows.insert(id.clone(), entity);
        self.rows.store(Arc::new(rows));
        tracing::debug!("Saved {} into {}", id, self.name);
        Ok(())
    }

    /// Removes an entity, returning it if it was present.
    ///
    /// Pivot rows referencing it are not touched.
    pub fn remove(&self, id: &E::Id) -> Option<E> {
        let _guard = self.write_lock.lock();
        let mut rows = HashMap::clone(&self.rows.load_full());
        let removed = rows.remove(id);
        if removed.is_some() {
            self.rows.store(Arc::new(rows));
        }
        removed
    }

    /// Returns a copy of the entity with `id`.
    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.rows.load().get(id).cloned()
    }

    /// Returns all entities, in no particular order.
    pub fn all(&self) -> Vec<E> {
        self.rows.load().values().cloned().collect()
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.rows.load().len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.load().is_empty()
    }
}

impl<E: Entity> EntityIndex<E::Id> for EntityTable<E> {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn contains_id(&self, id: &E::Id) -> bool {
        self.rows.load().contains_key(id)
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for EntityTable<E> {
    async fn fetch(&self, ids: &[E::Id]) -> Result<Vec<E>> {
        if self.config.yield_on_io {
            tokio::task::yield_now().await;
        }
        let rows = self.rows.load_full();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }
}
