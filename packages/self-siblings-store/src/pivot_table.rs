//! Pivot table with create middleware, composite unique index and foreign keys.
//!
//! Each table serves one relation kind. Every insert path runs the
//! registered middleware first, then checks foreign keys, then the unique
//! index over the stored `(from, to)` values. The index compares values as
//! stored, so without a `ConsistencyGuard` installed a reversed row is a
//! different key.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::Mutex;
use self_siblings_core::{
    CanonicalPair, ConsistencyGuard, Constraint, PivotMiddleware, PivotRepository, RelationKind,
    Result, RowId, SiblingError, SiblingId,
};

use crate::config::StoreConfig;
use crate::entity_table::EntityIndex;

/// Stored pivot row with its surrogate identifier.
#[derive(Debug, Clone)]
pub struct StoredPivot<P> {
    /// Surrogate row identifier
    pub id: RowId,
    /// Row as persisted
    pub row: P,
}

/// Immutable snapshot of a pivot table.
#[derive(Debug, Clone)]
struct PivotState<P, I: SiblingId> {
    rows: Vec<StoredPivot<P>>,
    /// Composite unique index over (from, to)
    unique: HashMap<(I, I), RowId>,
}

/// In-memory pivot table for one relation kind.
pub struct PivotTable<P, I: SiblingId> {
    kind: Arc<RelationKind<P, I>>,
    state: ArcSwap<PivotState<P, I>>,
    write_lock: Mutex<()>,
    middleware: Vec<Arc<dyn PivotMiddleware<P>>>,
    entities: Option<Arc<dyn EntityIndex<I>>>,
    next_id: AtomicU64,
    config: StoreConfig,
}

impl<P, I> PivotTable<P, I>
where
    P: Default + Clone + Send + Sync + 'static,
    I: SiblingId,
{
    /// Creates an empty pivot table without middleware or foreign keys.
    pub fn new(kind: Arc<RelationKind<P, I>>, config: StoreConfig) -> Self {
        let state = PivotState {
            rows: Vec::with_capacity(config.initial_capacity),
            unique: HashMap::with_capacity(config.initial_capacity),
        };
        Self {
            kind,
            state: ArcSwap::new(Arc::new(state)),
            write_lock: Mutex::new(()),
            middleware: Vec::new(),
            entities: None,
            next_id: AtomicU64::new(1), // Start IDs at 1
            config,
        }
    }

    /// Creates a pivot table with the relation kind's consistency guard installed.
    pub fn guarded(kind: Arc<RelationKind<P, I>>, config: StoreConfig) -> Self {
        let guard = ConsistencyGuard::new(Arc::clone(&kind));
        Self::new(kind, config).with_middleware(Arc::new(guard))
    }

    /// Adds a create middleware. Middleware runs in registration order.
    pub fn with_middleware(mut self, middleware: Arc<dyn PivotMiddleware<P>>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// References `entities` from both endpoint columns.
    pub fn with_foreign_keys(mut self, entities: Arc<dyn EntityIndex<I>>) -> Self {
        self.entities = Some(entities);
        self
    }

    /// Returns the relation kind.
    pub fn kind(&self) -> &RelationKind<P, I> {
        &self.kind
    }

    /// Inserts a row directly, bypassing any relation object.
    ///
    /// Middleware and constraints apply exactly as for relation writes.
    pub fn insert(&self, row: P) -> Result<RowId> {
        let _guard = self.write_lock.lock();
        let mut state = PivotState::clone(&self.state.load_full());
        let id = self.insert_into(&mut state, row)?;
        self.state.store(Arc::new(state));
        Ok(id)
    }

    /// Inserts all rows or none of them.
    ///
    /// # Returns
    /// The first constraint violation if any row is rejected.
    pub fn insert_batch(&self, rows: Vec<P>) -> Result<Vec<RowId>> {
        let _guard = self.write_lock.lock();
        let mut state = PivotState::clone(&self.state.load_full());
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(self.insert_into(&mut state, row)?);
        }
        self.state.store(Arc::new(state));
        Ok(ids)
    }

    fn insert_into(&self, state: &mut PivotState<P, I>, mut row: P) -> Result<RowId> {
        for middleware in &self.middleware {
            middleware.on_create(&mut row)?;
        }

        let stored = self.kind.endpoints(&row);
        self.check_foreign_keys(&stored)?;

        let key = (stored.low, stored.high);
        if state.unique.contains_key(&key) {
            tracing::debug!(
                "Rejected duplicate {} row ({}, {})",
                self.kind.pivot(),
                key.0,
                key.1
            );
            return Err(SiblingError::ConstraintViolation {
                pivot: self.kind.pivot().to_string(),
                constraint: Constraint::CompositeUnique {
                    low: key.0.to_string(),
                    high: key.1.to_string(),
                },
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        state.unique.insert(key, id);
        state.rows.push(StoredPivot { id, row });
        Ok(id)
    }

    fn check_foreign_keys(&self, stored: &CanonicalPair<I>) -> Result<()> {
        if !self.config.enforce_foreign_keys {
            return Ok(());
        }
        let Some(entities) = &self.entities else {
            return Ok(());
        };

        let columns = [
            (&self.kind.from_column().name, &stored.low),
            (&self.kind.to_column().name, &stored.high),
        ];
        for (column, id) in columns {
            if !entities.contains_id(id) {
                tracing::debug!(
                    "{}.{} references missing {} row {}",
                    self.kind.pivot(),
                    column,
                    entities.table_name(),
                    id
                );
                return Err(SiblingError::ConstraintViolation {
                    pivot: self.kind.pivot().to_string(),
                    constraint: Constraint::ForeignKey {
                        column: column.clone(),
                        id: id.to_string(),
                    },
                });
            }
        }
        Ok(())
    }

    /// Returns all stored rows in insertion order.
    pub fn rows(&self) -> Vec<StoredPivot<P>> {
        self.state.load().rows.clone()
    }

    /// Returns the number of stored rows.
    pub fn len(&self) -> usize {
        self.state.load().rows.len()
    }

    /// Returns true if no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.state.load().rows.is_empty()
    }

    /// Returns the number of rows with exactly these endpoint values.
    pub fn count_pair(&self, from: &I, to: &I) -> usize {
        self.state
            .load()
            .rows
            .iter()
            .filter(|stored| {
                let pair = self.kind.endpoints(&stored.row);
                pair.low == *from && pair.high == *to
            })
            .count()
    }

    fn remove_where(&self, matches: impl Fn(&CanonicalPair<I>) -> bool) -> u64 {
        let _guard = self.write_lock.lock();
        let mut state = PivotState::clone(&self.state.load_full());
        let before = state.rows.len();
        let kind = &self.kind;
        state
            .rows
            .retain(|stored| !matches(&kind.endpoints(&stored.row)));
        let removed = (before - state.rows.len()) as u64;
        if removed > 0 {
            state.unique.retain(|(low, high), _| {
                !matches(&CanonicalPair {
                    low: low.clone(),
                    high: high.clone(),
                })
            });
            self.state.store(Arc::new(state));
        }
        removed
    }

    async fn io_point(&self) {
        if self.config.yield_on_io {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl<P, I> PivotRepository<P, I> for PivotTable<P, I>
where
    P: Default + Clone + Send + Sync + 'static,
    I: SiblingId,
{
    async fn create(&self, row: P) -> Result<RowId> {
        self.io_point().await;
        self.insert(row)
    }

    async fn create_batch(&self, rows: Vec<P>) -> Result<Vec<RowId>> {
        self.io_point().await;
        self.insert_batch(rows)
    }

    async fn find(&self, low: &I, high: &I) -> Result<Option<P>> {
        self.io_point().await;
        let state = self.state.load_full();
        let key = (low.clone(), high.clone());
        let Some(id) = state.unique.get(&key) else {
            return Ok(None);
        };
        Ok(state
            .rows
            .iter()
            .find(|stored| stored.id == *id)
            .map(|stored| stored.row.clone()))
    }

    async fn query_touching(&self, id: &I) -> Result<Vec<P>> {
        self.io_point().await;
        let state = self.state.load_full();
        Ok(state
            .rows
            .iter()
            .filter(|stored| self.kind.endpoints(&stored.row).contains(id))
            .map(|stored| stored.row.clone())
            .collect())
    }

    async fn delete(&self, low: &I, high: &I) -> Result<u64> {
        self.io_point().await;
        Ok(self.remove_where(|pair| pair.low == *low && pair.high == *high))
    }

    async fn delete_touching(&self, id: &I) -> Result<u64> {
        self.io_point().await;
        Ok(self.remove_where(|pair| pair.contains(id)))
    }
}
