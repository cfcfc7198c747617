//! Storage collaborator interfaces driven by sibling relations.
//!
//! The core never talks to a storage engine directly. Pivot rows go through
//! a [`PivotRepository`], counterpart entities come back through an
//! [`EntityRepository`]. Both are async; cancellation and timeouts belong to
//! the implementation and surface unchanged.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::Result;

/// Surrogate pivot row identifier assigned by storage.
pub type RowId = u64;

/// Pivot row storage for one relation kind.
///
/// `low`/`high` arguments are canonical endpoint values; implementations
/// match them against the relation kind's `from`/`to` columns.
#[async_trait]
pub trait PivotRepository<P, I>: Send + Sync
where
    P: Send + Sync + 'static,
    I: Send + Sync + 'static,
{
    /// Persists one row. Uniqueness and foreign key failures surface as
    /// `SiblingError::ConstraintViolation`.
    async fn create(&self, row: P) -> Result<RowId>;

    /// Persists several rows in one request.
    async fn create_batch(&self, rows: Vec<P>) -> Result<Vec<RowId>>;

    /// Finds the row with exactly these endpoints.
    async fn find(&self, low: &I, high: &I) -> Result<Option<P>>;

    /// Returns every row where `id` is either endpoint.
    async fn query_touching(&self, id: &I) -> Result<Vec<P>>;

    /// Deletes the row with exactly these endpoints, returning the count removed.
    async fn delete(&self, low: &I, high: &I) -> Result<u64>;

    /// Deletes every row where `id` is either endpoint, returning the count removed.
    async fn delete_touching(&self, id: &I) -> Result<u64>;
}

/// Entity storage used to materialize counterpart entities.
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync {
    /// Fetches the entities with the given identifiers. Missing ids are skipped.
    async fn fetch(&self, ids: &[E::Id]) -> Result<Vec<E>>;
}

type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
type Comparator<E> = Arc<dyn Fn(&E, &E) -> Ordering + Send + Sync>;

/// Unexecuted query over entities scoped to a set of identifiers.
///
/// Nothing is fetched until `all`, `first` or `count` runs, so callers can
/// keep narrowing the query after a relation resolves it.
pub struct EntityQuery<E: Entity> {
    source: Arc<dyn EntityRepository<E>>,
    ids: Vec<E::Id>,
    filters: Vec<Predicate<E>>,
    sort: Option<Comparator<E>>,
    limit: Option<usize>,
}

impl<E: Entity> fmt::Debug for EntityQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("ids", &self.ids)
            .field("filters", &self.filters.len())
            .field("sorted", &self.sort.is_some())
            .field("limit", &self.limit)
            .finish()
    }
}

impl<E: Entity> EntityQuery<E> {
    /// Creates a query over `ids` against `source`.
    pub fn new(source: Arc<dyn EntityRepository<E>>, ids: Vec<E::Id>) -> Self {
        Self {
            source,
            ids,
            filters: Vec::new(),
            sort: None,
            limit: None,
        }
    }

    /// Returns the identifiers the query is scoped to.
    pub fn ids(&self) -> &[E::Id] {
        &self.ids
    }

    /// Keeps only entities matching `predicate`.
    pub fn filter(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.filters.push(Arc::new(predicate));
        self
    }

    /// Removes `id` from the scoped identifiers.
    pub fn exclude(mut self, id: &E::Id) -> Self {
        self.ids.retain(|scoped| scoped != id);
        self
    }

    /// Orders results with `compare`.
    pub fn sort_by(
        mut self,
        compare: impl Fn(&E, &E) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.sort = Some(Arc::new(compare));
        self
    }

    /// Caps the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Executes the query.
    pub async fn all(self) -> Result<Vec<E>> {
        if self.ids.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = self.source.fetch(&self.ids).await?;
        let mut matched: Vec<E> = fetched
            .into_iter()
            .filter(|entity| self.filters.iter().all(|keep| keep(entity)))
            .collect();

        if let Some(compare) = &self.sort {
            matched.sort_by(|a, b| compare(a, b));
        }
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        tracing::debug!("Entity query over {} ids matched {}", self.ids.len(), matched.len());
        Ok(matched)
    }

    /// Executes the query and returns the first result.
    pub async fn first(self) -> Result<Option<E>> {
        Ok(self.limit(1).all().await?.into_iter().next())
    }

    /// Executes the query and returns the number of results.
    pub async fn count(self) -> Result<usize> {
        Ok(self.all().await?.len())
    }
}
