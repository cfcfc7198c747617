//! Self-referencing sibling relation bound to one source entity.
//!
//! A `SiblingRelation` turns "attach B to A" into a single pivot row whose
//! `from`/`to` columns hold the canonical `(low, high)` order of the two
//! ids. Every operation canonicalizes first, so the result is the same
//! whichever endpoint the relation is bound to.
//!
//! # Concurrency
//! `attach` with [`AttachMethod::IfNotExists`] checks and then creates in
//! two round trips. Two callers racing on the same pair can both see "not
//! attached"; the pivot's composite unique index then rejects the second
//! create with `SiblingError::ConstraintViolation`. That index is the only
//! thing preventing duplicates under contention. Callers wanting
//! insert-or-ignore semantics use [`SiblingRelation::attach_or_ignore_duplicate`].

use std::sync::Arc;

use crate::cache::LazyLoadCache;
use crate::config::SelfLoopPolicy;
use crate::edge::CanonicalPair;
use crate::entity::Entity;
use crate::error::{Result, SiblingError};
use crate::kind::{short_type_name, RelationKind};
use crate::repository::{EntityQuery, EntityRepository, PivotRepository};

/// How `attach` decides whether to create the pivot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachMethod {
    /// Always create the pivot row
    #[default]
    Always,
    /// Only create the pivot row if the pair is not attached yet
    IfNotExists,
}

/// Symmetric many-to-many relation between rows of entity `E` through pivot `P`.
pub struct SiblingRelation<E, P>
where
    E: Entity,
    P: Default + Clone + Send + Sync + 'static,
{
    kind: Arc<RelationKind<P, E::Id>>,
    pivots: Arc<dyn PivotRepository<P, E::Id>>,
    entities: Arc<dyn EntityRepository<E>>,
    /// Identifier of the bound source entity
    source: Option<E::Id>,
    cache: LazyLoadCache<E>,
}

impl<E, P> SiblingRelation<E, P>
where
    E: Entity,
    P: Default + Clone + Send + Sync + 'static,
{
    /// Creates an unbound relation.
    pub fn new(
        kind: Arc<RelationKind<P, E::Id>>,
        pivots: Arc<dyn PivotRepository<P, E::Id>>,
        entities: Arc<dyn EntityRepository<E>>,
    ) -> Self {
        Self {
            kind,
            pivots,
            entities,
            source: None,
            cache: LazyLoadCache::new(),
        }
    }

    /// Binds the relation to `entity`, consuming and returning it.
    pub fn bound_to(mut self, entity: &E) -> Self {
        self.bind(entity);
        self
    }

    /// Binds the relation to `entity`. An unsaved entity leaves it unbound.
    pub fn bind(&mut self, entity: &E) {
        match entity.id() {
            Some(id) => self.bind_id(id),
            None => {
                self.source = None;
                self.cache.invalidate();
            }
        }
    }

    /// Binds the relation to a source identifier.
    pub fn bind_id(&mut self, id: E::Id) {
        if self.source.as_ref() != Some(&id) {
            self.cache.invalidate();
        }
        self.source = Some(id);
    }

    /// Returns the bound source identifier.
    pub fn source_id(&self) -> Option<&E::Id> {
        self.source.as_ref()
    }

    /// Returns the relation kind.
    pub fn kind(&self) -> &RelationKind<P, E::Id> {
        &self.kind
    }

    /// Descriptive relation name.
    pub fn name(&self) -> String {
        self.kind.name_for(short_type_name::<E>())
    }

    fn require_source(&self, context: &str) -> Result<&E::Id> {
        self.source
            .as_ref()
            .ok_or_else(|| SiblingError::unsaved(format!("{context}: {} is unbound", self.name())))
    }

    fn require_target(target: &E, context: &str) -> Result<E::Id> {
        target
            .id()
            .ok_or_else(|| SiblingError::unsaved(format!("{context}: target has no id")))
    }

    /// Canonical pair for source and `target`; `None` for an ignored self-loop.
    fn pair_with(&self, target: &E::Id, context: &str) -> Result<Option<CanonicalPair<E::Id>>> {
        let source = self.require_source(context)?;
        let canonicalizer = self.kind.canonicalizer();
        if source == target && canonicalizer.self_loop_policy() == SelfLoopPolicy::Ignore {
            return Ok(None);
        }
        canonicalizer.canonicalize(source, target).map(Some)
    }

    /// Checks whether `to` is attached to the source entity.
    pub async fn is_attached(&self, to: &E) -> Result<bool> {
        let to = Self::require_target(to, "Cannot check attachment of unsaved model")?;
        self.is_attached_id(&to).await
    }

    /// Checks whether the entity with id `to` is attached to the source entity.
    pub async fn is_attached_id(&self, to: &E::Id) -> Result<bool> {
        let Some(pair) = self.pair_with(to, "Cannot check attachment")? else {
            return Ok(false);
        };
        let found = self.pivots.find(&pair.low, &pair.high).await?.is_some();
        tracing::debug!(
            "{} pair ({}, {}) attached: {}",
            self.kind.pivot(),
            pair.low,
            pair.high,
            found
        );
        Ok(found)
    }

    /// Attaches `to` by creating a pivot row according to `method`.
    ///
    /// `edit` runs on the new row before it is saved and may fill payload
    /// columns. It must not change the endpoint columns.
    pub async fn attach(
        &mut self,
        to: &E,
        method: AttachMethod,
        edit: impl FnOnce(&mut P) + Send,
    ) -> Result<()> {
        let to = Self::require_target(to, "Cannot attach unsaved model")?;
        self.attach_id(&to, method, edit).await
    }

    /// Attaches the entity with id `to`. See [`SiblingRelation::attach`].
    pub async fn attach_id(
        &mut self,
        to: &E::Id,
        method: AttachMethod,
        edit: impl FnOnce(&mut P) + Send,
    ) -> Result<()> {
        let Some(pair) = self.pair_with(to, "Cannot attach siblings relation to unsaved model")?
        else {
            tracing::debug!("Ignoring self-loop attach on {}", self.name());
            return Ok(());
        };

        if method == AttachMethod::IfNotExists
            && self.pivots.find(&pair.low, &pair.high).await?.is_some()
        {
            tracing::debug!(
                "{} pair ({}, {}) already attached",
                self.kind.pivot(),
                pair.low,
                pair.high
            );
            return Ok(());
        }

        let mut row = self.kind.new_row(pair.clone());
        edit(&mut row);
        let row_id = self.pivots.create(row).await?;
        self.cache.invalidate();
        tracing::info!(
            "Attached {} pair ({}, {}) as row {}",
            self.kind.pivot(),
            pair.low,
            pair.high,
            row_id
        );
        Ok(())
    }

    /// Attaches `to`, treating a duplicate-edge violation as already attached.
    ///
    /// # Returns
    /// `Ok(true)` if this call created the row, `Ok(false)` if the pair was
    /// attached already, including when a concurrent attacher won the race,
    /// or if an ignored self-loop wrote nothing.
    pub async fn attach_or_ignore_duplicate(
        &mut self,
        to: &E,
        edit: impl FnOnce(&mut P) + Send,
    ) -> Result<bool> {
        let to = Self::require_target(to, "Cannot attach unsaved model")?;
        if self
            .pair_with(&to, "Cannot attach siblings relation to unsaved model")?
            .is_none()
        {
            tracing::debug!("Ignoring self-loop attach on {}", self.name());
            return Ok(false);
        }
        if self.is_attached_id(&to).await? {
            return Ok(false);
        }
        match self.attach_id(&to, AttachMethod::Always, edit).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_duplicate_edge(self.kind.pivot()) => {
                tracing::debug!("Lost attach race on {}: {}", self.name(), err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Attaches every entity in `tos` in one batch create.
    ///
    /// Pairs are canonicalized independently and not de-duplicated; a
    /// repeated or already attached pair fails the batch with a constraint
    /// violation from storage.
    pub async fn attach_many(
        &mut self,
        tos: &[E],
        edit: impl Fn(&mut P) + Send + Sync,
    ) -> Result<()> {
        let mut rows = Vec::with_capacity(tos.len());
        for to in tos {
            let to = Self::require_target(to, "Cannot attach unsaved model")?;
            if let Some(pair) =
                self.pair_with(&to, "Cannot attach siblings relation to unsaved model")?
            {
                let mut row = self.kind.new_row(pair);
                edit(&mut row);
                rows.push(row);
            }
        }
        if rows.is_empty() {
            return Ok(());
        }

        let count = rows.len();
        self.pivots.create_batch(rows).await?;
        self.cache.invalidate();
        tracing::info!("Attached {} {} rows in batch", count, self.kind.pivot());
        Ok(())
    }

    /// Detaches `to` by deleting the pivot row. Detaching an absent edge is a no-op.
    pub async fn detach(&mut self, to: &E) -> Result<()> {
        let to = Self::require_target(to, "Cannot detach unsaved model")?;
        self.detach_id(&to).await
    }

    /// Detaches the entity with id `to`.
    pub async fn detach_id(&mut self, to: &E::Id) -> Result<()> {
        let Some(pair) =
            self.pair_with(to, "Cannot detach siblings relation from unsaved model")?
        else {
            return Ok(());
        };

        let removed = self.pivots.delete(&pair.low, &pair.high).await?;
        if removed == 0 {
            tracing::debug!(
                "No {} row for ({}, {}) to detach",
                self.kind.pivot(),
                pair.low,
                pair.high
            );
            return Ok(());
        }
        self.cache.invalidate();
        tracing::info!(
            "Detached {} pair ({}, {})",
            self.kind.pivot(),
            pair.low,
            pair.high
        );
        Ok(())
    }

    /// Detaches every entity in `tos`, returning the number of rows removed.
    pub async fn detach_many(&mut self, tos: &[E]) -> Result<u64> {
        let mut pairs = Vec::with_capacity(tos.len());
        for to in tos {
            let to = Self::require_target(to, "Cannot detach unsaved model")?;
            if let Some(pair) =
                self.pair_with(&to, "Cannot detach siblings relation from unsaved model")?
            {
                pairs.push(pair);
            }
        }

        let mut removed = 0;
        for pair in &pairs {
            match self.pivots.delete(&pair.low, &pair.high).await {
                Ok(count) => removed += count,
                Err(err) => {
                    // Rows removed before the failure are gone.
                    if removed > 0 {
                        self.cache.invalidate();
                    }
                    return Err(err);
                }
            }
        }
        if removed > 0 {
            self.cache.invalidate();
        }
        tracing::info!("Detached {} {} rows", removed, self.kind.pivot());
        Ok(removed)
    }

    /// Detaches every sibling of the source entity, returning the number of rows removed.
    pub async fn detach_all(&mut self) -> Result<u64> {
        let source = self
            .require_source("Cannot detach siblings relation from unsaved model")?
            .clone();
        let removed = self.pivots.delete_touching(&source).await?;
        if removed > 0 {
            self.cache.invalidate();
        }
        tracing::info!(
            "Detached all {} rows touching {}: {}",
            self.kind.pivot(),
            source,
            removed
        );
        Ok(removed)
    }

    /// Returns the pivot rows where the source entity is either endpoint.
    pub async fn query_pivots(&self) -> Result<Vec<P>> {
        let source = self.require_source("Cannot query siblings relation from unsaved model")?;
        self.pivots.query_touching(source).await
    }

    /// Returns an unexecuted query over the source entity's siblings.
    ///
    /// Each touching row contributes whichever endpoint is not the source.
    /// A degenerate self-loop row contributes the source itself.
    pub async fn query(&self) -> Result<EntityQuery<E>> {
        let source = self.require_source("Cannot query siblings relation from unsaved model")?;
        let rows = self.pivots.query_touching(source).await?;

        let mut other_ids = Vec::with_capacity(rows.len());
        for row in &rows {
            let stored = self.kind.endpoints(row);
            match stored.other(source) {
                Some(other) => other_ids.push(other.clone()),
                None => {
                    return Err(SiblingError::Storage(format!(
                        "{} row ({}, {}) returned for {} does not reference it",
                        self.kind.pivot(),
                        stored.low,
                        stored.high,
                        source
                    )))
                }
            }
        }
        tracing::debug!(
            "Resolved {} siblings of {} through {}",
            other_ids.len(),
            source,
            self.kind.pivot()
        );
        Ok(EntityQuery::new(Arc::clone(&self.entities), other_ids))
    }

    /// Runs the sibling query and caches the result.
    pub async fn load(&mut self) -> Result<()> {
        let siblings = self.query().await?.all().await?;
        tracing::debug!("Loaded {} siblings into {}", siblings.len(), self.name());
        self.cache.store(siblings);
        Ok(())
    }

    /// Returns the loaded siblings.
    ///
    /// # Returns
    /// `Err(SiblingError::NotLoaded)` if `load` has not run since the last
    /// bind or mutation.
    pub fn value(&self) -> Result<&[E]> {
        self.cache.get(&self.name())
    }

    /// Returns whether a loaded value is cached.
    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    /// Drops the loaded value.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}
