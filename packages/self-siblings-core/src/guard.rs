//! Insert-time canonicalization of pivot rows.

use std::sync::Arc;

use crate::error::Result;
use crate::kind::RelationKind;
use crate::ordering::SiblingId;

/// Hook run by storage on every pivot row creation, before the row is stored.
///
/// A middleware may rewrite the row in place or reject it. Storage must run
/// it for every insert path, including rows built directly by callers.
pub trait PivotMiddleware<P>: Send + Sync {
    /// Called with the row about to be created.
    fn on_create(&self, row: &mut P) -> Result<()>;
}

/// Rewrites pivot rows of one relation kind into canonical order.
///
/// With the guard installed, a reversed duplicate becomes an exact
/// duplicate before it reaches the composite unique index, and is rejected
/// there.
pub struct ConsistencyGuard<P, I> {
    kind: Arc<RelationKind<P, I>>,
}

impl<P, I> ConsistencyGuard<P, I>
where
    P: Default + Clone + Send + Sync + 'static,
    I: SiblingId,
{
    /// Creates a guard for `kind`.
    pub fn new(kind: Arc<RelationKind<P, I>>) -> Self {
        Self { kind }
    }

    /// Returns the relation kind this guard is bound to.
    pub fn kind(&self) -> &RelationKind<P, I> {
        &self.kind
    }

    /// Rewrites the row's endpoint columns in canonical order.
    ///
    /// # Returns
    /// `Err(SiblingError::SelfLoop)` if both endpoints are equal and the
    /// relation does not permit self-loops.
    pub fn normalize(&self, row: &mut P) -> Result<()> {
        let stored = self.kind.endpoints(row);
        let canonical = self
            .kind
            .canonicalizer()
            .canonicalize(&stored.low, &stored.high)?;

        if canonical != stored {
            tracing::warn!(
                "Reordering reversed {} row ({}, {}) to ({}, {})",
                self.kind.pivot(),
                stored.low,
                stored.high,
                canonical.low,
                canonical.high
            );
            self.kind.write_endpoints(row, canonical);
        }
        Ok(())
    }
}

impl<P, I> PivotMiddleware<P> for ConsistencyGuard<P, I>
where
    P: Default + Clone + Send + Sync + 'static,
    I: SiblingId,
{
    fn on_create(&self, row: &mut P) -> Result<()> {
        self.normalize(row)
    }
}
