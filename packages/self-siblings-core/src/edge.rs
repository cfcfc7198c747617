//! Canonical (low, high) ordering of undirected edges.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::SelfLoopPolicy;
use crate::entity::Entity;
use crate::error::{Result, SiblingError};
use crate::ordering::{IdentifierOrderer, SiblingId};

/// Endpoints of an edge in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPair<I> {
    /// Canonically smaller endpoint
    pub low: I,
    /// Canonically larger endpoint
    pub high: I,
}

impl<I: PartialEq> CanonicalPair<I> {
    /// Returns the endpoint opposite `id`, or `None` if `id` is not an endpoint.
    ///
    /// For a degenerate pair (`low == high`) the other endpoint is `id` itself.
    pub fn other(&self, id: &I) -> Option<&I> {
        if self.low == *id {
            Some(&self.high)
        } else if self.high == *id {
            Some(&self.low)
        } else {
            None
        }
    }

    /// Returns true if `id` is one of the endpoints.
    pub fn contains(&self, id: &I) -> bool {
        self.low == *id || self.high == *id
    }

    /// Returns true for a self-loop stored under `SelfLoopPolicy::Permit`.
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}

/// Orders unordered endpoint pairs with an identifier orderer.
///
/// Stateless apart from its configuration; `canonicalize(a, b)` and
/// `canonicalize(b, a)` always agree.
#[derive(Debug, Clone)]
pub struct EdgeCanonicalizer<I> {
    orderer: Arc<dyn IdentifierOrderer<I>>,
    self_loop: SelfLoopPolicy,
}

impl<I: SiblingId> EdgeCanonicalizer<I> {
    /// Creates a canonicalizer with an explicit orderer.
    pub fn new(orderer: Arc<dyn IdentifierOrderer<I>>, self_loop: SelfLoopPolicy) -> Self {
        Self { orderer, self_loop }
    }

    /// Creates a canonicalizer with the identifier type's default orderer.
    pub fn with_default_orderer(self_loop: SelfLoopPolicy) -> Self {
        Self::new(Arc::new(I::Orderer::default()), self_loop)
    }

    /// Returns the orderer.
    pub fn orderer(&self) -> &dyn IdentifierOrderer<I> {
        self.orderer.as_ref()
    }

    /// Returns the self-loop policy.
    pub fn self_loop_policy(&self) -> SelfLoopPolicy {
        self.self_loop
    }

    /// Orders two endpoints into a canonical pair.
    ///
    /// # Returns
    /// `Err(SiblingError::SelfLoop)` if `a == b` and the policy is not `Permit`.
    pub fn canonicalize(&self, a: &I, b: &I) -> Result<CanonicalPair<I>> {
        match self.orderer.compare(a, b) {
            Ordering::Less => Ok(CanonicalPair {
                low: a.clone(),
                high: b.clone(),
            }),
            Ordering::Greater => Ok(CanonicalPair {
                low: b.clone(),
                high: a.clone(),
            }),
            Ordering::Equal => {
                if a != b {
                    // A non-total orderer would let reversed duplicates through.
                    return Err(SiblingError::Config(format!(
                        "orderer '{}' reports distinct identifiers {a} and {b} as equal",
                        self.orderer.name()
                    )));
                }
                match self.self_loop {
                    SelfLoopPolicy::Permit => Ok(CanonicalPair {
                        low: a.clone(),
                        high: b.clone(),
                    }),
                    SelfLoopPolicy::Reject | SelfLoopPolicy::Ignore => {
                        Err(SiblingError::SelfLoop { id: a.to_string() })
                    }
                }
            }
        }
    }

    /// Orders the identifiers of two saved entities.
    ///
    /// # Returns
    /// `Err(SiblingError::UnsavedEntity)` if either entity has no identifier.
    pub fn canonicalize_entities<E>(&self, a: &E, b: &E) -> Result<CanonicalPair<I>>
    where
        E: Entity<Id = I>,
    {
        match (a.id(), b.id()) {
            (Some(a), Some(b)) => self.canonicalize(&a, &b),
            _ => Err(SiblingError::unsaved("siblings must both have ids set")),
        }
    }
}
