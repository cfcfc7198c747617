//! Sibling relation error types.

use std::fmt;

use thiserror::Error;

/// Result type for sibling relation operations.
pub type Result<T> = std::result::Result<T, SiblingError>;

/// Storage constraint that rejected a pivot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Composite uniqueness over the two canonical endpoint columns
    CompositeUnique { low: String, high: String },
    /// Endpoint column references an entity that does not exist
    ForeignKey { column: String, id: String },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::CompositeUnique { low, high } => {
                write!(f, "unique(low, high) violated by ({low}, {high})")
            }
            Constraint::ForeignKey { column, id } => {
                write!(f, "foreign key '{column}' references missing entity {id}")
            }
        }
    }
}

/// Sibling relation errors.
#[derive(Error, Debug, Clone)]
pub enum SiblingError {
    /// Operation attempted with an entity that has no identifier
    #[error("Unsaved entity: {context}")]
    UnsavedEntity { context: String },

    /// Both endpoints of an edge are the same entity
    #[error("Entity {id} cannot be related to itself")]
    SelfLoop { id: String },

    /// Storage rejected a pivot row
    #[error("Constraint violation on pivot '{pivot}': {constraint}")]
    ConstraintViolation { pivot: String, constraint: Constraint },

    /// Cached relation value read before any load
    #[error("Relation {relation} not loaded, call load() first")]
    NotLoaded { relation: String },

    /// Generic storage failure from a collaborator
    #[error("Storage error: {0}")]
    Storage(String),

    /// No orderer is available for the configured identifier type
    #[error("Unsupported identifier type {identifier} for orderer '{orderer}'")]
    UnsupportedIdentifier { orderer: String, identifier: String },

    /// Invalid relation or registry configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SiblingError {
    pub(crate) fn unsaved(context: impl Into<String>) -> Self {
        SiblingError::UnsavedEntity {
            context: context.into(),
        }
    }

    /// Returns true if this is the composite-uniqueness violation on `pivot`.
    ///
    /// This is the only error a caller may read as "already attached" when
    /// racing other attachers. Foreign key failures and violations on other
    /// pivots do not qualify.
    pub fn is_duplicate_edge(&self, pivot: &str) -> bool {
        matches!(
            self,
            SiblingError::ConstraintViolation {
                pivot: p,
                constraint: Constraint::CompositeUnique { .. },
            } if p == pivot
        )
    }
}
