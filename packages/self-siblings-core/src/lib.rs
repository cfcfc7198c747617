//! Self-referencing sibling relations over a single entity table.
//!
//! Provides identifier ordering, edge canonicalization, relation kinds,
//! storage collaborator traits, the sibling relation itself, and the
//! insert-time consistency guard.

pub mod cache;
pub mod config;
pub mod edge;
pub mod entity;
pub mod error;
pub mod guard;
pub mod kind;
pub mod ordering;
pub mod relation;
pub mod repository;

pub use cache::LazyLoadCache;
pub use config::{RelationConfig, SelfLoopPolicy};
pub use edge::{CanonicalPair, EdgeCanonicalizer};
pub use entity::Entity;
pub use error::{Constraint, Result, SiblingError};
pub use guard::{ConsistencyGuard, PivotMiddleware};
pub use kind::{EndpointColumn, RelationKind};
pub use ordering::{IdentifierOrderer, OrdererRegistry, SiblingId};
pub use relation::{AttachMethod, SiblingRelation};
pub use repository::{EntityQuery, EntityRepository, PivotRepository, RowId};
