//! In-memory storage for sibling relations.
//!
//! `EntityTable` holds the self-referencing entity rows and `PivotTable`
//! holds the pivot rows of one relation kind, enforcing the composite
//! unique index and foreign keys. Both implement the core repository
//! traits, so a `SiblingRelation` can run against them directly.

pub mod config;
pub mod entity_table;
pub mod pivot_table;

pub use config::StoreConfig;
pub use entity_table::{EntityIndex, EntityTable};
pub use pivot_table::{PivotTable, StoredPivot};
