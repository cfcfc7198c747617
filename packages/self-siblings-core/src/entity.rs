//! Entity trait for rows of the self-referencing table.

use crate::ordering::SiblingId;

/// Row of the table on both sides of a sibling relation.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identifier type
    type Id: SiblingId;

    /// Returns the identifier, or `None` if the entity has not been saved.
    fn id(&self) -> Option<Self::Id>;
}
