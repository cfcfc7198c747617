//! Total ordering over relation identifiers and orderer registration.

mod builtin_orderers;
mod orderer_registry;

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub use builtin_orderers::{register_builtin_orderers, FnOrder, LexicalOrder, NumericOrder, UuidOrder};
pub use orderer_registry::OrdererRegistry;

/// Total order over one identifier type.
///
/// Implementations must agree with the order the storage layer persists:
/// numeric for integers, lexicographic for strings and rendered UUIDs.
/// Two identifiers compare `Equal` only when they are the same identifier.
pub trait IdentifierOrderer<I>: Send + Sync + Debug {
    /// Orderer name used in configuration and registry lookups.
    fn name(&self) -> &str;

    /// Compares two identifiers.
    fn compare(&self, a: &I, b: &I) -> Ordering;
}

/// Identifier type usable as a sibling relation endpoint.
///
/// The associated orderer is the compile-time default. Identifier types
/// outside the built-in set opt in by implementing this trait, usually
/// with [`FnOrder`] or their own orderer.
pub trait SiblingId: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {
    /// Orderer used when a relation kind is built without configuration.
    type Orderer: IdentifierOrderer<Self> + Default + 'static;
}

impl SiblingId for i32 {
    type Orderer = NumericOrder;
}

impl SiblingId for i64 {
    type Orderer = NumericOrder;
}

impl SiblingId for u32 {
    type Orderer = NumericOrder;
}

impl SiblingId for u64 {
    type Orderer = NumericOrder;
}

impl SiblingId for String {
    type Orderer = LexicalOrder;
}

impl SiblingId for uuid::Uuid {
    type Orderer = UuidOrder;
}
