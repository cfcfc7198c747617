use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::{IdentifierOrderer, OrdererRegistry};
use crate::error::Result;

/// Numeric order for integer identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericOrder;

macro_rules! numeric_orderer {
    ($($ty:ty),*) => {
        $(
            impl IdentifierOrderer<$ty> for NumericOrder {
                fn name(&self) -> &str {
                    "int"
                }

                fn compare(&self, a: &$ty, b: &$ty) -> Ordering {
                    a.cmp(b)
                }
            }
        )*
    };
}

numeric_orderer!(i32, i64, u32, u64);

/// Byte-lexicographic order for string identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOrder;

impl IdentifierOrderer<String> for LexicalOrder {
    fn name(&self) -> &str {
        "string"
    }

    fn compare(&self, a: &String, b: &String) -> Ordering {
        a.as_bytes().cmp(b.as_bytes())
    }
}

/// UUID order matching the lexicographic order of the hyphenated rendering.
///
/// Hex digits sort the same as their nibble values in either case, and the
/// hyphens sit at fixed positions, so byte order equals string order.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidOrder;

impl IdentifierOrderer<Uuid> for UuidOrder {
    fn name(&self) -> &str {
        "uuid"
    }

    fn compare(&self, a: &Uuid, b: &Uuid) -> Ordering {
        a.as_bytes().cmp(b.as_bytes())
    }
}

/// Type alias for a custom comparison function.
pub type CompareFn<I> = dyn Fn(&I, &I) -> Ordering + Send + Sync;

/// Orderer backed by a caller-supplied comparison.
pub struct FnOrder<I> {
    name: String,
    compare: Arc<CompareFn<I>>,
}

impl<I> FnOrder<I> {
    /// Creates an orderer from a name and a total comparison function.
    pub fn new(
        name: impl Into<String>,
        compare: impl Fn(&I, &I) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            compare: Arc::new(compare),
        }
    }
}

impl<I> Clone for FnOrder<I> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<I> fmt::Debug for FnOrder<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOrder").field("name", &self.name).finish()
    }
}

impl<I> IdentifierOrderer<I> for FnOrder<I> {
    fn name(&self) -> &str {
        &self.name
    }

    fn compare(&self, a: &I, b: &I) -> Ordering {
        (self.compare)(a, b)
    }
}

/// Registers the built-in orderers.
///
/// `int` serves `i64`; the other integer widths get their own names.
pub fn register_builtin_orderers(registry: &OrdererRegistry) -> Result<()> {
    registry.register::<i64>("int", Arc::new(NumericOrder))?;
    registry.register::<i32>("int32", Arc::new(NumericOrder))?;
    registry.register::<u32>("uint32", Arc::new(NumericOrder))?;
    registry.register::<u64>("uint64", Arc::new(NumericOrder))?;
    registry.register::<String>("string", Arc::new(LexicalOrder))?;
    registry.register::<Uuid>("uuid", Arc::new(UuidOrder))?;
    Ok(())
}
