//! Relation kind: a pivot type bound to its two endpoint columns.

use std::any::type_name;
use std::fmt;

use crate::config::RelationConfig;
use crate::edge::{CanonicalPair, EdgeCanonicalizer};
use crate::error::{Result, SiblingError};
use crate::ordering::{OrdererRegistry, SiblingId};

/// One endpoint column of a pivot row.
pub struct EndpointColumn<P, I> {
    /// Column name as stored
    pub name: String,
    /// Reads the endpoint from a row
    pub get: fn(&P) -> &I,
    /// Writes the endpoint into a row
    pub set: fn(&mut P, I),
}

impl<P, I> EndpointColumn<P, I> {
    /// Creates an endpoint column binding.
    pub fn new(name: impl Into<String>, get: fn(&P) -> &I, set: fn(&mut P, I)) -> Self {
        Self {
            name: name.into(),
            get,
            set,
        }
    }
}

impl<P, I> Clone for EndpointColumn<P, I> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            get: self.get,
            set: self.set,
        }
    }
}

impl<P, I> fmt::Debug for EndpointColumn<P, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointColumn")
            .field("name", &self.name)
            .finish()
    }
}

/// Pivot type `P` with its `from`/`to` endpoint columns over identifier `I`.
///
/// `from` always holds the canonical `low` endpoint and `to` the `high`
/// endpoint. Built once when the relation is set up; relations and guards
/// share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RelationKind<P, I> {
    pivot: String,
    from: EndpointColumn<P, I>,
    to: EndpointColumn<P, I>,
    canonicalizer: EdgeCanonicalizer<I>,
}

impl<P, I> RelationKind<P, I>
where
    P: Default + Clone + Send + Sync + 'static,
    I: SiblingId,
{
    /// Creates a relation kind from explicit parts.
    pub fn new(
        pivot: impl Into<String>,
        from: EndpointColumn<P, I>,
        to: EndpointColumn<P, I>,
        canonicalizer: EdgeCanonicalizer<I>,
    ) -> Result<Self> {
        let pivot = pivot.into();
        if from.name == to.name {
            return Err(SiblingError::Config(format!(
                "pivot '{pivot}' binds both endpoints to column '{}'",
                from.name
            )));
        }
        Ok(Self {
            pivot,
            from,
            to,
            canonicalizer,
        })
    }

    /// Creates a relation kind from configuration, resolving the orderer.
    ///
    /// Column names in `config` are applied to the accessor bindings. Fails
    /// here, at setup, if the configured orderer does not serve `I`.
    pub fn from_config(
        config: &RelationConfig,
        registry: &OrdererRegistry,
        from: EndpointColumn<P, I>,
        to: EndpointColumn<P, I>,
    ) -> Result<Self> {
        let orderer = registry.resolve::<I>(&config.identifier)?;
        let canonicalizer = EdgeCanonicalizer::new(orderer, config.self_loop);
        let from = EndpointColumn {
            name: config.from_column.clone(),
            ..from
        };
        let to = EndpointColumn {
            name: config.to_column.clone(),
            ..to
        };
        let kind = Self::new(config.pivot.clone(), from, to, canonicalizer)?;
        tracing::debug!(
            "Configured relation {} with orderer {} and self-loop policy {:?}",
            kind.name_for(short_type_name::<I>()),
            config.identifier,
            config.self_loop
        );
        Ok(kind)
    }

    /// Returns the pivot name.
    pub fn pivot(&self) -> &str {
        &self.pivot
    }

    /// Returns the column holding the low endpoint.
    pub fn from_column(&self) -> &EndpointColumn<P, I> {
        &self.from
    }

    /// Returns the column holding the high endpoint.
    pub fn to_column(&self) -> &EndpointColumn<P, I> {
        &self.to
    }

    /// Returns the canonicalizer.
    pub fn canonicalizer(&self) -> &EdgeCanonicalizer<I> {
        &self.canonicalizer
    }

    /// Descriptive relation name for an entity type,
    /// e.g. `SelfSiblings<User, friendships>(from: left_user, to: right_user)`.
    pub fn name_for(&self, entity: &str) -> String {
        format!(
            "SelfSiblings<{}, {}>(from: {}, to: {})",
            entity, self.pivot, self.from.name, self.to.name
        )
    }

    /// Reads both endpoints of a row as stored, without reordering.
    pub fn endpoints(&self, row: &P) -> CanonicalPair<I> {
        CanonicalPair {
            low: (self.from.get)(row).clone(),
            high: (self.to.get)(row).clone(),
        }
    }

    /// Writes a canonical pair into a row.
    pub fn write_endpoints(&self, row: &mut P, pair: CanonicalPair<I>) {
        (self.from.set)(row, pair.low);
        (self.to.set)(row, pair.high);
    }

    /// Builds a new pivot row for a canonical pair.
    pub fn new_row(&self, pair: CanonicalPair<I>) -> P {
        let mut row = P::default();
        self.write_endpoints(&mut row, pair);
        row
    }
}

pub(crate) fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
