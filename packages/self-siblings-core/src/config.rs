//! Relation configuration.

use serde::{Deserialize, Serialize};

/// What to do when both endpoints of an edge are the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopPolicy {
    /// Fail with `SiblingError::SelfLoop`
    #[default]
    Reject,
    /// Attaching an entity to itself succeeds without writing a row
    Ignore,
    /// Store a degenerate edge with `low == high`
    Permit,
}

/// Relation kind configuration.
///
/// Names the pivot, its two endpoint columns and the identifier orderer.
/// Column accessors are bound in code; this only carries what can be
/// checked and logged at setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationConfig {
    /// Pivot table name
    pub pivot: String,
    /// Column holding the canonically lower endpoint
    pub from_column: String,
    /// Column holding the canonically higher endpoint
    pub to_column: String,
    /// Orderer name in the `OrdererRegistry` (e.g. "int", "string", "uuid")
    pub identifier: String,
    /// Self-loop handling
    pub self_loop: SelfLoopPolicy,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            pivot: "pivot".to_string(),
            from_column: "from_id".to_string(),
            to_column: "to_id".to_string(),
            identifier: "int".to_string(),
            self_loop: SelfLoopPolicy::Reject,
        }
    }
}
