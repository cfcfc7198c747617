use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::IdentifierOrderer;
use crate::error::{Result, SiblingError};

/// Registered orderer with the identifier type it serves.
struct RegisteredOrderer {
    identifier: TypeId,
    identifier_name: &'static str,
    /// Holds an `Arc<dyn IdentifierOrderer<I>>` for the registered `I`
    orderer: Box<dyn Any + Send + Sync>,
}

/// Registry for identifier orderers.
///
/// Maps orderer names from configuration to concrete orderers. Lookups
/// check the identifier type, so a relation configured with an orderer
/// for the wrong type fails when the relation kind is built, before any
/// pivot row is written.
#[derive(Default)]
pub struct OrdererRegistry {
    orderers: RwLock<HashMap<String, RegisteredOrderer>>,
}

impl std::fmt::Debug for OrdererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdererRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl OrdererRegistry {
    /// Creates a new empty orderer registry.
    pub fn new() -> Self {
        Self {
            orderers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an orderer for identifier type `I` under `name`.
    ///
    /// # Returns
    /// `Ok(())` if successful, `Err(SiblingError::Config)` if the name is taken.
    pub fn register<I: 'static>(
        &self,
        name: &str,
        orderer: Arc<dyn IdentifierOrderer<I>>,
    ) -> Result<()> {
        let mut orderers = self
            .orderers
            .write()
            .map_err(|_| SiblingError::Config("orderer registry lock poisoned".to_string()))?;

        if orderers.contains_key(name) {
            return Err(SiblingError::Config(format!(
                "orderer '{name}' already registered"
            )));
        }

        orderers.insert(
            name.to_string(),
            RegisteredOrderer {
                identifier: TypeId::of::<I>(),
                identifier_name: type_name::<I>(),
                orderer: Box::new(orderer),
            },
        );
        tracing::debug!("Registered orderer {} for {}", name, type_name::<I>());
        Ok(())
    }

    /// Resolves the orderer registered as `name` for identifier type `I`.
    ///
    /// # Returns
    /// `Err(SiblingError::UnsupportedIdentifier)` if the name is unknown or
    /// was registered for a different identifier type.
    pub fn resolve<I: 'static>(&self, name: &str) -> Result<Arc<dyn IdentifierOrderer<I>>> {
        let unsupported = || SiblingError::UnsupportedIdentifier {
            orderer: name.to_string(),
            identifier: type_name::<I>().to_string(),
        };

        let orderers = self
            .orderers
            .read()
            .map_err(|_| SiblingError::Config("orderer registry lock poisoned".to_string()))?;
        let entry = orderers.get(name).ok_or_else(unsupported)?;

        if entry.identifier != TypeId::of::<I>() {
            tracing::debug!(
                "Orderer {} serves {}, requested for {}",
                name,
                entry.identifier_name,
                type_name::<I>()
            );
            return Err(unsupported());
        }

        entry
            .orderer
            .downcast_ref::<Arc<dyn IdentifierOrderer<I>>>()
            .cloned()
            .ok_or_else(unsupported)
    }

    /// Checks if an orderer is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        match self.orderers.read() {
            Ok(guard) => guard.contains_key(name),
            Err(_) => false,
        }
    }

    /// Returns all registered orderer names, sorted.
    pub fn names(&self) -> Vec<String> {
        let orderers = match self.orderers.read() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };
        let mut names: Vec<String> = orderers.keys().cloned().collect();
        names.sort();
        names
    }
}
