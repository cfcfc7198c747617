//! Fixture database wiring users, friendships and the consistency guard.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use self_siblings_core::ordering::register_builtin_orderers;
use self_siblings_core::{
    OrdererRegistry, RelationConfig, RelationKind, Result, SelfLoopPolicy, SiblingError,
    SiblingRelation,
};
use self_siblings_store::{EntityTable, PivotTable, StoreConfig};

use crate::models::{friendship_columns, Friendship, User};

/// Relation config for the friendship pivot.
pub fn friendship_config() -> RelationConfig {
    RelationConfig {
        pivot: "friendships".to_string(),
        from_column: "left_user".to_string(),
        to_column: "right_user".to_string(),
        identifier: "uuid".to_string(),
        self_loop: SelfLoopPolicy::Reject,
    }
}

/// Parses a relation config from JSON. Missing fields take the
/// friendship defaults.
pub fn friendship_config_from_json(json: &str) -> Result<RelationConfig> {
    let mut value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| SiblingError::Config(format!("invalid relation config: {e}")))?;
    let defaults = serde_json::to_value(friendship_config())
        .map_err(|e| SiblingError::Config(e.to_string()))?;

    if let (Some(target), Some(defaults)) = (value.as_object_mut(), defaults.as_object()) {
        for (key, default) in defaults {
            target.entry(key.clone()).or_insert_with(|| default.clone());
        }
    }
    serde_json::from_value(value)
        .map_err(|e| SiblingError::Config(format!("invalid relation config: {e}")))
}

/// One user and the users they are friends with.
#[derive(Debug, Clone, Serialize)]
pub struct FriendList {
    pub user: User,
    pub friends: Vec<User>,
}

/// Users table plus a guarded friendships pivot with foreign keys.
pub struct FixtureDb {
    users: Arc<EntityTable<User>>,
    friendships: Arc<PivotTable<Friendship, Uuid>>,
    kind: Arc<RelationKind<Friendship, Uuid>>,
}

impl FixtureDb {
    /// Creates an empty database with the default friendship config.
    pub fn new() -> Result<Self> {
        Self::with_config(&friendship_config(), StoreConfig::default())
    }

    /// Creates an empty database.
    pub fn with_config(relation: &RelationConfig, store: StoreConfig) -> Result<Self> {
        let registry = OrdererRegistry::new();
        register_builtin_orderers(&registry)?;

        let (from, to) = friendship_columns();
        let kind = Arc::new(RelationKind::from_config(relation, &registry, from, to)?);
        let users = Arc::new(EntityTable::new("users", store.clone()));
        let friendships = Arc::new(
            PivotTable::guarded(Arc::clone(&kind), store).with_foreign_keys(users.clone()),
        );

        tracing::info!(
            "Created fixture database with relation {}",
            kind.name_for("User")
        );
        Ok(Self {
            users,
            friendships,
            kind,
        })
    }

    /// Returns the users table.
    pub fn users(&self) -> &Arc<EntityTable<User>> {
        &self.users
    }

    /// Returns the friendships pivot table.
    pub fn friendships(&self) -> &Arc<PivotTable<Friendship, Uuid>> {
        &self.friendships
    }

    /// Returns the friendship relation kind.
    pub fn kind(&self) -> &Arc<RelationKind<Friendship, Uuid>> {
        &self.kind
    }

    /// Saves a new user with a fresh id.
    pub fn create_user(&self, name: impl Into<String>) -> Result<User> {
        let user = User {
            id: Some(Uuid::new_v4()),
            name: name.into(),
        };
        self.users.save(user.clone())?;
        Ok(user)
    }

    /// Returns an unbound friendship relation.
    pub fn friends(&self) -> SiblingRelation<User, Friendship> {
        SiblingRelation::new(
            Arc::clone(&self.kind),
            self.friendships.clone(),
            self.users.clone(),
        )
    }

    /// Returns the friendship relation bound to `user`.
    pub fn friends_of(&self, user: &User) -> SiblingRelation<User, Friendship> {
        self.friends().bound_to(user)
    }

    /// Deletes a user together with every friendship touching them.
    ///
    /// # Returns
    /// The number of friendships removed.
    pub async fn delete_user(&self, user: &User) -> Result<u64> {
        let mut relation = self.friends_of(user);
        let removed = relation.detach_all().await?;
        if let Some(id) = user.id {
            self.users.remove(&id);
        }
        Ok(removed)
    }

    /// Loads every user's friends, ordered by user name.
    pub async fn friend_lists(&self) -> Result<Vec<FriendList>> {
        let mut users = self.users.all();
        users.sort_by(|a, b| a.name.cmp(&b.name));

        let mut lists = Vec::with_capacity(users.len());
        for user in users {
            let friends = self
                .friends_of(&user)
                .query()
                .await?
                .sort_by(|a, b| a.name.cmp(&b.name))
                .all()
                .await?;
            lists.push(FriendList { user, friends });
        }
        Ok(lists)
    }

    /// Finds a saved user by name.
    pub fn find_user(&self, name: &str) -> Option<User> {
        self.users.all().into_iter().find(|user| user.name == name)
    }
}
