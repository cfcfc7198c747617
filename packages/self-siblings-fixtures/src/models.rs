//! Fixture models: users and their friendships.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use self_siblings_core::{Entity, EndpointColumn};

/// A user. `id` is `None` until the user is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<Uuid>,
    pub name: String,
}

impl User {
    /// Creates an unsaved user.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl Entity for User {
    type Id = Uuid;

    fn id(&self) -> Option<Uuid> {
        self.id
    }
}

/// Friendship pivot row between two users.
///
/// `left_user` holds the canonically lower user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub left_user: Uuid,
    pub right_user: Uuid,
    /// Free-form note set when the friendship is attached
    pub note: Option<String>,
}

impl Friendship {
    /// Builds a row with endpoints exactly as given.
    pub fn between(left_user: Uuid, right_user: Uuid) -> Self {
        Self {
            left_user,
            right_user,
            note: None,
        }
    }
}

fn left_user(row: &Friendship) -> &Uuid {
    &row.left_user
}

fn right_user(row: &Friendship) -> &Uuid {
    &row.right_user
}

/// Endpoint bindings for the `left_user` / `right_user` columns.
pub fn friendship_columns() -> (
    EndpointColumn<Friendship, Uuid>,
    EndpointColumn<Friendship, Uuid>,
) {
    (
        EndpointColumn::new("left_user", left_user, |row: &mut Friendship, id| {
            row.left_user = id
        }),
        EndpointColumn::new("right_user", right_user, |row: &mut Friendship, id| {
            row.right_user = id
        }),
    )
}
