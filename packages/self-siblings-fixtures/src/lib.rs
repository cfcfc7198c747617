//! User/Friendship fixtures for sibling relations.
//!
//! `FixtureDb` wires a users table to a friendships pivot with the
//! consistency guard and foreign keys installed, the way an application
//! would set the relation up.

pub mod db;
pub mod models;
pub mod seed;

pub use db::{friendship_config, friendship_config_from_json, FixtureDb, FriendList};
pub use models::{friendship_columns, Friendship, User};
pub use seed::{seed_friendships, seed_users};
