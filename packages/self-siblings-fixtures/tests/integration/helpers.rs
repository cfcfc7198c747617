//! Shared helpers for integration tests.

use self_siblings_core::SiblingError;
use self_siblings_fixtures::{seed_users, FixtureDb, User};

/// Creates a fixture database with the named users saved.
pub fn db_with_users(names: &[&str]) -> (FixtureDb, Vec<User>) {
    let db = FixtureDb::new().unwrap();
    let users = seed_users(&db, names).unwrap();
    (db, users)
}

/// Sorted names of `users`.
pub fn names(users: &[User]) -> Vec<String> {
    let mut names: Vec<String> = users.iter().map(|u| u.name.clone()).collect();
    names.sort();
    names
}

/// Asserts that `err` is the friendship duplicate-edge violation.
pub fn assert_duplicate(err: &SiblingError) {
    assert!(
        err.is_duplicate_edge("friendships"),
        "expected duplicate friendship, got {err}"
    );
}
