//! Seeding helpers for fixture databases.

use self_siblings_core::{AttachMethod, Result, SiblingError};

use crate::db::FixtureDb;
use crate::models::User;

/// Saves one user per name, in order.
pub fn seed_users<S: AsRef<str>>(db: &FixtureDb, names: &[S]) -> Result<Vec<User>> {
    names
        .iter()
        .map(|name| db.create_user(name.as_ref()))
        .collect()
}

/// Attaches each `(a, b)` pair of users named in `pairs`.
///
/// Pairs that are already attached are skipped. A name with no saved user
/// fails with `SiblingError::Config`.
pub async fn seed_friendships<S: AsRef<str>>(db: &FixtureDb, pairs: &[(S, S)]) -> Result<()> {
    for (a, b) in pairs {
        let a = lookup(db, a.as_ref())?;
        let b = lookup(db, b.as_ref())?;
        db.friends_of(&a)
            .attach(&b, AttachMethod::IfNotExists, |_| {})
            .await?;
    }
    tracing::debug!("Seeded {} friendships", pairs.len());
    Ok(())
}

fn lookup(db: &FixtureDb, name: &str) -> Result<User> {
    db.find_user(name)
        .ok_or_else(|| SiblingError::Config(format!("no user named '{name}'")))
}
