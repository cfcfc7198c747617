//! Unique index, foreign keys and direct inserts that bypass the relation.

use uuid::Uuid;

use self_siblings_core::{AttachMethod, Constraint, SelfLoopPolicy, SiblingError};
use self_siblings_fixtures::{friendship_config, FixtureDb, Friendship};
use self_siblings_store::StoreConfig;

use super::helpers::{assert_duplicate, db_with_users};

fn ids(users: &[self_siblings_fixtures::User]) -> Vec<Uuid> {
    users.iter().map(|u| u.id.unwrap()).collect()
}

#[tokio::test]
async fn test_reverse_attach_always_violates_unique_index() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let (amy, ben) = (&users[0], &users[1]);

    db.friends_of(amy)
        .attach(ben, AttachMethod::Always, |_| {})
        .await
        .unwrap();
    let err = db
        .friends_of(ben)
        .attach(amy, AttachMethod::Always, |_| {})
        .await
        .unwrap_err();

    assert_duplicate(&err);
    assert_eq!(db.friendships().len(), 1);
}

#[test]
fn test_direct_reversed_insert_rejected() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let ids = ids(&users);
    let (low, high) = if ids[0].to_string() < ids[1].to_string() {
        (ids[0], ids[1])
    } else {
        (ids[1], ids[0])
    };

    // Inserted reversed, stored canonical.
    db.friendships()
        .insert(Friendship::between(high, low))
        .unwrap();
    let stored = &db.friendships().rows()[0].row;
    assert_eq!((stored.left_user, stored.right_user), (low, high));

    let err = db
        .friendships()
        .insert(Friendship::between(low, high))
        .unwrap_err();
    assert_duplicate(&err);

    let err = db
        .friendships()
        .insert(Friendship::between(high, low))
        .unwrap_err();
    assert_duplicate(&err);
    assert_eq!(db.friendships().count_pair(&low, &high), 1);
    assert_eq!(db.friendships().count_pair(&high, &low), 0);
}

#[test]
fn test_direct_insert_of_unknown_user_rejected() {
    let (db, users) = db_with_users(&["amy"]);
    let stranger = Uuid::new_v4();

    let err = db
        .friendships()
        .insert(Friendship::between(users[0].id.unwrap(), stranger))
        .unwrap_err();

    match err {
        SiblingError::ConstraintViolation {
            pivot,
            constraint: Constraint::ForeignKey { id, .. },
        } => {
            assert_eq!(pivot, "friendships");
            assert_eq!(id, stranger.to_string());
        }
        other => panic!("expected foreign key violation, got {other}"),
    }
    assert!(db.friendships().is_empty());
}

#[test]
fn test_foreign_keys_can_be_disabled() {
    let store = StoreConfig {
        enforce_foreign_keys: false,
        ..Default::default()
    };
    let db = FixtureDb::with_config(&friendship_config(), store).unwrap();
    db.friendships()
        .insert(Friendship::between(Uuid::new_v4(), Uuid::new_v4()))
        .unwrap();
    assert_eq!(db.friendships().len(), 1);
}

#[tokio::test]
async fn test_self_loop_policies() {
    let (db, users) = db_with_users(&["amy"]);
    let amy = &users[0];

    let err = db
        .friends_of(amy)
        .attach(amy, AttachMethod::Always, |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, SiblingError::SelfLoop { .. }));

    let err = db
        .friendships()
        .insert(Friendship::between(amy.id.unwrap(), amy.id.unwrap()))
        .unwrap_err();
    assert!(matches!(err, SiblingError::SelfLoop { .. }));

    for (policy, rows) in [(SelfLoopPolicy::Ignore, 0), (SelfLoopPolicy::Permit, 1)] {
        let config = self_siblings_core::RelationConfig {
            self_loop: policy,
            ..friendship_config()
        };
        let db = FixtureDb::with_config(&config, StoreConfig::default()).unwrap();
        let me = db.create_user("me").unwrap();
        db.friends_of(&me)
            .attach(&me, AttachMethod::Always, |_| {})
            .await
            .unwrap();
        assert_eq!(db.friendships().len(), rows, "policy {policy:?}");
    }
}

#[tokio::test]
async fn test_delete_user_cascades_friendships() {
    let (db, users) = db_with_users(&["amy", "ben", "cal"]);
    let (amy, ben, cal) = (&users[0], &users[1], &users[2]);

    db.friends_of(amy)
        .attach_many(&[ben.clone(), cal.clone()], |_| {})
        .await
        .unwrap();
    db.friends_of(ben)
        .attach(cal, AttachMethod::Always, |_| {})
        .await
        .unwrap();

    assert_eq!(db.delete_user(amy).await.unwrap(), 2);
    assert_eq!(db.friendships().len(), 1);
    assert!(db.users().get(&amy.id.unwrap()).is_none());
}
