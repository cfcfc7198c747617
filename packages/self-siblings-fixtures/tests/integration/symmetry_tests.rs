//! Attach/query symmetry, detach inverse and query correctness.

use self_siblings_core::{AttachMethod, SiblingError};

use super::helpers::{db_with_users, names};

#[tokio::test]
async fn test_attach_visible_from_both_sides() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let (amy, ben) = (&users[0], &users[1]);

    db.friends_of(amy)
        .attach(ben, AttachMethod::Always, |_| {})
        .await
        .unwrap();

    assert!(db.friends_of(amy).is_attached(ben).await.unwrap());
    assert!(db.friends_of(ben).is_attached(amy).await.unwrap());

    let from_amy = db.friends_of(amy).query().await.unwrap().all().await.unwrap();
    let from_ben = db.friends_of(ben).query().await.unwrap().all().await.unwrap();
    assert_eq!(names(&from_amy), vec!["ben"]);
    assert_eq!(names(&from_ben), vec!["amy"]);
}

#[tokio::test]
async fn test_row_stored_in_canonical_order() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let (amy, ben) = (&users[0], &users[1]);

    db.friends_of(ben)
        .attach(amy, AttachMethod::Always, |row| {
            row.note = Some("met at school".to_string())
        })
        .await
        .unwrap();

    let rows = db.friendships().rows();
    assert_eq!(rows.len(), 1);
    let row = &rows[0].row;
    assert!(row.left_user.to_string() < row.right_user.to_string());
    assert_eq!(row.note.as_deref(), Some("met at school"));
}

#[tokio::test]
async fn test_if_not_exists_is_idempotent() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let (amy, ben) = (&users[0], &users[1]);

    let mut relation = db.friends_of(amy);
    relation
        .attach(ben, AttachMethod::IfNotExists, |_| {})
        .await
        .unwrap();
    relation
        .attach(ben, AttachMethod::IfNotExists, |_| {})
        .await
        .unwrap();
    db.friends_of(ben)
        .attach(amy, AttachMethod::IfNotExists, |_| {})
        .await
        .unwrap();

    assert_eq!(db.friendships().len(), 1);
}

#[tokio::test]
async fn test_detach_is_inverse_of_attach() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let (amy, ben) = (&users[0], &users[1]);

    db.friends_of(amy)
        .attach(ben, AttachMethod::Always, |_| {})
        .await
        .unwrap();
    db.friends_of(ben).detach(amy).await.unwrap();

    assert!(!db.friends_of(amy).is_attached(ben).await.unwrap());
    assert!(db.friendships().is_empty());

    // Detaching again is a no-op.
    db.friends_of(amy).detach(ben).await.unwrap();
}

#[tokio::test]
async fn test_query_returns_other_endpoints() {
    let (db, users) = db_with_users(&["xena", "yuri", "zoe", "walt"]);
    let (x, y, z, w) = (&users[0], &users[1], &users[2], &users[3]);

    db.friends_of(x)
        .attach(y, AttachMethod::Always, |_| {})
        .await
        .unwrap();
    db.friends_of(z)
        .attach(x, AttachMethod::Always, |_| {})
        .await
        .unwrap();
    db.friends_of(y)
        .attach(w, AttachMethod::Always, |_| {})
        .await
        .unwrap();

    let friends = db.friends_of(x).query().await.unwrap().all().await.unwrap();
    assert_eq!(names(&friends), vec!["yuri", "zoe"]);

    let count = db
        .friends_of(x)
        .query()
        .await
        .unwrap()
        .filter(|u| u.name.starts_with('z'))
        .count()
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_load_caches_until_mutation() {
    let (db, users) = db_with_users(&["amy", "ben", "cal"]);
    let (amy, ben, cal) = (&users[0], &users[1], &users[2]);

    let mut relation = db.friends_of(amy);
    assert!(matches!(
        relation.value().unwrap_err(),
        SiblingError::NotLoaded { .. }
    ));

    relation
        .attach(ben, AttachMethod::Always, |_| {})
        .await
        .unwrap();
    relation.load().await.unwrap();
    assert_eq!(names(relation.value().unwrap()), vec!["ben"]);

    relation
        .attach(cal, AttachMethod::Always, |_| {})
        .await
        .unwrap();
    assert!(!relation.is_loaded());

    relation.load().await.unwrap();
    assert_eq!(names(relation.value().unwrap()), vec!["ben", "cal"]);
}

#[tokio::test]
async fn test_unsaved_user_rejected() {
    let (db, users) = db_with_users(&["amy"]);
    let ghost = self_siblings_fixtures::User::new("ghost");

    let err = db
        .friends_of(&users[0])
        .attach(&ghost, AttachMethod::Always, |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, SiblingError::UnsavedEntity { .. }));

    let err = db.friends_of(&ghost).query().await.unwrap_err();
    assert!(matches!(err, SiblingError::UnsavedEntity { .. }));
}
