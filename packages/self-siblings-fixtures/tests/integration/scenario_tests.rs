//! Named end-to-end scenarios.

use self_siblings_core::AttachMethod;
use self_siblings_fixtures::seed_friendships;

use super::helpers::{assert_duplicate, db_with_users, names};

/// Bill, Ted and Socrates: attach, reverse duplicate, detach.
#[tokio::test]
async fn test_bill_ted_socrates() {
    let (db, users) = db_with_users(&["Bill", "Ted", "Socrates"]);
    let (bill, ted, socrates) = (&users[0], &users[1], &users[2]);

    db.friends_of(ted)
        .attach(bill, AttachMethod::Always, |_| {})
        .await
        .unwrap();
    assert!(db.friends_of(bill).is_attached(ted).await.unwrap());

    let err = db
        .friends_of(bill)
        .attach(ted, AttachMethod::Always, |_| {})
        .await
        .unwrap_err();
    assert_duplicate(&err);

    for user in [bill, ted] {
        assert!(!db.friends_of(socrates).is_attached(user).await.unwrap());
    }

    db.friends_of(bill).detach(ted).await.unwrap();
    assert!(!db.friends_of(ted).is_attached(bill).await.unwrap());
    assert!(db.friendships().is_empty());

    for user in [bill, ted] {
        assert!(!db.friends_of(socrates).is_attached(user).await.unwrap());
    }
}

/// Batch attach of two users creates exactly two canonical rows.
#[tokio::test]
async fn test_batch_attach_creates_two_rows() {
    let (db, users) = db_with_users(&["xena", "yuri", "zoe"]);
    let (x, y, z) = (&users[0], &users[1], &users[2]);

    db.friends_of(x)
        .attach_many(&[y.clone(), z.clone()], |row| {
            row.note = Some("batch".to_string())
        })
        .await
        .unwrap();

    let rows = db.friendships().rows();
    assert_eq!(rows.len(), 2);
    for stored in &rows {
        assert!(stored.row.left_user.to_string() < stored.row.right_user.to_string());
        assert_eq!(stored.row.note.as_deref(), Some("batch"));
    }

    assert!(db.friends_of(y).is_attached(x).await.unwrap());
    assert!(db.friends_of(z).is_attached(x).await.unwrap());
    assert!(!db.friends_of(y).is_attached(z).await.unwrap());
}

/// A batch repeating an existing pair fails without writing anything.
#[tokio::test]
async fn test_batch_with_existing_pair_writes_nothing() {
    let (db, users) = db_with_users(&["xena", "yuri", "zoe"]);
    let (x, y, z) = (&users[0], &users[1], &users[2]);

    db.friends_of(y)
        .attach(x, AttachMethod::Always, |_| {})
        .await
        .unwrap();
    let err = db
        .friends_of(x)
        .attach_many(&[z.clone(), y.clone()], |_| {})
        .await
        .unwrap_err();

    assert_duplicate(&err);
    assert_eq!(db.friendships().len(), 1);
    assert!(!db.friends_of(x).is_attached(z).await.unwrap());
}

/// Seeded graph reads back symmetric friend lists.
#[tokio::test]
async fn test_friend_lists_of_seeded_graph() {
    let (db, _) = db_with_users(&["ann", "bob", "cy", "dee"]);
    seed_friendships(&db, &[("ann", "bob"), ("cy", "ann"), ("bob", "cy")])
        .await
        .unwrap();

    let lists = db.friend_lists().await.unwrap();
    let summary: Vec<(String, Vec<String>)> = lists
        .iter()
        .map(|list| (list.user.name.clone(), names(&list.friends)))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("ann".to_string(), vec!["bob".to_string(), "cy".to_string()]),
            ("bob".to_string(), vec!["ann".to_string(), "cy".to_string()]),
            ("cy".to_string(), vec!["ann".to_string(), "bob".to_string()]),
            ("dee".to_string(), vec![]),
        ]
    );
}
