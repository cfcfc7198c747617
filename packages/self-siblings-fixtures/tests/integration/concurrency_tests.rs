//! Concurrent `IfNotExists` attach races.
//!
//! Both attachers can observe the pair as absent. The unique index turns
//! the losing create into a duplicate-edge violation.

use self_siblings_core::AttachMethod;

use super::helpers::{assert_duplicate, db_with_users};

#[tokio::test]
async fn test_concurrent_if_not_exists_leaves_one_row() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let (amy, ben) = (&users[0], &users[1]);

    let mut from_amy = db.friends_of(amy);
    let mut from_ben = db.friends_of(ben);
    let (a, b) = tokio::join!(
        from_amy.attach(ben, AttachMethod::IfNotExists, |_| {}),
        from_ben.attach(amy, AttachMethod::IfNotExists, |_| {}),
    );

    // Both checks run before either create, so exactly one create loses.
    let failures: Vec<_> = [a, b].into_iter().filter_map(Result::err).collect();
    assert_eq!(failures.len(), 1);
    assert_duplicate(&failures[0]);
    assert_eq!(db.friendships().len(), 1);
}

#[tokio::test]
async fn test_concurrent_attach_or_ignore_duplicate() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let (amy, ben) = (&users[0], &users[1]);

    let mut first = db.friends_of(amy);
    let mut second = db.friends_of(amy);
    let (a, b) = tokio::join!(
        first.attach_or_ignore_duplicate(ben, |_| {}),
        second.attach_or_ignore_duplicate(ben, |_| {}),
    );

    let created = [a.unwrap(), b.unwrap()];
    assert_eq!(created.iter().filter(|c| **c).count(), 1);
    assert_eq!(db.friendships().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_racers_one_row() {
    let (db, users) = db_with_users(&["amy", "ben"]);
    let db = std::sync::Arc::new(db);

    let mut handles = Vec::new();
    for i in 0..8 {
        let db = std::sync::Arc::clone(&db);
        let (source, target) = if i % 2 == 0 {
            (users[0].clone(), users[1].clone())
        } else {
            (users[1].clone(), users[0].clone())
        };
        handles.push(tokio::spawn(async move {
            db.friends_of(&source)
                .attach_or_ignore_duplicate(&target, |_| {})
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            created += 1;
        }
    }
    assert_eq!(created, 1);
    assert_eq!(db.friendships().len(), 1);
}
