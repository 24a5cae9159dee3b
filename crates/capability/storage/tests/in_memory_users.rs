use academy_storage::{InMemoryUserStore, StorageError, UserRecord, UserStore};
use domain::UserRole;

fn user(user_id: &str, email: &str) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        external_subject: None,
        email: email.to_string(),
        name: "Alice".to_string(),
        password_hash: Some("$argon2id$stub".to_string()),
        picture: None,
        role: UserRole::Student,
        created_at: 1_700_000_000,
    }
}

#[tokio::test]
async fn find_user_by_id_and_email() {
    let store = InMemoryUserStore::new();
    store.create_user(user("user-1", "a@x.com")).await.expect("create");

    let by_id = store.find_by_id("user-1").await.expect("query").expect("user");
    assert_eq!(by_id.email, "a@x.com");
    let by_email = store.find_by_email("a@x.com").await.expect("query").expect("user");
    assert_eq!(by_email.user_id, "user-1");
    assert!(store.find_by_email("b@x.com").await.expect("query").is_none());
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let store = InMemoryUserStore::new();
    store.create_user(user("user-1", "a@x.com")).await.expect("create");
    let result = store.create_user(user("user-2", "a@x.com")).await;
    assert!(matches!(result, Err(StorageError::Conflict(_))));
}

#[tokio::test]
async fn link_external_subject_makes_user_findable_by_subject() {
    let store = InMemoryUserStore::new();
    store.create_user(user("user-1", "a@x.com")).await.expect("create");

    let linked = store
        .link_external_subject("user-1", "google-sub-1")
        .await
        .expect("link")
        .expect("user");
    assert_eq!(linked.external_subject.as_deref(), Some("google-sub-1"));

    let found = store
        .find_by_external_subject("google-sub-1")
        .await
        .expect("query")
        .expect("user");
    assert_eq!(found.user_id, "user-1");
    assert!(found.password_hash.is_some());

    let missing = store
        .link_external_subject("user-404", "google-sub-2")
        .await
        .expect("link");
    assert!(missing.is_none());
}

#[tokio::test]
async fn link_never_overwrites_a_different_subject() {
    let store = InMemoryUserStore::new();
    store.create_user(user("user-1", "a@x.com")).await.expect("create");
    store
        .link_external_subject("user-1", "google-sub-1")
        .await
        .expect("link")
        .expect("user");

    let refused = store
        .link_external_subject("user-1", "google-sub-2")
        .await
        .expect("link");
    assert!(refused.is_none());
    let found = store.find_by_id("user-1").await.expect("query").expect("user");
    assert_eq!(found.external_subject.as_deref(), Some("google-sub-1"));

    // 重复关联同一 subject 是幂等的
    let same = store
        .link_external_subject("user-1", "google-sub-1")
        .await
        .expect("link");
    assert!(same.is_some());
}
