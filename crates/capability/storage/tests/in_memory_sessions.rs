use std::sync::Arc;

use academy_storage::{
    InMemorySessionStore, InMemoryUserStore, SessionRecord, SessionStore, StorageError,
    UserRecord, UserStore,
};
use domain::{UserRole, now_epoch_seconds};

async fn stores() -> (Arc<InMemoryUserStore>, InMemorySessionStore) {
    let users = Arc::new(InMemoryUserStore::new());
    users
        .create_user(UserRecord {
            user_id: "user-1".to_string(),
            external_subject: None,
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            password_hash: None,
            picture: None,
            role: UserRole::Student,
            created_at: now_epoch_seconds(),
        })
        .await
        .expect("create user");
    let sessions = InMemorySessionStore::new(users.clone());
    (users, sessions)
}

fn session(id: &str, access_ttl: i64, refresh_ttl: i64) -> SessionRecord {
    let now = now_epoch_seconds();
    SessionRecord {
        session_id: id.to_string(),
        user_id: "user-1".to_string(),
        access_token: format!("access-{id}"),
        refresh_token: format!("refresh-{id}"),
        expires_at: now + access_ttl,
        refresh_expires_at: now + refresh_ttl,
        created_at: now,
    }
}

#[tokio::test]
async fn find_by_either_token_loads_user() {
    let (_, store) = stores().await;
    store.create(session("s1", 900, 3600)).await.expect("create");

    let by_access = store.find_by_access_token("access-s1").await.expect("access");
    assert_eq!(by_access.session.session_id, "s1");
    assert_eq!(by_access.user.email, "a@x.com");

    let by_refresh = store.find_by_refresh_token("refresh-s1").await.expect("refresh");
    assert_eq!(by_refresh.session.session_id, "s1");

    let missing = store.find_by_access_token("access-nope").await;
    assert!(matches!(missing, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn expired_access_is_distinct_from_missing() {
    let (_, store) = stores().await;
    store.create(session("s1", -60, 3600)).await.expect("create");

    let result = store.find_by_access_token("access-s1").await;
    assert!(matches!(result, Err(StorageError::SessionExpired)));

    // access 过期不影响 refresh
    let refreshed = store.find_by_refresh_token("refresh-s1").await;
    assert!(refreshed.is_ok());
}

#[tokio::test]
async fn lapsed_refresh_window_is_expired() {
    let (_, store) = stores().await;
    store.create(session("s1", -120, -60)).await.expect("create");

    let result = store.find_by_refresh_token("refresh-s1").await;
    assert!(matches!(result, Err(StorageError::SessionExpired)));
}

#[tokio::test]
async fn duplicate_tokens_are_rejected() {
    let (_, store) = stores().await;
    store.create(session("s1", 900, 3600)).await.expect("create");

    let mut clash = session("s2", 900, 3600);
    clash.refresh_token = "refresh-s1".to_string();
    let result = store.create(clash).await;
    assert!(matches!(result, Err(StorageError::Conflict(_))));
}

#[tokio::test]
async fn delete_matches_access_or_refresh_token() {
    let (_, store) = stores().await;
    store.create(session("s1", 900, 3600)).await.expect("create");
    store.create(session("s2", 900, 3600)).await.expect("create");

    store.delete("access-s1").await.expect("delete by access");
    store.delete("refresh-s2").await.expect("delete by refresh");
    assert!(store.is_empty());

    let again = store.delete("access-s1").await;
    assert!(matches!(again, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn delete_expired_keeps_refreshable_sessions() {
    let (_, store) = stores().await;
    store.create(session("live", 900, 3600)).await.expect("create");
    store.create(session("refreshable", -60, 3600)).await.expect("create");
    store.create(session("dead", -120, -60)).await.expect("create");

    assert_eq!(store.delete_expired().await.expect("sweep"), 1);
    assert_eq!(store.delete_expired().await.expect("sweep"), 0);
    assert_eq!(store.len(), 2);
    assert!(matches!(
        store.find_by_refresh_token("refresh-dead").await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn delete_all_for_user_revokes_every_session() {
    let (_, store) = stores().await;
    store.create(session("s1", 900, 3600)).await.expect("create");
    store.create(session("s2", 900, 3600)).await.expect("create");

    assert_eq!(store.delete_all_for_user("user-1").await.expect("revoke"), 2);
    assert_eq!(store.delete_all_for_user("user-1").await.expect("revoke"), 0);
    assert!(matches!(
        store.find_by_access_token("access-s2").await,
        Err(StorageError::NotFound)
    ));
}
