//! Cloud sync against a mock Realtime Database and auth endpoint.

use chrono::{NaiveDate, TimeZone, Utc};
use healthtrack_core::cloud::{CloudSync, OfflineQueue, Session, SyncKind, SyncOutcome, QUEUE_FILE};
use healthtrack_core::error::ApiError;
use healthtrack_core::storage::CloudConfig;
use healthtrack_core::tracking::RunRecord;
use healthtrack_core::UserProfile;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use uuid::Uuid;

fn sync_for(server: &ServerGuard, dir: &std::path::Path) -> CloudSync {
    let config = CloudConfig {
        database_url: server.url(),
        api_key: "test-key".into(),
        auth_url: format!("{}/v1", server.url()),
        ..CloudConfig::default()
    };
    CloudSync::new(&config, OfflineQueue::open(dir.join(QUEUE_FILE))).unwrap()
}

fn session() -> Option<Session> {
    Some(Session {
        user_id: "uid-1".into(),
        id_token: "tok".into(),
        email: Some("runner@example.com".into()),
    })
}

fn run() -> RunRecord {
    RunRecord {
        id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        start_time: Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap(),
        duration: 1200.0,
        distance: 3000.0,
        average_pace: 6.67,
        calories: 150,
        steps: 0,
        route: Vec::new(),
    }
}

async fn online(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/.json")
        .with_status(200)
        .with_body("null")
        .create_async()
        .await
}

#[tokio::test]
async fn connectivity_follows_the_status_code() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut sync = sync_for(&server, dir.path());

    let down = server.mock("GET", "/.json").with_status(503).create_async().await;
    assert!(!sync.check_connection().await);
    down.remove_async().await;

    online(&mut server).await;
    assert!(sync.check_connection().await);
    assert!(sync.status().online);
}

#[tokio::test]
async fn sign_in_stores_the_session() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut sync = sync_for(&server, dir.path());

    let mock = server
        .mock("POST", "/v1/accounts:signInWithPassword")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::PartialJson(json!({
            "email": "runner@example.com",
            "returnSecureToken": true
        })))
        .with_status(200)
        .with_body(r#"{"idToken": "tok", "localId": "uid-1", "email": "runner@example.com"}"#)
        .create_async()
        .await;

    let session = sync.sign_in("runner@example.com", "secret").await.unwrap();
    assert_eq!(session.user_id, "uid-1");
    assert!(sync.is_authenticated());
    assert_eq!(sync.status().user_id.as_deref(), Some("uid-1"));
    mock.assert_async().await;
}

#[tokio::test]
async fn auth_errors_carry_the_server_message() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut sync = sync_for(&server, dir.path());

    server
        .mock("POST", "/v1/accounts:signUp")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error": {"code": 400, "message": "EMAIL_EXISTS"}}"#)
        .create_async()
        .await;

    let err = sync.register("taken@example.com", "secret").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, ref body, .. } if body == "EMAIL_EXISTS"));
    assert!(!sync.is_authenticated());
}

#[tokio::test]
async fn run_push_appends_to_the_day_document() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut sync = sync_for(&server, dir.path()).with_session(session());
    online(&mut server).await;
    assert!(sync.check_connection().await);

    let existing = json!({"date": "2026-03-01", "runs": [{"distance": 1000.0}]});
    let get = server
        .mock("GET", "/runs/uid-1/2026-03-01.json")
        .match_query(Matcher::UrlEncoded("auth".into(), "tok".into()))
        .with_status(200)
        .with_body(existing.to_string())
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/runs/uid-1/2026-03-01.json")
        .match_query(Matcher::UrlEncoded("auth".into(), "tok".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"date": "2026-03-01"})),
            Matcher::Regex(r#""distance":1000\.0.*"distance":3000\.0"#.into()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    assert_eq!(sync.push_run(&run()).await.unwrap(), SyncOutcome::Synced);
    get.assert_async().await;
    put.assert_async().await;
    assert!(sync.queue().is_empty());
}

#[tokio::test]
async fn offline_writes_queue_and_replay_on_reconnect() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut sync = sync_for(&server, dir.path()).with_session(session());

    // Never checked, so still offline.
    let outcome = sync.push_profile(&UserProfile::default()).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Queued);
    assert_eq!(sync.queue().len(), 1);
    assert_eq!(sync.queue().items()[0].kind, SyncKind::UserData);

    // The queue survives a restart.
    let reopened = OfflineQueue::open(dir.path().join(QUEUE_FILE));
    assert_eq!(reopened.len(), 1);

    online(&mut server).await;
    let put = server
        .mock("PUT", "/users/uid-1.json")
        .match_query(Matcher::UrlEncoded("auth".into(), "tok".into()))
        .match_body(Matcher::PartialJson(json!({"name": "User"})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let report = sync.check_and_replay().await.unwrap().unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.remaining, 0);
    assert!(sync.queue().is_empty());
    put.assert_async().await;

    // Already online: a second check does not replay.
    assert!(sync.check_and_replay().await.unwrap().is_none());
}

#[tokio::test]
async fn failed_replay_keeps_the_item() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut sync = sync_for(&server, dir.path()).with_session(session());
    sync.push_profile(&UserProfile::default()).await.unwrap();

    online(&mut server).await;
    server
        .mock("PUT", "/users/uid-1.json")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let report = sync.check_and_replay().await.unwrap().unwrap();
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.remaining, 1);
}

#[tokio::test]
async fn fetch_returns_none_for_missing_documents() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut sync = sync_for(&server, dir.path()).with_session(session());

    // Offline: nothing is requested.
    assert!(sync.fetch_profile().await.unwrap().is_none());

    online(&mut server).await;
    sync.check_connection().await;
    server
        .mock("GET", "/users/uid-1.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"name": "Cloud", "height": 180, "weight": 75, "age": 30}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/foods/uid-1/2026-03-02.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("null")
        .create_async()
        .await;

    let profile = sync.fetch_profile().await.unwrap().unwrap();
    assert_eq!(profile.name, "Cloud");
    assert_eq!(profile.height_cm, 180.0);
    let foods = sync
        .fetch_food_day(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
        .await
        .unwrap();
    assert!(foods.is_none());
}

#[tokio::test]
async fn logout_clears_session_and_queue() {
    let server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut sync = sync_for(&server, dir.path()).with_session(session());
    sync.push_run(&run()).await.unwrap();
    assert_eq!(sync.queue().len(), 1);

    sync.logout().unwrap();
    assert!(!sync.is_authenticated());
    assert!(sync.queue().is_empty());
    assert!(OfflineQueue::open(dir.path().join(QUEUE_FILE)).is_empty());
}
