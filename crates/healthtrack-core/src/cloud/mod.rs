//! Firebase Realtime Database sync over REST.
//!
//! Documents live at `users/{uid}.json`, `runs/{uid}/{date}.json` and
//! `foods/{uid}/{date}.json`. Writes made while offline or signed out are
//! queued in an [`OfflineQueue`] and replayed when connectivity returns.

pub mod credentials;
mod queue;

pub use queue::{OfflineItem, OfflineQueue, SyncKind, QUEUE_FILE};

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{ApiError, Result};
use crate::nutrition::DailyFoodLog;
use crate::profile::UserProfile;
use crate::storage::{CloudConfig, RunDay};
use crate::tracking::RunRecord;

const SERVICE: &str = "firebase";

/// Credentials returned by the auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub id_token: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub online: bool,
    pub authenticated: bool,
    pub queued: usize,
    pub user_id: Option<String>,
}

/// What happened to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    Queued,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub succeeded: usize,
    pub remaining: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

pub struct CloudSync {
    http: Client,
    database_url: String,
    auth_url: String,
    api_key: String,
    connect_timeout: Duration,
    session: Option<Session>,
    online: bool,
    queue: OfflineQueue,
}

impl CloudSync {
    /// Build a client. Nothing is contacted until [`CloudSync::check_connection`].
    pub fn new(config: &CloudConfig, queue: OfflineQueue) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            http,
            database_url: config.database_url.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            connect_timeout: config.connect_timeout(),
            session: None,
            online: false,
            queue,
        })
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            online: self.online,
            authenticated: self.is_authenticated(),
            queued: self.queue.len(),
            user_id: self.session.as_ref().map(|s| s.user_id.clone()),
        }
    }

    /// `GET {db}/.json` with the connect timeout; online means HTTP 200.
    pub async fn check_connection(&mut self) -> bool {
        let url = format!("{}/.json", self.database_url);
        self.online = match self.http.get(&url).timeout(self.connect_timeout).send().await {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(e) => {
                debug!(error = %e, "connectivity check failed");
                false
            }
        };
        self.online
    }

    // ── Auth ─────────────────────────────────────────────────────────

    pub async fn sign_in(&mut self, email: &str, password: &str) -> std::result::Result<Session, ApiError> {
        self.authenticate("accounts:signInWithPassword", email, password).await
    }

    pub async fn register(&mut self, email: &str, password: &str) -> std::result::Result<Session, ApiError> {
        self.authenticate("accounts:signUp", email, password).await
    }

    async fn authenticate(&mut self, endpoint: &str, email: &str, password: &str) -> std::result::Result<Session, ApiError> {
        let url = format!("{}/{endpoint}", self.auth_url);
        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            let message = body["error"]["message"].as_str().unwrap_or("authentication failed").to_string();
            return Err(ApiError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: message,
            });
        }

        let auth: AuthResponse = resp.json().await.map_err(|e| ApiError::BadResponse {
            service: SERVICE,
            message: e.to_string(),
        })?;
        let session = Session {
            user_id: auth.local_id,
            id_token: auth.id_token,
            email: auth.email.or_else(|| Some(email.to_string())),
        };
        info!(user_id = %session.user_id, "signed in");
        self.online = true;
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Forget the session and drop anything still queued.
    pub fn logout(&mut self) -> std::result::Result<(), ApiError> {
        self.session = None;
        self.queue
            .clear()
            .map_err(|e| ApiError::BadResponse {
                service: SERVICE,
                message: format!("could not clear offline queue: {e}"),
            })
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn push_profile(&mut self, profile: &UserProfile) -> std::result::Result<SyncOutcome, ApiError> {
        let payload = to_value(profile)?;
        self.write(SyncKind::UserData, payload, None).await
    }

    pub async fn push_run(&mut self, run: &RunRecord) -> std::result::Result<SyncOutcome, ApiError> {
        let payload = to_value(run)?;
        self.write(SyncKind::RunData, payload, Some(run.date)).await
    }

    pub async fn push_food_day(&mut self, log: &DailyFoodLog) -> std::result::Result<SyncOutcome, ApiError> {
        let payload = to_value(log)?;
        self.write(SyncKind::FoodData, payload, Some(log.date)).await
    }

    async fn write(&mut self, kind: SyncKind, payload: Value, date: Option<NaiveDate>) -> std::result::Result<SyncOutcome, ApiError> {
        if !self.online || self.session.is_none() {
            self.enqueue(OfflineItem::new(kind, payload, date))?;
            return Ok(SyncOutcome::Queued);
        }
        self.send(kind, &payload, date).await?;
        Ok(SyncOutcome::Synced)
    }

    fn enqueue(&mut self, item: OfflineItem) -> std::result::Result<(), ApiError> {
        let kind = item.kind;
        self.queue.push(item).map_err(|e| ApiError::BadResponse {
            service: SERVICE,
            message: format!("could not persist offline queue: {e}"),
        })?;
        info!(?kind, queued = self.queue.len(), "sync request queued");
        Ok(())
    }

    async fn send(&self, kind: SyncKind, payload: &Value, date: Option<NaiveDate>) -> std::result::Result<(), ApiError> {
        match kind {
            SyncKind::UserData => {
                let url = self.doc_url("users", None)?;
                self.put(&url, payload).await
            }
            SyncKind::RunData => {
                let date = date.or_else(|| payload_date(payload)).ok_or_else(|| bad("run payload has no date"))?;
                let url = self.doc_url("runs", Some(date))?;
                let mut doc = match self.get(&url).await? {
                    Value::Object(map) => Value::Object(map),
                    _ => json!({ "runs": [] }),
                };
                if !doc["runs"].is_array() {
                    doc["runs"] = json!([]);
                }
                if let Some(runs) = doc["runs"].as_array_mut() {
                    runs.push(payload.clone());
                }
                if doc.get("date").is_none() {
                    doc["date"] = json!(date);
                }
                self.put(&url, &doc).await
            }
            SyncKind::FoodData => {
                let date = date.or_else(|| payload_date(payload)).ok_or_else(|| bad("food payload has no date"))?;
                let url = self.doc_url("foods", Some(date))?;
                self.put(&url, payload).await
            }
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// `None` while offline, signed out, or when the document is absent.
    pub async fn fetch_profile(&self) -> std::result::Result<Option<UserProfile>, ApiError> {
        self.fetch("users", None).await
    }

    pub async fn fetch_runs(&self, date: NaiveDate) -> std::result::Result<Option<RunDay>, ApiError> {
        self.fetch("runs", Some(date)).await
    }

    pub async fn fetch_food_day(&self, date: NaiveDate) -> std::result::Result<Option<DailyFoodLog>, ApiError> {
        self.fetch("foods", Some(date)).await
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, collection: &str, date: Option<NaiveDate>) -> std::result::Result<Option<T>, ApiError> {
        if !self.online || self.session.is_none() {
            return Ok(None);
        }
        let url = self.doc_url(collection, date)?;
        match self.get(&url).await? {
            Value::Null => Ok(None),
            value => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| bad(&format!("{collection} document: {e}"))),
        }
    }

    // ── Offline replay ───────────────────────────────────────────────

    /// Try every queued item once, in order. Items that sync are removed;
    /// failures stay queued. No backoff.
    pub async fn replay_queue(&mut self) -> std::result::Result<ReplayReport, ApiError> {
        if !self.online || self.session.is_none() {
            return Ok(ReplayReport {
                succeeded: 0,
                remaining: self.queue.len(),
            });
        }

        let pending: Vec<OfflineItem> = self.queue.items().to_vec();
        let mut succeeded = 0;
        for item in pending {
            match self.send(item.kind, &item.payload, item.date).await {
                Ok(()) => {
                    self.queue.remove(item.id).map_err(|e| bad(&e.to_string()))?;
                    succeeded += 1;
                }
                Err(e) => warn!(id = %item.id, kind = ?item.kind, error = %e, "queued item failed to sync"),
            }
        }
        let report = ReplayReport {
            succeeded,
            remaining: self.queue.len(),
        };
        info!(succeeded = report.succeeded, remaining = report.remaining, "offline queue replayed");
        Ok(report)
    }

    /// Re-check connectivity; replay only when we just came back online.
    pub async fn check_and_replay(&mut self) -> std::result::Result<Option<ReplayReport>, ApiError> {
        let was_online = self.online;
        let online = self.check_connection().await;
        if !was_online && online && !self.queue.is_empty() {
            return self.replay_queue().await.map(Some);
        }
        Ok(None)
    }

    /// Call [`CloudSync::check_and_replay`] every `interval`, `rounds` times
    /// (forever when `None`).
    pub async fn auto_sync(&mut self, interval: Duration, rounds: Option<usize>) -> ReplayReport {
        let mut total = ReplayReport {
            succeeded: 0,
            remaining: self.queue.len(),
        };
        let mut ticker = tokio::time::interval(interval);
        let mut done = 0usize;
        while rounds.map_or(true, |r| done < r) {
            ticker.tick().await;
            match self.check_and_replay().await {
                Ok(Some(report)) => total.succeeded += report.succeeded,
                Ok(None) => {}
                Err(e) => warn!(error = %e, "auto sync round failed"),
            }
            total.remaining = self.queue.len();
            done += 1;
        }
        total
    }

    // ── HTTP helpers ─────────────────────────────────────────────────

    fn doc_url(&self, collection: &str, date: Option<NaiveDate>) -> std::result::Result<String, ApiError> {
        let session = self.session.as_ref().ok_or(ApiError::NotAuthenticated)?;
        let uid = urlencoding::encode(&session.user_id);
        Ok(match date {
            Some(d) => format!("{}/{collection}/{uid}/{}.json", self.database_url, d.format("%Y-%m-%d")),
            None => format!("{}/{collection}/{uid}.json", self.database_url),
        })
    }

    fn token(&self) -> std::result::Result<&str, ApiError> {
        self.session
            .as_ref()
            .map(|s| s.id_token.as_str())
            .ok_or(ApiError::NotAuthenticated)
    }

    async fn get(&self, url: &str) -> std::result::Result<Value, ApiError> {
        let resp = self.http.get(url).query(&[("auth", self.token()?)]).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ApiError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        resp.json().await.map_err(|e| bad(&e.to_string()))
    }

    async fn put(&self, url: &str, body: &Value) -> std::result::Result<(), ApiError> {
        let resp = self
            .http
            .put(url)
            .query(&[("auth", self.token()?)])
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ApiError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

fn bad(message: &str) -> ApiError {
    ApiError::BadResponse {
        service: SERVICE,
        message: message.to_string(),
    }
}

fn to_value<T: Serialize>(value: &T) -> std::result::Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| bad(&e.to_string()))
}

fn payload_date(payload: &Value) -> Option<NaiveDate> {
    payload
        .get("date")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(dir: &std::path::Path) -> CloudSync {
        let config = CloudConfig {
            database_url: "https://example-db.invalid/".into(),
            api_key: "k".into(),
            ..CloudConfig::default()
        };
        CloudSync::new(&config, OfflineQueue::new_with_path(dir.join(QUEUE_FILE))).unwrap()
    }

    #[test]
    fn doc_urls_need_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let sync = client(dir.path());
        assert!(matches!(sync.doc_url("users", None), Err(ApiError::NotAuthenticated)));

        let sync = sync.with_session(Some(Session {
            user_id: "u1".into(),
            id_token: "t".into(),
            email: None,
        }));
        assert_eq!(sync.doc_url("users", None).unwrap(), "https://example-db.invalid/users/u1.json");
        let date = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        assert_eq!(
            sync.doc_url("runs", Some(date)).unwrap(),
            "https://example-db.invalid/runs/u1/2026-01-09.json"
        );
    }

    #[test]
    fn payload_date_reads_iso_dates() {
        assert_eq!(
            payload_date(&json!({"date": "2026-03-04"})),
            NaiveDate::from_ymd_opt(2026, 3, 4)
        );
        assert!(payload_date(&json!({"date": 5})).is_none());
    }

    #[tokio::test]
    async fn writes_queue_while_offline() {
        let dir = tempfile::tempdir().unwrap();
        let mut sync = client(dir.path());
        let outcome = sync.push_profile(&UserProfile::default()).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Queued);
        assert_eq!(sync.status().queued, 1);
        assert!(!sync.status().authenticated);

        sync.logout().unwrap();
        assert_eq!(sync.status().queued, 0);
    }
}
