//! Integration tests for the coverage backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::engine::Engine;
use crate::errors::{AppError, ClassificationError};
use crate::ingest::{
    Classifier, MessageSource, UnconfiguredClassifier, UnconfiguredSource,
};
use crate::models::{RawMessage, StructuredAnnouncement};
use crate::{create_router, AppState};

/// Feed that replays a fixed message list, optionally after a delay.
struct StaticFeed {
    messages: Vec<RawMessage>,
    delay: Duration,
}

#[async_trait]
impl MessageSource for StaticFeed {
    async fn fetch_raw_messages(
        &self,
        _lookback_hours: u32,
        limit: u32,
    ) -> Result<Vec<RawMessage>, AppError> {
        tokio::time::sleep(self.delay).await;
        Ok(self
            .messages
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// Treats "ooo" messages as open-ended time off for the sender and fails on "???".
struct KeywordClassifier;

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(
        &self,
        message: &RawMessage,
    ) -> Result<Option<StructuredAnnouncement>, ClassificationError> {
        if message.text.contains("???") {
            return Err(ClassificationError("unreadable".to_string()));
        }
        if !message.text.to_lowercase().contains("ooo") {
            return Ok(None);
        }
        Ok(Some(StructuredAnnouncement {
            person_reference: message.sender.clone(),
            start_date: Some(message.sent_at),
            ..Default::default()
        }))
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_collaborators(
            Arc::new(UnconfiguredSource),
            Arc::new(UnconfiguredClassifier),
            Duration::from_secs(10),
        )
        .await
    }

    async fn with_collaborators(
        source: Arc<dyn MessageSource>,
        classifier: Arc<dyn Classifier>,
        sync_timeout: Duration,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = build_app(&temp_dir, source, classifier, sync_timeout).await;

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_member(&self, id: &str, name: &str, calendar_free_pct: f64) -> Value {
        let resp = self
            .client
            .post(self.url("/api/members"))
            .json(&json!({
                "id": id,
                "name": name,
                "calendarFreePct": calendar_free_pct
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }

    async fn create_task(&self, id: &str, assignee_id: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/api/tasks"))
            .json(&json!({
                "id": id,
                "title": "Billing migration",
                "projectName": "Payments",
                "priority": "P0",
                "deadline": "2026-03-01T17:00:00Z",
                "assigneeId": assignee_id
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }

    async fn member(&self, id: &str) -> Value {
        let resp = self
            .client
            .get(self.url(&format!("/api/members/{}", id)))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }
}

async fn build_app(
    temp_dir: &TempDir,
    source: Arc<dyn MessageSource>,
    classifier: Arc<dyn Classifier>,
    sync_timeout: Duration,
) -> axum::Router {
    let db_path = temp_dir.path().join("test.sqlite");

    // Initialize database
    let pool = init_database(&db_path).await.expect("Failed to init DB");
    let repo = Arc::new(Repository::new(pool));
    let engine = Arc::new(Engine::new(repo.clone()));

    // Create config
    let config = Config {
        db_path,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
        sweep_interval: Duration::from_secs(60),
        sync_timeout,
        classifier_timeout: Duration::from_secs(5),
        feed_url: None,
        classifier_url: None,
        seed_path: None,
    };

    let state = AppState {
        repo,
        engine,
        source,
        classifier,
        config: Arc::new(config),
    };

    create_router(state)
}

fn message(sender: &str, text: &str, sent_at: DateTime<Utc>) -> RawMessage {
    RawMessage {
        sent_at,
        sender: sender.to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_router_serves_without_listener() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_app(
        &temp_dir,
        Arc::new(UnconfiguredSource),
        Arc::new(UnconfiguredClassifier),
        Duration::from_secs(10),
    )
    .await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/datastore/revision")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_datastore_get() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/datastore"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"]["schemaVersion"].is_number());
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 1);
    assert!(body["data"]["tasks"].as_array().unwrap().is_empty());
    assert!(body["revisionId"].is_number());
}

#[tokio::test]
async fn test_member_create_and_list() {
    let fixture = TestFixture::new().await;

    let created = fixture.create_member("mem-1", "Maya Patel", 80.0).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["availability"], "available");
    assert_eq!(created["data"]["source"], "default");
    assert_eq!(created["data"]["isOutOfOffice"], false);
    assert_eq!(created["data"]["calendarFreePct"], 80.0);

    // Generated id when none is supplied
    let resp = fixture
        .client
        .post(fixture.url("/api/members"))
        .json(&json!({ "name": "Jordan Lee", "skills": ["postgres"] }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(!body["data"]["id"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["calendarFreePct"], 100.0);

    let list_resp = fixture
        .client
        .get(fixture.url("/api/members"))
        .send()
        .await
        .unwrap();
    assert_eq!(list_resp.status(), 200);
    let list_body: Value = list_resp.json().await.unwrap();
    let names: Vec<&str> = list_body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Jordan Lee", "Maya Patel"]);

    // Duplicate id
    let dup = fixture
        .client
        .post(fixture.url("/api/members"))
        .json(&json!({ "id": "mem-1", "name": "Someone Else" }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status(), 409);
}

#[tokio::test]
async fn test_override_set_and_clear() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;

    let resp = fixture
        .client
        .put(fixture.url("/api/members/mem-1/override"))
        .json(&json!({ "status": "ooo" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["availability"], "ooo");
    assert_eq!(body["data"]["isOutOfOffice"], true);
    assert_eq!(body["data"]["source"], "manual");
    assert_eq!(body["data"]["manualOverrideActive"], true);

    let resp = fixture
        .client
        .delete(fixture.url("/api/members/mem-1/override"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["availability"], "available");
    assert_eq!(body["data"]["manualOverrideActive"], false);
    assert_eq!(body["data"]["source"], "default");
}

#[tokio::test]
async fn test_invalid_override_status() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;

    let resp = fixture
        .client
        .put(fixture.url("/api/members/mem-1/override"))
        .json(&json!({ "status": "vacation" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_STATUS");

    // Nothing was written
    let member = fixture.member("mem-1").await;
    assert_eq!(member["availability"], "available");
    assert_eq!(member["manualOverrideActive"], false);
}

#[tokio::test]
async fn test_announcement_marks_member_ooo() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;
    fixture.create_member("mem-2", "Jordan Lee", 60.0).await;

    let start = Utc::now() - chrono::Duration::hours(1);
    let end = Utc::now() + chrono::Duration::days(3);

    let resp = fixture
        .client
        .post(fixture.url("/api/announcements"))
        .json(&json!({
            "announcements": [{
                "personReference": "@jordan.lee",
                "startDate": start.to_rfc3339(),
                "endDate": end.to_rfc3339(),
                "reason": "family",
                "coverageReference": "@maya"
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["detected"], 1);
    assert_eq!(body["data"]["applied"], 1);
    assert_eq!(body["data"]["skipped"], 0);

    let change = &body["data"]["changes"][0];
    assert_eq!(change["memberId"], "mem-2");
    assert_eq!(change["pending"], false);
    assert_eq!(change["coverageBy"], "Maya Patel");

    let member = fixture.member("mem-2").await;
    assert_eq!(member["availability"], "ooo");
    assert_eq!(member["isOutOfOffice"], true);
    assert_eq!(member["source"], "slack");
    assert!(member["slackOooUntil"].is_string());
}

#[tokio::test]
async fn test_announcement_with_bad_date_is_rejected() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/announcements"))
        .json(&json!({
            "announcements": [{ "personReference": "maya", "startDate": "next-ish week" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(fixture.member("mem-1").await["availability"], "available");
}

#[tokio::test]
async fn test_override_blocks_announcement() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;

    fixture
        .client
        .put(fixture.url("/api/members/mem-1/override"))
        .json(&json!({ "status": "available" }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .post(fixture.url("/api/announcements"))
        .json(&json!({ "announcements": [{ "personReference": "maya" }] }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["applied"], 0);
    assert_eq!(body["data"]["skipped"], 1);

    let member = fixture.member("mem-1").await;
    assert_eq!(member["availability"], "available");
    assert_eq!(member["source"], "manual");
}

#[tokio::test]
async fn test_sync_counts_messages() {
    let now = Utc::now();
    let feed = StaticFeed {
        messages: vec![
            message("maya.patel", "OOO today, back tomorrow", now - chrono::Duration::minutes(30)),
            message("jordan.lee", "standup notes attached", now - chrono::Duration::minutes(20)),
            message("sam", "???", now - chrono::Duration::minutes(10)),
        ],
        delay: Duration::ZERO,
    };
    let fixture = TestFixture::with_collaborators(
        Arc::new(feed),
        Arc::new(KeywordClassifier),
        Duration::from_secs(10),
    )
    .await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;
    fixture.create_member("mem-2", "Jordan Lee", 60.0).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/sync?hours=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["scanned"], 3);
    assert_eq!(body["data"]["detected"], 1);
    assert_eq!(body["data"]["applied"], 1);
    assert_eq!(body["data"]["skipped"], 0);

    assert_eq!(fixture.member("mem-1").await["availability"], "ooo");
    assert_eq!(fixture.member("mem-2").await["availability"], "available");
}

#[tokio::test]
async fn test_sync_without_feed_is_upstream_error() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/sync"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_sync_lookback_bounds() {
    let fixture = TestFixture::new().await;

    for query in ["hours=0", "hours=721", "limit=0", "limit=1000"] {
        let resp = fixture
            .client
            .post(fixture.url(&format!("/api/sync?{}", query)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "query {}", query);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_sync_timeout() {
    let feed = StaticFeed {
        messages: Vec::new(),
        delay: Duration::from_secs(5),
    };
    let fixture = TestFixture::with_collaborators(
        Arc::new(feed),
        Arc::new(KeywordClassifier),
        Duration::from_millis(50),
    )
    .await;

    let resp = fixture
        .client
        .post(fixture.url("/api/sync"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 504);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "TIMEOUT");
}

#[tokio::test]
async fn test_sweep_endpoint_on_quiet_roster() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/sweep"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["restored"].as_array().unwrap().is_empty());
    assert!(body["data"]["activated"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reassign_and_unassign() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-3", "Priya Shah", 50.0).await;
    fixture.create_member("mem-7", "Alex Kim", 90.0).await;
    let created = fixture.create_task("task-001", "mem-3").await;
    assert_eq!(created["data"]["status"], "at-risk");

    let resp = fixture
        .client
        .post(fixture.url("/api/tasks/task-001/reassign"))
        .json(&json!({ "memberId": "mem-7" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["assigneeId"], "mem-7");
    assert_eq!(body["data"]["status"], "covered");

    let resp = fixture
        .client
        .post(fixture.url("/api/tasks/task-001/unassign"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["assigneeId"].is_null());
    assert_eq!(body["data"]["status"], "unassigned");
    assert_eq!(body["data"]["needsRescoring"], true);

    // Unknown member
    let resp = fixture
        .client
        .post(fixture.url("/api/tasks/task-001/reassign"))
        .json(&json!({ "memberId": "mem-404" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_task_status_validation() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-3", "Priya Shah", 50.0).await;
    fixture.create_task("task-001", "mem-3").await;

    let resp = fixture
        .client
        .put(fixture.url("/api/tasks/task-001/status"))
        .json(&json!({ "status": "done" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_STATUS");

    let resp = fixture
        .client
        .put(fixture.url("/api/tasks/task-001/status"))
        .json(&json!({ "status": "covered" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "covered");
}

#[tokio::test]
async fn test_suggestions_ranked_by_combined_score() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 71.0).await;
    fixture.create_member("mem-2", "Jordan Lee", 70.0).await;
    fixture.create_member("mem-3", "Priya Shah", 100.0).await;
    fixture.create_task("task-001", "mem-3").await;

    let resp = fixture
        .client
        .put(fixture.url("/api/tasks/task-001/scores"))
        .json(&json!({
            "scores": [
                { "memberId": "mem-1", "skillMatchPct": 90, "contextReason": "Owned billing v1" },
                { "memberId": "mem-2", "skillMatchPct": 70 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/tasks/task-001"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let suggestions = body["data"]["suggestions"].as_array().unwrap();

    // The assignee is never a candidate
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0]["memberId"], "mem-1");
    assert_eq!(suggestions[0]["contextReason"], "Owned billing v1");
    let top = suggestions[0]["combinedScore"].as_f64().unwrap();
    assert!((top - 76.7).abs() < 1e-9);
    assert_eq!(suggestions[1]["memberId"], "mem-2");

    // OOO members drop out
    fixture
        .client
        .put(fixture.url("/api/members/mem-1/override"))
        .json(&json!({ "status": "ooo" }))
        .send()
        .await
        .unwrap();
    let resp = fixture
        .client
        .get(fixture.url("/api/tasks/task-001/suggestions"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let suggestions = body["data"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["memberId"], "mem-2");
}

#[tokio::test]
async fn test_calendar_batch_is_atomic() {
    let fixture = TestFixture::new().await;
    fixture.create_member("mem-1", "Maya Patel", 80.0).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/calendar"))
        .json(&json!({
            "entries": [
                { "memberId": "mem-1", "calendarFreePct": 25 },
                { "memberId": "mem-404", "calendarFreePct": 50 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(fixture.member("mem-1").await["calendarFreePct"], 80.0);

    let resp = fixture
        .client
        .put(fixture.url("/api/members/mem-1/calendar"))
        .json(&json!({ "calendarFreePct": 140 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .put(fixture.url("/api/members/mem-1/calendar"))
        .json(&json!({ "calendarFreePct": 35.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(fixture.member("mem-1").await["calendarFreePct"], 35.5);
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;

    // Create member with empty name
    let resp = fixture
        .client
        .post(fixture.url("/api/members"))
        .json(&json!({ "name": "  " }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Covered task without an assignee
    let resp = fixture
        .client
        .post(fixture.url("/api/tasks"))
        .json(&json!({
            "title": "Orphan",
            "priority": "P2",
            "deadline": "2026-03-01T17:00:00Z",
            "status": "covered"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_revision_increments_on_writes() {
    let fixture = TestFixture::new().await;

    // Get initial revision
    let initial_resp = fixture
        .client
        .get(fixture.url("/api/datastore/revision"))
        .send()
        .await
        .unwrap();
    let initial_body: Value = initial_resp.json().await.unwrap();
    let initial_revision = initial_body["data"]["revisionId"].as_i64().unwrap();

    let create_body = fixture.create_member("mem-1", "Maya Patel", 80.0).await;
    let after_create = create_body["revisionId"].as_i64().unwrap();
    assert_eq!(after_create, initial_revision + 1);

    let override_resp = fixture
        .client
        .put(fixture.url("/api/members/mem-1/override"))
        .json(&json!({ "status": "partial" }))
        .send()
        .await
        .unwrap();
    let override_body: Value = override_resp.json().await.unwrap();
    let after_override = override_body["revisionId"].as_i64().unwrap();
    assert_eq!(after_override, initial_revision + 2);

    // A sweep with nothing to do leaves the revision alone
    let sweep_resp = fixture
        .client
        .post(fixture.url("/api/sweep"))
        .send()
        .await
        .unwrap();
    let sweep_body: Value = sweep_resp.json().await.unwrap();
    assert_eq!(sweep_body["revisionId"].as_i64().unwrap(), after_override);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    // Get non-existent member
    let resp = fixture
        .client
        .get(fixture.url("/api/members/non-existent-id"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // Get non-existent task
    let resp2 = fixture
        .client
        .get(fixture.url("/api/tasks/non-existent-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp2.status(), 404);

    // Override on a missing member
    let resp3 = fixture
        .client
        .delete(fixture.url("/api/members/non-existent-id/override"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp3.status(), 404);
}
