//! Integration tests for the webhook server against fake LINE and Gemini APIs.
//!
//! Each test starts the real router on a local port, backed by a
//! file-based user store and HTTP clients pointed at an in-process fake of
//! the upstream APIs, and drives it over HTTP.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use learnbot_report::ScoredSession;
use learnbot_server::{
    create_router, sign, Advisor, AppState, Config, FileUserStore, GeminiAdvisor, GeminiConfig,
    LineMessenger, StaticAdvisor, UserStore, SIGNATURE_HEADER,
};
use serde_json::{json, Value};

const SECRET: &str = "integration-secret";
const TOKEN: &str = "integration-token";

/// A request captured by the fake upstream.
#[derive(Debug, Clone)]
struct Captured {
    path: String,
    authorization: Option<String>,
    query: Vec<(String, String)>,
    body: Value,
}

#[derive(Clone, Default)]
struct Upstream {
    captured: Arc<Mutex<Vec<Captured>>>,
    gemini_reply: Arc<Mutex<String>>,
}

impl Upstream {
    fn captured(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    fn record(&self, path: &str, headers: &HeaderMap, query: Vec<(String, String)>, body: Value) {
        self.captured.lock().unwrap().push(Captured {
            path: path.to_string(),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            query,
            body,
        });
    }
}

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Serves `router` on a free local port and returns its base URL.
async fn spawn(router: Router) -> String {
    let addr = format!("127.0.0.1:{}", find_available_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://{addr}")
}

/// Fake LINE and Gemini APIs. Pushes to user IDs starting with `X` fail.
async fn spawn_upstream(upstream: Upstream) -> String {
    async fn line(
        State(upstream): State<Upstream>,
        Path(endpoint): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> StatusCode {
        upstream.record(&format!("line/{endpoint}"), &headers, Vec::new(), body.clone());
        if body["to"].as_str().is_some_and(|to| to.starts_with('X')) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        }
    }

    async fn gemini(
        State(upstream): State<Upstream>,
        Path(action): Path<String>,
        Query(query): Query<Vec<(String, String)>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        upstream.record(&format!("gemini/{action}"), &headers, query, body);
        let reply = upstream.gemini_reply.lock().unwrap().clone();
        Json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": reply }] } }]
        }))
    }

    spawn(
        Router::new()
            .route("/v2/bot/message/:endpoint", post(line))
            .route("/v1beta/models/:action", post(gemini))
            .with_state(upstream),
    )
    .await
}

struct Bot {
    url: String,
    users: Arc<FileUserStore>,
    upstream: Upstream,
    client: reqwest::Client,
    _dir: tempfile::TempDir,
}

impl Bot {
    async fn start() -> Self {
        let upstream = Upstream::default();
        let upstream_url = spawn_upstream(upstream.clone()).await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.line.channel_secret = SECRET.to_string();
        config.line.channel_access_token = TOKEN.to_string();
        config.line.api_base = upstream_url;
        config.user_store_path = dir.path().join("users.json").display().to_string();

        let users = Arc::new(FileUserStore::open(&config.user_store_path).await.unwrap());
        let messenger = LineMessenger::new(&config.line).unwrap();
        let state = AppState {
            users: users.clone(),
            advisor: Arc::new(StaticAdvisor::new("每天複習十分鐘")),
            messenger: Arc::new(messenger),
            config,
        };

        Self {
            url: spawn(create_router(state)).await,
            users,
            upstream,
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    async fn callback(&self, body: &Value) -> reqwest::Response {
        let body = body.to_string();
        self.client
            .post(format!("{}/callback", self.url))
            .header(SIGNATURE_HEADER, sign(SECRET, body.as_bytes()).unwrap())
            .body(body)
            .send()
            .await
            .unwrap()
    }

    async fn notify(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/unity_notify", self.url))
            .json(body)
            .send()
            .await
            .unwrap()
    }
}

fn follow(user_id: &str) -> Value {
    json!({
        "destination": "Ubot",
        "events": [{
            "type": "follow",
            "replyToken": "follow-token",
            "source": { "type": "user", "userId": user_id }
        }]
    })
}

// ============================================================================
// Webhook Tests
// ============================================================================

#[tokio::test]
async fn test_followers_receive_broadcast() {
    let bot = Bot::start().await;

    for user in ["U1", "U2"] {
        let response = bot.callback(&follow(user)).await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "OK");
    }

    let response = bot.notify(&json!({ "message": "遊戲開始啦！第二關" })).await;
    assert_eq!(response.status(), 200);
    let outcome: Value = response.json().await.unwrap();
    assert_eq!(
        outcome,
        json!({ "status": "ok", "user_count": 2, "success_count": 2 })
    );

    let pushes: Vec<Captured> = bot
        .upstream
        .captured()
        .into_iter()
        .filter(|c| c.path == "line/push")
        .collect();
    assert_eq!(pushes.len(), 2);
    for push in &pushes {
        assert_eq!(push.authorization.as_deref(), Some("Bearer integration-token"));
        assert_eq!(
            push.body["messages"],
            json!([{ "type": "text", "text": "遊戲開始啦！第二關" }])
        );
    }
    assert_eq!(pushes[0].body["to"], "U1");
    assert_eq!(pushes[1].body["to"], "U2");
}

#[tokio::test]
async fn test_users_are_persisted_to_disk() {
    let bot = Bot::start().await;
    bot.callback(&follow("U-persisted")).await;

    let reopened = FileUserStore::open(bot.users.path()).await.unwrap();
    assert_eq!(
        reopened.list_user_ids().await.unwrap(),
        vec!["U-persisted"]
    );
}

#[tokio::test]
async fn test_trigger_keyword_replies_with_test_report() {
    let bot = Bot::start().await;

    let response = bot
        .callback(&json!({
            "events": [{
                "type": "message",
                "replyToken": "reply-42",
                "source": { "type": "user", "userId": "U1" },
                "message": { "type": "text", "id": "1", "text": " Test " }
            }]
        }))
        .await;
    assert_eq!(response.status(), 200);

    let captured = bot.upstream.captured();
    assert_eq!(captured.len(), 1);
    let reply = &captured[0];
    assert_eq!(reply.path, "line/reply");
    assert_eq!(reply.body["replyToken"], "reply-42");
    assert_eq!(reply.body["messages"][0]["type"], "flex");
    assert_eq!(reply.body["messages"][0]["altText"], "🧪 測試學習報告");
    assert!(reply.body.to_string().contains("每天複習十分鐘"));

    assert_eq!(bot.users.list_user_ids().await.unwrap(), vec!["U1"]);
}

#[tokio::test]
async fn test_unsigned_callback_is_rejected() {
    let bot = Bot::start().await;

    let response = bot
        .client
        .post(format!("{}/callback", bot.url))
        .header(SIGNATURE_HEADER, "bm9wZQ==")
        .body(follow("U1").to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(bot.users.list_user_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_session_report_reaches_reachable_users() {
    let bot = Bot::start().await;
    bot.callback(&follow("U1")).await;
    bot.callback(&follow("X-blocked")).await;

    let response = bot
        .notify(&json!({
            "totalTime": 1800,
            "attitudeScore": 85,
            "effectivenessScore": 92,
            "concentrationScore": 70,
            "correctCount": 10,
            "wrongCount": 2,
            "unansweredCount": 0,
            "avgAnswerTime": 12
        }))
        .await;

    let outcome: Value = response.json().await.unwrap();
    assert_eq!(
        outcome,
        json!({ "status": "ok", "user_count": 2, "success_count": 1 })
    );

    let push = bot
        .upstream
        .captured()
        .into_iter()
        .find(|c| c.body["to"] == "U1")
        .unwrap();
    let message = &push.body["messages"][0];
    assert_eq!(message["type"], "flex");
    assert_eq!(message["altText"], "學習報告");
    assert_eq!(message["contents"]["size"], "giga");
}

#[tokio::test]
async fn test_notify_without_users() {
    let bot = Bot::start().await;

    let outcome: Value = bot.notify(&json!({})).await.json().await.unwrap();

    assert_eq!(outcome, json!({ "status": "no_users", "user_count": 0 }));
    assert!(bot.upstream.captured().is_empty());
}

// ============================================================================
// Gemini Tests
// ============================================================================

async fn gemini_advisor(upstream: &Upstream) -> GeminiAdvisor {
    let base = spawn_upstream(upstream.clone()).await;
    GeminiAdvisor::new(GeminiConfig {
        api_key: "gemini-key".to_string(),
        api_base: base,
        ..GeminiConfig::default()
    })
    .unwrap()
}

fn session() -> ScoredSession {
    ScoredSession::builder()
        .attitude_score(85.0)
        .effectiveness_score(92.0)
        .concentration_score(70.0)
        .correct_count(10)
        .wrong_count(2)
        .avg_answer_time(12.0)
        .total_time(1800.0)
        .build()
}

#[tokio::test]
async fn test_gemini_advice_request_and_reply() {
    let upstream = Upstream::default();
    *upstream.gemini_reply.lock().unwrap() = "  每天練習五題，保持節奏！\n".to_string();
    let advisor = gemini_advisor(&upstream).await;

    assert_eq!(advisor.advice(&session()).await, "每天練習五題，保持節奏！");

    let captured = upstream.captured();
    assert_eq!(captured.len(), 1);
    let request = &captured[0];
    assert_eq!(request.path, "gemini/gemini-2.0-flash:generateContent");
    assert_eq!(
        request.query,
        vec![("key".to_string(), "gemini-key".to_string())]
    );

    let prompt = request.body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(prompt.contains("學習態度分數：85.0分"));
    assert!(prompt.ends_with("請使用繁體中文回覆，不要使用簡體字。"));
    assert_eq!(request.body["generationConfig"]["topK"], 40);
    assert_eq!(request.body["generationConfig"]["maxOutputTokens"], 100);
}

#[tokio::test]
async fn test_gemini_error_text_falls_back() {
    let upstream = Upstream::default();
    *upstream.gemini_reply.lock().unwrap() = "發生錯誤，請稍後再試".to_string();
    let advisor = gemini_advisor(&upstream).await;

    assert_eq!(advisor.advice(&session()).await, "繼續保持學習熱忱！");
}

#[tokio::test]
async fn test_gemini_empty_text_falls_back() {
    let upstream = Upstream::default();
    let advisor = gemini_advisor(&upstream).await;

    assert_eq!(advisor.advice(&session()).await, "繼續保持學習熱忱！");
}
