//! Drives the router end to end with an in-memory database and mock models.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chat_core::{ChatError, ChatMessage, ChatModel, Completion};
use concierge::{Concierge, ConversationWriter};
use concierge_web::seed::seed_rooms;
use concierge_web::{app, AppState, SessionStore};
use database::{conversation, memory, user, Database, NewUser, User};
use mock_llm::{EchoModel, ScriptedModel};
use nlp::SpellChecker;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
    writer: ConversationWriter,
}

impl TestApp {
    async fn new(model: Arc<dyn ChatModel>) -> Self {
        Self::with_sessions(model, SessionStore::new()).await
    }

    async fn with_sessions(model: Arc<dyn ChatModel>, sessions: SessionStore) -> Self {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        let writer = ConversationWriter::start(db.clone(), 16);
        let concierge = Concierge::new(
            db.clone(),
            model,
            Arc::new(SpellChecker::bundled()),
            writer.clone(),
        );
        let state = AppState::new(db, Arc::new(concierge), false).with_sessions(sessions);

        Self {
            router: app(state.clone()),
            state,
            writer,
        }
    }

    fn db(&self) -> &Database {
        &self.state.db
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: Value, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Create a user directly, with a cheap bcrypt cost.
    async fn create_user(&self, username: &str, password: &str) -> User {
        user::create_user(
            self.db().pool(),
            &NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: bcrypt::hash(password, 4).unwrap(),
            },
        )
        .await
        .unwrap()
    }

    /// Log in and return the `name=value` cookie pair.
    async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post(
                "/login",
                json!({"username": username, "password": password}),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn signed_in(&self, username: &str) -> (User, String) {
        let user = self.create_user(username, "correct horse").await;
        let cookie = self.login(username, "correct horse").await;
        (user, cookie)
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Split an SSE body into `(event name, data)` pairs.
fn sse_events(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut name = "message".to_string();
            let mut data = Vec::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event: ") {
                    name = value.to_string();
                } else if let Some(value) = line.strip_prefix("data: ") {
                    data.push(value);
                }
            }
            (name, data.join("\n"))
        })
        .collect()
}

/// Concatenated `content` of every message event before `[DONE]`.
fn streamed_text(events: &[(String, String)]) -> String {
    events
        .iter()
        .take_while(|(_, data)| data != "[DONE]")
        .filter(|(name, _)| name == "message")
        .map(|(_, data)| {
            let payload: Value = serde_json::from_str(data).unwrap();
            payload["content"].as_str().unwrap().to_string()
        })
        .collect()
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(Arc::new(EchoModel::new())).await;
    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_register() {
    let app = TestApp::new(Arc::new(EchoModel::new())).await;
    let form = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "correct horse"
    });

    let response = app.post("/register", form.clone(), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "User registered successfully!"})
    );

    let response = app.post("/register", form, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Username already exists. Please choose another one."
    );

    let response = app
        .post(
            "/register",
            json!({"username": "bob", "email": "not-an-email", "password": "correct horse"}),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/register",
            json!({"username": "carol", "email": "carol@example.com", "password": "short"}),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_session() {
    let app = TestApp::new(Arc::new(EchoModel::new())).await;
    let alice = app.create_user("alice", "correct horse").await;

    let response = app
        .post(
            "/login",
            json!({"username": "alice", "password": "wrong"}),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials");

    let response = app
        .post(
            "/login",
            json!({"username": "nobody", "password": "correct horse"}),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/check_session", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({"status": "not_logged_in"}));

    let cookie = app.login("alice", "correct horse").await;
    let response = app.get("/check_session", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "logged_in", "user_id": alice.id})
    );

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    assert!(app.state.sessions.is_empty().await);

    let response = app.get("/check_session", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pages_redirect_without_session() {
    let app = TestApp::new(Arc::new(EchoModel::new())).await;

    let response = app.get("/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let response = app.get("/conversation_history", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    for page in ["/", "/login", "/register"] {
        let response = app.get(page, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{page}");
    }
}

#[tokio::test]
async fn test_logged_in_routes_require_session() {
    let app = TestApp::new(Arc::new(EchoModel::new())).await;

    let response = app.post("/chat", json!({"message": "hello"}), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "You must be logged in to chat"
    );

    let response = app
        .post(
            "/book_room",
            json!({"room_id": 1, "check_in_date": "2099-01-01", "check_out_date": "2099-01-02"}),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/view_reservations", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.post("/cancel_reservation/1", json!({}), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_session_is_refused() {
    let app = TestApp::with_sessions(
        Arc::new(EchoModel::new()),
        SessionStore::with_ttl(Duration::ZERO),
    )
    .await;
    let (_, cookie) = app.signed_in("alice").await;

    let response = app.get("/view_reservations", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/check_session", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_chat_streams_booking_turn() {
    let model = Arc::new(ScriptedModel::new("I can book that suite for you.").with_chunk_size(6));
    let app = TestApp::new(model.clone()).await;
    let (alice, cookie) = app.signed_in("alice").await;

    let response = app
        .post(
            "/chat",
            json!({"message": "I want to book a suite from 2024-01-01 to 2024-01-05"}),
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(headers.get("x-intent").unwrap(), "book_room");
    let entities: Value =
        serde_json::from_str(headers.get("x-entities").unwrap().to_str().unwrap()).unwrap();
    assert_eq!(
        entities,
        json!({
            "check_in_date": "2024-01-01",
            "check_out_date": "2024-01-05",
            "room_type": "suite"
        })
    );

    let events = sse_events(&body_text(response).await);
    assert!(events.len() > 2);
    assert_eq!(events.last().unwrap().1, "[DONE]");
    assert_eq!(streamed_text(&events), "I can book that suite for you.");

    // One memory row per entity key.
    let memories = memory::list_memories(app.db().pool(), alice.id).await.unwrap();
    assert_eq!(memories.len(), 3);

    app.writer.flush().await;
    let saved = conversation::latest_for_user(app.db().pool(), alice.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.message, "i want to book a suite from 2024-01-01 to 2024-01-05");
    assert_eq!(saved.response, "I can book that suite for you.");
    assert!(saved.follow_up_date.is_some());

    let system = &model.last_request().unwrap()[0].content;
    assert!(system.contains("The user's name is alice."));
}

#[tokio::test]
async fn test_chat_keeps_newlines_in_deltas() {
    let reply = "Options:\n- Suite\n- Double";
    let app = TestApp::new(Arc::new(ScriptedModel::new(reply).with_chunk_size(11))).await;
    let (alice, cookie) = app.signed_in("alice").await;

    let response = app
        .post("/chat", json!({"message": "What rooms do you have?"}), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    // Every delta fits on one data line.
    assert!(body
        .lines()
        .all(|line| line.is_empty() || line.starts_with("data: ")));
    assert_eq!(streamed_text(&sse_events(&body)), reply);

    app.writer.flush().await;
    let saved = conversation::latest_for_user(app.db().pool(), alice.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.response, reply);
}

/// Streams one delta, then fails.
struct BrokenStreamModel;

#[chat_core::async_trait]
impl ChatModel for BrokenStreamModel {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _stream: bool,
    ) -> Result<Completion, ChatError> {
        let deltas = futures::stream::iter(vec![
            Ok("Let me check".to_string()),
            Err(ChatError::Network("connection reset".to_string())),
        ]);
        Ok(Completion::Stream(Box::pin(deltas)))
    }

    fn name(&self) -> &str {
        "BrokenStreamModel"
    }
}

#[tokio::test]
async fn test_chat_reports_stream_failure_as_error_event() {
    let app = TestApp::new(Arc::new(BrokenStreamModel)).await;
    let (alice, cookie) = app.signed_in("alice").await;

    let response = app
        .post("/chat", json!({"message": "Any suites?"}), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let events = sse_events(&body_text(response).await);
    assert_eq!(streamed_text(&events), "Let me check");
    let (name, data) = &events[events.len() - 2];
    assert_eq!(name, "error");
    let payload: Value = serde_json::from_str(data).unwrap();
    assert_eq!(payload["error"], "An error occurred while processing the chat.");
    assert_eq!(events.last().unwrap().1, "[DONE]");

    // A broken reply is not saved.
    app.writer.flush().await;
    let saved = conversation::latest_for_user(app.db().pool(), alice.id)
        .await
        .unwrap();
    assert!(saved.is_none());
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let app = TestApp::new(Arc::new(EchoModel::new())).await;
    let (_, cookie) = app.signed_in("alice").await;

    let response = app.post("/chat", json!({"message": "   "}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_and_history() {
    let model = Arc::new(ScriptedModel::new("Happy to help.").with_summary("finding a double room"));
    let app = TestApp::new(model).await;
    let (_, cookie) = app.signed_in("alice").await;

    let page = body_text(app.get("/dashboard", Some(&cookie)).await).await;
    assert!(page.contains("Hi alice! Welcome back! How can I assist you with your hotel reservation today?"));

    let response = app
        .post("/chat", json!({"message": "Any double rooms?"}), Some(&cookie))
        .await;
    body_text(response).await;
    app.writer.flush().await;

    let page = body_text(app.get("/dashboard", Some(&cookie)).await).await;
    assert!(page.contains("Last time, we talked about finding a double room."));

    let page = body_text(app.get("/conversation_history", Some(&cookie)).await).await;
    assert!(page.contains("any double rooms"));
    assert!(page.contains("Happy to help."));
}

#[tokio::test]
async fn test_reservation_flow() {
    let app = TestApp::new(Arc::new(EchoModel::new())).await;
    seed_rooms(app.db()).await.unwrap();
    let (_, cookie) = app.signed_in("alice").await;

    let stay = json!({"check_in_date": "2099-06-01", "check_out_date": "2099-06-05"});
    let response = app.post("/check_availability", stay.clone(), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rooms = body_json(response).await["available_rooms"].clone();
    assert_eq!(rooms.as_array().unwrap().len(), 3);
    let suite = rooms
        .as_array()
        .unwrap()
        .iter()
        .find(|room| room["room_type"] == "Suite")
        .unwrap()
        .clone();

    let booking = json!({
        "room_id": suite["id"],
        "check_in_date": "2099-06-01",
        "check_out_date": "2099-06-05"
    });
    let response = app.post("/book_room", booking.clone(), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let booked = body_json(response).await;
    assert_eq!(booked["message"], "Room booked successfully!");
    assert_eq!(booked["total_price"], 1000.0);
    let reservation_id = booked["reservation_id"].as_i64().unwrap();

    // The suite is taken for those nights now.
    let response = app.post("/book_room", booking, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Room not available.");

    let response = app.post("/check_availability", stay, None).await;
    let rooms = body_json(response).await["available_rooms"].clone();
    assert_eq!(rooms.as_array().unwrap().len(), 2);

    let response = app.get("/view_reservations", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let reservations = body_json(response).await["reservations"].clone();
    assert_eq!(reservations[0]["room_type"], "Suite");
    assert_eq!(reservations[0]["check_in_date"], "2099-06-01");
    assert_eq!(reservations[0]["status"], "confirmed");

    let uri = format!("/cancel_reservation/{reservation_id}");
    let response = app.post(&uri, json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "cancelled");

    let response = app.post(&uri, json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Another guest cannot see or cancel it.
    let (_, other) = app.signed_in("bob").await;
    let response = app.post(&uri, json!({}), Some(&other)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_stays_are_rejected() {
    let app = TestApp::new(Arc::new(EchoModel::new())).await;
    seed_rooms(app.db()).await.unwrap();
    let (_, cookie) = app.signed_in("alice").await;

    let response = app
        .post(
            "/check_availability",
            json!({"check_in_date": "2099-06-05", "check_out_date": "2099-06-01"}),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/book_room",
            json!({"room_id": 1, "check_in_date": "June 1", "check_out_date": "2099-06-02"}),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/book_room",
            json!({"room_id": 999, "check_in_date": "2099-06-01", "check_out_date": "2099-06-02"}),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Room not available.");
}
