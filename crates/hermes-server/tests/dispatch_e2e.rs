//! End-to-end dispatch tests.
//!
//! Drives a full application through [`App::handle`]: registration with
//! groups and mounted services, the recommended middleware chain, request
//! decoding, JSON and empty responses, and SSE streams.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream;
use hermes_core::{
    ApiError, AuthError, Endpoint, EndpointDescriptor, EventStream, HermesError, HermesResult,
    Identity, NoContent, ServiceContext,
};
use hermes_extract::{Json, Path, Query};
use hermes_middleware::{
    AuthMiddleware, CorsMiddleware, ErrorTranslationMiddleware, MiddlewareChain,
    RequestIdMiddleware, TokenVerifier, REQUEST_ID_HEADER,
};
use hermes_server::{App, Mountable, RegistrationError, RouteGroup, RouteRegistrar};
use hermes_sse::{SseConfig, SseEvent};
use http::header::{
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, AUTHORIZATION,
    CONTENT_TYPE, ORIGIN,
};
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};

const ORIGIN_URL: &str = "https://reader.example.com";

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePath {
    book_id: String,
    chat_id: String,
}

#[derive(Deserialize)]
struct MessageQuery {
    limit: Option<u32>,
    q: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageList {
    book_id: String,
    chat_id: String,
    limit: Option<u32>,
    q: Option<String>,
}

struct ListMessages;

impl Endpoint for ListMessages {
    type Input = (Path<MessagePath>, Query<MessageQuery>);
    type Output = MessageList;

    fn descriptor() -> EndpointDescriptor {
        EndpointDescriptor::get("listMessages", "/messages")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewNote {
    text: String,
    remind_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Note {
    author: String,
    text: String,
    remind_at: DateTime<Utc>,
}

struct CreateNote;

impl Endpoint for CreateNote {
    type Input = Json<NewNote>;
    type Output = Note;

    fn descriptor() -> EndpointDescriptor {
        EndpointDescriptor::post("createNote", "/notes").require_auth()
    }
}

struct DeleteChat;

impl Endpoint for DeleteChat {
    type Input = ();
    type Output = NoContent;

    fn descriptor() -> EndpointDescriptor {
        EndpointDescriptor::delete("deleteChat", "").require_auth()
    }
}

struct Whoami;

impl Endpoint for Whoami {
    type Input = ();
    type Output = Option<String>;

    fn descriptor() -> EndpointDescriptor {
        EndpointDescriptor::get("whoami", "/whoami")
    }
}

#[derive(Deserialize)]
struct TickQuery {
    count: u32,
    fail_at: Option<u32>,
}

struct Ticks;

impl Endpoint for Ticks {
    type Input = Query<TickQuery>;
    type Output = EventStream;

    fn descriptor() -> EndpointDescriptor {
        EndpointDescriptor::get("ticks", "/ticks")
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

struct ChatService;

impl ChatService {
    async fn list_messages(
        &self,
        path: MessagePath,
        query: MessageQuery,
    ) -> HermesResult<MessageList> {
        if path.chat_id == "missing" {
            return Err(ApiError::not_found("chat not found").into());
        }
        Ok(MessageList {
            book_id: path.book_id,
            chat_id: path.chat_id,
            limit: query.limit,
            q: query.q,
        })
    }
}

impl Mountable for ChatService {
    fn base_path(&self) -> &str {
        "/books/:bookId/chats/:chatId"
    }

    fn routes(self: Arc<Self>, routes: &mut RouteGroup<'_>) -> Result<(), RegistrationError> {
        routes
            .register::<ListMessages, _, _>(move |_ctx, (Path(path), Query(query))| {
                let service = Arc::clone(&self);
                async move { service.list_messages(path, query).await }
            })?
            .register_empty::<DeleteChat, _, _>(|ctx, ()| async move {
                ctx.require_identity()?;
                Ok(())
            })?;
        Ok(())
    }
}

struct Tokens;

#[async_trait]
impl TokenVerifier for Tokens {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        match token {
            "t-ada" => Ok(Identity::new("ada").with_role("editor")),
            _ => Err(AuthError::InvalidToken("unknown token".to_string())),
        }
    }
}

fn app() -> App {
    let mut registrar = RouteRegistrar::new().with_sse_config(
        SseConfig::new()
            .without_keep_alive()
            .with_default_retry(Duration::from_millis(1500)),
    );

    registrar
        .register::<Whoami, _, _>(|ctx: ServiceContext, ()| async move {
            Ok(ctx.authenticated_user_id().map(str::to_string))
        })
        .unwrap()
        .register_stream::<Ticks, _, _, _, _>(|_ctx, Query(query): Query<TickQuery>| async move {
            let events = (1..=query.count).map(move |n| {
                if Some(n) == query.fail_at {
                    Err(format!("tick {n} failed"))
                } else {
                    Ok(SseEvent::new(n.to_string()).event("tick").id(n.to_string()))
                }
            });
            Ok(stream::iter(events.collect::<Vec<_>>()))
        })
        .unwrap();

    {
        let mut v1 = registrar.group("/v1").unwrap();
        v1.mount(ChatService).unwrap();
        v1.register::<CreateNote, _, _>(|ctx: ServiceContext, Json(note): Json<NewNote>| async move {
            let identity = ctx.require_identity()?;
            if note.text.is_empty() {
                return Err(ApiError::unprocessable("text must not be empty").into());
            }
            Ok(Note {
                author: identity.user_id().to_string(),
                text: note.text,
                remind_at: note.remind_at,
            })
        })
        .unwrap();
    }

    let chain = MiddlewareChain::builder()
        .with(ErrorTranslationMiddleware::new())
        .with(RequestIdMiddleware::new())
        .with(CorsMiddleware::builder().allow_origin(ORIGIN_URL).build())
        .with(AuthMiddleware::new(Tokens))
        .build();
    registrar.into_app(chain)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Call {
    method: Method,
    uri: String,
    token: Option<&'static str>,
    body: Bytes,
}

impl Call {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            token: None,
            body: Bytes::new(),
        }
    }

    fn token(mut self, token: &'static str) -> Self {
        self.token = Some(token);
        self
    }

    fn json(mut self, body: &serde_json::Value) -> Self {
        self.body = Bytes::from(serde_json::to_vec(body).unwrap());
        self
    }

    async fn send(self, app: &App) -> hermes_core::Response {
        let mut builder = http::Request::builder()
            .method(self.method)
            .uri(self.uri)
            .header(ORIGIN, ORIGIN_URL);
        if let Some(token) = self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if !self.body.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        app.handle(builder.body(self.body).unwrap()).await
    }
}

async fn body_bytes(response: hermes_core::Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(response: hermes_core::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_nested_group_path_params_and_query() {
    let app = app();
    let response = Call::new(
        Method::GET,
        "/v1/books/b%201/chats/c-9/messages?limit=5&q=caf%C3%A9+latte&limit=7",
    )
    .send(&app)
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN_URL);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let body = body_json(response).await;
    assert_eq!(body["bookId"], "b 1");
    assert_eq!(body["chatId"], "c-9");
    assert_eq!(body["limit"], 7);
    assert_eq!(body["q"], "café+latte");
}

#[tokio::test]
async fn test_absent_optional_query_params() {
    let response = Call::new(Method::GET, "/v1/books/b/chats/c/messages")
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["limit"].is_null());
    assert!(body["q"].is_null());
}

#[tokio::test]
async fn test_malformed_optional_query_is_bad_request() {
    let response = Call::new(Method::GET, "/v1/books/b/chats/c/messages?limit=ten")
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = body_json(response).await;
    assert_eq!(body["errorCode"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_domain_error_body_is_exact() {
    let response = Call::new(Method::GET, "/v1/books/b/chats/missing/messages")
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN_URL);
    assert_eq!(
        body_bytes(response).await,
        Bytes::from_static(br#"{"errorCode":"NOT_FOUND","message":"chat not found"}"#)
    );
}

#[tokio::test]
async fn test_json_body_with_timestamp() {
    let response = Call::new(Method::POST, "/v1/notes")
        .token("t-ada")
        .json(&serde_json::json!({
            "text": "chapter 3",
            "remindAt": "2026-03-01T09:30:00Z",
        }))
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["author"], "ada");
    assert_eq!(body["text"], "chapter 3");
    assert_eq!(body["remindAt"], "2026-03-01T09:30:00Z");
}

#[tokio::test]
async fn test_json_body_missing_field_is_bad_request() {
    let response = Call::new(Method::POST, "/v1/notes")
        .token("t-ada")
        .json(&serde_json::json!({ "text": "no date" }))
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errorCode"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("remindAt"));
}

#[tokio::test]
async fn test_handler_domain_error_status() {
    let response = Call::new(Method::POST, "/v1/notes")
        .token("t-ada")
        .json(&serde_json::json!({ "text": "", "remindAt": "2026-03-01T09:30:00Z" }))
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_required_auth_without_token() {
    let response = Call::new(Method::POST, "/v1/notes")
        .json(&serde_json::json!({ "text": "x", "remindAt": "2026-03-01T09:30:00Z" }))
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN_URL);
    let body = body_json(response).await;
    assert_eq!(body["errorCode"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_required_auth_with_rejected_token() {
    let response = Call::new(Method::DELETE, "/v1/books/b/chats/c")
        .token("t-forged")
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_no_content_response() {
    let response = Call::new(Method::DELETE, "/v1/books/b/chats/c")
        .token("t-ada")
        .send(&app())
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!response.headers().contains_key(CONTENT_TYPE));
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_public_endpoint_sees_identity_when_present() {
    let app = app();

    let anonymous = Call::new(Method::GET, "/whoami").send(&app).await;
    assert_eq!(body_bytes(anonymous).await, Bytes::from_static(b"null"));

    let authenticated = Call::new(Method::GET, "/whoami").token("t-ada").send(&app).await;
    assert_eq!(body_bytes(authenticated).await, Bytes::from_static(b"\"ada\""));

    // A bad token on a public endpoint still dispatches anonymously.
    let forged = Call::new(Method::GET, "/whoami").token("t-forged").send(&app).await;
    assert_eq!(forged.status(), StatusCode::OK);
    assert_eq!(body_bytes(forged).await, Bytes::from_static(b"null"));
}

#[tokio::test]
async fn test_cors_preflight_short_circuits() {
    let response = Call::new(Method::OPTIONS, "/v1/notes").send(&app()).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN_URL);
    assert!(response.headers().contains_key(ACCESS_CONTROL_ALLOW_METHODS));
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_method_not_allowed_and_not_found() {
    let app = app();

    let response = Call::new(Method::PUT, "/v1/books/b/chats/c").send(&app).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[ALLOW], "DELETE");
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN_URL);
    assert_eq!(body_json(response).await["errorCode"], "HTTP_ABORT");

    let response = Call::new(Method::GET, "/v2/anything").send(&app).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!response.headers().contains_key(ALLOW));
}

#[tokio::test]
async fn test_incoming_request_id_is_echoed() {
    let id = "0190b1a4-6c7e-7a11-8b22-9c33d44e55f6";
    let request = http::Request::builder()
        .uri("/whoami")
        .header(REQUEST_ID_HEADER, id)
        .body(Bytes::new())
        .unwrap();

    let response = app().handle(request).await;
    assert_eq!(response.headers()[REQUEST_ID_HEADER], id);
}

#[tokio::test]
async fn test_sse_stream_through_app() {
    let response = Call::new(Method::GET, "/ticks?count=2").send(&app()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.body().is_streaming());
    assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN_URL);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let text = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert_eq!(
        text,
        ": connected\n\nretry: 1500\n\nevent: tick\nid: 1\ndata: 1\n\nevent: tick\nid: 2\ndata: 2\n\n"
    );
}

#[tokio::test]
async fn test_sse_source_error_ends_stream() {
    let response = Call::new(Method::GET, "/ticks?count=5&fail_at=2")
        .send(&app())
        .await;

    // Headers are already committed, so the status stays 200.
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(text.contains("data: 1\n\n"));
    assert!(!text.contains("data: 2"));
    assert!(!text.contains("errorCode"));
}

#[tokio::test]
async fn test_sse_decode_error_happens_before_stream() {
    let response = Call::new(Method::GET, "/ticks").send(&app()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!response.body().is_streaming());
}

#[tokio::test]
async fn test_internal_error_is_hidden() {
    struct Explode;

    impl Endpoint for Explode {
        type Input = ();
        type Output = ();

        fn descriptor() -> EndpointDescriptor {
            EndpointDescriptor::get("explode", "/explode")
        }
    }

    let mut registrar = RouteRegistrar::new();
    registrar
        .register::<Explode, _, _>(|_ctx, ()| async {
            Err(HermesError::internal("database password is hunter2"))
        })
        .unwrap();
    let app = registrar.into_app(
        MiddlewareChain::builder()
            .with(ErrorTranslationMiddleware::new())
            .build(),
    );

    let response = Call::new(Method::GET, "/explode").send(&app).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(text.contains("INTERNAL_SERVER_ERROR"));
    assert!(!text.contains("hunter2"));
}
