//! HTTP server layer for Roster.
//!
//! Exposes an axum [`Router`] over any [`DirectoryStore`]: REST CRUD for
//! workers and sales, admin statistics and natural-language queries, JWT
//! authentication, bulk spreadsheet import, CV rendering, and the embedded
//! web console.

pub mod auth;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod insights;
pub mod interpreter;
pub mod mailer;
pub mod seed;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use roster_core::store::DirectoryStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::TokenKeys;
use handlers::{admins, console, departments, sales, workers};
use interpreter::{AiConfig, Interpreter};
use mailer::{Mailer, SmtpConfig};
use seed::SeedConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under `ROSTER_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                    String,
  pub port:                    u16,
  pub store_path:              PathBuf,
  /// HS256 signing key; the server refuses to start when empty.
  pub token_secret:            String,
  pub token_ttl_hours:         i64,
  pub token_issuer:            String,
  pub token_audience:          String,
  /// The fixed credential provisioned for directory-created and imported
  /// workers.
  pub default_worker_password: String,
  pub seed:                    SeedConfig,
  pub ai:                      AiConfig,
  pub smtp:                    SmtpConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    ServerConfig {
      host:                    "127.0.0.1".to_owned(),
      port:                    8340,
      store_path:              PathBuf::from("roster.db"),
      token_secret:            String::new(),
      token_ttl_hours:         2,
      token_issuer:            "roster".to_owned(),
      token_audience:          "roster".to_owned(),
      default_worker_password: "Worker@123".to_owned(),
      seed:                    SeedConfig::default(),
      ai:                      AiConfig::default(),
      smtp:                    SmtpConfig::default(),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: DirectoryStore> {
  pub store:                 Arc<S>,
  pub config:                Arc<ServerConfig>,
  pub tokens:                Arc<TokenKeys>,
  pub interpreter:           Arc<Interpreter>,
  pub mailer:                Arc<Mailer>,
  /// Argon2 PHC hash of `default_worker_password`, computed once at startup.
  pub default_password_hash: Arc<String>,
}

// Manual impl: `Arc` fields clone regardless of whether `S` does.
impl<S: DirectoryStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    AppState {
      store:                 self.store.clone(),
      config:                self.config.clone(),
      tokens:                self.tokens.clone(),
      interpreter:           self.interpreter.clone(),
      mailer:                self.mailer.clone(),
      default_password_hash: self.default_password_hash.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DirectoryStore + 'static,
{
  Router::new()
    .route("/", get(console::page))
    .route("/api/auth/login", post(handlers::auth::login::<S>))
    .route(
      "/api/workers",
      get(workers::list::<S>).post(workers::create::<S>),
    )
    .route("/api/workers/register", post(workers::register::<S>))
    .route("/api/workers/import", post(workers::import::<S>))
    .route("/api/workers/me", get(workers::me::<S>))
    .route("/api/workers/me/cv", get(workers::my_cv::<S>))
    .route(
      "/api/workers/{id}",
      get(workers::get_one::<S>)
        .put(workers::update::<S>)
        .delete(workers::delete::<S>),
    )
    .route("/api/sales", get(sales::list::<S>).post(sales::create::<S>))
    .route("/api/sales/worker/{worker_id}", get(sales::by_worker::<S>))
    .route(
      "/api/sales/{id}",
      get(sales::get_one::<S>)
        .put(sales::update::<S>)
        .delete(sales::delete::<S>),
    )
    .route("/api/admins/stats", get(admins::stats::<S>))
    .route("/api/admins/stats/workers", get(admins::worker_count::<S>))
    .route("/api/admins/stats/sales", get(admins::sales_total::<S>))
    .route("/api/admins/query", post(admins::query::<S>))
    .route("/api/admins/{id}", get(admins::get_one::<S>))
    .route("/api/departments", get(departments::list))
    .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use roster_store_sqlite::SqliteStore;
  use rust_decimal::Decimal;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  const ADMIN_EMAIL: &str = "admin@roster.local";
  const ADMIN_PASSWORD: &str = "ChangeMe!1";

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      token_secret: "test-secret".to_owned(),
      seed: SeedConfig {
        admin_email:    ADMIN_EMAIL.to_owned(),
        admin_password: ADMIN_PASSWORD.to_owned(),
        admin_name:     "Roster Admin".to_owned(),
      },
      ..ServerConfig::default()
    };

    let admin_hash = auth::hash_password(ADMIN_PASSWORD).unwrap();
    seed::ensure_admin(&store, &config.seed, admin_hash).await.unwrap();

    let default_hash =
      auth::hash_password(&config.default_worker_password).unwrap();
    let tokens = TokenKeys::new(
      &config.token_secret,
      config.token_ttl_hours,
      &config.token_issuer,
      &config.token_audience,
    );

    AppState {
      store:                 Arc::new(store),
      tokens:                Arc::new(tokens),
      interpreter:           Arc::new(Interpreter::new(config.ai.clone())),
      mailer:                Arc::new(Mailer::from_config(&config.smtp).unwrap()),
      default_password_hash: Arc::new(default_hash),
      config:                Arc::new(config),
    }
  }

  async fn request(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  async fn login(state: &AppState<SqliteStore>, email: &str, pass: &str) -> String {
    let (status, body) = request(
      state.clone(),
      "POST",
      "/api/auth/login",
      None,
      Some(json!({ "email": email, "password": pass })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_owned()
  }

  fn worker_body(name: &str, email: &str) -> Value {
    json!({
      "full_name": name,
      "email": email,
      "position": "Developer",
      "wage": 3500,
      "department": "technology",
      "education": "professional",
    })
  }

  // ── Auth ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_rejects_bad_credentials_identically() {
    let state = make_state().await;

    let (wrong_pass, body_a) = request(
      state.clone(),
      "POST",
      "/api/auth/login",
      None,
      Some(json!({ "email": ADMIN_EMAIL, "password": "nope" })),
    )
    .await;
    let (unknown, body_b) = request(
      state,
      "POST",
      "/api/auth/login",
      None,
      Some(json!({ "email": "ghost@x.com", "password": "nope" })),
    )
    .await;

    assert_eq!(wrong_pass, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
  }

  #[tokio::test]
  async fn login_sets_a_session_cookie() {
    let state = make_state().await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/auth/login")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }).to_string(),
      ))
      .unwrap();

    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
      .headers()
      .get(header::SET_COOKIE)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(cookie.starts_with("roster_session="), "cookie: {cookie}");
    assert!(cookie.contains("HttpOnly"));
  }

  #[tokio::test]
  async fn protected_routes_require_a_token() {
    let state = make_state().await;
    let (status, _) =
      request(state.clone(), "GET", "/api/workers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
      request(state, "GET", "/api/admins/stats", Some("junk"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn worker_tokens_cannot_use_admin_routes() {
    let state = make_state().await;
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _) = request(
      state.clone(),
      "POST",
      "/api/workers",
      Some(&admin),
      Some(worker_body("Ana Gomez", "ana@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let worker = login(&state, "ana@x.com", "Worker@123").await;
    let (status, _) = request(
      state.clone(),
      "POST",
      "/api/workers",
      Some(&worker),
      Some(worker_body("Luis Mora", "luis@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
      request(state, "GET", "/api/admins/stats", Some(&worker), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  // ── Workers ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn worker_crud_round_trip() {
    let state = make_state().await;
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, created) = request(
      state.clone(),
      "POST",
      "/api/workers",
      Some(&admin),
      Some(worker_body("Ana Gomez", "ana@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "ana@x.com");
    assert_eq!(created["email_confirmed"], true);
    let id = created["person_id"].as_str().unwrap().to_owned();

    let (status, fetched) = request(
      state.clone(),
      "GET",
      &format!("/api/workers/{id}"),
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["full_name"], "Ana Gomez");

    let mut updated = fetched.clone();
    updated["position"] = json!("Senior Developer");
    let (status, _) = request(
      state.clone(),
      "PUT",
      &format!("/api/workers/{id}"),
      Some(&admin),
      Some(updated),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
      state.clone(),
      "DELETE",
      &format!("/api/workers/{id}"),
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Deleting again is still a 204, and the record is gone.
    let (status, _) = request(
      state.clone(),
      "DELETE",
      &format!("/api/workers/{id}"),
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(
      state,
      "GET",
      &format!("/api/workers/{id}"),
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn empty_search_matches_the_full_list() {
    let state = make_state().await;
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for (name, email) in
      [("Ana Gomez", "ana@x.com"), ("Luis Mora", "luis@x.com")]
    {
      let (status, _) = request(
        state.clone(),
        "POST",
        "/api/workers",
        Some(&admin),
        Some(worker_body(name, email)),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) =
      request(state.clone(), "GET", "/api/workers", Some(&admin), None).await;
    let (_, searched) = request(
      state.clone(),
      "GET",
      "/api/workers?q=&page=1&page_size=10",
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(all["total"], searched["total"]);
    assert_eq!(all["total"], 2);

    let (_, narrowed) = request(
      state,
      "GET",
      "/api/workers?q=ana&page=1&page_size=10",
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(narrowed["total"], 1);
    assert_eq!(narrowed["workers"][0]["email"], "ana@x.com");
  }

  #[tokio::test]
  async fn duplicate_email_is_a_validation_failure_not_a_500() {
    let state = make_state().await;
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _) = request(
      state.clone(),
      "POST",
      "/api/workers",
      Some(&admin),
      Some(worker_body("Ana Gomez", "ana@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
      state,
      "POST",
      "/api/workers",
      Some(&admin),
      Some(worker_body("Ana Clone", "ANA@X.COM")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_array().is_some_and(|d| !d.is_empty()));
  }

  #[tokio::test]
  async fn self_registration_and_self_service() {
    let state = make_state().await;

    let mut body = worker_body("Rosa Diaz", "rosa@x.com");
    body["password"] = json!("S3cret-pass");
    let (status, registered) = request(
      state.clone(),
      "POST",
      "/api/workers/register",
      None,
      Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register: {registered}");

    let token = login(&state, "rosa@x.com", "S3cret-pass").await;
    let (status, me) =
      request(state.clone(), "GET", "/api/workers/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "rosa@x.com");

    // A worker may read their own record but not someone else's.
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, other) = request(
      state.clone(),
      "POST",
      "/api/workers",
      Some(&admin),
      Some(worker_body("Ana Gomez", "ana@x.com")),
    )
    .await;
    let other_id = other["person_id"].as_str().unwrap();
    let (status, _) = request(
      state,
      "GET",
      &format!("/api/workers/{other_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn short_registration_password_is_rejected() {
    let state = make_state().await;
    let mut body = worker_body("Rosa Diaz", "rosa@x.com");
    body["password"] = json!("short");
    let (status, _) =
      request(state, "POST", "/api/workers/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn cv_endpoint_returns_a_pdf() {
    let state = make_state().await;
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, created) = request(
      state.clone(),
      "POST",
      "/api/workers",
      Some(&admin),
      Some(worker_body("Ana Gomez", "ana@x.com")),
    )
    .await;
    assert_eq!(created["email"], "ana@x.com");

    let token = login(&state, "ana@x.com", "Worker@123").await;
    let req = Request::builder()
      .method("GET")
      .uri("/api/workers/me/cv")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers().get(header::CONTENT_TYPE).unwrap(),
      "application/pdf"
    );
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
  }

  #[tokio::test]
  async fn import_rejects_garbage_bytes() {
    let state = make_state().await;
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let req = Request::builder()
      .method("POST")
      .uri("/api/workers/import")
      .header(header::AUTHORIZATION, format!("Bearer {admin}"))
      .body(Body::from("not a workbook"))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Sales ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sales_sum_exactly_and_scope_to_their_worker() {
    let state = make_state().await;
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, worker) = request(
      state.clone(),
      "POST",
      "/api/workers",
      Some(&admin),
      Some(worker_body("Ana Gomez", "ana@x.com")),
    )
    .await;
    let worker_id = worker["person_id"].as_str().unwrap().to_owned();

    for amount in ["100.50", "49.50"] {
      let (status, _) = request(
        state.clone(),
        "POST",
        "/api/sales",
        Some(&admin),
        Some(json!({ "worker_id": worker_id, "amount": amount })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (_, total) = request(
      state.clone(),
      "GET",
      "/api/admins/stats/sales",
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(
      total["total"].as_str().map(str::parse::<Decimal>).unwrap().unwrap(),
      Decimal::new(15000, 2)
    );

    let (_, by_worker) = request(
      state.clone(),
      "GET",
      &format!("/api/sales/worker/{worker_id}"),
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(by_worker.as_array().unwrap().len(), 2);

    let (status, _) = request(
      state,
      "POST",
      "/api/sales",
      Some(&admin),
      Some(json!({
        "worker_id": uuid::Uuid::new_v4(),
        "amount": "10.00"
      })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Stats and AI queries ────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_and_fallback_query() {
    let state = make_state().await;
    let admin = login(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, created) = request(
      state.clone(),
      "POST",
      "/api/workers",
      Some(&admin),
      Some(worker_body("Ana Gomez", "ana@x.com")),
    )
    .await;
    assert_eq!(created["email"], "ana@x.com");

    let (status, stats) =
      request(state.clone(), "GET", "/api/admins/stats", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_workers"], 1);
    assert_eq!(stats["active_workers"], 1);

    // Interpreter unconfigured: the query degrades to the worker total.
    let (status, reply) = request(
      state.clone(),
      "POST",
      "/api/admins/query",
      Some(&admin),
      Some(json!({ "query": "how many employees are on vacation?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["response"], "There are 1 registered workers.");

    let (status, _) = request(
      state,
      "POST",
      "/api/admins/query",
      Some(&admin),
      Some(json!({ "query": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Public surface ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn departments_listing_is_public() {
    let state = make_state().await;
    let (status, body) =
      request(state, "GET", "/api/departments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[0]["id"], 0);
    assert_eq!(entries[6]["name"], "Technology");
  }

  #[tokio::test]
  async fn console_page_is_served_at_the_root() {
    let state = make_state().await;
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(std::str::from_utf8(&bytes).unwrap().contains("Roster"));
  }
}
