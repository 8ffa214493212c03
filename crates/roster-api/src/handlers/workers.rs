//! Handlers for `/api/workers` endpoints.
//!
//! | Method   | Path                    | Auth          |
//! |----------|-------------------------|---------------|
//! | `GET`    | `/workers`              | any           |
//! | `POST`   | `/workers`              | admin         |
//! | `POST`   | `/workers/register`     | public        |
//! | `POST`   | `/workers/import`       | admin         |
//! | `GET`    | `/workers/me`           | any           |
//! | `GET`    | `/workers/me/cv`        | any           |
//! | `GET`    | `/workers/{id}`         | self or admin |
//! | `PUT`    | `/workers/{id}`         | self or admin |
//! | `DELETE` | `/workers/{id}`         | admin         |

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use roster_core::{
  person::Worker,
  store::{DirectoryStore, Provisioned, WorkerQuery},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminUser, AuthUser, hash_password},
  directory::{self, CreateWorker},
  error::ApiError,
};

// ─── List / search ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub q:         Option<String>,
  pub page:      Option<u32>,
  pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct WorkerListResponse {
  pub workers: Vec<Worker>,
  pub total:   u64,
}

/// `GET /api/workers[?q=&page=&page_size=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: AuthUser,
  Query(params): Query<ListParams>,
) -> Result<Json<WorkerListResponse>, ApiError>
where
  S: DirectoryStore + 'static,
{
  if params.q.is_none() && params.page.is_none() && params.page_size.is_none() {
    let workers = state.store.list_workers().await.map_err(ApiError::store)?;
    let total = workers.len() as u64;
    return Ok(Json(WorkerListResponse { workers, total }));
  }

  let query = WorkerQuery {
    text:      params.q,
    page:      params.page.unwrap_or(1).max(1),
    page_size: params.page_size.unwrap_or(10).clamp(1, 200),
  };
  let page = state
    .store
    .search_workers(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(WorkerListResponse { workers: page.workers, total: page.total }))
}

// ─── Create / register ───────────────────────────────────────────────────────

/// `POST /api/workers` — admin creation with the fixed default credential.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Json(body): Json<CreateWorker>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore + 'static,
{
  if body.email.trim().is_empty() {
    return Err(ApiError::BadRequest("email must not be empty".to_owned()));
  }

  let outcome = directory::create_worker(
    &*state.store,
    body,
    state.default_password_hash.as_ref().clone(),
  )
  .await
  .map_err(ApiError::store)?;

  match outcome {
    Provisioned::Created(worker) => Ok((StatusCode::CREATED, Json(worker))),
    Provisioned::Rejected(details) => Err(ApiError::Validation(details)),
  }
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  #[serde(flatten)]
  pub worker:   CreateWorker,
  pub password: String,
}

/// `POST /api/workers/register` — public self-registration with a chosen
/// password; sends the welcome email.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore + 'static,
{
  if body.worker.email.trim().is_empty() {
    return Err(ApiError::BadRequest("email must not be empty".to_owned()));
  }
  if body.password.len() < 8 {
    return Err(ApiError::BadRequest(
      "password must be at least 8 characters".to_owned(),
    ));
  }

  let hash = hash_password(&body.password)
    .map_err(|e| ApiError::Store(format!("password hashing: {e}").into()))?;

  let outcome = directory::create_worker(&*state.store, body.worker, hash)
    .await
    .map_err(ApiError::store)?;

  let worker = match outcome {
    Provisioned::Created(worker) => worker,
    Provisioned::Rejected(details) => return Err(ApiError::Validation(details)),
  };

  // The account already exists at this point; a configured-but-broken SMTP
  // relay turns the response into a 502, matching the original's re-raise.
  state
    .mailer
    .send_welcome(&worker.identity.full_name, &worker.identity.email)
    .await
    .map_err(|e| ApiError::Mail(e.to_string()))?;

  Ok((StatusCode::CREATED, Json(worker)))
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// `POST /api/workers/import` — raw `.xlsx` bytes in the body.
pub async fn import<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  body: Bytes,
) -> Result<Json<directory::ImportReport>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let report = directory::import_workbook(
    &*state.store,
    &body,
    &state.default_password_hash,
  )
  .await
  .map_err(|e| ApiError::BadRequest(format!("unreadable workbook: {e}")))?;
  Ok(Json(report))
}

// ─── Self-service ────────────────────────────────────────────────────────────

/// `GET /api/workers/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
) -> Result<Json<Worker>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let worker = state
    .store
    .worker(auth.person_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound("no worker record for this account".to_owned())
    })?;
  Ok(Json(worker))
}

/// `GET /api/workers/me/cv` — the caller's CV as `application/pdf`.
pub async fn my_cv<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore + 'static,
{
  let worker = state
    .store
    .worker(auth.person_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound("no worker record for this account".to_owned())
    })?;

  let bytes = roster_pdf::render_cv(&worker).map_err(ApiError::store)?;
  Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes))
}

// ─── Single-record CRUD ──────────────────────────────────────────────────────

fn require_self_or_admin(auth: &AuthUser, id: Uuid) -> Result<(), ApiError> {
  if auth.is_admin() || auth.person_id == id {
    Ok(())
  } else {
    Err(ApiError::Forbidden)
  }
}

/// `GET /api/workers/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Worker>, ApiError>
where
  S: DirectoryStore + 'static,
{
  require_self_or_admin(&auth, id)?;
  let worker = state
    .store
    .worker(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("worker {id} not found")))?;
  Ok(Json(worker))
}

/// `PUT /api/workers/{id}` — full-record update; the body id must match the
/// path.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
  Path(id): Path<Uuid>,
  Json(body): Json<Worker>,
) -> Result<Json<Worker>, ApiError>
where
  S: DirectoryStore + 'static,
{
  require_self_or_admin(&auth, id)?;
  if body.identity.person_id != id {
    return Err(ApiError::BadRequest(
      "body id does not match path id".to_owned(),
    ));
  }

  // Distinguish an absent worker (404) from a constraint violation (400).
  state
    .store
    .worker(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("worker {id} not found")))?;

  match state.store.update_worker(&body).await.map_err(ApiError::store)? {
    Provisioned::Created(()) => Ok(Json(body)),
    Provisioned::Rejected(details) => Err(ApiError::Validation(details)),
  }
}

/// `DELETE /api/workers/{id}` — 204 even when the id was absent.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore + 'static,
{
  state.store.delete_person(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
