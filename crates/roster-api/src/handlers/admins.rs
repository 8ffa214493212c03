//! Handlers for `/api/admins` endpoints: admin lookup, statistics, and the
//! natural-language query box. All admin-gated.

use axum::{
  Json,
  extract::{Path, State},
};
use roster_core::{person::Admin, store::DirectoryStore};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, auth::AdminUser, error::ApiError, insights};

/// `GET /api/admins/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Admin>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let admin = state
    .store
    .admin(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("admin {id} not found")))?;
  Ok(Json(admin))
}

/// `GET /api/admins/stats` — the dashboard aggregates.
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<Json<insights::Dashboard>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let dashboard =
    insights::dashboard(&*state.store).await.map_err(ApiError::store)?;
  Ok(Json(dashboard))
}

/// `GET /api/admins/stats/workers`
pub async fn worker_count<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<Json<Value>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let count = state.store.count_workers().await.map_err(ApiError::store)?;
  Ok(Json(json!({ "count": count })))
}

/// `GET /api/admins/stats/sales`
pub async fn sales_total<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<Json<Value>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let total =
    state.store.total_sales_amount().await.map_err(ApiError::store)?;
  Ok(Json(json!({ "total": total })))
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
  pub query: String,
}

/// `POST /api/admins/query` — free-text statistics question. Interpretation
/// and dispatch never fail; only an empty question is a client error.
pub async fn query<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Json(body): Json<QueryBody>,
) -> Result<Json<Value>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let question = body.query.trim();
  if question.is_empty() {
    return Err(ApiError::BadRequest("query must not be empty".to_owned()));
  }

  let response =
    insights::answer(&*state.store, &state.interpreter, question).await;
  Ok(Json(json!({ "response": response })))
}
