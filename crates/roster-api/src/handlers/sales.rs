//! Handlers for `/api/sales` endpoints. All admin-gated.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  sale::{NewSale, Sale, SaleRecord},
  store::DirectoryStore,
};
use uuid::Uuid;

use crate::{AppState, auth::AdminUser, error::ApiError};

/// `GET /api/sales` — all sales with their workers, newest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<Json<Vec<SaleRecord>>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let records = state.store.sales().await.map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /api/sales/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<i64>,
) -> Result<Json<SaleRecord>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let record = state
    .store
    .sale(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("sale {id} not found")))?;
  Ok(Json(record))
}

/// `GET /api/sales/worker/{worker_id}`
pub async fn by_worker<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(worker_id): Path<Uuid>,
) -> Result<Json<Vec<SaleRecord>>, ApiError>
where
  S: DirectoryStore + 'static,
{
  let records = state
    .store
    .sales_by_worker(worker_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `POST /api/sales` — the date defaults to now when omitted.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Json(body): Json<NewSale>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore + 'static,
{
  let worker_id = body.worker_id;
  let sale = state
    .store
    .create_sale(body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("worker {worker_id} not found"))
    })?;
  Ok((StatusCode::CREATED, Json(sale)))
}

/// `PUT /api/sales/{id}` — the body id must match the path; 404 when absent.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<i64>,
  Json(body): Json<Sale>,
) -> Result<Json<Sale>, ApiError>
where
  S: DirectoryStore + 'static,
{
  if body.sale_id != id {
    return Err(ApiError::BadRequest(
      "body id does not match path id".to_owned(),
    ));
  }

  let changed = state.store.update_sale(&body).await.map_err(ApiError::store)?;
  if !changed {
    return Err(ApiError::NotFound(format!("sale {id} not found")));
  }
  Ok(Json(body))
}

/// `DELETE /api/sales/{id}` — 204 even when the id was absent.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore + 'static,
{
  state.store.delete_sale(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
