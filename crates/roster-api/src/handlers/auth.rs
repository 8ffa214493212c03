//! `POST /api/auth/login`.

use axum::{
  Json,
  extract::State,
  http::header,
  response::IntoResponse,
};
use chrono::Utc;
use roster_core::{person::Role, store::DirectoryStore};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  auth::{SESSION_COOKIE, verify_password},
  error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// Verify credentials and issue a bearer token, also delivered as an
/// `HttpOnly` session cookie. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore + 'static,
{
  let credential = state
    .store
    .find_credential_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  if !verify_password(&body.password, &credential.password_hash) {
    return Err(ApiError::Unauthorized);
  }

  if credential.roles.contains(&Role::Admin) {
    state
      .store
      .touch_admin_login(credential.person_id, Utc::now())
      .await
      .map_err(ApiError::store)?;
  }

  let token = state
    .tokens
    .issue(&credential)
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let cookie = format!(
    "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
    state.tokens.ttl_seconds()
  );

  Ok((
    [(header::SET_COOKIE, cookie)],
    Json(json!({ "token": token })),
  ))
}
