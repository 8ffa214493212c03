//! Password verification, JWT issuance, and the request extractors that gate
//! handlers by role.
//!
//! Tokens travel either as `Authorization: Bearer <jwt>` or in the
//! `roster_session` cookie; the extractors accept both.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::http::{HeaderMap, header, request::Parts};
use axum::extract::FromRequestParts;
use chrono::{Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use rand_core::OsRng;
use roster_core::{person::Role, store::{Credential, DirectoryStore}};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Cookie the login handler sets alongside the JSON token response.
pub const SESSION_COOKIE: &str = "roster_session";

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

/// Verify a password against a stored PHC string. Any parse or verification
/// failure is simply "no".
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub:   Uuid,
  pub email: String,
  /// Fresh per token.
  pub jti:   Uuid,
  pub roles: Vec<Role>,
  pub iat:   i64,
  pub exp:   i64,
  pub iss:   String,
  pub aud:   String,
}

/// HS256 signing and verification keys, built once at startup.
pub struct TokenKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
  issuer:     String,
  audience:   String,
}

impl TokenKeys {
  pub fn new(secret: &str, ttl_hours: i64, issuer: &str, audience: &str) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);

    TokenKeys {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      ttl: Duration::hours(ttl_hours),
      issuer: issuer.to_owned(),
      audience: audience.to_owned(),
    }
  }

  pub fn ttl_seconds(&self) -> i64 { self.ttl.num_seconds() }

  /// Issue a signed token for a verified credential.
  pub fn issue(
    &self,
    credential: &Credential,
  ) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
      sub:   credential.person_id,
      email: credential.email.clone(),
      jti:   Uuid::new_v4(),
      roles: credential.roles.clone(),
      iat:   now.timestamp(),
      exp:   (now + self.ttl).timestamp(),
      iss:   self.issuer.clone(),
      aud:   self.audience.clone(),
    };
    encode(&Header::default(), &claims, &self.encoding)
  }

  /// Verify a token's signature, expiry, issuer, and audience.
  pub fn verify(&self, token: &str) -> Option<Claims> {
    decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .ok()
  }
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Any authenticated principal.
#[derive(Debug, Clone)]
pub struct AuthUser {
  pub person_id: Uuid,
  pub email:     String,
  pub roles:     Vec<Role>,
}

impl AuthUser {
  pub fn is_admin(&self) -> bool { self.roles.contains(&Role::Admin) }
}

/// An authenticated principal holding the Admin role. Rejection is 403, not
/// 401, when a valid token lacks the role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

/// Pull the token out of the Authorization header or the session cookie.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
  if let Some(bearer) = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
  {
    return Some(bearer.to_owned());
  }

  let prefix = format!("{SESSION_COOKIE}=");
  headers
    .get(header::COOKIE)
    .and_then(|v| v.to_str().ok())?
    .split(';')
    .map(str::trim)
    .find_map(|pair| pair.strip_prefix(prefix.as_str()))
    .map(str::to_owned)
}

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: DirectoryStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token =
      token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let claims = state
      .tokens
      .verify(&token)
      .ok_or(ApiError::Unauthorized)?;

    Ok(AuthUser {
      person_id: claims.sub,
      email:     claims.email,
      roles:     claims.roles,
    })
  }
}

impl<S> FromRequestParts<AppState<S>> for AdminUser
where
  S: DirectoryStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.is_admin() {
      return Err(ApiError::Forbidden);
    }
    Ok(AdminUser(user))
  }
}
