//! People: the shared identity envelope and the two account kinds.
//!
//! The original system modelled Admin and Worker as subclasses of an identity
//! base type. Here the split is explicit data: both kinds embed an
//! [`Identity`], the union is the tagged [`Person`] variant, and authorization
//! roles are stored per person rather than implied by the type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::taxonomy::{Department, EducationLevel, WorkerStatus};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The login-capable identity fields shared by every account kind.
///
/// Email is the durable contact and login identifier. Password hashes never
/// appear here; stores keep them internally and expose them only through
/// [`Credential`](crate::store::Credential) on the login path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
  pub person_id:       Uuid,
  pub username:        String,
  pub email:           String,
  pub email_confirmed: bool,
  pub full_name:       String,
  pub document_id:     String,
  pub address:         String,
  pub phone:           String,
}

// ─── Account kinds ───────────────────────────────────────────────────────────

/// A worker: the directory's main record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
  #[serde(flatten)]
  pub identity:      Identity,
  pub position:      String,
  pub wage:          i64,
  pub status:        WorkerStatus,
  pub education:     EducationLevel,
  pub department:    Department,
  pub profile:       String,
  pub registered_at: DateTime<Utc>,
}

/// An administrator. No business fields beyond the identity; the last-login
/// timestamp is touched by the authentication gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
  #[serde(flatten)]
  pub identity:   Identity,
  pub last_login: Option<DateTime<Utc>>,
}

/// Any account, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Person {
  Admin(Admin),
  Worker(Worker),
}

impl Person {
  pub fn identity(&self) -> &Identity {
    match self {
      Person::Admin(a) => &a.identity,
      Person::Worker(w) => &w.identity,
    }
  }

  pub fn person_id(&self) -> Uuid { self.identity().person_id }

  pub fn as_worker(&self) -> Option<&Worker> {
    match self {
      Person::Worker(w) => Some(w),
      Person::Admin(_) => None,
    }
  }
}

// ─── Roles ───────────────────────────────────────────────────────────────────

/// A named permission group attached to an identity.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Admin,
  Worker,
}
