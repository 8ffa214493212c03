//! Startup seeding: make sure the bootstrap admin exists.

use roster_core::{
  person::Role,
  store::{DirectoryStore, NewAdmin, Provisioned},
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
  pub admin_email:    String,
  pub admin_password: String,
  pub admin_name:     String,
}

/// Create the configured bootstrap admin unless an identity with that email
/// already exists. Idempotent across restarts.
pub async fn ensure_admin<S: DirectoryStore>(
  store: &S,
  seed: &SeedConfig,
  password_hash: String,
) -> Result<(), S::Error> {
  if seed.admin_email.is_empty() {
    warn!("no seed admin configured");
    return Ok(());
  }

  if store.email_exists(&seed.admin_email).await? {
    return Ok(());
  }

  let outcome = store
    .create_admin(
      NewAdmin {
        username:        seed.admin_email.clone(),
        email:           seed.admin_email.clone(),
        email_confirmed: true,
        full_name:       seed.admin_name.clone(),
        document_id:     String::new(),
        address:         String::new(),
        phone:           String::new(),
      },
      password_hash,
    )
    .await?;

  match outcome {
    Provisioned::Created(admin) => {
      store
        .assign_role(admin.identity.person_id, Role::Admin)
        .await?;
      info!(email = %seed.admin_email, "seed admin created");
    }
    Provisioned::Rejected(details) => {
      // Lost a race with another instance; the admin exists either way.
      warn!(?details, "seed admin creation rejected");
    }
  }
  Ok(())
}
