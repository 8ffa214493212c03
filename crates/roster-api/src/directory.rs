//! The worker directory service: creation defaults, identity provisioning,
//! and the per-row bulk-import reconciliation.

use chrono::{DateTime, Utc};
use roster_core::{
  person::{Role, Worker},
  store::{DirectoryStore, NewWorker, Provisioned},
  taxonomy::{Department, EducationLevel, WorkerStatus},
};
use roster_import::SheetRow;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

// ─── Creation requests ───────────────────────────────────────────────────────

/// A worker creation request as it arrives over the wire. Optional fields get
/// directory defaults: the username derives from the email, the registration
/// timestamp from the clock, and the email is auto-confirmed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorker {
  pub full_name:     String,
  pub email:         String,
  #[serde(default)]
  pub username:      Option<String>,
  #[serde(default)]
  pub document_id:   String,
  #[serde(default)]
  pub address:       String,
  #[serde(default)]
  pub phone:         String,
  #[serde(default)]
  pub position:      String,
  #[serde(default)]
  pub wage:          i64,
  #[serde(default)]
  pub status:        WorkerStatus,
  #[serde(default)]
  pub education:     EducationLevel,
  #[serde(default)]
  pub department:    Department,
  #[serde(default)]
  pub profile:       String,
  #[serde(default)]
  pub registered_at: Option<DateTime<Utc>>,
}

impl CreateWorker {
  fn resolve(self) -> NewWorker {
    let username = self
      .username
      .filter(|u| !u.trim().is_empty())
      .unwrap_or_else(|| self.email.clone());

    NewWorker {
      username,
      email: self.email,
      email_confirmed: true,
      full_name: self.full_name,
      document_id: self.document_id,
      address: self.address,
      phone: self.phone,
      position: self.position,
      wage: self.wage,
      status: self.status,
      education: self.education,
      department: self.department,
      profile: self.profile,
      registered_at: self.registered_at.unwrap_or_else(Utc::now),
    }
  }
}

/// Provision a worker identity and attach the Worker role. A role-assignment
/// failure is logged and swallowed — the account exists either way.
pub async fn create_worker<S: DirectoryStore>(
  store: &S,
  request: CreateWorker,
  password_hash: String,
) -> Result<Provisioned<Worker>, S::Error> {
  let outcome = store.create_worker(request.resolve(), password_hash).await?;

  if let Provisioned::Created(worker) = &outcome
    && let Err(e) = store
      .assign_role(worker.identity.person_id, Role::Worker)
      .await
  {
    warn!(
      person_id = %worker.identity.person_id,
      error = %e,
      "worker created but role assignment failed"
    );
  }
  Ok(outcome)
}

// ─── Bulk import ─────────────────────────────────────────────────────────────

/// What became of a single spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
  Created { person_id: Uuid },
  Skipped { reason: String },
  Failed { reason: String },
}

/// Per-row outcomes plus the three counters the original surfaced in logs.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
  pub created: u32,
  pub failed:  u32,
  pub skipped: u32,
  pub rows:    Vec<ReportRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
  /// 1-based worksheet row number.
  pub row:     u32,
  #[serde(flatten)]
  pub outcome: RowOutcome,
}

/// Parse a workbook and reconcile every row against the directory.
///
/// Returns `Err` only when the workbook itself is unreadable; from there on,
/// nothing aborts the batch. Every row is decided independently.
pub async fn import_workbook<S: DirectoryStore>(
  store: &S,
  bytes: &[u8],
  password_hash: &str,
) -> Result<ImportReport, roster_import::Error> {
  let rows = roster_import::parse_workbook(bytes)?;
  Ok(reconcile(store, rows, password_hash).await)
}

/// The reconciliation loop: skip/create decisions per row, counters on top.
async fn reconcile<S: DirectoryStore>(
  store: &S,
  rows: Vec<SheetRow>,
  password_hash: &str,
) -> ImportReport {
  let mut report = ImportReport {
    created: 0,
    failed:  0,
    skipped: 0,
    rows:    Vec::with_capacity(rows.len()),
  };

  for sheet_row in rows {
    let row = sheet_row.row;
    for note in &sheet_row.notes {
      warn!(row, note, "import cell substitution");
    }

    let outcome = reconcile_row(store, sheet_row, password_hash).await;
    match &outcome {
      RowOutcome::Created { .. } => report.created += 1,
      RowOutcome::Skipped { reason } => {
        report.skipped += 1;
        warn!(row, reason, "import row skipped");
      }
      RowOutcome::Failed { reason } => {
        report.failed += 1;
        warn!(row, reason, "import row failed");
      }
    }
    report.rows.push(ReportRow { row, outcome });
  }

  tracing::info!(
    created = report.created,
    failed = report.failed,
    skipped = report.skipped,
    "import finished"
  );
  report
}

async fn reconcile_row<S: DirectoryStore>(
  store: &S,
  row: SheetRow,
  password_hash: &str,
) -> RowOutcome {
  let full_name = row.full_name();
  let email = row.email.trim().to_owned();

  if full_name.is_empty() && email.is_empty() {
    return RowOutcome::Skipped { reason: "no name and no email".to_owned() };
  }
  if email.is_empty() {
    return RowOutcome::Skipped { reason: "missing email".to_owned() };
  }

  // Pre-check classifies duplicates as skipped; the schema's UNIQUE email
  // still backstops concurrent imports, surfacing as a failed row instead.
  match store.email_exists(&email).await {
    Ok(true) => {
      return RowOutcome::Skipped {
        reason: format!("email {email} already registered"),
      };
    }
    Ok(false) => {}
    Err(e) => {
      return RowOutcome::Failed { reason: format!("duplicate check: {e}") };
    }
  }

  let request = CreateWorker {
    full_name,
    email,
    username: None,
    document_id: row.document_id,
    address: row.address,
    phone: row.phone,
    position: row.position,
    wage: row.wage,
    status: row.status,
    education: row.education,
    department: row.department,
    profile: row.profile,
    registered_at: None,
  };

  match create_worker(store, request, password_hash.to_owned()).await {
    Ok(Provisioned::Created(worker)) => {
      RowOutcome::Created { person_id: worker.identity.person_id }
    }
    Ok(Provisioned::Rejected(descriptions)) => {
      RowOutcome::Failed { reason: descriptions.join("; ") }
    }
    Err(e) => RowOutcome::Failed { reason: e.to_string() },
  }
}
