//! The `DirectoryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
  person::{Admin, Person, Role, Worker},
  sale::{NewSale, Sale, SaleRecord},
  taxonomy::{Department, EducationLevel, WorkerStatus},
};

// ─── Provisioning outcome ────────────────────────────────────────────────────

/// The outcome of an identity-provisioning write.
///
/// Identity providers report constraint violations (duplicate email, duplicate
/// username) as descriptions, not faults. `Rejected` carries those
/// descriptions; the `Err` channel of the surrounding `Result` is reserved for
/// infrastructure failures.
#[derive(Debug, Clone, PartialEq)]
pub enum Provisioned<T> {
  Created(T),
  Rejected(Vec<String>),
}

impl<T> Provisioned<T> {
  pub fn created(self) -> Option<T> {
    match self {
      Provisioned::Created(v) => Some(v),
      Provisioned::Rejected(_) => None,
    }
  }
}

// ─── Creation inputs ─────────────────────────────────────────────────────────

/// A fully resolved worker creation request. Callers (the directory service)
/// resolve defaults before this reaches a store: the username is already
/// derived, the registration timestamp already stamped, the confirmation
/// flag already decided.
#[derive(Debug, Clone)]
pub struct NewWorker {
  pub username:        String,
  pub email:           String,
  pub email_confirmed: bool,
  pub full_name:       String,
  pub document_id:     String,
  pub address:         String,
  pub phone:           String,
  pub position:        String,
  pub wage:            i64,
  pub status:          WorkerStatus,
  pub education:       EducationLevel,
  pub department:      Department,
  pub profile:         String,
  pub registered_at:   DateTime<Utc>,
}

/// A fully resolved admin creation request.
#[derive(Debug, Clone)]
pub struct NewAdmin {
  pub username:        String,
  pub email:           String,
  pub email_confirmed: bool,
  pub full_name:       String,
  pub document_id:     String,
  pub address:         String,
  pub phone:           String,
}

// ─── Login credential ────────────────────────────────────────────────────────

/// The slice of an identity the login path needs. This is the only place a
/// password hash crosses the store boundary.
#[derive(Debug, Clone)]
pub struct Credential {
  pub person_id:     Uuid,
  pub email:         String,
  pub password_hash: String,
  pub roles:         Vec<Role>,
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Parameters for [`DirectoryStore::search_workers`]. Pages are 1-based;
/// offset = (page - 1) × page_size.
#[derive(Debug, Clone)]
pub struct WorkerQuery {
  /// Case-insensitive substring matched against full name OR email.
  /// Empty or whitespace-only text matches everything.
  pub text:      Option<String>,
  pub page:      u32,
  pub page_size: u32,
}

impl Default for WorkerQuery {
  fn default() -> Self { WorkerQuery { text: None, page: 1, page_size: 10 } }
}

/// One page of search results plus the total matching count.
#[derive(Debug, Clone)]
pub struct WorkerPage {
  pub workers: Vec<Worker>,
  pub total:   u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Roster directory backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Workers ───────────────────────────────────────────────────────────

  /// Provision a worker identity with the given password hash and store the
  /// worker record. Duplicate email/username surface as
  /// [`Provisioned::Rejected`], not as errors.
  fn create_worker(
    &self,
    input: NewWorker,
    password_hash: String,
  ) -> impl Future<Output = Result<Provisioned<Worker>, Self::Error>> + Send + '_;

  /// Retrieve a worker by id. Returns `None` if absent or not a worker.
  fn worker(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Worker>, Self::Error>> + Send + '_;

  /// Persist field changes to an existing worker. Constraint violations
  /// (e.g. the new email is taken) surface as `Rejected`; an absent worker
  /// is `Rejected` with a description as well, since the identity update
  /// pathway reports it the same way.
  fn update_worker(
    &self,
    worker: &Worker,
  ) -> impl Future<Output = Result<Provisioned<()>, Self::Error>> + Send + '_;

  /// Remove an identity record (worker or admin), cascading to sales and
  /// roles. Returns `false` when the id was absent — a no-op, not an error.
  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All workers, unfiltered, ordered by full name.
  fn list_workers(
    &self,
  ) -> impl Future<Output = Result<Vec<Worker>, Self::Error>> + Send + '_;

  /// Paginated substring search over full name OR email.
  fn search_workers<'a>(
    &'a self,
    query: &'a WorkerQuery,
  ) -> impl Future<Output = Result<WorkerPage, Self::Error>> + Send + 'a;

  // ── Counts ────────────────────────────────────────────────────────────

  fn count_workers(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_by_status(
    &self,
    status: WorkerStatus,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_by_department(
    &self,
    department: Department,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_by_education(
    &self,
    education: EducationLevel,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Count of workers whose position contains `fragment`, case-insensitive.
  fn count_by_position<'a>(
    &'a self,
    fragment: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  // ── Admins ────────────────────────────────────────────────────────────

  /// Provision an admin identity. Same rejection semantics as
  /// [`DirectoryStore::create_worker`].
  fn create_admin(
    &self,
    input: NewAdmin,
    password_hash: String,
  ) -> impl Future<Output = Result<Provisioned<Admin>, Self::Error>> + Send + '_;

  /// Retrieve an admin by id. Returns `None` if absent or not an admin.
  fn admin(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + '_;

  /// Record a successful admin login.
  fn touch_admin_login(
    &self,
    id: Uuid,
    when: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Sales ─────────────────────────────────────────────────────────────

  /// Persist a sale. Returns `None` when the referenced worker does not
  /// exist (or is not a worker).
  fn create_sale(
    &self,
    input: NewSale,
  ) -> impl Future<Output = Result<Option<Sale>, Self::Error>> + Send + '_;

  /// One sale with its worker. `None` if absent.
  fn sale(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<SaleRecord>, Self::Error>> + Send + '_;

  /// All sales with their workers, newest first.
  fn sales(
    &self,
  ) -> impl Future<Output = Result<Vec<SaleRecord>, Self::Error>> + Send + '_;

  /// All sales for one worker, newest first.
  fn sales_by_worker(
    &self,
    worker_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SaleRecord>, Self::Error>> + Send + '_;

  /// Persist field changes to a sale. Returns `false` when the id is absent.
  fn update_sale(
    &self,
    sale: &Sale,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a sale. Returns `false` when the id was absent — a no-op.
  fn delete_sale(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Exact decimal sum of all sale amounts; zero when there are none.
  fn total_sales_amount(
    &self,
  ) -> impl Future<Output = Result<Decimal, Self::Error>> + Send + '_;

  // ── Identity ──────────────────────────────────────────────────────────

  /// Look up the login credential for an email, case-insensitively.
  fn find_credential_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + 'a;

  /// Whether any identity already uses this email, case-insensitively.
  fn email_exists<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Attach a role to an identity. Idempotent.
  fn assign_role(
    &self,
    person_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All roles attached to an identity.
  fn roles(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  /// Retrieve any person by id, tagged by kind.
  fn person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;
}
