//! Conversion helpers between domain types and the plain-text representations
//! stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Taxonomies and roles are
//! stored as their snake_case wire names. Amounts are stored as decimal text
//! so no float drift ever touches money. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use roster_core::{
  Admin, Department, EducationLevel, Identity, Role, Sale, SaleRecord, Worker,
  WorkerStatus,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Taxonomies ──────────────────────────────────────────────────────────────

pub fn encode_status(s: WorkerStatus) -> &'static str {
  match s {
    WorkerStatus::Active => "active",
    WorkerStatus::Inactive => "inactive",
    WorkerStatus::OnVacation => "on_vacation",
  }
}

pub fn decode_status(s: &str) -> Result<WorkerStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown worker status: {s:?}")))
}

pub fn encode_education(e: EducationLevel) -> &'static str {
  match e {
    EducationLevel::Technical => "technical",
    EducationLevel::Technologist => "technologist",
    EducationLevel::Professional => "professional",
    EducationLevel::Masters => "masters",
    EducationLevel::Specialization => "specialization",
  }
}

pub fn decode_education(s: &str) -> Result<EducationLevel> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown education level: {s:?}")))
}

pub fn encode_department(d: Department) -> &'static str {
  match d {
    Department::Marketing => "marketing",
    Department::Operations => "operations",
    Department::HumanResources => "human_resources",
    Department::Logistics => "logistics",
    Department::Sales => "sales",
    Department::Accounting => "accounting",
    Department::Technology => "technology",
  }
}

pub fn decode_department(s: &str) -> Result<Department> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown department: {s:?}")))
}

// ─── Roles ───────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Admin => "admin",
    Role::Worker => "worker",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse().map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_amount(d: Decimal) -> String { d.to_string() }

pub fn decode_amount(s: &str) -> Result<Decimal> {
  s.parse()
    .map_err(|_| Error::Decode(format!("malformed amount: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from a `persons` row. Worker and admin columns are all
/// optional at this level; the `into_*` converters enforce the columns the
/// row's kind requires.
pub struct RawPerson {
  pub person_id:       String,
  pub kind:            String,
  pub username:        String,
  pub email:           String,
  pub email_confirmed: bool,
  pub full_name:       String,
  pub document_id:     String,
  pub address:         String,
  pub phone:           String,
  pub position:        Option<String>,
  pub wage:            Option<i64>,
  pub status:          Option<String>,
  pub education:       Option<String>,
  pub department:      Option<String>,
  pub profile:         Option<String>,
  pub registered_at:   Option<String>,
  pub last_login:      Option<String>,
}

impl RawPerson {
  /// The column list every `persons` SELECT uses, in `RawPerson` field order.
  pub const COLUMNS: &'static str = "person_id, kind, username, email, \
     email_confirmed, full_name, document_id, address, phone, position, wage, \
     status, education, department, profile, registered_at, last_login";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Self::from_row_at(row, 0)
  }

  /// Read the person columns starting at index `base` — used when the row is
  /// a join and other columns come first.
  pub fn from_row_at(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(RawPerson {
      person_id:       row.get(base)?,
      kind:            row.get(base + 1)?,
      username:        row.get(base + 2)?,
      email:           row.get(base + 3)?,
      email_confirmed: row.get(base + 4)?,
      full_name:       row.get(base + 5)?,
      document_id:     row.get(base + 6)?,
      address:         row.get(base + 7)?,
      phone:           row.get(base + 8)?,
      position:        row.get(base + 9)?,
      wage:            row.get(base + 10)?,
      status:          row.get(base + 11)?,
      education:       row.get(base + 12)?,
      department:      row.get(base + 13)?,
      profile:         row.get(base + 14)?,
      registered_at:   row.get(base + 15)?,
      last_login:      row.get(base + 16)?,
    })
  }

  fn into_identity(self) -> Result<(Identity, RawPersonRest)> {
    let identity = Identity {
      person_id:       decode_uuid(&self.person_id)?,
      username:        self.username,
      email:           self.email,
      email_confirmed: self.email_confirmed,
      full_name:       self.full_name,
      document_id:     self.document_id,
      address:         self.address,
      phone:           self.phone,
    };
    let rest = RawPersonRest {
      kind:          self.kind,
      position:      self.position,
      wage:          self.wage,
      status:        self.status,
      education:     self.education,
      department:    self.department,
      profile:       self.profile,
      registered_at: self.registered_at,
      last_login:    self.last_login,
    };
    Ok((identity, rest))
  }

  pub fn into_worker(self) -> Result<Worker> {
    let person_id = self.person_id.clone();
    let (identity, rest) = self.into_identity()?;
    let missing =
      |col: &str| Error::Decode(format!("worker row {person_id} missing {col}"));

    Ok(Worker {
      identity,
      position: rest.position.ok_or_else(|| missing("position"))?,
      wage: rest.wage.ok_or_else(|| missing("wage"))?,
      status: decode_status(&rest.status.ok_or_else(|| missing("status"))?)?,
      education: decode_education(
        &rest.education.ok_or_else(|| missing("education"))?,
      )?,
      department: decode_department(
        &rest.department.ok_or_else(|| missing("department"))?,
      )?,
      profile: rest.profile.unwrap_or_default(),
      registered_at: decode_dt(
        &rest.registered_at.ok_or_else(|| missing("registered_at"))?,
      )?,
    })
  }

  pub fn into_admin(self) -> Result<Admin> {
    let (identity, rest) = self.into_identity()?;
    let last_login = rest.last_login.as_deref().map(decode_dt).transpose()?;
    Ok(Admin { identity, last_login })
  }

  pub fn into_person(self) -> Result<roster_core::Person> {
    match self.kind.as_str() {
      "worker" => Ok(roster_core::Person::Worker(self.into_worker()?)),
      "admin" => Ok(roster_core::Person::Admin(self.into_admin()?)),
      other => Err(Error::Decode(format!("unknown person kind: {other:?}"))),
    }
  }
}

struct RawPersonRest {
  kind:          String,
  position:      Option<String>,
  wage:          Option<i64>,
  status:        Option<String>,
  education:     Option<String>,
  department:    Option<String>,
  profile:       Option<String>,
  registered_at: Option<String>,
  last_login:    Option<String>,
}

/// Raw strings read from a `sales` row joined with its worker.
pub struct RawSale {
  pub sale_id:   i64,
  pub sale_date: String,
  pub amount:    String,
  pub worker_id: String,
}

impl RawSale {
  pub fn into_sale(self) -> Result<Sale> {
    Ok(Sale {
      sale_id:   self.sale_id,
      sale_date: decode_dt(&self.sale_date)?,
      amount:    decode_amount(&self.amount)?,
      worker_id: decode_uuid(&self.worker_id)?,
    })
  }
}

/// A sale row plus the joined worker row, decoded together.
pub struct RawSaleRecord {
  pub sale:   RawSale,
  pub worker: RawPerson,
}

impl RawSaleRecord {
  pub fn into_record(self) -> Result<SaleRecord> {
    Ok(SaleRecord {
      sale:   self.sale.into_sale()?,
      worker: self.worker.into_worker()?,
    })
  }
}
