//! The [`SqliteStore`] and its [`DirectoryStore`] implementation.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use rust_decimal::Decimal;
use uuid::Uuid;

use roster_core::{
  person::{Admin, Identity, Person, Role, Worker},
  sale::{NewSale, Sale, SaleRecord},
  store::{
    Credential, DirectoryStore, NewAdmin, NewWorker, Provisioned, WorkerPage,
    WorkerQuery,
  },
  taxonomy::{Department, EducationLevel, WorkerStatus},
};

use crate::{
  encode::{
    RawPerson, RawSale, RawSaleRecord, decode_amount, decode_role,
    encode_amount, encode_department, encode_dt, encode_education, encode_role,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster directory backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_person_where(
    &self,
    condition: &'static str,
    id: Uuid,
  ) -> Result<Option<RawPerson>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {} FROM persons WHERE {condition}",
      RawPerson::COLUMNS
    );

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawPerson::from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  async fn count_where(
    &self,
    condition: &'static str,
    param: Option<String>,
  ) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM persons WHERE {condition}");

    let n: i64 = self
      .conn
      .call(move |conn| {
        let n = match param {
          Some(p) => conn.query_row(&sql, rusqlite::params![p], |r| r.get(0))?,
          None => conn.query_row(&sql, [], |r| r.get(0))?,
        };
        Ok(n)
      })
      .await?;
    Ok(n as u64)
  }

  async fn fetch_sale_records<P>(
    &self,
    condition: &'static str,
    param: Option<P>,
  ) -> Result<Vec<SaleRecord>>
  where
    P: rusqlite::ToSql + Send + 'static,
  {
    let sql = format!(
      "SELECT s.sale_id, s.sale_date, s.amount, s.worker_id, {}
       FROM sales s
       JOIN persons p ON p.person_id = s.worker_id
       {condition}
       ORDER BY s.sale_date DESC, s.sale_id DESC",
      RawPerson::COLUMNS
    );

    let raws: Vec<RawSaleRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(RawSaleRecord {
            sale:   RawSale {
              sale_id:   row.get(0)?,
              sale_date: row.get(1)?,
              amount:    row.get(2)?,
              worker_id: row.get(3)?,
            },
            worker: RawPerson::from_row_at(row, 4)?,
          })
        };
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSaleRecord::into_record).collect()
  }
}

/// Classify a UNIQUE violation on the persons table into provisioning
/// rejection descriptions. Anything else stays a fault.
fn constraint_rejection(e: &tokio_rusqlite::Error) -> Option<Vec<String>> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    code,
    Some(message),
  )) = e
  else {
    return None;
  };
  if code.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }

  let desc = if message.contains("persons.email") {
    "email is already taken".to_owned()
  } else if message.contains("persons.username") {
    "username is already taken".to_owned()
  } else {
    message.clone()
  };
  Some(vec![desc])
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Workers ─────────────────────────────────────────────────────────────

  async fn create_worker(
    &self,
    input: NewWorker,
    password_hash: String,
  ) -> Result<Provisioned<Worker>> {
    let worker = Worker {
      identity:      Identity {
        person_id:       Uuid::new_v4(),
        username:        input.username,
        email:           input.email,
        email_confirmed: input.email_confirmed,
        full_name:       input.full_name,
        document_id:     input.document_id,
        address:         input.address,
        phone:           input.phone,
      },
      position:      input.position,
      wage:          input.wage,
      status:        input.status,
      education:     input.education,
      department:    input.department,
      profile:       input.profile,
      registered_at: input.registered_at,
    };

    let id_str         = encode_uuid(worker.identity.person_id);
    let username       = worker.identity.username.clone();
    let email          = worker.identity.email.clone();
    let confirmed      = worker.identity.email_confirmed;
    let full_name      = worker.identity.full_name.clone();
    let document_id    = worker.identity.document_id.clone();
    let address        = worker.identity.address.clone();
    let phone          = worker.identity.phone.clone();
    let position       = worker.position.clone();
    let wage           = worker.wage;
    let status_str     = encode_status(worker.status).to_owned();
    let education_str  = encode_education(worker.education).to_owned();
    let department_str = encode_department(worker.department).to_owned();
    let profile        = worker.profile.clone();
    let registered_str = encode_dt(worker.registered_at);

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             person_id, kind, username, email, email_confirmed, password_hash,
             full_name, document_id, address, phone,
             position, wage, status, education, department, profile,
             registered_at
           ) VALUES (?1, 'worker', ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                     ?12, ?13, ?14, ?15, ?16)",
          rusqlite::params![
            id_str,
            username,
            email,
            confirmed,
            password_hash,
            full_name,
            document_id,
            address,
            phone,
            position,
            wage,
            status_str,
            education_str,
            department_str,
            profile,
            registered_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(Provisioned::Created(worker)),
      Err(e) => match constraint_rejection(&e) {
        Some(descriptions) => Ok(Provisioned::Rejected(descriptions)),
        None => Err(e.into()),
      },
    }
  }

  async fn worker(&self, id: Uuid) -> Result<Option<Worker>> {
    let raw = self
      .fetch_person_where("person_id = ?1 AND kind = 'worker'", id)
      .await?;
    raw.map(RawPerson::into_worker).transpose()
  }

  fn update_worker(
    &self,
    worker: &Worker,
  ) -> impl Future<Output = Result<Provisioned<()>>> + Send + '_ {
    let person_id      = worker.identity.person_id;
    let id_str         = encode_uuid(worker.identity.person_id);
    let username       = worker.identity.username.clone();
    let email          = worker.identity.email.clone();
    let confirmed      = worker.identity.email_confirmed;
    let full_name      = worker.identity.full_name.clone();
    let document_id    = worker.identity.document_id.clone();
    let address        = worker.identity.address.clone();
    let phone          = worker.identity.phone.clone();
    let position       = worker.position.clone();
    let wage           = worker.wage;
    let status_str     = encode_status(worker.status).to_owned();
    let education_str  = encode_education(worker.education).to_owned();
    let department_str = encode_department(worker.department).to_owned();
    let profile        = worker.profile.clone();
    let registered_str = encode_dt(worker.registered_at);

    async move {
    let outcome = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE persons SET
             username = ?2, email = ?3, email_confirmed = ?4, full_name = ?5,
             document_id = ?6, address = ?7, phone = ?8, position = ?9,
             wage = ?10, status = ?11, education = ?12, department = ?13,
             profile = ?14, registered_at = ?15
           WHERE person_id = ?1 AND kind = 'worker'",
          rusqlite::params![
            id_str,
            username,
            email,
            confirmed,
            full_name,
            document_id,
            address,
            phone,
            position,
            wage,
            status_str,
            education_str,
            department_str,
            profile,
            registered_str,
          ],
        )?;
        Ok(changed)
      })
      .await;

    match outcome {
      Ok(0) => Ok(Provisioned::Rejected(vec![format!(
        "no worker with id {person_id}"
      )])),
      Ok(_) => Ok(Provisioned::Created(())),
      Err(e) => match constraint_rejection(&e) {
        Some(descriptions) => Ok(Provisioned::Rejected(descriptions)),
        None => Err(e.into()),
      },
    }
    }
  }

  async fn delete_person(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM persons WHERE person_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn list_workers(&self) -> Result<Vec<Worker>> {
    let sql = format!(
      "SELECT {} FROM persons WHERE kind = 'worker' ORDER BY full_name, person_id",
      RawPerson::COLUMNS
    );

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_worker).collect()
  }

  async fn search_workers(&self, query: &WorkerQuery) -> Result<WorkerPage> {
    // An empty or whitespace query matches everything.
    let needle = query
      .text
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_lowercase);

    let page   = query.page.max(1);
    let limit  = query.page_size as i64;
    let offset = ((page - 1) as i64) * limit;

    let (total, raws) = self
      .conn
      .call(move |conn| {
        let (total, rows): (i64, Vec<RawPerson>) = match needle {
          Some(n) => {
            let total = conn.query_row(
              "SELECT COUNT(*) FROM persons
               WHERE kind = 'worker'
                 AND (instr(lower(full_name), ?1) > 0
                   OR instr(lower(email), ?1) > 0)",
              rusqlite::params![n],
              |r| r.get(0),
            )?;
            let sql = format!(
              "SELECT {} FROM persons
               WHERE kind = 'worker'
                 AND (instr(lower(full_name), ?1) > 0
                   OR instr(lower(email), ?1) > 0)
               ORDER BY full_name, person_id
               LIMIT ?2 OFFSET ?3",
              RawPerson::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
              .query_map(rusqlite::params![n, limit, offset], RawPerson::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            (total, rows)
          }
          None => {
            let total = conn.query_row(
              "SELECT COUNT(*) FROM persons WHERE kind = 'worker'",
              [],
              |r| r.get(0),
            )?;
            let sql = format!(
              "SELECT {} FROM persons WHERE kind = 'worker'
               ORDER BY full_name, person_id
               LIMIT ?1 OFFSET ?2",
              RawPerson::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
              .query_map(rusqlite::params![limit, offset], RawPerson::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            (total, rows)
          }
        };
        Ok((total, rows))
      })
      .await?;

    let workers = raws
      .into_iter()
      .map(RawPerson::into_worker)
      .collect::<Result<Vec<_>>>()?;

    Ok(WorkerPage { workers, total: total as u64 })
  }

  // ── Counts ──────────────────────────────────────────────────────────────

  async fn count_workers(&self) -> Result<u64> {
    self.count_where("kind = 'worker'", None).await
  }

  async fn count_by_status(&self, status: WorkerStatus) -> Result<u64> {
    self
      .count_where(
        "kind = 'worker' AND status = ?1",
        Some(encode_status(status).to_owned()),
      )
      .await
  }

  async fn count_by_department(&self, department: Department) -> Result<u64> {
    self
      .count_where(
        "kind = 'worker' AND department = ?1",
        Some(encode_department(department).to_owned()),
      )
      .await
  }

  async fn count_by_education(&self, education: EducationLevel) -> Result<u64> {
    self
      .count_where(
        "kind = 'worker' AND education = ?1",
        Some(encode_education(education).to_owned()),
      )
      .await
  }

  async fn count_by_position(&self, fragment: &str) -> Result<u64> {
    self
      .count_where(
        "kind = 'worker' AND instr(lower(position), ?1) > 0",
        Some(fragment.trim().to_lowercase()),
      )
      .await
  }

  // ── Admins ──────────────────────────────────────────────────────────────

  async fn create_admin(
    &self,
    input: NewAdmin,
    password_hash: String,
  ) -> Result<Provisioned<Admin>> {
    let admin = Admin {
      identity:   Identity {
        person_id:       Uuid::new_v4(),
        username:        input.username,
        email:           input.email,
        email_confirmed: input.email_confirmed,
        full_name:       input.full_name,
        document_id:     input.document_id,
        address:         input.address,
        phone:           input.phone,
      },
      last_login: None,
    };

    let id_str      = encode_uuid(admin.identity.person_id);
    let username    = admin.identity.username.clone();
    let email       = admin.identity.email.clone();
    let confirmed   = admin.identity.email_confirmed;
    let full_name   = admin.identity.full_name.clone();
    let document_id = admin.identity.document_id.clone();
    let address     = admin.identity.address.clone();
    let phone       = admin.identity.phone.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             person_id, kind, username, email, email_confirmed, password_hash,
             full_name, document_id, address, phone
           ) VALUES (?1, 'admin', ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            username,
            email,
            confirmed,
            password_hash,
            full_name,
            document_id,
            address,
            phone,
          ],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(Provisioned::Created(admin)),
      Err(e) => match constraint_rejection(&e) {
        Some(descriptions) => Ok(Provisioned::Rejected(descriptions)),
        None => Err(e.into()),
      },
    }
  }

  async fn admin(&self, id: Uuid) -> Result<Option<Admin>> {
    let raw = self
      .fetch_person_where("person_id = ?1 AND kind = 'admin'", id)
      .await?;
    raw.map(RawPerson::into_admin).transpose()
  }

  async fn touch_admin_login(&self, id: Uuid, when: DateTime<Utc>) -> Result<()> {
    let id_str   = encode_uuid(id);
    let when_str = encode_dt(when);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE persons SET last_login = ?2
           WHERE person_id = ?1 AND kind = 'admin'",
          rusqlite::params![id_str, when_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Sales ───────────────────────────────────────────────────────────────

  async fn create_sale(&self, input: NewSale) -> Result<Option<Sale>> {
    let sale_date  = input.sale_date.unwrap_or_else(Utc::now);
    let date_str   = encode_dt(sale_date);
    let amount_str = encode_amount(input.amount);
    let worker_str = encode_uuid(input.worker_id);

    let sale_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM persons WHERE person_id = ?1 AND kind = 'worker'",
            rusqlite::params![worker_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO sales (sale_date, amount, worker_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![date_str, amount_str, worker_str],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    Ok(sale_id.map(|sale_id| Sale {
      sale_id,
      sale_date,
      amount: input.amount,
      worker_id: input.worker_id,
    }))
  }

  async fn sale(&self, id: i64) -> Result<Option<SaleRecord>> {
    let mut records = self
      .fetch_sale_records("WHERE s.sale_id = ?1", Some(id))
      .await?;
    Ok(records.pop())
  }

  async fn sales(&self) -> Result<Vec<SaleRecord>> {
    self.fetch_sale_records("", None::<i64>).await
  }

  async fn sales_by_worker(&self, worker_id: Uuid) -> Result<Vec<SaleRecord>> {
    self
      .fetch_sale_records(
        "WHERE s.worker_id = ?1",
        Some(encode_uuid(worker_id)),
      )
      .await
  }

  fn update_sale(
    &self,
    sale: &Sale,
  ) -> impl Future<Output = Result<bool>> + Send + '_ {
    let id         = sale.sale_id;
    let date_str   = encode_dt(sale.sale_date);
    let amount_str = encode_amount(sale.amount);
    let worker_str = encode_uuid(sale.worker_id);

    async move {
      let changed = self
        .conn
        .call(move |conn| {
          let n = conn.execute(
            "UPDATE sales SET sale_date = ?2, amount = ?3, worker_id = ?4
             WHERE sale_id = ?1",
            rusqlite::params![id, date_str, amount_str, worker_str],
          )?;
          Ok(n > 0)
        })
        .await?;
      Ok(changed)
    }
  }

  async fn delete_sale(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn
          .execute("DELETE FROM sales WHERE sale_id = ?1", rusqlite::params![id])?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn total_sales_amount(&self) -> Result<Decimal> {
    let amounts: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT amount FROM sales")?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Summed here rather than in SQL so the arithmetic stays decimal-exact.
    let mut total = Decimal::ZERO;
    for amount in &amounts {
      total += decode_amount(amount)?;
    }
    Ok(total)
  }

  // ── Identity ────────────────────────────────────────────────────────────

  async fn find_credential_by_email(
    &self,
    email: &str,
  ) -> Result<Option<Credential>> {
    let email = email.trim().to_owned();

    // The email column's collation is NOCASE, so `=` compares
    // case-insensitively.
    let found: Option<(String, String, String, Vec<String>)> = self
      .conn
      .call(move |conn| {
        let head: Option<(String, String, String)> = conn
          .query_row(
            "SELECT person_id, email, password_hash FROM persons
             WHERE email = ?1",
            rusqlite::params![email],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;

        let Some((person_id, email, hash)) = head else {
          return Ok(None);
        };

        let mut stmt = conn
          .prepare("SELECT role FROM roles WHERE person_id = ?1 ORDER BY role")?;
        let roles = stmt
          .query_map(rusqlite::params![person_id], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((person_id, email, hash, roles)))
      })
      .await?;

    let Some((person_id, email, password_hash, role_strs)) = found else {
      return Ok(None);
    };

    let roles = role_strs
      .iter()
      .map(|r| decode_role(r))
      .collect::<Result<Vec<_>>>()?;

    Ok(Some(Credential {
      person_id: Uuid::parse_str(&person_id)?,
      email,
      password_hash,
      roles,
    }))
  }

  async fn email_exists(&self, email: &str) -> Result<bool> {
    let email = email.trim().to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        let hit: Option<i64> = conn
          .query_row(
            "SELECT 1 FROM persons WHERE email = ?1",
            rusqlite::params![email],
            |r| r.get(0),
          )
          .optional()?;
        Ok(hit.is_some())
      })
      .await?;
    Ok(exists)
  }

  async fn assign_role(&self, person_id: Uuid, role: Role) -> Result<()> {
    let id_str   = encode_uuid(person_id);
    let role_str = encode_role(role).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO roles (person_id, role) VALUES (?1, ?2)",
          rusqlite::params![id_str, role_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn roles(&self, person_id: Uuid) -> Result<Vec<Role>> {
    let id_str = encode_uuid(person_id);

    let role_strs: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT role FROM roles WHERE person_id = ?1 ORDER BY role")?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    role_strs.iter().map(|r| decode_role(r)).collect()
  }

  async fn person(&self, id: Uuid) -> Result<Option<Person>> {
    let raw = self.fetch_person_where("person_id = ?1", id).await?;
    raw.map(RawPerson::into_person).transpose()
  }
}
