//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// One `persons` table holds both account kinds, discriminated by `kind`;
/// worker-only columns are NULL on admin rows and vice versa. Email and
/// username uniqueness live here, not in application pre-checks, so two
/// concurrent imports cannot both create the same identity.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id       TEXT PRIMARY KEY,
    kind            TEXT NOT NULL,                    -- 'admin' | 'worker'
    username        TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
    email_confirmed INTEGER NOT NULL DEFAULT 0,
    password_hash   TEXT NOT NULL,
    full_name       TEXT NOT NULL,
    document_id     TEXT NOT NULL DEFAULT '',
    address         TEXT NOT NULL DEFAULT '',
    phone           TEXT NOT NULL DEFAULT '',
    -- worker columns
    position        TEXT,
    wage            INTEGER,
    status          TEXT,                             -- WorkerStatus, snake_case
    education       TEXT,                             -- EducationLevel, snake_case
    department      TEXT,                             -- Department, snake_case
    profile         TEXT,
    registered_at   TEXT,                             -- ISO 8601 UTC
    -- admin columns
    last_login      TEXT
);

CREATE TABLE IF NOT EXISTS roles (
    person_id TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE,
    role      TEXT NOT NULL,                          -- 'admin' | 'worker'
    PRIMARY KEY (person_id, role)
);

-- Sales belong to exactly one worker and go away with it.
CREATE TABLE IF NOT EXISTS sales (
    sale_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    sale_date TEXT NOT NULL,                          -- ISO 8601 UTC
    amount    TEXT NOT NULL,                          -- exact decimal, as text
    worker_id TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS persons_kind_idx ON persons(kind);
CREATE INDEX IF NOT EXISTS sales_worker_idx ON sales(worker_id);
CREATE INDEX IF NOT EXISTS sales_date_idx   ON sales(sale_date);

PRAGMA user_version = 1;
";
