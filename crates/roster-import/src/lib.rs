//! Spreadsheet codec for bulk worker import.
//!
//! Converts `.xlsx` workbook bytes into typed row records. Pure synchronous;
//! no HTTP or database dependencies. Reconciliation of rows against the
//! directory (skip/create decisions) lives in the server crate — this crate
//! only extracts and coerces cells.
//!
//! # Quick start
//!
//! ```no_run
//! let bytes = std::fs::read("workers.xlsx").unwrap();
//! for row in roster_import::parse_workbook(&bytes).unwrap() {
//!   println!("row {}: {} <{}>", row.row, row.full_name(), row.email);
//! }
//! ```

pub mod error;
mod sheet;

pub use error::{Error, Result};
pub use sheet::{SheetRow, parse_workbook};
