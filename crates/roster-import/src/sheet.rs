//! Worksheet extraction: the 14-column row contract and cell coercion.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use roster_core::{Department, EducationLevel, WorkerStatus};

use crate::{Error, Result};

// Fixed column layout, zero-based. Row 1 of the worksheet is the header.
const COL_DOCUMENT_ID: usize = 0;
const COL_FIRST_NAME: usize = 1;
const COL_LAST_NAME: usize = 2;
const COL_BIRTH_DATE: usize = 3;
const COL_ADDRESS: usize = 4;
const COL_PHONE: usize = 5;
const COL_EMAIL: usize = 6;
const COL_POSITION: usize = 7;
const COL_WAGE: usize = 8;
const COL_ENTRY_DATE: usize = 9;
const COL_STATUS: usize = 10;
const COL_EDUCATION: usize = 11;
const COL_PROFILE: usize = 12;
const COL_DEPARTMENT: usize = 13;

/// One data row, extracted and coerced. Taxonomy cells that failed to parse
/// already carry their documented defaults; `notes` records every
/// substitution so the caller can log them against the row number.
#[derive(Debug, Clone)]
pub struct SheetRow {
  /// 1-based worksheet row number (the header is row 1).
  pub row:         u32,
  pub document_id: String,
  pub first_name:  String,
  pub last_name:   String,
  /// Carried for format compatibility; the directory does not store it.
  pub birth_date:  String,
  pub address:     String,
  pub phone:       String,
  pub email:       String,
  pub position:    String,
  pub wage:        i64,
  /// Carried for format compatibility; the directory does not store it.
  pub entry_date:  String,
  pub status:      WorkerStatus,
  pub education:   EducationLevel,
  pub department:  Department,
  pub profile:     String,
  pub notes:       Vec<String>,
}

impl SheetRow {
  /// `first_name` and `last_name` joined and trimmed. The import skip rules
  /// treat an empty result as "no name".
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
      .trim()
      .to_owned()
  }
}

/// Parse the first worksheet of an `.xlsx` workbook. The header row is
/// skipped; every following row maps to one [`SheetRow`]. Cell-level
/// problems never fail the parse — they surface as defaults plus notes.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<SheetRow>> {
  let mut workbook = Xlsx::new(Cursor::new(bytes))?;
  let range = workbook.worksheet_range_at(0).ok_or(Error::NoWorksheet)??;

  Ok(
    range
      .rows()
      .enumerate()
      .skip(1)
      .map(|(i, cells)| row_from_cells((i + 1) as u32, cells))
      .collect(),
  )
}

/// Map one row of cells through the fixed column layout.
fn row_from_cells(row: u32, cells: &[Data]) -> SheetRow {
  let mut notes = Vec::new();

  let wage = match cell_wage(cells, COL_WAGE) {
    Some(w) => w,
    None => {
      notes.push("wage cell is not numeric; defaulted to 0".to_owned());
      0
    }
  };

  let status = parse_or_default(&cell_text(cells, COL_STATUS), "status", &mut notes);
  let education =
    parse_or_default(&cell_text(cells, COL_EDUCATION), "education", &mut notes);
  let department =
    parse_or_default(&cell_text(cells, COL_DEPARTMENT), "department", &mut notes);

  SheetRow {
    row,
    document_id: cell_text(cells, COL_DOCUMENT_ID),
    first_name: cell_text(cells, COL_FIRST_NAME),
    last_name: cell_text(cells, COL_LAST_NAME),
    birth_date: cell_text(cells, COL_BIRTH_DATE),
    address: cell_text(cells, COL_ADDRESS),
    phone: cell_text(cells, COL_PHONE),
    email: cell_text(cells, COL_EMAIL),
    position: cell_text(cells, COL_POSITION),
    wage,
    entry_date: cell_text(cells, COL_ENTRY_DATE),
    status,
    education,
    department,
    profile: cell_text(cells, COL_PROFILE),
    notes,
  }
}

/// Text coercion: anything renders to a trimmed string, numbers without a
/// trailing `.0` (document ids and phones are often numeric cells).
fn cell_text(cells: &[Data], idx: usize) -> String {
  match cells.get(idx) {
    None | Some(Data::Empty) | Some(Data::Error(_)) => String::new(),
    Some(Data::String(s)) => s.trim().to_owned(),
    Some(Data::Int(i)) => i.to_string(),
    Some(Data::Float(f)) => {
      if f.fract() == 0.0 {
        format!("{}", *f as i64)
      } else {
        f.to_string()
      }
    }
    Some(Data::Bool(b)) => b.to_string(),
    Some(Data::DateTime(dt)) => {
      let v = dt.as_f64();
      if v.fract() == 0.0 {
        format!("{}", v as i64)
      } else {
        v.to_string()
      }
    }
    Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => s.trim().to_owned(),
  }
}

/// Robust wage coercion: numeric cell first, then string parse. `None` means
/// the caller should default to 0 and note it. Empty cells are a plain 0.
fn cell_wage(cells: &[Data], idx: usize) -> Option<i64> {
  match cells.get(idx) {
    None | Some(Data::Empty) => Some(0),
    Some(Data::Int(i)) => Some(*i),
    Some(Data::Float(f)) if f.fract() == 0.0 => Some(*f as i64),
    Some(Data::String(s)) => s.trim().parse().ok(),
    _ => None,
  }
}

fn parse_or_default<T>(text: &str, what: &str, notes: &mut Vec<String>) -> T
where
  T: std::str::FromStr + Default,
{
  if text.is_empty() {
    return T::default();
  }
  match text.parse() {
    Ok(v) => v,
    Err(_) => {
      notes.push(format!("unrecognized {what} {text:?}; defaulted"));
      T::default()
    }
  }
}
