//! `GET /api/departments` — the seven fixed categories, public.

use axum::Json;
use roster_core::Department;
use serde::Serialize;
use strum::IntoEnumIterator as _;

#[derive(Debug, Serialize)]
pub struct DepartmentEntry {
  pub id:   u8,
  pub name: String,
}

pub async fn list() -> Json<Vec<DepartmentEntry>> {
  Json(
    Department::iter()
      .map(|d| DepartmentEntry { id: d.id(), name: d.to_string() })
      .collect(),
  )
}
