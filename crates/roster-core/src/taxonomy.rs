//! The fixed worker taxonomies: status, education tier, department.
//!
//! All three parse case-insensitively from free text (spreadsheet cells, AI
//! query parameters). Parse failures are handled by callers, usually by
//! substituting the `Default` variant and logging a warning.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Employment status of a worker.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
  #[default]
  Active,
  Inactive,
  #[strum(to_string = "OnVacation", serialize = "on_vacation", serialize = "vacation")]
  OnVacation,
}

/// Educational attainment, five tiers. `Ord` follows declaration order.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
  Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
  #[default]
  Technical,
  Technologist,
  Professional,
  Masters,
  Specialization,
}

/// The seven fixed departments. Discriminants are stable and exposed through
/// [`Department::id`] for the departments listing endpoint.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Department {
  Marketing     = 0,
  Operations    = 1,
  #[strum(
    to_string = "HumanResources",
    serialize = "human_resources",
    serialize = "human resources"
  )]
  HumanResources = 2,
  Logistics     = 3,
  Sales         = 4,
  Accounting    = 5,
  #[default]
  Technology    = 6,
}

impl Department {
  pub fn id(self) -> u8 { self as u8 }
}
