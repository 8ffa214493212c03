//! The fixed vocabulary of natural-language statistics queries.
//!
//! The AI interpreter maps free text onto one of these five shapes; the admin
//! aggregation service dispatches them against count queries. The vocabulary
//! is closed — anything outside it is handled by the caller's fallback paths,
//! never by extending this enum at runtime.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The five recognized query shapes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
  /// Total worker count. Takes no parameter.
  CountWorkers,
  /// Count of workers with a given status. Parameter is status text.
  CountByStatus,
  /// Count of workers in a given department. Parameter is department text.
  CountByDepartment,
  /// Count of workers whose position contains a substring. Free-text
  /// parameter.
  CountByPosition,
  /// Count of workers with a given education tier. Parameter is tier text.
  CountByEducation,
}

/// An interpreted query: a shape plus its raw text parameter. The parameter
/// is kept as text so the dispatcher owns the final enum parse and its
/// "not recognized" answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiQuery {
  pub kind:      QueryKind,
  pub parameter: String,
}

impl AiQuery {
  /// The safe default every interpreter failure path degrades to.
  pub fn count_workers() -> Self {
    AiQuery { kind: QueryKind::CountWorkers, parameter: String::new() }
  }
}
