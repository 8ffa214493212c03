//! Admin aggregation: dashboard counts and natural-language query dispatch.
//!
//! [`answer`] has a never-throw contract: interpretation failures degrade to
//! the total-worker count, unrecognized shapes get a canned response, and a
//! store failure during dispatch becomes text in the reply. Callers always
//! receive a `String`.

use roster_core::{
  query::{AiQuery, QueryKind},
  store::DirectoryStore,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::interpreter::{Interpretation, Interpreter};

const CANNED_NOT_UNDERSTOOD: &str =
  "Sorry, I could not understand the question.";

/// Aggregates shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
  pub total_workers:       u64,
  pub total_sales_amount:  Decimal,
  pub active_workers:      u64,
  pub on_vacation_workers: u64,
}

pub async fn dashboard<S: DirectoryStore>(
  store: &S,
) -> Result<Dashboard, S::Error> {
  Ok(Dashboard {
    total_workers:       store.count_workers().await?,
    total_sales_amount:  store.total_sales_amount().await?,
    active_workers:      store
      .count_by_status(roster_core::WorkerStatus::Active)
      .await?,
    on_vacation_workers: store
      .count_by_status(roster_core::WorkerStatus::OnVacation)
      .await?,
  })
}

/// Answer a free-text statistics question.
pub async fn answer<S: DirectoryStore>(
  store: &S,
  interpreter: &Interpreter,
  question: &str,
) -> String {
  match interpreter.interpret(question).await {
    Interpretation::Recognized(query) => dispatch(store, query).await,
    Interpretation::Fallback(_) => {
      dispatch(store, AiQuery::count_workers()).await
    }
    Interpretation::Unrecognized { query_type } => {
      warn!(query_type, "unrecognized query shape");
      CANNED_NOT_UNDERSTOOD.to_owned()
    }
  }
}

/// Run one of the five fixed count queries and phrase the result. Lookup
/// failures are converted to a textual error message, never propagated.
async fn dispatch<S: DirectoryStore>(store: &S, query: AiQuery) -> String {
  let counted = match query.kind {
    QueryKind::CountWorkers => store
      .count_workers()
      .await
      .map(|n| format!("There are {n} registered workers.")),
    QueryKind::CountByStatus => {
      let Ok(status) = query.parameter.parse() else {
        return CANNED_NOT_UNDERSTOOD.to_owned();
      };
      store.count_by_status(status).await.map(|n| {
        format!("There are {n} workers with status {status}.")
      })
    }
    QueryKind::CountByDepartment => {
      let Ok(department) = query.parameter.parse() else {
        return CANNED_NOT_UNDERSTOOD.to_owned();
      };
      store.count_by_department(department).await.map(|n| {
        format!("There are {n} workers in the {department} department.")
      })
    }
    QueryKind::CountByPosition => {
      store.count_by_position(&query.parameter).await.map(|n| {
        format!(
          "There are {n} workers whose position matches {:?}.",
          query.parameter
        )
      })
    }
    QueryKind::CountByEducation => {
      let Ok(education) = query.parameter.parse() else {
        return CANNED_NOT_UNDERSTOOD.to_owned();
      };
      store.count_by_education(education).await.map(|n| {
        format!("There are {n} workers with {education} education.")
      })
    }
  };

  counted.unwrap_or_else(|e| format!("Error: {e}"))
}
