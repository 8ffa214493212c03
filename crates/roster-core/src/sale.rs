//! Sale records, scoped to a single worker.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::person::Worker;

/// A persisted sale. The id is storage-assigned; the amount is exact decimal.
/// Deleting the owning worker cascades to its sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
  pub sale_id:   i64,
  pub sale_date: DateTime<Utc>,
  pub amount:    Decimal,
  pub worker_id: Uuid,
}

/// Input for creating a sale. The date defaults to the creation time when
/// unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
  pub worker_id: Uuid,
  pub amount:    Decimal,
  #[serde(default)]
  pub sale_date: Option<DateTime<Utc>>,
}

/// A sale bundled with its worker — the shape reads return, since sale
/// listings always display worker context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
  pub sale:   Sale,
  pub worker: Worker,
}
