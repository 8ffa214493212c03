//! Error types for `roster-import`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("workbook error: {0}")]
  Workbook(#[from] calamine::XlsxError),

  #[error("workbook has no worksheets")]
  NoWorksheet,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
