//! CV renderer for Roster.
//!
//! Projects a [`roster_core::Worker`] into a fixed-layout A4 PDF document.
//! Pure; no HTTP or database dependencies, no side effects beyond the
//! returned bytes.
//!
//! # Quick start
//!
//! ```no_run
//! # fn doc(worker: &roster_core::Worker) {
//! let bytes = roster_pdf::render_cv(worker).unwrap();
//! std::fs::write("cv.pdf", bytes).unwrap();
//! # }
//! ```

pub mod error;
mod render;

pub use error::{Error, Result};
pub use render::render_cv;
