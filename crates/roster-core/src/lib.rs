//! Core types and trait definitions for the Roster HR directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod person;
pub mod query;
pub mod sale;
pub mod store;
pub mod taxonomy;

pub use person::{Admin, Identity, Person, Role, Worker};
pub use sale::{NewSale, Sale, SaleRecord};
pub use taxonomy::{Department, EducationLevel, WorkerStatus};
