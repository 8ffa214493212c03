//! HTTP handlers, one module per resource.

pub mod admins;
pub mod auth;
pub mod console;
pub mod departments;
pub mod sales;
pub mod workers;
