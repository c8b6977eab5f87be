//! Business logic between the HTTP routes and the record store.

pub mod registration;

pub use registration::{Registration, register};
