//! Signup Hook server library.
//!
//! Receives identity-provider registration webhooks and records each new
//! user in `PostgreSQL` exactly once. Exposed as a library so the router
//! can be exercised in tests with any [`db::UserStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
