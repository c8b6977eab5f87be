//! Signup Hook Core - Shared domain types.
//!
//! This crate provides the validated types used by the webhook receiver:
//! - [`Email`] - a structurally checked email address
//! - [`ProviderUserId`] - the identity provider's stable user key
//! - [`UserId`] - the internal identifier of a stored user record
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Database encoding is available behind the `postgres` feature.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
