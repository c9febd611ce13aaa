//! # duet-store
//!
//! Persistent document store for the Duet messaging core, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for the three record
//! kinds this system persists: accounts (credentials), user profiles with
//! their friend sets, and channel messages.  Message ordering data (sequence
//! number and timestamp) is assigned here at write time, never by callers.

pub mod accounts;
pub mod database;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
