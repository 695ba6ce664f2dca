//! # parley-store
//!
//! Local storage for Parley, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection`.  Writes that ingest data go through typed helpers
//! on the handle; everything the quote pipeline reads happens inside a
//! [`ReadTransaction`] so that one resolution observes a single consistent
//! snapshot, and outgoing messages are persisted through a
//! [`WriteTransaction`].

pub mod attachments;
pub mod database;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod outgoing;
pub mod stickers;
pub mod transaction;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
pub use transaction::{ReadTransaction, WriteTransaction};
