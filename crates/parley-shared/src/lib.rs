//! # parley-shared
//!
//! Value types and wire payloads shared by every Parley crate: identifiers,
//! the author address, body ranges, sticker and contact-share references, and
//! the bincode-framed messages exchanged with peers.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::SharedError;
