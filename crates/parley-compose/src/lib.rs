//! # parley-compose
//!
//! Builds quoted replies and resend requests.
//!
//! A quote is resolved in four steps, all inside one read transaction:
//!
//! 1. an input adapter turns a stored message, a pending composition item,
//!    or a reply's stored quote reference into a [`ClassifiedQuote`];
//! 2. the [`AttachmentResolver`] reports what we hold locally for the quoted
//!    attachment;
//! 3. the [`QuoteResolver`] freezes both into an immutable [`QuotedReply`];
//! 4. when the user sends a reply, [`QuotedReply::to_wire`] turns the snapshot
//!    into the wire quote.
//!
//! Resend requests for undecryptable envelopes are built independently by
//! [`ResendRequestBuilder`].

pub mod attachment;
pub mod builder;
pub mod config;
pub mod item;
pub mod outgoing;
pub mod reply;
pub mod resend;
pub mod source;
pub mod store;
pub mod thumbnail;

mod error;

pub use attachment::{AttachmentResolver, ResolvedAttachment};
pub use builder::QuoteResolver;
pub use config::QuoteConfig;
pub use error::{QuoteError, Result};
pub use item::{PendingItem, QuotableItem};
pub use reply::{QuoteShape, QuotedAttachment, QuotedAttachmentState, QuotedContent, QuotedReply};
pub use resend::{FailedEnvelope, ResendRequestBuilder};
pub use source::{ClassifiedQuote, QuoteSource};
pub use store::{MessageWriter, QuoteStore};
