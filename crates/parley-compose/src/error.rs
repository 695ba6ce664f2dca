use parley_shared::types::MessageId;
use parley_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    /// The quoted message has nothing to show and is not one of the
    /// intentionally empty shapes (deleted, expired view-once).
    #[error("Quoted message has no quotable content")]
    EmptyQuoteSource,

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
