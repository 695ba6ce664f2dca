//! Resend requests for envelopes that failed to decrypt.
//!
//! Unrelated to quoting apart from sharing the outgoing-message lifecycle:
//! the request is a control message with no content fields, bound to a
//! thread and handed to a [`MessageWriter`] for persistence.

use chrono::Utc;
use tracing::info;

use parley_shared::protocol::ResendRequestPayload;
use parley_shared::types::{CipherType, MessageId, ServiceAddress, ThreadId};
use parley_store::OutgoingMessage;

use crate::error::{QuoteError, Result};
use crate::store::MessageWriter;

/// An incoming envelope we could not decrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEnvelope {
    pub source: ServiceAddress,
    pub source_device: u32,
    /// Sent-time of the envelope, in milliseconds since the epoch.
    pub timestamp: u64,
    /// Undecrypted envelope content.
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResendRequestBuilder {
    thread_id: ThreadId,
}

impl ResendRequestBuilder {
    pub fn new(thread_id: ThreadId) -> Self {
        Self { thread_id }
    }

    /// Wrap `envelope` for a resend request.  Any cipher type is accepted.
    pub fn build(envelope: &FailedEnvelope, cipher_type: CipherType) -> Result<ResendRequestPayload> {
        if envelope.content.is_empty() {
            return Err(QuoteError::InvalidEnvelope("envelope content is empty".into()));
        }
        if envelope.source_device == 0 {
            return Err(QuoteError::InvalidEnvelope(format!(
                "envelope from {} has no sender device",
                envelope.source
            )));
        }

        Ok(ResendRequestPayload {
            original_content: envelope.content.clone(),
            cipher_type,
            original_timestamp: envelope.timestamp,
            original_sender_device: envelope.source_device,
        })
    }

    /// The control message carrying the request.  Every content field is
    /// left absent.
    pub fn build_message(
        &self,
        envelope: &FailedEnvelope,
        cipher_type: CipherType,
        timestamp: u64,
    ) -> Result<OutgoingMessage> {
        let payload = Self::build(envelope, cipher_type)?;
        let mut message = OutgoingMessage::new(self.thread_id, timestamp);
        message.resend_request = Some(payload);
        Ok(message)
    }

    /// Build the request and hand it to `writer`.  Committing is up to the
    /// caller.
    pub fn enqueue<W>(
        &self,
        writer: &mut W,
        envelope: &FailedEnvelope,
        cipher_type: CipherType,
    ) -> Result<MessageId>
    where
        W: MessageWriter + ?Sized,
    {
        let timestamp = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let message = self.build_message(envelope, cipher_type, timestamp)?;
        let id = writer.insert_outgoing(&message)?;

        info!(
            message = %id,
            thread = %self.thread_id,
            source = %envelope.source,
            device = envelope.source_device,
            cipher = %cipher_type,
            "Queued resend request"
        );
        Ok(id)
    }
}
