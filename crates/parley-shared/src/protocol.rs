use serde::{Deserialize, Serialize};

use crate::constants::DIGEST_SIZE;
use crate::types::{
    AttachmentId, CipherType, ContactShare, MessageBodyRanges, MessageSticker, ServiceAddress,
};

/// All wire protocol messages sent to peers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WireMessage {
    /// Regular content message, possibly quoting an earlier one
    Data(DataMessage),

    /// Notice that an envelope could not be decrypted and should be resent
    DecryptionError(ResendRequestPayload),
}

/// A content-bearing message.  Every field is optional on the wire; an absent
/// field and an empty one are different things.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataMessage {
    pub timestamp: u64,
    pub body: Option<String>,
    pub body_ranges: Option<MessageBodyRanges>,
    pub attachments: Vec<AttachmentId>,
    pub sticker: Option<MessageSticker>,
    pub contact_share: Option<ContactShare>,
    pub quote: Option<WireQuotedMessage>,
}

/// Quoted-message block attached to a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireQuotedMessage {
    /// Sender of the quoted message
    pub author: ServiceAddress,
    /// Sent-time of the quoted message, in milliseconds since the epoch
    pub timestamp: u64,
    pub body: Option<String>,
    pub body_ranges: Option<MessageBodyRanges>,
    /// Reference to the quoted attachment; only present when we hold it locally
    pub attachment: Option<WireAttachmentRef>,
    pub content_type: Option<String>,
    pub source_filename: Option<String>,
}

impl WireQuotedMessage {
    pub fn new(author: ServiceAddress, timestamp: u64) -> Self {
        Self {
            author,
            timestamp,
            body: None,
            body_ranges: None,
            attachment: None,
            content_type: None,
            source_filename: None,
        }
    }
}

/// Attachment reference safe to put on the wire.  The transfer layer uses the
/// id and digest to re-upload or re-reference the bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireAttachmentRef {
    pub attachment_id: AttachmentId,
    pub content_type: String,
    pub byte_count: u64,
    /// BLAKE3 hash of the plaintext bytes
    pub digest: [u8; DIGEST_SIZE],
}

/// Control payload asking a peer to resend an envelope we failed to decrypt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResendRequestPayload {
    /// Opaque content of the failed envelope
    pub original_content: Vec<u8>,
    pub cipher_type: CipherType,
    /// Sent-time of the failed envelope
    pub original_timestamp: u64,
    /// Device of the sender that produced the failed envelope
    pub original_sender_device: u32,
}

impl WireMessage {
    /// Serialize to binary (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_body_stay_distinct() {
        let author = ServiceAddress::new(uuid::Uuid::new_v4());

        let absent = WireQuotedMessage::new(author.clone(), 1000);
        let mut empty = WireQuotedMessage::new(author, 1000);
        empty.body = Some(String::new());

        let wrap = |quote: WireQuotedMessage| {
            WireMessage::Data(DataMessage {
                timestamp: 2000,
                body: Some("reply".into()),
                quote: Some(quote),
                ..Default::default()
            })
        };

        let absent_bytes = wrap(absent).to_bytes().unwrap();
        let empty_bytes = wrap(empty).to_bytes().unwrap();
        assert_ne!(absent_bytes, empty_bytes);

        match WireMessage::from_bytes(&empty_bytes).unwrap() {
            WireMessage::Data(data) => {
                assert_eq!(data.quote.unwrap().body.as_deref(), Some(""));
            }
            other => panic!("Message type mismatch: {other:?}"),
        }
    }

    #[test]
    fn test_decryption_error_roundtrip() {
        let msg = WireMessage::DecryptionError(ResendRequestPayload {
            original_content: vec![9, 8, 7],
            cipher_type: CipherType::PRE_KEY,
            original_timestamp: 1234,
            original_sender_device: 2,
        });

        let bytes = msg.to_bytes().unwrap();
        assert_eq!(WireMessage::from_bytes(&bytes).unwrap(), msg);
    }
}
