//! Domain model structs persisted in the local database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer or printed by the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_shared::constants::DIGEST_SIZE;
use parley_shared::protocol::{DataMessage, ResendRequestPayload, WireMessage, WireQuotedMessage};
use parley_shared::types::{
    AttachmentId, ContactShare, MessageBodyRanges, MessageId, MessageSticker, ServiceAddress,
    StickerInfo, ThreadId,
};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

impl MessageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incoming" => Some(Self::Incoming),
            "outgoing" => Some(Self::Outgoing),
            _ => None,
        }
    }
}

/// A stored chat message, incoming or outgoing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Locally assigned identifier.
    pub id: MessageId,
    /// Conversation the message belongs to.
    pub thread_id: ThreadId,
    /// Sent-time reported by the author, in milliseconds since the epoch.
    /// Together with `author` this identifies the message across devices.
    pub timestamp: u64,
    /// Sender.  For outgoing messages this is the local account.
    pub author: ServiceAddress,
    pub direction: MessageDirection,
    pub body: Option<String>,
    pub body_ranges: Option<MessageBodyRanges>,
    /// Attachments in display order.
    pub attachment_ids: Vec<AttachmentId>,
    pub sticker: Option<MessageSticker>,
    pub contact_share: Option<ContactShare>,
    pub is_view_once: bool,
    /// Set once a view-once message has been viewed and its media purged.
    pub is_view_once_complete: bool,
    /// The author deleted the message for everyone.
    pub was_remotely_deleted: bool,
    /// Quote carried by this message when it is a reply.
    pub quoted_message: Option<QuotedMessageRecord>,
    /// When this device stored the message.
    pub received_at: DateTime<Utc>,
}

impl Message {
    /// Bare incoming message with no content; callers fill in what they need.
    pub fn incoming(thread_id: ThreadId, timestamp: u64, author: ServiceAddress) -> Self {
        Self {
            id: MessageId::new(),
            thread_id,
            timestamp,
            author,
            direction: MessageDirection::Incoming,
            body: None,
            body_ranges: None,
            attachment_ids: Vec::new(),
            sticker: None,
            contact_share: None,
            is_view_once: false,
            is_view_once_complete: false,
            was_remotely_deleted: false,
            quoted_message: None,
            received_at: Utc::now(),
        }
    }

    pub fn outgoing(thread_id: ThreadId, timestamp: u64, local_address: ServiceAddress) -> Self {
        Self {
            direction: MessageDirection::Outgoing,
            ..Self::incoming(thread_id, timestamp, local_address)
        }
    }
}

/// Quote block as it was stored with a reply.
///
/// This is a flat record: it keeps whatever the reply carried when it was
/// received or sent, independent of the original message's later fate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotedMessageRecord {
    pub timestamp: u64,
    pub author: ServiceAddress,
    pub body: Option<String>,
    pub body_ranges: Option<MessageBodyRanges>,
    pub content_type: Option<String>,
    pub source_filename: Option<String>,
    /// Local copy of the quoted attachment's thumbnail, if one was fetched
    /// or is being fetched.
    pub thumbnail_attachment_id: Option<AttachmentId>,
}

impl QuotedMessageRecord {
    /// Record a quote received from a peer.  The attachment reference, if
    /// any, is replaced by the locally created thumbnail record.
    pub fn from_wire(quote: &WireQuotedMessage, thumbnail_attachment_id: Option<AttachmentId>) -> Self {
        Self {
            timestamp: quote.timestamp,
            author: quote.author.clone(),
            body: quote.body.clone(),
            body_ranges: quote.body_ranges.clone(),
            content_type: quote.content_type.clone(),
            source_filename: quote.source_filename.clone(),
            thumbnail_attachment_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// Download state of an attachment we only hold a pointer to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PointerState {
    Enqueued,
    Downloading,
    Failed,
    /// Held back until the user accepts the message request.
    PendingApproval,
}

impl PointerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enqueued => "enqueued",
            Self::Downloading => "downloading",
            Self::Failed => "failed",
            Self::PendingApproval => "pending_approval",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "enqueued" => Some(Self::Enqueued),
            "downloading" => Some(Self::Downloading),
            "failed" => Some(Self::Failed),
            "pending_approval" => Some(Self::PendingApproval),
            _ => None,
        }
    }
}

/// An attachment whose plaintext bytes are on local disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentStream {
    pub id: AttachmentId,
    /// MIME type.
    pub content_type: String,
    pub source_filename: Option<String>,
    pub byte_count: u64,
    /// Absolute path of the decrypted file.
    pub local_path: String,
    /// BLAKE3 hash of the file contents.
    pub digest: [u8; DIGEST_SIZE],
}

/// An attachment known only by its remote location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentPointer {
    pub id: AttachmentId,
    pub content_type: String,
    pub source_filename: Option<String>,
    pub byte_count: u64,
    /// Key of the encrypted blob on the CDN.
    pub cdn_key: String,
    pub state: PointerState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Attachment {
    Stream(AttachmentStream),
    Pointer(AttachmentPointer),
}

impl Attachment {
    pub fn id(&self) -> AttachmentId {
        match self {
            Self::Stream(s) => s.id,
            Self::Pointer(p) => p.id,
        }
    }

    pub fn content_type(&self) -> &str {
        match self {
            Self::Stream(s) => &s.content_type,
            Self::Pointer(p) => &p.content_type,
        }
    }

    pub fn source_filename(&self) -> Option<&str> {
        match self {
            Self::Stream(s) => s.source_filename.as_deref(),
            Self::Pointer(p) => p.source_filename.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sticker
// ---------------------------------------------------------------------------

/// A sticker from an installed pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstalledSticker {
    pub info: StickerInfo,
    pub content_type: String,
    pub emoji: Option<String>,
    /// Absolute path of the sticker image.
    pub local_path: String,
}

// ---------------------------------------------------------------------------
// Outgoing message
// ---------------------------------------------------------------------------

/// A message queued for sending.
///
/// Content fields default to absent; a control message such as a resend
/// request leaves every one of them absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutgoingMessage {
    pub thread_id: ThreadId,
    pub timestamp: u64,
    pub body: Option<String>,
    pub body_ranges: Option<MessageBodyRanges>,
    pub attachment_ids: Vec<AttachmentId>,
    pub sticker: Option<MessageSticker>,
    pub contact_share: Option<ContactShare>,
    pub quoted_message: Option<WireQuotedMessage>,
    pub resend_request: Option<ResendRequestPayload>,
}

impl OutgoingMessage {
    pub fn new(thread_id: ThreadId, timestamp: u64) -> Self {
        Self {
            thread_id,
            timestamp,
            body: None,
            body_ranges: None,
            attachment_ids: Vec::new(),
            sticker: None,
            contact_share: None,
            quoted_message: None,
            resend_request: None,
        }
    }

    pub fn text(thread_id: ThreadId, timestamp: u64, body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::new(thread_id, timestamp)
        }
    }

    pub fn with_quoted_message(mut self, quote: WireQuotedMessage) -> Self {
        self.quoted_message = Some(quote);
        self
    }

    /// True when the message carries no user-visible content at all.
    pub fn has_no_content(&self) -> bool {
        self.body.is_none()
            && self.body_ranges.is_none()
            && self.attachment_ids.is_empty()
            && self.sticker.is_none()
            && self.contact_share.is_none()
            && self.quoted_message.is_none()
    }

    pub fn to_wire(&self) -> WireMessage {
        if let Some(request) = &self.resend_request {
            return WireMessage::DecryptionError(request.clone());
        }

        WireMessage::Data(DataMessage {
            timestamp: self.timestamp,
            body: self.body.clone(),
            body_ranges: self.body_ranges.clone(),
            attachments: self.attachment_ids.clone(),
            sticker: self.sticker.clone(),
            contact_share: self.contact_share.clone(),
            quote: self.quoted_message.clone(),
        })
    }
}

/// An outgoing message as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredOutgoingMessage {
    pub id: MessageId,
    pub message: OutgoingMessage,
    pub created_at: DateTime<Utc>,
}
