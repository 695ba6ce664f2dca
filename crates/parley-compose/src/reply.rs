//! The quoted-reply snapshot.
//!
//! A [`QuotedReply`] is frozen at construction.  Every field is private and
//! only reachable through accessors, so a snapshot stays valid whatever
//! later happens to the quoted message or its attachments.  The content is
//! a tagged union: each shape carries exactly the fields it can have, and a
//! quoted attachment is in exactly one [`QuotedAttachmentState`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use image::DynamicImage;
use serde::Serialize;

use parley_shared::types::{MessageBodyRanges, ServiceAddress, StickerInfo};
use parley_store::{AttachmentPointer, AttachmentStream};

use crate::thumbnail::quote_thumbnail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteShape {
    PlainText,
    AttachmentWithCaption,
    Sticker,
    ContactShare,
    RemotelyDeleted,
    ViewOnceExpired,
}

impl QuoteShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::AttachmentWithCaption => "attachment_with_caption",
            Self::Sticker => "sticker",
            Self::ContactShare => "contact_share",
            Self::RemotelyDeleted => "remotely_deleted",
            Self::ViewOnceExpired => "view_once_expired",
        }
    }
}

impl fmt::Display for QuoteShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What this device holds for a quoted attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotedAttachmentState {
    Stream(AttachmentStream),
    /// Thumbnail retrieval failed earlier; a later call may retry it.
    FailedThumbnail(AttachmentPointer),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotedAttachment {
    /// Recorded even without local bytes, since it describes what was quoted.
    pub content_type: Option<String>,
    pub source_filename: Option<String>,
    pub state: QuotedAttachmentState,
}

impl QuotedAttachment {
    pub fn stream(&self) -> Option<&AttachmentStream> {
        match &self.state {
            QuotedAttachmentState::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    pub fn failed_thumbnail_pointer(&self) -> Option<&AttachmentPointer> {
        match &self.state {
            QuotedAttachmentState::FailedThumbnail(pointer) => Some(pointer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum QuotedContent {
    Text {
        body: String,
        body_ranges: Option<MessageBodyRanges>,
    },
    Attachment {
        caption: Option<String>,
        body_ranges: Option<MessageBodyRanges>,
        attachment: QuotedAttachment,
    },
    Sticker {
        sticker: StickerInfo,
        attachment: QuotedAttachment,
    },
    ContactShare {
        display_name: String,
    },
    RemotelyDeleted,
    ViewOnceExpired,
}

impl QuotedContent {
    pub fn shape(&self) -> QuoteShape {
        match self {
            Self::Text { .. } => QuoteShape::PlainText,
            Self::Attachment { .. } => QuoteShape::AttachmentWithCaption,
            Self::Sticker { .. } => QuoteShape::Sticker,
            Self::ContactShare { .. } => QuoteShape::ContactShare,
            Self::RemotelyDeleted => QuoteShape::RemotelyDeleted,
            Self::ViewOnceExpired => QuoteShape::ViewOnceExpired,
        }
    }

    fn attachment(&self) -> Option<&QuotedAttachment> {
        match self {
            Self::Attachment { attachment, .. } | Self::Sticker { attachment, .. } => {
                Some(attachment)
            }
            _ => None,
        }
    }
}

/// Immutable snapshot of a quoted message.
#[derive(Debug, Clone, Serialize)]
pub struct QuotedReply {
    timestamp: u64,
    author: ServiceAddress,
    is_remotely_sourced: bool,
    #[serde(flatten)]
    content: QuotedContent,
    #[serde(skip)]
    thumbnail_max_dimension: u32,
    #[serde(skip)]
    thumbnail: OnceLock<Option<Arc<DynamicImage>>>,
}

impl QuotedReply {
    pub(crate) fn new(
        timestamp: u64,
        author: ServiceAddress,
        is_remotely_sourced: bool,
        content: QuotedContent,
        thumbnail_max_dimension: u32,
    ) -> Self {
        Self {
            timestamp,
            author,
            is_remotely_sourced,
            content,
            thumbnail_max_dimension,
            thumbnail: OnceLock::new(),
        }
    }

    /// Sent-time of the quoted message.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn author(&self) -> &ServiceAddress {
        &self.author
    }

    pub fn is_remotely_sourced(&self) -> bool {
        self.is_remotely_sourced
    }

    pub fn content(&self) -> &QuotedContent {
        &self.content
    }

    pub fn shape(&self) -> QuoteShape {
        self.content.shape()
    }

    /// Quoted text, or the caption of a quoted attachment.
    pub fn body(&self) -> Option<&str> {
        match &self.content {
            QuotedContent::Text { body, .. } => Some(body),
            QuotedContent::Attachment { caption, .. } => caption.as_deref(),
            _ => None,
        }
    }

    pub fn body_ranges(&self) -> Option<&MessageBodyRanges> {
        match &self.content {
            QuotedContent::Text { body_ranges, .. }
            | QuotedContent::Attachment { body_ranges, .. } => body_ranges.as_ref(),
            _ => None,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content
            .attachment()
            .and_then(|a| a.content_type.as_deref())
    }

    pub fn source_filename(&self) -> Option<&str> {
        self.content
            .attachment()
            .and_then(|a| a.source_filename.as_deref())
    }

    pub fn attachment_stream(&self) -> Option<&AttachmentStream> {
        self.content.attachment().and_then(QuotedAttachment::stream)
    }

    pub fn failed_thumbnail_pointer(&self) -> Option<&AttachmentPointer> {
        self.content
            .attachment()
            .and_then(QuotedAttachment::failed_thumbnail_pointer)
    }

    pub fn sticker(&self) -> Option<&StickerInfo> {
        match &self.content {
            QuotedContent::Sticker { sticker, .. } => Some(sticker),
            _ => None,
        }
    }

    pub fn contact_display_name(&self) -> Option<&str> {
        match &self.content {
            QuotedContent::ContactShare { display_name } => Some(display_name),
            _ => None,
        }
    }

    /// Preview of the local attachment, decoded on first call and cached.
    ///
    /// Returns `None` when there is no local stream or it is not a decodable
    /// image.  The result is never written anywhere.
    pub fn thumbnail_image(&self) -> Option<Arc<DynamicImage>> {
        self.thumbnail
            .get_or_init(|| {
                self.attachment_stream()
                    .and_then(|stream| quote_thumbnail(stream, self.thumbnail_max_dimension))
                    .map(Arc::new)
            })
            .clone()
    }
}

// The thumbnail cache is derived state and does not take part in equality.
impl PartialEq for QuotedReply {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.author == other.author
            && self.is_remotely_sourced == other.is_remotely_sourced
            && self.content == other.content
    }
}

impl Eq for QuotedReply {}
