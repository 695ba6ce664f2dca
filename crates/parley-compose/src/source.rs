//! Quote source classification.
//!
//! Decides which content shape a quote takes.  The checks run in priority
//! order and the first match wins:
//!
//! 1. remotely deleted
//! 2. view-once, already viewed
//! 3. sticker
//! 4. contact share
//! 5. attachment, with the body as optional caption
//! 6. plain text
//!
//! Deletion and view-once expiry come first so that no content of a message
//! the user can no longer see leaks into a quote.

use tracing::debug;

use parley_shared::constants::OVERSIZE_TEXT_MIME;
use parley_shared::types::{AttachmentId, MessageBodyRanges, ServiceAddress, StickerInfo};
use parley_store::{Attachment, QuotedMessageRecord};

use crate::error::{QuoteError, Result};
use crate::item::QuotableItem;
use crate::reply::QuoteShape;
use crate::store::QuoteStore;

/// What a quote is made of, with only the fields its shape needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteSource {
    PlainText {
        body: String,
        body_ranges: Option<MessageBodyRanges>,
    },
    AttachmentWithCaption {
        attachment_id: Option<AttachmentId>,
        caption: Option<String>,
        body_ranges: Option<MessageBodyRanges>,
        /// Known when the quote came from a stored reference rather than
        /// from a message we can inspect.
        content_type: Option<String>,
        source_filename: Option<String>,
    },
    Sticker {
        sticker: StickerInfo,
        attachment_id: Option<AttachmentId>,
    },
    ContactShare {
        display_name: String,
    },
    RemotelyDeleted,
    ViewOnceExpired,
}

impl QuoteSource {
    pub fn shape(&self) -> QuoteShape {
        match self {
            Self::PlainText { .. } => QuoteShape::PlainText,
            Self::AttachmentWithCaption { .. } => QuoteShape::AttachmentWithCaption,
            Self::Sticker { .. } => QuoteShape::Sticker,
            Self::ContactShare { .. } => QuoteShape::ContactShare,
            Self::RemotelyDeleted => QuoteShape::RemotelyDeleted,
            Self::ViewOnceExpired => QuoteShape::ViewOnceExpired,
        }
    }
}

/// A classified quote together with the identity of the quoted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedQuote {
    pub timestamp: u64,
    pub author: ServiceAddress,
    /// The content came from a peer's quote block rather than from a
    /// message this device holds.
    pub is_remotely_sourced: bool,
    pub source: QuoteSource,
}

/// Classify a message or composition item.
pub fn classify<I, S>(item: &I, store: &S) -> Result<QuoteSource>
where
    I: QuotableItem + ?Sized,
    S: QuoteStore + ?Sized,
{
    let source = if item.was_remotely_deleted() {
        QuoteSource::RemotelyDeleted
    } else if item.is_view_once() && item.is_view_once_complete() {
        QuoteSource::ViewOnceExpired
    } else if let Some(sticker) = item.sticker() {
        QuoteSource::Sticker {
            sticker: sticker.info,
            attachment_id: Some(sticker.attachment_id),
        }
    } else if let Some(contact) = item.contact_share() {
        QuoteSource::ContactShare {
            display_name: contact.display_name.trim().to_string(),
        }
    } else if let Some(attachment_id) = primary_attachment(item.attachment_ids(), store)? {
        let caption = non_blank(item.body());
        QuoteSource::AttachmentWithCaption {
            attachment_id: Some(attachment_id),
            body_ranges: caption.and(present_ranges(item.body_ranges())),
            caption: caption.map(str::to_string),
            content_type: None,
            source_filename: None,
        }
    } else {
        plain_text(item.body(), item.body_ranges())?
    };

    debug!(
        timestamp = item.timestamp(),
        author = %item.author(),
        shape = %source.shape(),
        "classified quote source"
    );
    Ok(source)
}

/// Classify a stored quote reference whose original is not available.
///
/// The record is flat, so only two shapes can be recovered from it: an
/// attachment (when it names one) or plain text.
pub fn classify_record(record: &QuotedMessageRecord) -> Result<QuoteSource> {
    let names_attachment =
        record.thumbnail_attachment_id.is_some() || record.content_type.is_some();

    let source = if names_attachment {
        let caption = non_blank(record.body.as_deref());
        QuoteSource::AttachmentWithCaption {
            attachment_id: record.thumbnail_attachment_id,
            body_ranges: caption.and(present_ranges(record.body_ranges.as_ref())),
            caption: caption.map(str::to_string),
            content_type: record.content_type.clone(),
            source_filename: record.source_filename.clone(),
        }
    } else {
        plain_text(record.body.as_deref(), record.body_ranges.as_ref())?
    };

    debug!(
        timestamp = record.timestamp,
        author = %record.author,
        shape = %source.shape(),
        "classified stored quote reference"
    );
    Ok(source)
}

/// First attachment that is real media.  Oversize-text attachments only
/// carry the rest of a long body and are skipped.  An id with no record is
/// still the primary attachment: it names content we have not received.
fn primary_attachment<S: QuoteStore + ?Sized>(
    ids: &[AttachmentId],
    store: &S,
) -> Result<Option<AttachmentId>> {
    for &id in ids {
        match store.attachment(id)? {
            Some(attachment) if is_oversize_text(&attachment) => continue,
            _ => return Ok(Some(id)),
        }
    }
    Ok(None)
}

fn is_oversize_text(attachment: &Attachment) -> bool {
    attachment.content_type() == OVERSIZE_TEXT_MIME
}

fn plain_text(body: Option<&str>, ranges: Option<&MessageBodyRanges>) -> Result<QuoteSource> {
    match non_blank(body) {
        Some(body) => Ok(QuoteSource::PlainText {
            body: body.to_string(),
            body_ranges: present_ranges(ranges),
        }),
        None => Err(QuoteError::EmptyQuoteSource),
    }
}

/// The body, untouched, if it has any non-whitespace content.
///
/// Blankness is judged on the trimmed text, but the body itself is kept
/// verbatim all the way to the wire: body ranges are offsets into the
/// original text and would point at the wrong characters after trimming.
fn non_blank(body: Option<&str>) -> Option<&str> {
    body.filter(|b| !b.trim().is_empty())
}

/// An empty range list says nothing and is sent as absent.
fn present_ranges(ranges: Option<&MessageBodyRanges>) -> Option<MessageBodyRanges> {
    ranges.filter(|r| !r.is_empty()).cloned()
}
