//! Snapshot to wire quote.

use parley_shared::protocol::{WireAttachmentRef, WireQuotedMessage};
use parley_shared::types::ThreadId;
use parley_store::{AttachmentStream, OutgoingMessage};

use crate::reply::{QuotedContent, QuotedReply};

impl QuotedReply {
    /// Build the quote block sent with a reply.
    ///
    /// Text and captions are copied verbatim, surrounding whitespace
    /// included, so body ranges keep pointing at the same characters on
    /// the receiving side.  An attachment reference is
    /// included only when the quoted attachment is held locally; the failed
    /// pointer and the thumbnail never leave the device.
    pub fn to_wire(&self) -> WireQuotedMessage {
        let mut wire = WireQuotedMessage::new(self.author().clone(), self.timestamp());

        match self.content() {
            QuotedContent::Text { body, body_ranges } => {
                wire.body = Some(body.clone());
                wire.body_ranges = body_ranges.clone();
            }
            QuotedContent::Attachment {
                caption,
                body_ranges,
                attachment,
            } => {
                wire.body = caption.clone();
                wire.body_ranges = body_ranges.clone();
                wire.content_type = attachment.content_type.clone();
                wire.source_filename = attachment.source_filename.clone();
                wire.attachment = attachment.stream().map(attachment_ref);
            }
            QuotedContent::Sticker { attachment, .. } => {
                wire.content_type = attachment.content_type.clone();
                wire.source_filename = attachment.source_filename.clone();
            }
            QuotedContent::ContactShare { .. }
            | QuotedContent::RemotelyDeleted
            | QuotedContent::ViewOnceExpired => {}
        }

        wire
    }

    /// A text reply quoting this snapshot.
    pub fn reply(&self, thread_id: ThreadId, timestamp: u64, body: impl Into<String>) -> OutgoingMessage {
        OutgoingMessage::text(thread_id, timestamp, body).with_quoted_message(self.to_wire())
    }
}

fn attachment_ref(stream: &AttachmentStream) -> WireAttachmentRef {
    WireAttachmentRef {
        attachment_id: stream.id,
        content_type: stream.content_type.clone(),
        byte_count: stream.byte_count,
        digest: stream.digest,
    }
}
