//! Input adapters for the classifier.
//!
//! Anything that can be quoted exposes the same small surface through
//! [`QuotableItem`]: a stored [`Message`] does so directly, and content that
//! has not been persisted yet is wrapped in a [`PendingItem`].

use parley_shared::types::{
    AttachmentId, ContactShare, MessageBodyRanges, MessageSticker, ServiceAddress,
};
use parley_store::Message;

pub trait QuotableItem {
    /// Sent-time of the item, in milliseconds since the epoch.
    fn timestamp(&self) -> u64;
    fn author(&self) -> &ServiceAddress;
    fn body(&self) -> Option<&str>;
    fn body_ranges(&self) -> Option<&MessageBodyRanges>;
    fn attachment_ids(&self) -> &[AttachmentId];
    fn sticker(&self) -> Option<&MessageSticker>;
    fn contact_share(&self) -> Option<&ContactShare>;

    fn was_remotely_deleted(&self) -> bool {
        false
    }

    fn is_view_once(&self) -> bool {
        false
    }

    fn is_view_once_complete(&self) -> bool {
        false
    }
}

impl QuotableItem for Message {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn author(&self) -> &ServiceAddress {
        &self.author
    }

    fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn body_ranges(&self) -> Option<&MessageBodyRanges> {
        self.body_ranges.as_ref()
    }

    fn attachment_ids(&self) -> &[AttachmentId] {
        &self.attachment_ids
    }

    fn sticker(&self) -> Option<&MessageSticker> {
        self.sticker.as_ref()
    }

    fn contact_share(&self) -> Option<&ContactShare> {
        self.contact_share.as_ref()
    }

    fn was_remotely_deleted(&self) -> bool {
        self.was_remotely_deleted
    }

    fn is_view_once(&self) -> bool {
        self.is_view_once
    }

    fn is_view_once_complete(&self) -> bool {
        self.is_view_once_complete
    }
}

/// Content being composed that has not been written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub timestamp: u64,
    pub author: ServiceAddress,
    pub body: Option<String>,
    pub body_ranges: Option<MessageBodyRanges>,
    pub attachment_ids: Vec<AttachmentId>,
    pub sticker: Option<MessageSticker>,
    pub contact_share: Option<ContactShare>,
}

impl PendingItem {
    pub fn new(timestamp: u64, author: ServiceAddress) -> Self {
        Self {
            timestamp,
            author,
            body: None,
            body_ranges: None,
            attachment_ids: Vec::new(),
            sticker: None,
            contact_share: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>, ranges: Option<MessageBodyRanges>) -> Self {
        self.body = Some(body.into());
        self.body_ranges = ranges;
        self
    }

    pub fn with_attachment(mut self, id: AttachmentId) -> Self {
        self.attachment_ids.push(id);
        self
    }

    pub fn with_sticker(mut self, sticker: MessageSticker) -> Self {
        self.sticker = Some(sticker);
        self
    }

    pub fn with_contact_share(mut self, contact: ContactShare) -> Self {
        self.contact_share = Some(contact);
        self
    }
}

impl QuotableItem for PendingItem {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn author(&self) -> &ServiceAddress {
        &self.author
    }

    fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn body_ranges(&self) -> Option<&MessageBodyRanges> {
        self.body_ranges.as_ref()
    }

    fn attachment_ids(&self) -> &[AttachmentId] {
        &self.attachment_ids
    }

    fn sticker(&self) -> Option<&MessageSticker> {
        self.sticker.as_ref()
    }

    fn contact_share(&self) -> Option<&ContactShare> {
        self.contact_share.as_ref()
    }
}
