//! Seams to the store.
//!
//! The quote pipeline only ever reads through [`QuoteStore`]; outgoing
//! messages are handed to a [`MessageWriter`] which assigns ids and persists
//! them.  Transactions are opened and committed by the caller.

use parley_shared::types::{AttachmentId, MessageId, ServiceAddress, StickerInfo};
use parley_store::{
    Attachment, InstalledSticker, Message, OutgoingMessage, ReadTransaction, StoreError,
    WriteTransaction,
};

/// Read-only lookups needed to resolve a quote.
pub trait QuoteStore {
    fn message(&self, id: MessageId) -> Result<Option<Message>, StoreError>;

    fn message_by_timestamp(
        &self,
        timestamp: u64,
        author: &ServiceAddress,
    ) -> Result<Option<Message>, StoreError>;

    fn attachment(&self, id: AttachmentId) -> Result<Option<Attachment>, StoreError>;

    fn installed_sticker(&self, info: &StickerInfo) -> Result<Option<InstalledSticker>, StoreError>;
}

/// Persists fully formed outgoing messages.
pub trait MessageWriter {
    fn insert_outgoing(&mut self, message: &OutgoingMessage) -> Result<MessageId, StoreError>;
}

impl QuoteStore for ReadTransaction<'_> {
    fn message(&self, id: MessageId) -> Result<Option<Message>, StoreError> {
        self.get_message(id)
    }

    fn message_by_timestamp(
        &self,
        timestamp: u64,
        author: &ServiceAddress,
    ) -> Result<Option<Message>, StoreError> {
        self.find_message(timestamp, author)
    }

    fn attachment(&self, id: AttachmentId) -> Result<Option<Attachment>, StoreError> {
        self.get_attachment(id)
    }

    fn installed_sticker(&self, info: &StickerInfo) -> Result<Option<InstalledSticker>, StoreError> {
        self.get_installed_sticker(info)
    }
}

impl MessageWriter for WriteTransaction<'_> {
    fn insert_outgoing(&mut self, message: &OutgoingMessage) -> Result<MessageId, StoreError> {
        self.insert_outgoing_message(message)
    }
}
