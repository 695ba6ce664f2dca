//! Quote snapshot construction.
//!
//! [`QuoteResolver`] is the entry point for building a [`QuotedReply`].
//! It accepts three kinds of input, which all go through the same build:
//!
//! - a stored message id, used to display a quote of a message we hold;
//! - a [`QuotableItem`], used for content being composed;
//! - a reply's stored [`QuotedMessageRecord`], used when the original may
//!   only be known through the peer's quote block.
//!
//! Every lookup goes through the caller's read transaction, so one snapshot
//! reflects one consistent view of the store.

use tracing::{debug, warn};

use parley_shared::constants::DEFAULT_STICKER_MIME;
use parley_shared::types::MessageId;
use parley_store::QuotedMessageRecord;

use crate::attachment::{AttachmentResolver, ResolvedAttachment};
use crate::config::QuoteConfig;
use crate::error::{QuoteError, Result};
use crate::item::QuotableItem;
use crate::reply::{QuotedAttachment, QuotedAttachmentState, QuotedContent, QuotedReply};
use crate::source::{classify, classify_record, ClassifiedQuote, QuoteSource};
use crate::store::QuoteStore;

#[derive(Debug, Clone, Default)]
pub struct QuoteResolver {
    config: QuoteConfig,
}

impl QuoteResolver {
    pub fn new(config: QuoteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// Quote a message held in the store.
    pub fn quoted_reply_for_message<S>(&self, id: MessageId, store: &S) -> Result<QuotedReply>
    where
        S: QuoteStore + ?Sized,
    {
        let message = store
            .message(id)?
            .ok_or(QuoteError::MessageNotFound(id))?;
        self.quoted_reply_for_item(&message, store)
    }

    /// Quote a stored message or a pending composition item.
    pub fn quoted_reply_for_item<I, S>(&self, item: &I, store: &S) -> Result<QuotedReply>
    where
        I: QuotableItem + ?Sized,
        S: QuoteStore + ?Sized,
    {
        let source = classify(item, store)?;
        self.build(
            ClassifiedQuote {
                timestamp: item.timestamp(),
                author: item.author().clone(),
                is_remotely_sourced: false,
                source,
            },
            store,
        )
    }

    /// Rebuild the quote a reply carries.
    ///
    /// If the original is in the store, it is quoted as it is now.
    /// Otherwise the record's own fields are used, and the quote counts as
    /// remotely sourced unless we authored the original.
    pub fn quoted_reply_for_record<S>(
        &self,
        record: &QuotedMessageRecord,
        store: &S,
    ) -> Result<QuotedReply>
    where
        S: QuoteStore + ?Sized,
    {
        if let Some(original) = store.message_by_timestamp(record.timestamp, &record.author)? {
            debug!(
                timestamp = record.timestamp,
                message = %original.id,
                "quoted original found locally"
            );
            return self.quoted_reply_for_item(&original, store);
        }

        let source = classify_record(record)?;
        let is_remotely_sourced = !self.config.is_local(&record.author);
        self.build(
            ClassifiedQuote {
                timestamp: record.timestamp,
                author: record.author.clone(),
                is_remotely_sourced,
                source,
            },
            store,
        )
    }

    /// Freeze a classified quote into a snapshot.
    ///
    /// Fails only with [`QuoteError::EmptyQuoteSource`] for a blank text
    /// quote, or when the store itself fails.
    pub fn build<S>(&self, quote: ClassifiedQuote, store: &S) -> Result<QuotedReply>
    where
        S: QuoteStore + ?Sized,
    {
        let resolver = AttachmentResolver::new(store);

        let content = match quote.source {
            QuoteSource::PlainText { body, body_ranges } => {
                if body.trim().is_empty() {
                    return Err(QuoteError::EmptyQuoteSource);
                }
                QuotedContent::Text { body, body_ranges }
            }
            QuoteSource::AttachmentWithCaption {
                attachment_id,
                caption,
                body_ranges,
                content_type,
                source_filename,
            } => {
                let resolved = resolver.resolve_opt(attachment_id)?;
                QuotedContent::Attachment {
                    caption,
                    body_ranges,
                    attachment: quoted_attachment(resolved, content_type, source_filename),
                }
            }
            QuoteSource::Sticker {
                sticker,
                attachment_id,
            } => {
                let resolved = resolver.resolve_opt(attachment_id)?;
                let mut attachment = quoted_attachment(resolved, None, None);
                if attachment.content_type.is_none() {
                    let installed = store.installed_sticker(&sticker)?;
                    attachment.content_type = Some(
                        installed
                            .map(|s| s.content_type)
                            .unwrap_or_else(|| DEFAULT_STICKER_MIME.to_string()),
                    );
                }
                QuotedContent::Sticker {
                    sticker,
                    attachment,
                }
            }
            QuoteSource::ContactShare { display_name } => {
                QuotedContent::ContactShare { display_name }
            }
            QuoteSource::RemotelyDeleted => QuotedContent::RemotelyDeleted,
            QuoteSource::ViewOnceExpired => QuotedContent::ViewOnceExpired,
        };

        let reply = QuotedReply::new(
            quote.timestamp,
            quote.author,
            quote.is_remotely_sourced,
            content,
            self.config.thumbnail_max_dimension,
        );

        if let Some(pointer) = reply.failed_thumbnail_pointer() {
            warn!(
                timestamp = reply.timestamp(),
                attachment = %pointer.id,
                "Quoted attachment thumbnail unavailable, earlier download failed"
            );
        }
        debug!(
            timestamp = reply.timestamp(),
            author = %reply.author(),
            shape = %reply.shape(),
            remote = reply.is_remotely_sourced(),
            "built quoted reply"
        );
        Ok(reply)
    }
}

/// Metadata from the resolved record wins over hints carried by the quote.
fn quoted_attachment(
    resolved: ResolvedAttachment,
    content_type: Option<String>,
    source_filename: Option<String>,
) -> QuotedAttachment {
    let content_type = resolved.content_type().map(str::to_string).or(content_type);
    let source_filename = resolved
        .source_filename()
        .map(str::to_string)
        .or(source_filename);

    let state = match resolved {
        ResolvedAttachment::Stream(stream) => QuotedAttachmentState::Stream(stream),
        ResolvedAttachment::FailedPointer(pointer) => QuotedAttachmentState::FailedThumbnail(pointer),
        ResolvedAttachment::Missing { .. } => QuotedAttachmentState::Unavailable,
    };

    QuotedAttachment {
        content_type,
        source_filename,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::PendingItem;
    use crate::reply::QuoteShape;
    use parley_shared::types::{
        AttachmentId, BodyRange, BodyRangeStyle, ContactShare, MessageBodyRanges,
        MessageSticker, ServiceAddress, StickerInfo, ThreadId,
    };
    use parley_store::{
        Attachment, AttachmentPointer, AttachmentStream, Database, InstalledSticker, Message,
        PointerState,
    };

    fn address() -> ServiceAddress {
        ServiceAddress::new(uuid::Uuid::new_v4())
    }

    fn jpeg_stream() -> AttachmentStream {
        AttachmentStream {
            id: AttachmentId::new(),
            content_type: "image/jpeg".into(),
            source_filename: Some("photo.jpg".into()),
            byte_count: 3,
            local_path: "/nonexistent/photo.jpg".into(),
            digest: [7; 32],
        }
    }

    fn image_message(author: &ServiceAddress, attachment: AttachmentId) -> Message {
        let mut msg = Message::incoming(ThreadId::new(), 1000, author.clone());
        msg.body = Some("hello".into());
        msg.attachment_ids = vec![attachment];
        msg
    }

    #[test]
    fn test_downloaded_image_quote() {
        let mut db = Database::open_in_memory().unwrap();
        let author = address();
        let stream = jpeg_stream();
        db.insert_attachment(&Attachment::Stream(stream.clone()))
            .unwrap();
        let msg = image_message(&author, stream.id);
        db.insert_message(&msg).unwrap();

        let tx = db.read().unwrap();
        let reply = QuoteResolver::default()
            .quoted_reply_for_message(msg.id, &tx)
            .unwrap();

        assert_eq!(reply.timestamp(), 1000);
        assert_eq!(reply.author(), &author);
        assert_eq!(reply.body(), Some("hello"));
        assert_eq!(reply.content_type(), Some("image/jpeg"));
        assert_eq!(reply.attachment_stream(), Some(&stream));
        assert!(reply.failed_thumbnail_pointer().is_none());
        assert!(!reply.is_remotely_sourced());
    }

    #[test]
    fn test_failed_thumbnail_quote() {
        let mut db = Database::open_in_memory().unwrap();
        let author = address();
        let pointer = AttachmentPointer {
            id: AttachmentId::new(),
            content_type: "image/jpeg".into(),
            source_filename: None,
            byte_count: 3,
            cdn_key: "cdn/photo".into(),
            state: PointerState::Failed,
        };
        db.insert_attachment(&Attachment::Pointer(pointer.clone()))
            .unwrap();
        let msg = image_message(&author, pointer.id);
        db.insert_message(&msg).unwrap();

        let tx = db.read().unwrap();
        let reply = QuoteResolver::default()
            .quoted_reply_for_message(msg.id, &tx)
            .unwrap();

        assert!(reply.attachment_stream().is_none());
        assert_eq!(reply.failed_thumbnail_pointer(), Some(&pointer));
        assert_eq!(reply.content_type(), Some("image/jpeg"));
        assert!(reply.thumbnail_image().is_none());
    }

    #[test]
    fn test_missing_attachment_is_representable() {
        let db = Database::open_in_memory().unwrap();
        let tx = db.read().unwrap();
        let item = PendingItem::new(5, address()).with_attachment(AttachmentId::new());

        let reply = QuoteResolver::default()
            .quoted_reply_for_item(&item, &tx)
            .unwrap();

        assert_eq!(reply.shape(), QuoteShape::AttachmentWithCaption);
        assert!(reply.attachment_stream().is_none());
        assert!(reply.failed_thumbnail_pointer().is_none());
        assert!(reply.content_type().is_none());
        assert!(reply.body().is_none());
    }

    #[test]
    fn test_remotely_deleted_quote_is_empty() {
        let mut db = Database::open_in_memory().unwrap();
        let stream = jpeg_stream();
        db.insert_attachment(&Attachment::Stream(stream.clone()))
            .unwrap();
        let mut msg = image_message(&address(), stream.id);
        msg.was_remotely_deleted = true;

        let tx = db.read().unwrap();
        let reply = QuoteResolver::default()
            .quoted_reply_for_item(&msg, &tx)
            .unwrap();

        assert_eq!(reply.shape(), QuoteShape::RemotelyDeleted);
        assert!(reply.body().is_none());
        assert!(reply.body_ranges().is_none());
        assert!(reply.attachment_stream().is_none());
        assert!(reply.failed_thumbnail_pointer().is_none());
    }

    #[test]
    fn test_plain_text_keeps_ranges() {
        let db = Database::open_in_memory().unwrap();
        let tx = db.read().unwrap();
        let mention = uuid::Uuid::new_v4();
        let ranges = MessageBodyRanges::new(vec![
            BodyRange {
                start: 0,
                length: 1,
                style: BodyRangeStyle::Mention(mention),
            },
            BodyRange {
                start: 2,
                length: 5,
                style: BodyRangeStyle::Italic,
            },
        ]);
        let item = PendingItem::new(5, address()).with_body("\u{fffc} there", Some(ranges.clone()));

        let reply = QuoteResolver::default()
            .quoted_reply_for_item(&item, &tx)
            .unwrap();

        assert_eq!(reply.body(), Some("\u{fffc} there"));
        assert_eq!(reply.body_ranges(), Some(&ranges));
        assert!(reply.content_type().is_none());
    }

    #[test]
    fn test_blank_text_fails() {
        let db = Database::open_in_memory().unwrap();
        let tx = db.read().unwrap();
        let resolver = QuoteResolver::default();

        let item = PendingItem::new(5, address()).with_body(" \n", None);
        assert!(matches!(
            resolver.quoted_reply_for_item(&item, &tx),
            Err(QuoteError::EmptyQuoteSource)
        ));

        let classified = ClassifiedQuote {
            timestamp: 5,
            author: address(),
            is_remotely_sourced: false,
            source: QuoteSource::PlainText {
                body: "\t".into(),
                body_ranges: None,
            },
        };
        assert!(matches!(
            resolver.build(classified, &tx),
            Err(QuoteError::EmptyQuoteSource)
        ));
    }

    #[test]
    fn test_unknown_message_id() {
        let db = Database::open_in_memory().unwrap();
        let tx = db.read().unwrap();
        let id = MessageId::new();

        assert!(matches!(
            QuoteResolver::default().quoted_reply_for_message(id, &tx),
            Err(QuoteError::MessageNotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn test_sticker_content_type_falls_back_to_installed_pack() {
        let mut db = Database::open_in_memory().unwrap();
        let info = StickerInfo {
            pack_id: [9; 16],
            pack_key: [8; 32],
            sticker_id: 4,
        };
        db.install_sticker(&InstalledSticker {
            info,
            content_type: "image/png".into(),
            emoji: Some("👍".into()),
            local_path: "/stickers/4.png".into(),
        })
        .unwrap();

        let item = PendingItem::new(5, address()).with_sticker(MessageSticker {
            info,
            attachment_id: AttachmentId::new(),
            emoji: None,
        });

        let tx = db.read().unwrap();
        let reply = QuoteResolver::default()
            .quoted_reply_for_item(&item, &tx)
            .unwrap();

        assert_eq!(reply.shape(), QuoteShape::Sticker);
        assert_eq!(reply.sticker(), Some(&info));
        assert_eq!(reply.content_type(), Some("image/png"));
        assert!(reply.body().is_none());

        let mut other = item.clone();
        if let Some(sticker) = other.sticker.as_mut() {
            sticker.info.sticker_id = 99;
        }
        let reply = QuoteResolver::default()
            .quoted_reply_for_item(&other, &tx)
            .unwrap();
        assert_eq!(reply.content_type(), Some(DEFAULT_STICKER_MIME));
    }

    #[test]
    fn test_text_reaches_wire_untrimmed() {
        let db = Database::open_in_memory().unwrap();
        let tx = db.read().unwrap();
        let ranges = MessageBodyRanges::new(vec![BodyRange {
            start: 2,
            length: 5,
            style: BodyRangeStyle::Bold,
        }]);
        let item = PendingItem::new(5, address()).with_body("  hello\n", Some(ranges.clone()));

        let wire = QuoteResolver::default()
            .quoted_reply_for_item(&item, &tx)
            .unwrap()
            .to_wire();

        assert_eq!(wire.body.as_deref(), Some("  hello\n"));
        assert_eq!(wire.body_ranges, Some(ranges));
    }

    #[test]
    fn test_contentless_quotes_reach_wire_empty() {
        let mut db = Database::open_in_memory().unwrap();
        let resolver = QuoteResolver::default();

        let contact = PendingItem::new(5, address())
            .with_body("see attached", None)
            .with_contact_share(ContactShare {
                display_name: " Bob ".into(),
                phone_numbers: vec!["+15550100".into()],
                avatar_attachment_id: None,
            });

        let photo = jpeg_stream();
        db.insert_attachment(&Attachment::Stream(photo.clone()))
            .unwrap();
        let mut viewed = image_message(&address(), photo.id);
        viewed.is_view_once = true;
        viewed.is_view_once_complete = true;

        let webp = AttachmentStream {
            content_type: "image/webp".into(),
            source_filename: None,
            ..jpeg_stream()
        };
        db.insert_attachment(&Attachment::Stream(webp.clone()))
            .unwrap();
        let sticker = PendingItem::new(6, address()).with_sticker(MessageSticker {
            info: StickerInfo {
                pack_id: [2; 16],
                pack_key: [3; 32],
                sticker_id: 1,
            },
            attachment_id: webp.id,
            emoji: None,
        });

        let tx = db.read().unwrap();
        let contact = resolver.quoted_reply_for_item(&contact, &tx).unwrap();
        let viewed = resolver.quoted_reply_for_item(&viewed, &tx).unwrap();
        let sticker = resolver.quoted_reply_for_item(&sticker, &tx).unwrap();

        assert_eq!(contact.shape(), QuoteShape::ContactShare);
        assert_eq!(viewed.shape(), QuoteShape::ViewOnceExpired);
        assert_eq!(sticker.shape(), QuoteShape::Sticker);
        assert_eq!(sticker.attachment_stream(), Some(&webp));

        for reply in [&contact, &viewed, &sticker] {
            let wire = reply.to_wire();
            assert!(wire.body.is_none(), "{} carried a body", reply.shape());
            assert!(wire.body_ranges.is_none());
            assert!(wire.attachment.is_none(), "{} carried an attachment", reply.shape());
        }
        assert_eq!(sticker.to_wire().content_type.as_deref(), Some("image/webp"));
        assert!(viewed.to_wire().content_type.is_none());
    }

    #[test]
    fn test_record_with_local_original_is_not_remote() {
        let mut db = Database::open_in_memory().unwrap();
        let author = address();
        let mut original = Message::incoming(ThreadId::new(), 1000, author.clone());
        original.body = Some("current text".into());
        db.insert_message(&original).unwrap();

        let record = QuotedMessageRecord {
            timestamp: 1000,
            author,
            body: Some("text as quoted".into()),
            body_ranges: None,
            content_type: None,
            source_filename: None,
            thumbnail_attachment_id: None,
        };

        let tx = db.read().unwrap();
        let reply = QuoteResolver::default()
            .quoted_reply_for_record(&record, &tx)
            .unwrap();

        assert!(!reply.is_remotely_sourced());
        assert_eq!(reply.body(), Some("current text"));
    }

    #[test]
    fn test_record_without_original_is_remote_unless_ours() {
        let mut db = Database::open_in_memory().unwrap();
        let me = address();
        let thumb = AttachmentPointer {
            id: AttachmentId::new(),
            content_type: "image/jpeg".into(),
            source_filename: None,
            byte_count: 100,
            cdn_key: "cdn/thumb".into(),
            state: PointerState::Failed,
        };
        db.insert_attachment(&Attachment::Pointer(thumb.clone()))
            .unwrap();

        let record = QuotedMessageRecord {
            timestamp: 44,
            author: address(),
            body: None,
            body_ranges: None,
            content_type: Some("image/jpeg".into()),
            source_filename: Some("cat.jpg".into()),
            thumbnail_attachment_id: Some(thumb.id),
        };

        let tx = db.read().unwrap();
        let resolver = QuoteResolver::new(QuoteConfig::default().with_local_address(me.clone()));

        let reply = resolver.quoted_reply_for_record(&record, &tx).unwrap();
        assert!(reply.is_remotely_sourced());
        assert_eq!(reply.source_filename(), Some("cat.jpg"));
        assert_eq!(reply.failed_thumbnail_pointer(), Some(&thumb));

        let ours = QuotedMessageRecord {
            author: me,
            ..record
        };
        let reply = resolver.quoted_reply_for_record(&ours, &tx).unwrap();
        assert!(!reply.is_remotely_sourced());
    }
}
