//! Attachment resolution.
//!
//! Reports what this device holds for a quoted attachment without touching
//! the network: the decrypted stream, a pointer whose last download failed,
//! or nothing usable yet.  None of these is an error.

use tracing::debug;

use parley_shared::types::AttachmentId;
use parley_store::{Attachment, AttachmentPointer, AttachmentStream, PointerState};

use crate::error::Result;
use crate::store::QuoteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAttachment {
    /// Bytes are on local disk.
    Stream(AttachmentStream),
    /// The last download attempt failed; a retry can be scheduled.
    FailedPointer(AttachmentPointer),
    /// No record, or a download that has not finished.  `pending` carries
    /// the pointer in the latter case so its metadata is not lost.
    Missing { pending: Option<AttachmentPointer> },
}

impl ResolvedAttachment {
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Stream(s) => Some(&s.content_type),
            Self::FailedPointer(p) => Some(&p.content_type),
            Self::Missing { pending } => pending.as_ref().map(|p| p.content_type.as_str()),
        }
    }

    pub fn source_filename(&self) -> Option<&str> {
        match self {
            Self::Stream(s) => s.source_filename.as_deref(),
            Self::FailedPointer(p) => p.source_filename.as_deref(),
            Self::Missing { pending } => pending.as_ref().and_then(|p| p.source_filename.as_deref()),
        }
    }
}

pub struct AttachmentResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: QuoteStore + ?Sized> AttachmentResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve `id`.  Only a failure of the store itself is an error.
    pub fn resolve(&self, id: AttachmentId) -> Result<ResolvedAttachment> {
        let resolved = match self.store.attachment(id)? {
            None => ResolvedAttachment::Missing { pending: None },
            Some(Attachment::Stream(stream)) => ResolvedAttachment::Stream(stream),
            Some(Attachment::Pointer(pointer)) => match pointer.state {
                PointerState::Failed => ResolvedAttachment::FailedPointer(pointer),
                PointerState::Enqueued | PointerState::Downloading | PointerState::PendingApproval => {
                    ResolvedAttachment::Missing {
                        pending: Some(pointer),
                    }
                }
            },
        };

        debug!(attachment = %id, outcome = outcome_name(&resolved), "resolved quoted attachment");
        Ok(resolved)
    }

    /// Resolve an optional reference; no reference resolves to nothing.
    pub fn resolve_opt(&self, id: Option<AttachmentId>) -> Result<ResolvedAttachment> {
        match id {
            Some(id) => self.resolve(id),
            None => Ok(ResolvedAttachment::Missing { pending: None }),
        }
    }
}

fn outcome_name(resolved: &ResolvedAttachment) -> &'static str {
    match resolved {
        ResolvedAttachment::Stream(_) => "stream",
        ResolvedAttachment::FailedPointer(_) => "failed_pointer",
        ResolvedAttachment::Missing { pending: Some(_) } => "pending",
        ResolvedAttachment::Missing { pending: None } => "missing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_store::Database;

    fn pointer(state: PointerState) -> AttachmentPointer {
        AttachmentPointer {
            id: AttachmentId::new(),
            content_type: "video/mp4".into(),
            source_filename: Some("clip.mp4".into()),
            byte_count: 1 << 20,
            cdn_key: "cdn/clip".into(),
            state,
        }
    }

    #[test]
    fn test_pointer_states() {
        let mut db = Database::open_in_memory().unwrap();
        let failed = pointer(PointerState::Failed);
        let downloading = pointer(PointerState::Downloading);
        db.insert_attachment(&Attachment::Pointer(failed.clone())).unwrap();
        db.insert_attachment(&Attachment::Pointer(downloading.clone())).unwrap();

        let tx = db.read().unwrap();
        let resolver = AttachmentResolver::new(&tx);

        assert_eq!(
            resolver.resolve(failed.id).unwrap(),
            ResolvedAttachment::FailedPointer(failed)
        );

        let pending = resolver.resolve(downloading.id).unwrap();
        assert_eq!(pending.content_type(), Some("video/mp4"));
        assert_eq!(
            pending,
            ResolvedAttachment::Missing {
                pending: Some(downloading)
            }
        );
    }

    #[test]
    fn test_unknown_attachment_is_missing_not_error() {
        let db = Database::open_in_memory().unwrap();
        let tx = db.read().unwrap();
        let resolver = AttachmentResolver::new(&tx);

        let resolved = resolver.resolve(AttachmentId::new()).unwrap();
        assert_eq!(resolved, ResolvedAttachment::Missing { pending: None });
        assert!(resolved.content_type().is_none());
        assert_eq!(resolver.resolve_opt(None).unwrap(), resolved);
    }
}
