//! Storage and lookup of [`Attachment`] records.
//!
//! A row with a `local_path` is a downloaded stream; anything else is a
//! pointer whose `pointer_state` tracks the download.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use parley_shared::constants::DIGEST_SIZE;
use parley_shared::types::AttachmentId;

use crate::database::{column_error, parse_uuid, Database};
use crate::error::{Result, StoreError};
use crate::models::{Attachment, AttachmentPointer, AttachmentStream, PointerState};
use crate::transaction::ReadTransaction;

impl AttachmentStream {
    /// Describe a file already on disk, hashing its contents.
    pub fn from_file(
        path: &Path,
        content_type: impl Into<String>,
        source_filename: Option<String>,
    ) -> Result<Self> {
        let data = std::fs::read(path)?;
        let digest: [u8; DIGEST_SIZE] = *blake3::hash(&data).as_bytes();

        Ok(Self {
            id: AttachmentId::new(),
            content_type: content_type.into(),
            source_filename,
            byte_count: data.len() as u64,
            local_path: path.to_string_lossy().into_owned(),
            digest,
        })
    }
}

impl Database {
    pub fn insert_attachment(&mut self, attachment: &Attachment) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        match attachment {
            Attachment::Stream(s) => {
                self.conn().execute(
                    "INSERT INTO attachments (id, content_type, source_filename, byte_count, local_path, digest, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        s.id.to_string(),
                        s.content_type,
                        s.source_filename,
                        s.byte_count as i64,
                        s.local_path,
                        hex::encode(s.digest),
                        now,
                    ],
                )?;
            }
            Attachment::Pointer(p) => {
                self.conn().execute(
                    "INSERT INTO attachments (id, content_type, source_filename, byte_count, cdn_key, pointer_state, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        p.id.to_string(),
                        p.content_type,
                        p.source_filename,
                        p.byte_count as i64,
                        p.cdn_key,
                        p.state.as_str(),
                        now,
                    ],
                )?;
            }
        }

        tracing::debug!(
            attachment = %attachment.id(),
            downloaded = matches!(attachment, Attachment::Stream(_)),
            "attachment stored"
        );
        Ok(())
    }

    /// Update the download state of a pointer.  Returns `false` if the id
    /// does not name a pointer.
    pub fn set_pointer_state(&mut self, id: AttachmentId, state: PointerState) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE attachments SET pointer_state = ?1 WHERE id = ?2 AND local_path IS NULL",
            params![state.as_str(), id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Turn a pointer into a stream once its bytes have landed on disk.
    pub fn complete_download(&mut self, id: AttachmentId, local_path: &Path) -> Result<()> {
        let data = std::fs::read(local_path)?;
        let digest = blake3::hash(&data);

        let affected = self.conn().execute(
            "UPDATE attachments
             SET local_path = ?1, digest = ?2, byte_count = ?3, pointer_state = NULL, cdn_key = NULL
             WHERE id = ?4",
            params![
                local_path.to_string_lossy(),
                digest.to_hex().to_string(),
                data.len() as i64,
                id.to_string(),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

impl ReadTransaction<'_> {
    pub fn get_attachment(&self, id: AttachmentId) -> Result<Option<Attachment>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, content_type, source_filename, byte_count, local_path, digest, cdn_key, pointer_state
                 FROM attachments
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_attachment,
            )
            .optional()?)
    }
}

fn row_to_attachment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Attachment> {
    let id_str: String = row.get(0)?;
    let content_type: String = row.get(1)?;
    let source_filename: Option<String> = row.get(2)?;
    let byte_count: i64 = row.get(3)?;
    let local_path: Option<String> = row.get(4)?;
    let digest_hex: Option<String> = row.get(5)?;
    let cdn_key: Option<String> = row.get(6)?;
    let state_str: Option<String> = row.get(7)?;

    let id = AttachmentId(parse_uuid(0, &id_str)?);

    if let Some(local_path) = local_path {
        let bytes = hex::decode(digest_hex.unwrap_or_default()).map_err(|e| column_error(5, e))?;
        let digest: [u8; DIGEST_SIZE] = bytes
            .try_into()
            .map_err(|_| column_error(5, invalid_data("digest must be 32 bytes")))?;

        return Ok(Attachment::Stream(AttachmentStream {
            id,
            content_type,
            source_filename,
            byte_count: byte_count as u64,
            local_path,
            digest,
        }));
    }

    let state = state_str
        .as_deref()
        .and_then(PointerState::parse)
        .ok_or_else(|| column_error(7, invalid_data("unknown pointer state")))?;

    Ok(Attachment::Pointer(AttachmentPointer {
        id,
        content_type,
        source_filename,
        byte_count: byte_count as u64,
        cdn_key: cdn_key.unwrap_or_default(),
        state,
    }))
}

fn invalid_data(msg: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(state: PointerState) -> AttachmentPointer {
        AttachmentPointer {
            id: AttachmentId::new(),
            content_type: "image/jpeg".into(),
            source_filename: Some("cat.jpg".into()),
            byte_count: 2048,
            cdn_key: "cdn/abc".into(),
            state,
        }
    }

    #[test]
    fn test_stream_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let stream = AttachmentStream::from_file(&path, "image/jpeg", Some("photo.jpg".into())).unwrap();
        assert_eq!(stream.byte_count, 17);
        assert_eq!(stream.digest, *blake3::hash(b"not really a jpeg").as_bytes());

        let mut db = Database::open_in_memory().unwrap();
        db.insert_attachment(&Attachment::Stream(stream.clone())).unwrap();

        let tx = db.read().unwrap();
        assert_eq!(
            tx.get_attachment(stream.id).unwrap(),
            Some(Attachment::Stream(stream))
        );
    }

    #[test]
    fn test_pointer_state_updates() {
        let mut db = Database::open_in_memory().unwrap();
        let p = pointer(PointerState::Downloading);
        db.insert_attachment(&Attachment::Pointer(p.clone())).unwrap();

        assert!(db.set_pointer_state(p.id, PointerState::Failed).unwrap());

        let tx = db.read().unwrap();
        match tx.get_attachment(p.id).unwrap() {
            Some(Attachment::Pointer(stored)) => assert_eq!(stored.state, PointerState::Failed),
            other => panic!("expected pointer, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_download_turns_pointer_into_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.jpg");
        std::fs::write(&path, [0xFFu8, 0xD8, 0xFF]).unwrap();

        let mut db = Database::open_in_memory().unwrap();
        let p = pointer(PointerState::Downloading);
        db.insert_attachment(&Attachment::Pointer(p.clone())).unwrap();
        db.complete_download(p.id, &path).unwrap();

        let tx = db.read().unwrap();
        match tx.get_attachment(p.id).unwrap() {
            Some(Attachment::Stream(s)) => {
                assert_eq!(s.byte_count, 3);
                assert_eq!(s.source_filename.as_deref(), Some("cat.jpg"));
            }
            other => panic!("expected stream, got {other:?}"),
        }
    }
}
