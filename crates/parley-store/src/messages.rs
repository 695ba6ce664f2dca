//! Storage and lookup of [`Message`] records.

use rusqlite::{params, Connection, OptionalExtension};

use parley_shared::types::{AttachmentId, MessageId, ServiceAddress, ThreadId};

use crate::database::{column_error, json_column, parse_timestamp, parse_uuid, to_json_column, Database};
use crate::error::Result;
use crate::models::{Message, MessageDirection};
use crate::transaction::ReadTransaction;

const MESSAGE_COLUMNS: &str = "id, thread_id, timestamp, author_uuid, author_e164, direction, body,
     body_ranges, attachment_ids, sticker, contact_share, is_view_once, is_view_once_complete,
     was_remotely_deleted, quoted_message, received_at";

impl Database {
    pub fn insert_message(&mut self, message: &Message) -> Result<()> {
        let attachment_ids = serde_json::to_string(&message.attachment_ids)?;

        self.conn().execute(
            &format!(
                "INSERT INTO messages ({MESSAGE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                message.id.to_string(),
                message.thread_id.to_string(),
                message.timestamp as i64,
                message.author.uuid.to_string(),
                message.author.e164,
                message.direction.as_str(),
                message.body,
                to_json_column(message.body_ranges.as_ref())?,
                attachment_ids,
                to_json_column(message.sticker.as_ref())?,
                to_json_column(message.contact_share.as_ref())?,
                message.is_view_once as i32,
                message.is_view_once_complete as i32,
                message.was_remotely_deleted as i32,
                to_json_column(message.quoted_message.as_ref())?,
                message.received_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Record that a view-once message has been viewed.
    pub fn mark_view_once_complete(&mut self, id: MessageId) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE messages SET is_view_once_complete = 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Replace a message with its remote-deletion tombstone.  Content
    /// columns are cleared; the row keeps its identity.
    pub fn mark_remotely_deleted(&mut self, id: MessageId) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE messages
             SET was_remotely_deleted = 1, body = NULL, body_ranges = NULL,
                 attachment_ids = '[]', sticker = NULL, contact_share = NULL
             WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

impl ReadTransaction<'_> {
    pub fn get_message(&self, id: MessageId) -> Result<Option<Message>> {
        get_message(self.conn(), id)
    }

    /// Find the message `author` sent at `timestamp`.  This is how quotes
    /// name their target across devices.
    pub fn find_message(&self, timestamp: u64, author: &ServiceAddress) -> Result<Option<Message>> {
        find_message(self.conn(), timestamp, author)
    }
}

fn get_message(conn: &Connection, id: MessageId) -> Result<Option<Message>> {
    Ok(conn
        .query_row(
            &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
            params![id.to_string()],
            row_to_message,
        )
        .optional()?)
}

fn find_message(conn: &Connection, timestamp: u64, author: &ServiceAddress) -> Result<Option<Message>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE timestamp = ?1 AND author_uuid = ?2
                 ORDER BY received_at ASC
                 LIMIT 1"
            ),
            params![timestamp as i64, author.uuid.to_string()],
            row_to_message,
        )
        .optional()?)
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let thread_str: String = row.get(1)?;
    let timestamp: i64 = row.get(2)?;
    let author_uuid: String = row.get(3)?;
    let author_e164: Option<String> = row.get(4)?;
    let direction_str: String = row.get(5)?;
    let body: Option<String> = row.get(6)?;
    let body_ranges: Option<String> = row.get(7)?;
    let attachment_ids: String = row.get(8)?;
    let sticker: Option<String> = row.get(9)?;
    let contact_share: Option<String> = row.get(10)?;
    let is_view_once: i32 = row.get(11)?;
    let is_view_once_complete: i32 = row.get(12)?;
    let was_remotely_deleted: i32 = row.get(13)?;
    let quoted_message: Option<String> = row.get(14)?;
    let received_str: String = row.get(15)?;

    let direction = MessageDirection::parse(&direction_str).ok_or_else(|| {
        column_error(
            5,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown direction {direction_str}"),
            ),
        )
    })?;

    let attachment_ids: Vec<AttachmentId> =
        serde_json::from_str(&attachment_ids).map_err(|e| column_error(8, e))?;

    Ok(Message {
        id: MessageId(parse_uuid(0, &id_str)?),
        thread_id: ThreadId(parse_uuid(1, &thread_str)?),
        timestamp: timestamp as u64,
        author: ServiceAddress {
            uuid: parse_uuid(3, &author_uuid)?,
            e164: author_e164,
        },
        direction,
        body,
        body_ranges: json_column(7, body_ranges)?,
        attachment_ids,
        sticker: json_column(9, sticker)?,
        contact_share: json_column(10, contact_share)?,
        is_view_once: is_view_once != 0,
        is_view_once_complete: is_view_once_complete != 0,
        was_remotely_deleted: was_remotely_deleted != 0,
        quoted_message: json_column(14, quoted_message)?,
        received_at: parse_timestamp(15, &received_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_shared::types::{BodyRange, BodyRangeStyle, MessageBodyRanges};
    use uuid::Uuid;

    fn author() -> ServiceAddress {
        ServiceAddress::with_e164(Uuid::new_v4(), "+15550100")
    }

    #[test]
    fn test_insert_and_find_by_timestamp_and_author() {
        let mut db = Database::open_in_memory().unwrap();
        let alice = author();

        let mut msg = Message::incoming(ThreadId::new(), 1000, alice.clone());
        msg.body = Some("hello".into());
        msg.body_ranges = Some(MessageBodyRanges::new(vec![BodyRange {
            start: 0,
            length: 5,
            style: BodyRangeStyle::Italic,
        }]));
        msg.attachment_ids = vec![AttachmentId::new()];
        db.insert_message(&msg).unwrap();

        let tx = db.read().unwrap();
        let found = tx.find_message(1000, &alice).unwrap().expect("message");
        assert_eq!(found.id, msg.id);
        assert_eq!(found.body_ranges, msg.body_ranges);
        assert_eq!(found.attachment_ids, msg.attachment_ids);
        assert_eq!(found.author, alice);

        assert!(tx.find_message(1001, &alice).unwrap().is_none());
        assert!(tx.find_message(1000, &author()).unwrap().is_none());
    }

    #[test]
    fn test_remote_delete_clears_content() {
        let mut db = Database::open_in_memory().unwrap();
        let mut msg = Message::incoming(ThreadId::new(), 5, author());
        msg.body = Some("oops".into());
        db.insert_message(&msg).unwrap();

        assert!(db.mark_remotely_deleted(msg.id).unwrap());

        let tx = db.read().unwrap();
        let stored = tx.get_message(msg.id).unwrap().unwrap();
        assert!(stored.was_remotely_deleted);
        assert!(stored.body.is_none());
    }

    #[test]
    fn test_view_once_completion_and_direction() {
        let mut db = Database::open_in_memory().unwrap();
        let thread = ThreadId::new();

        let mut photo = Message::incoming(thread, 10, author());
        photo.is_view_once = true;
        photo.attachment_ids = vec![AttachmentId::new()];
        db.insert_message(&photo).unwrap();
        let sent = Message::outgoing(thread, 20, author());
        db.insert_message(&sent).unwrap();

        assert!(db.mark_view_once_complete(photo.id).unwrap());
        assert!(!db.mark_view_once_complete(MessageId::new()).unwrap());

        let tx = db.read().unwrap();
        let photo = tx.get_message(photo.id).unwrap().unwrap();
        assert!(photo.is_view_once_complete);
        assert_eq!(photo.attachment_ids.len(), 1);
        let sent = tx.get_message(sent.id).unwrap().unwrap();
        assert_eq!(sent.direction, MessageDirection::Outgoing);
    }

    #[test]
    fn test_missing_message_is_none() {
        let db = Database::open_in_memory().unwrap();
        let tx = db.read().unwrap();
        assert!(tx.get_message(MessageId::new()).unwrap().is_none());
    }
}
