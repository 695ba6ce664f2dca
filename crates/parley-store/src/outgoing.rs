//! Persistence of [`OutgoingMessage`]s.
//!
//! The message is stored whole as a bincode payload; the thread and
//! timestamp columns exist for ordering only.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use parley_shared::types::{MessageId, ThreadId};

use crate::database::{column_error, parse_timestamp, parse_uuid};
use crate::error::Result;
use crate::models::{OutgoingMessage, StoredOutgoingMessage};
use crate::transaction::{ReadTransaction, WriteTransaction};

impl WriteTransaction<'_> {
    /// Persist an outgoing message and return its newly assigned id.
    pub fn insert_outgoing_message(&self, message: &OutgoingMessage) -> Result<MessageId> {
        let id = MessageId::new();
        let payload = bincode::serialize(message)?;

        self.conn().execute(
            "INSERT INTO outgoing_messages (id, thread_id, timestamp, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                message.thread_id.to_string(),
                message.timestamp as i64,
                payload,
                Utc::now().to_rfc3339(),
            ],
        )?;

        tracing::debug!(
            msg_id = %id,
            thread = %message.thread_id,
            control = message.resend_request.is_some(),
            "outgoing message stored"
        );
        Ok(id)
    }
}

impl ReadTransaction<'_> {
    pub fn get_outgoing_message(&self, id: MessageId) -> Result<Option<StoredOutgoingMessage>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, payload, created_at FROM outgoing_messages WHERE id = ?1",
                params![id.to_string()],
                row_to_outgoing,
            )
            .optional()?)
    }

    pub fn get_outgoing_for_thread(&self, thread_id: ThreadId) -> Result<Vec<StoredOutgoingMessage>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, payload, created_at
             FROM outgoing_messages
             WHERE thread_id = ?1
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt.query_map(params![thread_id.to_string()], row_to_outgoing)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}

fn row_to_outgoing(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredOutgoingMessage> {
    let id_str: String = row.get(0)?;
    let payload: Vec<u8> = row.get(1)?;
    let created_str: String = row.get(2)?;

    let message: OutgoingMessage = bincode::deserialize(&payload).map_err(|e| column_error(1, e))?;

    Ok(StoredOutgoingMessage {
        id: MessageId(parse_uuid(0, &id_str)?),
        message,
        created_at: parse_timestamp(2, &created_str)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::models::OutgoingMessage;
    use crate::Database;
    use parley_shared::types::ThreadId;

    #[test]
    fn test_uncommitted_write_is_discarded() {
        let mut db = Database::open_in_memory().unwrap();
        let msg = OutgoingMessage::text(ThreadId::new(), 1, "lost");

        let id = {
            let tx = db.write().unwrap();
            tx.insert_outgoing_message(&msg).unwrap()
        };

        let tx = db.read().unwrap();
        assert!(tx.get_outgoing_message(id).unwrap().is_none());
    }

    #[test]
    fn test_committed_write_round_trips() {
        let mut db = Database::open_in_memory().unwrap();
        let thread = ThreadId::new();
        let msg = OutgoingMessage::text(thread, 1, "kept");

        let tx = db.write().unwrap();
        let id = tx.insert_outgoing_message(&msg).unwrap();
        tx.commit().unwrap();

        let tx = db.read().unwrap();
        let stored = tx.get_outgoing_message(id).unwrap().unwrap();
        assert_eq!(stored.message, msg);
        assert_eq!(tx.get_outgoing_for_thread(thread).unwrap().len(), 1);
    }
}
