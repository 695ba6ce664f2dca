//! v001 -- Initial schema creation.
//!
//! Creates the four core tables: `messages`, `attachments`, `stickers`, and
//! `outgoing_messages`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id                    TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    thread_id             TEXT NOT NULL,              -- UUID v4
    timestamp             INTEGER NOT NULL,           -- author's sent-time, ms
    author_uuid           TEXT NOT NULL,
    author_e164           TEXT,
    direction             TEXT NOT NULL,              -- 'incoming' | 'outgoing'
    body                  TEXT,
    body_ranges           TEXT,                       -- JSON MessageBodyRanges
    attachment_ids        TEXT NOT NULL DEFAULT '[]', -- JSON array of UUIDs
    sticker               TEXT,                       -- JSON MessageSticker
    contact_share         TEXT,                       -- JSON ContactShare
    is_view_once          INTEGER NOT NULL DEFAULT 0,
    is_view_once_complete INTEGER NOT NULL DEFAULT 0,
    was_remotely_deleted  INTEGER NOT NULL DEFAULT 0,
    quoted_message        TEXT,                       -- JSON QuotedMessageRecord
    received_at           TEXT NOT NULL               -- ISO-8601
);

CREATE INDEX IF NOT EXISTS idx_messages_ts_author
    ON messages(timestamp, author_uuid);
CREATE INDEX IF NOT EXISTS idx_messages_thread
    ON messages(thread_id, timestamp DESC);

-- ----------------------------------------------------------------
-- Attachments (a row with local_path is a downloaded stream)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS attachments (
    id              TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    content_type    TEXT NOT NULL,
    source_filename TEXT,
    byte_count      INTEGER NOT NULL,
    local_path      TEXT,
    digest          TEXT,                       -- hex BLAKE3, streams only
    cdn_key         TEXT,                       -- pointers only
    pointer_state   TEXT,                       -- pointers only
    created_at      TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Installed stickers
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS stickers (
    pack_id      TEXT NOT NULL,                 -- hex, 16 bytes
    pack_key     TEXT NOT NULL,                 -- hex, 32 bytes
    sticker_id   INTEGER NOT NULL,
    content_type TEXT NOT NULL,
    emoji        TEXT,
    local_path   TEXT NOT NULL,

    PRIMARY KEY (pack_id, sticker_id)
);

-- ----------------------------------------------------------------
-- Outgoing messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS outgoing_messages (
    id         TEXT PRIMARY KEY NOT NULL,       -- UUID v4
    thread_id  TEXT NOT NULL,
    timestamp  INTEGER NOT NULL,
    payload    BLOB NOT NULL,                   -- bincode OutgoingMessage
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_outgoing_thread
    ON outgoing_messages(thread_id, timestamp);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
