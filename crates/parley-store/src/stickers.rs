//! Installed sticker metadata.

use rusqlite::{params, OptionalExtension};

use parley_shared::types::StickerInfo;

use crate::database::{column_error, Database};
use crate::error::Result;
use crate::models::InstalledSticker;
use crate::transaction::ReadTransaction;

impl Database {
    /// Insert or replace an installed sticker.
    pub fn install_sticker(&mut self, sticker: &InstalledSticker) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO stickers (pack_id, pack_key, sticker_id, content_type, emoji, local_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                sticker.info.pack_id_hex(),
                hex::encode(sticker.info.pack_key),
                sticker.info.sticker_id,
                sticker.content_type,
                sticker.emoji,
                sticker.local_path,
            ],
        )?;
        Ok(())
    }
}

impl ReadTransaction<'_> {
    /// Look up an installed sticker by pack and sticker id.  The pack key is
    /// not part of the identity.
    pub fn get_installed_sticker(&self, info: &StickerInfo) -> Result<Option<InstalledSticker>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT pack_id, pack_key, sticker_id, content_type, emoji, local_path
                 FROM stickers
                 WHERE pack_id = ?1 AND sticker_id = ?2",
                params![info.pack_id_hex(), info.sticker_id],
                row_to_sticker,
            )
            .optional()?)
    }
}

fn row_to_sticker(row: &rusqlite::Row<'_>) -> rusqlite::Result<InstalledSticker> {
    let pack_id: String = row.get(0)?;
    let pack_key: String = row.get(1)?;
    let sticker_id: u32 = row.get(2)?;
    let content_type: String = row.get(3)?;
    let emoji: Option<String> = row.get(4)?;
    let local_path: String = row.get(5)?;

    let info = StickerInfo::from_hex(&pack_id, &pack_key, sticker_id).map_err(|e| column_error(0, e))?;

    Ok(InstalledSticker {
        info,
        content_type,
        emoji,
        local_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_and_lookup() {
        let mut db = Database::open_in_memory().unwrap();
        let info = StickerInfo {
            pack_id: [3u8; 16],
            pack_key: [4u8; 32],
            sticker_id: 12,
        };
        let sticker = InstalledSticker {
            info,
            content_type: "image/webp".into(),
            emoji: Some("🐙".into()),
            local_path: "/tmp/stickers/12.webp".into(),
        };
        db.install_sticker(&sticker).unwrap();

        let tx = db.read().unwrap();
        assert_eq!(tx.get_installed_sticker(&info).unwrap(), Some(sticker));

        let other = StickerInfo { sticker_id: 13, ..info };
        assert!(tx.get_installed_sticker(&other).unwrap().is_none());
    }
}
