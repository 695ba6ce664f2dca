/// MIME type of the attachment carrying an oversize message body
pub const OVERSIZE_TEXT_MIME: &str = "text/x-signal-plain";

/// MIME type assumed for stickers when the pack does not say otherwise
pub const DEFAULT_STICKER_MIME: &str = "image/webp";

/// Longest edge, in pixels, of a quoted-reply thumbnail
pub const DEFAULT_QUOTE_THUMBNAIL_DIMENSION: u32 = 200;

/// Sticker pack identifier size in bytes
pub const STICKER_PACK_ID_SIZE: usize = 16;

/// Sticker pack key size in bytes
pub const STICKER_PACK_KEY_SIZE: usize = 32;

/// BLAKE3 digest size in bytes
pub const DIGEST_SIZE: usize = 32;
