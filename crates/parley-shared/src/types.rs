use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{STICKER_PACK_ID_SIZE, STICKER_PACK_KEY_SIZE};
use crate::error::SharedError;

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Address of an account on the service.
///
/// The UUID is the stable identity; the phone number is only carried along
/// for legacy peers that still route on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ServiceAddress {
    pub uuid: Uuid,
    pub e164: Option<String>,
}

impl ServiceAddress {
    pub fn new(uuid: Uuid) -> Self {
        Self { uuid, e164: None }
    }

    pub fn with_e164(uuid: Uuid, e164: impl Into<String>) -> Self {
        Self {
            uuid,
            e164: Some(e164.into()),
        }
    }

    /// Two addresses name the same account when their UUIDs match,
    /// regardless of which one happens to carry a phone number.
    pub fn matches(&self, other: &ServiceAddress) -> bool {
        self.uuid == other.uuid
    }
}

impl std::fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

impl FromStr for ServiceAddress {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s.trim())
            .map_err(|e| SharedError::InvalidAddress(format!("{s}: {e}")))?;
        Ok(Self::new(uuid))
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = SharedError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }
    };
}

uuid_id!(
    /// Locally assigned identifier of a stored message.
    MessageId
);
uuid_id!(
    /// Locally assigned identifier of an attachment record.
    AttachmentId
);
uuid_id!(
    /// Conversation a message belongs to.
    ThreadId
);

// ---------------------------------------------------------------------------
// Body ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BodyRangeStyle {
    Mention(Uuid),
    Bold,
    Italic,
    Spoiler,
    Strikethrough,
    Monospace,
}

/// A formatting or mention annotation over `length` UTF-16 code units of the
/// body, starting at `start`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BodyRange {
    pub start: u32,
    pub length: u32,
    pub style: BodyRangeStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageBodyRanges {
    pub ranges: Vec<BodyRange>,
}

impl MessageBodyRanges {
    pub fn new(ranges: Vec<BodyRange>) -> Self {
        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Stickers
// ---------------------------------------------------------------------------

/// Identifies one sticker inside a pack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StickerInfo {
    pub pack_id: [u8; STICKER_PACK_ID_SIZE],
    pub pack_key: [u8; STICKER_PACK_KEY_SIZE],
    pub sticker_id: u32,
}

impl StickerInfo {
    pub fn pack_id_hex(&self) -> String {
        hex::encode(self.pack_id)
    }

    pub fn from_hex(pack_id: &str, pack_key: &str, sticker_id: u32) -> Result<Self, SharedError> {
        let id_bytes = hex::decode(pack_id)?;
        let key_bytes = hex::decode(pack_key)?;

        let pack_id: [u8; STICKER_PACK_ID_SIZE] = id_bytes
            .try_into()
            .map_err(|_| SharedError::InvalidSticker("pack id must be 16 bytes".into()))?;
        let pack_key: [u8; STICKER_PACK_KEY_SIZE] = key_bytes
            .try_into()
            .map_err(|_| SharedError::InvalidSticker("pack key must be 32 bytes".into()))?;

        Ok(Self {
            pack_id,
            pack_key,
            sticker_id,
        })
    }
}

impl std::fmt::Display for StickerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.pack_id_hex(), self.sticker_id)
    }
}

/// Sticker carried by a message, with the attachment holding its image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageSticker {
    pub info: StickerInfo,
    pub attachment_id: AttachmentId,
    pub emoji: Option<String>,
}

// ---------------------------------------------------------------------------
// Contact share
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactShare {
    pub display_name: String,
    pub phone_numbers: Vec<String>,
    pub avatar_attachment_id: Option<AttachmentId>,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Encryption scheme tag of an incoming envelope.
///
/// Peers may introduce new schemes at any time, so every byte value is
/// representable; the constants only name the ones we know.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CipherType(pub u8);

impl CipherType {
    pub const WHISPER: Self = Self(2);
    pub const PRE_KEY: Self = Self(3);
    pub const SENDER_KEY: Self = Self(7);
    pub const PLAINTEXT: Self = Self(8);

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::WHISPER => Some("whisper"),
            Self::PRE_KEY => Some("prekey"),
            Self::SENDER_KEY => Some("sender-key"),
            Self::PLAINTEXT => Some("plaintext"),
            _ => None,
        }
    }
}

impl std::fmt::Display for CipherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "unknown({})", self.0),
        }
    }
}
