use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid sticker reference: {0}")]
    InvalidSticker(String),

    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("UUID error: {0}")]
    Uuid(#[from] uuid::Error),
}
