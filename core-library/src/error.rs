use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Invalid chapter: {0} (expected 1..=114)")]
    InvalidChapter(u16),

    #[error("Invalid verse: {chapter}:{verse}")]
    InvalidVerse { chapter: u16, verse: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] BridgeError),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<LibraryError> for BridgeError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Http(inner) => inner,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
