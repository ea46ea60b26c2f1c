use serde::Serialize;

/// Failure while talking to the book service
///
/// Every variant is a network-or-server failure: the caller cannot fix it by
/// changing the request, only by trying again later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    #[error("book service responded with HTTP {status}")]
    Status { status: u16 },

    #[error("could not reach the book service: {message}")]
    Transport { message: String },

    #[error("book service sent an unreadable response: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        FetchError::Decode {
            message: message.into(),
        }
    }
}
