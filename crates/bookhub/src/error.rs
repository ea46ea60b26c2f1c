#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] bookhub_core::FilterError),

    #[error("Invalid book reference: {0}")]
    InvalidBookRef(String),
}

impl From<bookhub_core::FetchError> for Error {
    fn from(err: bookhub_core::FetchError) -> Self {
        Error::Network(err.to_string())
    }
}
