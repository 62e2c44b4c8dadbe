use thiserror::Error;

pub type Result<T> = std::result::Result<T, NebulaError>;

#[derive(Debug, Error)]
pub enum NebulaError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for NebulaError {
    fn from(err: reqwest::Error) -> Self {
        NebulaError::Network(err.to_string())
    }
}
