use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnsignError {
    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
