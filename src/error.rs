use thiserror::Error;

use crate::model::ItemId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),
    #[error("Invalid collection data: {0}")]
    InvalidData(#[from] serde_json::Error),
    #[error("Invalid manifest: {0}")]
    InvalidManifest(toml::de::Error),
    #[error("Item {0} not found")]
    ItemNotFound(ItemId),
    #[error("Item {0} already exists")]
    DuplicateId(ItemId),
    #[error("Post '{0}' not found")]
    PostNotFound(String),
    #[error("Portfolio not found")]
    PortfolioNotFound,
    #[error("Portfolio already exists")]
    PortfolioAlreadyExists,
}
