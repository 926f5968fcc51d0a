//! Pipeline error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("query parse error: {0}")]
    Parse(#[from] qntx_core::parser::ParseError),

    #[error("storage error: {0}")]
    Store(#[from] qntx_core::storage::StoreError),

    #[error("alias store error: {0}")]
    Alias(#[from] qntx_sqlite::SqliteError),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
