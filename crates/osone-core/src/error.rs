use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown quantization '{0}'. Valid values: q4, q8.")]
    InvalidQuantization(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
