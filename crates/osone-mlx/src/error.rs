use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("mlx-lm is not available to '{python}': {reason}\nInstall with: pip install mlx-lm")]
    BackendMissing { python: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{program}' exited with {status}")]
    ProcessFailed { program: String, status: String },
}

pub type ConvertResult<T> = Result<T, ConvertError>;
