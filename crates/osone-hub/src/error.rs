use hf_hub::api::tokio::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Hugging Face API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown model: {alias}. Choose from [{available}]")]
    UnknownModel { alias: String, available: String },

    #[error("Repository '{repo_id}' requires authentication: {reason}")]
    GatedRepo { repo_id: String, reason: String },

    #[error("Download failed for '{file}': {reason}")]
    DownloadFailed { file: String, reason: String },

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("Invalid output directory: {0}")]
    InvalidOutputDir(String),
}

impl HubError {
    /// `true` for failures caused by a gated or private repository, where a
    /// Hugging Face token is the likely fix.
    pub fn requires_auth(&self) -> bool {
        match self {
            HubError::GatedRepo { .. } => true,
            HubError::Api(e) => api_error_requires_auth(e),
            HubError::DownloadFailed { reason, .. } => reason_mentions_auth(reason),
            _ => false,
        }
    }
}

/// 401/403 responses, or a Hub message about gated access.
pub(crate) fn api_error_requires_auth(err: &ApiError) -> bool {
    match err {
        ApiError::RequestError(e) => e
            .status()
            .is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403),
        other => other.to_string().to_lowercase().contains("gated"),
    }
}

/// Only the failure reason is inspected; filenames like
/// `model-00001-of-00403.safetensors` must not look like a status code.
fn reason_mentions_auth(reason: &str) -> bool {
    let lower = reason.to_lowercase();
    lower.contains("gated")
        || lower.contains("http 401")
        || lower.contains("http 403")
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
}

pub type HubResult<T> = Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gated_repo_requires_auth() {
        let err = HubError::GatedRepo {
            repo_id: "meta-llama/Llama-3.2-1B-Instruct".into(),
            reason: "HTTP 403".into(),
        };
        assert!(err.requires_auth());
    }

    #[test]
    fn download_failure_mentioning_gated_requires_auth() {
        let err = HubError::DownloadFailed {
            file: "config.json".into(),
            reason: "Access to model is restricted. This is a Gated repo".into(),
        };
        assert!(err.requires_auth());
    }

    #[test]
    fn status_in_shard_filename_is_not_an_auth_failure() {
        let err = HubError::DownloadFailed {
            file: "model-00001-of-00403.safetensors".into(),
            reason: "connection reset by peer".into(),
        };
        assert!(!err.requires_auth());
    }

    #[test]
    fn forbidden_reason_requires_auth() {
        let err = HubError::DownloadFailed {
            file: "model-00001-of-00002.safetensors".into(),
            reason: "HTTP 403 Forbidden".into(),
        };
        assert!(err.requires_auth());
    }

    #[test]
    fn plain_failures_do_not_require_auth() {
        let err = HubError::DownloadFailed {
            file: "config.json".into(),
            reason: "connection reset".into(),
        };
        assert!(!err.requires_auth());
        let err = HubError::UnknownModel {
            alias: "x".into(),
            available: "a".into(),
        };
        assert!(!err.requires_auth());
    }
}
