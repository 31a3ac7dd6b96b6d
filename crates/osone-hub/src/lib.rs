//! # osone-hub
//!
//! Hugging Face side of the OS One model tooling: the fixed alias table, the
//! on-disk layout of downloaded models and snapshot downloads.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use osone_hub::{registry, HubSnapshot, ModelStore, SnapshotRequest, SnapshotSource};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), osone_hub::HubError> {
//!     let repo_id = registry::resolve("qwen-1.5b")?;
//!     let store = ModelStore::new("./models")?;
//!     let request = SnapshotRequest::new(repo_id, store.model_dir(repo_id));
//!     let path = HubSnapshot::new()?.snapshot(&request).await?;
//!     println!("Downloaded to {}", path.display());
//!     Ok(())
//! }
//! ```

pub mod download;
pub mod error;
pub mod registry;
pub mod store;

pub use download::{
    resolve_token, resolve_token_with, HubSnapshot, SnapshotRequest, SnapshotSource, DEFAULT_ALLOW_PATTERNS,
};
pub use error::{HubError, HubResult};
pub use registry::{resolve, ModelEntry, MODELS};
pub use store::ModelStore;
