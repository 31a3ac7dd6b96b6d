use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{HubError, HubResult};

/// Local directory that downloaded models are written into.
///
/// Layout: `<root>/<org>/<repo>/<files>`, e.g.
/// `./models/Qwen/Qwen2.5-1.5B-Instruct/config.json`.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    /// Open a store rooted at the given directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> HubResult<Self> {
        let root = expand_tilde(&root.into());
        if root.exists() && !root.is_dir() {
            return Err(HubError::InvalidOutputDir(format!(
                "{} exists and is not a directory",
                root.display()
            )));
        }
        std::fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "Model store ready");
        Ok(Self { root })
    }

    /// Directory holding the snapshot of `repo_id`.
    pub fn model_dir(&self, repo_id: &str) -> PathBuf {
        repo_id
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |dir, part| dir.join(part))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    path.to_path_buf()
}
