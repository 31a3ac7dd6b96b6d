//! Required-file verification for downloaded and converted model directories.
//!
//! A directory passes when every entry of its [`RequiredFileSet`] is
//! satisfied. The primary weights file may be replaced by shards
//! (`model-00001-of-00003.safetensors`, ...); the check looks for the exact
//! name first and only then falls back to the shard pattern.

use std::path::Path;

use tracing::debug;

use crate::estimate::has_safetensors_ext;

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const PRIMARY_WEIGHTS: &str = "model.safetensors";
const SHARD_PREFIX: &str = "model";
const WEIGHTS_LABEL: &str = "*.safetensors";

/// Which checklist a directory is held against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredFileSet {
    /// Raw Hugging Face snapshot: `config.json`, `tokenizer.json`,
    /// `model.safetensors` (or shards).
    Download,
    /// MLX conversion output: `config.json`, `tokenizer.json` and at least
    /// one `*.safetensors` file.
    Converted,
}

impl RequiredFileSet {
    /// Exact filenames that must be present, in report order.
    pub fn required_files(&self) -> &'static [&'static str] {
        match self {
            Self::Download => &[CONFIG_FILE, TOKENIZER_FILE, PRIMARY_WEIGHTS],
            Self::Converted => &[CONFIG_FILE, TOKENIZER_FILE],
        }
    }

    fn needs_weights_aggregate(&self) -> bool {
        matches!(self, Self::Converted)
    }
}

/// Outcome of a single requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// The exact file exists.
    Found { size_bytes: u64 },
    /// `model.safetensors` is absent but `model*.safetensors` shards exist.
    Sharded { shard_count: usize, total_bytes: u64 },
    /// Aggregate `*.safetensors` requirement satisfied.
    Weights { file_count: usize, total_bytes: u64 },
    Missing,
}

impl CheckStatus {
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    pub name: String,
    pub status: CheckStatus,
}

impl FileCheck {
    pub fn is_satisfied(&self) -> bool {
        self.status.is_satisfied()
    }
}

/// Per-requirement results plus the overall verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub file_set: RequiredFileSet,
    pub checks: Vec<FileCheck>,
}

impl VerificationReport {
    /// `true` iff every requirement is satisfied.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(FileCheck::is_satisfied)
    }

    /// Names of unsatisfied requirements in checklist order.
    pub fn missing(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.is_satisfied())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn check(&self, name: &str) -> Option<&FileCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Check `dir` against `file_set`.
///
/// Never fails: a directory that does not exist simply reports every
/// requirement as missing. Read-only, so repeated calls give the same report
/// for an unchanged directory.
pub fn verify(dir: &Path, file_set: RequiredFileSet) -> VerificationReport {
    let weights = list_safetensors(dir);
    let mut checks = Vec::with_capacity(file_set.required_files().len() + 1);

    for &name in file_set.required_files() {
        let status = match file_size(&dir.join(name)) {
            Some(size_bytes) => CheckStatus::Found { size_bytes },
            None if name == PRIMARY_WEIGHTS => sharded_status(&weights),
            None => CheckStatus::Missing,
        };
        checks.push(FileCheck {
            name: name.to_string(),
            status,
        });
    }

    if file_set.needs_weights_aggregate() {
        let status = if weights.is_empty() {
            CheckStatus::Missing
        } else {
            CheckStatus::Weights {
                file_count: weights.len(),
                total_bytes: weights.iter().map(|(_, len)| len).sum(),
            }
        };
        checks.push(FileCheck {
            name: WEIGHTS_LABEL.to_string(),
            status,
        });
    }

    for check in &checks {
        debug!(dir = %dir.display(), file = %check.name, status = ?check.status, "Verified");
    }

    VerificationReport { file_set, checks }
}

fn sharded_status(weights: &[(String, u64)]) -> CheckStatus {
    let shards: Vec<u64> = weights
        .iter()
        .filter(|(name, _)| is_weights_shard(name))
        .map(|(_, len)| *len)
        .collect();
    if shards.is_empty() {
        CheckStatus::Missing
    } else {
        CheckStatus::Sharded {
            shard_count: shards.len(),
            total_bytes: shards.iter().sum(),
        }
    }
}

/// `model*.safetensors`, e.g. `model-00002-of-00004.safetensors`.
pub fn is_weights_shard(filename: &str) -> bool {
    filename.starts_with(SHARD_PREFIX) && has_safetensors_ext(Path::new(filename))
}

/// Non-recursive `*.safetensors` listing as `(filename, size)`, sorted by name.
fn list_safetensors(dir: &Path) -> Vec<(String, u64)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<(String, u64)> = entries
        .flatten()
        .filter(|e| has_safetensors_ext(&e.path()))
        .filter_map(|e| {
            let size = file_size(&e.path())?;
            Some((e.file_name().to_string_lossy().into_owned(), size))
        })
        .collect();
    files.sort();
    files
}

fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}
