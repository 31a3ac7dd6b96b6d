//! Fixed table of downloadable models, keyed by short alias.

use crate::error::{HubError, HubResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    pub alias: &'static str,
    pub repo_id: &'static str,
    pub description: &'static str,
}

pub const MODELS: &[ModelEntry] = &[
    ModelEntry {
        alias: "qwen-1.5b",
        repo_id: "Qwen/Qwen2.5-1.5B-Instruct",
        description: "Qwen 2.5 1.5B Instruct (~1.1 GB)",
    },
    ModelEntry {
        alias: "qwen-3b",
        repo_id: "Qwen/Qwen2.5-3B-Instruct",
        description: "Qwen 2.5 3B Instruct (~2.0 GB)",
    },
    ModelEntry {
        alias: "gemma-2b",
        repo_id: "google/gemma-2-2b-it",
        description: "Google Gemma 2 2B (~1.5 GB)",
    },
    ModelEntry {
        alias: "llama-1b",
        repo_id: "meta-llama/Llama-3.2-1B-Instruct",
        description: "Meta Llama 3.2 1B (~0.9 GB)",
    },
    ModelEntry {
        alias: "llama-3b",
        repo_id: "meta-llama/Llama-3.2-3B-Instruct",
        description: "Meta Llama 3.2 3B (~2.1 GB)",
    },
];

/// Map a short alias (e.g. `qwen-1.5b`) to its Hugging Face repository id.
pub fn resolve(alias: &str) -> HubResult<&'static str> {
    MODELS
        .iter()
        .find(|m| m.alias == alias)
        .map(|m| m.repo_id)
        .ok_or_else(|| HubError::UnknownModel {
            alias: alias.to_string(),
            available: aliases().join(", "),
        })
}

pub fn aliases() -> Vec<&'static str> {
    MODELS.iter().map(|m| m.alias).collect()
}

/// Two-column alias listing for `--help`.
pub fn help_listing() -> String {
    MODELS
        .iter()
        .map(|m| format!("  {:<10} - {}", m.alias, m.description))
        .collect::<Vec<_>>()
        .join("\n")
}
