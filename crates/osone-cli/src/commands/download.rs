use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use osone_core::{bytes_to_mb, dir_size_bytes, verify, RequiredFileSet, VerificationReport};
use osone_hub::{registry, resolve_token, HubError, ModelStore, SnapshotRequest, SnapshotSource};

use crate::config::AppConfig;
use crate::report::{print_banner, print_verification, rule};

const TOKEN_SETTINGS_URL: &str = "https://huggingface.co/settings/tokens";

#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    /// Model to download (see the list below).
    pub model: String,

    /// Output directory (default: ./models).
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Hugging Face token for gated models (falls back to HF_TOKEN).
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Verify downloaded files (verification always runs).
    #[arg(long)]
    pub verify: bool,
}

/// What a finished download produced.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub repo_id: &'static str,
    pub model_dir: PathBuf,
    pub size_bytes: u64,
    pub report: VerificationReport,
}

/// `--help` epilogue: usage examples and the alias table.
pub fn after_help() -> String {
    format!(
        "Examples:\n  \
         # Download Qwen 2.5 1.5B (best for iPhone)\n  \
         osone-download qwen-1.5b\n\n  \
         # Download Llama 3.2 3B for iPad Pro\n  \
         osone-download llama-3b --output ./my_models\n\n  \
         # Download with a Hugging Face token (for gated models)\n  \
         osone-download llama-3b --token hf_xxxxx\n\n\
         Available models:\n{}",
        registry::help_listing()
    )
}

/// Resolve the alias, download the snapshot, size it and verify it.
///
/// Verification failures are reported but do not fail the command.
pub async fn run<S: SnapshotSource>(
    args: &DownloadArgs,
    config: &AppConfig,
    source: &S,
) -> anyhow::Result<DownloadOutcome> {
    let repo_id = registry::resolve(&args.model)?;

    let output_root = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.download.output_dir));
    let store = ModelStore::new(&output_root)
        .with_context(|| format!("Cannot create output directory {}", output_root.display()))?;

    print_banner("OS One Model Downloader");

    let request = SnapshotRequest::new(repo_id, store.model_dir(repo_id))
        .with_allow_patterns(config.download.allow_patterns.clone())
        .with_token(resolve_token(args.token.clone()));

    info!(
        alias = %args.model,
        repo_id,
        local_dir = %request.local_dir.display(),
        authenticated = request.token.is_some(),
        "Downloading model"
    );
    println!("Downloading {repo_id}...");

    let model_dir = match source.snapshot(&request).await {
        Ok(path) => path,
        Err(e) => {
            if let Some(hint) = auth_hint(&e) {
                println!("{hint}");
            }
            return Err(e).with_context(|| format!("Error downloading {repo_id}"));
        }
    };

    let size_bytes = dir_size_bytes(&model_dir);
    println!("Model downloaded to: {}", model_dir.display());
    println!("Model size: {:.2} MB", bytes_to_mb(size_bytes as f64));

    let report = verify(&model_dir, RequiredFileSet::Download);
    print_verification(&report);
    if !report.passed() {
        warn!(repo_id, missing = ?report.missing(), "Downloaded model is incomplete");
    }

    println!("\n{}", rule());
    println!("Download complete!");
    println!("Model location: {}", model_dir.display());
    println!("\nNext steps:");
    println!("  1. Convert to MLX format: osone-convert {}", model_dir.display());
    println!("  2. Copy to iOS device");
    println!("  3. Enable offline mode in OS One settings");

    Ok(DownloadOutcome {
        repo_id,
        model_dir,
        size_bytes,
        report,
    })
}

/// Extra guidance for gated repositories. The error itself is reported by
/// the caller.
fn auth_hint(err: &HubError) -> Option<String> {
    err.requires_auth().then(|| {
        format!(
            "\nThis model requires authentication.\n\
             Get your token from: {TOKEN_SETTINGS_URL}\n\
             Then run with: --token YOUR_TOKEN (or `huggingface-cli login`)"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    use osone_hub::HubResult;

    /// Writes a fixed set of files instead of hitting the network.
    struct FakeSnapshot {
        files: Vec<(&'static str, u64)>,
        seen: RefCell<Vec<SnapshotRequest>>,
    }

    impl FakeSnapshot {
        fn new(files: &[(&'static str, u64)]) -> Self {
            Self {
                files: files.to_vec(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl SnapshotSource for FakeSnapshot {
        async fn snapshot(&self, request: &SnapshotRequest) -> HubResult<PathBuf> {
            self.seen.borrow_mut().push(request.clone());
            fs::create_dir_all(&request.local_dir)?;
            for (name, len) in &self.files {
                let f = fs::File::create(request.local_dir.join(name))?;
                f.set_len(*len)?;
            }
            Ok(request.local_dir.clone())
        }
    }

    struct GatedSnapshot;

    impl SnapshotSource for GatedSnapshot {
        async fn snapshot(&self, request: &SnapshotRequest) -> HubResult<PathBuf> {
            Err(HubError::GatedRepo {
                repo_id: request.repo_id.clone(),
                reason: "HTTP 403 Forbidden".into(),
            })
        }
    }

    fn args(model: &str, output: &std::path::Path) -> DownloadArgs {
        DownloadArgs {
            model: model.to_string(),
            output: Some(output.to_path_buf()),
            token: Some("hf_test".to_string()),
            verify: false,
        }
    }

    #[tokio::test]
    async fn downloads_into_org_repo_layout_and_verifies() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSnapshot::new(&[
            ("config.json", 1024),
            ("tokenizer.json", 2048),
            ("model.safetensors", 1024 * 1024),
        ]);

        let outcome = run(&args("qwen-1.5b", tmp.path()), &AppConfig::default(), &source)
            .await
            .unwrap();

        assert_eq!(outcome.repo_id, "Qwen/Qwen2.5-1.5B-Instruct");
        assert_eq!(outcome.model_dir, tmp.path().join("Qwen").join("Qwen2.5-1.5B-Instruct"));
        assert_eq!(outcome.size_bytes, 1024 + 2048 + 1024 * 1024);
        assert!(outcome.report.passed());

        let seen = source.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].token.as_deref(), Some("hf_test"));
        assert_eq!(seen[0].allow_patterns, AppConfig::default().download.allow_patterns);
    }

    #[tokio::test]
    async fn incomplete_download_still_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSnapshot::new(&[("config.json", 10), ("model-00001-of-00002.safetensors", 10)]);

        let outcome = run(&args("llama-1b", tmp.path()), &AppConfig::default(), &source)
            .await
            .unwrap();

        assert!(!outcome.report.passed());
        assert_eq!(outcome.report.missing(), vec!["tokenizer.json"]);
    }

    #[tokio::test]
    async fn unknown_alias_fails_before_downloading() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSnapshot::new(&[]);

        let err = run(&args("not-a-model", tmp.path()), &AppConfig::default(), &source)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Unknown model: not-a-model"), "{err}");
        assert!(source.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn gated_repo_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();

        let err = run(&args("llama-3b", tmp.path()), &AppConfig::default(), &GatedSnapshot)
            .await
            .unwrap_err();

        let hub = err.downcast_ref::<HubError>().expect("hub error preserved");
        assert!(hub.requires_auth());
        assert!(auth_hint(hub).unwrap().contains("--token"));
    }

    #[test]
    fn hint_only_for_auth_failures() {
        let err = HubError::DownloadFailed {
            file: "model-00001-of-00403.safetensors".into(),
            reason: "connection reset by peer".into(),
        };
        assert_eq!(auth_hint(&err), None);

        let hint = auth_hint(&HubError::GatedRepo {
            repo_id: "google/gemma-2-2b-it".into(),
            reason: "HTTP 401".into(),
        })
        .unwrap();
        assert!(hint.contains(TOKEN_SETTINGS_URL));
        assert!(!hint.contains("Error downloading"));
    }

    #[tokio::test]
    async fn configured_output_dir_is_used_without_flag() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.download.output_dir = tmp.path().join("store").to_string_lossy().into_owned();
        let mut download_args = args("gemma-2b", tmp.path());
        download_args.output = None;

        let source = FakeSnapshot::new(&[("config.json", 1)]);
        let outcome = run(&download_args, &config, &source).await.unwrap();

        assert_eq!(
            outcome.model_dir,
            tmp.path().join("store").join("google").join("gemma-2-2b-it")
        );
    }

    #[test]
    fn after_help_lists_every_alias() {
        let text = after_help();
        for entry in osone_hub::MODELS {
            assert!(text.contains(entry.alias));
        }
    }
}
