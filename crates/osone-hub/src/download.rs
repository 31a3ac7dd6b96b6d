use std::future::Future;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use glob::Pattern;
use hf_hub::{
    api::tokio::{ApiBuilder, ApiError, ApiRepo},
    Cache, Repo,
};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::error::{api_error_requires_auth, HubError, HubResult};

/// Files fetched from a model repository: configs, weights, tokenizers and
/// plain-text vocab/merges.
pub const DEFAULT_ALLOW_PATTERNS: &[&str] =
    &["*.json", "*.safetensors", "tokenizer.model", "*.txt"];

/// Environment variables checked for a Hugging Face token, in order.
const TOKEN_ENV_VARS: &[&str] = &["HF_TOKEN", "HUGGING_FACE_HUB_TOKEN"];

/// Progress bar template for files whose `Content-Length` is known.
const PB_TEMPLATE_SIZED: &str =
    "{wide_msg}\n[{bar:50.cyan/blue}] {bytes}/{total_bytes}  {bytes_per_sec}  ETA {eta}";

/// Progress bar template when the total size is not known.
const PB_TEMPLATE_SPINNER: &str =
    "{spinner:.green} {wide_msg}  {bytes}  {bytes_per_sec}  [{elapsed_precise}]";

// ─── Request / trait ─────────────────────────────────────────────────────────

/// What to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub repo_id: String,
    pub local_dir: PathBuf,
    pub allow_patterns: Vec<String>,
    pub token: Option<String>,
}

impl SnapshotRequest {
    pub fn new(repo_id: impl Into<String>, local_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_id: repo_id.into(),
            local_dir: local_dir.into(),
            allow_patterns: DEFAULT_ALLOW_PATTERNS.iter().map(|s| s.to_string()).collect(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_allow_patterns(mut self, patterns: Vec<String>) -> Self {
        self.allow_patterns = patterns;
        self
    }
}

/// Something that can materialise a repository snapshot on local disk.
///
/// Returns the directory the files were written to.
pub trait SnapshotSource {
    fn snapshot(&self, request: &SnapshotRequest) -> impl Future<Output = HubResult<PathBuf>>;
}

/// Token to authenticate with: `explicit`, then `HF_TOKEN`, then
/// `HUGGING_FACE_HUB_TOKEN`, then the one saved by `huggingface-cli login`.
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    resolve_token_with(
        explicit,
        |var| std::env::var(var).ok(),
        || Cache::from_env().token(),
    )
}

/// [`resolve_token`] with the environment and login cache supplied by the caller.
///
/// Blank values are skipped at every step.
pub fn resolve_token_with(
    explicit: Option<String>,
    env: impl Fn(&str) -> Option<String>,
    cached: impl FnOnce() -> Option<String>,
) -> Option<String> {
    explicit
        .into_iter()
        .chain(TOKEN_ENV_VARS.iter().filter_map(|var| env(*var)))
        .find(|t| !t.trim().is_empty())
        .or_else(|| cached().filter(|t| !t.trim().is_empty()))
}

// ─── Hugging Face implementation ─────────────────────────────────────────────

/// Snapshot downloader backed by the Hugging Face Hub.
///
/// Lists the repository through `hf-hub`, keeps the files matching the
/// request's allowlist and streams each one with `reqwest`. Files already
/// present in the destination are skipped, so an interrupted run can be
/// repeated.
pub struct HubSnapshot {
    http: reqwest::Client,
    progress: Option<MultiProgress>,
}

impl HubSnapshot {
    pub fn new() -> HubResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("osone/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HubError::DownloadFailed {
                file: "<http client>".into(),
                reason: e.to_string(),
            })?;
        Ok(Self { http, progress: None })
    }

    /// Render per-file progress bars into `mp`.
    pub fn with_progress(mut self, mp: MultiProgress) -> Self {
        self.progress = Some(mp);
        self
    }

    async fn fetch(&self, request: &SnapshotRequest) -> HubResult<PathBuf> {
        info!(repo_id = %request.repo_id, local_dir = %request.local_dir.display(), "Downloading snapshot");

        // ApiBuilder::new() already picks up the login cache; only override it
        // with an explicit token.
        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(ref token) = request.token {
            builder = builder.with_token(Some(token.clone()));
        }
        let api = builder.build()?;
        let repo = api.repo(Repo::model(request.repo_id.clone()));

        let info = repo.info().await.map_err(|e: ApiError| {
            if api_error_requires_auth(&e) {
                HubError::GatedRepo {
                    repo_id: request.repo_id.clone(),
                    reason: e.to_string(),
                }
            } else {
                HubError::Api(e)
            }
        })?;

        let siblings: Vec<String> = info.siblings.into_iter().map(|s| s.rfilename).collect();
        let filenames = select_files(&siblings, &request.allow_patterns)?;
        if filenames.is_empty() {
            return Err(HubError::DownloadFailed {
                file: request.repo_id.clone(),
                reason: format!(
                    "No files matching [{}] in this repository",
                    request.allow_patterns.join(", ")
                ),
            });
        }

        std::fs::create_dir_all(&request.local_dir)?;
        for filename in &filenames {
            self.download_file(&repo, request, filename).await?;
        }

        info!(repo_id = %request.repo_id, files = filenames.len(), "Snapshot complete");
        Ok(request.local_dir.clone())
    }

    /// Download one file with a live progress bar.
    ///
    /// Streams into `<dest>.tmp` and renames on success.
    async fn download_file(
        &self,
        repo: &ApiRepo,
        request: &SnapshotRequest,
        filename: &str,
    ) -> HubResult<PathBuf> {
        let dest = request.local_dir.join(filename);
        if dest.is_file() {
            debug!(filename, "Already present, skipping download");
            return Ok(dest);
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = repo.url(filename);
        info!(filename, "Downloading");

        let mut req = self.http.get(&url);
        if let Some(ref token) = request.token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| HubError::DownloadFailed {
            file: filename.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(HubError::GatedRepo {
                repo_id: request.repo_id.clone(),
                reason: format!("HTTP {status} while fetching {filename}"),
            });
        }
        if !status.is_success() {
            return Err(HubError::DownloadFailed {
                file: filename.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let pb = self
            .progress
            .as_ref()
            .map(|mp| new_progress_bar(mp, response.content_length(), filename));

        let tmp_path = tmp_path_for(&dest);
        match stream_to_disk(response, &tmp_path, pb.as_ref()).await {
            Ok(()) => std::fs::rename(&tmp_path, &dest)?,
            Err(e) => {
                let _ = std::fs::remove_file(&tmp_path);
                return Err(e);
            }
        }

        if let Some(ref pb) = pb {
            pb.finish_with_message(format!("Done  {filename}"));
        }
        Ok(dest)
    }
}

impl SnapshotSource for HubSnapshot {
    async fn snapshot(&self, request: &SnapshotRequest) -> HubResult<PathBuf> {
        self.fetch(request).await
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Repository files matching at least one allowlist pattern, sorted.
pub fn select_files(siblings: &[String], allow_patterns: &[String]) -> HubResult<Vec<String>> {
    let patterns = allow_patterns
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<Result<Vec<_>, _>>()?;
    let mut selected: Vec<String> = siblings
        .iter()
        .filter(|name| patterns.iter().any(|p| p.matches(name)))
        .cloned()
        .collect();
    selected.sort();
    selected.dedup();
    Ok(selected)
}

fn tmp_path_for(dest: &Path) -> PathBuf {
    let name = dest.file_name().unwrap_or_default().to_string_lossy();
    dest.with_file_name(format!("{name}.tmp"))
}

fn new_progress_bar(mp: &MultiProgress, total: Option<u64>, filename: &str) -> ProgressBar {
    let pb = match total {
        Some(total) => {
            let pb = mp.add(ProgressBar::new(total));
            pb.set_style(
                ProgressStyle::with_template(PB_TEMPLATE_SIZED)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            pb
        }
        None => {
            let pb = mp.add(ProgressBar::new_spinner());
            pb.set_style(
                ProgressStyle::with_template(PB_TEMPLATE_SPINNER)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        }
    };
    pb.set_message(filename.to_string());
    pb
}

/// Write a streaming HTTP response body to `path`, advancing `pb` per chunk.
async fn stream_to_disk(
    response: reqwest::Response,
    path: &Path,
    pb: Option<&ProgressBar>,
) -> HubResult<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| HubError::DownloadFailed {
            file: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
        file.write_all(&chunk)?;
        if let Some(pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }

    file.flush()?;
    Ok(())
}
