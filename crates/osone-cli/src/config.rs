use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use osone_hub::DEFAULT_ALLOW_PATTERNS;
use osone_mlx::DEFAULT_Q_GROUP_SIZE;

/// Full runtime configuration loaded from TOML + env vars.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub download: DownloadConfig,
    pub convert: ConvertConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Root directory snapshots are written under (`<output_dir>/<org>/<repo>`).
    pub output_dir: String,
    /// Repository files to fetch, as glob patterns.
    pub allow_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConvertConfig {
    /// Python interpreter that has `mlx-lm` installed.
    pub python: String,
    pub q_group_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download: DownloadConfig {
                output_dir: "./models".to_string(),
                allow_patterns: DEFAULT_ALLOW_PATTERNS.iter().map(|s| s.to_string()).collect(),
            },
            convert: ConvertConfig {
                python: "python3".to_string(),
                q_group_size: DEFAULT_Q_GROUP_SIZE,
            },
        }
    }
}

/// Load configuration from:
/// 1. Built-in defaults
/// 2. `config/default.toml` (if present)
/// 3. A custom config file path (if provided)
/// 4. Environment variables prefixed with `OSONE_` (`OSONE_CONVERT__PYTHON`, etc.)
pub fn load_config(config_file: Option<&PathBuf>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("download.output_dir", "./models")?
        .set_default("download.allow_patterns", DEFAULT_ALLOW_PATTERNS.to_vec())?
        .set_default("convert.python", "python3")?
        .set_default("convert.q_group_size", i64::from(DEFAULT_Q_GROUP_SIZE))?
        .add_source(File::with_name("config/default").required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    // Keys contain underscores, so nesting uses a double underscore.
    builder = builder.add_source(
        Environment::with_prefix("OSONE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
