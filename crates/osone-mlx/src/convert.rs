use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use osone_core::QuantizationMode;
use tracing::{debug, info};

use crate::error::{ConvertError, ConvertResult};

/// Quantization group size passed to `mlx_lm`.
pub const DEFAULT_Q_GROUP_SIZE: u32 = 64;

const MLX_CONVERT_MODULE: &str = "mlx_lm.convert";

/// Source checkpoint, destination and quantization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub output: PathBuf,
    pub quantization: QuantizationMode,
    pub q_group_size: u32,
    /// Dequantize an already-quantized checkpoint (debugging aid).
    pub dequantize: bool,
}

impl ConvertRequest {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            quantization: QuantizationMode::None,
            q_group_size: DEFAULT_Q_GROUP_SIZE,
            dequantize: false,
        }
    }

    pub fn with_quantization(mut self, mode: QuantizationMode) -> Self {
        self.quantization = mode;
        self
    }

    pub fn with_group_size(mut self, q_group_size: u32) -> Self {
        self.q_group_size = q_group_size;
        self
    }

    pub fn with_dequantize(mut self, dequantize: bool) -> Self {
        self.dequantize = dequantize;
        self
    }
}

/// Turns a Hugging Face model directory into an MLX one.
///
/// Returns the populated output directory. Blocks until the conversion is
/// done.
pub trait ModelConverter {
    fn convert(&self, request: &ConvertRequest) -> ConvertResult<PathBuf>;
}

/// Runs `python -m mlx_lm.convert`.
#[derive(Debug, Clone)]
pub struct MlxLmConverter {
    python: String,
}

impl MlxLmConverter {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    pub fn python(&self) -> &str {
        &self.python
    }

    /// Fail early with an install hint when `mlx_lm` cannot be imported.
    pub fn check_backend(&self) -> ConvertResult<()> {
        let output = Command::new(&self.python)
            .args(["-c", "import mlx_lm"])
            .output()
            .map_err(|e| ConvertError::BackendMissing {
                python: self.python.clone(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ConvertError::BackendMissing {
            python: self.python.clone(),
            reason: stderr
                .lines()
                .last()
                .unwrap_or("import mlx_lm failed")
                .trim()
                .to_string(),
        })
    }

    /// Arguments after the interpreter, e.g.
    /// `-m mlx_lm.convert --hf-path SRC --mlx-path DST -q --q-bits 4 --q-group-size 64`.
    pub fn command_args(request: &ConvertRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-m".into(),
            MLX_CONVERT_MODULE.into(),
            "--hf-path".into(),
            request.source.clone().into_os_string(),
            "--mlx-path".into(),
            request.output.clone().into_os_string(),
        ];
        if let Some(bits) = request.quantization.bits() {
            args.push("-q".into());
            args.push("--q-bits".into());
            args.push(bits.to_string().into());
            args.push("--q-group-size".into());
            args.push(request.q_group_size.to_string().into());
        }
        if request.dequantize {
            args.push("--dequantize".into());
        }
        args
    }
}

impl Default for MlxLmConverter {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl ModelConverter for MlxLmConverter {
    fn convert(&self, request: &ConvertRequest) -> ConvertResult<PathBuf> {
        self.check_backend()?;

        // mlx_lm creates the output directory itself and refuses an existing one.
        if let Some(parent) = request.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let args = Self::command_args(request);
        debug!(python = %self.python, ?args, "Spawning converter");
        info!(
            source = %request.source.display(),
            output = %request.output.display(),
            quantization = %request.quantization,
            "Running mlx_lm.convert"
        );

        let status = Command::new(&self.python).args(&args).status()?;
        if !status.success() {
            return Err(ConvertError::ProcessFailed {
                program: format!("{} -m {MLX_CONVERT_MODULE}", self.python),
                status: status.to_string(),
            });
        }

        info!(output = %request.output.display(), "MLX conversion complete");
        Ok(request.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn full_precision_args() {
        let req = ConvertRequest::new("models/Qwen/Qwen2.5-1.5B-Instruct", "out/qwen-mlx");
        assert_eq!(
            as_strings(MlxLmConverter::command_args(&req)),
            vec![
                "-m",
                "mlx_lm.convert",
                "--hf-path",
                "models/Qwen/Qwen2.5-1.5B-Instruct",
                "--mlx-path",
                "out/qwen-mlx",
            ]
        );
    }

    #[test]
    fn q4_args_carry_bits_and_group_size() {
        let req = ConvertRequest::new("in", "out").with_quantization(QuantizationMode::Q4);
        let args = as_strings(MlxLmConverter::command_args(&req));
        assert_eq!(
            &args[6..],
            &["-q", "--q-bits", "4", "--q-group-size", "64"]
        );
    }

    #[test]
    fn q8_with_custom_group_size_and_dequantize() {
        let req = ConvertRequest::new("in", "out")
            .with_quantization(QuantizationMode::Q8)
            .with_group_size(32)
            .with_dequantize(true);
        let args = as_strings(MlxLmConverter::command_args(&req));
        assert_eq!(
            &args[6..],
            &["-q", "--q-bits", "8", "--q-group-size", "32", "--dequantize"]
        );
    }

    #[test]
    fn missing_interpreter_reports_backend_missing() {
        let converter = MlxLmConverter::new("osone-no-such-python-interpreter");
        let err = converter.check_backend().unwrap_err();
        assert!(matches!(err, ConvertError::BackendMissing { .. }), "got {err:?}");
        assert!(err.to_string().contains("pip install mlx-lm"));
    }

    #[test]
    fn convert_fails_before_spawning_without_backend() {
        let tmp = tempfile::tempdir().unwrap();
        let converter = MlxLmConverter::new("osone-no-such-python-interpreter");
        let req = ConvertRequest::new(tmp.path(), tmp.path().join("out/model-mlx"));
        assert!(converter.convert(&req).is_err());
        assert!(!tmp.path().join("out").exists());
    }
}
