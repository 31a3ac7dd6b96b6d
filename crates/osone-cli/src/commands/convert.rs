use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use tracing::{info, warn};

use osone_core::{
    estimate_size, verify, ModelInfo, QuantizationMode, RequiredFileSet, SizeEstimate,
    VerificationReport,
};
use osone_mlx::{ConvertRequest, ModelConverter};

use crate::config::AppConfig;
use crate::report::{print_banner, print_verification, rule};

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Path to a Hugging Face model directory.
    pub model_path: PathBuf,

    /// Output path for the MLX model (default: <model_path>-mlx[-<quant>]).
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Quantization type (q4 for mobile, q8 for desktop).
    #[arg(long, value_parser = ["q4", "q8"])]
    pub quantize: Option<String>,

    /// Dequantize weights (for debugging).
    #[arg(long)]
    pub dequantize: bool,
}

/// What a finished conversion produced.
#[derive(Debug)]
pub struct ConvertOutcome {
    pub output_dir: PathBuf,
    pub info: Option<ModelInfo>,
    pub estimate: SizeEstimate,
    pub report: VerificationReport,
}

pub const AFTER_HELP: &str = "\
Examples:
  # Convert to MLX with 4-bit quantization (iPhone)
  osone-convert models/Qwen/Qwen2.5-1.5B-Instruct --quantize q4

  # Convert to MLX with 8-bit quantization (iPad/Mac)
  osone-convert models/meta-llama/Llama-3.2-3B-Instruct --quantize q8

  # Convert without quantization (largest size, best quality)
  osone-convert models/google/gemma-2-2b-it

Quantization recommendations:
  iPhone 15 Pro:     --quantize q4 (4-bit, ~25% original size)
  iPad Pro M2:       --quantize q8 (8-bit, ~50% original size)
  MacBook M1+:       --quantize q8 or none (full precision)";

/// `<parent>/<name>-mlx[-q4|-q8]` next to the source directory.
pub fn default_output_path(model_path: &Path, mode: QuantizationMode) -> PathBuf {
    let resolved = if model_path.file_name().is_some() {
        model_path.to_path_buf()
    } else {
        std::fs::canonicalize(model_path).unwrap_or_else(|_| model_path.to_path_buf())
    };
    let name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let parent = resolved.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{name}{}", mode.output_suffix()))
}

/// Validate the input, describe it, convert it and verify the result.
///
/// A missing or non-directory input, a malformed `config.json` or a failed
/// conversion is an error; an incomplete output is only reported.
pub fn run<C: ModelConverter>(
    args: &ConvertArgs,
    config: &AppConfig,
    converter: &C,
) -> anyhow::Result<ConvertOutcome> {
    let mode = QuantizationMode::from_option(args.quantize.as_deref())?;
    let model_path = &args.model_path;

    if !model_path.exists() {
        bail!("Model path does not exist: {}", model_path.display());
    }
    if !model_path.is_dir() {
        bail!("Model path must be a directory: {}", model_path.display());
    }

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(model_path, mode));

    print_banner("OS One Model Converter (MLX)");
    println!("Input:  {}", model_path.display());
    println!("Output: {}", output_dir.display());
    println!("{}\n", rule());

    let display_name = model_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| model_path.display().to_string());
    println!("Converting {display_name} to MLX format...");
    if mode.is_quantized() {
        println!("Quantization: {mode}");
        println!("  {}", mode.description());
    } else {
        println!("Quantization: None");
    }

    let info = ModelInfo::read(model_path)
        .with_context(|| format!("Cannot read model config in {}", model_path.display()))?;
    if info.is_none() {
        println!(
            "Warning: config.json not found at {}",
            model_path.join("config.json").display()
        );
    }
    let shown = info.clone().unwrap_or_default();
    println!("Model architecture: {}", shown.architecture());
    println!("Hidden size: {}", shown.hidden_size_label());
    println!("Layers: {}", shown.layers_label());

    let estimate = estimate_size(model_path, mode);
    println!("Estimated output size: {:.2} GB", estimate.estimated_gb());

    let request = ConvertRequest::new(model_path, &output_dir)
        .with_quantization(mode)
        .with_group_size(config.convert.q_group_size)
        .with_dequantize(args.dequantize);

    println!("\nConverting... (this may take several minutes)");
    info!(
        source = %model_path.display(),
        output = %output_dir.display(),
        quantization = %mode,
        dequantize = args.dequantize,
        "Starting conversion"
    );
    let output_dir = converter
        .convert(&request)
        .with_context(|| format!("Conversion failed for {}", model_path.display()))?;

    println!("\nConversion complete!");
    println!("Output: {}", output_dir.display());

    let report = verify(&output_dir, RequiredFileSet::Converted);
    print_verification(&report);
    if !report.passed() {
        warn!(output = %output_dir.display(), missing = ?report.missing(), "Converted model is incomplete");
    }

    println!("\n{}", rule());
    println!("Conversion complete!");
    println!("MLX model: {}", output_dir.display());
    println!("\nNext steps:");
    println!("  1. Copy model to iOS device:");
    println!("     adb push {} /path/to/app/documents/", output_dir.display());
    println!("  2. Or add to Xcode project as a resource");
    println!("  3. Select model in OS One settings");
    println!("  4. Enable offline mode");

    Ok(ConvertOutcome {
        output_dir,
        info,
        estimate,
        report,
    })
}
