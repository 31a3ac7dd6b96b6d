//! # osone-core
//!
//! Directory-level model bookkeeping for OS One: size estimation before and
//! after quantization, required-file verification and `config.json` metadata.
//!
//! Nothing in this crate touches the network or reads tensor data; every
//! operation is a read-only walk over a model directory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use osone_core::{estimate_size, verify, QuantizationMode, RequiredFileSet};
//!
//! fn main() {
//!     let dir = std::path::Path::new("models/Qwen/Qwen2.5-1.5B-Instruct");
//!     let estimate = estimate_size(dir, QuantizationMode::Q4);
//!     println!("~{:.2} GB after q4", estimate.estimated_gb());
//!
//!     let report = verify(dir, RequiredFileSet::Download);
//!     println!("verification passed: {}", report.passed());
//! }
//! ```

pub mod error;
pub mod estimate;
pub mod model_info;
pub mod quantize;
pub mod verify;

pub use error::{CoreError, CoreResult};
pub use estimate::{
    bytes_to_gb, bytes_to_mb, dir_size_bytes, estimate_output_bytes, estimate_size,
    weights_size_bytes, SizeEstimate,
};
pub use model_info::ModelInfo;
pub use quantize::QuantizationMode;
pub use verify::{verify, CheckStatus, FileCheck, RequiredFileSet, VerificationReport};
