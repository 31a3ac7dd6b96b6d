//! # osone-mlx
//!
//! Conversion of Hugging Face safetensors checkpoints into MLX format.
//!
//! The tensor work is done by the [`mlx_lm`](https://github.com/ml-explore/mlx-lm)
//! Python package; this crate builds the request, checks that the backend is
//! importable and runs it as a subprocess. Callers depend on the
//! [`ModelConverter`] trait so the backend can be swapped out in tests.

pub mod convert;
pub mod error;

pub use convert::{ConvertRequest, MlxLmConverter, ModelConverter, DEFAULT_Q_GROUP_SIZE};
pub use error::{ConvertError, ConvertResult};
