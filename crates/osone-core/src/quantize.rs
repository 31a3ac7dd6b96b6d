//! Quantization modes understood by the MLX converter.
//!
//! | Mode   | Bits | Size factor | Output suffix |
//! |--------|------|-------------|---------------|
//! | `none` | -    | 1.0         | `-mlx`        |
//! | `q8`   | 8    | 0.5         | `-mlx-q8`     |
//! | `q4`   | 4    | 0.25        | `-mlx-q4`     |

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Precision-reduction scheme applied during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantizationMode {
    /// Full precision, largest output.
    #[default]
    None,
    /// 4-bit weights.
    Q4,
    /// 8-bit weights.
    Q8,
}

impl QuantizationMode {
    pub const ALL: [QuantizationMode; 3] = [Self::None, Self::Q4, Self::Q8];

    /// Parse a user-supplied mode (`"q4"`, `"q8"`).
    ///
    /// `None` is not spelled on the command line; it is what you get when
    /// `--quantize` is omitted (see [`QuantizationMode::from_option`]).
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "q4" => Ok(Self::Q4),
            "q8" => Ok(Self::Q8),
            _ => Err(CoreError::InvalidQuantization(s.to_string())),
        }
    }

    pub fn from_option(s: Option<&str>) -> CoreResult<Self> {
        s.map(Self::parse).transpose().map(Option::unwrap_or_default)
    }

    /// Multiplier applied to the raw weights size to estimate the output size.
    pub fn size_factor(&self) -> f64 {
        match self {
            Self::None => 1.0,
            Self::Q4 => 0.25,
            Self::Q8 => 0.5,
        }
    }

    /// Bit width handed to the converter, `None` for full precision.
    pub fn bits(&self) -> Option<u8> {
        match self {
            Self::None => None,
            Self::Q4 => Some(4),
            Self::Q8 => Some(8),
        }
    }

    pub fn is_quantized(&self) -> bool {
        self.bits().is_some()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Q4 => "q4",
            Self::Q8 => "q8",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No quantization (full precision, largest size)",
            Self::Q4 => "4-bit quantization (recommended for iPhone, ~75% size reduction)",
            Self::Q8 => "8-bit quantization (recommended for iPad/Mac, ~50% size reduction)",
        }
    }

    /// Suffix appended to the source directory name for the default output.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            Self::None => "-mlx",
            Self::Q4 => "-mlx-q4",
            Self::Q8 => "-mlx-q8",
        }
    }
}

impl fmt::Display for QuantizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QuantizationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
