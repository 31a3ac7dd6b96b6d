//! On-disk footprint of a model directory and the estimated size after
//! quantization.

use std::path::Path;

use tracing::debug;

use crate::quantize::QuantizationMode;

pub const SAFETENSORS_EXT: &str = "safetensors";

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Raw weights size and the size expected after conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeEstimate {
    pub mode: QuantizationMode,
    pub raw_bytes: u64,
    pub estimated_bytes: f64,
}

impl SizeEstimate {
    pub fn raw_gb(&self) -> f64 {
        bytes_to_gb(self.raw_bytes as f64)
    }

    pub fn estimated_mb(&self) -> f64 {
        bytes_to_mb(self.estimated_bytes)
    }

    pub fn estimated_gb(&self) -> f64 {
        bytes_to_gb(self.estimated_bytes)
    }
}

/// Total size of every `*.safetensors` file under `dir`, recursively.
///
/// A directory without weights (or one that does not exist) yields 0.
pub fn weights_size_bytes(dir: &Path) -> u64 {
    let mut total = 0u64;
    walk_files(dir, &mut |path, len| {
        if has_safetensors_ext(path) {
            total += len;
        }
    });
    total
}

/// Total size of every regular file under `dir`, recursively.
pub fn dir_size_bytes(dir: &Path) -> u64 {
    let mut total = 0u64;
    walk_files(dir, &mut |_, len| total += len);
    total
}

/// `raw_bytes × factor[mode]`.
pub fn estimate_output_bytes(raw_bytes: u64, mode: QuantizationMode) -> f64 {
    raw_bytes as f64 * mode.size_factor()
}

/// Measure the weights under `dir` and apply the factor for `mode`.
pub fn estimate_size(dir: &Path, mode: QuantizationMode) -> SizeEstimate {
    let raw_bytes = weights_size_bytes(dir);
    let estimated_bytes = estimate_output_bytes(raw_bytes, mode);
    debug!(
        dir = %dir.display(),
        %mode,
        raw_bytes,
        estimated_bytes,
        "Estimated converted size"
    );
    SizeEstimate {
        mode,
        raw_bytes,
        estimated_bytes,
    }
}

pub fn bytes_to_mb(bytes: f64) -> f64 {
    bytes / MIB
}

pub fn bytes_to_gb(bytes: f64) -> f64 {
    bytes / GIB
}

pub(crate) fn has_safetensors_ext(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SAFETENSORS_EXT)
}

/// Visit every regular file below `dir` with its length.
///
/// Symlinked directories are not descended into; symlinked files are sized by
/// their target. Unreadable entries are skipped.
fn walk_files(dir: &Path, visit: &mut dyn FnMut(&Path, u64)) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => walk_files(&path, visit),
            Ok(_) => {
                if let Ok(meta) = std::fs::metadata(&path) {
                    if meta.is_file() {
                        visit(&path, meta.len());
                    }
                }
            }
            Err(_) => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_sized(path: &Path, len: u64) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let f = fs::File::create(path).unwrap();
        f.set_len(len).unwrap();
    }

    #[test]
    fn no_weights_yields_zero() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(&dir.path().join("config.json"), 120);
        write_sized(&dir.path().join("tokenizer.json"), 4000);
        assert_eq!(weights_size_bytes(dir.path()), 0);
        assert_eq!(estimate_size(dir.path(), QuantizationMode::Q4).estimated_bytes, 0.0);
    }

    #[test]
    fn missing_dir_yields_zero() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert_eq!(weights_size_bytes(&gone), 0);
        assert_eq!(dir_size_bytes(&gone), 0);
    }

    #[test]
    fn weights_are_summed_recursively() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(&dir.path().join("model-00001-of-00002.safetensors"), 1000);
        write_sized(&dir.path().join("model-00002-of-00002.safetensors"), 500);
        write_sized(&dir.path().join("nested/extra.safetensors"), 250);
        write_sized(&dir.path().join("model.safetensors.index.json"), 77);
        assert_eq!(weights_size_bytes(dir.path()), 1750);
    }

    #[test]
    fn dir_size_counts_every_file() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(&dir.path().join("config.json"), 100);
        write_sized(&dir.path().join("model.safetensors"), 1000);
        write_sized(&dir.path().join("sub/readme.txt"), 24);
        assert_eq!(dir_size_bytes(dir.path()), 1124);
    }

    #[test]
    fn estimate_applies_mode_factor() {
        let raw = 8 * 1024 * 1024;
        for mode in QuantizationMode::ALL {
            let expected = raw as f64 * mode.size_factor();
            assert_eq!(estimate_output_bytes(raw, mode), expected, "mode {mode}");
        }
        assert_eq!(estimate_output_bytes(raw, QuantizationMode::None), raw as f64);
        assert_eq!(estimate_output_bytes(raw, QuantizationMode::Q8), raw as f64 / 2.0);
        assert_eq!(estimate_output_bytes(raw, QuantizationMode::Q4), raw as f64 / 4.0);
    }

    #[test]
    fn ten_mb_at_q4_is_two_and_a_half_mb() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(&dir.path().join("model.safetensors"), 10 * 1024 * 1024);
        let est = estimate_size(dir.path(), QuantizationMode::Q4);
        assert_eq!(est.raw_bytes, 10 * 1024 * 1024);
        assert!((est.estimated_mb() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(bytes_to_mb(1024.0 * 1024.0), 1.0);
        assert_eq!(bytes_to_gb(3.0 * 1024.0 * 1024.0 * 1024.0), 3.0);
    }
}
