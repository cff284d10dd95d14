//! I/O helpers for inspection output.
//!
//! - `save_axial_slice_png`: write one z-plane of a [`Volume`] to a grayscale
//!   PNG, linearly mapping a given intensity window to [0, 255].
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::Volume;
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Save plane `k` of `volume` as PNG; values outside `[lo, hi]` saturate.
pub fn save_axial_slice_png(
    volume: &Volume,
    k: usize,
    lo: f64,
    hi: f64,
    path: &Path,
) -> Result<(), String> {
    let [nx, ny, nz] = volume.dims();
    if k >= nz {
        return Err(format!("Slice {k} out of range (nz={nz})"));
    }
    ensure_parent_dir(path)?;
    let scale = if hi > lo { 255.0 / (hi - lo) } else { 0.0 };
    let plane = volume.plane(k);
    let mut out = GrayImage::new(nx as u32, ny as u32);
    for (idx, &v) in plane.iter().enumerate() {
        let g = if v.is_finite() {
            ((v - lo) * scale).clamp(0.0, 255.0)
        } else {
            0.0
        };
        out.put_pixel((idx % nx) as u32, (idx / nx) as u32, Luma([g as u8]));
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
