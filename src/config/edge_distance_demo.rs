use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct EdgeDistanceDemoConfig {
    #[serde(default)]
    pub volume: SphereVolumeConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub force: ForceConfig,
    pub output: DemoOutputConfig,
}

/// Synthetic bright ball on a dark background with a smooth boundary.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SphereVolumeConfig {
    /// Voxels per axis.
    pub size: usize,
    /// Isotropic voxel size (mm).
    pub spacing: f64,
    /// Ball radius (mm), centred in the volume.
    pub radius: f64,
    pub inside: f64,
    pub outside: f64,
    /// Width (mm) of the tanh transition at the boundary.
    pub blur: f64,
}

impl Default for SphereVolumeConfig {
    fn default() -> Self {
        Self {
            size: 48,
            spacing: 1.0,
            radius: 14.0,
            inside: 100.0,
            outside: 20.0,
            blur: 1.5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub subdivisions: usize,
    /// Radius (mm) of the initial icosphere, centred like the ball.
    pub radius: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            subdivisions: 3,
            radius: 11.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub weight: f64,
    /// String parameters applied in key order through `set_parameter`.
    pub parameters: BTreeMap<String, String>,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            parameters: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DemoOutputConfig {
    pub report_json: PathBuf,
    #[serde(default)]
    pub slice_png: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<EdgeDistanceDemoConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg: EdgeDistanceDemoConfig =
            serde_json::from_str(r#"{"output": {"report_json": "out/report.json"}}"#).unwrap();
        assert_eq!(cfg.volume.size, 48);
        assert_eq!(cfg.surface.subdivisions, 3);
        assert_eq!(cfg.force.weight, 1.0);
        assert!(cfg.force.parameters.is_empty());
        assert!(cfg.output.slice_png.is_none());
    }

    #[test]
    fn parameters_are_a_string_map() {
        let cfg: EdgeDistanceDemoConfig = serde_json::from_str(
            r#"{
                "force": {"weight": 2.0, "parameters": {"Edge distance type": "closest minimum"}},
                "output": {"report_json": "r.json", "slice_png": "s.png"}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.force.weight, 2.0);
        assert_eq!(
            cfg.force.parameters.get("Edge distance type").map(String::as_str),
            Some("closest minimum")
        );
    }
}
