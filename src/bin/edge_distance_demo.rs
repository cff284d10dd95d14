use log::info;
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::env;
use std::path::Path;
use surface_edge_force::config::edge_distance_demo::{
    load_config, SphereVolumeConfig, SurfaceConfig,
};
use surface_edge_force::image::io::{save_axial_slice_png, write_json_file};
use surface_edge_force::image::{Volume, VolumeGeometry};
use surface_edge_force::mesh::{icosphere, vertex_normals, EdgeTable};
use surface_edge_force::{EdgeDistanceForce, ForceInput, ForceTerm, PassReport, SurfaceView};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let volume = sphere_volume(&config.volume);
    let centre = volume_centre(&volume.geometry);
    let (points, triangles) = sphere_surface(&config.surface, &centre);
    let normals = vertex_normals(&points, &triangles);
    let edges = EdgeTable::from_triangles(points.len(), &triangles);
    info!(
        "sphere: {} voxels, surface: {} vertices / {} edges",
        volume.data.len(),
        points.len(),
        edges.num_edges()
    );

    let mut force = EdgeDistanceForce::new("edges", config.force.weight);
    for (key, value) in &config.force.parameters {
        force
            .set_parameter(key, value)
            .map_err(|e| format!("Parameter '{key}': {e}"))?;
    }

    let surface = SurfaceView::new(&points, &normals).with_edges(&edges);
    let input = ForceInput::new(&volume, surface);
    force.initialize(&input).map_err(|e| e.to_string())?;
    force.update(&input).map_err(|e| e.to_string())?;

    let energy = force.evaluate();
    let mut gradient = vec![Vector3::zeros(); points.len()];
    force
        .evaluate_gradient(&mut gradient, force.weight())
        .map_err(|e| e.to_string())?;

    let report = force
        .report()
        .cloned()
        .ok_or("Force produced no pass report")?;
    let summary = DemoSummary {
        parameters: force.parameters(),
        expected_offset: config.volume.radius - config.surface.radius,
        mean_distance: mean(force.distances()),
        mean_magnitude: mean(force.magnitudes()),
        mean_gradient_norm: mean_norm(&gradient),
        energy,
        report,
    };
    print_text_summary(&summary);

    write_json_file(&config.output.report_json, &summary)?;
    println!("JSON report written to {}", config.output.report_json.display());
    if let Some(path) = &config.output.slice_png {
        let k = volume.dims()[2] / 2;
        let (lo, hi) = intensity_window(&config.volume);
        save_axial_slice_png(&volume, k, lo, hi, path)?;
        println!("Mid axial slice written to {}", path.display());
    }
    Ok(())
}

fn usage() -> String {
    "Usage: edge_distance_demo <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoSummary {
    parameters: Vec<(String, String)>,
    expected_offset: f64,
    mean_distance: f64,
    mean_magnitude: f64,
    mean_gradient_norm: f64,
    energy: f64,
    report: PassReport,
}

fn print_text_summary(summary: &DemoSummary) {
    let report = &summary.report;
    println!("Edge distance summary");
    println!("  vertices: {} (active {})", report.vertex_count, report.active_count);
    println!("  edges found: {} (nan {})", report.edges_found, report.nan_edges);
    println!(
        "  mean distance: {:.3} mm (expected {:.3})",
        summary.mean_distance, summary.expected_offset
    );
    println!("  mean magnitude: {:.3}", summary.mean_magnitude);
    println!("  dmax: {:.3}  mavg: {:.3}", report.dmax, report.mavg);
    println!("  energy: {:.4}", summary.energy);
    println!("  degenerate: {}", report.degenerate);
    println!("  total_ms: {:.3}", report.timings.total_ms);
    for stage in &report.timings.stages {
        println!("    {:<12} {:.3} ms", stage.label, stage.elapsed_ms);
    }
}

fn volume_centre(geometry: &VolumeGeometry) -> Point3<f64> {
    let [nx, ny, nz] = geometry.dims;
    let mid = Point3::new(
        (nx as f64 - 1.0) / 2.0,
        (ny as f64 - 1.0) / 2.0,
        (nz as f64 - 1.0) / 2.0,
    );
    geometry.image_to_world(&mid)
}

/// Bright ball with a tanh falloff of width `blur` at `radius`.
fn sphere_volume(cfg: &SphereVolumeConfig) -> Volume {
    let n = cfg.size.max(1);
    let geometry = VolumeGeometry::new([n; 3], [cfg.spacing; 3], [0.0; 3]);
    let centre = volume_centre(&geometry);
    let blur = cfg.blur.max(1e-6);
    let half = 0.5 * (cfg.inside - cfg.outside);
    let mid = 0.5 * (cfg.inside + cfg.outside);
    let g = geometry.clone();
    Volume::from_fn(geometry, |i, j, k| {
        let p = g.image_to_world(&Point3::new(i as f64, j as f64, k as f64));
        let r = (p - centre).norm();
        mid - half * ((r - cfg.radius) / blur).tanh()
    })
}

fn sphere_surface(cfg: &SurfaceConfig, centre: &Point3<f64>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let (unit, triangles) = icosphere(cfg.subdivisions);
    let points = unit
        .iter()
        .map(|p| centre + p.coords * cfg.radius)
        .collect();
    (points, triangles)
}

fn intensity_window(cfg: &SphereVolumeConfig) -> (f64, f64) {
    (cfg.inside.min(cfg.outside), cfg.inside.max(cfg.outside))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_norm(values: &[Vector3<f64>]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.norm()).sum::<f64>() / values.len() as f64
}
