mod common;

use common::synthetic_volume::{bright_ball, layered_brain, mean, shell_mask, SphereSurface};
use surface_edge_force::image::Volume;
use surface_edge_force::{EdgeDistanceForce, ForceInput, ForceTerm, SurfaceView};

const SIZE: usize = 40;
const WHITE_RADIUS: f64 = 10.0;
const PIAL_RADIUS: f64 = 14.0;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn force_with(params: &[(&str, &str)]) -> EdgeDistanceForce {
    let mut force = EdgeDistanceForce::new("edges", 1.0);
    for (key, value) in params {
        force.set_parameter(key, value).unwrap();
    }
    force
}

/// Run one pass on `volume` for an icosphere of `radius`.
fn run_pass(
    force: &mut EdgeDistanceForce,
    volume: &Volume,
    radius: f64,
    masks: Option<(&Volume, &Volume)>,
) -> SphereSurface {
    let sphere = SphereSurface::new(&volume.geometry, radius, 2);
    let surface = SurfaceView::new(&sphere.points, &sphere.normals).with_edges(&sphere.edges);
    let mut input = ForceInput::new(volume, surface);
    if let Some((wm, gm)) = masks {
        input = input.with_tissue_masks(Some(wm), Some(gm));
    }
    force.initialize(&input).unwrap();
    force.update(&input).unwrap();
    sphere
}

#[test]
fn neonatal_white_surface_uses_tissue_statistics() {
    init_logging();
    let volume = layered_brain(SIZE, WHITE_RADIUS, PIAL_RADIUS);
    let wm = shell_mask(SIZE, 0.0, WHITE_RADIUS);
    let gm = shell_mask(SIZE, WHITE_RADIUS, PIAL_RADIUS);
    let mut force = force_with(&[
        ("Edge distance type", "Neonatal T2-w WM/cGM"),
        ("Maximum distance", "6"),
        ("Minimum gradient", "1"),
        ("Local white matter window radius", "2"),
        ("Local grey matter window width", "5"),
    ]);
    run_pass(&mut force, &volume, 9.0, Some((&wm, &gm)));

    let stats = force.tissue_statistics().unwrap();
    assert!(stats.white_matter.is_known() && stats.grey_matter.is_known());
    assert!(stats.white_matter.global_mean > 90.0);
    assert!((50.0..80.0).contains(&stats.grey_matter.global_mean));
    assert!(stats.white_matter.local.is_some());

    let mean_d = mean(force.distances());
    assert!((0.4..=1.6).contains(&mean_d), "mean distance {mean_d:.3}");
    assert!(force.magnitudes().iter().all(|&m| m >= 0.0));
}

#[test]
fn neonatal_white_surface_derives_intensity_bounds() {
    init_logging();
    let volume = layered_brain(SIZE, WHITE_RADIUS, PIAL_RADIUS);
    let wm = shell_mask(SIZE, 0.0, WHITE_RADIUS);
    let gm = shell_mask(SIZE, WHITE_RADIUS, PIAL_RADIUS);
    let mut force = force_with(&[
        ("Type", "neonatal white"),
        ("Maximum distance", "6"),
        ("Minimum gradient", "1"),
        ("Lower intensity threshold", "nan"),
        ("Upper intensity threshold", "NaN"),
    ]);
    run_pass(&mut force, &volume, 9.0, Some((&wm, &gm)));

    let t = force.thresholds().unwrap();
    assert!(t.min_intensity.is_finite() && t.max_intensity.is_finite());
    assert!(t.min_intensity < 50.0);
    assert!((100.0..140.0).contains(&t.max_intensity));
    let mean_d = mean(force.distances());
    assert!((0.4..=1.6).contains(&mean_d), "mean distance {mean_d:.3}");
}

#[test]
fn neonatal_white_surface_without_masks_scores_by_gradient() {
    init_logging();
    let volume = layered_brain(SIZE, WHITE_RADIUS, PIAL_RADIUS);
    let mut force = force_with(&[
        ("Type", "neonatal white surface"),
        ("Maximum distance", "6"),
        ("Minimum gradient", "1"),
    ]);
    run_pass(&mut force, &volume, 9.0, None);
    assert!(!force.tissue_statistics().unwrap().white_matter.is_known());
    let mean_d = mean(force.distances());
    assert!((0.4..=1.6).contains(&mean_d), "mean distance {mean_d:.3}");
}

#[test]
fn neonatal_pial_surface_moves_out_from_white_surface() {
    init_logging();
    let volume = layered_brain(SIZE, WHITE_RADIUS, PIAL_RADIUS);
    let mut force = force_with(&[
        ("Type", "Neonatal T2-w cGM/CSF"),
        ("Maximum distance", "6"),
        ("Minimum gradient", "1"),
    ]);
    run_pass(&mut force, &volume, WHITE_RADIUS, None);
    let mean_d = mean(force.distances());
    assert!((3.4..=4.6).contains(&mean_d), "mean distance {mean_d:.3}");
    assert!(force.report().unwrap().edges_found > 0);
}

#[test]
fn intensity_range_vetoes_edges() {
    init_logging();
    let volume = bright_ball(SIZE, 14.0);
    let mut force = force_with(&[
        ("Type", "strongest minimum"),
        ("Maximum distance", "6"),
        ("Upper intensity threshold", "30"),
    ]);
    let sphere = run_pass(&mut force, &volume, 11.0, None);
    assert!(force.distances().iter().all(|&d| d == 0.0));
    let report = force.report().unwrap();
    assert_eq!(report.vertex_count, sphere.len());
    assert_eq!(report.edges_found, 0);
    assert!(report.degenerate);
    assert!(force.magnitudes().iter().all(|&m| m == 0.0));
}

#[test]
fn padding_blocks_edges_behind_background() {
    init_logging();
    let volume = bright_ball(SIZE, 14.0);

    let mut force = force_with(&[
        ("Type", "strongest minimum"),
        ("Maximum distance", "6"),
        ("Padding", "50"),
    ]);
    run_pass(&mut force, &volume, 11.0, None);
    assert!(mean(force.distances()) > 2.0);

    force.set_parameter("Intensity threshold", "90").unwrap();
    run_pass(&mut force, &volume, 11.0, None);
    assert!(force.distances().iter().all(|&d| d == 0.0));
}
