//! Scalar filters over mesh connectivity.
//!
//! Both filters are Jacobi-style: each iteration reads the previous values
//! and writes a fresh buffer, so vertices are processed in parallel.
use super::edge_table::EdgeTable;
use nalgebra::Point3;
use rayon::prelude::*;

/// Neighbour weighting used by [`smooth_values`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weighting {
    /// Uniform weights.
    Combinatorial,
    /// `exp(-0.5 * |p_j - p_i|^2 / sigma_i^2)` with `sigma_i` the mean length of
    /// the edges incident to vertex `i`.
    Gaussian,
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

/// Replace each value by the median over its `radius`-ring neighbourhood.
pub fn median_filter(values: &[f64], edges: &EdgeTable, radius: usize) -> Vec<f64> {
    if radius == 0 {
        return values.to_vec();
    }
    (0..values.len())
        .into_par_iter()
        .map(|v| {
            let mut window: Vec<f64> = edges
                .ring(v, radius)
                .into_iter()
                .filter_map(|u| values.get(u).copied())
                .collect();
            if window.is_empty() {
                values[v]
            } else {
                median(&mut window)
            }
        })
        .collect()
}

fn mean_incident_edge_length(points: &[Point3<f64>], edges: &EdgeTable, v: usize) -> f64 {
    let nbrs = edges.neighbors(v);
    if nbrs.is_empty() {
        return 0.0;
    }
    let sum: f64 = nbrs
        .iter()
        .map(|&u| (points[u] - points[v]).norm())
        .sum();
    sum / nbrs.len() as f64
}

fn smooth_once(
    values: &[f64],
    points: &[Point3<f64>],
    edges: &EdgeTable,
    weighting: Weighting,
) -> Vec<f64> {
    (0..values.len())
        .into_par_iter()
        .map(|v| {
            let nbrs = edges.neighbors(v);
            let sigma = match weighting {
                Weighting::Combinatorial => 0.0,
                Weighting::Gaussian => mean_incident_edge_length(points, edges, v),
            };
            let mut sum = 0.0;
            let mut norm = 0.0;
            for &u in nbrs {
                let w = match weighting {
                    Weighting::Gaussian if sigma > 0.0 => {
                        let d2 = (points[u] - points[v]).norm_squared();
                        (-0.5 * d2 / (sigma * sigma)).exp()
                    }
                    _ => 1.0,
                };
                sum += w * values[u];
                norm += w;
            }
            if norm > 0.0 {
                sum / norm
            } else {
                values[v]
            }
        })
        .collect()
}

/// Iteratively replace each value by the weighted mean of its neighbours.
///
/// Isolated vertices keep their value. `points` is only read for
/// [`Weighting::Gaussian`].
pub fn smooth_values(
    values: &[f64],
    points: &[Point3<f64>],
    edges: &EdgeTable,
    iterations: usize,
    weighting: Weighting,
) -> Vec<f64> {
    let mut current = values.to_vec();
    for _ in 0..iterations {
        current = smooth_once(&current, points, edges, weighting);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    // Path 0-1-2-3-4 from degenerate strips of triangles.
    fn path() -> (Vec<Point3<f64>>, EdgeTable) {
        let points = (0..5).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let edges = EdgeTable::from_triangles(5, &[[0, 1, 1], [1, 2, 2], [2, 3, 3], [3, 4, 4]]);
        (points, edges)
    }

    #[test]
    fn median_removes_spike() {
        let (_, edges) = path();
        let values = [1.0, 1.0, 9.0, 1.0, 1.0];
        let out = median_filter(&values, &edges, 1);
        assert_eq!(out, vec![1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(median_filter(&values, &edges, 0), values.to_vec());
    }

    #[test]
    fn even_window_median_averages_middle_pair() {
        let mut v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&mut v), 2.5);
    }

    #[test]
    fn smoothing_preserves_constants() {
        let (points, edges) = path();
        let values = [2.0; 5];
        for w in [Weighting::Combinatorial, Weighting::Gaussian] {
            let out = smooth_values(&values, &points, &edges, 3, w);
            assert!(out.iter().all(|&v| (v - 2.0).abs() < 1e-12));
        }
    }

    #[test]
    fn combinatorial_smoothing_averages_neighbours() {
        let (points, edges) = path();
        let values = [0.0, 0.0, 6.0, 0.0, 0.0];
        let out = smooth_values(&values, &points, &edges, 1, Weighting::Combinatorial);
        assert_eq!(out, vec![0.0, 3.0, 0.0, 3.0, 0.0]);
    }
}
