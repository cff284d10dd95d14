//! Unit icosphere and area-weighted vertex normals.
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// Subdivided icosahedron on the unit sphere, counter-clockwise (outward)
/// winding.
pub fn icosphere(subdivisions: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let raw = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let mut points: Vec<Point3<f64>> = raw
        .iter()
        .map(|&[x, y, z]| Point3::from(Vector3::new(x, y, z).normalize()))
        .collect();
    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut midpoint = |a: usize, b: usize, points: &mut Vec<Point3<f64>>| {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let m = (points[a].coords + points[b].coords).normalize();
                points.push(Point3::from(m));
                points.len() - 1
            })
        };
        let mut next = Vec::with_capacity(faces.len() * 4);
        for &[a, b, c] in &faces {
            let ab = midpoint(a, b, &mut points);
            let bc = midpoint(b, c, &mut points);
            let ca = midpoint(c, a, &mut points);
            next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = next;
    }
    (points, faces)
}

/// Unit vertex normals as the normalized sum of incident face normals
/// (area weighted). Vertices without a valid face get a zero normal.
pub fn vertex_normals(points: &[Point3<f64>], triangles: &[[usize; 3]]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); points.len()];
    for &[a, b, c] in triangles {
        let (Some(pa), Some(pb), Some(pc)) = (points.get(a), points.get(b), points.get(c)) else {
            continue;
        };
        let n = (pb - pa).cross(&(pc - pa));
        for v in [a, b, c] {
            normals[v] += n;
        }
    }
    for n in normals.iter_mut() {
        *n = n.try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
    }
    normals
}
