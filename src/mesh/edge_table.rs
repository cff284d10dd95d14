//! Vertex adjacency of a triangle mesh in compressed (CSR) form.
use std::collections::VecDeque;

/// Symmetric vertex adjacency built from triangles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeTable {
    offsets: Vec<usize>,
    neighbors: Vec<usize>,
}

impl EdgeTable {
    /// Build from triangles over `num_vertices` vertices. Duplicate edges are
    /// merged; indices out of range are ignored.
    pub fn from_triangles(num_vertices: usize, triangles: &[[usize; 3]]) -> Self {
        let mut lists: Vec<Vec<usize>> = vec![Vec::new(); num_vertices];
        for &[a, b, c] in triangles {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                if u == v || u >= num_vertices || v >= num_vertices {
                    continue;
                }
                lists[u].push(v);
                lists[v].push(u);
            }
        }
        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut neighbors = Vec::new();
        offsets.push(0);
        for mut list in lists {
            list.sort_unstable();
            list.dedup();
            neighbors.extend_from_slice(&list);
            offsets.push(neighbors.len());
        }
        Self { offsets, neighbors }
    }

    pub fn num_vertices(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.neighbors.len() / 2
    }

    /// Sorted adjacent vertices of `v`.
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[usize] {
        match (self.offsets.get(v), self.offsets.get(v + 1)) {
            (Some(&s), Some(&e)) => &self.neighbors[s..e],
            _ => &[],
        }
    }

    /// Vertices within `radius` edges of `v`, including `v` itself.
    pub fn ring(&self, v: usize, radius: usize) -> Vec<usize> {
        if v >= self.num_vertices() {
            return Vec::new();
        }
        let mut visited = vec![v];
        let mut queue = VecDeque::from([(v, 0usize)]);
        while let Some((u, depth)) = queue.pop_front() {
            if depth == radius {
                continue;
            }
            for &w in self.neighbors(u) {
                if !visited.contains(&w) {
                    visited.push(w);
                    queue.push_back((w, depth + 1));
                }
            }
        }
        visited
    }
}
