//! Non-owning views handed to force terms for one evaluation pass.
use crate::error::ForceError;
use crate::image::Volume;
use crate::mesh::EdgeTable;
use nalgebra::{Point3, Vector3};

/// Snapshot of the deformable surface.
///
/// The optimizer owns the arrays; the view is valid for one pass. `revision`
/// changes whenever the points move: an update with the revision of the
/// previous update reuses its outputs.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceView<'a> {
    /// World coordinates of the vertices.
    pub points: &'a [Point3<f64>],
    /// Unit outward normals.
    pub normals: &'a [Vector3<f64>],
    /// Per-vertex active flags; `None` means every vertex is active.
    pub status: Option<&'a [bool]>,
    /// Connectivity, required for median filtering and smoothing.
    pub edges: Option<&'a EdgeTable>,
    pub revision: u64,
}

impl<'a> SurfaceView<'a> {
    pub fn new(points: &'a [Point3<f64>], normals: &'a [Vector3<f64>]) -> Self {
        Self {
            points,
            normals,
            status: None,
            edges: None,
            revision: 0,
        }
    }

    pub fn with_status(mut self, status: &'a [bool]) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_edges(mut self, edges: &'a EdgeTable) -> Self {
        self.edges = Some(edges);
        self
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn is_active(&self, v: usize) -> bool {
        self.status.map_or(true, |s| s.get(v).copied().unwrap_or(false))
    }

    pub fn active_mask(&self) -> Vec<bool> {
        (0..self.len()).map(|v| self.is_active(v)).collect()
    }

    /// Check that every per-vertex array has one entry per point.
    pub fn validate(&self) -> Result<(), ForceError> {
        let expected = self.points.len();
        let check = |what: &'static str, found: usize| {
            if found == expected {
                Ok(())
            } else {
                Err(ForceError::LengthMismatch {
                    what,
                    expected,
                    found,
                })
            }
        };
        check("normals", self.normals.len())?;
        if let Some(status) = self.status {
            check("status", status.len())?;
        }
        if let Some(edges) = self.edges {
            check("edge table", edges.num_vertices())?;
        }
        Ok(())
    }
}

/// Everything a force term reads during initialization and update.
#[derive(Clone, Copy, Debug)]
pub struct ForceInput<'a> {
    pub image: &'a Volume,
    pub surface: SurfaceView<'a>,
    pub white_matter_mask: Option<&'a Volume>,
    pub grey_matter_mask: Option<&'a Volume>,
}

impl<'a> ForceInput<'a> {
    pub fn new(image: &'a Volume, surface: SurfaceView<'a>) -> Self {
        Self {
            image,
            surface,
            white_matter_mask: None,
            grey_matter_mask: None,
        }
    }

    pub fn with_tissue_masks(
        mut self,
        white_matter: Option<&'a Volume>,
        grey_matter: Option<&'a Volume>,
    ) -> Self {
        self.white_matter_mask = white_matter;
        self.grey_matter_mask = grey_matter;
        self
    }

    /// Same masks and image, different surface snapshot.
    pub fn with_surface(mut self, surface: SurfaceView<'a>) -> Self {
        self.surface = surface;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_active() {
        let points = [Point3::origin(); 2];
        let normals = [Vector3::z(); 2];
        let view = SurfaceView::new(&points, &normals);
        assert_eq!(view.active_mask(), vec![true, true]);
        let status = [true, false];
        let view = view.with_status(&status);
        assert!(view.is_active(0) && !view.is_active(1));
        assert!(view.validate().is_ok());
    }

    #[test]
    fn length_mismatch_is_reported() {
        let points = [Point3::origin(); 3];
        let normals = [Vector3::z(); 2];
        let err = SurfaceView::new(&points, &normals).validate().unwrap_err();
        assert_eq!(
            err,
            ForceError::LengthMismatch {
                what: "normals",
                expected: 3,
                found: 2
            }
        );
    }
}
