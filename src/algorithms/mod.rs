mod cavity;
mod edge_flip;

use crate::graph::NodeId;
use crate::triangulation::{Observer, Triangulation};
use crate::{Point, TriangulationError};

/// The insertion strategy of a [`Triangulation`]. A closed set: the two
/// algorithms are interchangeable per instance and mid-session, and an
/// algorithm that lacks an operation reports the capability gap instead of
/// omitting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Bowyer/Watson style: carve the cavity of triangles whose circumcircle
    /// contains the new site and re-fill it. Unconstrained insertion only.
    CavityBased,
    /// Lawson style: fan the containing triangle and restore the Delaunay
    /// property by edge flips. Also supports constrained edges, constraint
    /// splitting and site removal.
    EdgeFlip,
}

impl Algorithm {
    pub fn supports_constraints(&self) -> bool {
        matches!(self, Algorithm::EdgeFlip)
    }

    pub fn supports_removal(&self) -> bool {
        matches!(self, Algorithm::EdgeFlip)
    }

    pub(crate) fn place_unconstrained(
        &self,
        triangulation: &mut Triangulation,
        site: Point,
        observer: &mut dyn Observer,
    ) -> Result<(), TriangulationError> {
        match self {
            Algorithm::CavityBased => cavity::place(triangulation, site, observer),
            Algorithm::EdgeFlip => edge_flip::place(triangulation, site, observer),
        }
    }

    pub(crate) fn place_constrained(
        &self,
        triangulation: &mut Triangulation,
        site: Point,
        anchor: Point,
        observer: &mut dyn Observer,
    ) -> Result<(), TriangulationError> {
        match self {
            Algorithm::CavityBased => Err(TriangulationError::Unsupported(*self)),
            Algorithm::EdgeFlip => {
                edge_flip::place_constrained(triangulation, site, anchor, observer)
            }
        }
    }

    pub(crate) fn split_constraint(
        &self,
        triangulation: &mut Triangulation,
        segment: crate::Facet,
        midpoint: Point,
        observer: &mut dyn Observer,
    ) -> Result<(), TriangulationError> {
        match self {
            Algorithm::CavityBased => Err(TriangulationError::Unsupported(*self)),
            Algorithm::EdgeFlip => {
                edge_flip::split_constraint(triangulation, segment, midpoint, observer)
            }
        }
    }

    pub(crate) fn remove(
        &self,
        triangulation: &mut Triangulation,
        site: Point,
        observer: &mut dyn Observer,
    ) -> Result<(), TriangulationError> {
        match self {
            Algorithm::CavityBased => Err(TriangulationError::Unsupported(*self)),
            Algorithm::EdgeFlip => edge_flip::remove(triangulation, site, observer),
        }
    }
}

/// Link every new triangle to its actual neighbors among the new and
/// surviving triangles. The shared-facet test is the ground truth here, not
/// whatever the graph said before the mutation.
pub(crate) fn link_new(
    triangulation: &mut Triangulation,
    new_ids: &[NodeId],
    external: &[NodeId],
) {
    for (i, &a) in new_ids.iter().enumerate() {
        let Some(ta) = triangulation.triangle(a).copied() else {
            continue;
        };
        for &b in new_ids[i + 1..].iter().chain(external.iter()) {
            if a == b {
                continue;
            }
            let Some(tb) = triangulation.triangle(b).copied() else {
                continue;
            };
            if ta.is_neighbor(&tb) {
                triangulation.link_triangles(a, b);
            }
        }
    }
}
