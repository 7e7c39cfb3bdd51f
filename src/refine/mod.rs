mod chew;
mod ruppert;

use std::collections::VecDeque;

use crate::triangulation::{Observer, Triangulation};
use crate::{Float, Triangle};

/// The refinement strategy. Both take the same quality criteria and stop
/// when nothing is bad anymore or when a pass stops making progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineAlgorithm {
    /// Ruppert style: split encroached constraint segments first, then
    /// insert circumcenters of bad triangles.
    Ruppert,
    /// Chew style: clear the diametral circle of a blocking constraint
    /// segment and split it, otherwise insert the circumcenter.
    Chew,
}

/// Mesh quality criteria: a triangle is bad when its minimum interior angle
/// (radians) falls below `min_angle` or its area exceeds `max_area`.
#[derive(Debug, Clone, Copy)]
pub struct RefineCriteria {
    pub min_angle: Float,
    pub max_area: Float,
}

/// What a refinement run achieved. A stalled run is not a failure, it just
/// stopped early with `remaining_bad` triangles left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefineReport {
    pub passes: usize,
    pub remaining_bad: usize,
    pub stalled: bool,
}

impl RefineAlgorithm {
    pub(crate) fn refine(
        &self,
        triangulation: &mut Triangulation,
        criteria: RefineCriteria,
        observer: &mut dyn Observer,
    ) -> RefineReport {
        match self {
            RefineAlgorithm::Ruppert => ruppert::refine(triangulation, criteria, observer),
            RefineAlgorithm::Chew => chew::refine(triangulation, criteria, observer),
        }
    }
}

/// Current bad triangles. Triangles touching the super triangle are exempt,
/// they fall outside the meshed domain.
pub(crate) fn bad_triangles(
    triangulation: &Triangulation,
    criteria: &RefineCriteria,
) -> VecDeque<Triangle> {
    triangulation
        .triangles()
        .map(|(_, t)| *t)
        .filter(|t| !t.shares_vertex_with(triangulation.super_triangle()))
        .filter(|t| t.min_angle() < criteria.min_angle || t.area() > criteria.max_area)
        .collect()
}
