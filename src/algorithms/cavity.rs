use std::collections::{HashSet, VecDeque};

use crate::algorithms::link_new;
use crate::graph::NodeId;
use crate::triangle::{Facet, Triangle};
use crate::triangulation::{Observer, Triangulation};
use crate::{CircleSide, Point, TriangulationError};

/// Cavity-based unconstrained insertion: breadth-first grow the set of
/// triangles whose circumcircle strictly contains the site, delete it, and
/// fan the site to the cavity boundary.
pub(crate) fn place(
    triangulation: &mut Triangulation,
    site: Point,
    observer: &mut dyn Observer,
) -> Result<(), TriangulationError> {
    let start = triangulation
        .locate_with_observer(site, observer)
        .ok_or(TriangulationError::NoContainingTriangle(site))?;
    let start_triangle = triangulation
        .triangle(start)
        .copied()
        .ok_or(TriangulationError::NoContainingTriangle(site))?;
    if start_triangle.has_vertex(site) {
        // site coincides with an existing vertex
        return Ok(());
    }

    let cavity = grow_cavity(triangulation, site, start);
    observer.cavity_grown(cavity.len());

    // the cavity boundary is the set of facets belonging to exactly one
    // cavity triangle, an xor accumulation over all their facets
    let mut boundary: HashSet<Facet> = HashSet::new();
    for id in &cavity {
        let Some(triangle) = triangulation.triangle(*id) else {
            continue;
        };
        for facet in triangle.facets() {
            if !boundary.remove(&facet) {
                boundary.insert(facet);
            }
        }
    }

    // neighbors that survive the carve, captured before any removal
    let cavity_set: HashSet<NodeId> = cavity.iter().copied().collect();
    let mut external: Vec<NodeId> = vec![];
    for id in &cavity {
        for nb in triangulation.neighbors(*id) {
            if !cavity_set.contains(&nb) && !external.contains(&nb) {
                external.push(nb);
            }
        }
    }

    // build all replacements up front so a degenerate facet cannot leave a
    // half-carved graph behind
    let mut replacements = Vec::with_capacity(boundary.len());
    for facet in &boundary {
        let [a, b] = facet.endpoints();
        replacements.push(Triangle::new(a, b, site)?);
    }

    for id in cavity {
        triangulation.remove_triangle(id);
    }
    let new_ids: Vec<NodeId> = replacements
        .into_iter()
        .map(|t| triangulation.insert_triangle(t))
        .collect();
    link_new(triangulation, &new_ids, &external);
    Ok(())
}

/// All triangles with the site strictly inside their circumcircle, reached
/// from the containing triangle.
fn grow_cavity(triangulation: &Triangulation, site: Point, start: NodeId) -> Vec<NodeId> {
    let mut cavity = vec![];
    let mut queue = VecDeque::from([start]);
    let mut marked: HashSet<NodeId> = HashSet::from([start]);

    while let Some(id) = queue.pop_front() {
        let Some(triangle) = triangulation.triangle(id) else {
            continue;
        };
        if site.side_of_circumcircle(&triangle.vertices()) != CircleSide::Inside {
            continue;
        }
        cavity.push(id);
        for nb in triangulation.neighbors(id) {
            if marked.insert(nb) {
                queue.push_back(nb);
            }
        }
    }
    cavity
}
