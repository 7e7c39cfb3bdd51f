use std::collections::{HashSet, VecDeque};

use crate::algorithms::link_new;
use crate::graph::NodeId;
use crate::triangle::{Facet, Triangle};
use crate::triangulation::{Observer, Triangulation};
use crate::{CircleSide, Point, TriangulationError};

/// A facet paired with one of its adjacent triangles, the work item of the
/// flip relaxation.
#[derive(Debug, Clone, Copy)]
struct FlipCandidate {
    facet: Facet,
    triangle: NodeId,
}

/// Queue of facets to check for flipping. Each facet is queued at most once
/// at a time; pushing a facet that is already queued updates which triangle
/// it pairs with instead of re-enqueueing.
#[derive(Default)]
struct FlipQueue {
    queue: VecDeque<FlipCandidate>,
    marked: HashSet<Facet>,
}

impl FlipQueue {
    fn push(&mut self, facet: Facet, triangle: NodeId) {
        if self.marked.insert(facet) {
            self.queue.push_back(FlipCandidate { facet, triangle });
        } else if let Some(pair) = self.queue.iter_mut().find(|p| p.facet == facet) {
            pair.triangle = triangle;
        }
    }

    fn pop(&mut self) -> Option<FlipCandidate> {
        let candidate = self.queue.pop_front()?;
        self.marked.remove(&candidate.facet);
        Some(candidate)
    }
}

/// Edge-flip unconstrained insertion: fan the containing triangle from the
/// site, then relax by flipping until every facet is locally Delaunay again.
pub(crate) fn place(
    triangulation: &mut Triangulation,
    site: Point,
    observer: &mut dyn Observer,
) -> Result<(), TriangulationError> {
    let primary = triangulation
        .locate_with_observer(site, observer)
        .ok_or(TriangulationError::NoContainingTriangle(site))?;
    let primary_triangle = triangulation
        .triangle(primary)
        .copied()
        .ok_or(TriangulationError::NoContainingTriangle(site))?;
    if primary_triangle.has_vertex(site) {
        // site coincides with an existing vertex
        return Ok(());
    }

    let vertices = primary_triangle.vertices();
    let mut fan = Vec::with_capacity(3);
    for vertex in vertices {
        let [a, b] = primary_triangle.facet_opposite(vertex).endpoints();
        fan.push(Triangle::new(a, b, site)?);
    }
    // outward neighbors, captured before the containing triangle goes away
    let outward: Vec<Option<NodeId>> = vertices
        .iter()
        .map(|v| triangulation.neighbor_opposite(*v, primary))
        .collect();

    triangulation.remove_triangle(primary);
    let ids: Vec<NodeId> = fan
        .iter()
        .map(|t| triangulation.insert_triangle(*t))
        .collect();
    for (id, nb) in ids.iter().zip(outward) {
        if let Some(nb) = nb {
            triangulation.link_triangles(*id, nb);
        }
    }
    // the fan triangles pairwise share a facet through the site
    triangulation.link_triangles(ids[0], ids[1]);
    triangulation.link_triangles(ids[0], ids[2]);
    triangulation.link_triangles(ids[1], ids[2]);

    let mut queue = FlipQueue::default();
    for (triangle, id) in fan.iter().zip(&ids) {
        queue.push(triangle.facet_opposite(site), *id);
    }
    relax(triangulation, queue, observer)
}

/// Constrained insertion: walk the triangles crossed by the segment from
/// `site` towards `anchor`, re-triangulate that corridor so the segment
/// comes out as a facet, then relax around it. Both endpoints are already
/// sites and the segment is already registered, so the relaxation will not
/// flip it away. All conflict detection happens before any mutation.
pub(crate) fn place_constrained(
    triangulation: &mut Triangulation,
    site: Point,
    anchor: Point,
    observer: &mut dyn Observer,
) -> Result<(), TriangulationError> {
    let segment = Facet::new(site, anchor);
    let start = triangulation
        .locate_with_observer(site, observer)
        .ok_or(TriangulationError::NoContainingTriangle(site))?;
    let start_triangle = triangulation
        .triangle(start)
        .copied()
        .ok_or(TriangulationError::NoContainingTriangle(site))?;
    if !start_triangle.has_vertex(site) {
        return Err(TriangulationError::NoContainingTriangle(site));
    }

    let ring = triangulation.surrounding_triangles(site, start);
    // nothing to carve when the segment is already a facet
    for id in &ring {
        if triangulation
            .triangle(*id)
            .map_or(false, |t| t.has_vertex(anchor))
        {
            return Ok(());
        }
    }

    // the incident triangle the segment leaves through
    let mut current = ring
        .iter()
        .copied()
        .find(|id| {
            triangulation
                .triangle(*id)
                .map_or(false, |t| t.facet_opposite(site).intersects(&segment, false))
        })
        .ok_or(TriangulationError::ConstraintConflict)?;
    let mut crossed = triangulation
        .triangle(current)
        .copied()
        .ok_or(TriangulationError::ConstraintConflict)?
        .facet_opposite(site);
    if triangulation.is_constrained(&crossed) {
        // overlapping constraints are invalid input
        return Err(TriangulationError::ConstraintConflict);
    }

    let mut removable = vec![current];
    let mut affected: Vec<NodeId> = triangulation.neighbors(current).collect();
    let mut replacements: Vec<Triangle> = vec![];
    // far edges of emitted triangles, they decide site vs anchor below
    let mut far_edges: Vec<Facet> = vec![];

    loop {
        // cross the facet into the next triangle
        let current_triangle = triangulation
            .triangle(current)
            .copied()
            .ok_or(TriangulationError::ConstraintConflict)?;
        let off = current_triangle
            .other_vertex(&crossed.endpoints())
            .ok_or(TriangulationError::ConstraintConflict)?;
        current = triangulation
            .neighbor_opposite(off, current)
            .ok_or(TriangulationError::ConstraintConflict)?;
        let next_triangle = triangulation
            .triangle(current)
            .copied()
            .ok_or(TriangulationError::ConstraintConflict)?;
        removable.push(current);
        affected.extend(triangulation.neighbors(current));

        let previous = crossed;
        let far = next_triangle
            .other_vertex(&previous.endpoints())
            .ok_or(TriangulationError::ConstraintConflict)?;
        if far == anchor {
            // close the fan: the last triangle's walls join site and anchor
            for wall_vertex in previous.endpoints() {
                let closing = Triangle::new(wall_vertex, site, anchor)?;
                if !replacements.contains(&closing) {
                    replacements.push(closing);
                }
            }
            break;
        }

        crossed = next_triangle
            .facets()
            .into_iter()
            .find(|f| *f != previous && f.intersects(&segment, false))
            .ok_or(TriangulationError::ConstraintConflict)?;
        if triangulation.is_constrained(&crossed) {
            return Err(TriangulationError::ConstraintConflict);
        }

        let wall_vertex = next_triangle
            .other_vertex(&crossed.endpoints())
            .ok_or(TriangulationError::ConstraintConflict)?;
        // connect towards the site unless that would cross an edge emitted
        // earlier, then fall back to the anchor side
        let sight = Facet::new(far, site);
        let apex = if far_edges.iter().any(|e| e.intersects(&sight, false)) {
            anchor
        } else {
            site
        };
        far_edges.push(Facet::new(far, wall_vertex));
        let emitted = Triangle::new(far, wall_vertex, apex)?;
        if !replacements.contains(&emitted) {
            replacements.push(emitted);
        }
    }

    // every check passed, now mutate
    let removable_set: HashSet<NodeId> = removable.iter().copied().collect();
    let external: Vec<NodeId> = affected
        .into_iter()
        .filter(|id| !removable_set.contains(id))
        .collect();
    for id in removable {
        triangulation.remove_triangle(id);
    }
    let ids: Vec<NodeId> = replacements
        .iter()
        .map(|t| triangulation.insert_triangle(*t))
        .collect();
    link_new(triangulation, &ids, &external);

    let mut queue = FlipQueue::default();
    for (triangle, id) in replacements.iter().zip(&ids) {
        for facet in triangle.facets() {
            queue.push(facet, *id);
        }
    }
    relax(triangulation, queue, observer)
}

/// Replace the two triangles adjacent to the segment with four around its
/// midpoint, then relax. The constraint set has already been updated to the
/// two halves.
pub(crate) fn split_constraint(
    triangulation: &mut Triangulation,
    segment: Facet,
    midpoint: Point,
    observer: &mut dyn Observer,
) -> Result<(), TriangulationError> {
    let [a, b] = segment.endpoints();
    let start = triangulation
        .locate_with_observer(a, observer)
        .ok_or(TriangulationError::NoContainingTriangle(a))?;
    let start_triangle = triangulation
        .triangle(start)
        .copied()
        .ok_or(TriangulationError::NoContainingTriangle(a))?;
    if !start_triangle.has_vertex(a) {
        return Err(TriangulationError::NoContainingTriangle(a));
    }

    let ring = triangulation.surrounding_triangles(a, start);
    let adjacent: Vec<NodeId> = ring
        .into_iter()
        .filter(|id| {
            triangulation
                .triangle(*id)
                .map_or(false, |t| t.has_vertex(b))
        })
        .collect();
    if adjacent.len() != 2 {
        return Err(TriangulationError::UnknownConstraint);
    }

    let mut replacements = Vec::with_capacity(4);
    for id in &adjacent {
        let apex = triangulation
            .triangle(*id)
            .and_then(|t| t.other_vertex(&[a, b]))
            .ok_or(TriangulationError::UnknownConstraint)?;
        replacements.push(Triangle::new(apex, midpoint, a)?);
        replacements.push(Triangle::new(apex, midpoint, b)?);
    }

    let mut external: Vec<NodeId> = vec![];
    for id in &adjacent {
        for nb in triangulation.neighbors(*id) {
            if !adjacent.contains(&nb) && !external.contains(&nb) {
                external.push(nb);
            }
        }
    }
    for id in adjacent {
        triangulation.remove_triangle(id);
    }
    let ids: Vec<NodeId> = replacements
        .iter()
        .map(|t| triangulation.insert_triangle(*t))
        .collect();
    link_new(triangulation, &ids, &external);

    let mut queue = FlipQueue::default();
    for (triangle, id) in replacements.iter().zip(&ids) {
        queue.push(triangle.facet_opposite(midpoint), *id);
    }
    relax(triangulation, queue, observer)
}

/// Remove a site by re-fanning its surrounding polygon from an anchor
/// vertex, then relax. Not proven correct when the surrounding polygon is
/// non-convex; see [`Triangulation::remove`].
pub(crate) fn remove(
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
    if !start_triangle.has_vertex(site) {
        return Err(TriangulationError::NoContainingTriangle(site));
    }

    let ring = triangulation.surrounding_triangles(site, start);
    let anchor = start_triangle
        .other_vertex(&[site])
        .ok_or(TriangulationError::NoContainingTriangle(site))?;

    let mut replacements: Vec<Triangle> = vec![];
    let mut affected: Vec<NodeId> = vec![];
    for id in &ring {
        affected.extend(triangulation.neighbors(*id));
        let facet = triangulation
            .triangle(*id)
            .copied()
            .ok_or(TriangulationError::NoContainingTriangle(site))?
            .facet_opposite(site);
        if facet.contains(anchor) {
            continue;
        }
        let [a, b] = facet.endpoints();
        let replacement = Triangle::new(a, b, anchor)?;
        if !replacements.contains(&replacement) {
            replacements.push(replacement);
        }
    }

    let ring_set: HashSet<NodeId> = ring.iter().copied().collect();
    let external: Vec<NodeId> = affected
        .into_iter()
        .filter(|id| !ring_set.contains(id))
        .collect();
    for id in ring {
        triangulation.remove_triangle(id);
    }
    let ids: Vec<NodeId> = replacements
        .iter()
        .map(|t| triangulation.insert_triangle(*t))
        .collect();
    link_new(triangulation, &ids, &external);

    let mut queue = FlipQueue::default();
    for (triangle, id) in replacements.iter().zip(&ids) {
        for facet in triangle.facets() {
            queue.push(facet, *id);
        }
    }
    relax(triangulation, queue, observer)
}

/// Flip relaxation: pop facets, skip constraints, and flip whenever the
/// vertex across the facet sits strictly inside the circumcircle on this
/// side. Newly exposed facets go back on the queue.
fn relax(
    triangulation: &mut Triangulation,
    mut queue: FlipQueue,
    observer: &mut dyn Observer,
) -> Result<(), TriangulationError> {
    while let Some(FlipCandidate { facet, triangle: id }) = queue.pop() {
        if triangulation.is_constrained(&facet) {
            continue;
        }
        let Some(current) = triangulation.triangle(id).copied() else {
            continue;
        };
        if !current.has_facet(&facet) {
            continue;
        }
        let [fa, fb] = facet.endpoints();
        let Some(apex) = current.other_vertex(&[fa, fb]) else {
            continue;
        };
        let Some(opposite_id) = triangulation.neighbor_opposite(apex, id) else {
            continue;
        };
        let Some(opposite) = triangulation.triangle(opposite_id).copied() else {
            continue;
        };
        let Some(far) = opposite.other_vertex(&[fa, fb]) else {
            continue;
        };
        if far.side_of_circumcircle(&current.vertices()) != CircleSide::Inside {
            continue;
        }

        // flip: the pair on `facet` becomes a pair joined on apex-far
        let replacement_a = Triangle::new(apex, far, fa)?;
        let replacement_b = Triangle::new(apex, far, fb)?;
        let external: Vec<NodeId> = triangulation
            .neighbors(id)
            .chain(triangulation.neighbors(opposite_id))
            .filter(|nb| *nb != id && *nb != opposite_id)
            .collect();

        triangulation.remove_triangle(id);
        triangulation.remove_triangle(opposite_id);
        let id_a = triangulation.insert_triangle(replacement_a);
        let id_b = triangulation.insert_triangle(replacement_b);
        link_new(triangulation, &[id_a, id_b], &external);
        observer.edge_flipped(&facet);

        let inner = Facet::new(apex, far);
        for (triangle, tid) in [(replacement_a, id_a), (replacement_b, id_b)] {
            for outer in triangle.facets() {
                if outer != inner {
                    queue.push(outer, tid);
                }
            }
        }
    }
    Ok(())
}
