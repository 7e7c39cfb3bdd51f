use std::cell::Cell;
use std::collections::HashSet;

use crate::algorithms::Algorithm;
use crate::graph::{AdjacencyGraph, NodeId};
use crate::refine::{RefineAlgorithm, RefineCriteria, RefineReport};
use crate::triangle::{Facet, Triangle};
use crate::{Point, TriangulationError};

/// Observer for a triangulation, used to monitor what the mutation and
/// refinement operations do. Quite useful for visual debugging and for
/// counting events in tests; all methods default to no-ops.
#[allow(unused_variables)]
pub trait Observer {
    /// A site was inserted
    fn site_inserted(&mut self, site: Point) {}

    /// A site was removed
    fn site_removed(&mut self, site: Point) {}

    /// A constraint segment was registered
    fn constraint_inserted(&mut self, segment: &Facet) {}

    /// A requested constraint was rejected, the triangulation is unchanged
    fn constraint_rejected(&mut self, segment: &Facet) {}

    /// A constraint segment was split about its midpoint
    fn constraint_split(&mut self, segment: &Facet, midpoint: Point) {}

    /// A cavity was carved for an insertion
    #[inline]
    fn cavity_grown(&mut self, size: usize) {}

    /// An edge flip happened, `facet` is gone
    #[inline]
    fn edge_flipped(&mut self, facet: &Facet) {}

    /// The directed walk failed and locate fell back to a full scan
    fn locate_fallback(&mut self, point: Point) {}

    /// No triangle contains the point, even after the fallback scan
    fn locate_failed(&mut self, point: Point) {}

    /// A refinement pass started with this many bad triangles
    fn refinement_pass(&mut self, bad_count: usize) {}

    /// Refinement stopped making progress and aborted
    fn refinement_stalled(&mut self, remaining: usize) {}

    /// A bad triangle whose circumcenter escapes the domain was skipped;
    /// `wide_vertex` is its vertex of maximum angle
    fn refinement_skipped(&mut self, triangle: &Triangle, wide_vertex: Point) {}
}

/// Default dummy observer, blank impl, so all calls should be optimized out
/// by the compiler.
impl Observer for () {}

/// Outcome of [`Triangulation::place`]. Duplicate and out-of-bounds sites
/// are ordinary no-ops, not errors, but callers can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    Inserted,
    Duplicate,
    OutOfBounds,
}

impl PlaceOutcome {
    pub fn inserted(&self) -> bool {
        matches!(self, PlaceOutcome::Inserted)
    }
}

/// Axis-aligned bounding rectangle. Sites outside it are rejected before
/// they reach the insertion algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// The bounding box of a triangle.
    pub fn around(triangle: &Triangle) -> Self {
        let [a, b, c] = triangle.vertices();
        Self {
            min: Point::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y)),
            max: Point::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y)),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Triangulation builder
///
/// # Example
/// ```rust
///    use delaunay_incr::{Algorithm, Point, Triangle, TriangulationBuilder};
///
///    let super_triangle = Triangle::new(
///        Point::new(-10000., -10000.),
///        Point::new(10000., -10000.),
///        Point::new(0., 10000.),
///    ).unwrap();
///    let mut triangulation = TriangulationBuilder::new(super_triangle)
///        .algorithm(Algorithm::EdgeFlip)
///        .build();
///    triangulation.place(Point::new(1., 2.)).unwrap();
/// ```
#[derive(Clone)]
pub struct TriangulationBuilder {
    super_triangle: Triangle,
    algorithm: Algorithm,
    bounds: Option<Rect>,
}

impl TriangulationBuilder {
    /// All sites must fall within the super triangle.
    pub fn new(super_triangle: Triangle) -> Self {
        Self {
            super_triangle,
            algorithm: Algorithm::EdgeFlip,
            bounds: None,
        }
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Override the bounding rectangle. Defaults to the super triangle's
    /// bounding box.
    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn build(self) -> Triangulation {
        let bounds = self
            .bounds
            .unwrap_or_else(|| Rect::around(&self.super_triangle));
        let mut graph = AdjacencyGraph::new();
        let initial = graph.insert(self.super_triangle);
        Triangulation {
            graph,
            super_triangle: self.super_triangle,
            sites: HashSet::new(),
            constraints: HashSet::new(),
            bounds,
            algorithm: self.algorithm,
            locate_cache: Cell::new(Some(initial)),
        }
    }
}

/// A 2D Delaunay triangulation with incremental site insertion, optional
/// boundary constraints (a PSLG) and quality refinement.
///
/// Not the fastest way to build a triangulation, but a reasonable way to
/// build one incrementally while keeping it valid after every operation.
/// The triangle set always covers the super triangle's region; constrained
/// facets are exempt from the empty-circumcircle property and can only go
/// away through [`Triangulation::split_constraint`].
pub struct Triangulation {
    graph: AdjacencyGraph<Triangle>,
    super_triangle: Triangle,
    sites: HashSet<Point>,
    constraints: HashSet<Facet>,
    bounds: Rect,
    algorithm: Algorithm,
    // most recently touched triangle, seeds the directed walk
    locate_cache: Cell<Option<NodeId>>,
}

impl Triangulation {
    /// New triangulation with the super triangle's bounding box as bounds.
    pub fn new(super_triangle: Triangle, algorithm: Algorithm) -> Self {
        TriangulationBuilder::new(super_triangle)
            .algorithm(algorithm)
            .build()
    }

    pub fn super_triangle(&self) -> &Triangle {
        &self.super_triangle
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Switch the insertion algorithm. Takes effect for later operations;
    /// the triangle set is untouched.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// All sites currently in the triangulation. Super triangle corners are
    /// not sites.
    pub fn sites(&self) -> &HashSet<Point> {
        &self.sites
    }

    /// The registered constraint segments.
    pub fn constraints(&self) -> &HashSet<Facet> {
        &self.constraints
    }

    pub fn is_constrained(&self, facet: &Facet) -> bool {
        self.constraints.contains(facet)
    }

    /// Iterate over all live triangles.
    pub fn triangles(&self) -> impl Iterator<Item = (NodeId, &Triangle)> {
        self.graph.nodes()
    }

    pub fn triangle(&self, id: NodeId) -> Option<&Triangle> {
        self.graph.get(id)
    }

    pub fn triangle_count(&self) -> usize {
        self.graph.len()
    }

    /// Find the live node holding exactly this triangle, if any.
    pub fn find_triangle(&self, triangle: &Triangle) -> Option<NodeId> {
        self.graph
            .nodes()
            .find(|(_, t)| *t == triangle)
            .map(|(id, _)| id)
    }

    /// The triangles adjacent to the given one.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.neighbors(id)
    }

    /// Neighbor opposite the given vertex of the triangle, `None` on the
    /// hull.
    ///
    /// Panics when `vertex` is not a corner of the triangle.
    pub fn neighbor_opposite(&self, vertex: Point, id: NodeId) -> Option<NodeId> {
        let triangle = self.graph.get(id)?;
        assert!(triangle.has_vertex(vertex), "vertex not in triangle");
        self.graph
            .neighbors(id)
            .find(|nb| self.graph.get(*nb).map_or(false, |t| !t.has_vertex(vertex)))
    }

    /// The triangles surrounding `site` in order (cw or ccw), walking from
    /// neighbor to neighbor with a rotating guide vertex.
    ///
    /// Panics when `site` is not a corner of the start triangle.
    pub fn surrounding_triangles(&self, site: Point, start: NodeId) -> Vec<NodeId> {
        let start_triangle = match self.graph.get(start) {
            Some(t) => *t,
            None => return vec![],
        };
        assert!(start_triangle.has_vertex(site), "site not in triangle");

        let mut ring = vec![];
        let mut current = start;
        let mut guide = match start_triangle.other_vertex(&[site]) {
            Some(guide) => guide,
            None => return vec![],
        };
        loop {
            ring.push(current);
            let previous = current;
            let Some(next) = self.neighbor_opposite(guide, current) else {
                // ring is open, site touches the hull
                break;
            };
            guide = match self
                .graph
                .get(previous)
                .and_then(|t| t.other_vertex(&[site, guide]))
            {
                Some(g) => g,
                None => break,
            };
            current = next;
            if current == start {
                break;
            }
        }
        ring
    }

    /// Locate the triangle with `point` inside it or on its boundary.
    ///
    /// Directed walk from the cached triangle; falls back to a scan over all
    /// live triangles when the walk goes nowhere (reported through the
    /// observer, not a failure). `None` only when truly no triangle holds
    /// the point.
    pub fn locate(&self, point: Point) -> Option<NodeId> {
        self.locate_with_observer(point, &mut ())
    }

    pub fn locate_with_observer(
        &self,
        point: Point,
        observer: &mut dyn Observer,
    ) -> Option<NodeId> {
        let mut current = self
            .locate_cache
            .get()
            .filter(|id| self.graph.contains(*id))
            .or_else(|| self.graph.nodes().next().map(|(id, _)| id));

        let mut visited = HashSet::new();
        while let Some(id) = current {
            if !visited.insert(id) {
                // caught in a locate loop, bail out to the scan
                break;
            }
            let Some(triangle) = self.graph.get(id) else {
                break;
            };
            match point.is_outside_of(&triangle.vertices()) {
                None => {
                    self.locate_cache.set(Some(id));
                    return Some(id);
                }
                Some(corner) => current = self.neighbor_opposite(corner, id),
            }
        }

        observer.locate_fallback(point);
        for (id, triangle) in self.graph.nodes() {
            if point.is_outside_of(&triangle.vertices()).is_none() {
                self.locate_cache.set(Some(id));
                return Some(id);
            }
        }
        observer.locate_failed(point);
        None
    }

    /// Insert a site. Duplicates and out-of-bounds points are no-ops and
    /// reported as such in the outcome.
    pub fn place(&mut self, site: Point) -> Result<PlaceOutcome, TriangulationError> {
        self.place_with_observer(site, &mut ())
    }

    pub fn place_with_observer(
        &mut self,
        site: Point,
        observer: &mut dyn Observer,
    ) -> Result<PlaceOutcome, TriangulationError> {
        if self.sites.contains(&site) || self.super_triangle.has_vertex(site) {
            return Ok(PlaceOutcome::Duplicate);
        }
        if !self.bounds.contains(site) {
            return Ok(PlaceOutcome::OutOfBounds);
        }
        let algorithm = self.algorithm;
        algorithm.place_unconstrained(self, site, observer)?;
        self.sites.insert(site);
        observer.site_inserted(site);
        debug_assert!(self.check_invariant());
        Ok(PlaceOutcome::Inserted)
    }

    /// Insert a constrained edge between `site` and `anchor`, inserting
    /// missing endpoints unconstrained first. On failure nothing is
    /// recorded and the triangulation is left as it was.
    pub fn place_constrained(
        &mut self,
        site: Point,
        anchor: Point,
    ) -> Result<(), TriangulationError> {
        self.place_constrained_with_observer(site, anchor, &mut ())
    }

    pub fn place_constrained_with_observer(
        &mut self,
        site: Point,
        anchor: Point,
        observer: &mut dyn Observer,
    ) -> Result<(), TriangulationError> {
        let algorithm = self.algorithm;
        if !algorithm.supports_constraints() {
            return Err(TriangulationError::Unsupported(algorithm));
        }
        for endpoint in [site, anchor] {
            if !self.bounds.contains(endpoint) {
                return Err(TriangulationError::OutOfBounds(endpoint));
            }
        }
        if site == anchor {
            return Ok(());
        }
        self.place_with_observer(anchor, observer)?;
        self.place_with_observer(site, observer)?;

        let segment = Facet::new(site, anchor);
        if self.constraints.contains(&segment) {
            return Ok(());
        }
        // register up front so the relaxation pass already respects the
        // segment; unregister if the algorithm gives up
        self.constraints.insert(segment);
        match algorithm.place_constrained(self, site, anchor, observer) {
            Ok(()) => {
                observer.constraint_inserted(&segment);
                debug_assert!(self.check_invariant());
                Ok(())
            }
            Err(err) => {
                self.constraints.remove(&segment);
                observer.constraint_rejected(&segment);
                Err(err)
            }
        }
    }

    /// Split a constraint segment about its midpoint: the segment is
    /// replaced in the constraint set by its two halves and the midpoint
    /// becomes a site.
    pub fn split_constraint(&mut self, segment: &Facet) -> Result<(), TriangulationError> {
        self.split_constraint_with_observer(segment, &mut ())
    }

    pub fn split_constraint_with_observer(
        &mut self,
        segment: &Facet,
        observer: &mut dyn Observer,
    ) -> Result<(), TriangulationError> {
        let algorithm = self.algorithm;
        if !algorithm.supports_constraints() {
            return Err(TriangulationError::Unsupported(algorithm));
        }
        if !self.constraints.contains(segment) {
            return Err(TriangulationError::UnknownConstraint);
        }
        let [a, b] = segment.endpoints();
        let midpoint = segment.midpoint();
        let half_a = Facet::new(a, midpoint);
        let half_b = Facet::new(midpoint, b);

        self.constraints.remove(segment);
        self.constraints.insert(half_a);
        self.constraints.insert(half_b);
        let midpoint_is_new = self.sites.insert(midpoint);

        match algorithm.split_constraint(self, *segment, midpoint, observer) {
            Ok(()) => {
                observer.constraint_split(segment, midpoint);
                debug_assert!(self.check_invariant());
                Ok(())
            }
            Err(err) => {
                self.constraints.remove(&half_a);
                self.constraints.remove(&half_b);
                self.constraints.insert(*segment);
                if midpoint_is_new {
                    self.sites.remove(&midpoint);
                }
                Err(err)
            }
        }
    }

    /// Remove a site, re-triangulating the polygon it leaves behind.
    /// Unknown sites are a no-op (`Ok(false)`).
    ///
    /// Known limitation: the local re-fan is not proven correct when the
    /// surrounding polygon is non-convex; callers should re-validate with
    /// [`Triangulation::check_invariant`] on such inputs.
    pub fn remove(&mut self, site: Point) -> Result<bool, TriangulationError> {
        self.remove_with_observer(site, &mut ())
    }

    pub fn remove_with_observer(
        &mut self,
        site: Point,
        observer: &mut dyn Observer,
    ) -> Result<bool, TriangulationError> {
        let algorithm = self.algorithm;
        if !algorithm.supports_removal() {
            return Err(TriangulationError::Unsupported(algorithm));
        }
        if !self.sites.contains(&site) {
            return Ok(false);
        }
        algorithm.remove(self, site, observer)?;
        self.sites.remove(&site);
        observer.site_removed(site);
        debug_assert!(self.check_invariant());
        Ok(true)
    }

    /// Refine the mesh until no triangle violates the quality criteria or
    /// the algorithm stalls.
    pub fn refine(&mut self, algorithm: RefineAlgorithm, criteria: RefineCriteria) -> RefineReport {
        self.refine_with_observer(algorithm, criteria, &mut ())
    }

    pub fn refine_with_observer(
        &mut self,
        algorithm: RefineAlgorithm,
        criteria: RefineCriteria,
        observer: &mut dyn Observer,
    ) -> RefineReport {
        algorithm.refine(self, criteria, observer)
    }

    /// Validate the adjacency structure: a triangle with k super-triangle
    /// corners has 0 neighbors for k = 3, 2 for k = 2 and 3 otherwise, every
    /// link is symmetric, and linked triangles really share a facet.
    pub fn check_invariant(&self) -> bool {
        for (id, triangle) in self.graph.nodes() {
            let neighbors: Vec<NodeId> = self.graph.neighbors(id).collect();
            let super_corners = triangle
                .vertices()
                .iter()
                .filter(|v| self.super_triangle.has_vertex(**v))
                .count();
            let expected = match super_corners {
                3 => 0,
                2 => 2,
                _ => 3,
            };
            if neighbors.len() != expected {
                return false;
            }
            for nb in neighbors {
                let Some(nb_triangle) = self.graph.get(nb) else {
                    return false;
                };
                if !nb_triangle.is_neighbor(triangle) {
                    return false;
                }
                if !self.graph.neighbors(nb).any(|back| back == id) {
                    return false;
                }
            }
        }
        true
    }

    // -- mutation primitives for the insertion algorithms --

    pub(crate) fn insert_triangle(&mut self, triangle: Triangle) -> NodeId {
        let id = self.graph.insert(triangle);
        self.locate_cache.set(Some(id));
        id
    }

    pub(crate) fn remove_triangle(&mut self, id: NodeId) {
        self.graph.remove(id);
        if self.locate_cache.get() == Some(id) {
            self.locate_cache.set(None);
        }
    }

    pub(crate) fn link_triangles(&mut self, a: NodeId, b: NodeId) {
        self.graph.link(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CircleSide, Float};
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    fn super_triangle() -> Triangle {
        Triangle::new(
            Point::new(-10000., -10000.),
            Point::new(10000., -10000.),
            Point::new(0., 10000.),
        )
        .unwrap()
    }

    fn assert_empty_circumcircle(triangulation: &Triangulation) {
        for (_, triangle) in triangulation.triangles() {
            for site in triangulation.sites() {
                if triangle.has_vertex(*site) {
                    continue;
                }
                if triangle
                    .facets()
                    .iter()
                    .any(|f| triangulation.is_constrained(f))
                {
                    continue;
                }
                assert_ne!(
                    site.side_of_circumcircle(&triangle.vertices()),
                    CircleSide::Inside,
                    "site {site:?} inside circumcircle of {triangle:?}",
                );
            }
        }
    }

    fn random_points(count: usize, seed: u64) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                Point::new(
                    rng.gen_range(-400.0..400.0) as Float,
                    rng.gen_range(-400.0..400.0) as Float,
                )
            })
            .collect()
    }

    #[derive(Default)]
    struct CountingObserver {
        inserts: u64,
        flips: u64,
        cavities: u64,
        fallbacks: u64,
    }

    impl Observer for CountingObserver {
        fn site_inserted(&mut self, _site: Point) {
            self.inserts += 1;
        }

        fn edge_flipped(&mut self, _facet: &Facet) {
            self.flips += 1;
        }

        fn cavity_grown(&mut self, _size: usize) {
            self.cavities += 1;
        }

        fn locate_fallback(&mut self, _point: Point) {
            self.fallbacks += 1;
        }
    }

    #[test]
    fn test_three_sites() {
        // smoke scenario, for both algorithms
        let super_triangle = Triangle::new(
            Point::new(-10000., 10000.),
            Point::new(10000., 10000.),
            Point::new(0., -10000.),
        )
        .unwrap();
        for algorithm in [Algorithm::EdgeFlip, Algorithm::CavityBased] {
            let mut triangulation = Triangulation::new(super_triangle, algorithm);
            assert_eq!(triangulation.triangle_count(), 1);

            for p in [Point::new(0., 0.), Point::new(1., 0.), Point::new(0., 1.)] {
                assert_eq!(triangulation.place(p), Ok(PlaceOutcome::Inserted));
            }
            assert_eq!(triangulation.triangle_count(), 7);
            assert!(triangulation.check_invariant());

            let id = triangulation.locate(Point::new(0.25, 0.25)).unwrap();
            let vertices: HashSet<Point> = triangulation
                .triangle(id)
                .unwrap()
                .vertices()
                .into_iter()
                .collect();
            let expected: HashSet<Point> =
                [Point::new(0., 0.), Point::new(0., 1.), Point::new(1., 0.)]
                    .into_iter()
                    .collect();
            assert_eq!(vertices, expected);
        }
    }

    #[test]
    fn test_place_idempotent() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        assert_eq!(
            triangulation.place(Point::new(1., 2.)),
            Ok(PlaceOutcome::Inserted)
        );
        let count = triangulation.triangle_count();
        assert_eq!(
            triangulation.place(Point::new(1., 2.)),
            Ok(PlaceOutcome::Duplicate)
        );
        assert_eq!(triangulation.triangle_count(), count);
        assert_eq!(triangulation.sites().len(), 1);
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut triangulation = TriangulationBuilder::new(super_triangle())
            .bounds(Rect::new(Point::new(0., 0.), Point::new(100., 100.)))
            .build();
        assert_eq!(
            triangulation.place(Point::new(500., 500.)),
            Ok(PlaceOutcome::OutOfBounds)
        );
        assert!(triangulation.sites().is_empty());
        assert_eq!(triangulation.triangle_count(), 1);
    }

    #[test]
    fn test_empty_circumcircle_property() {
        for algorithm in [Algorithm::EdgeFlip, Algorithm::CavityBased] {
            let mut triangulation = Triangulation::new(super_triangle(), algorithm);
            for p in random_points(40, 7) {
                assert!(triangulation.place(p).unwrap().inserted());
                assert!(triangulation.check_invariant());
            }
            assert_empty_circumcircle(&triangulation);
        }
    }

    #[test]
    fn test_insertion_order_independence() {
        let points = random_points(12, 11);
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..3 {
            let mut shuffled = points.clone();
            shuffled.shuffle(&mut rng);
            let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
            for p in shuffled {
                triangulation.place(p).unwrap();
            }
            assert!(triangulation.check_invariant());
            assert_empty_circumcircle(&triangulation);
        }
    }

    #[test]
    fn test_algorithms_interchangeable_mid_session() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::CavityBased);
        for p in random_points(10, 17) {
            triangulation.place(p).unwrap();
        }
        triangulation.set_algorithm(Algorithm::EdgeFlip);
        for p in random_points(10, 19) {
            triangulation.place(p).unwrap();
        }
        assert!(triangulation.check_invariant());
        assert_empty_circumcircle(&triangulation);
    }

    #[test]
    fn test_locate_returns_containing_triangle() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        for p in random_points(25, 23) {
            triangulation.place(p).unwrap();
        }
        for probe in random_points(25, 29) {
            let id = triangulation.locate(probe).unwrap();
            let triangle = triangulation.triangle(id).unwrap();
            assert_eq!(probe.is_outside_of(&triangle.vertices()), None);
        }
    }

    #[test]
    fn test_surrounding_triangles_ring() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let center = Point::new(0., 0.);
        triangulation.place(center).unwrap();
        for p in [
            Point::new(10., 0.),
            Point::new(0., 10.),
            Point::new(-10., 0.),
            Point::new(0., -10.),
        ] {
            triangulation.place(p).unwrap();
        }
        let start = triangulation.locate(center).unwrap();
        let ring = triangulation.surrounding_triangles(center, start);
        assert_eq!(ring.len(), 4);
        for id in ring {
            assert!(triangulation.triangle(id).unwrap().has_vertex(center));
        }
    }

    #[test]
    fn test_constraint_insert_and_split() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let a = Point::new(-5., 0.);
        let b = Point::new(5., 0.);
        triangulation.place_constrained(a, b).unwrap();

        let segment = Facet::new(a, b);
        assert!(triangulation.is_constrained(&segment));

        triangulation.split_constraint(&segment).unwrap();
        let midpoint = Point::new(0., 0.);
        assert!(!triangulation.is_constrained(&segment));
        assert!(triangulation.is_constrained(&Facet::new(a, midpoint)));
        assert!(triangulation.is_constrained(&Facet::new(midpoint, b)));
        assert_eq!(triangulation.constraints().len(), 2);
        assert!(triangulation.sites().contains(&a));
        assert!(triangulation.sites().contains(&b));
        assert!(triangulation.sites().contains(&midpoint));
        assert!(triangulation.check_invariant());
    }

    #[test]
    fn test_crossing_constraint_rejected() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        triangulation
            .place_constrained(Point::new(-5., 0.), Point::new(5., 0.))
            .unwrap();
        let constraints_before = triangulation.constraints().clone();

        let result = triangulation.place_constrained(Point::new(0., -5.), Point::new(0., 5.));
        assert_eq!(result, Err(TriangulationError::ConstraintConflict));
        assert_eq!(triangulation.constraints(), &constraints_before);
        assert!(triangulation.check_invariant());
    }

    #[test]
    fn test_constraint_survives_insertions() {
        // a facet that plain Delaunay would flip away must stay once
        // constrained
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let a = Point::new(-50., 0.);
        let b = Point::new(50., 0.);
        triangulation.place_constrained(a, b).unwrap();
        let segment = Facet::new(a, b);
        for p in [Point::new(0., 3.), Point::new(0., -3.), Point::new(1., 2.)] {
            triangulation.place(p).unwrap();
        }
        let live: Vec<&Triangle> = triangulation
            .triangles()
            .map(|(_, t)| t)
            .filter(|t| t.has_facet(&segment))
            .collect();
        assert_eq!(live.len(), 2);
        assert!(triangulation.check_invariant());
    }

    #[test]
    fn test_capability_gap() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::CavityBased);
        let result = triangulation.place_constrained(Point::new(-5., 0.), Point::new(5., 0.));
        assert_eq!(
            result,
            Err(TriangulationError::Unsupported(Algorithm::CavityBased))
        );
        assert!(triangulation.constraints().is_empty());
        assert_eq!(
            triangulation.remove(Point::new(0., 0.)),
            Err(TriangulationError::Unsupported(Algorithm::CavityBased))
        );
    }

    #[test]
    fn test_remove_center_of_convex_pentagon() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let center = Point::new(0., 0.);
        let ring = [
            Point::new(2., 0.),
            Point::new(0.618, 1.902),
            Point::new(-1.618, 1.176),
            Point::new(-1.618, -1.176),
            Point::new(0.618, -1.902),
        ];
        for p in ring {
            triangulation.place(p).unwrap();
        }
        triangulation.place(center).unwrap();
        let count_before = triangulation.triangle_count();

        assert_eq!(triangulation.remove(center), Ok(true));
        assert!(!triangulation.sites().contains(&center));
        assert_eq!(triangulation.triangle_count(), count_before - 2);
        assert!(triangulation.check_invariant());
        assert_empty_circumcircle(&triangulation);

        // removing again is a no-op
        assert_eq!(triangulation.remove(center), Ok(false));
    }

    #[test]
    fn test_observer_counts() {
        let mut observer = CountingObserver::default();
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let points = random_points(20, 31);
        for p in &points {
            triangulation.place_with_observer(*p, &mut observer).unwrap();
        }
        assert_eq!(observer.inserts, 20);
        assert!(observer.flips > 0);
        assert_eq!(observer.cavities, 0);
        // the directed walk never needs the fallback scan here
        assert_eq!(observer.fallbacks, 0);

        triangulation.set_algorithm(Algorithm::CavityBased);
        for p in random_points(5, 37) {
            triangulation.place_with_observer(p, &mut observer).unwrap();
        }
        assert_eq!(observer.cavities, 5);
    }
}
