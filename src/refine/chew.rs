use crate::graph::NodeId;
use crate::refine::{bad_triangles, RefineCriteria, RefineReport};
use crate::triangle::{Facet, Triangle};
use crate::triangulation::{Observer, Triangulation};
use crate::{CircleSide, Point};

/// Chew-style refinement: a bad triangle whose circumcenter is walled off
/// by a nearby constraint segment clears that segment's diametral circle
/// and splits it; otherwise the circumcenter is inserted.
pub(crate) fn refine(
    triangulation: &mut Triangulation,
    criteria: RefineCriteria,
    observer: &mut dyn Observer,
) -> RefineReport {
    let mut passes = 0;
    let mut previous_bad: Option<usize> = None;

    loop {
        let mut bad = bad_triangles(triangulation, &criteria);
        observer.refinement_pass(bad.len());
        if bad.is_empty() {
            return RefineReport {
                passes,
                remaining_bad: 0,
                stalled: false,
            };
        }
        if previous_bad.map_or(false, |previous| bad.len() >= previous) {
            observer.refinement_stalled(bad.len());
            return RefineReport {
                passes,
                remaining_bad: bad.len(),
                stalled: true,
            };
        }
        previous_bad = Some(bad.len());
        passes += 1;

        while let Some(triangle) = bad.pop_front() {
            let Some(id) = triangulation.find_triangle(&triangle) else {
                continue;
            };
            let center = triangle.circumcenter();

            match blocking_segment(triangulation, id, &triangle, center) {
                None => {
                    if center.side_of_circumcircle(&triangulation.super_triangle().vertices())
                        == CircleSide::Inside
                    {
                        let _ = triangulation.place_with_observer(center, observer);
                    } else {
                        observer.refinement_skipped(&triangle, triangle.max_angle_vertex());
                    }
                }
                Some(segment) => {
                    // clear the diametral circle before splitting: every
                    // removable site inside it that the midpoint can see
                    // goes away
                    let midpoint = segment.midpoint();
                    let victims: Vec<Point> = triangulation
                        .sites()
                        .iter()
                        .copied()
                        .filter(|p| {
                            p.side_of_diametral_circle(&segment) == CircleSide::Inside
                        })
                        .filter(|p| {
                            !triangulation.constraints().iter().any(|c| c.contains(*p))
                        })
                        .filter(|p| visible(triangulation, midpoint, *p, &segment))
                        .collect();
                    for victim in victims {
                        let _ = triangulation.remove_with_observer(victim, observer);
                    }
                    let _ = triangulation.split_constraint_with_observer(&segment, observer);
                }
            }
        }
    }
}

/// A constraint among the bad triangle's own facets and its immediate
/// neighbors' facets whose diametral circle the circumcenter violates and
/// which blocks the line of sight from the triangle to the circumcenter.
/// The search scope is deliberately local, widening it would change the
/// refinement behavior.
fn blocking_segment(
    triangulation: &Triangulation,
    id: NodeId,
    triangle: &Triangle,
    center: Point,
) -> Option<Facet> {
    let mut candidates: Vec<Facet> = triangle.facets().to_vec();
    for nb in triangulation.neighbors(id) {
        if let Some(t) = triangulation.triangle(nb) {
            candidates.extend(t.facets());
        }
    }
    candidates.retain(|f| triangulation.is_constrained(f));

    candidates.into_iter().find(|segment| {
        if center.side_of_diametral_circle(segment) != CircleSide::Inside {
            return false;
        }
        triangle
            .vertices()
            .iter()
            .any(|corner| *corner != center && Facet::new(*corner, center).intersects(segment, false))
    })
}

/// Line of sight between two points, blocked by any constraint other than
/// `ignore`.
fn visible(triangulation: &Triangulation, from: Point, to: Point, ignore: &Facet) -> bool {
    if from == to {
        return true;
    }
    let sight = Facet::new(from, to);
    !triangulation
        .constraints()
        .iter()
        .any(|c| c != ignore && c.intersects(&sight, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Algorithm, Float, RefineAlgorithm};

    fn super_triangle() -> Triangle {
        Triangle::new(
            Point::new(-10000., -10000.),
            Point::new(10000., -10000.),
            Point::new(0., 10000.),
        )
        .unwrap()
    }

    #[test]
    fn test_blocking_segment_found_locally() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let a = Point::new(-5., 0.);
        let b = Point::new(5., 0.);
        let s = Point::new(0., 3.);
        triangulation.place_constrained(a, b).unwrap();
        triangulation.place(s).unwrap();

        let triangle = Triangle::new(a, b, s).unwrap();
        let id = triangulation.find_triangle(&triangle).unwrap();
        let center = triangle.circumcenter();
        // circumcenter falls below the segment, inside its diametral circle
        assert!(center.y < 0.);
        assert_eq!(
            blocking_segment(&triangulation, id, &triangle, center),
            Some(Facet::new(a, b))
        );
    }

    #[test]
    fn test_no_blocking_segment_without_constraints() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let a = Point::new(-5., 0.);
        let b = Point::new(5., 0.);
        let s = Point::new(0., 3.);
        for p in [a, b, s] {
            triangulation.place(p).unwrap();
        }
        let triangle = Triangle::new(a, b, s).unwrap();
        let id = triangulation.find_triangle(&triangle).unwrap();
        assert_eq!(
            blocking_segment(&triangulation, id, &triangle, triangle.circumcenter()),
            None
        );
    }

    #[test]
    fn test_visibility() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let a = Point::new(-5., 0.);
        let b = Point::new(5., 0.);
        triangulation.place_constrained(a, b).unwrap();
        let wall = Facet::new(a, b);
        let other = Facet::new(Point::new(-100., -100.), Point::new(-99., -100.));

        assert!(!visible(
            &triangulation,
            Point::new(0., -1.),
            Point::new(0., 1.),
            &other
        ));
        // the ignored segment does not block
        assert!(visible(
            &triangulation,
            Point::new(0., -1.),
            Point::new(0., 1.),
            &wall
        ));
    }

    #[test]
    fn test_refine_terminates_on_constrained_square() {
        let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
        let corners = [
            Point::new(-10., -10.),
            Point::new(10., -10.),
            Point::new(10., 10.),
            Point::new(-10., 10.),
        ];
        for i in 0..4 {
            triangulation
                .place_constrained(corners[i], corners[(i + 1) % 4])
                .unwrap();
        }

        let criteria = RefineCriteria {
            min_angle: (20.0_f64.to_radians()) as Float,
            max_area: 60.,
        };
        let report = triangulation.refine(RefineAlgorithm::Chew, criteria);
        assert!(report.remaining_bad == 0 || report.stalled);
        assert!(triangulation.check_invariant());
    }
}
