use std::collections::{HashSet, VecDeque};

use crate::refine::{bad_triangles, RefineCriteria, RefineReport};
use crate::triangle::Facet;
use crate::triangulation::{Observer, Triangulation};
use crate::CircleSide;

/// Ruppert-style refinement: two work queues, encroached constraint
/// segments (drained first) and bad triangles. A bad triangle's
/// circumcenter that encroaches a segment queues the segment instead of
/// being inserted.
pub(crate) fn refine(
    triangulation: &mut Triangulation,
    criteria: RefineCriteria,
    observer: &mut dyn Observer,
) -> RefineReport {
    let mut passes = 0;
    let mut segments: VecDeque<Facet> = VecDeque::new();
    let mut queued_segments: HashSet<Facet> = HashSet::new();
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
            // no progress over a full pass, give up instead of looping
            observer.refinement_stalled(bad.len());
            return RefineReport {
                passes,
                remaining_bad: bad.len(),
                stalled: true,
            };
        }
        previous_bad = Some(bad.len());
        passes += 1;

        while !bad.is_empty() || !segments.is_empty() {
            // segments have priority
            if let Some(segment) = segments.pop_front() {
                queued_segments.remove(&segment);
                if triangulation.is_constrained(&segment) {
                    let _ = triangulation.split_constraint_with_observer(&segment, observer);
                }
                continue;
            }
            let Some(triangle) = bad.pop_front() else {
                continue;
            };
            if triangulation.find_triangle(&triangle).is_none() {
                // superseded by earlier work in this pass
                continue;
            }

            let center = triangle.circumcenter();
            let mut encroached = false;
            for segment in triangulation.constraints() {
                if center.side_of_diametral_circle(segment) == CircleSide::Inside {
                    encroached = true;
                    if queued_segments.insert(*segment) {
                        segments.push_back(*segment);
                    }
                }
            }
            if encroached {
                continue;
            }

            if center.side_of_circumcircle(&triangulation.super_triangle().vertices())
                == CircleSide::Inside
            {
                let _ = triangulation.place_with_observer(center, observer);
            } else {
                // the circumcenter escapes the domain. Removing the triangle's
                // wide-angle vertex would fix it, but needs a deletion routine
                // that is safe on non-convex rings, so the triangle is only
                // reported and skipped.
                observer.refinement_skipped(&triangle, triangle.max_angle_vertex());
            }
        }
    }
}
