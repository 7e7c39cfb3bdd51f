use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::{triangle::Facet, Float};

/// Where a point sits relative to a circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleSide {
    Inside,
    On,
    Outside,
}

/// Orientation of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Clock wise
    Cw,
    /// Counter clock wise
    Ccw,
    Collinear,
}

/// A 2D coordinate. Equality and hashing are by coordinate value, so a point
/// can serve as a set member and a facet endpoint. Immutable once created.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    pub x: Float,
    pub y: Float,
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // `+ 0.` folds -0.0 into 0.0 so hash agrees with ==
        (self.x + 0.).to_bits().hash(state);
        (self.y + 0.).to_bits().hash(state);
    }
}

impl Point {
    pub fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }

    pub fn sub(&self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn dot(&self, other: Point) -> Float {
        self.x * other.x + self.y * other.y
    }

    /// The scalar z component of the cross product of two 2D vectors.
    pub fn cross_z(&self, other: Point) -> Float {
        self.x * other.y - self.y * other.x
    }

    pub fn magnitude(&self) -> Float {
        self.dot(*self).sqrt()
    }

    pub fn distance(&self, other: Point) -> Float {
        self.sub(other).magnitude()
    }

    pub fn distance_sq(&self, other: Point) -> Float {
        let d = self.sub(other);
        d.dot(d)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2., (self.y + other.y) / 2.)
    }

    /// Whether the point lies strictly inside, on, or outside the circle
    /// through the three given points. The vertices may come in either
    /// winding order.
    pub fn side_of_circumcircle(&self, vertices: &[Point; 3]) -> CircleSide {
        let [a, b, c] = *vertices;
        let sign = match orient_2d(a, b, c) {
            Orientation::Ccw => 1.,
            Orientation::Cw => -1.,
            // degenerate circle, everything is outside
            Orientation::Collinear => return CircleSide::Outside,
        };

        let adx = a.x - self.x;
        let ady = a.y - self.y;
        let bdx = b.x - self.x;
        let bdy = b.y - self.y;
        let cdx = c.x - self.x;
        let cdy = c.y - self.y;

        let alift = adx * adx + ady * ady;
        let blift = bdx * bdx + bdy * bdy;
        let clift = cdx * cdx + cdy * cdy;

        let det = alift * (bdx * cdy - cdx * bdy) - blift * (adx * cdy - cdx * ady)
            + clift * (adx * bdy - bdx * ady);

        let val = det * sign;
        if val > 0. {
            CircleSide::Inside
        } else if val < 0. {
            CircleSide::Outside
        } else {
            CircleSide::On
        }
    }

    /// Whether the point lies within the circle having the segment as
    /// diameter. Drives encroachment tests during refinement.
    pub fn side_of_diametral_circle(&self, segment: &Facet) -> CircleSide {
        let [a, b] = segment.endpoints();
        let center = a.midpoint(b);
        let d = self.distance_sq(center);
        let r = a.distance_sq(b) / 4.;
        if d < r {
            CircleSide::Inside
        } else if d > r {
            CircleSide::Outside
        } else {
            CircleSide::On
        }
    }

    /// Point-location test: the corner of the triangle opposite the side the
    /// point falls outside of, or `None` if the point is inside or on the
    /// triangle.
    pub fn is_outside_of(&self, vertices: &[Point; 3]) -> Option<Point> {
        for i in 0..3 {
            let corner = vertices[i];
            let a = vertices[(i + 1) % 3];
            let b = vertices[(i + 2) % 3];
            let corner_side = orient_2d(a, b, corner);
            let point_side = orient_2d(a, b, *self);
            if point_side != Orientation::Collinear && point_side != corner_side {
                return Some(corner);
            }
        }
        None
    }

    /// Nearest candidate within `radius`, used for snap-to-vertex merge
    /// semantics in callers.
    pub fn nearest_within_radius(
        &self,
        candidates: impl IntoIterator<Item = Point>,
        radius: Float,
    ) -> Option<Point> {
        let mut best: Option<(Point, Float)> = None;
        for candidate in candidates {
            let d = self.distance(candidate);
            if d <= radius && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((candidate, d));
            }
        }
        best.map(|(p, _)| p)
    }
}

pub fn orient_2d(a: Point, b: Point, c: Point) -> Orientation {
    let det = (a.x - c.x) * (b.y - c.y) - (a.y - c.y) * (b.x - c.x);
    if det > 0. {
        Orientation::Ccw
    } else if det < 0. {
        Orientation::Cw
    } else {
        Orientation::Collinear
    }
}

/// 3D cross product over coordinate triples, the lifted form behind the
/// ear-style orientation sign test in [`crate::Triangle::area`].
pub fn cross_3(a: [Float; 3], b: [Float; 3]) -> [Float; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn cmp_coords(a: &Point, b: &Point) -> Ordering {
    (a.x, a.y)
        .partial_cmp(&(b.x, b.y))
        .unwrap_or(Ordering::Equal)
}
