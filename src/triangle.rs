use crate::point::{cmp_coords, cross_3, orient_2d, Orientation};
use crate::{Float, Point, TriangulationError};

/// An unordered pair of points, the shared side between two triangles and
/// the unit of the constraint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Facet {
    a: Point,
    b: Point,
}

impl Facet {
    /// Endpoints are stored in canonical coordinate order, so two facets over
    /// the same pair compare and hash equal regardless of argument order.
    pub fn new(a: Point, b: Point) -> Self {
        if cmp_coords(&a, &b).is_le() {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn endpoints(&self) -> [Point; 2] {
        [self.a, self.b]
    }

    pub fn contains(&self, p: Point) -> bool {
        self.a == p || self.b == p
    }

    pub fn midpoint(&self) -> Point {
        self.a.midpoint(self.b)
    }

    /// Segment intersection test. With `include_endpoints` a shared endpoint
    /// counts as an intersection, otherwise only proper crossings do.
    /// Parallel segments never intersect.
    pub fn intersects(&self, other: &Facet, include_endpoints: bool) -> bool {
        let b_m_a = self.b.sub(self.a);
        let p_m_a = other.a.sub(self.a);
        let p_m_q = other.a.sub(other.b);

        let det = b_m_a.cross_z(p_m_q);
        let mu = b_m_a.cross_z(p_m_a) / det;
        let lambda = p_m_a.cross_z(p_m_q) / det;

        if include_endpoints {
            (0.0..=1.0).contains(&mu) && (0.0..=1.0).contains(&lambda)
        } else {
            0. < mu && mu < 1. && 0. < lambda && lambda < 1.
        }
    }
}

/// An unordered set of exactly 3 distinct, non-collinear points. Immutable;
/// all derived queries are pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    vertices: [Point; 3],
}

impl Triangle {
    /// Vertices are canonicalized, so two triangles over the same point set
    /// compare and hash equal. Coincident or collinear points are a caller
    /// error.
    pub fn new(a: Point, b: Point, c: Point) -> Result<Self, TriangulationError> {
        if a == b || a == c || b == c {
            return Err(TriangulationError::DegenerateTriangle);
        }
        if orient_2d(a, b, c) == Orientation::Collinear {
            return Err(TriangulationError::DegenerateTriangle);
        }
        let mut vertices = [a, b, c];
        vertices.sort_by(cmp_coords);
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> [Point; 3] {
        self.vertices
    }

    pub fn has_vertex(&self, p: Point) -> bool {
        self.vertices.contains(&p)
    }

    /// The 2-point side excluding `vertex`.
    ///
    /// Panics when `vertex` is not a corner of this triangle.
    pub fn facet_opposite(&self, vertex: Point) -> Facet {
        let [a, b, c] = self.vertices;
        if vertex == a {
            Facet::new(b, c)
        } else if vertex == b {
            Facet::new(a, c)
        } else if vertex == c {
            Facet::new(a, b)
        } else {
            panic!("vertex not in triangle");
        }
    }

    /// The first vertex not contained in `exclude`, if any.
    pub fn other_vertex(&self, exclude: &[Point]) -> Option<Point> {
        self.vertices
            .into_iter()
            .find(|v| !exclude.contains(v))
    }

    pub fn facets(&self) -> [Facet; 3] {
        let [a, b, c] = self.vertices;
        [Facet::new(b, c), Facet::new(a, c), Facet::new(a, b)]
    }

    pub fn has_facet(&self, facet: &Facet) -> bool {
        let [a, b] = facet.endpoints();
        self.has_vertex(a) && self.has_vertex(b)
    }

    /// Two triangles are neighbors when they share exactly one facet, that
    /// is exactly two vertices.
    pub fn is_neighbor(&self, other: &Triangle) -> bool {
        let shared = self
            .vertices
            .iter()
            .filter(|v| other.has_vertex(**v))
            .count();
        shared == 2
    }

    pub fn shares_vertex_with(&self, other: &Triangle) -> bool {
        self.vertices.iter().any(|v| other.has_vertex(*v))
    }

    /// Center of the circle through the three vertices.
    pub fn circumcenter(&self) -> Point {
        let [a, b, c] = self.vertices;
        let d = 2. * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;
        let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
        let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
        Point::new(ux, uy)
    }

    /// Smallest interior angle, in radians.
    pub fn min_angle(&self) -> Float {
        let angles = self.angles();
        angles[0].min(angles[1]).min(angles[2])
    }

    /// The vertex at the largest interior angle.
    pub fn max_angle_vertex(&self) -> Point {
        let angles = self.angles();
        let mut index = 0;
        for i in 1..3 {
            if angles[i] > angles[index] {
                index = i;
            }
        }
        self.vertices[index]
    }

    /// Surface area. The signed area underneath comes from the lifted cross
    /// product over the coordinate triples.
    pub fn area(&self) -> Float {
        let [a, b, c] = self.vertices;
        let cross = cross_3([a.x, b.x, c.x], [a.y, b.y, c.y]);
        (cross[0] + cross[1] + cross[2]).abs() / 2.
    }

    fn angles(&self) -> [Float; 3] {
        let [a, b, c] = self.vertices;
        [
            angle_at(a, b, c),
            angle_at(b, a, c),
            angle_at(c, a, b),
        ]
    }
}

fn angle_at(apex: Point, p: Point, q: Point) -> Float {
    let u = p.sub(apex);
    let v = q.sub(apex);
    let cos = u.dot(v) / (u.magnitude() * v.magnitude());
    cos.clamp(-1., 1.).acos()
}
