use glam::DVec2;

/// Directed segment `a -> b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: DVec2,
    pub b: DVec2,
}

impl Segment {
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self { a, b }
    }

    pub fn direction(&self) -> DVec2 {
        self.b - self.a
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn midpoint(&self) -> DVec2 {
        (self.a + self.b) * 0.5
    }

    pub fn translated(&self, offset: DVec2) -> Self {
        Self::new(self.a + offset, self.b + offset)
    }

    /// Parameter along `self` and the crossing point, if the two segments cross.
    ///
    /// Near-parallel pairs (|determinant| < `parallel_epsilon`) never cross.
    pub fn intersection(&self, other: &Segment, parallel_epsilon: f64) -> Option<(f64, DVec2)> {
        let a = self.b - self.a;
        let b = other.a - other.b;
        let c = other.a - self.a;
        let d = a.x * b.y - a.y * b.x;

        if d.abs() < parallel_epsilon {
            return None;
        }

        let t = (c.x * b.y - c.y * b.x) / d;
        let s = (c.y * a.x - c.x * a.y) / d;

        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
            Some((t, self.a + a * t))
        } else {
            None
        }
    }

    pub fn intersects(&self, other: &Segment, parallel_epsilon: f64) -> bool {
        self.intersection(other, parallel_epsilon).is_some()
    }
}

/// Whether segments `p1 -> p2` and `p3 -> p4` cross, endpoints included.
pub fn segments_intersect(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2, parallel_epsilon: f64) -> bool {
    Segment::new(p1, p2).intersects(&Segment::new(p3, p4), parallel_epsilon)
}

/// Unsigned angle between two vectors, in [0, PI]. Degenerate vectors give 0.
pub fn angle_between(v1: DVec2, v2: DVec2) -> f64 {
    let norms = v1.length() * v2.length();
    if norms < 1e-12 {
        return 0.0;
    }
    (v1.dot(v2) / norms).clamp(-1.0, 1.0).acos()
}

/// Projection of `query` onto the infinite line through `origin` and `through`.
pub fn nearest_point_on_ray(origin: DVec2, through: DVec2, query: DVec2, length_floor: f64) -> DVec2 {
    let dir = through - origin;
    let len = dir.length().max(length_floor);
    let unit = dir / len;
    let to_query = query - origin;
    let along = to_query.length() * angle_between(dir, to_query).cos();
    origin + unit * along
}

/// `v` scaled to unit length, with its length floored to avoid blow-up.
pub fn unit_or_floor(v: DVec2, length_floor: f64) -> DVec2 {
    v / v.length().max(length_floor)
}

/// Left-hand perpendicular in screen coordinates.
pub fn perp(v: DVec2) -> DVec2 {
    DVec2::new(v.y, -v.x)
}
