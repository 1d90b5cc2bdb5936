use glam::DVec2;
use tankbot_shared::Body;

use crate::geometry::Segment;

pub const FRONT: usize = 0;
pub const RIGHT: usize = 1;
pub const BACK: usize = 2;
pub const LEFT: usize = 3;

/// Corners as [left-front, right-front, right-back, left-back].
pub fn corners_of(body: &dyn Body) -> [DVec2; 4] {
    let c = body.position();
    let v = DVec2::from_angle(body.heading());
    let n = DVec2::new(v.y, -v.x);
    let h = body.half_extents();
    let along = v * h.x;
    let across = n * h.y;

    [
        c + along + across,
        c + along - across,
        c - along - across,
        c - along + across,
    ]
}

/// Edges in fixed winding order: front, right, back, left.
///
/// Damage tie-breaks depend on this order.
pub fn edges_of(body: &dyn Body) -> [Segment; 4] {
    let [lf, rf, rb, lb] = corners_of(body);
    [
        Segment::new(lf, rf),
        Segment::new(rf, rb),
        Segment::new(rb, lb),
        Segment::new(lb, lf),
    ]
}

/// Unit normal of `edge` pointing away from the body center.
pub fn outward_normal(body: &dyn Body, edge: &Segment) -> DVec2 {
    let dir = edge.direction().normalize_or_zero();
    let n = DVec2::new(dir.y, -dir.x);
    if n.dot(edge.midpoint() - body.position()) < 0.0 {
        -n
    } else {
        n
    }
}

/// Whether `point` lies inside the body or on its outline.
pub fn contains_point(body: &dyn Body, point: DVec2) -> bool {
    edges_of(body)
        .iter()
        .all(|e| outward_normal(body, e).dot(point - e.midpoint()) <= 0.0)
}

/// Broad phase: circumscribed circles overlap.
pub fn bounds_overlap(a: &dyn Body, b: &dyn Body) -> bool {
    let reach = a.bounding_radius() + b.bounding_radius();
    a.position().distance_squared(b.position()) < reach * reach
}

/// Whether any edge of `a` crosses any edge of `b`.
pub fn edges_cross(a: &dyn Body, b: &dyn Body, parallel_epsilon: f64) -> bool {
    let ea = edges_of(a);
    let eb = edges_of(b);
    ea.iter()
        .any(|x| eb.iter().any(|y| x.intersects(y, parallel_epsilon)))
}
