//! Pure geometry over stroke polylines.
//!
//! Everything here works on plain `kurbo` values and cannot fail. Callers
//! convert stroke points with [`StrokePoint::pos`](crate::stroke::StrokePoint::pos)
//! before handing them over.

use kurbo::{Line, Point, Rect, Vec2};

/// Split a polyline into its consecutive segments.
///
/// A polyline with fewer than two points has no segments.
pub fn segments(points: &[Point]) -> Vec<Line> {
    points
        .windows(2)
        .map(|pair| Line::new(pair[0], pair[1]))
        .collect()
}

/// Strict proper-crossing test between two segments.
///
/// Each segment's endpoints must lie strictly on opposite sides of the other
/// segment's supporting line. Collinear, touching and endpoint-on-segment
/// configurations never count.
pub fn segments_cross(a: Line, b: Line) -> bool {
    straddles(a, b) && straddles(b, a)
}

/// Whether `other`'s endpoints lie strictly on opposite sides of `line`.
fn straddles(line: Line, other: Line) -> bool {
    let dir = line.p1 - line.p0;
    let side0 = dir.cross(other.p0 - line.p0);
    let side1 = dir.cross(other.p1 - line.p0);
    (side0 > 0.0 && side1 < 0.0) || (side0 < 0.0 && side1 > 0.0)
}

/// Count crossing segment pairs between two polylines.
///
/// Every (segment of `a`, segment of `b`) pair that properly crosses counts
/// once, so a scribble passing back and forth over a stroke accumulates one
/// count per pass.
pub fn crossing_count(a: &[Point], b: &[Point]) -> usize {
    let a_segments = segments(a);
    let b_segments = segments(b);
    if a_segments.is_empty() || b_segments.is_empty() {
        return 0;
    }

    // Cheap reject before the quadratic pass.
    if let (Some(a_box), Some(b_box)) = (bounding_box(a), bounding_box(b)) {
        if a_box.x1 < b_box.x0 || b_box.x1 < a_box.x0 || a_box.y1 < b_box.y0 || b_box.y1 < a_box.y0 {
            return 0;
        }
    }

    a_segments
        .iter()
        .map(|&sa| b_segments.iter().filter(|&&sb| segments_cross(sa, sb)).count())
        .sum()
}

/// Axis-aligned bounding box of a point set.
pub fn bounding_box(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::from_points(*first, *first);
    for point in &points[1..] {
        rect.x0 = rect.x0.min(point.x);
        rect.y0 = rect.y0.min(point.y);
        rect.x1 = rect.x1.max(point.x);
        rect.y1 = rect.y1.max(point.y);
    }
    Some(rect)
}

/// Arithmetic mean of a point set.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vec2::ZERO, |acc, point| acc + point.to_vec2());
    Some((sum / points.len() as f64).to_point())
}

/// Half-open containment: `x0 <= x < x1` and `y0 <= y < y1`.
pub fn contains_half_open(rect: Rect, point: Point) -> bool {
    rect.x0 <= point.x && point.x < rect.x1 && rect.y0 <= point.y && point.y < rect.y1
}

/// Total length of a polyline.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

/// Shortest distance from `point` to a polyline.
///
/// A single-point polyline degenerates to point distance.
pub fn distance_to_polyline(points: &[Point], point: Point) -> Option<f64> {
    match points {
        [] => None,
        [only] => Some(only.distance(point)),
        _ => points
            .windows(2)
            .map(|pair| distance_to_segment(pair[0], pair[1], point))
            .reduce(f64::min),
    }
}

fn distance_to_segment(start: Point, end: Point, point: Point) -> f64 {
    let line_vec = end - start;
    let line_len_sq = line_vec.hypot2();
    if line_len_sq < f64::EPSILON {
        return start.distance(point);
    }
    let t = ((point - start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    (start + line_vec * t).distance(point)
}
