//! Chaikin corner cutting for the gesture path

use glam::Vec2;

/// Number of points `smooth` produces for `count` input points
#[inline]
pub fn smoothed_len(count: usize) -> usize {
    if count < 2 { count } else { (count - 1) * 2 + 2 }
}

/// Subdivide `points` (newest first) once.
///
/// Keeps both endpoints and replaces every segment by its 1/4 and 3/4 points.
pub fn smooth(points: &[Vec2]) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(smoothed_len(points.len()));
    smooth_into(points, &mut out);
    out
}

/// Same as [`smooth`], reusing `out`'s allocation
pub fn smooth_into(points: &[Vec2], out: &mut Vec<Vec2>) {
    out.clear();

    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    if points.len() < 2 {
        out.extend_from_slice(points);
        return;
    }

    out.push(*first);
    for pair in points.windows(2) {
        let (p, q) = (pair[0], pair[1]);
        out.push(p.lerp(q, 0.25));
        out.push(p.lerp(q, 0.75));
    }
    out.push(*last);
}
