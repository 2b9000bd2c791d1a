//! Slice direction and raycast probe points
//!
//! The pointer moves in discrete jumps, so a single raycast per move event
//! would miss thin or fast targets. Probes are resampled along the segment
//! just travelled.

use glam::Vec2;

/// Reversed unit direction of travel (second-newest → newest, negated).
///
/// `None` for fewer than two points or when both points coincide.
pub fn slice_direction(points: &[Vec2]) -> Option<Vec2> {
    let [newest, previous, ..] = points else {
        return None;
    };
    let direction = (*newest - *previous).try_normalize()?;
    Some(-direction)
}

/// Sample points every `step` from the newest point towards the previous one.
///
/// Yields `ceil(length / step)` points, the last one clamped to the segment
/// end. Empty when fewer than three points are active.
pub fn raycast_points(points: &[Vec2], step: f32) -> Vec<Vec2> {
    if points.len() < 3 || step <= 0.0 {
        return Vec::new();
    }

    let newest = points[0];
    let Some(direction) = slice_direction(points) else {
        return Vec::new();
    };
    let length = newest.distance(points[1]);

    let mut probes = Vec::with_capacity((length / step).ceil() as usize);
    let mut travelled = 0.0;
    while travelled < length {
        travelled += step;
        probes.push(newest + direction * travelled.min(length));
    }
    probes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_reversed_travel() {
        // Travelled from the origin to +X (newest first): direction points back
        let dir = slice_direction(&[Vec2::X, Vec2::ZERO]).unwrap();
        assert!((dir - Vec2::new(-1.0, 0.0)).length() < 1e-6);

        // Newest at the origin, previous at +X
        let dir = slice_direction(&[Vec2::ZERO, Vec2::X]).unwrap();
        assert!((dir - Vec2::new(1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_direction_needs_two_distinct_points() {
        assert!(slice_direction(&[]).is_none());
        assert!(slice_direction(&[Vec2::ONE]).is_none());
        assert!(slice_direction(&[Vec2::ONE, Vec2::ONE]).is_none());
    }

    #[test]
    fn test_probe_count_for_segment() {
        // Newest at origin, previous 0.12 away along +X
        let points = [Vec2::ZERO, Vec2::new(0.12, 0.0), Vec2::new(0.5, 0.0)];
        let probes = raycast_points(&points, 0.05);
        assert_eq!(probes.len(), 3);

        // Probes walk back towards the previous point
        assert!((probes[0].x - 0.05).abs() < 1e-6);
        assert!((probes[1].x - 0.10).abs() < 1e-6);
        assert!((probes[2].x - 0.12).abs() < 1e-6);
        assert!(probes.iter().all(|p| p.y.abs() < 1e-6));
    }

    #[test]
    fn test_probe_count_is_ceil_of_length_over_step() {
        let points = [Vec2::ZERO, Vec2::new(0.0, 0.31), Vec2::ZERO];
        assert_eq!(raycast_points(&points, 0.05).len(), 7);
    }

    #[test]
    fn test_probes_need_three_points() {
        assert!(raycast_points(&[Vec2::ZERO, Vec2::X], 0.05).is_empty());
        assert!(raycast_points(&[Vec2::ZERO, Vec2::ZERO, Vec2::X], 0.05).is_empty());
    }
}
