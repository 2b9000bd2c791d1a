//! Fixed-capacity gesture path (newest point first)

use glam::Vec2;

/// Ring buffer of the most recent gesture points in NDC.
///
/// The buffer always holds `capacity` entries. Unused slots are zero, and a
/// push shifts every point one slot towards the tail, dropping the oldest.
#[derive(Debug, Clone)]
pub struct GesturePath {
    points: Vec<Vec2>,
    active: usize,
}

impl GesturePath {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: vec![Vec2::ZERO; capacity],
            active: 0,
        }
    }

    /// Number of slots (constant for the lifetime of the path)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    /// Number of slots holding real points
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// All slots, including zeroed unused ones
    #[inline]
    pub fn slots(&self) -> &[Vec2] {
        &self.points
    }

    /// Populated points only, newest first
    #[inline]
    pub fn active(&self) -> &[Vec2] {
        &self.points[..self.active]
    }

    /// Most recent point, if any
    pub fn newest(&self) -> Option<Vec2> {
        self.active().first().copied()
    }

    /// Push a point to the front, evicting the oldest
    pub fn push_front(&mut self, point: Vec2) {
        if self.points.is_empty() {
            return;
        }
        self.points.rotate_right(1);
        self.points[0] = point;
        self.active = (self.active + 1).min(self.capacity());
    }

    /// Zero every slot
    pub fn clear(&mut self) {
        self.points.fill(Vec2::ZERO);
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_path_is_zeroed() {
        let path = GesturePath::new(8);
        assert_eq!(path.capacity(), 8);
        assert_eq!(path.active_count(), 0);
        assert!(path.slots().iter().all(|p| *p == Vec2::ZERO));
        assert!(path.newest().is_none());
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut path = GesturePath::new(3);
        path.push_front(Vec2::new(1.0, 0.0));
        path.push_front(Vec2::new(2.0, 0.0));
        assert_eq!(path.active(), &[Vec2::new(2.0, 0.0), Vec2::new(1.0, 0.0)]);

        path.push_front(Vec2::new(3.0, 0.0));
        path.push_front(Vec2::new(4.0, 0.0));
        // Oldest point (1.0) evicted
        assert_eq!(
            path.slots(),
            &[Vec2::new(4.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(2.0, 0.0)]
        );
        assert_eq!(path.active_count(), 3);
    }

    #[test]
    fn test_clear_resets_slots() {
        let mut path = GesturePath::new(4);
        path.push_front(Vec2::ONE);
        path.clear();
        assert_eq!(path.active_count(), 0);
        assert_eq!(path.capacity(), 4);
        assert!(path.slots().iter().all(|p| *p == Vec2::ZERO));
    }

    proptest! {
        #[test]
        fn prop_length_stays_constant(
            capacity in 1usize..16,
            points in prop::collection::vec((-1.0f32..1.0, -1.0f32..1.0), 0..64),
        ) {
            let mut path = GesturePath::new(capacity);
            for (x, y) in points.iter().copied() {
                path.push_front(Vec2::new(x, y));
                prop_assert_eq!(path.slots().len(), capacity);
                prop_assert!(path.active_count() <= capacity);
            }
            prop_assert_eq!(path.active_count(), points.len().min(capacity));
        }
    }
}
