//! Input point sampling with spacing throttles

use glam::Vec2;

use super::path::GesturePath;
use crate::screen_to_ndc;
use crate::settings::SlicerSettings;

/// Outcome of offering a raw input point to the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleResult {
    /// Too close to the previous accepted point
    Rejected,
    /// Stored at the front of the path
    Accepted,
    /// The gesture used up its point budget and must end
    LimitReached,
}

/// Captures pointer positions for a single gesture.
///
/// Spacing is measured in screen pixels; stored points are in NDC.
#[derive(Debug, Clone)]
pub struct PointSampler {
    path: GesturePath,
    min_distance: f32,
    max_distance: f32,
    maximum_points: u32,
    viewport: Vec2,
    /// Last accepted point in screen pixels
    last_point: Option<Vec2>,
    added_points: u32,
}

impl PointSampler {
    pub fn new(settings: &SlicerSettings, width: f32, height: f32) -> Self {
        Self {
            path: GesturePath::new(settings.points_to_capture),
            min_distance: settings.minimum_distance_between_points,
            max_distance: settings.maximum_distance_between_points,
            maximum_points: settings.maximum_points,
            viewport: Vec2::new(width, height),
            last_point: None,
            added_points: 0,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    #[inline]
    pub fn path(&self) -> &GesturePath {
        &self.path
    }

    /// Points offered and counted against the budget this gesture
    #[inline]
    pub fn added_points_count(&self) -> u32 {
        self.added_points
    }

    #[inline]
    pub fn active_points_count(&self) -> usize {
        self.path.active_count()
    }

    /// Offer a raw screen-space point
    pub fn add_point(&mut self, x: f32, y: f32) -> SampleResult {
        let mut point = Vec2::new(x, y);

        if let Some(last) = self.last_point {
            let delta = point - last;
            let distance = delta.length();

            if distance < self.min_distance {
                return SampleResult::Rejected;
            }

            // Fast swipes and low sample rates would otherwise teleport the blade
            if distance > self.max_distance {
                point = last + delta / distance * self.max_distance;
            }
        }

        self.added_points += 1;
        if self.added_points > self.maximum_points {
            return SampleResult::LimitReached;
        }

        self.last_point = Some(point);
        self.path
            .push_front(screen_to_ndc(point.x, point.y, self.viewport.x, self.viewport.y));

        SampleResult::Accepted
    }

    /// Forget the gesture: zero the path and the point budget
    pub fn reset(&mut self) {
        self.path.clear();
        self.last_point = None;
        self.added_points = 0;
    }
}
