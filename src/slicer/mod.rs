//! Slice gesture recognizer
//!
//! Turns pointer/touch input into a smoothed blade ribbon, a slice direction
//! and raycast probe points. One gesture runs from pointer-down until
//! pointer-up, the point budget is spent, or the idle watchdog fires; the
//! ribbon then fades out and `SliceEvent::End` is emitted.

pub mod debug;
pub mod path;
pub mod probe;
pub mod ribbon;
pub mod sampler;
pub mod smooth;

pub use debug::{LineDebugger, NoDebug, SliceDebugger};
pub use path::GesturePath;
pub use probe::{raycast_points, slice_direction};
pub use ribbon::RibbonMesh;
pub use sampler::{PointSampler, SampleResult};
pub use smooth::{smooth, smoothed_len};

use glam::Vec2;

use crate::anim::{Ease, Tween};
use crate::settings::SlicerSettings;

/// Signals for the surrounding application
#[derive(Debug, Clone, PartialEq)]
pub enum SliceEvent {
    /// A point was accepted and the blade has a direction
    Update { direction: Vec2, probes: Vec<Vec2> },
    /// The gesture fully finished (fade-out complete)
    End,
}

pub struct Slicer {
    settings: SlicerSettings,
    sampler: PointSampler,
    smoothed: Vec<Vec2>,
    mesh: RibbonMesh,
    debugger: Box<dyn SliceDebugger>,
    /// False while the release fade is running
    enabled: bool,
    /// Pointer is down
    active: bool,
    fade: Option<Tween>,
    /// Seconds since the last accepted point
    idle: f32,
    events: Vec<SliceEvent>,
}

impl Slicer {
    pub fn new(settings: SlicerSettings, width: f32, height: f32) -> Self {
        let settings = settings.sanitized();
        let capacity = settings.points_to_capture;
        Self {
            sampler: PointSampler::new(&settings, width, height),
            smoothed: Vec::with_capacity(smoothed_len(capacity)),
            mesh: RibbonMesh::new(smoothed_len(capacity)),
            debugger: Box::new(NoDebug),
            enabled: true,
            active: false,
            fade: None,
            idle: 0.0,
            events: Vec::new(),
            settings,
        }
    }

    /// Replace the debug overlay strategy
    pub fn with_debugger(mut self, debugger: Box<dyn SliceDebugger>) -> Self {
        self.debugger = debugger;
        self
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.sampler.resize(width, height);
    }

    #[inline]
    pub fn mesh(&self) -> &RibbonMesh {
        &self.mesh
    }

    #[inline]
    pub fn debugger(&self) -> &dyn SliceDebugger {
        self.debugger.as_ref()
    }

    #[inline]
    pub fn path(&self) -> &GesturePath {
        self.sampler.path()
    }

    #[inline]
    pub fn smoothed(&self) -> &[Vec2] {
        &self.smoothed
    }

    #[inline]
    pub fn active_points_count(&self) -> usize {
        self.sampler.active_points_count()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Take the signals emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SliceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.active = true;
        if !self.enabled {
            return;
        }
        self.idle = 0.0;
        self.add_point(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.enabled || !self.active {
            return;
        }
        self.add_point(x, y);
    }

    pub fn pointer_up(&mut self) {
        let was_active = self.active;
        self.active = false;
        if !self.enabled || !was_active {
            return;
        }
        self.stop();
    }

    fn add_point(&mut self, x: f32, y: f32) {
        match self.sampler.add_point(x, y) {
            SampleResult::Rejected => {}
            SampleResult::LimitReached => {
                log::debug!(
                    "Slice reached {} points, ending gesture",
                    self.settings.maximum_points
                );
                self.stop();
            }
            SampleResult::Accepted => {
                self.idle = 0.0;
                self.rebuild_mesh();

                let points = self.sampler.path().active();
                self.debugger.on_path(points);

                if let Some(direction) = slice_direction(points) {
                    let probes = raycast_points(points, self.settings.raycast_step);
                    self.debugger.on_slice(points[0], direction, &probes);
                    self.events.push(SliceEvent::Update { direction, probes });
                }
            }
        }
    }

    fn rebuild_mesh(&mut self) {
        smooth::smooth_into(self.sampler.path().active(), &mut self.smoothed);
        self.mesh.set_draw_count(self.smoothed.len());
        self.mesh.update(&self.smoothed, self.smoothed.len());
    }

    /// End the gesture and start the release fade
    pub fn stop(&mut self) {
        if self.fade.is_some() {
            return;
        }
        self.enabled = false;
        self.active = false;
        self.fade = Some(Tween::new(
            1.0,
            0.0,
            self.settings.fade_duration,
            Ease::ExpoOut,
        ));
    }

    /// Advance the release fade and the idle watchdog
    pub fn update(&mut self, dt: f32) {
        if let Some(fade) = self.fade.as_mut() {
            self.mesh.thickness_scale = fade.advance(dt);
            let finished = fade.is_finished();
            self.mesh.update(&self.smoothed, self.smoothed.len());
            if finished {
                self.finish();
            }
            return;
        }

        if self.active && self.sampler.added_points_count() > 0 {
            self.idle += dt;
            if self.idle >= self.settings.idle_timeout {
                log::debug!("Slice idle for {:.2}s, ending gesture", self.idle);
                self.stop();
            }
        }
    }

    fn finish(&mut self) {
        self.fade = None;
        self.enabled = true;
        self.idle = 0.0;
        self.sampler.reset();
        self.smoothed.clear();
        self.mesh.reset();
        self.debugger.clear();
        self.events.push(SliceEvent::End);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slicer() -> Slicer {
        Slicer::new(SlicerSettings::default(), 800.0, 600.0)
    }

    fn run_fade(slicer: &mut Slicer) {
        for _ in 0..60 {
            slicer.update(1.0 / 60.0);
        }
    }

    #[test]
    fn test_gesture_emits_updates_then_end() {
        let mut s = slicer();
        s.pointer_down(100.0, 300.0);
        // One point: no direction yet
        assert!(s.drain_events().is_empty());

        s.pointer_move(160.0, 300.0);
        s.pointer_move(220.0, 300.0);
        let events = s.drain_events();
        assert_eq!(events.len(), 2);
        match &events[1] {
            SliceEvent::Update { direction, probes } => {
                assert!((*direction - Vec2::new(-1.0, 0.0)).length() < 1e-5);
                assert!(!probes.is_empty());
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(s.mesh().is_visible());

        s.pointer_up();
        assert!(s.is_fading());
        run_fade(&mut s);
        assert!(!s.is_fading());
        assert_eq!(s.drain_events(), vec![SliceEvent::End]);
        assert!(!s.mesh().is_visible());
        assert_eq!(s.active_points_count(), 0);
    }

    #[test]
    fn test_rejected_point_keeps_count() {
        let mut s = slicer();
        let min = SlicerSettings::default().minimum_distance_between_points;
        s.pointer_down(100.0, 300.0);
        s.pointer_move(100.0 + min, 300.0);
        s.pointer_move(100.0 + 2.0 * min, 300.0);
        assert_eq!(s.active_points_count(), 3);

        s.pointer_move(100.0 + 2.0 * min + 1.0, 300.0);
        assert_eq!(s.active_points_count(), 3);
    }

    #[test]
    fn test_input_ignored_while_fading() {
        let mut s = slicer();
        s.pointer_down(100.0, 300.0);
        s.pointer_move(200.0, 300.0);
        s.pointer_up();
        s.drain_events();

        s.pointer_down(400.0, 300.0);
        s.pointer_move(500.0, 300.0);
        assert!(s.drain_events().is_empty());
        assert_eq!(s.active_points_count(), 2);
    }

    #[test]
    fn test_fade_shrinks_thickness() {
        let mut s = slicer();
        s.pointer_down(100.0, 300.0);
        s.pointer_move(200.0, 300.0);
        s.pointer_move(300.0, 300.0);
        s.pointer_up();
        s.update(0.05);
        assert!(s.mesh().thickness_scale < 1.0);
        assert!(s.mesh().is_visible());
    }

    #[test]
    fn test_idle_watchdog_ends_gesture() {
        let mut s = slicer();
        s.pointer_down(100.0, 300.0);
        let timeout = SlicerSettings::default().idle_timeout;
        s.update(timeout + 0.01);
        assert!(s.is_fading());
        assert!(!s.is_active());
    }

    #[test]
    fn test_point_budget_forces_end() {
        let settings = SlicerSettings::default();
        let mut s = Slicer::new(settings.clone(), 10_000.0, 600.0);
        s.pointer_down(0.0, 300.0);
        for i in 1..=settings.maximum_points {
            s.pointer_move(i as f32 * settings.minimum_distance_between_points, 300.0);
        }
        assert!(s.is_fading());
        assert_eq!(s.active_points_count(), settings.points_to_capture);
    }

    #[test]
    fn test_tiny_raycast_step_stays_bounded() {
        let settings = SlicerSettings {
            raycast_step: 1e-12,
            ..Default::default()
        };
        let mut s = Slicer::new(settings, 800.0, 600.0);
        s.pointer_down(100.0, 300.0);
        s.pointer_move(160.0, 300.0);
        s.pointer_move(220.0, 300.0);

        let probes = s
            .drain_events()
            .into_iter()
            .find_map(|event| match event {
                SliceEvent::Update { probes, .. } if !probes.is_empty() => Some(probes),
                _ => None,
            })
            .unwrap();
        // 60px on an 800px viewport is 0.15 NDC
        let bound = (0.15 / SlicerSettings::MIN_RAYCAST_STEP).ceil() as usize + 1;
        assert!(probes.len() <= bound, "{} probes", probes.len());
    }
}
