//! Optional debug overlays for the slicer
//!
//! Selected once from settings instead of branching inside the slicer.

use glam::Vec2;

/// Length of the drawn direction indicator (NDC)
const DIRECTION_LENGTH: f32 = 0.2;
/// Probe point cap, matching a 1000-float buffer of 2D points
const MAX_PROBES: usize = 500;

/// Receives slicer internals for visualization
pub trait SliceDebugger {
    /// Raw gesture points changed (newest first)
    fn on_path(&mut self, points: &[Vec2]);
    /// Slice direction and probes were recomputed
    fn on_slice(&mut self, origin: Vec2, direction: Vec2, probes: &[Vec2]);
    /// Gesture ended
    fn clear(&mut self);
    /// Line segments (pairs of NDC points) to draw this frame
    fn line_list(&self) -> Vec<Vec2> {
        Vec::new()
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NoDebug;

impl SliceDebugger for NoDebug {
    fn on_path(&mut self, _points: &[Vec2]) {}
    fn on_slice(&mut self, _origin: Vec2, _direction: Vec2, _probes: &[Vec2]) {}
    fn clear(&mut self) {}
}

/// Draws the raw path, the slice direction and a cross per probe
#[derive(Debug, Default)]
pub struct LineDebugger {
    path: Vec<Vec2>,
    direction: Option<(Vec2, Vec2)>,
    probes: Vec<Vec2>,
}

impl SliceDebugger for LineDebugger {
    fn on_path(&mut self, points: &[Vec2]) {
        self.path.clear();
        self.path.extend_from_slice(points);
    }

    fn on_slice(&mut self, origin: Vec2, direction: Vec2, probes: &[Vec2]) {
        self.direction = Some((origin, origin + direction * DIRECTION_LENGTH));
        self.probes.clear();
        self.probes.extend(probes.iter().take(MAX_PROBES).copied());
    }

    fn clear(&mut self) {
        self.path.clear();
        self.direction = None;
        self.probes.clear();
    }

    fn line_list(&self) -> Vec<Vec2> {
        let mut lines = Vec::with_capacity(self.path.len() * 2 + self.probes.len() * 4 + 2);

        for pair in self.path.windows(2) {
            lines.push(pair[0]);
            lines.push(pair[1]);
        }

        if let Some((from, to)) = self.direction {
            lines.push(from);
            lines.push(to);
        }

        let h = 0.01;
        for p in &self.probes {
            lines.push(*p - Vec2::new(h, 0.0));
            lines.push(*p + Vec2::new(h, 0.0));
            lines.push(*p - Vec2::new(0.0, h));
            lines.push(*p + Vec2::new(0.0, h));
        }

        lines
    }
}

/// Pick the debugger implementation
pub fn debugger(enabled: bool) -> Box<dyn SliceDebugger> {
    if enabled {
        Box::new(LineDebugger::default())
    } else {
        Box::new(NoDebug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_debugger_emits_segments() {
        let mut dbg = LineDebugger::default();
        dbg.on_path(&[Vec2::ZERO, Vec2::X, Vec2::Y]);
        dbg.on_slice(Vec2::ZERO, Vec2::X, &[Vec2::ONE]);

        let lines = dbg.line_list();
        // 2 path segments + direction + probe cross
        assert_eq!(lines.len(), 4 + 2 + 4);
        assert_eq!(lines[4], Vec2::ZERO);
        assert!((lines[5] - Vec2::new(DIRECTION_LENGTH, 0.0)).length() < 1e-6);

        dbg.clear();
        assert!(dbg.line_list().is_empty());
    }

    #[test]
    fn test_disabled_debugger_is_silent() {
        let mut dbg = debugger(false);
        dbg.on_path(&[Vec2::ZERO, Vec2::X]);
        assert!(dbg.line_list().is_empty());
    }
}
