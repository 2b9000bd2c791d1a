//! Settings and slicer tuning
//!
//! Persisted as JSON in LocalStorage on the web; defaults natively.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Confetti particles spawned per hit
    pub fn confetti_count(&self) -> usize {
        match self {
            QualityPreset::Low => 80,
            QualityPreset::Medium => 200,
            QualityPreset::High => 400,
        }
    }

    /// Smoke planes spawned on explosion
    pub fn smoke_planes(&self) -> usize {
        match self {
            QualityPreset::Low => 2,
            QualityPreset::Medium => 4,
            QualityPreset::High => 6,
        }
    }
}

/// Gesture capture tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerSettings {
    /// Ring buffer capacity (points kept for the blade)
    pub points_to_capture: usize,
    /// Points a single gesture may add before it is force-ended
    pub maximum_points: u32,
    /// Screen pixels below which a new point is ignored
    pub minimum_distance_between_points: f32,
    /// Screen pixels a single step is clamped to
    pub maximum_distance_between_points: f32,
    /// Probe spacing along the last segment (NDC)
    pub raycast_step: f32,
    /// Blade release fade (seconds)
    pub fade_duration: f32,
    /// Pointer held still this long ends the gesture (seconds)
    pub idle_timeout: f32,
}

impl Default for SlicerSettings {
    fn default() -> Self {
        Self {
            points_to_capture: 8,
            maximum_points: 12,
            minimum_distance_between_points: 50.0,
            maximum_distance_between_points: 100.0,
            raycast_step: 0.05,
            fade_duration: 0.3,
            idle_timeout: 0.5,
        }
    }
}

impl SlicerSettings {
    /// Smallest probe spacing; finer steps flood the raycaster
    pub const MIN_RAYCAST_STEP: f32 = 0.001;
    /// A direction needs two points
    pub const MIN_POINTS: usize = 2;

    /// Clamp stored values into a range the slicer can run with
    pub fn sanitized(mut self) -> Self {
        self.raycast_step = at_least(self.raycast_step, Self::MIN_RAYCAST_STEP);
        self.points_to_capture = self.points_to_capture.max(Self::MIN_POINTS);
        self.maximum_points = self.maximum_points.max(Self::MIN_POINTS as u32);

        let min_distance = self.minimum_distance_between_points;
        self.minimum_distance_between_points = if min_distance.is_finite() {
            min_distance.max(0.0)
        } else {
            0.0
        };
        self.maximum_distance_between_points = at_least(
            self.maximum_distance_between_points,
            self.minimum_distance_between_points,
        );

        self.fade_duration = at_least(self.fade_duration, 0.0);
        self.idle_timeout = at_least(self.idle_timeout, 0.0);
        self
    }
}

/// `value` when it is at least `min`, else `min` (NaN included)
fn at_least(value: f32, min: f32) -> f32 {
    if value >= min { value } else { min }
}

/// User settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Camera shake on hits and explosion
    pub camera_shake: bool,
    /// Confetti burst on every hit
    pub confetti: bool,
    /// Smoke cloud on explosion
    pub smoke: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,

    // === Developer ===
    /// Draw raw path, direction and probes over the blade
    pub debug_lines: bool,

    pub slicer: SlicerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            camera_shake: true,
            confetti: true,
            smoke: true,
            reduced_motion: false,
            debug_lines: false,
            slicer: SlicerSettings::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops the smoke sprite
        if preset == QualityPreset::Low {
            self.smoke = false;
        }
    }

    /// Effective camera shake (respects reduced_motion)
    pub fn effective_camera_shake(&self) -> bool {
        self.camera_shake && !self.reduced_motion
    }

    /// Effective confetti particle count
    pub fn confetti_count(&self) -> usize {
        if self.confetti {
            self.quality.confetti_count()
        } else {
            0
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "biscuit_slicer_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Self>(&json) {
                    Ok(mut settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        let slicer = settings.slicer.clone().sanitized();
                        if slicer != settings.slicer {
                            log::warn!("Clamped stored slicer settings: {slicer:?}");
                            settings.slicer = slicer;
                        }
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring invalid stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
