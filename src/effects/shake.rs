//! Camera shake timeline
//!
//! A shake is a short run of random steps. Each step jitters camera roll and
//! yaw and kicks the blur and rgb-shift post effects; when the run completes
//! the camera is restored and the post effects settle on their end values.

use rand::Rng;

use crate::sim::ShakeKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeParams {
    pub steps: u32,
    /// Roll amplitude (radians)
    pub amplitude_x: f32,
    /// Yaw amplitude (radians)
    pub amplitude_z: f32,
    /// Upper bound for one step (seconds)
    pub duration: f32,
    pub end_blur: f32,
    pub end_rgb_shift: f32,
    pub blur_strength: f32,
    pub rgb_shift_strength: f32,
}

impl Default for ShakeParams {
    fn default() -> Self {
        Self {
            steps: 20,
            amplitude_x: 0.1,
            amplitude_z: 0.01,
            duration: 0.05,
            end_blur: 0.0,
            end_rgb_shift: 0.0,
            blur_strength: 1.0,
            rgb_shift_strength: 0.2,
        }
    }
}

impl ShakeParams {
    pub fn for_kind(kind: ShakeKind) -> Self {
        match kind {
            ShakeKind::Hit => Self {
                steps: 10,
                ..Self::default()
            },
            ShakeKind::Explosion => Self {
                steps: 10,
                amplitude_x: 0.2,
                amplitude_z: 0.2,
                duration: 0.05,
                end_blur: 0.0,
                end_rgb_shift: 200.0,
                blur_strength: 1.0,
                rgb_shift_strength: 1.0,
            },
        }
    }
}

/// One frame of shake output
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShakeSample {
    pub roll: f32,
    pub yaw: f32,
    pub blur: f32,
    pub rgb_shift: f32,
}

/// Pixels of red-channel offset per unit of rgb shift
const RGB_SHIFT_PX: f32 = 0.01;

impl ShakeSample {
    /// CSS `filter` value for the post effects, `none` when idle
    pub fn css_filter(&self) -> String {
        let blur = self.blur.max(0.0);
        let shift = self.rgb_shift.max(0.0) * RGB_SHIFT_PX;
        if blur < 0.01 && shift < 0.01 {
            return "none".to_string();
        }
        format!("blur({blur:.2}px) drop-shadow({shift:.2}px 0 0 rgba(255, 0, 0, 0.5))")
    }
}

#[derive(Debug, Clone, Copy)]
struct ShakeStep {
    duration: f32,
    target: ShakeSample,
}

#[derive(Debug, Clone)]
pub struct CameraShake {
    steps: Vec<ShakeStep>,
    end: ShakeSample,
    current: usize,
    step_elapsed: f32,
    from: ShakeSample,
}

impl CameraShake {
    pub fn new<R: Rng + ?Sized>(params: ShakeParams, rng: &mut R) -> Self {
        let steps = (0..params.steps)
            .map(|_| ShakeStep {
                duration: rng.random_range(0.0..=params.duration),
                target: ShakeSample {
                    roll: rng.random_range(-params.amplitude_x..=params.amplitude_x),
                    yaw: rng.random_range(-params.amplitude_z..=params.amplitude_z),
                    blur: rng.random_range(2.0..4.0) * params.blur_strength,
                    rgb_shift: rng.random_range(200.0..500.0) * params.rgb_shift_strength,
                },
            })
            .collect();

        Self {
            steps,
            end: ShakeSample {
                roll: 0.0,
                yaw: 0.0,
                blur: params.end_blur,
                rgb_shift: params.end_rgb_shift,
            },
            current: 0,
            step_elapsed: 0.0,
            from: ShakeSample::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.steps.len()
    }

    /// Advance and sample
    pub fn update(&mut self, dt: f32) -> ShakeSample {
        self.step_elapsed += dt.max(0.0);

        while let Some(step) = self.steps.get(self.current) {
            if self.step_elapsed < step.duration {
                let k = self.step_elapsed / step.duration;
                return lerp(self.from, step.target, k);
            }
            self.step_elapsed -= step.duration;
            self.from = step.target;
            self.current += 1;
        }

        self.end
    }
}

fn lerp(a: ShakeSample, b: ShakeSample, k: f32) -> ShakeSample {
    ShakeSample {
        roll: a.roll + (b.roll - a.roll) * k,
        yaw: a.yaw + (b.yaw - a.yaw) * k,
        blur: a.blur + (b.blur - a.blur) * k,
        rgb_shift: a.rgb_shift + (b.rgb_shift - a.rgb_shift) * k,
    }
}
