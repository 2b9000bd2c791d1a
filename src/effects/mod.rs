//! Visual effects driven by impact events

pub mod confetti;
pub mod shake;
pub mod smoke;

pub use confetti::{Confetti, ConfettiParticle};
pub use shake::{CameraShake, ShakeParams, ShakeSample};
pub use smoke::{Smoke, SmokePlane};

use rand::Rng;

use crate::settings::Settings;
use crate::sim::{Camera, ImpactEvent};

/// All running effects plus the post-processing amounts they produce
#[derive(Debug, Default)]
pub struct Effects {
    pub confetti: Confetti,
    pub smoke: Smoke,
    shake: Option<CameraShake>,
    /// Blur and rgb-shift for the post-processing pass
    post: ShakeSample,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self) -> ShakeSample {
        self.post
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    /// React to one impact event
    pub fn handle<R: Rng + ?Sized>(&mut self, event: &ImpactEvent, settings: &Settings, rng: &mut R) {
        match event {
            ImpactEvent::Confetti { point } => {
                let count = settings.confetti_count();
                if count > 0 {
                    self.confetti.explode(*point, count, rng);
                }
            }
            ImpactEvent::Shake(kind) => {
                if settings.effective_camera_shake() {
                    self.shake = Some(CameraShake::new(ShakeParams::for_kind(*kind), rng));
                }
            }
            ImpactEvent::Explode { point, .. } => {
                if settings.smoke {
                    self.smoke.explode(*point, settings.quality.smoke_planes(), rng);
                }
            }
            _ => {}
        }
    }

    /// Advance everything and write the shake into the camera
    pub fn update(&mut self, dt: f32, camera: &mut Camera) {
        self.confetti.update(dt);
        self.smoke.update(dt);

        if let Some(shake) = self.shake.as_mut() {
            let sample = shake.update(dt);
            camera.set_shake(sample.roll, sample.yaw);
            self.post = sample;
            if shake.is_finished() {
                self.shake = None;
            }
        }
    }
}
