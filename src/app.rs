//! Per-frame orchestration
//!
//! Owns every subsystem and wires them together: pointer input feeds the
//! slicer, slice updates are raycast against the biscuit, impacts drive the
//! physics and effects, and the frame loop advances all of it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::effects::{Effects, ShakeSample};
use crate::settings::Settings;
use crate::sim::{
    Biscuit, Camera, ImpactEvent, ImpactResolver, ImpactScene, PhysicsWorld, PieceDefinition,
    Raycaster, SimpleWorld, Thresholds,
};
use crate::slicer::{SliceEvent, Slicer, debug};

/// Longest frame delta fed to the simulation (seconds)
const MAX_FRAME_DT: f32 = 0.1;

pub struct App<W: PhysicsWorld = SimpleWorld> {
    settings: Settings,
    slicer: Slicer,
    resolver: ImpactResolver,
    biscuit: Biscuit,
    world: W,
    raycaster: Raycaster,
    camera: Camera,
    effects: Effects,
    rng: Pcg32,
    /// Impact events not yet taken by collaborators
    pending: Vec<ImpactEvent>,
}

impl App<SimpleWorld> {
    /// Seeded app on the built-in world; thresholds are drawn from the seed
    pub fn new(settings: Settings, width: f32, height: f32, seed: u64, pieces_json: &str) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let thresholds = Thresholds::random(&mut rng);
        let mut world = SimpleWorld::default();
        let mut raycaster = Raycaster::new();
        let biscuit = Biscuit::from_json(pieces_json, &mut world, &mut raycaster, &mut rng);
        Self::assemble(settings, width, height, thresholds, world, raycaster, biscuit, rng)
    }
}

impl<W: PhysicsWorld> App<W> {
    /// App on a caller-provided world with fixed thresholds
    pub fn with_world(
        settings: Settings,
        width: f32,
        height: f32,
        seed: u64,
        thresholds: Thresholds,
        mut world: W,
        pieces: &[PieceDefinition],
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut raycaster = Raycaster::new();
        let biscuit = Biscuit::new(pieces, &mut world, &mut raycaster, &mut rng);
        Self::assemble(settings, width, height, thresholds, world, raycaster, biscuit, rng)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        settings: Settings,
        width: f32,
        height: f32,
        thresholds: Thresholds,
        world: W,
        raycaster: Raycaster,
        biscuit: Biscuit,
        rng: Pcg32,
    ) -> Self {
        let slicer = Slicer::new(settings.slicer.clone(), width, height)
            .with_debugger(debug::debugger(settings.debug_lines));

        Self {
            slicer,
            resolver: ImpactResolver::new(thresholds),
            biscuit,
            world,
            raycaster,
            camera: Camera::new(width, height),
            effects: Effects::new(),
            rng,
            pending: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn slicer(&self) -> &Slicer {
        &self.slicer
    }

    pub fn resolver(&self) -> &ImpactResolver {
        &self.resolver
    }

    pub fn biscuit(&self) -> &Biscuit {
        &self.biscuit
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    /// Blur and rgb-shift the host should apply over the scene
    pub fn post_fx(&self) -> ShakeSample {
        self.effects.post()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.slicer.resize(width, height);
        self.camera.resize(width, height);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.slicer.pointer_down(x, y);
        self.dispatch_slice_events();
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.slicer.pointer_move(x, y);
        self.dispatch_slice_events();
    }

    pub fn pointer_up(&mut self) {
        self.slicer.pointer_up();
        self.dispatch_slice_events();
    }

    /// Advance one rendered frame
    pub fn frame(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        self.world.step(dt);
        self.slicer.update(dt);
        self.dispatch_slice_events();
        self.effects.update(dt, &mut self.camera);
    }

    /// Take impact events for audio and tracking collaborators
    pub fn drain_events(&mut self) -> Vec<ImpactEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Debug overlay line list (NDC pairs): slicer internals plus collider
    /// wireframes
    pub fn debug_lines(&self) -> Vec<Vec2> {
        if !self.settings.debug_lines {
            return Vec::new();
        }

        let mut lines = self.slicer.debugger().line_list();
        for collider in self.biscuit.colliders(&self.world) {
            if !self.raycaster.contains(collider.owner) {
                continue;
            }
            for (a, b) in collider.edges() {
                if let (Some(a), Some(b)) = (self.camera.project(a), self.camera.project(b)) {
                    lines.push(a);
                    lines.push(b);
                }
            }
        }
        lines
    }

    fn dispatch_slice_events(&mut self) {
        for event in self.slicer.drain_events() {
            match event {
                SliceEvent::Update { direction, probes } => {
                    let hit = {
                        let colliders = self.biscuit.colliders(&self.world);
                        let raycaster = &self.raycaster;
                        let camera = &self.camera;
                        self.resolver
                            .cast_probes(direction, &probes, |p| raycaster.cast(camera, p, &colliders))
                    };

                    if let Some(hit) = hit {
                        let mut scene = ImpactScene {
                            biscuit: &mut self.biscuit,
                            world: &mut self.world,
                            raycaster: &mut self.raycaster,
                            rng: &mut self.rng,
                        };
                        self.resolver.resolve_hit(&hit, &mut scene);
                    }
                    self.apply_impact_events();
                }
                SliceEvent::End => {
                    log::debug!("Slice ended");
                    self.resolver.handle_slice_end();
                }
            }
        }
    }

    fn apply_impact_events(&mut self) {
        for event in self.resolver.drain_events() {
            self.effects.handle(&event, &self.settings, &mut self.rng);
            self.pending.push(event);
        }
    }
}
