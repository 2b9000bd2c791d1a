//! Hit-count state machine
//!
//! Every gesture may land at most one impact. The first `hits` impacts bounce
//! the intact biscuit, the next `break_hits` knock pieces off, and the next
//! impact on the body (or an attached piece) explodes it.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{BREAK_HITS_RANGE, HITS_RANGE};

use super::biscuit::Biscuit;
use super::raycast::{Intersection, Raycaster};
use super::world::PhysicsWorld;

/// Phase boundaries, drawn once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub hits: u32,
    pub break_hits: u32,
}

impl Thresholds {
    pub fn new(hits: u32, break_hits: u32) -> Self {
        Self { hits, break_hits }
    }

    /// Round a uniform draw over each range, so the endpoints come up half
    /// as often as the interior counts
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            hits: rounded_draw(rng, HITS_RANGE),
            break_hits: rounded_draw(rng, BREAK_HITS_RANGE),
        }
    }

    /// Hit count at which the biscuit explodes
    #[inline]
    pub fn explode_at(&self) -> u32 {
        self.hits + self.break_hits
    }
}

fn rounded_draw<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (u32, u32)) -> u32 {
    if hi <= lo {
        return lo;
    }
    (rng.random_range(lo as f32..hi as f32).round() as u32).min(hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bounce,
    Break,
    Exploded,
}

impl Phase {
    pub fn for_hits(hit_count: u32, thresholds: Thresholds) -> Self {
        if hit_count < thresholds.hits {
            Phase::Bounce
        } else if hit_count < thresholds.explode_at() {
            Phase::Break
        } else {
            Phase::Exploded
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShakeKind {
    Hit,
    Explosion,
}

/// Signals for audio, visual and tracking collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum ImpactEvent {
    /// First slice update of a gesture
    Slice,
    /// The blade struck something
    Hit { point: Vec3 },
    /// Confetti burst at the hit point
    Confetti { point: Vec3 },
    Shake(ShakeKind),
    /// A piece came off the biscuit
    Break { piece: usize },
    /// A loose piece was knocked around
    PieceBounced { piece: usize },
    /// The biscuit blew apart (explosion and smoke at `point`)
    Explode { point: Vec3, hit_count: u32 },
    PhaseChanged(Phase),
}

/// Mutable scene state an impact acts on
pub struct ImpactScene<'a, W: PhysicsWorld + ?Sized, R: Rng + ?Sized> {
    pub biscuit: &'a mut Biscuit,
    pub world: &'a mut W,
    pub raycaster: &'a mut Raycaster,
    pub rng: &'a mut R,
}

#[derive(Debug, Clone)]
pub struct ImpactResolver {
    thresholds: Thresholds,
    hit_count: u32,
    can_slice: bool,
    can_play_slice_sound: bool,
    exploded: bool,
    direction: Vec2,
    events: Vec<ImpactEvent>,
}

impl ImpactResolver {
    pub fn new(thresholds: Thresholds) -> Self {
        log::info!(
            "Impact thresholds: {} bounces, {} breaks",
            thresholds.hits,
            thresholds.break_hits
        );
        Self {
            thresholds,
            hit_count: 0,
            can_slice: true,
            can_play_slice_sound: true,
            exploded: false,
            direction: Vec2::ZERO,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    #[inline]
    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    #[inline]
    pub fn can_slice(&self) -> bool {
        self.can_slice
    }

    #[inline]
    pub fn is_biscuit_exploded(&self) -> bool {
        self.exploded
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        Phase::for_hits(self.hit_count, self.thresholds)
    }

    /// Last slice direction
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn drain_events(&mut self) -> Vec<ImpactEvent> {
        std::mem::take(&mut self.events)
    }

    /// Handle a slice update: record the direction and cast the probes in
    /// order until one hits. Returns that hit while the gesture may still
    /// land an impact.
    pub fn cast_probes<F>(&mut self, direction: Vec2, probes: &[Vec2], mut cast: F) -> Option<Intersection>
    where
        F: FnMut(Vec2) -> Option<Intersection>,
    {
        if !self.can_slice {
            return None;
        }
        if self.can_play_slice_sound {
            self.can_play_slice_sound = false;
            self.events.push(ImpactEvent::Slice);
        }
        self.direction = direction;
        probes.iter().find_map(|&p| cast(p))
    }

    /// End of gesture: the next gesture may land an impact again
    pub fn handle_slice_end(&mut self) {
        self.can_slice = true;
        self.can_play_slice_sound = true;
    }

    /// Apply one impact. Returns false when this gesture already landed one.
    pub fn resolve_hit<W, R>(&mut self, hit: &Intersection, scene: &mut ImpactScene<'_, W, R>) -> bool
    where
        W: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        if !self.can_slice {
            return false;
        }
        self.can_slice = false;

        let phase_before = self.phase();
        let point = hit.point;
        let direction = self.direction;
        self.events.push(ImpactEvent::Confetti { point });

        let mut piece = None;
        match phase_before {
            Phase::Bounce => {
                self.events.push(ImpactEvent::Hit { point });
                self.events.push(ImpactEvent::Shake(ShakeKind::Hit));
                scene.biscuit.bounce(scene.world, point, direction);
                self.hit_count += 1;
            }
            Phase::Break => {
                self.events.push(ImpactEvent::Shake(ShakeKind::Hit));
                piece = scene.biscuit.piece_from_object(hit.object);
                if !piece.is_some_and(|i| scene.biscuit.is_piece_detached(i)) {
                    self.hit_count += 1;
                }
            }
            Phase::Exploded => {
                piece = scene.biscuit.piece_from_object(hit.object);
                let on_body = !piece.is_some_and(|i| scene.biscuit.is_piece_detached(i));
                if on_body && !self.exploded {
                    self.explode(point, scene);
                } else {
                    self.events.push(ImpactEvent::Shake(ShakeKind::Hit));
                }
            }
        }

        if let Some(i) = piece {
            if scene.biscuit.is_piece_detached(i) {
                self.events.push(ImpactEvent::Hit { point });
                scene.biscuit.bounce_piece(i, scene.world, point, direction);
                self.events.push(ImpactEvent::PieceBounced { piece: i });
            } else if scene.biscuit.remove_piece(i, scene.world, scene.raycaster) {
                self.events.push(ImpactEvent::Break { piece: i });
            }
        }

        let phase_after = self.phase();
        if phase_after != phase_before {
            log::info!("Impact phase {phase_before:?} -> {phase_after:?} after {} hits", self.hit_count);
            self.events.push(ImpactEvent::PhaseChanged(phase_after));
        }

        true
    }

    fn explode<W, R>(&mut self, point: Vec3, scene: &mut ImpactScene<'_, W, R>)
    where
        W: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        self.exploded = true;
        self.events.push(ImpactEvent::Shake(ShakeKind::Explosion));
        self.events.push(ImpactEvent::Explode {
            point,
            hit_count: self.hit_count,
        });

        scene.biscuit.explode(scene.world, scene.raycaster);
        scene.biscuit.scatter(scene.world, scene.rng);
        log::info!("Biscuit exploded after {} hits", self.hit_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::raycast::TargetId;
    use crate::sim::world::SimpleWorld;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const MODEL: &str = include_str!("../../assets/biscuit.json");

    struct Fixture {
        resolver: ImpactResolver,
        biscuit: Biscuit,
        world: SimpleWorld,
        raycaster: Raycaster,
        rng: Pcg32,
    }

    impl Fixture {
        fn new(json: &str, thresholds: Thresholds) -> Self {
            let mut world = SimpleWorld::default();
            let mut raycaster = Raycaster::new();
            let mut rng = Pcg32::seed_from_u64(3);
            let biscuit = Biscuit::from_json(json, &mut world, &mut raycaster, &mut rng);
            Self {
                resolver: ImpactResolver::new(thresholds),
                biscuit,
                world,
                raycaster,
                rng,
            }
        }

        /// One full gesture landing on `object`
        fn gesture(&mut self, object: TargetId) -> bool {
            let hit = Intersection {
                object,
                point: Vec3::new(0.0, 1.0, 0.0),
                distance: 1.0,
            };
            let found = self
                .resolver
                .cast_probes(Vec2::X, &[Vec2::ZERO], |_| Some(hit));
            let mut landed = false;
            if let Some(hit) = found {
                let mut scene = ImpactScene {
                    biscuit: &mut self.biscuit,
                    world: &mut self.world,
                    raycaster: &mut self.raycaster,
                    rng: &mut self.rng,
                };
                landed = self.resolver.resolve_hit(&hit, &mut scene);
            }
            self.resolver.handle_slice_end();
            landed
        }

        fn explosions(events: &[ImpactEvent]) -> usize {
            events
                .iter()
                .filter(|e| matches!(e, ImpactEvent::Explode { .. }))
                .count()
        }
    }

    #[test]
    fn test_phase_walk_explodes_exactly_once() {
        let mut f = Fixture::new("{}", Thresholds::new(2, 1));
        assert_eq!(f.resolver.phase(), Phase::Bounce);

        f.gesture(TargetId::Biscuit);
        assert_eq!(f.resolver.phase(), Phase::Bounce);
        f.gesture(TargetId::Biscuit);
        assert_eq!(f.resolver.phase(), Phase::Break);
        f.gesture(TargetId::Biscuit);
        assert_eq!(f.resolver.phase(), Phase::Exploded);
        assert!(!f.resolver.is_biscuit_exploded());
        assert_eq!(Fixture::explosions(&f.resolver.drain_events()), 0);

        f.gesture(TargetId::Biscuit);
        assert!(f.resolver.is_biscuit_exploded());
        assert!(!f.biscuit.is_active());
        let events = f.resolver.drain_events();
        assert_eq!(Fixture::explosions(&events), 1);
        assert!(events.contains(&ImpactEvent::Shake(ShakeKind::Explosion)));

        f.gesture(TargetId::Biscuit);
        let events = f.resolver.drain_events();
        assert_eq!(Fixture::explosions(&events), 0);
        assert!(events.contains(&ImpactEvent::Shake(ShakeKind::Hit)));
    }

    #[test]
    fn test_one_impact_per_gesture() {
        let mut f = Fixture::new(MODEL, Thresholds::new(5, 3));
        let hit = Intersection {
            object: TargetId::Biscuit,
            point: Vec3::ZERO,
            distance: 1.0,
        };

        let mut casts = 0;
        let found = f.resolver.cast_probes(Vec2::X, &[Vec2::ZERO, Vec2::ONE, Vec2::Y], |_| {
            casts += 1;
            Some(hit)
        });
        // Probing stops at the first hit
        assert_eq!(casts, 1);
        let hit = found.unwrap();

        let mut scene = ImpactScene {
            biscuit: &mut f.biscuit,
            world: &mut f.world,
            raycaster: &mut f.raycaster,
            rng: &mut f.rng,
        };
        assert!(f.resolver.resolve_hit(&hit, &mut scene));
        assert!(!f.resolver.resolve_hit(&hit, &mut scene));
        assert!(f.resolver.cast_probes(Vec2::X, &[Vec2::ZERO], |_| Some(hit)).is_none());
        assert_eq!(f.resolver.hit_count(), 1);

        f.resolver.handle_slice_end();
        assert!(f.resolver.can_slice());
    }

    #[test]
    fn test_slice_event_once_per_gesture() {
        let mut f = Fixture::new(MODEL, Thresholds::new(2, 1));
        f.resolver.cast_probes(Vec2::X, &[], |_| None);
        f.resolver.cast_probes(Vec2::X, &[], |_| None);
        let slices = f
            .resolver
            .drain_events()
            .iter()
            .filter(|e| **e == ImpactEvent::Slice)
            .count();
        assert_eq!(slices, 1);
    }

    #[test]
    fn test_break_phase_detaches_then_bounces_piece() {
        let mut f = Fixture::new(MODEL, Thresholds::new(1, 3));
        f.gesture(TargetId::Biscuit);
        assert_eq!(f.resolver.phase(), Phase::Break);
        f.resolver.drain_events();

        // Attached piece: detached and counted
        f.gesture(TargetId::Piece(2));
        assert!(f.biscuit.is_piece_detached(2));
        assert_eq!(f.resolver.hit_count(), 2);
        assert!(f.resolver.drain_events().contains(&ImpactEvent::Break { piece: 2 }));

        // Loose piece: bounced, not counted
        f.gesture(TargetId::Piece(2));
        assert_eq!(f.resolver.hit_count(), 2);
        let events = f.resolver.drain_events();
        assert!(events.contains(&ImpactEvent::PieceBounced { piece: 2 }));
        assert!(events.iter().any(|e| matches!(e, ImpactEvent::Confetti { .. })));
    }

    #[test]
    fn test_explosion_on_piece_bounces_it() {
        let mut f = Fixture::new(MODEL, Thresholds::new(1, 1));
        f.gesture(TargetId::Biscuit);
        f.gesture(TargetId::Piece(0));
        assert_eq!(f.resolver.phase(), Phase::Exploded);
        f.resolver.drain_events();

        // Hitting an attached piece triggers the explosion, then the piece
        // (now loose) is bounced
        f.gesture(TargetId::Piece(1));
        let events = f.resolver.drain_events();
        assert_eq!(Fixture::explosions(&events), 1);
        assert!(events.contains(&ImpactEvent::PieceBounced { piece: 1 }));
        assert!((0..4).all(|i| f.biscuit.is_piece_detached(i)));
    }

    #[test]
    fn test_loose_piece_in_exploded_phase_does_not_explode() {
        let mut f = Fixture::new(MODEL, Thresholds::new(1, 1));
        f.gesture(TargetId::Biscuit);
        f.gesture(TargetId::Piece(0));
        f.resolver.drain_events();

        f.gesture(TargetId::Piece(0));
        assert!(!f.resolver.is_biscuit_exploded());
        assert!(f.biscuit.is_active());
    }

    #[test]
    fn test_phase_changes_are_reported() {
        let mut f = Fixture::new("{}", Thresholds::new(1, 1));
        f.gesture(TargetId::Biscuit);
        assert!(f
            .resolver
            .drain_events()
            .contains(&ImpactEvent::PhaseChanged(Phase::Break)));
    }

    #[test]
    fn test_threshold_endpoints_are_rarer() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut counts = [0u32; 6];
        for _ in 0..6000 {
            counts[Thresholds::random(&mut rng).hits as usize] += 1;
        }
        let [_, _, two, three, four, five] = counts;
        assert!(two > 0 && five > 0);
        assert!(two < three && two < four, "{counts:?}");
        assert!(five < three && five < four, "{counts:?}");
    }

    proptest! {
        #[test]
        fn prop_thresholds_within_ranges(seed in any::<u64>()) {
            let t = Thresholds::random(&mut Pcg32::seed_from_u64(seed));
            prop_assert!((HITS_RANGE.0..=HITS_RANGE.1).contains(&t.hits));
            prop_assert!((BREAK_HITS_RANGE.0..=BREAK_HITS_RANGE.1).contains(&t.break_hits));
        }

        #[test]
        fn prop_explodes_once_regardless_of_gestures(
            hits in 2u32..=5,
            break_hits in 1u32..=3,
            gestures in 0usize..20,
        ) {
            let mut f = Fixture::new("{}", Thresholds::new(hits, break_hits));
            let mut explosions = 0;
            for _ in 0..gestures {
                f.gesture(TargetId::Biscuit);
                explosions += Fixture::explosions(&f.resolver.drain_events());
            }
            let expected = usize::from(gestures as u32 > hits + break_hits);
            prop_assert_eq!(explosions, expected);
        }
    }
}
