//! Bot group core: scatter placement, forward advance, and blowout.
//!
//! A [`GroupSpawner`] owns a cluster of units from the moment they are
//! placed until they are knocked away. It knows nothing about the engine:
//! unit instances come from a [`UnitFactory`], impulses go out through a
//! [`PhysicsSink`], and every random draw is taken from an injected
//! [`RandomSource`].
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──spawn──▶ Spawned ──trigger_blowout──▶ Destroyed
//!                           │   ▲
//!                           └───┘ spawn (replaces units), advance
//! ```
//!
//! Nothing leaves `Destroyed`; every operation there returns
//! [`GroupError::InvalidState`].
//!
//! ## Axes
//!
//! Up is +Y, the group advances along +Z, and right is +X.

use crate::constants::*;
use crate::error::{require_non_negative, GroupError, GroupResult};
use crate::random::RandomSource;
use bevy::math::{Vec2, Vec3};

/// Vertical axis; blowout always pushes along it with a non-negative weight.
pub const GROUP_UP: Vec3 = Vec3::Y;
/// Direction the group advances in.
pub const GROUP_FORWARD: Vec3 = Vec3::Z;
/// Lateral axis of the scatter box.
pub const GROUP_RIGHT: Vec3 = Vec3::X;

// ── Data model ────────────────────────────────────────────────────────────────

/// Axis-aligned box bounding the legal scatter region of a group.
///
/// `center` is relative to the group origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupBounds {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl GroupBounds {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Box centred on the group origin.
    pub fn from_half_extents(half_extents: Vec3) -> Self {
        Self::new(Vec3::ZERO, half_extents)
    }

    /// The same box expressed in world space for a group at `origin`.
    pub fn world(&self, origin: Vec3) -> Self {
        Self::new(origin + self.center, self.half_extents)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y && d.z <= self.half_extents.z
    }
}

/// Template for a spawnable unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDescriptor {
    /// Full bounding size. x and z drive spacing; y is only used by hosts
    /// that build a collider from the descriptor.
    pub size: Vec3,
}

impl UnitDescriptor {
    pub fn new(size: Vec3) -> Self {
        Self { size }
    }

    /// Descriptor from its ground footprint, with unit height.
    pub fn from_footprint(x: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, 1.0, z))
    }
}

/// A placed unit, owned by its group until the blowout hands it off.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedUnit<H> {
    pub handle: H,
    /// World position; rides along with the group origin.
    pub position: Vec3,
    pub wave_amplitude: f32,
    /// Radians.
    pub wave_phase_offset: f32,
}

/// Kinetic hand-off for a single unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupState {
    #[default]
    Uninitialized,
    Spawned,
    Destroyed,
}

// ── Collaborators ─────────────────────────────────────────────────────────────

/// Receives the blowout impulses. Fire-and-forget: ownership of the unit
/// handle moves to the sink.
pub trait PhysicsSink<H> {
    fn apply_impulse(&mut self, unit: H, impulse: Impulse);
}

/// Collects impulses in emission order.
impl<H> PhysicsSink<H> for Vec<(H, Impulse)> {
    fn apply_impulse(&mut self, unit: H, impulse: Impulse) {
        self.push((unit, impulse));
    }
}

/// Instantiates the engine-side representation of a unit.
pub trait UnitFactory<H> {
    fn create_unit(&mut self, descriptor: &UnitDescriptor) -> H;

    /// Called for every unit displaced by a repeated `spawn`.
    fn release_unit(&mut self, _unit: H) {}
}

impl<H, F> UnitFactory<H> for F
where
    F: FnMut(&UnitDescriptor) -> H,
{
    fn create_unit(&mut self, descriptor: &UnitDescriptor) -> H {
        self(descriptor)
    }
}

/// Supplies the half-extents of the region a group may scatter into.
pub trait BoundsProvider {
    fn half_extents(&self) -> Vec3;
}

impl BoundsProvider for GroupBounds {
    fn half_extents(&self) -> Vec3 {
        self.half_extents
    }
}

impl BoundsProvider for Vec3 {
    fn half_extents(&self) -> Vec3 {
        *self
    }
}

// ── Pure helpers ──────────────────────────────────────────────────────────────

/// Scatter range (x, z) for a group of `count` units.
///
/// Grows linearly with the group size and is clamped to the bounds
/// half-extents. A single unit (or an empty group) gets a zero range.
pub fn scatter_range(count: usize, descriptor: &UnitDescriptor, half_extents: Vec3) -> Vec2 {
    let spread = count.saturating_sub(1) as f32;
    Vec2::new(
        (descriptor.size.x * spread).min(half_extents.x),
        (descriptor.size.z * spread).min(half_extents.z),
    )
}

/// Wave amplitude and phase offset for the unit at spawn index `index`.
pub fn wave_parameters(index: usize) -> (f32, f32) {
    let step = (index + 1) as f32;
    (step * WAVE_AMPLITUDE_STEP, step * WAVE_PHASE_STEP)
}

/// Sample one unit's blowout impulse.
///
/// Consumes exactly six draws from `rng`, in this order: speed, up weight,
/// forward weight, right weight, linear jitter, angular jitter.
pub fn sample_blowout<R: RandomSource + ?Sized>(rng: &mut R, speed_vary: f32) -> Impulse {
    let blowout_speed = rng.uniform(BLOWOUT_JITTER_MIN, BLOWOUT_JITTER_MAX) * speed_vary;

    let raw = GROUP_UP * rng.uniform(0.0, BLOWOUT_UP_WEIGHT_MAX)
        + GROUP_FORWARD * rng.uniform(-BLOWOUT_PLANAR_WEIGHT, BLOWOUT_PLANAR_WEIGHT)
        + GROUP_RIGHT * rng.uniform(-BLOWOUT_PLANAR_WEIGHT, BLOWOUT_PLANAR_WEIGHT);
    let linear_velocity = raw.normalize_or_zero()
        * rng.uniform(BLOWOUT_JITTER_MIN, BLOWOUT_JITTER_MAX)
        * blowout_speed;

    // Perpendicular to both the vertical and the scatter direction: tumble.
    let spin_axis = GROUP_UP.cross(linear_velocity).normalize_or_zero();
    let angular_velocity =
        spin_axis * rng.uniform(BLOWOUT_JITTER_MIN, BLOWOUT_JITTER_MAX) * blowout_speed;

    Impulse {
        linear_velocity,
        angular_velocity,
    }
}

// ── Spawner ───────────────────────────────────────────────────────────────────

/// A cluster of units sharing one origin and one lifecycle.
#[derive(Debug, Clone)]
pub struct GroupSpawner<H> {
    origin: Vec3,
    advance_speed: f32,
    bounds: GroupBounds,
    units: Vec<SpawnedUnit<H>>,
    state: GroupState,
}

impl<H> GroupSpawner<H> {
    pub fn new(origin: Vec3, advance_speed: f32, bounds: GroupBounds) -> Self {
        Self {
            origin,
            advance_speed,
            bounds,
            units: Vec::new(),
            state: GroupState::Uninitialized,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn advance_speed(&self) -> f32 {
        self.advance_speed
    }

    pub fn bounds(&self) -> &GroupBounds {
        &self.bounds
    }

    pub fn units(&self) -> &[SpawnedUnit<H>] {
        &self.units
    }

    pub fn state(&self) -> GroupState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == GroupState::Destroyed
    }

    fn require_state(&self, operation: &'static str, allowed: &[GroupState]) -> GroupResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(GroupError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Move the group (origin and every unit) forward by `advance_speed × delta_secs`.
    pub fn advance(&mut self, delta_secs: f32) -> GroupResult<()> {
        self.require_state("advance", &[GroupState::Spawned])?;
        require_non_negative("delta_secs", delta_secs)?;

        let step = GROUP_FORWARD * (self.advance_speed * delta_secs);
        self.origin += step;
        for unit in &mut self.units {
            unit.position += step;
        }
        Ok(())
    }

    /// Place `count` units scattered in front of the origin.
    ///
    /// A repeated call releases the previous units through `factory` and
    /// replaces them. Positions are independent samples; overlap is allowed.
    pub fn spawn<F, B, R>(
        &mut self,
        count: i32,
        descriptor: &UnitDescriptor,
        bounds: &B,
        factory: &mut F,
        rng: &mut R,
    ) -> GroupResult<&[SpawnedUnit<H>]>
    where
        F: UnitFactory<H> + ?Sized,
        B: BoundsProvider + ?Sized,
        R: RandomSource + ?Sized,
    {
        self.require_state("spawn", &[GroupState::Uninitialized, GroupState::Spawned])?;
        if count < 0 {
            return Err(GroupError::InvalidArgument {
                name: "count",
                value: count as f64,
            });
        }
        require_non_negative("footprint.x", descriptor.size.x)?;
        require_non_negative("footprint.z", descriptor.size.z)?;
        let half_extents = bounds.half_extents();
        require_non_negative("half_extent.x", half_extents.x)?;
        require_non_negative("half_extent.y", half_extents.y)?;
        require_non_negative("half_extent.z", half_extents.z)?;

        for old in self.units.drain(..) {
            factory.release_unit(old.handle);
        }

        let count = count as usize;
        let range = scatter_range(count, descriptor, half_extents);
        self.bounds.half_extents = half_extents;

        for i in 0..count {
            let handle = factory.create_unit(descriptor);

            let offset = Vec3::new(
                rng.uniform(-range.x, range.x),
                0.0,
                // Forward only: the group bunches up ahead of its origin.
                rng.uniform(0.0, range.y),
            );
            let mut position = self.origin + offset;
            position.y = GROUND_Y;

            let (wave_amplitude, wave_phase_offset) = wave_parameters(i);
            self.units.push(SpawnedUnit {
                handle,
                position,
                wave_amplitude,
                wave_phase_offset,
            });
        }

        self.state = GroupState::Spawned;
        Ok(&self.units)
    }

    /// Knock every unit away and destroy the group.
    ///
    /// Each unit's handle is moved into `sink` together with its impulse, in
    /// spawn order. Returns the number of impulses emitted.
    pub fn trigger_blowout<S, R>(
        &mut self,
        speed_vary: f32,
        sink: &mut S,
        rng: &mut R,
    ) -> GroupResult<usize>
    where
        S: PhysicsSink<H> + ?Sized,
        R: RandomSource + ?Sized,
    {
        self.require_state("trigger blowout on", &[GroupState::Spawned])?;

        let units = std::mem::take(&mut self.units);
        let emitted = units.len();
        for unit in units {
            let impulse = sample_blowout(rng, speed_vary);
            sink.apply_impulse(unit.handle, impulse);
        }

        self.state = GroupState::Destroyed;
        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    /// Source that always returns the upper bound of the requested range.
    struct Ceiling;

    impl RandomSource for Ceiling {
        fn uniform(&mut self, _min: f32, max: f32) -> f32 {
            max
        }
    }

    fn group_at(origin: Vec3, speed: f32) -> GroupSpawner<u32> {
        GroupSpawner::new(origin, speed, GroupBounds::from_half_extents(Vec3::ONE))
    }

    fn counter() -> impl FnMut(&UnitDescriptor) -> u32 {
        let mut next = 0;
        move |_: &UnitDescriptor| {
            next += 1;
            next - 1
        }
    }

    // ── scatter_range ─────────────────────────────────────────────────────────

    #[test]
    fn scatter_range_grows_with_count() {
        let d = UnitDescriptor::from_footprint(1.0, 0.5);
        let r = scatter_range(4, &d, Vec3::splat(100.0));
        assert_eq!(r, Vec2::new(3.0, 1.5));
    }

    #[test]
    fn scatter_range_is_clamped_to_half_extents() {
        let d = UnitDescriptor::from_footprint(2.0, 2.0);
        let r = scatter_range(10, &d, Vec3::new(3.0, 1.0, 4.0));
        assert_eq!(r.x, 3.0);
        assert_eq!(r.y, 4.0);
    }

    #[test]
    fn scatter_range_single_and_empty_groups_are_zero() {
        let d = UnitDescriptor::from_footprint(2.0, 2.0);
        assert_eq!(scatter_range(1, &d, Vec3::splat(5.0)), Vec2::ZERO);
        assert_eq!(scatter_range(0, &d, Vec3::splat(5.0)), Vec2::ZERO);
    }

    // ── spawn ─────────────────────────────────────────────────────────────────

    #[test]
    fn ceiling_source_places_units_at_range_edge() {
        let mut group = group_at(Vec3::new(10.0, 4.0, -2.0), 1.0);
        let d = UnitDescriptor::from_footprint(2.0, 2.0);
        let units = group
            .spawn(10, &d, &Vec3::new(3.0, 1.0, 3.0), &mut counter(), &mut Ceiling)
            .expect("spawn should succeed");
        for unit in units {
            assert_eq!(unit.position, Vec3::new(13.0, 0.0, 1.0));
        }
    }

    #[test]
    fn repeated_spawn_releases_previous_units() {
        struct Tracking {
            created: u32,
            released: Vec<u32>,
        }
        impl UnitFactory<u32> for Tracking {
            fn create_unit(&mut self, _descriptor: &UnitDescriptor) -> u32 {
                self.created += 1;
                self.created
            }
            fn release_unit(&mut self, unit: u32) {
                self.released.push(unit);
            }
        }

        let mut factory = Tracking {
            created: 0,
            released: Vec::new(),
        };
        let mut rng = seeded(3);
        let mut group = group_at(Vec3::ZERO, 1.0);
        let d = UnitDescriptor::from_footprint(1.0, 1.0);

        group.spawn(2, &d, &Vec3::ONE, &mut factory, &mut rng).unwrap();
        group.spawn(3, &d, &Vec3::ONE, &mut factory, &mut rng).unwrap();

        assert_eq!(factory.released, vec![1, 2]);
        let handles: Vec<u32> = group.units().iter().map(|u| u.handle).collect();
        assert_eq!(handles, vec![3, 4, 5]);
    }

    #[test]
    fn spawn_stores_provider_half_extents() {
        let mut group = group_at(Vec3::ZERO, 1.0);
        let d = UnitDescriptor::from_footprint(1.0, 1.0);
        group
            .spawn(1, &d, &Vec3::new(2.0, 1.0, 4.0), &mut counter(), &mut seeded(1))
            .unwrap();
        assert_eq!(group.bounds().half_extents, Vec3::new(2.0, 1.0, 4.0));
    }

    // ── blowout ───────────────────────────────────────────────────────────────

    #[test]
    fn ceiling_blowout_is_deterministic_and_upward() {
        let impulse = sample_blowout(&mut Ceiling, BLOWOUT_SPEED_VARY);
        // speed 15, raw (3, 3, 3) normalised, linear jitter 1.5 → |v| = 22.5
        assert!((impulse.linear_velocity.length() - 22.5).abs() < 1e-4);
        assert!(impulse.linear_velocity.y > 0.0);
        assert!((impulse.angular_velocity.length() - 22.5).abs() < 1e-4);
    }

    #[test]
    fn purely_vertical_blowout_has_no_spin() {
        struct Vertical;
        impl RandomSource for Vertical {
            fn uniform(&mut self, min: f32, max: f32) -> f32 {
                // Planar weights sample 0, everything else its upper bound.
                if min < 0.0 {
                    0.0
                } else {
                    max
                }
            }
        }
        let impulse = sample_blowout(&mut Vertical, 10.0);
        assert_eq!(impulse.angular_velocity, Vec3::ZERO);
        assert!(impulse.linear_velocity.x.abs() < 1e-6);
        assert!(impulse.linear_velocity.z.abs() < 1e-6);
    }

    #[test]
    fn blowout_from_uninitialized_is_invalid_state() {
        let mut group = group_at(Vec3::ZERO, 1.0);
        let mut sink = Vec::new();
        let err = group
            .trigger_blowout(10.0, &mut sink, &mut seeded(1))
            .unwrap_err();
        assert!(matches!(
            err,
            GroupError::InvalidState {
                state: GroupState::Uninitialized,
                ..
            }
        ));
        assert!(sink.is_empty());
    }

    // ── advance ───────────────────────────────────────────────────────────────

    #[test]
    fn advance_moves_units_with_origin() {
        let mut group = group_at(Vec3::ZERO, 2.0);
        let d = UnitDescriptor::from_footprint(1.0, 1.0);
        group.spawn(3, &d, &Vec3::ONE, &mut counter(), &mut seeded(9)).unwrap();
        let before: Vec<Vec3> = group.units().iter().map(|u| u.position).collect();

        group.advance(0.5).unwrap();

        assert_eq!(group.origin(), Vec3::new(0.0, 0.0, 1.0));
        for (unit, old) in group.units().iter().zip(before) {
            assert_eq!(unit.position, old + Vec3::Z);
            assert_eq!(unit.position.y, 0.0);
        }
    }

    #[test]
    fn advance_before_spawn_is_invalid_state() {
        let mut group = group_at(Vec3::ZERO, 1.0);
        assert!(matches!(
            group.advance(0.1),
            Err(GroupError::InvalidState { .. })
        ));
    }

    #[test]
    fn negative_delta_is_rejected() {
        let mut group = group_at(Vec3::ZERO, 1.0);
        let d = UnitDescriptor::from_footprint(1.0, 1.0);
        group.spawn(1, &d, &Vec3::ONE, &mut counter(), &mut seeded(1)).unwrap();
        assert_eq!(
            group.advance(-0.1),
            Err(GroupError::InvalidArgument {
                name: "delta_secs",
                value: -0.1f32 as f64,
            })
        );
        assert_eq!(group.origin(), Vec3::ZERO);
    }

    // ── bounds ────────────────────────────────────────────────────────────────

    #[test]
    fn world_bounds_follow_origin() {
        let b = GroupBounds::new(Vec3::new(0.0, 0.0, 1.0), Vec3::splat(2.0));
        let w = b.world(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(w.center, Vec3::new(5.0, 0.0, 1.0));
        assert!(w.contains(Vec3::new(6.5, 0.0, 2.5)));
        assert!(!w.contains(Vec3::new(7.5, 0.0, 1.0)));
    }
}
