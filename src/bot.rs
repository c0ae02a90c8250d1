//! Bot entities and the Bevy/Rapier adapters for the group core.
//!
//! [`BotFactory`] turns [`UnitFactory`] calls into entity spawns, and
//! [`RapierScatterSink`] turns blowout impulses into dynamic Rapier bodies.
//! A live bot carries [`Bot`] (its wave parameters); once knocked away it
//! loses `Bot` and gains [`Scattered`] so the cleanup system can age it out.

use crate::group::{Impulse, PhysicsSink, SpawnedUnit, UnitDescriptor, UnitFactory};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

// ── Components & resources ───────────────────────────────────────────────────

/// Live bot still owned by its group.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Bot {
    pub wave_amplitude: f32,
    pub wave_phase_offset: f32,
}

/// Bot that has been knocked away and now belongs to the physics world.
#[derive(Component, Debug, Clone, Copy)]
pub struct Scattered {
    /// Seconds since the blowout.
    pub age: f32,
}

/// Shared render assets for bots. Optional: headless apps spawn bots
/// without meshes.
#[derive(Resource, Clone)]
pub struct BotAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

// ── Wave bob ──────────────────────────────────────────────────────────────────

/// Vertical bob of a live bot at time `elapsed_secs`.
pub fn wave_offset(amplitude: f32, phase_offset: f32, frequency: f32, elapsed_secs: f32) -> f32 {
    amplitude * (elapsed_secs * frequency + phase_offset).sin()
}

impl Bot {
    pub fn from_unit<H>(unit: &SpawnedUnit<H>) -> Self {
        Self {
            wave_amplitude: unit.wave_amplitude,
            wave_phase_offset: unit.wave_phase_offset,
        }
    }

    /// Rendered translation for a bot whose group places it at `position`.
    pub fn bobbed_translation(&self, position: Vec3, frequency: f32, elapsed_secs: f32) -> Vec3 {
        position
            + Vec3::Y
                * wave_offset(
                    self.wave_amplitude,
                    self.wave_phase_offset,
                    frequency,
                    elapsed_secs,
                )
    }
}

// ── UnitFactory ───────────────────────────────────────────────────────────────

/// Spawns one entity per unit. Transforms and [`Bot`] are filled in by
/// [`attach_bot_components`] once the group has placed the units.
pub struct BotFactory<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub assets: Option<&'a BotAssets>,
}

impl UnitFactory<Entity> for BotFactory<'_, '_, '_> {
    fn create_unit(&mut self, _descriptor: &UnitDescriptor) -> Entity {
        let mut entity = self
            .commands
            .spawn((Transform::default(), Visibility::default()));
        if let Some(assets) = self.assets {
            entity.insert((
                Mesh3d(assets.mesh.clone()),
                MeshMaterial3d(assets.material.clone()),
            ));
        }
        entity.id()
    }

    fn release_unit(&mut self, unit: Entity) {
        self.commands.entity(unit).despawn();
    }
}

/// Write the placed position and wave parameters onto each unit's entity.
pub fn attach_bot_components(commands: &mut Commands, units: &[SpawnedUnit<Entity>]) {
    for unit in units {
        commands.entity(unit.handle).insert((
            Bot::from_unit(unit),
            Transform::from_translation(unit.position),
        ));
    }
}

// ── PhysicsSink ───────────────────────────────────────────────────────────────

/// Hands a blown-out bot to Rapier: dynamic body, box collider sized from
/// the descriptor, and the sampled velocities.
pub struct RapierScatterSink<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub descriptor: UnitDescriptor,
}

impl PhysicsSink<Entity> for RapierScatterSink<'_, '_, '_> {
    fn apply_impulse(&mut self, unit: Entity, impulse: Impulse) {
        let half = self.descriptor.size * 0.5;
        self.commands.entity(unit).remove::<Bot>().insert((
            Scattered { age: 0.0 },
            RigidBody::Dynamic,
            Collider::cuboid(half.x, half.y, half.z),
            Velocity {
                linvel: impulse.linear_velocity,
                angvel: impulse.angular_velocity,
            },
            Sleeping::disabled(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn wave_offset_peaks_at_amplitude() {
        let y = wave_offset(0.3, FRAC_PI_2, 1.0, 0.0);
        assert!((y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn zero_amplitude_never_bobs() {
        for t in [0.0, 0.7, 12.5] {
            assert_eq!(wave_offset(0.0, 1.0, 3.0, t), 0.0);
        }
    }

    #[test]
    fn bob_only_moves_vertically() {
        let bot = Bot {
            wave_amplitude: 0.2,
            wave_phase_offset: 0.5,
        };
        let p = Vec3::new(1.0, 0.0, -4.0);
        let bobbed = bot.bobbed_translation(p, 3.0, 1.25);
        assert_eq!(bobbed.x, p.x);
        assert_eq!(bobbed.z, p.z);
        assert!(bobbed.y.abs() <= 0.2 + 1e-6);
    }
}
