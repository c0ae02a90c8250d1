//! Group plugin and systems for Bevy ECS
//!
//! The systems here are the host side of [`crate::group`]: they own the
//! per-frame tick that the core exposes as `advance`, forward damage
//! messages to `trigger_blowout`, and keep entity transforms in sync with
//! the positions the core computes.
//!
//! | System                      | Purpose                                          |
//! |-----------------------------|--------------------------------------------------|
//! | `group_spawn_system`        | Spawn a new group every spawn interval           |
//! | `group_advance_system`      | Advance every live group by the frame delta      |
//! | `blowout_trigger_system`    | Scatter groups named by [`GroupDamaged`] messages |
//! | `bot_wave_system`           | Place live bots at their bobbed positions        |
//! | `group_culling_system`      | Despawn groups that ran past the cull line       |
//! | `scattered_cleanup_system`  | Despawn scattered bots after their lifetime      |

use crate::bot::{attach_bot_components, Bot, BotAssets, BotFactory, RapierScatterSink, Scattered};
use crate::config::{self, GroupConfig};
use crate::error::GroupResult;
use crate::group::{GroupSpawner, GroupState, UnitDescriptor};
use crate::random::{GroupRng, RandomSource};
use bevy::prelude::*;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GroupConfig>()
            .init_resource::<GroupRng>()
            .init_resource::<GroupSpawnState>()
            .add_message::<GroupDamaged>()
            .add_systems(Startup, seed_group_rng.after(config::load_group_config))
            .add_systems(
                Update,
                (
                    group_spawn_system,
                    group_advance_system,
                    blowout_trigger_system,
                    bot_wave_system,
                    group_culling_system,
                    scattered_cleanup_system,
                )
                    .chain(),
            );
    }
}

// ── Components, messages, resources ──────────────────────────────────────────

/// Advance-speed class of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupKind {
    #[default]
    Normal,
    Slow,
}

impl GroupKind {
    pub fn advance_speed(&self, config: &GroupConfig) -> f32 {
        match self {
            GroupKind::Normal => config.run_speed,
            GroupKind::Slow => config.run_speed * config.slow_speed_factor,
        }
    }
}

/// A group entity. Its bots are separate entities referenced by the
/// spawner's unit handles.
#[derive(Component, Debug)]
pub struct BotGroup {
    pub spawner: GroupSpawner<Entity>,
    pub kind: GroupKind,
    pub descriptor: UnitDescriptor,
}

/// The group took damage and should blow out.
#[derive(Message, Debug, Clone, Copy)]
pub struct GroupDamaged {
    pub group: Entity,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct GroupSpawnState {
    pub timer_secs: f32,
    pub total_spawned: u64,
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Spawn a group at `origin` with `count` bots, returning the group entity.
///
/// Nothing is spawned when the core rejects the arguments.
pub fn spawn_bot_group<R: RandomSource + ?Sized>(
    commands: &mut Commands,
    assets: Option<&BotAssets>,
    config: &GroupConfig,
    rng: &mut R,
    origin: Vec3,
    count: i32,
    kind: GroupKind,
) -> GroupResult<Entity> {
    let bounds = config.group_bounds();
    let descriptor = config.bot_descriptor();
    let mut spawner = GroupSpawner::new(origin, kind.advance_speed(config), bounds);

    let mut factory = BotFactory {
        commands: &mut *commands,
        assets,
    };
    spawner.spawn(count, &descriptor, &bounds, &mut factory, rng)?;
    attach_bot_components(commands, spawner.units());

    let entity = commands
        .spawn((
            BotGroup {
                spawner,
                kind,
                descriptor,
            },
            Transform::from_translation(origin),
        ))
        .id();
    Ok(entity)
}

/// Startup system: reseed the shared generator from the loaded config.
pub fn seed_group_rng(mut commands: Commands, config: Res<GroupConfig>) {
    commands.insert_resource(GroupRng::new(config.rng_seed));
    match config.rng_seed {
        Some(seed) => info!("[SETUP] Group RNG seeded with {seed}"),
        None => info!("[SETUP] Group RNG seeded from entropy"),
    }
}

/// Spawn a group in a random lane every `group_spawn_interval_secs`.
/// A non-positive interval disables periodic spawning.
pub fn group_spawn_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GroupConfig>,
    assets: Option<Res<BotAssets>>,
    mut rng: ResMut<GroupRng>,
    mut state: ResMut<GroupSpawnState>,
) {
    if config.group_spawn_interval_secs <= 0.0 {
        return;
    }
    state.timer_secs += time.delta_secs();
    if state.timer_secs < config.group_spawn_interval_secs {
        return;
    }
    state.timer_secs -= config.group_spawn_interval_secs;

    let lane = config.spawn_lane_half_width;
    let origin = Vec3::new(rng.0.uniform(-lane, lane), 0.0, config.group_spawn_z);
    // Every third group is a slow one.
    let kind = if state.total_spawned % 3 == 2 {
        GroupKind::Slow
    } else {
        GroupKind::Normal
    };

    match spawn_bot_group(
        &mut commands,
        assets.as_deref(),
        &config,
        &mut rng.0,
        origin,
        config.bots_per_group,
        kind,
    ) {
        Ok(group) => {
            state.total_spawned += 1;
            debug!("spawned {kind:?} group {group:?} at {origin}");
        }
        Err(e) => warn!("group spawn failed: {e}"),
    }
}

// ── Per-frame systems ────────────────────────────────────────────────────────

/// Advance every live group and mirror its origin onto the group transform.
pub fn group_advance_system(time: Res<Time>, mut groups: Query<(&mut BotGroup, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut group, mut transform) in groups.iter_mut() {
        if group.spawner.state() != GroupState::Spawned {
            continue;
        }
        if let Err(e) = group.spawner.advance(dt) {
            warn!("group advance failed: {e}");
            continue;
        }
        transform.translation = group.spawner.origin();
    }
}

/// Blow out every group named by a [`GroupDamaged`] message and despawn the
/// group entity. The scattered bots live on as Rapier bodies.
pub fn blowout_trigger_system(
    mut commands: Commands,
    mut damaged: MessageReader<GroupDamaged>,
    mut groups: Query<&mut BotGroup>,
    config: Res<GroupConfig>,
    mut rng: ResMut<GroupRng>,
) {
    for message in damaged.read() {
        let Ok(mut group) = groups.get_mut(message.group) else {
            warn!("damage for unknown group {:?}", message.group);
            continue;
        };

        let mut sink = RapierScatterSink {
            commands: &mut commands,
            descriptor: group.descriptor,
        };
        match group
            .spawner
            .trigger_blowout(config.blowout_speed_vary, &mut sink, &mut rng.0)
        {
            Ok(scattered) => {
                info!("group {:?} blew out {scattered} bots", message.group);
                commands.entity(message.group).despawn();
            }
            Err(e) => warn!("blowout of group {:?} failed: {e}", message.group),
        }
    }
}

/// Place every live bot at its group position plus its wave bob.
pub fn bot_wave_system(
    time: Res<Time>,
    config: Res<GroupConfig>,
    groups: Query<&BotGroup>,
    mut bots: Query<(&Bot, &mut Transform)>,
) {
    let elapsed = time.elapsed_secs();
    for group in groups.iter() {
        for unit in group.spawner.units() {
            if let Ok((bot, mut transform)) = bots.get_mut(unit.handle) {
                transform.translation =
                    bot.bobbed_translation(unit.position, config.wave_frequency, elapsed);
            }
        }
    }
}

/// Despawn groups (and their bots) whose origin has passed the cull line.
pub fn group_culling_system(
    mut commands: Commands,
    config: Res<GroupConfig>,
    groups: Query<(Entity, &BotGroup)>,
) {
    for (entity, group) in groups.iter() {
        if group.spawner.origin().z <= config.cull_z {
            continue;
        }
        for unit in group.spawner.units() {
            commands.entity(unit.handle).despawn();
        }
        commands.entity(entity).despawn();
    }
}

/// Age scattered bots and despawn them after `scatter_lifetime_secs`.
pub fn scattered_cleanup_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GroupConfig>,
    mut scattered: Query<(Entity, &mut Scattered)>,
) {
    let dt = time.delta_secs();
    for (entity, mut s) in scattered.iter_mut() {
        s.age += dt;
        if s.age >= config.scatter_lifetime_secs {
            commands.entity(entity).despawn();
        }
    }
}

// ── Windowed-only systems (registered by the binary) ─────────────────────────

/// Space damages every live group.
pub fn blowout_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    groups: Query<Entity, With<BotGroup>>,
    mut damaged: MessageWriter<GroupDamaged>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    for group in groups.iter() {
        damaged.write(GroupDamaged { group });
    }
}

/// Draw each group's world-space bounds as a wireframe box.
pub fn group_bounds_gizmo_system(mut gizmos: Gizmos, groups: Query<&BotGroup>) {
    for group in groups.iter() {
        let bounds = group.spawner.bounds().world(group.spawner.origin());
        gizmos.cuboid(
            Transform::from_translation(bounds.center).with_scale(bounds.half_extents * 2.0),
            Color::srgb(1.0, 0.45, 0.2),
        );
    }
}
