//! Headless tests for [`SimulationPlugin`].
//!
//! These tests use [`MinimalPlugins`] — no window, no rendering, no Rapier
//! pipeline — so they run fast and deterministically in CI. The scatter sink
//! still inserts Rapier components, which is all these tests inspect.
//!
//! Covered scenarios:
//! 1. A spawned group owns its bots and their wave parameters.
//! 2. `GroupDamaged` scatters every bot and despawns the group.
//! 3. A second damage message in the same frame scatters nothing extra.
//! 4. Groups advance with time and are culled past the cull line.
//! 5. The periodic spawner produces groups on its interval.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::{RigidBody, Velocity};
use slash::bot::{Bot, Scattered};
use slash::config::GroupConfig;
use slash::group::{wave_parameters, GroupState};
use slash::random::GroupRng;
use slash::simulation::{
    seed_group_rng, spawn_bot_group, BotGroup, GroupDamaged, GroupKind, GroupSpawnState,
    SimulationPlugin,
};
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Config with periodic spawning off and a fixed seed.
fn quiet_config() -> GroupConfig {
    GroupConfig {
        group_spawn_interval_secs: 0.0,
        rng_seed: Some(7),
        ..Default::default()
    }
}

fn spawn_one_group(mut commands: Commands, config: Res<GroupConfig>, mut rng: ResMut<GroupRng>) {
    spawn_bot_group(
        &mut commands,
        None,
        &config,
        &mut rng.0,
        Vec3::ZERO,
        3,
        GroupKind::Normal,
    )
    .expect("test group should spawn");
}

/// Build a minimal headless app with the plugin and one three-bot group.
///
/// Every frame advances virtual time by a fixed 100 ms.
fn app_with_group(config: GroupConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .insert_resource(config)
        .add_plugins(SimulationPlugin)
        .add_systems(Startup, spawn_one_group.after(seed_group_rng));
    app.update();
    app
}

fn count_with<C: Component>(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<Entity, With<C>>()
        .iter(app.world())
        .count()
}

fn group_entity(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<BotGroup>>()
        .single(app.world())
        .expect("exactly one group")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The spawned group references three live bots carrying its wave parameters.
#[test]
fn spawned_group_owns_its_bots() {
    let mut app = app_with_group(quiet_config());

    assert_eq!(count_with::<BotGroup>(&mut app), 1);
    assert_eq!(count_with::<Bot>(&mut app), 3);

    let group = group_entity(&mut app);
    let units = app
        .world()
        .get::<BotGroup>(group)
        .expect("group component")
        .spawner
        .units()
        .to_vec();
    for (i, unit) in units.iter().enumerate() {
        let bot = app.world().get::<Bot>(unit.handle).expect("bot component");
        let (amplitude, phase) = wave_parameters(i);
        assert_eq!(bot.wave_amplitude, amplitude);
        assert_eq!(bot.wave_phase_offset, phase);
        assert_eq!(unit.position.y, 0.0);
    }
}

/// Damage hands every bot to Rapier and removes the group entity.
#[test]
fn damage_scatters_bots_and_despawns_group() {
    let mut app = app_with_group(quiet_config());
    let group = group_entity(&mut app);

    app.world_mut().write_message(GroupDamaged { group });
    app.update();

    assert_eq!(count_with::<BotGroup>(&mut app), 0, "group must be despawned");
    assert_eq!(count_with::<Bot>(&mut app), 0, "no bot stays live");
    assert_eq!(count_with::<Scattered>(&mut app), 3);
    assert_eq!(count_with::<Velocity>(&mut app), 3);

    let bodies: Vec<RigidBody> = app
        .world_mut()
        .query::<&RigidBody>()
        .iter(app.world())
        .copied()
        .collect();
    assert!(bodies.iter().all(|b| *b == RigidBody::Dynamic));
}

/// Two damage messages in one frame scatter the group exactly once.
#[test]
fn repeated_damage_in_one_frame_scatters_once() {
    let mut app = app_with_group(quiet_config());
    let group = group_entity(&mut app);

    app.world_mut().write_message(GroupDamaged { group });
    app.world_mut().write_message(GroupDamaged { group });
    app.update();

    assert_eq!(count_with::<BotGroup>(&mut app), 0);
    assert_eq!(count_with::<Scattered>(&mut app), 3);
}

/// Damage for an entity that is not a group is ignored.
#[test]
fn damage_for_unknown_entity_is_ignored() {
    let mut app = app_with_group(quiet_config());
    let stray = app.world_mut().spawn_empty().id();

    app.world_mut().write_message(GroupDamaged { group: stray });
    app.update();

    assert_eq!(count_with::<BotGroup>(&mut app), 1);
    assert_eq!(count_with::<Bot>(&mut app), 3);
}

/// A live group moves forward and its transform follows the core origin.
#[test]
fn group_advances_with_time() {
    let mut app = app_with_group(quiet_config());
    for _ in 0..5 {
        app.update();
    }

    let group = group_entity(&mut app);
    let origin = app
        .world()
        .get::<BotGroup>(group)
        .expect("group component")
        .spawner
        .origin();
    let transform = app.world().get::<Transform>(group).expect("group transform");

    assert!(origin.z > 0.0, "group should have advanced, z = {}", origin.z);
    assert_eq!(origin.x, 0.0);
    assert_eq!(transform.translation, origin);
}

/// A group that crosses the cull line is removed together with its bots.
#[test]
fn groups_past_the_cull_line_are_removed() {
    let mut app = app_with_group(GroupConfig {
        cull_z: 0.05,
        ..quiet_config()
    });
    for _ in 0..5 {
        app.update();
    }

    assert_eq!(count_with::<BotGroup>(&mut app), 0);
    assert_eq!(count_with::<Bot>(&mut app), 0);
}

/// Scattered bots are despawned once they outlive their lifetime.
#[test]
fn scattered_bots_expire() {
    let mut app = app_with_group(GroupConfig {
        scatter_lifetime_secs: 0.25,
        ..quiet_config()
    });
    let group = group_entity(&mut app);
    app.world_mut().write_message(GroupDamaged { group });
    app.update();
    assert_eq!(count_with::<Scattered>(&mut app), 3);

    for _ in 0..5 {
        app.update();
    }
    assert_eq!(count_with::<Scattered>(&mut app), 0);
}

/// The periodic spawner adds groups once its interval has elapsed.
#[test]
fn periodic_spawner_adds_groups() {
    let mut app = app_with_group(GroupConfig {
        group_spawn_interval_secs: 0.15,
        ..quiet_config()
    });
    for _ in 0..6 {
        app.update();
    }

    let spawned = app.world().resource::<GroupSpawnState>().total_spawned;
    assert!(spawned >= 1, "expected at least one periodic spawn");
    assert_eq!(count_with::<BotGroup>(&mut app), 1 + spawned as usize);

    let mut states = app.world_mut().query::<&BotGroup>();
    for group in states.iter(app.world()) {
        assert_eq!(group.spawner.state(), GroupState::Spawned);
    }
}
