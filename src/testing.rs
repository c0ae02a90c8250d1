//! Scripted scenarios for the runtime test mode (`SLASH_TEST=<name>`).
//!
//! Each scenario seeds the group RNG, disables periodic spawning and places
//! a known set of groups. Verification runs once `frame_limit` frames have
//! elapsed, prints a report and exits with a matching status.

mod types;
mod verification;

pub use types::*;
pub use verification::*;

use crate::bot::BotAssets;
use crate::config::GroupConfig;
use crate::graphics;
use crate::random::GroupRng;
use crate::simulation::{self, spawn_bot_group, BotGroup, GroupDamaged, GroupKind};
use bevy::prelude::*;

/// Seed every scenario runs with.
pub const TEST_SEED: u64 = 0x5EED;

pub fn configure_test_mode(app: &mut App, test_name: &str) {
    app.insert_resource(TestConfig {
        enabled: true,
        ..Default::default()
    })
    .init_resource::<ImpulseObservations>();

    add_test_startup_system(app, test_name);

    app.add_systems(
        Update,
        (
            test_damage_system.before(simulation::blowout_trigger_system),
            test_impulse_observer_system.after(simulation::blowout_trigger_system),
        ),
    );
    app.add_systems(
        PostUpdate,
        (test_logging_system, test_verification_system).chain(),
    );

    println!("Running test: {}", test_name);
}

fn add_test_startup_system(app: &mut App, test_name: &str) {
    match test_name {
        "blowout_burst" => app.add_systems(
            Startup,
            spawn_test_blowout_burst
                .after(simulation::seed_group_rng)
                .after(graphics::setup_scene),
        ),
        "crowded_group" => app.add_systems(
            Startup,
            spawn_test_crowded_group
                .after(simulation::seed_group_rng)
                .after(graphics::setup_scene),
        ),
        "double_trigger" => app.add_systems(
            Startup,
            spawn_test_double_trigger
                .after(simulation::seed_group_rng)
                .after(graphics::setup_scene),
        ),
        _ => app.add_systems(
            Startup,
            spawn_test_single_group
                .after(simulation::seed_group_rng)
                .after(graphics::setup_scene),
        ),
    };
}

/// Deterministic starting point shared by every scenario.
fn prepare(config: &mut GroupConfig, rng: &mut GroupRng) {
    config.group_spawn_interval_secs = 0.0;
    // Scattered bots must survive until verification counts them.
    config.scatter_lifetime_secs = 1.0e6;
    *rng = GroupRng::new(Some(TEST_SEED));
}

fn spawn_groups(
    commands: &mut Commands,
    assets: Option<&BotAssets>,
    config: &GroupConfig,
    rng: &mut GroupRng,
    origins: &[Vec3],
    count: i32,
) {
    for &origin in origins {
        let spawned = spawn_bot_group(
            commands,
            assets,
            config,
            &mut rng.0,
            origin,
            count,
            GroupKind::Normal,
        );
        if let Err(e) = spawned {
            println!("✗ Failed to spawn test group at {origin}: {e}");
        }
    }
}

/// Spawn test scenario: one group of three bots, never damaged
pub fn spawn_test_single_group(
    mut commands: Commands,
    mut config: ResMut<GroupConfig>,
    mut rng: ResMut<GroupRng>,
    mut test_config: ResMut<TestConfig>,
    assets: Option<Res<BotAssets>>,
) {
    prepare(&mut config, &mut rng);
    test_config.test_name = "single_group".to_string();
    test_config.frame_limit = 60;
    test_config.expected_bots = 3;

    let assets = assets.as_deref();
    spawn_groups(&mut commands, assets, &config, &mut rng, &[Vec3::ZERO], 3);
    println!("✓ Spawned test: one group of 3 bots at the origin");
}

/// Spawn test scenario: four groups of five, all blown out on frame 10
pub fn spawn_test_blowout_burst(
    mut commands: Commands,
    mut config: ResMut<GroupConfig>,
    mut rng: ResMut<GroupRng>,
    mut test_config: ResMut<TestConfig>,
    assets: Option<Res<BotAssets>>,
) {
    prepare(&mut config, &mut rng);
    test_config.test_name = "blowout_burst".to_string();
    test_config.frame_limit = 40;
    test_config.damage_frame = Some(10);
    test_config.expected_bots = 20;

    let origins = [-6.0, -2.0, 2.0, 6.0].map(|x| Vec3::new(x, 0.0, -10.0));
    let assets = assets.as_deref();
    spawn_groups(&mut commands, assets, &config, &mut rng, &origins, 5);
    println!("✓ Spawned test: four groups of 5 bots, blowout on frame 10");
}

/// Spawn test scenario: a twelve-bot group whose unclamped scatter would
/// overflow its box
pub fn spawn_test_crowded_group(
    mut commands: Commands,
    mut config: ResMut<GroupConfig>,
    mut rng: ResMut<GroupRng>,
    mut test_config: ResMut<TestConfig>,
    assets: Option<Res<BotAssets>>,
) {
    prepare(&mut config, &mut rng);
    config.bot_size_x = 2.0;
    config.bot_size_z = 2.0;
    config.group_half_extent_x = 3.0;
    config.group_half_extent_z = 3.0;
    test_config.test_name = "crowded_group".to_string();
    test_config.frame_limit = 30;
    test_config.expected_bots = 12;

    let assets = assets.as_deref();
    let origin = Vec3::new(0.0, 0.0, -5.0);
    spawn_groups(&mut commands, assets, &config, &mut rng, &[origin], 12);
    println!("✓ Spawned test: one group of 12 bots with footprint 2 in a ±3 box");
}

/// Spawn test scenario: one group damaged twice in the same frame
pub fn spawn_test_double_trigger(
    mut commands: Commands,
    mut config: ResMut<GroupConfig>,
    mut rng: ResMut<GroupRng>,
    mut test_config: ResMut<TestConfig>,
    assets: Option<Res<BotAssets>>,
) {
    prepare(&mut config, &mut rng);
    test_config.test_name = "double_trigger".to_string();
    test_config.frame_limit = 20;
    test_config.damage_frame = Some(5);
    test_config.damage_repeats = 2;
    test_config.expected_bots = 4;

    let assets = assets.as_deref();
    spawn_groups(&mut commands, assets, &config, &mut rng, &[Vec3::ZERO], 4);
    println!("✓ Spawned test: one group of 4 bots, damaged twice on frame 5");
}

/// Send the scripted damage messages on `damage_frame`.
pub fn test_damage_system(
    test_config: Res<TestConfig>,
    groups: Query<Entity, With<BotGroup>>,
    mut damaged: MessageWriter<GroupDamaged>,
) {
    // `frame_count` is bumped in PostUpdate, so Update sees the previous frame.
    if !test_config.enabled || test_config.damage_frame != Some(test_config.frame_count + 1) {
        return;
    }
    for group in groups.iter() {
        for _ in 0..test_config.damage_repeats {
            damaged.write(GroupDamaged { group });
        }
    }
    println!(
        "[Frame {}] Damage sent to {} group(s) x{}",
        test_config.frame_count + 1,
        groups.iter().count(),
        test_config.damage_repeats
    );
}
