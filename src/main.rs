use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier3d::prelude::*;
use std::env;

use slash::bot::BotAssets;
use slash::config::{self, GroupConfig};
use slash::graphics;
use slash::random::GroupRng;
use slash::simulation::{self, spawn_bot_group, GroupKind};
use slash::testing;

/// Open with a single group already on the lane so there is something to hit.
fn spawn_initial_group(
    mut commands: Commands,
    config: Res<GroupConfig>,
    assets: Option<Res<BotAssets>>,
    mut rng: ResMut<GroupRng>,
) {
    let origin = Vec3::new(0.0, 0.0, config.group_spawn_z * 0.5);
    if let Err(e) = spawn_bot_group(
        &mut commands,
        assets.as_deref(),
        &config,
        &mut rng.0,
        origin,
        config.bots_per_group,
        GroupKind::Normal,
    ) {
        warn!("initial group spawn failed: {e}");
    }
}

fn main() {
    // Check for test mode
    let test_mode = env::var("SLASH_TEST").ok();

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Slash".into(),
            resolution: WindowResolution::new(1200, 680),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.05, 0.06, 0.1)))
    // Insert GroupConfig with compiled defaults; load_group_config will
    // overwrite it from assets/groups.toml (if present) in the Startup schedule.
    .insert_resource(GroupConfig::default())
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
    .add_plugins(simulation::SimulationPlugin)
    .add_systems(
        Startup,
        (
            // Load config first so every other startup system sees the final values.
            config::load_group_config,
            graphics::setup_camera.after(config::load_group_config),
            graphics::setup_scene.after(config::load_group_config),
        ),
    )
    .add_systems(
        Update,
        (
            simulation::blowout_input_system.before(simulation::blowout_trigger_system),
            simulation::group_bounds_gizmo_system,
        ),
    );

    if let Some(test_name) = test_mode {
        testing::configure_test_mode(&mut app, &test_name);
    } else {
        app.add_systems(
            Startup,
            spawn_initial_group
                .after(simulation::seed_group_rng)
                .after(graphics::setup_scene),
        );
    }

    app.run();
}
