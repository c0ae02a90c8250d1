use crate::bot::BotAssets;
use crate::config::GroupConfig;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Half-size of the square ground slab (world units).
const GROUND_HALF_SIZE: f32 = 40.0;

/// Setup camera and light looking down the lane groups advance along.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 14.0, 24.0).looking_at(Vec3::new(0.0, 0.0, -6.0), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 16.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    info!("[SETUP] Camera spawned");
}

/// Spawn the ground slab scattered bots land on, and the shared bot assets.
pub fn setup_scene(
    mut commands: Commands,
    config: Res<GroupConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let bot = config.bot_descriptor().size;
    commands.insert_resource(BotAssets {
        mesh: meshes.add(Cuboid::new(bot.x, bot.y, bot.z)),
        material: materials.add(Color::srgb(0.8, 0.25, 0.3)),
    });

    // Top face sits just under the bots' feet.
    let ground_y = -bot.y * 0.5 - 0.1;
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(GROUND_HALF_SIZE * 2.0, 0.2, GROUND_HALF_SIZE * 2.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.35, 0.3))),
        Transform::from_xyz(0.0, ground_y, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(GROUND_HALF_SIZE, 0.1, GROUND_HALF_SIZE),
    ));
    info!("[SETUP] Ground and bot assets ready");
}
