use crate::bot::{Bot, Scattered};
use crate::constants::GROUND_Y;
use crate::group::{wave_parameters, GroupBounds};
use crate::simulation::BotGroup;
use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

use super::{ImpulseObservations, TestConfig};

/// Tolerance for the orthogonality and placement checks.
const EPS: f32 = 1.0e-3;

/// Record the velocities handed to each bot in the frame it was scattered,
/// before Rapier integrates gravity and contacts into them.
pub fn test_impulse_observer_system(
    mut observations: ResMut<ImpulseObservations>,
    q: Query<&Velocity, Added<Scattered>>,
) {
    for velocity in q.iter() {
        observations.impulses += 1;

        let lin = velocity.linvel.length();
        let ang = velocity.angvel.length();
        if lin > EPS && ang > EPS {
            let linear_dot = velocity.angvel.dot(velocity.linvel).abs() / (lin * ang);
            let vertical_dot = velocity.angvel.y.abs() / ang;
            observations.max_linear_dot = observations.max_linear_dot.max(linear_dot);
            observations.max_vertical_dot = observations.max_vertical_dot.max(vertical_dot);
        }
    }
}

pub fn test_logging_system(
    mut test_config: ResMut<TestConfig>,
    groups: Query<&BotGroup>,
    bots: Query<(), With<Bot>>,
    scattered: Query<(), With<Scattered>>,
) {
    if !test_config.enabled {
        return;
    }

    test_config.frame_count += 1;
    let group_count = groups.iter().count();

    if test_config.frame_count == 1 {
        test_config.initial_group_count = group_count;
        println!(
            "[Frame 1] Test: {} | groups: {} | bots: {}",
            test_config.test_name,
            group_count,
            bots.iter().count()
        );
        for group in groups.iter() {
            let origin = group.spawner.origin();
            println!(
                "  Group {:?} origin ({:.2}, {:.2}, {:.2}) with {} bots",
                group.kind,
                origin.x,
                origin.y,
                origin.z,
                group.spawner.units().len()
            );
        }
    } else if test_config.frame_count.is_multiple_of(10)
        || test_config.frame_count == test_config.frame_limit
    {
        println!(
            "[Frame {}] groups: {} (was {}) | live bots: {} | scattered: {}",
            test_config.frame_count,
            group_count,
            test_config.initial_group_count,
            bots.iter().count(),
            scattered.iter().count()
        );
    }
}

/// Verify test results at the end
pub fn test_verification_system(
    test_config: Res<TestConfig>,
    observations: Res<ImpulseObservations>,
    groups: Query<&BotGroup>,
    bots: Query<(), With<Bot>>,
    scattered: Query<(), With<Scattered>>,
    mut exit: MessageWriter<bevy::app::AppExit>,
) {
    if !test_config.enabled || test_config.frame_count != test_config.frame_limit {
        return;
    }

    let group_count = groups.iter().count();
    let bot_count = bots.iter().count();
    let scattered_count = scattered.iter().count();

    println!("\n╔════════════════════════════════════════════╗");
    println!("║           TEST COMPLETE                    ║");
    println!("╚════════════════════════════════════════════╝");
    println!("Test: {}", test_config.test_name);
    println!("Frames: {}", test_config.frame_count);
    println!("Initial groups: {}", test_config.initial_group_count);
    println!("Final groups:   {}", group_count);
    println!("Live bots: {} | scattered: {}", bot_count, scattered_count);
    println!(
        "Impulses: {} | max |ω·v|: {:.5} | max |ω·up|: {:.5}",
        observations.impulses, observations.max_linear_dot, observations.max_vertical_dot
    );

    let mut failures: Vec<String> = Vec::new();
    let mut check = |ok: bool, what: String| {
        if !ok {
            failures.push(what);
        }
    };

    match test_config.test_name.as_str() {
        "single_group" | "crowded_group" => {
            check(group_count == 1, format!("expected 1 group, found {group_count}"));
            check(
                bot_count == test_config.expected_bots,
                format!("expected {} bots, found {bot_count}", test_config.expected_bots),
            );
            for group in groups.iter() {
                let origin = group.spawner.origin();
                let world = group.spawner.bounds().world(origin);
                let bounds = GroupBounds::new(world.center, world.half_extents + Vec3::splat(EPS));
                for (i, unit) in group.spawner.units().iter().enumerate() {
                    let offset = unit.position - origin;
                    check(
                        unit.position.y == GROUND_Y,
                        format!("unit {i} left the ground: y = {}", unit.position.y),
                    );
                    check(
                        bounds.contains(unit.position),
                        format!("unit {i} at {} outside the group box", unit.position),
                    );
                    check(
                        offset.z >= -EPS,
                        format!("unit {i} z offset {} behind the origin", offset.z),
                    );
                    let (amplitude, phase) = wave_parameters(i);
                    check(
                        unit.wave_amplitude == amplitude && unit.wave_phase_offset == phase,
                        format!("unit {i} wave parameters out of sequence"),
                    );
                }
            }
        }
        "blowout_burst" | "double_trigger" => {
            check(group_count == 0, format!("expected 0 groups, found {group_count}"));
            check(bot_count == 0, format!("expected 0 live bots, found {bot_count}"));
            check(
                scattered_count == test_config.expected_bots,
                format!(
                    "expected {} scattered bots, found {scattered_count}",
                    test_config.expected_bots
                ),
            );
            check(
                observations.impulses == test_config.expected_bots,
                format!(
                    "expected one impulse per bot ({}), observed {}",
                    test_config.expected_bots, observations.impulses
                ),
            );
            check(
                observations.max_linear_dot < EPS,
                "angular velocity not orthogonal to linear velocity".to_string(),
            );
            check(
                observations.max_vertical_dot < EPS,
                "angular velocity not orthogonal to the vertical".to_string(),
            );
        }
        other => check(false, format!("no verification defined for '{other}'")),
    }

    if failures.is_empty() {
        println!("✓ PASS");
        exit.write(bevy::app::AppExit::Success);
    } else {
        for failure in &failures {
            println!("✗ {failure}");
        }
        println!("✗ FAIL");
        exit.write(bevy::app::AppExit::error());
    }
}
