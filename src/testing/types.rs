use bevy::prelude::*;

/// Test configuration
#[derive(Resource)]
pub struct TestConfig {
    pub enabled: bool,
    pub test_name: String,
    pub frame_limit: u32,
    pub frame_count: u32,
    /// Frame on which every live group receives `GroupDamaged`.
    pub damage_frame: Option<u32>,
    /// Messages sent per group on `damage_frame`.
    pub damage_repeats: u32,
    /// Bots the scenario spawns in total.
    pub expected_bots: usize,
    pub initial_group_count: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            test_name: String::new(),
            frame_limit: 100,
            frame_count: 0,
            damage_frame: None,
            damage_repeats: 1,
            expected_bots: 0,
            initial_group_count: 0,
        }
    }
}

/// What the impulse observer saw in the frame each bot was scattered.
#[derive(Resource, Debug, Default)]
pub struct ImpulseObservations {
    pub impulses: usize,
    /// Largest |angvel · linvel| normalised by both magnitudes.
    pub max_linear_dot: f32,
    /// Largest |angvel.y| normalised by the angular magnitude.
    pub max_vertical_dot: f32,
}
