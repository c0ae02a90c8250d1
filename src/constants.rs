//! Centralised group and scatter constants.
//!
//! The values in the first two sections define the spawn and blowout
//! behaviour itself and are not runtime-tunable. The remaining sections are
//! the compiled defaults behind [`crate::config::GroupConfig`]; override them
//! in `assets/groups.toml`.

use std::f32::consts::FRAC_PI_4;

// ── Spawn: Wave Motion ────────────────────────────────────────────────────────

/// Bob amplitude added per spawn index: unit `i` gets `(i + 1) × step`.
pub const WAVE_AMPLITUDE_STEP: f32 = 0.1;

/// Phase offset added per spawn index (45°): unit `i` gets `(i + 1) × step`.
pub const WAVE_PHASE_STEP: f32 = FRAC_PI_4;

/// Height every spawned unit is placed at, regardless of the group origin.
pub const GROUND_Y: f32 = 0.0;

// ── Blowout ───────────────────────────────────────────────────────────────────

/// Default multiplier on every sampled blowout speed.
pub const BLOWOUT_SPEED_VARY: f32 = 10.0;

/// Lower bound of the per-unit speed jitter factor.
pub const BLOWOUT_JITTER_MIN: f32 = 0.5;

/// Upper bound of the per-unit speed jitter factor.
pub const BLOWOUT_JITTER_MAX: f32 = 1.5;

/// Maximum weight of the up-axis scatter component (lower bound is 0, so
/// units never get knocked into the ground).
pub const BLOWOUT_UP_WEIGHT_MAX: f32 = 3.0;

/// Half-range of the forward and right scatter weights.
pub const BLOWOUT_PLANAR_WEIGHT: f32 = 3.0;

// ── Group Movement ────────────────────────────────────────────────────────────

/// Forward advance speed of a normal group (world units per second).
pub const RUN_SPEED: f32 = 1.0;

/// Advance speed multiplier applied to slow groups.
pub const SLOW_SPEED_FACTOR: f32 = 0.5;

// ── Group Composition ─────────────────────────────────────────────────────────

/// Bots spawned per group by the periodic spawner.
pub const BOTS_PER_GROUP: i32 = 5;

/// Bot bounding size along x (also the spacing footprint).
pub const BOT_SIZE_X: f32 = 1.0;

/// Bot bounding height; used for the collider only.
pub const BOT_SIZE_Y: f32 = 1.0;

/// Bot bounding size along z (also the spacing footprint).
pub const BOT_SIZE_Z: f32 = 1.0;

/// Half-extent of the group box along x; scatter never exceeds it.
pub const GROUP_HALF_EXTENT_X: f32 = 3.0;

/// Half-extent of the group box along y.
pub const GROUP_HALF_EXTENT_Y: f32 = 1.0;

/// Half-extent of the group box along z.
pub const GROUP_HALF_EXTENT_Z: f32 = 3.0;

// ── Wave Bob ──────────────────────────────────────────────────────────────────

/// Angular frequency (rad/s) of the idle bob applied to live bots.
pub const WAVE_FREQUENCY: f32 = 3.0;

// ── Spawning & Culling ────────────────────────────────────────────────────────

/// Seconds between periodic group spawns.
pub const GROUP_SPAWN_INTERVAL_SECS: f32 = 4.0;

/// z coordinate new groups are spawned at (groups advance toward +z).
pub const GROUP_SPAWN_Z: f32 = -30.0;

/// New groups are centred at a random x within ±this value.
pub const SPAWN_LANE_HALF_WIDTH: f32 = 6.0;

/// Groups whose origin passes this z are despawned with their bots.
pub const CULL_Z: f32 = 30.0;

/// Seconds a scattered bot lives before it is despawned.
pub const SCATTER_LIFETIME_SECS: f32 = 5.0;
