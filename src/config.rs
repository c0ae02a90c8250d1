//! Runtime group configuration loaded from `assets/groups.toml`.
//!
//! [`GroupConfig`] is a Bevy [`Resource`] that mirrors the tunable constants
//! in [`crate::constants`]. At startup, [`load_group_config`] reads
//! `assets/groups.toml` and overwrites the defaults with any values present in
//! the file. Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GroupConfig>` to any system parameter list and read values
//! with `config.run_speed`, `config.blowout_speed_vary`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GroupConfig::default()`.

use crate::constants::*;
use crate::error::{require_non_negative, GroupError, GroupResult};
use crate::group::{GroupBounds, UnitDescriptor};
use bevy::prelude::*;
use serde::Deserialize;

pub const CONFIG_PATH: &str = "assets/groups.toml";

/// Runtime-tunable group and scatter configuration.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    // ── Movement ──────────────────────────────────────────────────────────────
    pub run_speed: f32,
    pub slow_speed_factor: f32,

    // ── Blowout ───────────────────────────────────────────────────────────────
    pub blowout_speed_vary: f32,

    // ── Composition ───────────────────────────────────────────────────────────
    pub bots_per_group: i32,
    pub bot_size_x: f32,
    pub bot_size_y: f32,
    pub bot_size_z: f32,
    pub group_half_extent_x: f32,
    pub group_half_extent_y: f32,
    pub group_half_extent_z: f32,

    // ── Wave Bob ──────────────────────────────────────────────────────────────
    pub wave_frequency: f32,

    // ── Spawning & Culling ────────────────────────────────────────────────────
    pub group_spawn_interval_secs: f32,
    pub group_spawn_z: f32,
    pub spawn_lane_half_width: f32,
    pub cull_z: f32,
    pub scatter_lifetime_secs: f32,

    /// Fixed seed for reproducible runs; entropy-seeded when absent.
    pub rng_seed: Option<u64>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            run_speed: RUN_SPEED,
            slow_speed_factor: SLOW_SPEED_FACTOR,
            blowout_speed_vary: BLOWOUT_SPEED_VARY,
            bots_per_group: BOTS_PER_GROUP,
            bot_size_x: BOT_SIZE_X,
            bot_size_y: BOT_SIZE_Y,
            bot_size_z: BOT_SIZE_Z,
            group_half_extent_x: GROUP_HALF_EXTENT_X,
            group_half_extent_y: GROUP_HALF_EXTENT_Y,
            group_half_extent_z: GROUP_HALF_EXTENT_Z,
            wave_frequency: WAVE_FREQUENCY,
            group_spawn_interval_secs: GROUP_SPAWN_INTERVAL_SECS,
            group_spawn_z: GROUP_SPAWN_Z,
            spawn_lane_half_width: SPAWN_LANE_HALF_WIDTH,
            cull_z: CULL_Z,
            scatter_lifetime_secs: SCATTER_LIFETIME_SECS,
            rng_seed: None,
        }
    }
}

impl GroupConfig {
    /// Parse a TOML document; keys not present keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn bot_descriptor(&self) -> UnitDescriptor {
        UnitDescriptor::new(Vec3::new(self.bot_size_x, self.bot_size_y, self.bot_size_z))
    }

    pub fn group_bounds(&self) -> GroupBounds {
        GroupBounds::from_half_extents(Vec3::new(
            self.group_half_extent_x,
            self.group_half_extent_y,
            self.group_half_extent_z,
        ))
    }

    /// Reject values the group core would refuse at spawn time.
    pub fn validate(&self) -> GroupResult<()> {
        if self.bots_per_group < 0 {
            return Err(GroupError::InvalidArgument {
                name: "bots_per_group",
                value: self.bots_per_group as f64,
            });
        }
        require_non_negative("bot_size_x", self.bot_size_x)?;
        require_non_negative("bot_size_y", self.bot_size_y)?;
        require_non_negative("bot_size_z", self.bot_size_z)?;
        require_non_negative("group_half_extent_x", self.group_half_extent_x)?;
        require_non_negative("group_half_extent_y", self.group_half_extent_y)?;
        require_non_negative("group_half_extent_z", self.group_half_extent_z)?;
        require_non_negative("run_speed", self.run_speed)?;
        require_non_negative("slow_speed_factor", self.slow_speed_factor)?;
        require_non_negative("scatter_lifetime_secs", self.scatter_lifetime_secs)?;
        Ok(())
    }
}

/// Startup system: attempt to load `assets/groups.toml` and overwrite the
/// `GroupConfig` resource with any values present in the file.
///
/// Parse and validation errors are logged and the compiled defaults stay in
/// place. A missing file is not an error.
pub fn load_group_config(mut config: ResMut<GroupConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match GroupConfig::from_toml_str(&contents) {
            Ok(loaded) => match loaded.validate() {
                Ok(()) => {
                    *config = loaded;
                    info!("[SETUP] Loaded group config from {CONFIG_PATH}");
                }
                Err(e) => warn!("[SETUP] Rejected {CONFIG_PATH}: {e}; using defaults"),
            },
            Err(e) => warn!("[SETUP] Failed to parse {CONFIG_PATH}: {e}; using defaults"),
        },
        Err(_) => info!("[SETUP] No {CONFIG_PATH} found; using compiled defaults"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GroupConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = GroupConfig::from_toml_str("run_speed = 2.5\nrng_seed = 99\n")
            .expect("valid toml");
        assert_eq!(cfg.run_speed, 2.5);
        assert_eq!(cfg.rng_seed, Some(99));
        assert_eq!(cfg.blowout_speed_vary, BLOWOUT_SPEED_VARY);
        assert_eq!(cfg.bots_per_group, BOTS_PER_GROUP);
    }

    #[test]
    fn negative_extent_fails_validation() {
        let cfg = GroupConfig::from_toml_str("group_half_extent_z = -1.0").expect("valid toml");
        assert_eq!(
            cfg.validate(),
            Err(GroupError::InvalidArgument {
                name: "group_half_extent_z",
                value: -1.0,
            })
        );
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GroupConfig::from_toml_str("run_speed = \"fast\"").is_err());
    }

    #[test]
    fn descriptor_and_bounds_follow_config() {
        let cfg = GroupConfig::default();
        assert_eq!(cfg.bot_descriptor().size.x, BOT_SIZE_X);
        assert_eq!(cfg.group_bounds().half_extents.z, GROUP_HALF_EXTENT_Z);
    }
}
