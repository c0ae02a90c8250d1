//! Bot group spawning and blowout scatter.
//!
//! The engine-free core lives in [`group`]; everything else hosts it in a
//! Bevy app with Rapier handling the scattered bots.

pub mod bot;
pub mod config;
pub mod constants;
pub mod error;
pub mod graphics;
pub mod group;
pub mod random;
pub mod simulation;
pub mod testing;
