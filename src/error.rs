//! Group lifecycle error types.
//!
//! Every fallible operation on a [`crate::group::GroupSpawner`] returns a
//! [`GroupResult`] instead of panicking, so callers (Bevy systems, the test
//! harness) can log the failure and keep the frame going.
//!
//! ## Usage
//!
//! ```rust
//! use slash::error::{GroupError, GroupResult};
//!
//! fn check_count(count: i32) -> GroupResult<()> {
//!     if count < 0 {
//!         return Err(GroupError::InvalidArgument {
//!             name: "count",
//!             value: count as f64,
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use crate::group::GroupState;
use std::fmt;

/// Top-level error enum for bot group operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupError {
    /// An input was outside its legal range: a negative unit count, a
    /// negative unit footprint, negative bounds half-extents or a negative
    /// tick delta.
    InvalidArgument {
        /// Name of the rejected argument (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f64,
    },

    /// The operation is not valid in the group's current lifecycle state,
    /// e.g. advancing or scattering a group that was already blown out.
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the group was in when the operation was attempted.
        state: GroupState,
    },
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::InvalidArgument { name, value } => {
                write!(f, "invalid argument '{}' = {} (must be ≥ 0)", name, value)
            }
            GroupError::InvalidState { operation, state } => write!(
                f,
                "cannot {} a group in state {:?}",
                operation, state
            ),
        }
    }
}

impl std::error::Error for GroupError {}

/// Convenience alias: a `Result` using `GroupError` as the error type.
pub type GroupResult<T> = Result<T, GroupError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `value` is negative, infinite or NaN.
pub fn require_non_negative(name: &'static str, value: f32) -> GroupResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GroupError::InvalidArgument {
            name,
            value: value as f64,
        })
    }
}
