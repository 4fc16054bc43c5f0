//! Clearance guard on ponding updates.
//!
//! Zeroing out standing water at a point is only accepted together with the
//! time it took to clear it.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("clearance time required")]
pub struct ClearanceRequired;

/// Reject `old > 0 -> new == 0` when `cleared_in_time` is blank.
pub fn validate(old_ponding: f64, new_ponding: f64, cleared_in_time: &str) -> Result<(), ClearanceRequired> {
    if old_ponding > 0.0 && new_ponding == 0.0 && cleared_in_time.trim().is_empty() {
        return Err(ClearanceRequired);
    }
    Ok(())
}
