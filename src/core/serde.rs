/*!
 * Serde Helper Functions
 * Skip predicates and serde_with re-exports shared by the snapshot and metric types
 */

pub use serde_with::{serde_as, DurationMilliSeconds};

/// Skip serializing zero counters
#[inline]
pub const fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

#[inline]
pub const fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}
