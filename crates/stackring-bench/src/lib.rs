//! Benchmark profiles for stackring.
//!
//! - [`arena_for_nodes`]: an arena sized to hold exactly one list of a given
//!   length, sentinel included.
//! - [`PROFILE_LENS`]: the list lengths the list benchmarks sweep.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use stackring_arena::{Arena, ArenaConfig, ConfigError};
use stackring_list::node_layout;

/// List lengths swept by the list benchmarks.
pub const PROFILE_LENS: [usize; 3] = [16, 1_024, 16_384];

/// Bytes one list node holding a `T` occupies in an arena, padding
/// included.
pub fn node_footprint<T>() -> usize {
    node_layout::<T>().pad_to_align().size()
}

/// An arena large enough for a list of `len` elements of `T`.
///
/// Sized for `len + 1` nodes, so a list of exactly `len` elements fits and
/// one more push fails.
pub fn arena_for_nodes<T>(len: usize) -> Result<Arena, ConfigError> {
    let capacity = node_footprint::<T>()
        .checked_mul(len + 1)
        .ok_or(ConfigError::CapacityOverflow { capacity: usize::MAX })?;
    Arena::new(ArenaConfig::new(capacity))
}
