//! Tiered request counting.
//!
//! - [`tier`] - Tier names and their budgets
//! - [`window_counter`] - Per-identity fixed-window counter
//! - [`sweeper`] - Background eviction of idle counter cells
//!
//! Counters are an in-process cache for abuse detection, never a source of
//! truth: a restart forgets them and several instances do not share them.

pub mod sweeper;
pub mod tier;
pub mod window_counter;

pub use sweeper::SweeperHandle;
pub use tier::{Tier, TierLimit, TierPolicy, UnknownTier};
pub use window_counter::{Admission, DEFAULT_GRACE_MULTIPLE, WindowCounter};
