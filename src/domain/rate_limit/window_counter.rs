//! In-memory fixed-window request counter.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::sweeper::{SweeperHandle, spawn_sweeper};
use super::tier::{Tier, TierPolicy};
use crate::utils::ClientIdentity;

/// Default number of window lengths an idle cell survives before a sweep drops it.
pub const DEFAULT_GRACE_MULTIPLE: u32 = 2;

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    /// Requests counted in the current window, this one included.
    pub count: u32,
    /// Set only on the request that first exceeds the budget in a window.
    pub threshold_crossed: bool,
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u32,
    window_start: Instant,
}

/// Per-identity, per-tier request counter.
///
/// Each `(identity, tier)` cell is mutated under its shard lock, so concurrent
/// admissions for one identity never lose increments. State lives only in
/// process memory and is per instance.
pub struct WindowCounter {
    policy: TierPolicy,
    entries: DashMap<(ClientIdentity, Tier), WindowState>,
    grace_multiple: u32,
}

impl WindowCounter {
    pub fn new(policy: TierPolicy) -> Self {
        Self {
            policy,
            entries: DashMap::new(),
            grace_multiple: DEFAULT_GRACE_MULTIPLE,
        }
    }

    pub fn with_grace_multiple(mut self, grace_multiple: u32) -> Self {
        self.grace_multiple = grace_multiple.max(1);
        self
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    /// Counts a request from `identity` against `tier` at the current instant.
    pub fn admit(&self, identity: &ClientIdentity, tier: Tier) -> Admission {
        self.admit_at(identity, tier, Instant::now())
    }

    /// Counts a request at an explicit instant.
    ///
    /// A missing or elapsed window is replaced by a fresh one with `count = 1`.
    /// Inside the window the count is incremented; the request is denied once
    /// the count exceeds the tier budget.
    pub fn admit_at(&self, identity: &ClientIdentity, tier: Tier, now: Instant) -> Admission {
        let limit = self.policy.limit(tier);

        let mut entry = self
            .entries
            .entry((identity.clone(), tier))
            .or_insert(WindowState {
                count: 0,
                window_start: now,
            });
        let state = entry.value_mut();

        if state.count == 0 || now.saturating_duration_since(state.window_start) >= limit.window {
            *state = WindowState {
                count: 1,
                window_start: now,
            };
            return Admission {
                allowed: true,
                count: 1,
                threshold_crossed: false,
            };
        }

        state.count = state.count.saturating_add(1);
        let count = state.count;

        if count > limit.budget {
            Admission {
                allowed: false,
                count,
                threshold_crossed: count == limit.budget.saturating_add(1),
            }
        } else {
            Admission {
                allowed: true,
                count,
                threshold_crossed: false,
            }
        }
    }

    /// Drops cells whose window started more than `window * grace_multiple` ago.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Sweeps relative to an explicit instant. Returns the number of removed cells.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.entries.len();

        self.entries.retain(|(_, tier), state| {
            let ttl = self.stale_after(*tier);
            now.saturating_duration_since(state.window_start) <= ttl
        });

        before.saturating_sub(self.entries.len())
    }

    fn stale_after(&self, tier: Tier) -> Duration {
        self.policy
            .limit(tier)
            .window
            .saturating_mul(self.grace_multiple)
    }

    /// Count in the identity's current cell for `tier`, if one is tracked.
    pub fn count_for(&self, identity: &ClientIdentity, tier: Tier) -> Option<u32> {
        self.entries
            .get(&(identity.clone(), tier))
            .map(|state| state.count)
    }

    /// Number of tracked cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Starts the periodic sweep. The task runs until the handle is shut down
    /// or dropped.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        spawn_sweeper(Arc::clone(self), interval)
    }
}
