//! Named rate-limit tiers and their budgets.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A named rate-limit policy applied to a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Public pages and tracking endpoints.
    Public,
    /// Credential-checking endpoints.
    Auth,
    /// Privileged admin endpoints.
    Admin,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Public, Tier::Auth, Tier::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Public => "public",
            Tier::Auth => "auth",
            Tier::Admin => "admin",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rate limit tier '{0}' (expected public, auth or admin)")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Tier::Public),
            "auth" => Ok(Tier::Auth),
            "admin" => Ok(Tier::Admin),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

/// Budget and window for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimit {
    /// Maximum admitted requests per window.
    pub budget: u32,
    /// Window length.
    pub window: Duration,
    /// Whether crossing the budget escalates to a persisted block.
    pub auto_block: bool,
}

impl TierLimit {
    pub fn new(budget: u32, window: Duration) -> Self {
        Self {
            budget,
            window,
            auto_block: true,
        }
    }

    pub fn with_auto_block(mut self, auto_block: bool) -> Self {
        self.auto_block = auto_block;
        self
    }
}

/// Static mapping from tier to its limit.
///
/// Defaults:
///
/// | Tier   | Budget | Window |
/// |--------|--------|--------|
/// | public | 100    | 60s    |
/// | auth   | 10     | 60s    |
/// | admin  | 20     | 60s    |
///
/// Every tier auto-blocks by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    public: TierLimit,
    auth: TierLimit,
    admin: TierLimit,
}

impl TierPolicy {
    pub fn new(public: TierLimit, auth: TierLimit, admin: TierLimit) -> Self {
        Self {
            public,
            auth,
            admin,
        }
    }

    pub fn limit(&self, tier: Tier) -> TierLimit {
        match tier {
            Tier::Public => self.public,
            Tier::Auth => self.auth,
            Tier::Admin => self.admin,
        }
    }

    /// Returns a copy of the policy with one tier replaced.
    pub fn with_limit(mut self, tier: Tier, limit: TierLimit) -> Self {
        match tier {
            Tier::Public => self.public = limit,
            Tier::Auth => self.auth = limit,
            Tier::Admin => self.admin = limit,
        }
        self
    }

    /// Longest window across all tiers.
    pub fn max_window(&self) -> Duration {
        Tier::ALL
            .iter()
            .map(|t| self.limit(*t).window)
            .max()
            .unwrap_or_default()
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        let minute = Duration::from_secs(60);
        Self {
            public: TierLimit::new(100, minute),
            auth: TierLimit::new(10, minute),
            admin: TierLimit::new(20, minute),
        }
    }
}
