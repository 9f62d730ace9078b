//! Per-request admission decisions.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::block_service::BlockService;
use crate::domain::rate_limit::{Tier, WindowCounter};
use crate::error::AppError;
use crate::utils::ClientIdentity;

/// Result of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Admit,
    /// The identity has an active block.
    Blocked { blocked_at: DateTime<Utc> },
    /// The tier budget is exhausted for the current window.
    RateLimited {
        count: u32,
        /// Whether this request persisted a new automatic block.
        auto_blocked: bool,
    },
}

impl GateDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, GateDecision::Admit)
    }

    /// Converts a denial into the error rendered to the client.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            GateDecision::Admit => Ok(()),
            GateDecision::Blocked { blocked_at } => Err(AppError::blocked(blocked_at)),
            GateDecision::RateLimited { .. } => Err(AppError::rate_limited()),
        }
    }
}

/// Combines the block list and the window counter.
///
/// Evaluation order:
///
/// 1. an active block denies the request without touching the counter
/// 2. a block lookup failure or timeout is logged and the request proceeds
/// 3. the window counter admits or denies; the first denial in a window
///    escalates to an automatic block when the tier allows it
pub struct GateService {
    blocks: Arc<BlockService>,
    counter: Arc<WindowCounter>,
}

impl GateService {
    pub fn new(blocks: Arc<BlockService>, counter: Arc<WindowCounter>) -> Self {
        Self { blocks, counter }
    }

    pub fn counter(&self) -> &Arc<WindowCounter> {
        &self.counter
    }

    pub async fn evaluate(&self, identity: &ClientIdentity, tier: Tier) -> GateDecision {
        match self.blocks.active_block(identity).await {
            Ok(Some(block)) => {
                metrics::counter!("gate_blocked_total").increment(1);
                tracing::warn!(ip = %identity, %tier, "Blocked client denied");
                return GateDecision::Blocked {
                    blocked_at: block.created_at,
                };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(
                    ip = %identity,
                    %tier,
                    error = %e,
                    "Block lookup failed, admitting without block check"
                );
            }
        }

        let admission = self.counter.admit(identity, tier);
        if admission.allowed {
            return GateDecision::Admit;
        }

        metrics::counter!("gate_rate_limited_total", "tier" => tier.as_str()).increment(1);
        tracing::warn!(ip = %identity, %tier, count = admission.count, "Rate limit exceeded");

        let limit = self.counter.policy().limit(tier);
        let mut auto_blocked = false;

        if admission.threshold_crossed && limit.auto_block {
            let reason = auto_block_reason(tier, admission.count, limit.window);
            if self
                .blocks
                .record_auto_block(identity, reason, admission.count)
                .await
                .is_some()
            {
                metrics::counter!("gate_auto_blocks_total", "tier" => tier.as_str()).increment(1);
                auto_blocked = true;
            }
        }

        GateDecision::RateLimited {
            count: admission.count,
            auto_blocked,
        }
    }
}

/// Reason stored on automatic blocks,
/// e.g. `Rate limit exceeded on auth endpoints: 11 requests in 60s`.
pub fn auto_block_reason(tier: Tier, count: u32, window: Duration) -> String {
    format!(
        "Rate limit exceeded on {tier} endpoints: {count} requests in {}",
        format_window(window)
    )
}

fn format_window(window: Duration) -> String {
    if window.subsec_millis() == 0 {
        format!("{}s", window.as_secs())
    } else {
        format!("{}ms", window.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::BlockRecord;
    use crate::domain::rate_limit::{TierLimit, TierPolicy};
    use crate::domain::repositories::MockBlockRepository;
    use serde_json::json;

    fn policy(budget: u32, auto_block: bool) -> TierPolicy {
        let limit = TierLimit::new(budget, Duration::from_secs(60)).with_auto_block(auto_block);
        TierPolicy::new(limit, limit, limit)
    }

    fn gate(mock: MockBlockRepository, policy: TierPolicy) -> GateService {
        let blocks = Arc::new(BlockService::new(
            Arc::new(mock),
            Duration::from_millis(200),
        ));
        GateService::new(blocks, Arc::new(WindowCounter::new(policy)))
    }

    fn active(ip: &str) -> BlockRecord {
        let now = Utc::now();
        BlockRecord {
            id: 1,
            ip: ip.to_string(),
            reason: "abuse report".to_string(),
            request_count: 0,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_blocked_identity_is_denied_without_counting() {
        let mut mock = MockBlockRepository::new();
        mock.expect_find_active()
            .returning(|ip| Ok(Some(active(ip))));

        let gate = gate(mock, policy(5, true));
        let identity = ClientIdentity::new("203.0.113.5");

        let decision = gate.evaluate(&identity, Tier::Public).await;

        assert!(matches!(decision, GateDecision::Blocked { .. }));
        assert_eq!(gate.counter().count_for(&identity, Tier::Public), None);
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_open() {
        let mut mock = MockBlockRepository::new();
        mock.expect_find_active()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let gate = gate(mock, policy(5, true));

        let decision = gate
            .evaluate(&ClientIdentity::new("192.0.2.1"), Tier::Public)
            .await;
        assert_eq!(decision, GateDecision::Admit);
    }

    #[tokio::test]
    async fn test_first_denial_escalates_once() {
        let mut mock = MockBlockRepository::new();
        mock.expect_find_active().returning(|_| Ok(None));
        mock.expect_insert_if_absent()
            .withf(|b| {
                b.ip == "192.0.2.2"
                    && b.request_count == 3
                    && b.reason == "Rate limit exceeded on auth endpoints: 3 requests in 60s"
            })
            .times(1)
            .returning(|b| {
                let mut record = active(&b.ip);
                record.reason = b.reason;
                record.request_count = b.request_count;
                Ok(Some(record))
            });

        let gate = gate(mock, policy(2, true));
        let identity = ClientIdentity::new("192.0.2.2");

        assert!(gate.evaluate(&identity, Tier::Auth).await.is_admitted());
        assert!(gate.evaluate(&identity, Tier::Auth).await.is_admitted());

        let third = gate.evaluate(&identity, Tier::Auth).await;
        assert_eq!(
            third,
            GateDecision::RateLimited {
                count: 3,
                auto_blocked: true
            }
        );

        let fourth = gate.evaluate(&identity, Tier::Auth).await;
        assert_eq!(
            fourth,
            GateDecision::RateLimited {
                count: 4,
                auto_blocked: false
            }
        );
    }

    #[tokio::test]
    async fn test_tier_without_auto_block_only_rate_limits() {
        let mut mock = MockBlockRepository::new();
        mock.expect_find_active().returning(|_| Ok(None));
        mock.expect_insert_if_absent().never();

        let gate = gate(mock, policy(1, false));
        let identity = ClientIdentity::new("192.0.2.3");

        assert!(gate.evaluate(&identity, Tier::Public).await.is_admitted());
        let denied = gate.evaluate(&identity, Tier::Public).await;
        assert!(matches!(
            denied,
            GateDecision::RateLimited {
                auto_blocked: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_auto_block_failure_still_rate_limits() {
        let mut mock = MockBlockRepository::new();
        mock.expect_find_active().returning(|_| Ok(None));
        mock.expect_insert_if_absent()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let gate = gate(mock, policy(1, true));
        let identity = ClientIdentity::new("192.0.2.4");

        gate.evaluate(&identity, Tier::Admin).await;
        let denied = gate.evaluate(&identity, Tier::Admin).await;

        assert!(matches!(denied.clone().into_result(), Err(AppError::RateLimited { .. })));
        assert_eq!(
            denied,
            GateDecision::RateLimited {
                count: 2,
                auto_blocked: false
            }
        );
    }

    #[test]
    fn test_auto_block_reason_formats_sub_second_windows() {
        assert_eq!(
            auto_block_reason(Tier::Public, 16, Duration::from_millis(1500)),
            "Rate limit exceeded on public endpoints: 16 requests in 1500ms"
        );
        assert_eq!(
            auto_block_reason(Tier::Public, 16, Duration::from_secs(1)),
            "Rate limit exceeded on public endpoints: 16 requests in 1s"
        );
    }
}
