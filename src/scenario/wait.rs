//! 交易确认轮询。
//!
//! 以指数退避查询交易所在高度，查询出错时退化为“区块高度已前进”判断，
//! 超过总时长视为失败。

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ConfirmationConfig;
use crate::rpc::NodeClient;
use crate::transaction::TxHash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub enable: bool,
    pub timeout: Duration,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl ConfirmationPolicy {
    pub const fn disabled() -> Self {
        Self {
            enable: false,
            timeout: Duration::ZERO,
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
        }
    }
}

impl From<&ConfirmationConfig> for ConfirmationPolicy {
    fn from(config: &ConfirmationConfig) -> Self {
        let initial_interval = Duration::from_millis(config.initial_interval_ms.max(1));
        Self {
            enable: config.enable,
            timeout: Duration::from_millis(config.timeout_ms),
            initial_interval,
            max_interval: Duration::from_millis(config.max_interval_ms).max(initial_interval),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfirmationError {
    #[error("交易 {hash} 在 {waited_ms}ms 内未确认")]
    Timeout { hash: String, waited_ms: u128 },
}

/// 确认的方式：查到了交易高度，或仅观察到区块高度前进。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Skipped,
    AtHeight(u32),
    BlockAdvanced(u32),
}

pub async fn wait_for_confirmation(
    client: &dyn NodeClient,
    hash: &TxHash,
    policy: &ConfirmationPolicy,
) -> Result<Confirmation, ConfirmationError> {
    if !policy.enable {
        return Ok(Confirmation::Skipped);
    }

    let started = Instant::now();
    let start_count = client.get_block_count().await.ok();
    let mut interval = policy.initial_interval;

    loop {
        match client.get_transaction_height(hash).await {
            Ok(Some(height)) => {
                debug!(
                    target: "scenario",
                    tx_hash = %hash,
                    height,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "交易已确认"
                );
                return Ok(Confirmation::AtHeight(height));
            }
            Ok(None) => {}
            Err(err) => {
                warn!(target: "scenario", tx_hash = %hash, error = %err, "查询交易高度失败");
                if let (Some(start), Ok(count)) = (start_count, client.get_block_count().await) {
                    if count > start {
                        return Ok(Confirmation::BlockAdvanced(count));
                    }
                }
            }
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            return Err(ConfirmationError::Timeout {
                hash: hash.to_string(),
                waited_ms: elapsed.as_millis(),
            });
        }
        tokio::time::sleep(interval.min(policy.timeout - elapsed)).await;
        interval = (interval * 2).min(policy.max_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::native::{GasSettings, SignerPolicy, contracts, invoke_native};
    use crate::rpc::mock::MockNode;

    fn fast_policy() -> ConfirmationPolicy {
        ConfirmationPolicy {
            enable: true,
            timeout: Duration::from_millis(60),
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
        }
    }

    async fn submit(node: &MockNode) -> TxHash {
        let account = Account::from_secret_bytes([5u8; 32]);
        invoke_native(
            node,
            GasSettings {
                price: 0,
                limit: 20_000,
            },
            contracts::GOVERNANCE,
            "callSplit",
            &[],
            SignerPolicy::Single(&account),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn confirmed_transaction_reports_height() {
        let node = MockNode::new();
        let hash = submit(&node).await;
        let confirmation = wait_for_confirmation(&node, &hash, &fast_policy())
            .await
            .unwrap();
        assert_eq!(confirmation, Confirmation::AtHeight(1));
    }

    #[tokio::test]
    async fn unconfirmed_transaction_times_out() {
        let node = MockNode::new();
        node.hold_confirmations();
        let hash = submit(&node).await;
        let err = wait_for_confirmation(&node, &hash, &fast_policy())
            .await
            .unwrap_err();
        let ConfirmationError::Timeout { waited_ms, .. } = err;
        assert!(waited_ms >= 60);
    }

    #[tokio::test]
    async fn disabled_policy_skips_polling() {
        let node = MockNode::new();
        let hash = TxHash::new([1u8; 32]);
        let confirmation = wait_for_confirmation(&node, &hash, &ConfirmationPolicy::disabled())
            .await
            .unwrap();
        assert_eq!(confirmation, Confirmation::Skipped);
    }

    #[test]
    fn config_intervals_are_clamped() {
        let config = ConfirmationConfig {
            enable: true,
            timeout_ms: 1_000,
            initial_interval_ms: 0,
            max_interval_ms: 0,
        };
        let policy = ConfirmationPolicy::from(&config);
        assert_eq!(policy.initial_interval, Duration::from_millis(1));
        assert_eq!(policy.max_interval, Duration::from_millis(1));
    }
}
