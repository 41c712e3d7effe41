//! 合约存储读取与解码。
//!
//! 空值处理由调用点决定：[`in_black_list`] 将空值视为“不在黑名单”，其余类型化读取
//! 将空值视为错误 [`StorageError::Empty`]。

pub mod key;
pub mod views;

use thiserror::Error;
use tracing::debug;

use crate::account::Address;
use crate::codec::{CodecError, Decode, Source};
use crate::native::{contracts, relay_contracts};
use crate::rpc::{NodeClient, RpcError};

pub use key::StorageKey;
pub use views::{
    GlobalParam, GovernanceView, NodeConfiguration, NodePeerPoolMap, PeerPoolMap, PenaltyStake,
    SplitCurve, TotalStake, VbftConfig, VoteInfo,
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("读取存储失败: {0}")]
    Rpc(#[from] RpcError),
    #[error("存储值为空: {what} (key={key})")]
    Empty { what: &'static str, key: String },
    #[error("反序列化 {what} 失败: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: CodecError,
    },
    #[error("节点公钥格式错误 {peer_pubkey}: {source}")]
    PeerPubkey {
        peer_pubkey: String,
        #[source]
        source: hex::FromHexError,
    },
}

/// 读取并解码一个存储值，空值与末尾多余字节均视为错误。
pub async fn fetch<T: Decode>(
    client: &dyn NodeClient,
    contract: &Address,
    key: &StorageKey,
    what: &'static str,
) -> Result<T, StorageError> {
    let value = client.get_storage(contract, key.as_bytes()).await?;
    debug!(
        target: "storage",
        what,
        key = ?key,
        len = value.len(),
        "读取存储"
    );
    if value.is_empty() {
        return Err(StorageError::Empty {
            what,
            key: key.to_string(),
        });
    }
    let mut reader = Source::new(&value);
    let decoded = T::decode(&mut reader).map_err(|source| StorageError::Decode { what, source })?;
    if !reader.is_empty() {
        return Err(StorageError::Decode {
            what,
            source: CodecError::Invalid(format!("存储值末尾存在 {} 字节多余数据", reader.remaining())),
        });
    }
    Ok(decoded)
}

pub async fn get_vbft_config(client: &dyn NodeClient) -> Result<VbftConfig, StorageError> {
    fetch(client, &contracts::GOVERNANCE, &StorageKey::vbft_config(), "vbftConfig").await
}

pub async fn get_global_param(client: &dyn NodeClient) -> Result<GlobalParam, StorageError> {
    fetch(client, &contracts::GOVERNANCE, &StorageKey::global_param(), "globalParam").await
}

pub async fn get_split_curve(client: &dyn NodeClient) -> Result<SplitCurve, StorageError> {
    fetch(client, &contracts::GOVERNANCE, &StorageKey::split_curve(), "splitCurve").await
}

pub async fn get_governance_view(client: &dyn NodeClient) -> Result<GovernanceView, StorageError> {
    governance_view_of(client, &contracts::GOVERNANCE).await
}

/// 主链节点池：先读取当前视图，再按视图编号定位节点池。
pub async fn get_peer_pool_map(client: &dyn NodeClient) -> Result<PeerPoolMap, StorageError> {
    let view = get_governance_view(client).await?.view;
    fetch(client, &contracts::GOVERNANCE, &StorageKey::peer_pool(view), "peerPool").await
}

pub async fn get_vote_info(
    client: &dyn NodeClient,
    peer_pubkey: &str,
    address: &Address,
) -> Result<VoteInfo, StorageError> {
    let key = StorageKey::vote_info(peer_pubkey, address)?;
    fetch(client, &contracts::GOVERNANCE, &key, "voteInfo").await
}

/// 节点是否在黑名单中。键不存在时返回 `false`。
pub async fn in_black_list(client: &dyn NodeClient, peer_pubkey: &str) -> Result<bool, StorageError> {
    let key = StorageKey::black_list(peer_pubkey)?;
    let value = client
        .get_storage(&contracts::GOVERNANCE, key.as_bytes())
        .await?;
    Ok(!value.is_empty())
}

pub async fn get_total_stake(
    client: &dyn NodeClient,
    address: &Address,
) -> Result<TotalStake, StorageError> {
    fetch(
        client,
        &contracts::GOVERNANCE,
        &StorageKey::total_stake(address),
        "totalStake",
    )
    .await
}

pub async fn get_penalty_stake(
    client: &dyn NodeClient,
    peer_pubkey: &str,
) -> Result<PenaltyStake, StorageError> {
    let key = StorageKey::penalty_stake(peer_pubkey)?;
    fetch(client, &contracts::GOVERNANCE, &key, "penaltyStake").await
}

/// 中继链节点管理合约的共识配置。
pub async fn get_node_config(client: &dyn NodeClient) -> Result<NodeConfiguration, StorageError> {
    fetch(
        client,
        &relay_contracts::NODE_MANAGER,
        &StorageKey::vbft_config(),
        "nodeConfiguration",
    )
    .await
}

pub async fn get_node_governance_view(
    client: &dyn NodeClient,
) -> Result<GovernanceView, StorageError> {
    governance_view_of(client, &relay_contracts::NODE_MANAGER).await
}

pub async fn get_node_peer_pool_map(
    client: &dyn NodeClient,
) -> Result<NodePeerPoolMap, StorageError> {
    let view = get_node_governance_view(client).await?.view;
    fetch(
        client,
        &relay_contracts::NODE_MANAGER,
        &StorageKey::peer_pool(view),
        "peerPool",
    )
    .await
}

async fn governance_view_of(
    client: &dyn NodeClient,
    contract: &Address,
) -> Result<GovernanceView, StorageError> {
    fetch(client, contract, &StorageKey::governance_view(), "governanceView").await
}
