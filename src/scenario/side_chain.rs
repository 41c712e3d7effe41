//! 中继链侧链治理场景，参数文件位于 `side_chain_params/`。

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use super::registry::{ScenarioRegistry, register_scenarios};
use super::ScenarioContext;
use crate::account::Address;
use crate::native::relay_contracts;
use crate::native::relayer::{self, ApproveRelayerParam, RelayerListParam};
use crate::native::side_chain::{
    ApproveSideChainParam, ChainIdParam, NodeConfiguration, PeerAddressParam, PeerListParam,
    RegisterSideChainParam, SyncGenesisHeaderParam, ccm, header_sync, node_manager,
    side_chain_manager,
};
use crate::native::SignerPolicy;
use crate::rpc::split_block_header;
use crate::storage;

pub(super) fn register(registry: &mut ScenarioRegistry) {
    register_scenarios!(registry, "side_chain", {
        "BlackChain" => black_chain: "委员会冻结侧链",
        "WhiteChain" => white_chain: "委员会解冻侧链",
        "SyncGenesisHeader" => sync_genesis_header: "同步侧链创世区块头",
        "RegisterSideChain" => register_side_chain: "申请注册侧链",
        "UpdateSideChain" => update_side_chain: "申请更新侧链信息",
        "ApproveRegisterSideChain" => approve_register_side_chain: "逐个账户审批侧链注册",
        "ApproveUpdateSideChain" => approve_update_side_chain: "逐个账户审批侧链更新",
        "RegisterCandidate" => register_candidate: "注册中继链候选节点",
        "UnRegisterCandidate" => unregister_candidate: "撤销候选节点注册",
        "QuitNode" => quit_node: "节点退出",
        "ApproveCandidate" => approve_candidate: "逐个账户审批候选节点",
        "RejectCandidate" => reject_candidate: "逐个账户拒绝候选节点",
        "BlackNode" => black_node: "逐个账户拉黑节点",
        "WhiteNode" => white_node: "逐个账户解除节点黑名单",
        "UpdateConfig" => update_config: "委员会更新共识配置",
        "CommitDpos" => commit_dpos: "委员会提交共识周期切换",
        "RegisterRelayer" => register_relayer: "申请注册 relayer",
        "RemoveRelayer" => remove_relayer: "申请移除 relayer",
        "ApproveRegisterRelayer" => approve_register_relayer: "逐个账户审批 relayer 注册",
        "ApproveRemoveRelayer" => approve_remove_relayer: "逐个账户审批 relayer 移除",
        "GetConfig" => get_config: "读取节点管理合约共识配置",
        "GetGovernanceView" => get_governance_view: "读取节点管理合约治理视图",
        "GetPeerPoolMap" => get_peer_pool_map: "读取当前视图的节点池",
    });
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ChainArgs {
    pub path: Vec<String>,
    #[serde(rename = "ChainID")]
    pub chain_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SyncGenesisHeaderArgs {
    pub path: Vec<String>,
    #[serde(rename = "ChainID")]
    pub chain_id: u64,
    pub chain_rpc: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SideChainArgs {
    pub path: String,
    pub chainid: u64,
    pub router: u64,
    pub name: String,
    pub blocks_to_wait: u64,
    #[serde(rename = "CCMCAddress")]
    pub ccmc_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ApproveSideChainArgs {
    pub path: Vec<String>,
    pub chainid: u64,
}

/// 单个账户操作一个节点。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PeerArgs {
    pub peer_pubkey: String,
    pub path: String,
}

/// 多个账户依次对同一节点操作。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PeerApprovalArgs {
    pub peer_pubkey: String,
    pub path: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PeerListArgs {
    pub peer_pubkey_list: Vec<String>,
    pub path: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ConfigurationArgs {
    pub block_msg_delay: u32,
    pub hash_msg_delay: u32,
    pub peer_handshake_timeout: u32,
    pub max_block_change_view: u32,
    pub path: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RelayerListArgs {
    pub address_list: Vec<String>,
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ApproveRelayerArgs {
    #[serde(rename = "ID")]
    pub id: u64,
    pub path: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CommitDposArgs {
    pub path: Vec<String>,
}

async fn black_chain(ctx: &ScenarioContext) -> Result<()> {
    chain_switch(ctx, "BlackChain", ccm::BLACK_CHAIN).await
}

async fn white_chain(ctx: &ScenarioContext) -> Result<()> {
    chain_switch(ctx, "WhiteChain", ccm::WHITE_CHAIN).await
}

async fn chain_switch(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: ChainArgs = ctx.side_chain_params(name)?;
    ctx.settle().await;
    let signers = ctx.accounts(&args.path)?;
    let param = ChainIdParam {
        chain_id: args.chain_id,
    };
    let hash = ctx
        .invoke(
            relay_contracts::CROSS_CHAIN_MANAGER,
            method,
            &[&param],
            SignerPolicy::Committee { signers: &signers },
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn sync_genesis_header(ctx: &ScenarioContext) -> Result<()> {
    let args: SyncGenesisHeaderArgs = ctx.side_chain_params("SyncGenesisHeader")?;
    ctx.settle().await;
    let signers = ctx.accounts(&args.path)?;

    let side_chain = ctx.side_chain_client(&args.chain_rpc)?;
    let genesis_block = side_chain
        .get_raw_block(0)
        .await
        .with_context(|| format!("获取侧链创世区块失败: {}", args.chain_rpc))?;
    let genesis_header = split_block_header(&genesis_block).context("解析侧链创世区块头失败")?;
    info!(
        target: "scenario",
        chain_id = args.chain_id,
        header_len = genesis_header.len(),
        "已获取侧链创世区块头"
    );

    let param = SyncGenesisHeaderParam {
        chain_id: args.chain_id,
        genesis_header,
    };
    let hash = ctx
        .invoke(
            relay_contracts::HEADER_SYNC,
            header_sync::SYNC_GENESIS_HEADER,
            &[&param],
            SignerPolicy::Committee { signers: &signers },
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn register_side_chain(ctx: &ScenarioContext) -> Result<()> {
    side_chain_request(ctx, "RegisterSideChain", side_chain_manager::REGISTER_SIDE_CHAIN).await
}

async fn update_side_chain(ctx: &ScenarioContext) -> Result<()> {
    side_chain_request(ctx, "UpdateSideChain", side_chain_manager::UPDATE_SIDE_CHAIN).await
}

async fn side_chain_request(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: SideChainArgs = ctx.side_chain_params(name)?;
    let user = ctx.account(&args.path)?;
    let ccm_contract = hex::decode(args.ccmc_address.trim())
        .with_context(|| format!("CCMCAddress 不是合法的十六进制: {}", args.ccmc_address))?;
    let param = RegisterSideChainParam {
        address: user.address(),
        chain_id: args.chainid,
        router: args.router,
        name: args.name,
        blocks_to_wait: args.blocks_to_wait,
        ccm_contract,
    };
    let hash = ctx
        .invoke(
            relay_contracts::SIDE_CHAIN_MANAGER,
            method,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn approve_register_side_chain(ctx: &ScenarioContext) -> Result<()> {
    side_chain_approval(
        ctx,
        "ApproveRegisterSideChain",
        side_chain_manager::APPROVE_REGISTER_SIDE_CHAIN,
    )
    .await
}

async fn approve_update_side_chain(ctx: &ScenarioContext) -> Result<()> {
    side_chain_approval(
        ctx,
        "ApproveUpdateSideChain",
        side_chain_manager::APPROVE_UPDATE_SIDE_CHAIN,
    )
    .await
}

async fn side_chain_approval(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: ApproveSideChainArgs = ctx.side_chain_params(name)?;
    ctx.settle().await;
    let approvers = ctx.accounts(&args.path)?;
    let hashes = ctx
        .invoke_each(
            &approvers,
            relay_contracts::SIDE_CHAIN_MANAGER,
            method,
            |address| ApproveSideChainParam {
                chain_id: args.chainid,
                address,
            },
        )
        .await?;
    ctx.confirm_all(&hashes).await
}

async fn register_candidate(ctx: &ScenarioContext) -> Result<()> {
    peer_request(ctx, "RegisterCandidate", node_manager::REGISTER_CANDIDATE).await
}

async fn unregister_candidate(ctx: &ScenarioContext) -> Result<()> {
    peer_request(ctx, "UnRegisterCandidate", node_manager::UNREGISTER_CANDIDATE).await
}

async fn quit_node(ctx: &ScenarioContext) -> Result<()> {
    peer_request(ctx, "QuitNode", node_manager::QUIT_NODE).await
}

async fn peer_request(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: PeerArgs = ctx.side_chain_params(name)?;
    let user = ctx.account(&args.path)?;
    let param = PeerAddressParam {
        peer_pubkey: args.peer_pubkey,
        address: user.address(),
    };
    let hash = ctx
        .invoke(
            relay_contracts::NODE_MANAGER,
            method,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn approve_candidate(ctx: &ScenarioContext) -> Result<()> {
    peer_approval(ctx, "ApproveCandidate", node_manager::APPROVE_CANDIDATE).await
}

async fn reject_candidate(ctx: &ScenarioContext) -> Result<()> {
    peer_approval(ctx, "RejectCandidate", node_manager::REJECT_CANDIDATE).await
}

async fn white_node(ctx: &ScenarioContext) -> Result<()> {
    peer_approval(ctx, "WhiteNode", node_manager::WHITE_NODE).await
}

async fn peer_approval(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: PeerApprovalArgs = ctx.side_chain_params(name)?;
    ctx.settle().await;
    let approvers = ctx.accounts(&args.path)?;
    let hashes = ctx
        .invoke_each(&approvers, relay_contracts::NODE_MANAGER, method, |address| {
            PeerAddressParam {
                peer_pubkey: args.peer_pubkey.clone(),
                address,
            }
        })
        .await?;
    ctx.confirm_all(&hashes).await
}

async fn black_node(ctx: &ScenarioContext) -> Result<()> {
    let args: PeerListArgs = ctx.side_chain_params("BlackNode")?;
    ctx.settle().await;
    let approvers = ctx.accounts(&args.path)?;
    let hashes = ctx
        .invoke_each(
            &approvers,
            relay_contracts::NODE_MANAGER,
            node_manager::BLACK_NODE,
            |address| PeerListParam {
                peer_pubkey_list: args.peer_pubkey_list.clone(),
                address,
            },
        )
        .await?;
    ctx.confirm_all(&hashes).await
}

async fn update_config(ctx: &ScenarioContext) -> Result<()> {
    let args: ConfigurationArgs = ctx.side_chain_params("UpdateConfig")?;
    ctx.settle().await;
    let signers = ctx.accounts(&args.path)?;
    let param = NodeConfiguration {
        block_msg_delay: args.block_msg_delay,
        hash_msg_delay: args.hash_msg_delay,
        peer_handshake_timeout: args.peer_handshake_timeout,
        max_block_change_view: args.max_block_change_view,
    };
    let hash = ctx
        .invoke(
            relay_contracts::NODE_MANAGER,
            node_manager::UPDATE_CONFIG,
            &[&param],
            SignerPolicy::Committee { signers: &signers },
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn commit_dpos(ctx: &ScenarioContext) -> Result<()> {
    let args: CommitDposArgs = ctx.side_chain_params("CommitDpos")?;
    ctx.settle().await;
    let signers = ctx.accounts(&args.path)?;
    let hash = ctx
        .invoke(
            relay_contracts::NODE_MANAGER,
            node_manager::COMMIT_DPOS,
            &[&()],
            SignerPolicy::Committee { signers: &signers },
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn register_relayer(ctx: &ScenarioContext) -> Result<()> {
    relayer_request(ctx, "RegisterRelayer", relayer::REGISTER_RELAYER).await
}

async fn remove_relayer(ctx: &ScenarioContext) -> Result<()> {
    relayer_request(ctx, "RemoveRelayer", relayer::REMOVE_RELAYER).await
}

async fn relayer_request(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: RelayerListArgs = ctx.side_chain_params(name)?;
    let address_list = args
        .address_list
        .iter()
        .map(|addr| {
            Address::from_base58(addr).with_context(|| format!("relayer 地址非法: {addr}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let user = ctx.account(&args.path)?;
    let param = RelayerListParam {
        address_list,
        address: user.address(),
    };
    let hash = ctx
        .invoke(
            relay_contracts::RELAYER_MANAGER,
            method,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn approve_register_relayer(ctx: &ScenarioContext) -> Result<()> {
    relayer_approval(ctx, "ApproveRegisterRelayer", relayer::APPROVE_REGISTER_RELAYER).await
}

async fn approve_remove_relayer(ctx: &ScenarioContext) -> Result<()> {
    relayer_approval(ctx, "ApproveRemoveRelayer", relayer::APPROVE_REMOVE_RELAYER).await
}

async fn relayer_approval(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: ApproveRelayerArgs = ctx.side_chain_params(name)?;
    ctx.settle().await;
    let approvers = ctx.accounts(&args.path)?;
    let hashes = ctx
        .invoke_each(&approvers, relay_contracts::RELAYER_MANAGER, method, |address| {
            ApproveRelayerParam { id: args.id, address }
        })
        .await?;
    ctx.confirm_all(&hashes).await
}

async fn get_config(ctx: &ScenarioContext) -> Result<()> {
    let config = storage::get_node_config(ctx.client()).await?;
    info!(
        target: "scenario",
        block_msg_delay = config.block_msg_delay,
        hash_msg_delay = config.hash_msg_delay,
        peer_handshake_timeout = config.peer_handshake_timeout,
        max_block_change_view = config.max_block_change_view,
        "节点管理合约共识配置"
    );
    Ok(())
}

async fn get_governance_view(ctx: &ScenarioContext) -> Result<()> {
    let view = storage::get_node_governance_view(ctx.client()).await?;
    info!(
        target: "scenario",
        view = view.view,
        height = view.height,
        tx_hash = %view.tx_hash,
        "节点管理合约治理视图"
    );
    Ok(())
}

async fn get_peer_pool_map(ctx: &ScenarioContext) -> Result<()> {
    let pool = storage::get_node_peer_pool_map(ctx.client()).await?;
    info!(target: "scenario", peers = pool.items.len(), "节点池");
    for item in &pool.items {
        info!(
            target: "scenario",
            index = item.index,
            peer_pubkey = %item.peer_pubkey,
            address = %item.address,
            status = %item.status,
            "节点"
        );
    }
    Ok(())
}
