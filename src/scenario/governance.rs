//! 主链治理、资产多签转账与 ONT ID 授权场景，参数文件位于 `governance_params/`。
//!
//! 带 `Signers` 的参数文件可通过 `Committee` 选择逐账户单签或委员会多签。

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::info;

use super::context::Signers;
use super::registry::{ScenarioRegistry, register_scenarios};
use super::ScenarioContext;
use crate::account::Address;
use crate::codec::Encode;
use crate::native::asset::{self, TransferFrom, Transfers};
use crate::native::governance::{
    self, BlackNodeParam, DEFAULT_KEY_NO, GlobalParam, PeerAddressParam, PeerParam,
    PeerPosListParam, RegisterCandidateParam, SplitCurve, VbftConfig, WithdrawOngParam,
};
use crate::native::identity::{
    self, CANDIDATE_OWNER_ROLE, FuncsToRoleParam, OntIdsToRoleParam, RegIdWithPublicKeyParam,
    VerifyTokenParam,
};
use crate::native::{SignerPolicy, contracts, ont_id_of};
use crate::storage;
use crate::transaction::TxHash;

pub(super) fn register(registry: &mut ScenarioRegistry) {
    register_scenarios!(registry, "governance", {
        "GovRegisterCandidate" => register_candidate: "注册候选节点",
        "GovRegisterCandidateMultiSign" => register_candidate_multi_sign: "以多签地址注册候选节点",
        "GovUnRegisterCandidate" => unregister_candidate: "撤销候选节点注册",
        "GovApproveCandidate" => approve_candidate: "审批候选节点",
        "GovRejectCandidate" => reject_candidate: "拒绝候选节点",
        "GovVoteForPeer" => vote_for_peer: "为节点投票",
        "GovUnVoteForPeer" => unvote_for_peer: "撤销投票",
        "GovWithdraw" => withdraw: "提取已解冻的质押",
        "GovWithdrawOng" => withdraw_ong: "提取 ONG",
        "GovCommitDpos" => commit_dpos: "提交共识周期切换",
        "GovQuitNode" => quit_node: "节点退出",
        "GovBlackNode" => black_node: "拉黑节点",
        "GovWhiteNode" => white_node: "解除节点黑名单",
        "GovUpdateConfig" => update_config: "更新共识配置",
        "GovUpdateGlobalParam" => update_global_param: "更新全局参数",
        "GovUpdateSplitCurve" => update_split_curve: "更新分润曲线",
        "GovCallSplit" => call_split: "触发手续费分润",
        "GovTransferPenalty" => transfer_penalty: "转出节点罚没质押",
        "MultiTransfer" => multi_transfer: "多个账户一笔交易转账",
        "TransferOntMultiSign" => transfer_ont_multi_sign: "多签地址转出 ONT",
        "TransferOngMultiSign" => transfer_ong_multi_sign: "多签地址转出 ONG",
        "TransferFromOngMultiSign" => transfer_from_ong_multi_sign: "多签地址提取 ONG 授权额度",
        "AssignFuncsToRole" => assign_funcs_to_role: "为治理合约角色分配方法",
        "AssignOntIDsToRole" => assign_ont_ids_to_role: "为角色分配 ONT ID",
        "VerifyToken" => verify_token: "校验调用权限",
        "RegIdWithPublicKey" => reg_id_with_public_key: "以公钥注册 ONT ID",
        "GovGetVbftConfig" => get_vbft_config: "读取共识配置",
        "GovGetGlobalParam" => get_global_param: "读取全局参数",
        "GovGetSplitCurve" => get_split_curve: "读取分润曲线",
        "GovGetPeerPoolMap" => get_peer_pool_map: "读取当前视图的节点池",
        "GovGetVoteInfo" => get_vote_info: "读取投票信息",
        "GovInBlackList" => in_black_list: "查询节点是否被拉黑",
        "GovGetTotalStake" => get_total_stake: "读取账户总质押",
        "GovGetPenaltyStake" => get_penalty_stake: "读取节点罚没质押",
    });
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RegisterCandidateArgs {
    pub path: String,
    pub peer_pubkey: String,
    pub init_pos: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RegisterCandidateMultiSignArgs {
    pub peer_pubkey: String,
    pub init_pos: u32,
    #[serde(flatten)]
    pub signers: Signers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PeerArgs {
    pub path: String,
    pub peer_pubkey: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignedPeerArgs {
    pub peer_pubkey: String,
    #[serde(flatten)]
    pub signers: Signers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignedPeerListArgs {
    pub peer_pubkey_list: Vec<String>,
    #[serde(flatten)]
    pub signers: Signers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct VoteArgs {
    pub path: String,
    pub peer_pubkey_list: Vec<String>,
    pub pos_list: Vec<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WithdrawArgs {
    pub path: String,
    pub peer_pubkey_list: Vec<String>,
    pub withdraw_list: Vec<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PathArgs {
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct VbftConfigArgs {
    pub n: u32,
    pub c: u32,
    pub k: u32,
    pub l: u32,
    pub block_msg_delay: u32,
    pub hash_msg_delay: u32,
    pub peer_handshake_timeout: u32,
    pub max_block_change_view: u32,
    #[serde(flatten)]
    pub signers: Signers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GlobalParamArgs {
    pub candidate_fee: u64,
    pub min_init_stake: u32,
    pub candidate_num: u32,
    pub pos_limit: u32,
    pub a: u32,
    pub b: u32,
    pub yita: u32,
    pub penalty: u32,
    #[serde(flatten)]
    pub signers: Signers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SplitCurveArgs {
    pub yi: Vec<u32>,
    #[serde(flatten)]
    pub signers: Signers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TransferPenaltyArgs {
    pub peer_pubkey: String,
    pub address: String,
    #[serde(flatten)]
    pub signers: Signers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Asset {
    Ont,
    Ong,
}

impl Asset {
    fn contract(self) -> Address {
        match self {
            Asset::Ont => contracts::ONT,
            Asset::Ong => contracts::ONG,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct MultiTransferArgs {
    pub asset: Asset,
    pub path: Vec<String>,
    pub to: Vec<String>,
    pub amount: Vec<u64>,
}

/// 多签地址转出：`Signers` 中的账户总是以委员会方式签名。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct MultiSignTransferArgs {
    pub address: String,
    pub amount: u64,
    #[serde(flatten)]
    pub signers: Signers,
}

fn default_func_names() -> Vec<String> {
    vec![governance::REGISTER_CANDIDATE.to_string()]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AssignFuncsArgs {
    pub path: String,
    #[serde(default = "default_func_names")]
    pub func_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AssignOntIdsArgs {
    pub path: String,
    #[serde(rename = "OntIDs")]
    pub ont_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct VerifyTokenArgs {
    pub path: String,
    pub caller: String,
    #[serde(rename = "Fn")]
    pub func_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PeerQueryArgs {
    pub peer_pubkey: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct VoteInfoArgs {
    pub peer_pubkey: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AddressArgs {
    pub address: String,
}

fn parse_address(encoded: &str) -> Result<Address> {
    Address::from_base58(encoded).with_context(|| format!("地址非法: {encoded}"))
}

/// 按 `Signers` 提交治理交易。
///
/// `build` 的两个参数依次为所有者地址与调用者地址：逐账户单签时均为该账户地址，
/// 委员会多签时所有者为多签地址，调用者为提交者（无提交者时同为多签地址）。
async fn submit_governance<P, F>(
    ctx: &ScenarioContext,
    signers: &Signers,
    method: &str,
    build: F,
) -> Result<()>
where
    P: Encode + Send + Sync,
    F: Fn(Address, Address) -> P + Send + Sync,
{
    ctx.settle().await;
    let hashes: Vec<TxHash> = if signers.committee {
        let committee = ctx.committee(signers)?;
        let param = build(committee.address, committee.caller());
        let hash = ctx
            .invoke_committee(&committee, contracts::GOVERNANCE, method, &[&param])
            .await?;
        vec![hash]
    } else {
        let accounts = ctx.accounts(&signers.path)?;
        ctx.invoke_each(&accounts, contracts::GOVERNANCE, method, |address| {
            build(address, address)
        })
        .await?
    };
    ctx.confirm_all(&hashes).await
}

async fn register_candidate(ctx: &ScenarioContext) -> Result<()> {
    let args: RegisterCandidateArgs = ctx.governance_params("GovRegisterCandidate")?;
    let user = ctx.account(&args.path)?;
    let param = RegisterCandidateParam {
        peer_pubkey: args.peer_pubkey,
        address: user.address(),
        init_pos: args.init_pos,
        caller: ont_id_of(&user.address()),
        key_no: DEFAULT_KEY_NO,
    };
    let hash = ctx
        .invoke(
            contracts::GOVERNANCE,
            governance::REGISTER_CANDIDATE,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn register_candidate_multi_sign(ctx: &ScenarioContext) -> Result<()> {
    let args: RegisterCandidateMultiSignArgs =
        ctx.governance_params("GovRegisterCandidateMultiSign")?;
    ctx.settle().await;
    let committee = ctx.committee(&args.signers)?;
    let Some(submitter) = committee.submitter.as_ref() else {
        bail!("GovRegisterCandidateMultiSign 需要 Submitter 作为调用者");
    };
    let param = RegisterCandidateParam {
        peer_pubkey: args.peer_pubkey,
        address: committee.address,
        init_pos: args.init_pos,
        caller: ont_id_of(&submitter.address()),
        key_no: DEFAULT_KEY_NO,
    };
    let hash = ctx
        .invoke_committee(
            &committee,
            contracts::GOVERNANCE,
            governance::REGISTER_CANDIDATE,
            &[&param],
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn unregister_candidate(ctx: &ScenarioContext) -> Result<()> {
    peer_owner_request(ctx, "GovUnRegisterCandidate", governance::UNREGISTER_CANDIDATE).await
}

async fn quit_node(ctx: &ScenarioContext) -> Result<()> {
    peer_owner_request(ctx, "GovQuitNode", governance::QUIT_NODE).await
}

async fn peer_owner_request(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: PeerArgs = ctx.governance_params(name)?;
    let user = ctx.account(&args.path)?;
    let param = PeerAddressParam {
        peer_pubkey: args.peer_pubkey,
        address: user.address(),
    };
    let hash = ctx
        .invoke(contracts::GOVERNANCE, method, &[&param], SignerPolicy::Single(&user))
        .await?;
    ctx.confirm(&hash).await
}

async fn approve_candidate(ctx: &ScenarioContext) -> Result<()> {
    signed_peer(ctx, "GovApproveCandidate", governance::APPROVE_CANDIDATE).await
}

async fn reject_candidate(ctx: &ScenarioContext) -> Result<()> {
    signed_peer(ctx, "GovRejectCandidate", governance::REJECT_CANDIDATE).await
}

async fn white_node(ctx: &ScenarioContext) -> Result<()> {
    signed_peer(ctx, "GovWhiteNode", governance::WHITE_NODE).await
}

async fn signed_peer(ctx: &ScenarioContext, name: &str, method: &str) -> Result<()> {
    let args: SignedPeerArgs = ctx.governance_params(name)?;
    submit_governance(ctx, &args.signers, method, |_, _| PeerParam {
        peer_pubkey: args.peer_pubkey.clone(),
    })
    .await
}

async fn vote_for_peer(ctx: &ScenarioContext) -> Result<()> {
    let args: VoteArgs = ctx.governance_params("GovVoteForPeer")?;
    peer_pos_request(ctx, governance::VOTE_FOR_PEER, args.path, args.peer_pubkey_list, args.pos_list)
        .await
}

async fn unvote_for_peer(ctx: &ScenarioContext) -> Result<()> {
    let args: VoteArgs = ctx.governance_params("GovUnVoteForPeer")?;
    peer_pos_request(
        ctx,
        governance::UNVOTE_FOR_PEER,
        args.path,
        args.peer_pubkey_list,
        args.pos_list,
    )
    .await
}

async fn withdraw(ctx: &ScenarioContext) -> Result<()> {
    let args: WithdrawArgs = ctx.governance_params("GovWithdraw")?;
    peer_pos_request(
        ctx,
        governance::WITHDRAW,
        args.path,
        args.peer_pubkey_list,
        args.withdraw_list,
    )
    .await
}

async fn peer_pos_request(
    ctx: &ScenarioContext,
    method: &str,
    path: String,
    peer_pubkey_list: Vec<String>,
    pos_list: Vec<u32>,
) -> Result<()> {
    if peer_pubkey_list.len() != pos_list.len() {
        bail!(
            "节点公钥数量 {} 与数量列表长度 {} 不一致",
            peer_pubkey_list.len(),
            pos_list.len()
        );
    }
    let user = ctx.account(&path)?;
    let param = PeerPosListParam {
        address: user.address(),
        peer_pubkey_list,
        pos_list,
    };
    let hash = ctx
        .invoke(contracts::GOVERNANCE, method, &[&param], SignerPolicy::Single(&user))
        .await?;
    ctx.confirm(&hash).await
}

async fn withdraw_ong(ctx: &ScenarioContext) -> Result<()> {
    let args: PathArgs = ctx.governance_params("GovWithdrawOng")?;
    let user = ctx.account(&args.path)?;
    let param = WithdrawOngParam {
        address: user.address(),
    };
    let hash = ctx
        .invoke(
            contracts::GOVERNANCE,
            governance::WITHDRAW_ONG,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn commit_dpos(ctx: &ScenarioContext) -> Result<()> {
    let signers: Signers = ctx.governance_params("GovCommitDpos")?;
    submit_governance(ctx, &signers, governance::COMMIT_DPOS, |_, _| ()).await
}

async fn call_split(ctx: &ScenarioContext) -> Result<()> {
    let signers: Signers = ctx.governance_params("GovCallSplit")?;
    submit_governance(ctx, &signers, governance::CALL_SPLIT, |_, _| ()).await
}

async fn black_node(ctx: &ScenarioContext) -> Result<()> {
    let args: SignedPeerListArgs = ctx.governance_params("GovBlackNode")?;
    submit_governance(ctx, &args.signers, governance::BLACK_NODE, |_, _| BlackNodeParam {
        peer_pubkey_list: args.peer_pubkey_list.clone(),
    })
    .await
}

async fn update_config(ctx: &ScenarioContext) -> Result<()> {
    let args: VbftConfigArgs = ctx.governance_params("GovUpdateConfig")?;
    let config = VbftConfig {
        n: args.n,
        c: args.c,
        k: args.k,
        l: args.l,
        block_msg_delay: args.block_msg_delay,
        hash_msg_delay: args.hash_msg_delay,
        peer_handshake_timeout: args.peer_handshake_timeout,
        max_block_change_view: args.max_block_change_view,
    };
    submit_governance(ctx, &args.signers, governance::UPDATE_CONFIG, |_, _| config).await
}

async fn update_global_param(ctx: &ScenarioContext) -> Result<()> {
    let args: GlobalParamArgs = ctx.governance_params("GovUpdateGlobalParam")?;
    let param = GlobalParam {
        candidate_fee: args.candidate_fee,
        min_init_stake: args.min_init_stake,
        candidate_num: args.candidate_num,
        pos_limit: args.pos_limit,
        a: args.a,
        b: args.b,
        yita: args.yita,
        penalty: args.penalty,
    };
    submit_governance(ctx, &args.signers, governance::UPDATE_GLOBAL_PARAM, |_, _| {
        param
    })
    .await
}

async fn update_split_curve(ctx: &ScenarioContext) -> Result<()> {
    let args: SplitCurveArgs = ctx.governance_params("GovUpdateSplitCurve")?;
    submit_governance(ctx, &args.signers, governance::UPDATE_SPLIT_CURVE, |_, _| {
        SplitCurve {
            yi: args.yi.clone(),
        }
    })
    .await
}

async fn transfer_penalty(ctx: &ScenarioContext) -> Result<()> {
    let args: TransferPenaltyArgs = ctx.governance_params("GovTransferPenalty")?;
    let address = parse_address(&args.address)?;
    submit_governance(ctx, &args.signers, governance::TRANSFER_PENALTY, |_, _| {
        PeerAddressParam {
            peer_pubkey: args.peer_pubkey.clone(),
            address,
        }
    })
    .await
}

async fn multi_transfer(ctx: &ScenarioContext) -> Result<()> {
    let args: MultiTransferArgs = ctx.governance_params("MultiTransfer")?;
    ctx.settle().await;
    let senders = ctx.accounts(&args.path)?;
    let from: Vec<Address> = senders.iter().map(|a| a.address()).collect();
    let to = args
        .to
        .iter()
        .map(|addr| parse_address(addr))
        .collect::<Result<Vec<_>>>()?;
    let transfers = Transfers::zip(&from, &to, &args.amount)?;
    let hash = ctx
        .invoke(
            args.asset.contract(),
            asset::TRANSFER,
            &[&transfers],
            SignerPolicy::EachSigns { signers: &senders },
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn transfer_ont_multi_sign(ctx: &ScenarioContext) -> Result<()> {
    multi_sign_transfer(ctx, "TransferOntMultiSign", Asset::Ont).await
}

async fn transfer_ong_multi_sign(ctx: &ScenarioContext) -> Result<()> {
    multi_sign_transfer(ctx, "TransferOngMultiSign", Asset::Ong).await
}

async fn multi_sign_transfer(ctx: &ScenarioContext, name: &str, kind: Asset) -> Result<()> {
    let args: MultiSignTransferArgs = ctx.governance_params(name)?;
    let to = parse_address(&args.address)?;
    ctx.settle().await;
    let committee = ctx.committee(&args.signers)?;
    let transfers = Transfers::single(committee.address, to, args.amount);
    info!(
        target: "scenario",
        from = %committee.address,
        to = %to,
        amount = args.amount,
        "多签地址转账"
    );
    let hash = ctx
        .invoke_committee(&committee, kind.contract(), asset::TRANSFER, &[&transfers])
        .await?;
    ctx.confirm(&hash).await
}

async fn transfer_from_ong_multi_sign(ctx: &ScenarioContext) -> Result<()> {
    let args: MultiSignTransferArgs = ctx.governance_params("TransferFromOngMultiSign")?;
    let to = parse_address(&args.address)?;
    ctx.settle().await;
    let committee = ctx.committee(&args.signers)?;
    let param = TransferFrom {
        sender: committee.address,
        from: contracts::ONT,
        to,
        value: args.amount,
    };
    let hash = ctx
        .invoke_committee(&committee, contracts::ONG, asset::TRANSFER_FROM, &[&param])
        .await?;
    ctx.confirm(&hash).await
}

async fn assign_funcs_to_role(ctx: &ScenarioContext) -> Result<()> {
    let args: AssignFuncsArgs = ctx.governance_params("AssignFuncsToRole")?;
    let user = ctx.account(&args.path)?;
    let param = FuncsToRoleParam {
        contract_addr: contracts::GOVERNANCE,
        admin_ont_id: ont_id_of(&user.address()),
        role: CANDIDATE_OWNER_ROLE.as_bytes().to_vec(),
        func_names: args.func_names,
        key_no: u64::from(DEFAULT_KEY_NO),
    };
    let hash = ctx
        .invoke(
            contracts::AUTH,
            identity::ASSIGN_FUNCS_TO_ROLE,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn assign_ont_ids_to_role(ctx: &ScenarioContext) -> Result<()> {
    let args: AssignOntIdsArgs = ctx.governance_params("AssignOntIDsToRole")?;
    let user = ctx.account(&args.path)?;
    let param = OntIdsToRoleParam {
        contract_addr: contracts::GOVERNANCE,
        admin_ont_id: ont_id_of(&user.address()),
        role: CANDIDATE_OWNER_ROLE.as_bytes().to_vec(),
        persons: args.ont_ids.into_iter().map(String::into_bytes).collect(),
        key_no: u64::from(DEFAULT_KEY_NO),
    };
    let hash = ctx
        .invoke(
            contracts::AUTH,
            identity::ASSIGN_ONT_IDS_TO_ROLE,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn verify_token(ctx: &ScenarioContext) -> Result<()> {
    let args: VerifyTokenArgs = ctx.governance_params("VerifyToken")?;
    let user = ctx.account(&args.path)?;
    let param = VerifyTokenParam {
        contract_addr: contracts::GOVERNANCE,
        caller: args.caller.into_bytes(),
        func_name: args.func_name,
        key_no: u64::from(DEFAULT_KEY_NO),
    };
    let hash = ctx
        .invoke(
            contracts::AUTH,
            identity::VERIFY_TOKEN,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn reg_id_with_public_key(ctx: &ScenarioContext) -> Result<()> {
    let args: PathArgs = ctx.governance_params("RegIdWithPublicKey")?;
    let user = ctx.account(&args.path)?;
    let param = RegIdWithPublicKeyParam {
        ont_id: ont_id_of(&user.address()),
        pubkey: user.public_key().to_bytes(),
    };
    let hash = ctx
        .invoke(
            contracts::ONT_ID,
            identity::REG_ID_WITH_PUBLIC_KEY,
            &[&param],
            SignerPolicy::Single(&user),
        )
        .await?;
    ctx.confirm(&hash).await
}

async fn get_vbft_config(ctx: &ScenarioContext) -> Result<()> {
    let config = storage::get_vbft_config(ctx.client()).await?;
    info!(target: "scenario", ?config, "共识配置");
    Ok(())
}

async fn get_global_param(ctx: &ScenarioContext) -> Result<()> {
    let param = storage::get_global_param(ctx.client()).await?;
    info!(target: "scenario", ?param, "全局参数");
    Ok(())
}

async fn get_split_curve(ctx: &ScenarioContext) -> Result<()> {
    let curve = storage::get_split_curve(ctx.client()).await?;
    info!(target: "scenario", points = curve.yi.len(), yi = ?curve.yi, "分润曲线");
    Ok(())
}

async fn get_peer_pool_map(ctx: &ScenarioContext) -> Result<()> {
    let pool = storage::get_peer_pool_map(ctx.client()).await?;
    info!(target: "scenario", peers = pool.items.len(), "节点池");
    for item in &pool.items {
        info!(
            target: "scenario",
            index = item.index,
            peer_pubkey = %item.peer_pubkey,
            address = %item.address,
            status = %item.status,
            init_pos = item.init_pos,
            total_pos = item.total_pos,
            "节点"
        );
    }
    Ok(())
}

async fn get_vote_info(ctx: &ScenarioContext) -> Result<()> {
    let args: VoteInfoArgs = ctx.governance_params("GovGetVoteInfo")?;
    let address = parse_address(&args.address)?;
    let info = storage::get_vote_info(ctx.client(), &args.peer_pubkey, &address).await?;
    info!(target: "scenario", ?info, "投票信息");
    Ok(())
}

async fn in_black_list(ctx: &ScenarioContext) -> Result<()> {
    let args: PeerQueryArgs = ctx.governance_params("GovInBlackList")?;
    let listed = storage::in_black_list(ctx.client(), &args.peer_pubkey).await?;
    info!(target: "scenario", peer_pubkey = %args.peer_pubkey, listed, "黑名单查询");
    Ok(())
}

async fn get_total_stake(ctx: &ScenarioContext) -> Result<()> {
    let args: AddressArgs = ctx.governance_params("GovGetTotalStake")?;
    let address = parse_address(&args.address)?;
    let stake = storage::get_total_stake(ctx.client(), &address).await?;
    info!(target: "scenario", ?stake, "总质押");
    Ok(())
}

async fn get_penalty_stake(ctx: &ScenarioContext) -> Result<()> {
    let args: PeerQueryArgs = ctx.governance_params("GovGetPenaltyStake")?;
    let stake = storage::get_penalty_stake(ctx.client(), &args.peer_pubkey).await?;
    info!(target: "scenario", ?stake, "罚没质押");
    Ok(())
}
