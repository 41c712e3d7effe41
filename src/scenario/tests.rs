use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use super::governance::{Asset, MultiTransferArgs, RegisterCandidateMultiSignArgs};
use super::side_chain::{ApproveRelayerArgs, SideChainArgs};
use super::*;
use crate::account::{Account, Address, PublicKey};
use crate::codec::to_bytes;
use crate::config::AppConfig;
use crate::native::governance::RegisterCandidateParam;
use crate::native::side_chain::SyncGenesisHeaderParam;
use crate::native::{contracts, ont_id_of, relay_contracts};
use crate::rpc::block::tests::sample_header;
use crate::rpc::mock::MockNode;
use crate::wallet::tests::write_keystore;

const PASSWORD: &str = "passw0rd";
const PEER: &str = "1419aabbccdd";
const SIDE_CHAIN_RPC: &str = "http://side-chain:20336";

struct Harness {
    dir: TempDir,
    node: Arc<MockNode>,
    config: AppConfig,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.wallet.password = Some(PASSWORD.to_string());
        config.params.side_chain_dir = dir.path().join("side_chain_params").display().to_string();
        config.params.governance_dir = dir.path().join("governance_params").display().to_string();
        config.settle_delay_ms = 0;
        config.confirmation.timeout_ms = 100;
        config.confirmation.initial_interval_ms = 5;
        config.confirmation.max_interval_ms = 20;
        fs::create_dir_all(dir.path().join("side_chain_params")).unwrap();
        fs::create_dir_all(dir.path().join("governance_params")).unwrap();
        Self {
            dir,
            node: Arc::new(MockNode::new()),
            config,
        }
    }

    fn context(&self) -> ScenarioContext {
        ScenarioContext::new(self.node.clone(), &self.config)
    }

    /// 以种子生成账户并写出钱包文件，返回账户与文件路径。
    fn wallet(&self, seed: u8) -> (Account, String) {
        let account = Account::from_secret_bytes([seed; 32]);
        let path = write_keystore(self.dir.path(), &format!("wallet{seed}"), &account, PASSWORD);
        (account, path.display().to_string())
    }

    fn governance_params(&self, name: &str, value: serde_json::Value) {
        write_json(PathBuf::from(&self.config.params.governance_dir).join(format!("{name}.json")), value);
    }

    fn side_chain_params(&self, name: &str, value: serde_json::Value) {
        write_json(PathBuf::from(&self.config.params.side_chain_dir).join(format!("{name}.json")), value);
    }
}

fn write_json(path: PathBuf, value: serde_json::Value) {
    fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

#[test]
fn standard_registry_lists_every_scenario() {
    let registry = ScenarioRegistry::standard();
    assert_eq!(registry.len(), 57);
    assert_eq!(registry.iter().filter(|s| s.group == "side_chain").count(), 23);
    assert_eq!(registry.iter().filter(|s| s.group == "governance").count(), 34);
    assert!(registry.get("SyncGenesisHeader").is_some());
    assert!(registry.get("GovRegisterCandidateMultiSign").is_some());

    let names: Vec<&str> = registry.iter().map(|s| s.name).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn unknown_scenario_fails() {
    let harness = Harness::new();
    let registry = ScenarioRegistry::standard();
    assert!(!registry.run("NoSuchScenario", &harness.context()).await);
}

#[tokio::test]
async fn missing_parameter_file_fails_without_submitting() {
    let harness = Harness::new();
    let registry = ScenarioRegistry::standard();
    assert!(!registry.run("BlackChain", &harness.context()).await);
    assert!(harness.node.submitted().is_empty());
}

#[tokio::test]
async fn register_candidate_single_signer_end_to_end() {
    let harness = Harness::new();
    let (user, path) = harness.wallet(1);
    harness.governance_params(
        "GovRegisterCandidate",
        json!({ "Path": path, "PeerPubkey": PEER, "InitPos": 1000 }),
    );

    let registry = ScenarioRegistry::standard();
    assert!(registry.run("GovRegisterCandidate", &harness.context()).await);

    let submitted = harness.node.submitted();
    assert_eq!(submitted.len(), 1);
    let tx = &submitted[0];
    assert_eq!(tx.payer(), user.address());
    assert_eq!(tx.payload().contract, contracts::GOVERNANCE);
    assert_eq!(tx.payload().method, "registerCandidate");
    let expected = RegisterCandidateParam {
        peer_pubkey: PEER.to_string(),
        address: user.address(),
        init_pos: 1000,
        caller: ont_id_of(&user.address()),
        key_no: 1,
    };
    assert_eq!(tx.payload().args, to_bytes(&expected));
    assert_ne!(tx.hash().to_hex_string(), "0".repeat(64));
}

fn committee_params(harness: &Harness, signing: usize) -> (Vec<PublicKey>, Account) {
    let seeds: Vec<u8> = (1..=signing as u8).collect();
    committee_params_with(harness, &seeds, |_| {})
}

/// 7 人委员会，`signing` 为按顺序签名的成员种子，`reorder` 可调整声明的公钥顺序。
fn committee_params_with(
    harness: &Harness,
    signing: &[u8],
    reorder: impl FnOnce(&mut Vec<PublicKey>),
) -> (Vec<PublicKey>, Account) {
    let members: Vec<(Account, String)> = (1..=7).map(|seed| harness.wallet(seed)).collect();
    let pubkeys: Vec<PublicKey> = members.iter().map(|(a, _)| a.public_key().clone()).collect();
    let (submitter, submitter_path) = harness.wallet(20);
    let paths: Vec<&String> = signing
        .iter()
        .map(|seed| &members[usize::from(*seed) - 1].1)
        .collect();
    let mut declared = pubkeys.clone();
    reorder(&mut declared);
    harness.governance_params(
        "GovRegisterCandidateMultiSign",
        json!({
            "PeerPubkey": PEER,
            "InitPos": 5000,
            "Path": paths,
            "Committee": true,
            "PubKeys": declared.iter().map(PublicKey::to_hex).collect::<Vec<_>>(),
            "Submitter": submitter_path,
        }),
    );
    (pubkeys, submitter)
}

#[tokio::test]
async fn seven_key_committee_needs_five_signatures() {
    let harness = Harness::new();
    let (pubkeys, submitter) = committee_params(&harness, 5);
    let aggregate = Address::from_multi_public_keys(&pubkeys, 5).unwrap();
    harness
        .node
        .require_witness(contracts::GOVERNANCE, "registerCandidate", aggregate);

    let registry = ScenarioRegistry::standard();
    assert!(
        registry
            .run("GovRegisterCandidateMultiSign", &harness.context())
            .await
    );

    let submitted = harness.node.submitted();
    assert_eq!(submitted.len(), 1);
    let tx = &submitted[0];
    assert_eq!(tx.payer(), aggregate);
    assert_eq!(tx.sigs().len(), 2);
    assert_eq!(tx.sigs()[0].m, 5);
    assert_eq!(tx.sigs()[0].sig_data.len(), 5);
    assert_eq!(
        tx.signer_addresses().unwrap(),
        vec![aggregate, submitter.address()]
    );

    committee_params(&harness, 4);
    assert!(
        !registry
            .run("GovRegisterCandidateMultiSign", &harness.context())
            .await
    );
    assert_eq!(harness.node.submitted().len(), 1);
}

#[tokio::test]
async fn full_committee_signs_beyond_threshold() {
    let harness = Harness::new();
    let (pubkeys, submitter) = committee_params(&harness, 7);
    let aggregate = Address::from_multi_public_keys(&pubkeys, 5).unwrap();
    harness
        .node
        .require_witness(contracts::GOVERNANCE, "registerCandidate", aggregate);

    let registry = ScenarioRegistry::standard();
    assert!(
        registry
            .run("GovRegisterCandidateMultiSign", &harness.context())
            .await
    );

    let submitted = harness.node.submitted();
    let tx = &submitted[0];
    assert_eq!(tx.sigs()[0].sig_data.len(), 7);
    assert_eq!(
        tx.signer_addresses().unwrap(),
        vec![aggregate, submitter.address()]
    );
}

#[tokio::test]
async fn repeated_committee_path_counts_once() {
    let harness = Harness::new();
    // 成员 1 出现两次，实际只有 4 个不同签名者
    committee_params_with(&harness, &[1, 1, 2, 3, 4], |_| {});

    let registry = ScenarioRegistry::standard();
    assert!(
        !registry
            .run("GovRegisterCandidateMultiSign", &harness.context())
            .await
    );
    assert!(harness.node.submitted().is_empty());

    committee_params_with(&harness, &[1, 1, 2, 3, 4, 5], |_| {});
    assert!(
        registry
            .run("GovRegisterCandidateMultiSign", &harness.context())
            .await
    );
    let submitted = harness.node.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].sigs()[0].sig_data.len(), 5);
}

#[tokio::test]
async fn shuffled_pubkey_list_is_rejected() {
    let harness = Harness::new();
    let (pubkeys, _) = committee_params_with(&harness, &[1, 2, 3, 4, 5, 6, 7], |keys| {
        keys.swap(0, 6)
    });
    let aggregate = Address::from_multi_public_keys(&pubkeys, 5).unwrap();
    harness
        .node
        .require_witness(contracts::GOVERNANCE, "registerCandidate", aggregate);

    let registry = ScenarioRegistry::standard();
    assert!(
        !registry
            .run("GovRegisterCandidateMultiSign", &harness.context())
            .await
    );
    assert!(harness.node.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn governance_flows_wait_for_settle_delay() {
    let mut harness = Harness::new();
    harness.config.settle_delay_ms = 1_500;
    let (_, path) = harness.wallet(8);
    harness.governance_params("GovCommitDpos", json!({ "Path": [path.clone()] }));
    let to = Account::from_secret_bytes([9u8; 32]).address().to_base58();
    harness.governance_params(
        "MultiTransfer",
        json!({ "Asset": "ong", "Path": [path], "To": [to], "Amount": [1] }),
    );
    committee_params(&harness, 5);

    let registry = ScenarioRegistry::standard();
    let ctx = harness.context();
    for name in ["GovCommitDpos", "MultiTransfer", "GovRegisterCandidateMultiSign"] {
        let started = tokio::time::Instant::now();
        assert!(registry.run(name, &ctx).await, "{name}");
        assert!(
            started.elapsed() >= Duration::from_millis(1_500),
            "{name} 未等待 settle_delay"
        );
    }
    assert_eq!(harness.node.submitted().len(), 3);
}

#[tokio::test]
async fn sync_genesis_header_reads_side_chain_block_zero() {
    let harness = Harness::new();
    let paths: Vec<String> = (1..=3).map(|seed| harness.wallet(seed).1).collect();
    harness.side_chain_params(
        "SyncGenesisHeader",
        json!({ "Path": paths, "ChainID": 7, "ChainRpc": SIDE_CHAIN_RPC }),
    );

    let header = sample_header();
    let mut block = header.clone();
    block.extend_from_slice(&[0x01, 0x00, 0xd1]);
    let side_chain = Arc::new(MockNode::new());
    side_chain.put_block(0, block);

    let ctx = harness.context().with_side_chain(SIDE_CHAIN_RPC, side_chain);
    let registry = ScenarioRegistry::standard();
    assert!(registry.run("SyncGenesisHeader", &ctx).await);

    let submitted = harness.node.submitted();
    let tx = &submitted[0];
    assert_eq!(tx.payload().contract, relay_contracts::HEADER_SYNC);
    assert_eq!(tx.payload().method, "syncGenesisHeader");
    let expected = SyncGenesisHeaderParam {
        chain_id: 7,
        genesis_header: header,
    };
    assert_eq!(tx.payload().args, to_bytes(&expected));
    // 3 个签名者门限为 3
    assert_eq!(tx.sigs()[0].sig_data.len(), 3);
}

#[tokio::test]
async fn approvals_submit_one_transaction_per_account() {
    let harness = Harness::new();
    let approvers: Vec<(Account, String)> = (1..=3).map(|seed| harness.wallet(seed)).collect();
    harness.side_chain_params(
        "ApproveCandidate",
        json!({
            "PeerPubkey": PEER,
            "Path": approvers.iter().map(|(_, p)| p).collect::<Vec<_>>(),
        }),
    );

    let registry = ScenarioRegistry::standard();
    assert!(registry.run("ApproveCandidate", &harness.context()).await);

    let payers: Vec<Address> = harness.node.submitted().iter().map(|tx| tx.payer()).collect();
    let expected: Vec<Address> = approvers.iter().map(|(a, _)| a.address()).collect();
    assert_eq!(payers, expected);
}

#[tokio::test]
async fn unconfirmed_transaction_fails_the_scenario() {
    let harness = Harness::new();
    harness.node.hold_confirmations();
    let (_, path) = harness.wallet(2);
    harness.governance_params("GovWithdrawOng", json!({ "Path": path }));

    let registry = ScenarioRegistry::standard();
    assert!(!registry.run("GovWithdrawOng", &harness.context()).await);
    assert_eq!(harness.node.submitted().len(), 1);
}

#[tokio::test]
async fn mismatched_transfer_lists_are_rejected_locally() {
    let harness = Harness::new();
    let (_, from) = harness.wallet(3);
    let to = Account::from_secret_bytes([4u8; 32]).address().to_base58();
    harness.governance_params(
        "MultiTransfer",
        json!({ "Asset": "ont", "Path": [from], "To": [to.clone(), to], "Amount": [1] }),
    );

    let registry = ScenarioRegistry::standard();
    assert!(!registry.run("MultiTransfer", &harness.context()).await);
    assert!(harness.node.submitted().is_empty());
}

#[tokio::test]
async fn missing_password_fails() {
    let mut harness = Harness::new();
    let (_, path) = harness.wallet(5);
    harness.config.wallet.password = None;
    harness.config.wallet.password_env = "MERIDIAN_TEST_PASSWORD_NOT_SET".to_string();
    harness.governance_params("RegIdWithPublicKey", json!({ "Path": path }));

    let registry = ScenarioRegistry::standard();
    assert!(!registry.run("RegIdWithPublicKey", &harness.context()).await);
}

#[tokio::test]
async fn run_all_collects_failures() {
    let harness = Harness::new();
    let (_, path) = harness.wallet(6);
    harness.governance_params("GovCallSplit", json!({ "Path": [path] }));

    let registry = ScenarioRegistry::standard();
    let summary = registry
        .run_all(&["GovCallSplit", "GovWithdraw"], &harness.context())
        .await;
    assert_eq!(summary.passed, vec!["GovCallSplit".to_string()]);
    assert_eq!(summary.failed, vec!["GovWithdraw".to_string()]);
    assert!(!summary.is_success());
}

#[test]
fn parameter_files_use_pascal_case_field_names() {
    let side: SideChainArgs = serde_json::from_value(json!({
        "Path": "./wallet/peer1.dat",
        "Chainid": 2,
        "Router": 1,
        "Name": "eth",
        "BlocksToWait": 12,
        "CCMCAddress": "aabb",
    }))
    .unwrap();
    assert_eq!(side.chainid, 2);
    assert_eq!(side.ccmc_address, "aabb");

    let relayer: ApproveRelayerArgs =
        serde_json::from_value(json!({ "ID": 9, "Path": ["a", "b"] })).unwrap();
    assert_eq!(relayer.id, 9);

    let multi: RegisterCandidateMultiSignArgs = serde_json::from_value(json!({
        "PeerPubkey": PEER,
        "InitPos": 1,
        "Path": ["a"],
    }))
    .unwrap();
    assert!(!multi.signers.committee);
    assert!(multi.signers.pub_keys.is_empty());
    assert!(multi.signers.submitter.is_none());

    let transfer: MultiTransferArgs = serde_json::from_value(json!({
        "Asset": "ong",
        "Path": ["a"],
        "To": ["b"],
        "Amount": [10],
    }))
    .unwrap();
    assert_eq!(transfer.asset, Asset::Ong);
}
