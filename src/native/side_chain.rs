//! 中继链上的侧链治理：跨链管理、区块头同步、侧链管理与节点管理合约。

use crate::account::Address;
use crate::codec::{Encode, Sink};

pub use super::governance::PeerAddressParam;
pub use crate::storage::views::NodeConfiguration;

use super::write_string_list;

/// 跨链管理合约。
pub mod ccm {
    pub const BLACK_CHAIN: &str = "blackChain";
    pub const WHITE_CHAIN: &str = "whiteChain";
}

/// 区块头同步合约。
pub mod header_sync {
    pub const SYNC_GENESIS_HEADER: &str = "syncGenesisHeader";
}

/// 侧链管理合约。
pub mod side_chain_manager {
    pub const REGISTER_SIDE_CHAIN: &str = "registerSideChain";
    pub const UPDATE_SIDE_CHAIN: &str = "updateSideChain";
    pub const APPROVE_REGISTER_SIDE_CHAIN: &str = "approveRegisterSideChain";
    pub const APPROVE_UPDATE_SIDE_CHAIN: &str = "approveUpdateSideChain";
}

/// 节点管理合约。
pub mod node_manager {
    pub const REGISTER_CANDIDATE: &str = "registerCandidate";
    pub const UNREGISTER_CANDIDATE: &str = "unRegisterCandidate";
    pub const QUIT_NODE: &str = "quitNode";
    pub const APPROVE_CANDIDATE: &str = "approveCandidate";
    pub const REJECT_CANDIDATE: &str = "rejectCandidate";
    pub const BLACK_NODE: &str = "blackNode";
    pub const WHITE_NODE: &str = "whiteNode";
    pub const UPDATE_CONFIG: &str = "updateConfig";
    pub const COMMIT_DPOS: &str = "commitDpos";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainIdParam {
    pub chain_id: u64,
}

impl Encode for ChainIdParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_uint(self.chain_id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncGenesisHeaderParam {
    pub chain_id: u64,
    pub genesis_header: Vec<u8>,
}

impl Encode for SyncGenesisHeaderParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_uint(self.chain_id);
        sink.write_var_bytes(&self.genesis_header);
    }
}

/// `registerSideChain` / `updateSideChain`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSideChainParam {
    pub address: Address,
    pub chain_id: u64,
    pub router: u64,
    pub name: String,
    pub blocks_to_wait: u64,
    pub ccm_contract: Vec<u8>,
}

impl Encode for RegisterSideChainParam {
    fn encode(&self, sink: &mut Sink) {
        self.address.encode(sink);
        sink.write_var_uint(self.chain_id);
        sink.write_var_uint(self.router);
        sink.write_string(&self.name);
        sink.write_var_uint(self.blocks_to_wait);
        sink.write_var_bytes(&self.ccm_contract);
    }
}

/// 审批侧链注册或更新：侧链编号 + 审批人地址。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproveSideChainParam {
    pub chain_id: u64,
    pub address: Address,
}

impl Encode for ApproveSideChainParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_uint(self.chain_id);
        self.address.encode(sink);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerListParam {
    pub peer_pubkey_list: Vec<String>,
    pub address: Address,
}

impl Encode for PeerListParam {
    fn encode(&self, sink: &mut Sink) {
        write_string_list(sink, &self.peer_pubkey_list);
        self.address.encode(sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::to_bytes;

    #[test]
    fn register_side_chain_layout() {
        let param = RegisterSideChainParam {
            address: Address::native(1),
            chain_id: 3,
            router: 1,
            name: "eth".into(),
            blocks_to_wait: 12,
            ccm_contract: vec![0xaa, 0xbb],
        };
        let bytes = to_bytes(&param);
        assert_eq!(bytes.len(), 21 + 1 + 1 + 4 + 1 + 3);
        assert_eq!(&bytes[21..23], &[3, 1]);
        assert_eq!(&bytes[bytes.len() - 3..], &[2, 0xaa, 0xbb]);
    }
}
