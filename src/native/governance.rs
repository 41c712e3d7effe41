//! 主链治理合约的方法与参数。
//!
//! 数值字段以变长整数编码，地址以变长字节编码，与治理合约的参数反序列化一致。
//! `updateConfig`、`updateGlobalParam`、`updateSplitCurve` 的参数直接使用存储视图
//! [`VbftConfig`]、[`GlobalParam`]、[`SplitCurve`]。

use crate::account::Address;
use crate::codec::{Encode, Sink};

pub use crate::storage::views::{GlobalParam, SplitCurve, VbftConfig};

use super::{write_string_list, write_var_u32_list};

pub const REGISTER_CANDIDATE: &str = "registerCandidate";
pub const UNREGISTER_CANDIDATE: &str = "unRegisterCandidate";
pub const APPROVE_CANDIDATE: &str = "approveCandidate";
pub const REJECT_CANDIDATE: &str = "rejectCandidate";
pub const VOTE_FOR_PEER: &str = "voteForPeer";
pub const UNVOTE_FOR_PEER: &str = "unVoteForPeer";
pub const WITHDRAW: &str = "withdraw";
pub const WITHDRAW_ONG: &str = "withdrawOng";
pub const COMMIT_DPOS: &str = "commitDpos";
pub const QUIT_NODE: &str = "quitNode";
pub const BLACK_NODE: &str = "blackNode";
pub const WHITE_NODE: &str = "whiteNode";
pub const UPDATE_CONFIG: &str = "updateConfig";
pub const UPDATE_GLOBAL_PARAM: &str = "updateGlobalParam";
pub const UPDATE_SPLIT_CURVE: &str = "updateSplitCurve";
pub const CALL_SPLIT: &str = "callSplit";
pub const TRANSFER_PENALTY: &str = "transferPenalty";

/// 注册候选节点时使用的 ONT ID 公钥编号。
pub const DEFAULT_KEY_NO: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterCandidateParam {
    pub peer_pubkey: String,
    pub address: Address,
    pub init_pos: u32,
    pub caller: Vec<u8>,
    pub key_no: u32,
}

impl Encode for RegisterCandidateParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_string(&self.peer_pubkey);
        self.address.encode(sink);
        sink.write_var_uint(u64::from(self.init_pos));
        sink.write_var_bytes(&self.caller);
        sink.write_var_uint(u64::from(self.key_no));
    }
}

/// 节点公钥 + 账户地址，用于 `unRegisterCandidate`、`quitNode`、`transferPenalty`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddressParam {
    pub peer_pubkey: String,
    pub address: Address,
}

impl Encode for PeerAddressParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_string(&self.peer_pubkey);
        self.address.encode(sink);
    }
}

/// `approveCandidate`、`rejectCandidate`、`whiteNode`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerParam {
    pub peer_pubkey: String,
}

impl Encode for PeerParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_string(&self.peer_pubkey);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackNodeParam {
    pub peer_pubkey_list: Vec<String>,
}

impl Encode for BlackNodeParam {
    fn encode(&self, sink: &mut Sink) {
        write_string_list(sink, &self.peer_pubkey_list);
    }
}

/// `voteForPeer`、`unVoteForPeer`、`withdraw` 共用：公钥列表与数量列表一一对应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerPosListParam {
    pub address: Address,
    pub peer_pubkey_list: Vec<String>,
    pub pos_list: Vec<u32>,
}

impl Encode for PeerPosListParam {
    fn encode(&self, sink: &mut Sink) {
        self.address.encode(sink);
        write_string_list(sink, &self.peer_pubkey_list);
        write_var_u32_list(sink, &self.pos_list);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawOngParam {
    pub address: Address,
}

impl Encode for WithdrawOngParam {
    fn encode(&self, sink: &mut Sink) {
        self.address.encode(sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::to_bytes;

    #[test]
    fn register_candidate_layout() {
        let param = RegisterCandidateParam {
            peer_pubkey: "ab".to_string(),
            address: Address::native(9),
            init_pos: 1000,
            caller: b"did".to_vec(),
            key_no: DEFAULT_KEY_NO,
        };
        let mut expected = vec![2, b'a', b'b', 20];
        expected.extend_from_slice(Address::native(9).as_bytes());
        expected.extend_from_slice(&[0xfd, 0xe8, 0x03]);
        expected.extend_from_slice(&[3, b'd', b'i', b'd']);
        expected.push(1);
        assert_eq!(to_bytes(&param), expected);
    }

    #[test]
    fn vote_lists_are_length_prefixed() {
        let param = PeerPosListParam {
            address: Address::ZERO,
            peer_pubkey_list: vec!["p1".into(), "p2".into()],
            pos_list: vec![10, 20],
        };
        let bytes = to_bytes(&param);
        // 地址 21 字节之后是公钥列表长度
        assert_eq!(bytes[21], 2);
        assert_eq!(&bytes[bytes.len() - 3..], &[2, 10, 20]);
    }
}
