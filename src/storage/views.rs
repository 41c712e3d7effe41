//! 合约存储值的类型化视图。
//!
//! 治理合约（主链）的配置类记录以变长整数编码；节点管理合约（中继链）的
//! [`NodeConfiguration`] 与视图记录使用定长小端整数。

use std::fmt;

use crate::account::Address;
use crate::codec::{CodecError, Decode, Encode, Sink, Source};
use crate::transaction::TxHash;

fn read_var_u32(source: &mut Source<'_>) -> Result<u32, CodecError> {
    let value = source.read_var_uint()?;
    u32::try_from(value).map_err(|_| CodecError::Invalid(format!("数值超出 u32 范围: {value}")))
}

fn read_raw_address(source: &mut Source<'_>) -> Result<Address, CodecError> {
    Ok(Address::new(source.read_array()?))
}

/// 主链共识配置（`vbftConfig`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VbftConfig {
    pub n: u32,
    pub c: u32,
    pub k: u32,
    pub l: u32,
    pub block_msg_delay: u32,
    pub hash_msg_delay: u32,
    pub peer_handshake_timeout: u32,
    pub max_block_change_view: u32,
}

impl Encode for VbftConfig {
    fn encode(&self, sink: &mut Sink) {
        for value in [
            self.n,
            self.c,
            self.k,
            self.l,
            self.block_msg_delay,
            self.hash_msg_delay,
            self.peer_handshake_timeout,
            self.max_block_change_view,
        ] {
            sink.write_var_uint(u64::from(value));
        }
    }
}

impl Decode for VbftConfig {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            n: read_var_u32(source)?,
            c: read_var_u32(source)?,
            k: read_var_u32(source)?,
            l: read_var_u32(source)?,
            block_msg_delay: read_var_u32(source)?,
            hash_msg_delay: read_var_u32(source)?,
            peer_handshake_timeout: read_var_u32(source)?,
            max_block_change_view: read_var_u32(source)?,
        })
    }
}

/// 中继链节点管理合约的共识配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeConfiguration {
    pub block_msg_delay: u32,
    pub hash_msg_delay: u32,
    pub peer_handshake_timeout: u32,
    pub max_block_change_view: u32,
}

impl Encode for NodeConfiguration {
    fn encode(&self, sink: &mut Sink) {
        sink.write_u32(self.block_msg_delay);
        sink.write_u32(self.hash_msg_delay);
        sink.write_u32(self.peer_handshake_timeout);
        sink.write_u32(self.max_block_change_view);
    }
}

impl Decode for NodeConfiguration {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            block_msg_delay: source.read_u32()?,
            hash_msg_delay: source.read_u32()?,
            peer_handshake_timeout: source.read_u32()?,
            max_block_change_view: source.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalParam {
    pub candidate_fee: u64,
    pub min_init_stake: u32,
    pub candidate_num: u32,
    pub pos_limit: u32,
    pub a: u32,
    pub b: u32,
    pub yita: u32,
    pub penalty: u32,
}

impl Encode for GlobalParam {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_uint(self.candidate_fee);
        for value in [
            self.min_init_stake,
            self.candidate_num,
            self.pos_limit,
            self.a,
            self.b,
            self.yita,
            self.penalty,
        ] {
            sink.write_var_uint(u64::from(value));
        }
    }
}

impl Decode for GlobalParam {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            candidate_fee: source.read_var_uint()?,
            min_init_stake: read_var_u32(source)?,
            candidate_num: read_var_u32(source)?,
            pos_limit: read_var_u32(source)?,
            a: read_var_u32(source)?,
            b: read_var_u32(source)?,
            yita: read_var_u32(source)?,
            penalty: read_var_u32(source)?,
        })
    }
}

/// 手续费分配曲线。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitCurve {
    pub yi: Vec<u32>,
}

impl Encode for SplitCurve {
    fn encode(&self, sink: &mut Sink) {
        crate::native::write_var_u32_list(sink, &self.yi);
    }
}

impl Decode for SplitCurve {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        let count = source.read_var_uint()?;
        let mut yi = Vec::new();
        for _ in 0..count {
            yi.push(read_var_u32(source)?);
        }
        Ok(Self { yi })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GovernanceView {
    pub view: u32,
    pub height: u32,
    pub tx_hash: TxHash,
}

impl Encode for GovernanceView {
    fn encode(&self, sink: &mut Sink) {
        sink.write_u32(self.view);
        sink.write_u32(self.height);
        sink.write_raw(self.tx_hash.as_bytes());
    }
}

impl Decode for GovernanceView {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            view: source.read_u32()?,
            height: source.read_u32()?,
            tx_hash: TxHash::new(source.read_array()?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerStatus {
    RegisterCandidate,
    Reject,
    Candidate,
    Consensus,
    QuitConsensus,
    Quiting,
    Black,
    Unknown(u8),
}

impl From<u8> for PeerStatus {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Self::RegisterCandidate,
            1 => Self::Reject,
            2 => Self::Candidate,
            3 => Self::Consensus,
            4 => Self::QuitConsensus,
            5 => Self::Quiting,
            6 => Self::Black,
            other => Self::Unknown(other),
        }
    }
}

impl From<PeerStatus> for u8 {
    fn from(status: PeerStatus) -> Self {
        match status {
            PeerStatus::RegisterCandidate => 0,
            PeerStatus::Reject => 1,
            PeerStatus::Candidate => 2,
            PeerStatus::Consensus => 3,
            PeerStatus::QuitConsensus => 4,
            PeerStatus::Quiting => 5,
            PeerStatus::Black => 6,
            PeerStatus::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for PeerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisterCandidate => f.write_str("registerCandidate"),
            Self::Reject => f.write_str("reject"),
            Self::Candidate => f.write_str("candidate"),
            Self::Consensus => f.write_str("consensus"),
            Self::QuitConsensus => f.write_str("quitConsensus"),
            Self::Quiting => f.write_str("quiting"),
            Self::Black => f.write_str("black"),
            Self::Unknown(raw) => write!(f, "unknown({raw})"),
        }
    }
}

/// 主链治理合约的节点池条目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerPoolItem {
    pub index: u32,
    pub peer_pubkey: String,
    pub address: Address,
    pub status: PeerStatus,
    pub init_pos: u64,
    pub total_pos: u64,
}

impl Encode for PeerPoolItem {
    fn encode(&self, sink: &mut Sink) {
        sink.write_u32(self.index);
        sink.write_string(&self.peer_pubkey);
        sink.write_raw(self.address.as_bytes());
        sink.write_u8(self.status.into());
        sink.write_u64(self.init_pos);
        sink.write_u64(self.total_pos);
    }
}

impl Decode for PeerPoolItem {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            index: source.read_u32()?,
            peer_pubkey: source.read_string()?,
            address: read_raw_address(source)?,
            status: source.read_u8()?.into(),
            init_pos: source.read_u64()?,
            total_pos: source.read_u64()?,
        })
    }
}

/// 节点池，按写入顺序保存。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeerPoolMap {
    pub items: Vec<PeerPoolItem>,
}

impl PeerPoolMap {
    pub fn get(&self, peer_pubkey: &str) -> Option<&PeerPoolItem> {
        self.items.iter().find(|item| item.peer_pubkey == peer_pubkey)
    }
}

impl Encode for PeerPoolMap {
    fn encode(&self, sink: &mut Sink) {
        sink.write_u32(self.items.len() as u32);
        for item in &self.items {
            item.encode(sink);
        }
    }
}

impl Decode for PeerPoolMap {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        let count = source.read_u32()?;
        let mut items = Vec::new();
        for _ in 0..count {
            items.push(PeerPoolItem::decode(source)?);
        }
        Ok(Self { items })
    }
}

/// 中继链节点管理合约的节点池条目，不含质押信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePeerPoolItem {
    pub index: u32,
    pub peer_pubkey: String,
    pub address: Address,
    pub status: PeerStatus,
}

impl Encode for NodePeerPoolItem {
    fn encode(&self, sink: &mut Sink) {
        sink.write_u32(self.index);
        sink.write_string(&self.peer_pubkey);
        self.address.encode(sink);
        sink.write_u8(self.status.into());
    }
}

impl Decode for NodePeerPoolItem {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            index: source.read_u32()?,
            peer_pubkey: source.read_string()?,
            address: Address::decode(source)?,
            status: source.read_u8()?.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePeerPoolMap {
    pub items: Vec<NodePeerPoolItem>,
}

impl Encode for NodePeerPoolMap {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_uint(self.items.len() as u64);
        for item in &self.items {
            item.encode(sink);
        }
    }
}

impl Decode for NodePeerPoolMap {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        let count = source.read_var_uint()?;
        let mut items = Vec::new();
        for _ in 0..count {
            items.push(NodePeerPoolItem::decode(source)?);
        }
        Ok(Self { items })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteInfo {
    pub peer_pubkey: String,
    pub address: Address,
    pub consensus_pos: u64,
    pub freeze_pos: u64,
    pub new_pos: u64,
    pub withdraw_pos: u64,
    pub withdraw_freeze_pos: u64,
    pub withdraw_unfreeze_pos: u64,
}

impl Encode for VoteInfo {
    fn encode(&self, sink: &mut Sink) {
        sink.write_string(&self.peer_pubkey);
        sink.write_raw(self.address.as_bytes());
        for value in [
            self.consensus_pos,
            self.freeze_pos,
            self.new_pos,
            self.withdraw_pos,
            self.withdraw_freeze_pos,
            self.withdraw_unfreeze_pos,
        ] {
            sink.write_u64(value);
        }
    }
}

impl Decode for VoteInfo {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            peer_pubkey: source.read_string()?,
            address: read_raw_address(source)?,
            consensus_pos: source.read_u64()?,
            freeze_pos: source.read_u64()?,
            new_pos: source.read_u64()?,
            withdraw_pos: source.read_u64()?,
            withdraw_freeze_pos: source.read_u64()?,
            withdraw_unfreeze_pos: source.read_u64()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalStake {
    pub address: Address,
    pub stake: u64,
    pub time_offset: u32,
}

impl Encode for TotalStake {
    fn encode(&self, sink: &mut Sink) {
        sink.write_raw(self.address.as_bytes());
        sink.write_u64(self.stake);
        sink.write_u32(self.time_offset);
    }
}

impl Decode for TotalStake {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            address: read_raw_address(source)?,
            stake: source.read_u64()?,
            time_offset: source.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyStake {
    pub peer_pubkey: String,
    pub init_pos: u64,
    pub authorize_pos: u64,
    pub time_offset: u32,
    pub amount: u64,
}

impl Encode for PenaltyStake {
    fn encode(&self, sink: &mut Sink) {
        sink.write_string(&self.peer_pubkey);
        sink.write_u64(self.init_pos);
        sink.write_u64(self.authorize_pos);
        sink.write_u32(self.time_offset);
        sink.write_u64(self.amount);
    }
}

impl Decode for PenaltyStake {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            peer_pubkey: source.read_string()?,
            init_pos: source.read_u64()?,
            authorize_pos: source.read_u64()?,
            time_offset: source.read_u32()?,
            amount: source.read_u64()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};

    #[test]
    fn node_configuration_round_trip() {
        let config = NodeConfiguration {
            block_msg_delay: 10_000,
            hash_msg_delay: 10_000,
            peer_handshake_timeout: 10,
            max_block_change_view: 3000,
        };
        let bytes = to_bytes(&config);
        assert_eq!(bytes.len(), 16);
        assert_eq!(from_bytes::<NodeConfiguration>(&bytes).unwrap(), config);
    }

    #[test]
    fn truncated_vote_info_fails() {
        let info = VoteInfo {
            peer_pubkey: "peer".into(),
            address: Address::native(1),
            consensus_pos: 1,
            freeze_pos: 2,
            new_pos: 3,
            withdraw_pos: 4,
            withdraw_freeze_pos: 5,
            withdraw_unfreeze_pos: 6,
        };
        let bytes = to_bytes(&info);
        assert!(from_bytes::<VoteInfo>(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn vbft_config_rejects_oversized_values() {
        let mut sink = Sink::new();
        sink.write_var_uint(u64::from(u32::MAX) + 1);
        assert!(from_bytes::<VbftConfig>(&sink.into_bytes()).is_err());
    }

    #[test]
    fn unknown_peer_status_is_kept() {
        let status = PeerStatus::from(42);
        assert_eq!(status, PeerStatus::Unknown(42));
        assert_eq!(u8::from(status), 42);
        assert_eq!(PeerStatus::from(3).to_string(), "consensus");
    }
}
