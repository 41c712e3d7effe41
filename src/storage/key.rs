//! 合约存储键。
//!
//! 键由字符串前缀与若干字节段直接拼接而成，必须与合约写入时的布局逐字节一致；
//! 任何偏差只会表现为“键不存在”，因此所有键都经由 [`StorageKey`] 构建。

use std::fmt;

use crate::account::Address;

use super::StorageError;

pub mod prefix {
    pub const GLOBAL_PARAM: &[u8] = b"globalParam";
    pub const VBFT_CONFIG: &[u8] = b"vbftConfig";
    pub const GOVERNANCE_VIEW: &[u8] = b"governanceView";
    pub const PEER_POOL: &[u8] = b"peerPool";
    pub const VOTE_INFO_POOL: &[u8] = b"voteInfoPool";
    pub const BLACK_LIST: &[u8] = b"blackList";
    pub const TOTAL_STAKE: &[u8] = b"totalStake";
    pub const PENALTY_STAKE: &[u8] = b"penaltyStake";
    pub const SPLIT_CURVE: &[u8] = b"splitCurve";
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(Vec<u8>);

impl StorageKey {
    pub fn new(prefix: &[u8]) -> Self {
        Self(prefix.to_vec())
    }

    /// 追加节点公钥的原始字节（由十六进制公钥字符串解码）。
    pub fn peer_pubkey(mut self, peer_pubkey: &str) -> Result<Self, StorageError> {
        let raw = hex::decode(peer_pubkey.trim()).map_err(|source| StorageError::PeerPubkey {
            peer_pubkey: peer_pubkey.to_string(),
            source,
        })?;
        self.0.extend_from_slice(&raw);
        Ok(self)
    }

    pub fn address(mut self, address: &Address) -> Self {
        self.0.extend_from_slice(address.as_bytes());
        self
    }

    /// 追加大端序的治理视图编号。
    pub fn view(mut self, view: u32) -> Self {
        self.0.extend_from_slice(&view.to_be_bytes());
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn vbft_config() -> Self {
        Self::new(prefix::VBFT_CONFIG)
    }

    pub fn global_param() -> Self {
        Self::new(prefix::GLOBAL_PARAM)
    }

    pub fn split_curve() -> Self {
        Self::new(prefix::SPLIT_CURVE)
    }

    pub fn governance_view() -> Self {
        Self::new(prefix::GOVERNANCE_VIEW)
    }

    pub fn peer_pool(view: u32) -> Self {
        Self::new(prefix::PEER_POOL).view(view)
    }

    pub fn vote_info(peer_pubkey: &str, address: &Address) -> Result<Self, StorageError> {
        Ok(Self::new(prefix::VOTE_INFO_POOL)
            .peer_pubkey(peer_pubkey)?
            .address(address))
    }

    pub fn black_list(peer_pubkey: &str) -> Result<Self, StorageError> {
        Self::new(prefix::BLACK_LIST).peer_pubkey(peer_pubkey)
    }

    pub fn total_stake(address: &Address) -> Self {
        Self::new(prefix::TOTAL_STAKE).address(address)
    }

    pub fn penalty_stake(peer_pubkey: &str) -> Result<Self, StorageError> {
        Self::new(prefix::PENALTY_STAKE).peer_pubkey(peer_pubkey)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", String::from_utf8_lossy(&self.0))
    }
}
