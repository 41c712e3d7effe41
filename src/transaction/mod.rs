//! 原生合约调用交易：构建、签名与线格式编码。

mod sign;

use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::account::{AccountError, Address, PublicKey};
use crate::codec::{self, CodecError, Decode, Encode, Sink, Source};

pub use sign::{multi_sign_threshold, multi_sign_to_transaction, sign_to_transaction};

pub const TX_VERSION: u8 = 0;
pub const TX_TYPE_INVOKE: u8 = 0xd1;
/// 单笔交易允许携带的签名条目上限。
pub const MAX_SIG_ENTRIES: usize = 16;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("签名条目数量已达上限 {MAX_SIG_ENTRIES}")]
    TooManySigEntries,
    #[error("多签条目签名数已达公钥数量 {n}，无法继续追加")]
    TooManySignatures { n: usize },
    #[error("账户或多签参数非法: {0}")]
    Account(#[from] AccountError),
    #[error("交易编码非法: {0}")]
    Codec(#[from] CodecError),
    #[error("交易类型不支持: {0:#x}")]
    UnsupportedType(u8),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// 节点展示用的十六进制形式（字节逆序）。
    pub fn to_hex_string(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    pub fn from_hex_string(encoded: &str) -> Result<Self, TransactionError> {
        let mut bytes = hex::decode(encoded.trim()).map_err(AccountError::from)?;
        if bytes.len() != 32 {
            return Err(CodecError::Invalid(format!("交易哈希长度非法: {}", bytes.len())).into());
        }
        bytes.reverse();
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex_string())
    }
}

impl FromStr for TxHash {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex_string(s)
    }
}

/// 原生合约调用载荷。`args` 为按顺序编码后的参数列表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeInvoke {
    pub version: u8,
    pub contract: Address,
    pub method: String,
    pub args: Vec<u8>,
}

impl Encode for NativeInvoke {
    fn encode(&self, sink: &mut Sink) {
        sink.write_u8(self.version);
        sink.write_raw(self.contract.as_bytes());
        sink.write_string(&self.method);
        sink.write_var_bytes(&self.args);
    }
}

impl Decode for NativeInvoke {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        let version = source.read_u8()?;
        let contract = Address::new(source.read_array()?);
        let method = source.read_string()?;
        let args = source.read_var_bytes()?.to_vec();
        Ok(Self {
            version,
            contract,
            method,
            args,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sig {
    pub m: u16,
    pub pubkeys: Vec<PublicKey>,
    pub sig_data: Vec<Vec<u8>>,
}

impl Sig {
    /// 该签名条目对应的见证地址。
    pub fn address(&self) -> Result<Address, AccountError> {
        match self.pubkeys.as_slice() {
            [single] if self.m == 1 => Ok(Address::from_public_key(single)),
            keys => Address::from_multi_public_keys(keys, self.m),
        }
    }
}

impl Encode for Sig {
    fn encode(&self, sink: &mut Sink) {
        sink.write_u16(self.m);
        sink.write_var_uint(self.pubkeys.len() as u64);
        for key in &self.pubkeys {
            key.encode(sink);
        }
        sink.write_var_uint(self.sig_data.len() as u64);
        for data in &self.sig_data {
            sink.write_var_bytes(data);
        }
    }
}

impl Decode for Sig {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        let m = source.read_u16()?;
        let key_count = source.read_var_uint()?;
        let mut pubkeys = Vec::new();
        for _ in 0..key_count {
            pubkeys.push(PublicKey::decode(source)?);
        }
        let sig_count = source.read_var_uint()?;
        let mut sig_data = Vec::new();
        for _ in 0..sig_count {
            sig_data.push(source.read_var_bytes()?.to_vec());
        }
        Ok(Self {
            m,
            pubkeys,
            sig_data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    version: u8,
    tx_type: u8,
    nonce: u32,
    gas_price: u64,
    gas_limit: u64,
    payer: Address,
    payload: NativeInvoke,
    sigs: Vec<Sig>,
}

impl Transaction {
    /// 构建未签名的原生合约调用交易，`params` 按顺序编码进调用参数。
    pub fn new_native_invoke(
        gas_price: u64,
        gas_limit: u64,
        version: u8,
        contract: Address,
        method: &str,
        params: &[&(dyn Encode + Sync)],
    ) -> Self {
        let mut sink = Sink::new();
        for param in params {
            param.encode(&mut sink);
        }
        Self {
            version: TX_VERSION,
            tx_type: TX_TYPE_INVOKE,
            nonce: OsRng.next_u32(),
            gas_price,
            gas_limit,
            payer: Address::ZERO,
            payload: NativeInvoke {
                version,
                contract,
                method: method.to_string(),
                args: sink.into_bytes(),
            },
            sigs: Vec::new(),
        }
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn gas_price(&self) -> u64 {
        self.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn payer(&self) -> Address {
        self.payer
    }

    pub fn payload(&self) -> &NativeInvoke {
        &self.payload
    }

    pub fn sigs(&self) -> &[Sig] {
        &self.sigs
    }

    pub fn is_signed(&self) -> bool {
        !self.sigs.is_empty()
    }

    /// 所有签名条目的见证地址，按签名条目顺序排列。
    pub fn signer_addresses(&self) -> Result<Vec<Address>, AccountError> {
        self.sigs.iter().map(Sig::address).collect()
    }

    pub fn hash(&self) -> TxHash {
        let mut sink = Sink::new();
        self.encode_unsigned(&mut sink);
        let first = Sha256::digest(sink.into_bytes());
        let second = Sha256::digest(first);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second);
        TxHash(out)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        codec::to_bytes(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, TransactionError> {
        let mut source = Source::new(data);
        let tx = Self::decode(&mut source)?;
        if !source.is_empty() {
            return Err(CodecError::Invalid(format!(
                "交易末尾存在 {} 字节多余数据",
                source.remaining()
            ))
            .into());
        }
        if tx.tx_type != TX_TYPE_INVOKE {
            return Err(TransactionError::UnsupportedType(tx.tx_type));
        }
        Ok(tx)
    }

    fn encode_unsigned(&self, sink: &mut Sink) {
        sink.write_u8(self.version);
        sink.write_u8(self.tx_type);
        sink.write_u32(self.nonce);
        sink.write_u64(self.gas_price);
        sink.write_u64(self.gas_limit);
        sink.write_raw(self.payer.as_bytes());
        sink.write_var_bytes(&codec::to_bytes(&self.payload));
        // 交易属性，当前恒为空
        sink.write_var_uint(0);
    }

    pub(crate) fn set_payer_if_unset(&mut self, payer: Address) {
        if self.payer.is_zero() {
            self.payer = payer;
        }
    }

    pub(crate) fn sigs_mut(&mut self) -> &mut Vec<Sig> {
        &mut self.sigs
    }
}

impl Encode for Transaction {
    fn encode(&self, sink: &mut Sink) {
        self.encode_unsigned(sink);
        sink.write_var_uint(self.sigs.len() as u64);
        for sig in &self.sigs {
            sig.encode(sink);
        }
    }
}

impl Decode for Transaction {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        let version = source.read_u8()?;
        let tx_type = source.read_u8()?;
        let nonce = source.read_u32()?;
        let gas_price = source.read_u64()?;
        let gas_limit = source.read_u64()?;
        let payer = Address::new(source.read_array()?);
        let payload = codec::from_bytes::<NativeInvoke>(source.read_var_bytes()?)?;
        let attributes = source.read_var_uint()?;
        if attributes != 0 {
            return Err(CodecError::Invalid(format!(
                "不支持的交易属性数量: {attributes}"
            )));
        }
        let sig_count = source.read_var_uint()?;
        let mut sigs = Vec::new();
        for _ in 0..sig_count {
            sigs.push(Sig::decode(source)?);
        }
        Ok(Self {
            version,
            tx_type,
            nonce,
            gas_price,
            gas_limit,
            payer,
            payload,
            sigs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;

    #[test]
    fn hash_ignores_signatures() {
        let account = Account::from_secret_bytes([1u8; 32]);
        let mut tx =
            Transaction::new_native_invoke(500, 20_000, 0, Address::native(7), "commitDpos", &[]);
        tx.set_payer_if_unset(account.address());
        let before = tx.hash();
        sign_to_transaction(&mut tx, &account).unwrap();
        assert_eq!(tx.hash(), before);
    }

    #[test]
    fn signed_transaction_decodes_back() {
        let account = Account::from_secret_bytes([1u8; 32]);
        let peer = "peer".to_string();
        let mut tx = Transaction::new_native_invoke(
            500,
            20_000,
            0,
            Address::native(7),
            "approveCandidate",
            &[&Wrapper(peer)],
        );
        sign_to_transaction(&mut tx, &account).unwrap();
        let decoded = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.payload().method, "approveCandidate");
    }

    #[test]
    fn tx_hash_hex_round_trip() {
        let hash = TxHash::new([0xab; 32]);
        assert_eq!(TxHash::from_hex_string(&hash.to_hex_string()).unwrap(), hash);
        assert!(TxHash::from_hex_string("abcd").is_err());
    }

    struct Wrapper(String);

    impl Encode for Wrapper {
        fn encode(&self, sink: &mut Sink) {
            sink.write_string(&self.0);
        }
    }
}
