//! 账户与密钥：ed25519 密钥对、序列化公钥以及单签/多签地址。

mod address;

use std::fmt;

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use ed25519_dalek::{Signer, SigningKey};
use thiserror::Error;
use zeroize::Zeroize;

use crate::codec::{CodecError, Decode, Encode, Sink, Source};

pub use address::{
    ADDRESS_LEN, Address, MULTI_SIG_MAX_PUBKEYS, multi_sig_program, single_sig_program,
};

/// 序列化公钥前缀：算法标识 + 曲线标识。
const KEY_TYPE_ED25519: u8 = 0x14;
const CURVE_ED25519: u8 = 0x19;
pub const PUBLIC_KEY_LEN: usize = 34;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("地址长度应为 20 字节，实际 {0}")]
    AddressLength(usize),
    #[error("Base58 地址非法: {0}")]
    Base58(String),
    #[error("十六进制解码失败: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("公钥格式非法: {0}")]
    PublicKey(String),
    #[error("多签公钥数量非法: {0}")]
    MultiSigKeyCount(usize),
    #[error("多签门限非法: m={m}, n={n}")]
    MultiSigThreshold { m: u16, n: usize },
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_raw(bytes: [u8; 32]) -> Result<Self, AccountError> {
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|err| AccountError::PublicKey(err.to_string()))?;
        Ok(Self(bytes))
    }

    /// 解析带算法前缀的序列化公钥。
    pub fn from_bytes(data: &[u8]) -> Result<Self, AccountError> {
        if data.len() != PUBLIC_KEY_LEN {
            return Err(AccountError::PublicKey(format!(
                "长度应为 {PUBLIC_KEY_LEN}，实际 {}",
                data.len()
            )));
        }
        if data[0] != KEY_TYPE_ED25519 || data[1] != CURVE_ED25519 {
            return Err(AccountError::PublicKey(format!(
                "不支持的算法标识 {:#x}/{:#x}",
                data[0], data[1]
            )));
        }
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&data[2..]);
        Self::from_raw(raw)
    }

    pub fn from_hex(encoded: &str) -> Result<Self, AccountError> {
        Self::from_bytes(&hex::decode(encoded.trim())?)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PUBLIC_KEY_LEN);
        out.push(KEY_TYPE_ED25519);
        out.push(CURVE_ED25519);
        out.extend_from_slice(&self.0);
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn raw(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Encode for PublicKey {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_bytes(&self.to_bytes());
    }
}

impl Decode for PublicKey {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        let raw = source.read_var_bytes()?;
        PublicKey::from_bytes(raw).map_err(|err| CodecError::Invalid(err.to_string()))
    }
}

/// 可签名账户。私钥只保存在内存中，`Debug` 输出不包含私钥。
#[derive(Clone)]
pub struct Account {
    signing_key: SigningKey,
    public_key: PublicKey,
    address: Address,
}

impl Account {
    pub fn from_secret_bytes(secret: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&secret);
        let public_key = PublicKey(signing_key.verifying_key().to_bytes());
        let address = Address::from_public_key(&public_key);
        Self {
            signing_key,
            public_key,
            address,
        }
    }

    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        let account = Self::from_secret_bytes(secret);
        secret.zeroize();
        account
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish()
    }
}
