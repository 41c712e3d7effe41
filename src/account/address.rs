use std::fmt;
use std::str::FromStr;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use super::{AccountError, PublicKey};
use crate::codec::{CodecError, Decode, Encode, Sink, Source};

pub const ADDRESS_LEN: usize = 20;
const ADDRESS_VERSION: u8 = 0x17;
/// 多签公钥数量上限，与节点侧校验保持一致。
pub const MULTI_SIG_MAX_PUBKEYS: usize = 1024;

const OP_PUSH0: u8 = 0x00;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;
const OP_PUSH1: u8 = 0x51;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKMULTISIG: u8 = 0xae;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// 原生合约地址：最后一个字节为合约编号，其余为 0。
    pub const fn native(id: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 1] = id;
        Self(bytes)
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, AccountError> {
        let bytes: [u8; ADDRESS_LEN] = data
            .try_into()
            .map_err(|_| AccountError::AddressLength(data.len()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    pub fn from_program(program: &[u8]) -> Self {
        let sha = Sha256::digest(program);
        let digest = Ripemd160::digest(sha);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn from_public_key(key: &PublicKey) -> Self {
        Self::from_program(&single_sig_program(key))
    }

    /// 由有序公钥列表与门限派生多签地址。公钥顺序参与哈希，调换顺序得到不同地址。
    pub fn from_multi_public_keys(keys: &[PublicKey], m: u16) -> Result<Self, AccountError> {
        let program = multi_sig_program(keys, m)?;
        Ok(Self::from_program(&program))
    }

    pub fn to_base58(&self) -> String {
        let mut data = Vec::with_capacity(1 + ADDRESS_LEN + 4);
        data.push(ADDRESS_VERSION);
        data.extend_from_slice(&self.0);
        let checksum = checksum(&data);
        data.extend_from_slice(&checksum);
        bs58::encode(data).into_string()
    }

    pub fn from_base58(encoded: &str) -> Result<Self, AccountError> {
        let data = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|err| AccountError::Base58(err.to_string()))?;
        if data.len() != 1 + ADDRESS_LEN + 4 {
            return Err(AccountError::Base58(format!(
                "解码后长度应为 25，实际 {}",
                data.len()
            )));
        }
        if data[0] != ADDRESS_VERSION {
            return Err(AccountError::Base58(format!("地址版本非法: {:#x}", data[0])));
        }
        let (body, sum) = data.split_at(1 + ADDRESS_LEN);
        if checksum(body) != sum {
            return Err(AccountError::Base58("校验和不匹配".to_string()));
        }
        Self::from_slice(&body[1..])
    }

    /// 节点 RPC 使用的十六进制形式（字节逆序）。
    pub fn to_hex_string(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    pub fn from_hex_string(encoded: &str) -> Result<Self, AccountError> {
        let mut bytes = hex::decode(encoded.trim())?;
        bytes.reverse();
        Self::from_slice(&bytes)
    }
}

fn checksum(data: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 4];
    out.copy_from_slice(&second[..4]);
    out
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Encode for Address {
    fn encode(&self, sink: &mut Sink) {
        sink.write_var_bytes(&self.0);
    }
}

impl Decode for Address {
    fn decode(source: &mut Source<'_>) -> Result<Self, CodecError> {
        let raw = source.read_var_bytes()?;
        Address::from_slice(raw).map_err(|err| CodecError::Invalid(err.to_string()))
    }
}

pub fn single_sig_program(key: &PublicKey) -> Vec<u8> {
    let mut program = Vec::new();
    push_bytes(&mut program, &key.to_bytes());
    program.push(OP_CHECKSIG);
    program
}

pub fn multi_sig_program(keys: &[PublicKey], m: u16) -> Result<Vec<u8>, AccountError> {
    let n = keys.len();
    if n == 0 || n > MULTI_SIG_MAX_PUBKEYS {
        return Err(AccountError::MultiSigKeyCount(n));
    }
    if m == 0 || usize::from(m) > n {
        return Err(AccountError::MultiSigThreshold { m, n });
    }

    let mut program = Vec::new();
    push_number(&mut program, u64::from(m));
    for key in keys {
        push_bytes(&mut program, &key.to_bytes());
    }
    push_number(&mut program, n as u64);
    program.push(OP_CHECKMULTISIG);
    Ok(program)
}

fn push_number(program: &mut Vec<u8>, value: u64) {
    match value {
        0 => program.push(OP_PUSH0),
        1..=16 => program.push(OP_PUSH1 - 1 + value as u8),
        _ => {
            let mut bytes = value.to_le_bytes().to_vec();
            while bytes.last() == Some(&0) {
                bytes.pop();
            }
            // 最高位为 1 时补 0，保持正数语义
            if bytes.last().is_some_and(|byte| byte & 0x80 != 0) {
                bytes.push(0);
            }
            push_bytes(program, &bytes);
        }
    }
}

fn push_bytes(program: &mut Vec<u8>, data: &[u8]) {
    let len = data.len();
    if len < OP_PUSHDATA1 as usize {
        program.push(len as u8);
    } else if len <= 0xff {
        program.push(OP_PUSHDATA1);
        program.push(len as u8);
    } else if len <= 0xffff {
        program.push(OP_PUSHDATA2);
        program.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        program.push(OP_PUSHDATA4);
        program.extend_from_slice(&(len as u32).to_le_bytes());
    }
    program.extend_from_slice(data);
}
