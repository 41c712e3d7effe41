//! 内存节点：实现 `NodeClient`，用于在无真实节点时跑通场景。
//!
//! 提交交易时按节点规则检查签名条目（签名数不低于门限、签名有效、付款人与
//! 指定见证地址在签名地址集合中），以便测试多签门限等行为。

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use super::{NodeClient, RpcError, codes};
use crate::account::Address;
use crate::transaction::{Sig, Transaction, TxHash};

#[derive(Default)]
struct MockState {
    storage: HashMap<(Address, Vec<u8>), Vec<u8>>,
    witnesses: HashMap<(Address, String), Address>,
    blocks: HashMap<u32, Vec<u8>>,
    heights: HashMap<TxHash, u32>,
    submitted: Vec<Transaction>,
    block_count: u32,
    hold_confirmations: bool,
}

pub struct MockNode {
    state: Mutex<MockState>,
}

impl Default for MockNode {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNode {
    pub fn new() -> Self {
        let state = MockState {
            block_count: 1,
            ..MockState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn put_storage(&self, contract: Address, key: &[u8], value: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.storage.insert((contract, key.to_vec()), value);
    }

    /// 要求 `(contract, method)` 的交易必须包含 `witness` 的签名。
    pub fn require_witness(&self, contract: Address, method: &str, witness: Address) {
        let mut state = self.state.lock().unwrap();
        state
            .witnesses
            .insert((contract, method.to_string()), witness);
    }

    pub fn put_block(&self, height: u32, raw: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.blocks.insert(height, raw);
    }

    /// 交易被接受但永不落块，用于测试确认超时。
    pub fn hold_confirmations(&self) {
        self.state.lock().unwrap().hold_confirmations = true;
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().submitted.clone()
    }

    fn reject(message: impl Into<String>) -> RpcError {
        RpcError::Node {
            method: "sendrawtransaction",
            code: codes::INVALID_TRANSACTION,
            message: message.into(),
        }
    }

    fn verify_entry(hash: &TxHash, entry: &Sig) -> Result<Address, RpcError> {
        if entry.sig_data.len() < usize::from(entry.m) {
            return Err(Self::reject(format!(
                "签名数 {} 低于门限 {}",
                entry.sig_data.len(),
                entry.m
            )));
        }
        let keys = entry
            .pubkeys
            .iter()
            .map(|key| VerifyingKey::from_bytes(key.raw()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Self::reject(err.to_string()))?;

        // 与 CHECKMULTISIG 相同：签名按公钥顺序匹配，公钥游标只前进不回退
        let mut cursor = 0usize;
        for data in &entry.sig_data {
            let signature =
                Signature::from_slice(data).map_err(|err| Self::reject(err.to_string()))?;
            let matched = keys[cursor..]
                .iter()
                .position(|key| key.verify(hash.as_bytes(), &signature).is_ok())
                .ok_or_else(|| Self::reject("签名校验失败"))?;
            cursor += matched + 1;
        }
        entry.address().map_err(|err| Self::reject(err.to_string()))
    }
}

#[async_trait]
impl NodeClient for MockNode {
    fn endpoint(&self) -> &str {
        "mock://node"
    }

    async fn send_raw_transaction(&self, tx: Transaction) -> Result<TxHash, RpcError> {
        if !tx.is_signed() {
            return Err(Self::reject("交易未签名"));
        }
        let hash = tx.hash();
        let mut signers = HashSet::new();
        for entry in tx.sigs() {
            signers.insert(Self::verify_entry(&hash, entry)?);
        }
        if !signers.contains(&tx.payer()) {
            return Err(Self::reject("缺少付款人签名"));
        }

        let mut state = self.state.lock().unwrap();
        let payload = tx.payload();
        if let Some(witness) = state
            .witnesses
            .get(&(payload.contract, payload.method.clone()))
        {
            if !signers.contains(witness) {
                return Err(Self::reject(format!("缺少见证地址 {witness} 的签名")));
            }
        }

        let height = state.block_count;
        state.block_count += 1;
        if !state.hold_confirmations {
            state.heights.insert(hash, height);
        }
        state.submitted.push(tx);
        Ok(hash)
    }

    async fn get_storage(&self, contract: &Address, key: &[u8]) -> Result<Vec<u8>, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .storage
            .get(&(*contract, key.to_vec()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_block_count(&self) -> Result<u32, RpcError> {
        Ok(self.state.lock().unwrap().block_count)
    }

    async fn get_raw_block(&self, height: u32) -> Result<Vec<u8>, RpcError> {
        self.state
            .lock()
            .unwrap()
            .blocks
            .get(&height)
            .cloned()
            .ok_or(RpcError::Node {
                method: "getblock",
                code: codes::UNKNOWN_BLOCK,
                message: format!("UNKNOWN BLOCK {height}"),
            })
    }

    async fn get_transaction_height(&self, hash: &TxHash) -> Result<Option<u32>, RpcError> {
        Ok(self.state.lock().unwrap().heights.get(hash).copied())
    }
}
