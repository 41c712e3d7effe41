pub mod block;
pub mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::account::Address;
use crate::transaction::{Transaction, TxHash};

pub use block::split_block_header;
pub use http::JsonRpcClient;

/// 节点错误码（与节点 RPC 返回的 `error` 字段一致）。
pub mod codes {
    pub const SUCCESS: i64 = 0;
    pub const INVALID_PARAMS: i64 = 42002;
    pub const INVALID_TRANSACTION: i64 = 43001;
    pub const UNKNOWN_TRANSACTION: i64 = 44001;
    pub const UNKNOWN_BLOCK: i64 = 44003;
    pub const INTERNAL_ERROR: i64 = 45001;
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("节点返回错误 {code} ({method}): {message}")]
    Node {
        method: &'static str,
        code: i64,
        message: String,
    },
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("十六进制解码失败: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("响应格式非法 ({method}): {message}")]
    Malformed {
        method: &'static str,
        message: String,
    },
}

impl RpcError {
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Node { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// 节点 RPC 能力集合。调用方只依赖该 trait，测试使用内存实现。
#[async_trait]
pub trait NodeClient: Send + Sync {
    fn endpoint(&self) -> &str;

    /// 提交已签名交易。交易按值传入，提交后不可再修改。
    async fn send_raw_transaction(&self, tx: Transaction) -> Result<TxHash, RpcError>;

    /// 读取合约存储；键不存在时返回空值。
    async fn get_storage(&self, contract: &Address, key: &[u8]) -> Result<Vec<u8>, RpcError>;

    async fn get_block_count(&self) -> Result<u32, RpcError>;

    async fn get_raw_block(&self, height: u32) -> Result<Vec<u8>, RpcError>;

    /// 交易落块高度；尚未落块时返回 `None`。
    async fn get_transaction_height(&self, hash: &TxHash) -> Result<Option<u32>, RpcError>;
}
