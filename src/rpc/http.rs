use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use super::{NodeClient, RpcError, codes};
use crate::account::Address;
use crate::transaction::{Transaction, TxHash};

const METHOD_SEND_RAW_TRANSACTION: &str = "sendrawtransaction";
const METHOD_GET_STORAGE: &str = "getstorage";
const METHOD_GET_BLOCK_COUNT: &str = "getblockcount";
const METHOD_GET_BLOCK: &str = "getblock";
const METHOD_GET_TX_HEIGHT: &str = "getblockheightbytxhash";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// 节点响应中的 `error` 字段：节点使用整数错误码，标准 JSON-RPC 使用对象。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RpcErrorField {
    Code(i64),
    Object(RpcErrorObject),
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    error: Option<RpcErrorField>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    result: Value,
}

#[derive(Clone, Debug)]
pub struct JsonRpcClient {
    url: String,
    client: reqwest::Client,
}

impl JsonRpcClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let parsed = Url::parse(url.trim()).map_err(|err| RpcError::Malformed {
            method: "init",
            message: format!("RPC 地址非法 {url}: {err}"),
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            url: parsed.to_string(),
            client,
        })
    }

    async fn call(&self, method: &'static str, params: Value) -> Result<Value, RpcError> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(target: "rpc", method, id, "发送 RPC 请求");

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.error {
            None | Some(RpcErrorField::Code(codes::SUCCESS)) => Ok(response.result),
            Some(RpcErrorField::Code(code)) => Err(RpcError::Node {
                method,
                code,
                message: node_error_message(response.desc, &response.result),
            }),
            Some(RpcErrorField::Object(object)) => Err(RpcError::Node {
                method,
                code: object.code,
                message: object.message,
            }),
        }
    }
}

fn node_error_message(desc: Option<String>, result: &Value) -> String {
    let detail = result.as_str().unwrap_or_default();
    match desc {
        Some(desc) if !detail.is_empty() => format!("{desc}: {detail}"),
        Some(desc) => desc,
        None => detail.to_string(),
    }
}

fn expect_str(method: &'static str, value: &Value) -> Result<String, RpcError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RpcError::Malformed {
            method,
            message: format!("期望字符串结果，实际 {value}"),
        })
}

fn expect_u32(method: &'static str, value: &Value) -> Result<u32, RpcError> {
    value
        .as_u64()
        .and_then(|raw| u32::try_from(raw).ok())
        .ok_or_else(|| RpcError::Malformed {
            method,
            message: format!("期望 u32 结果，实际 {value}"),
        })
}

#[async_trait]
impl NodeClient for JsonRpcClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn send_raw_transaction(&self, tx: Transaction) -> Result<TxHash, RpcError> {
        let local_hash = tx.hash();
        let raw = hex::encode(tx.to_bytes());
        let result = self
            .call(METHOD_SEND_RAW_TRANSACTION, json!([raw]))
            .await?;
        let remote = expect_str(METHOD_SEND_RAW_TRANSACTION, &result)?;
        let hash = TxHash::from_hex_string(&remote).map_err(|err| RpcError::Malformed {
            method: METHOD_SEND_RAW_TRANSACTION,
            message: err.to_string(),
        })?;
        if hash != local_hash {
            debug!(
                target: "rpc",
                local = %local_hash,
                remote = %hash,
                "节点返回的交易哈希与本地计算不一致"
            );
        }
        Ok(hash)
    }

    async fn get_storage(&self, contract: &Address, key: &[u8]) -> Result<Vec<u8>, RpcError> {
        let result = self
            .call(
                METHOD_GET_STORAGE,
                json!([contract.to_hex_string(), hex::encode(key)]),
            )
            .await?;
        match result {
            Value::Null => Ok(Vec::new()),
            value => Ok(hex::decode(expect_str(METHOD_GET_STORAGE, &value)?)?),
        }
    }

    async fn get_block_count(&self) -> Result<u32, RpcError> {
        let result = self.call(METHOD_GET_BLOCK_COUNT, json!([])).await?;
        expect_u32(METHOD_GET_BLOCK_COUNT, &result)
    }

    async fn get_raw_block(&self, height: u32) -> Result<Vec<u8>, RpcError> {
        let result = self.call(METHOD_GET_BLOCK, json!([height])).await?;
        Ok(hex::decode(expect_str(METHOD_GET_BLOCK, &result)?)?)
    }

    async fn get_transaction_height(&self, hash: &TxHash) -> Result<Option<u32>, RpcError> {
        match self
            .call(METHOD_GET_TX_HEIGHT, json!([hash.to_hex_string()]))
            .await
        {
            Ok(Value::Null) => Ok(None),
            Ok(value) => expect_u32(METHOD_GET_TX_HEIGHT, &value).map(Some),
            Err(err) if err.code() == Some(codes::UNKNOWN_TRANSACTION) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_with_integer_error_code_parses() {
        let raw = r#"{"desc":"UNKNOWN TRANSACTION","error":44001,"id":1,"jsonrpc":"2.0","result":""}"#;
        let response: RpcResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            response.error,
            Some(RpcErrorField::Code(codes::UNKNOWN_TRANSACTION))
        ));
        assert_eq!(
            node_error_message(response.desc, &response.result),
            "UNKNOWN TRANSACTION"
        );
    }

    #[test]
    fn response_with_error_object_parses() {
        let raw = r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32601,"message":"method not found"}}"#;
        let response: RpcResponse = serde_json::from_str(raw).unwrap();
        match response.error {
            Some(RpcErrorField::Object(object)) => {
                assert_eq!(object.code, -32601);
                assert_eq!(object.message, "method not found");
            }
            other => panic!("unexpected error field: {other:?}"),
        }
        assert!(response.result.is_null());
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(JsonRpcClient::new("not a url", Duration::from_secs(1)).is_err());
    }
}
