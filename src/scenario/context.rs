use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::wait::{Confirmation, ConfirmationPolicy, wait_for_confirmation};
use crate::account::{Account, Address, PublicKey};
use crate::codec::Encode;
use crate::config::AppConfig;
use crate::native::{GasSettings, SignerPolicy, invoke_native, invoke_with_multi_sign};
use crate::rpc::{JsonRpcClient, NodeClient};
use crate::transaction::{TxHash, multi_sign_threshold};
use crate::wallet;

/// 参数文件中的签名账户描述，随各场景参数一同展开。
///
/// `Committee` 为真时由 `Path` 中的账户按 `PubKeys`（缺省为这些账户自身的公钥）
/// 组成多签，`Submitter` 追加单签；否则 `Path` 中每个账户各自提交一笔交易。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Signers {
    pub path: Vec<String>,
    #[serde(default)]
    pub committee: bool,
    #[serde(default)]
    pub pub_keys: Vec<String>,
    #[serde(default)]
    pub submitter: Option<String>,
}

/// 解析完成的多签委员会。
pub struct Committee {
    pub pubkeys: Vec<PublicKey>,
    pub members: Vec<Account>,
    pub submitter: Option<Account>,
    pub address: Address,
}

impl Committee {
    pub fn policy(&self) -> SignerPolicy<'_> {
        SignerPolicy::MultiSign {
            pubkeys: &self.pubkeys,
            committee: &self.members,
            submitter: self.submitter.as_ref(),
        }
    }

    /// 作为调用者身份的地址：有提交者时为提交者，否则为多签地址。
    pub fn caller(&self) -> Address {
        self.submitter
            .as_ref()
            .map(Account::address)
            .unwrap_or(self.address)
    }
}

/// 场景运行所需的全部依赖：节点连接、Gas、钱包密码、参数目录与确认策略。
pub struct ScenarioContext {
    client: Arc<dyn NodeClient>,
    gas: GasSettings,
    password: Option<String>,
    side_chain_dir: PathBuf,
    governance_dir: PathBuf,
    confirmation: ConfirmationPolicy,
    settle_delay: Duration,
    rpc_timeout: Duration,
    side_chains: HashMap<String, Arc<dyn NodeClient>>,
}

impl ScenarioContext {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = JsonRpcClient::new(&config.rpc.url, config.rpc.timeout())
            .with_context(|| format!("创建 RPC 客户端失败: {}", config.rpc.url))?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn new(client: Arc<dyn NodeClient>, config: &AppConfig) -> Self {
        Self {
            client,
            gas: GasSettings {
                price: config.gas.price,
                limit: config.gas.limit,
            },
            password: config.wallet.resolve_password(),
            side_chain_dir: config.params.side_chain_path(),
            governance_dir: config.params.governance_path(),
            confirmation: ConfirmationPolicy::from(&config.confirmation),
            settle_delay: config.settle_delay(),
            rpc_timeout: config.rpc.timeout(),
            side_chains: HashMap::new(),
        }
    }

    /// 为指定地址的侧链预先提供客户端，取代按地址新建的 JSON-RPC 连接。
    pub fn with_side_chain(mut self, url: impl Into<String>, client: Arc<dyn NodeClient>) -> Self {
        self.side_chains.insert(url.into(), client);
        self
    }

    pub fn with_confirmation(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation = policy;
        self
    }

    pub fn client(&self) -> &dyn NodeClient {
        self.client.as_ref()
    }

    pub fn gas(&self) -> GasSettings {
        self.gas
    }

    pub fn side_chain_params<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        read_params(&self.side_chain_dir, name)
    }

    pub fn governance_params<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        read_params(&self.governance_dir, name)
    }

    pub fn account(&self, path: &str) -> Result<Account> {
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| anyhow!("未配置钱包密码 (wallet.password 或 wallet.password_env)"))?;
        wallet::load_account(Path::new(path), password)
            .with_context(|| format!("打开钱包失败: {path}"))
    }

    pub fn accounts(&self, paths: &[String]) -> Result<Vec<Account>> {
        paths.iter().map(|path| self.account(path)).collect()
    }

    pub fn committee(&self, signers: &Signers) -> Result<Committee> {
        let members = self.accounts(&signers.path)?;
        let pubkeys = if signers.pub_keys.is_empty() {
            members.iter().map(|a| a.public_key().clone()).collect()
        } else {
            signers
                .pub_keys
                .iter()
                .map(|key| {
                    PublicKey::from_hex(key).with_context(|| format!("公钥格式错误: {key}"))
                })
                .collect::<Result<Vec<_>>>()?
        };
        if pubkeys.is_empty() {
            bail!("多签公钥列表为空");
        }
        let address = Address::from_multi_public_keys(&pubkeys, multi_sign_threshold(pubkeys.len()))
            .context("计算多签地址失败")?;
        let submitter = signers
            .submitter
            .as_deref()
            .map(|path| self.account(path))
            .transpose()?;
        debug!(
            target: "scenario",
            keys = pubkeys.len(),
            members = members.len(),
            address = %address,
            "多签委员会已解析"
        );
        Ok(Committee {
            pubkeys,
            members,
            submitter,
            address,
        })
    }

    /// 多方流程开始前的等待，让前一笔交易有机会被打包。
    pub async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }

    pub async fn invoke(
        &self,
        contract: Address,
        method: &str,
        params: &[&(dyn Encode + Sync)],
        policy: SignerPolicy<'_>,
    ) -> Result<TxHash> {
        invoke_native(self.client(), self.gas, contract, method, params, policy)
            .await
            .with_context(|| format!("调用 {method} 失败"))
    }

    /// 以委员会多签提交；有提交者时由提交者追加单签。
    pub async fn invoke_committee(
        &self,
        committee: &Committee,
        contract: Address,
        method: &str,
        params: &[&(dyn Encode + Sync)],
    ) -> Result<TxHash> {
        let Some(submitter) = committee.submitter.as_ref() else {
            return self.invoke(contract, method, params, committee.policy()).await;
        };
        invoke_with_multi_sign(
            self.client(),
            self.gas,
            &committee.pubkeys,
            &committee.members,
            submitter,
            contract,
            method,
            params,
        )
        .await
        .with_context(|| format!("调用 {method} 失败"))
    }

    /// 每个账户分别以自身签名提交一笔交易，`build` 接收该账户地址。
    pub async fn invoke_each<P, F>(
        &self,
        accounts: &[Account],
        contract: Address,
        method: &str,
        build: F,
    ) -> Result<Vec<TxHash>>
    where
        P: Encode + Send + Sync,
        F: Fn(Address) -> P + Send + Sync,
    {
        let mut hashes = Vec::with_capacity(accounts.len());
        for account in accounts {
            let param = build(account.address());
            let hash = self
                .invoke(contract, method, &[&param], SignerPolicy::Single(account))
                .await?;
            hashes.push(hash);
        }
        Ok(hashes)
    }

    pub async fn confirm(&self, hash: &TxHash) -> Result<()> {
        match wait_for_confirmation(self.client(), hash, &self.confirmation).await? {
            Confirmation::AtHeight(height) => {
                info!(target: "scenario", tx_hash = %hash, height, "交易已落块");
            }
            Confirmation::BlockAdvanced(count) => {
                info!(target: "scenario", tx_hash = %hash, block_count = count, "区块已前进");
            }
            Confirmation::Skipped => {}
        }
        Ok(())
    }

    pub async fn confirm_all(&self, hashes: &[TxHash]) -> Result<()> {
        for hash in hashes {
            self.confirm(hash).await?;
        }
        Ok(())
    }

    pub fn side_chain_client(&self, url: &str) -> Result<Arc<dyn NodeClient>> {
        if let Some(client) = self.side_chains.get(url) {
            return Ok(Arc::clone(client));
        }
        let client = JsonRpcClient::new(url, self.rpc_timeout)
            .with_context(|| format!("创建侧链 RPC 客户端失败: {url}"))?;
        Ok(Arc::new(client))
    }
}

fn read_params<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let path = dir.join(format!("{name}.json"));
    let data =
        fs::read_to_string(&path).with_context(|| format!("读取参数文件失败: {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("解析参数文件失败: {}", path.display()))
}
