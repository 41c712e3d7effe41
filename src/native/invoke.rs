use thiserror::Error;
use tracing::{debug, info};

use super::NATIVE_INVOKE_VERSION;
use crate::account::{Account, Address, PublicKey};
use crate::codec::Encode;
use crate::rpc::{NodeClient, RpcError};
use crate::transaction::{
    Transaction, TransactionError, TxHash, multi_sign_threshold, multi_sign_to_transaction,
    sign_to_transaction,
};

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("未提供任何签名账户")]
    NoSigner,
    #[error("交易签名失败: {0}")]
    Sign(#[from] TransactionError),
    #[error("交易提交失败: {0}")]
    Submit(#[from] RpcError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    pub price: u64,
    pub limit: u64,
}

/// 交易的签名方式。
#[derive(Debug, Clone, Copy)]
pub enum SignerPolicy<'a> {
    /// 单账户签名，签名账户同时为付款人。
    Single(&'a Account),
    /// 委员会按 `pubkeys` 的顺序与门限逐一多签，随后提交者（若有）追加单签。
    MultiSign {
        pubkeys: &'a [PublicKey],
        committee: &'a [Account],
        submitter: Option<&'a Account>,
    },
    /// 以签名账户自身的公钥组成多签列表，所有账户按顺序签名。
    Committee { signers: &'a [Account] },
    /// 每个账户各追加一个单签条目。
    EachSigns { signers: &'a [Account] },
}

impl SignerPolicy<'_> {
    fn label(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::MultiSign { .. } => "multi_sign",
            Self::Committee { .. } => "committee",
            Self::EachSigns { .. } => "each_signs",
        }
    }

    fn apply(&self, tx: &mut Transaction) -> Result<(), TransactionError> {
        match *self {
            Self::Single(account) => sign_to_transaction(tx, account),
            Self::MultiSign {
                pubkeys,
                committee,
                submitter,
            } => {
                collect_committee(tx, pubkeys, committee)?;
                match submitter {
                    Some(account) => sign_to_transaction(tx, account),
                    None => Ok(()),
                }
            }
            Self::Committee { signers } => {
                let pubkeys: Vec<PublicKey> =
                    signers.iter().map(|a| a.public_key().clone()).collect();
                collect_committee(tx, &pubkeys, signers)
            }
            Self::EachSigns { signers } => signers
                .iter()
                .try_for_each(|account| sign_to_transaction(tx, account)),
        }
    }
}

fn collect_committee(
    tx: &mut Transaction,
    pubkeys: &[PublicKey],
    committee: &[Account],
) -> Result<(), TransactionError> {
    let m = multi_sign_threshold(pubkeys.len());
    for member in committee {
        multi_sign_to_transaction(tx, m, pubkeys, member)?;
    }
    Ok(())
}

/// 构建、签名并提交一笔原生合约调用。
///
/// 所有签名完成后才会发出网络请求，任何一步失败都不会提交交易。
pub async fn invoke_native(
    client: &dyn NodeClient,
    gas: GasSettings,
    contract: Address,
    method: &str,
    params: &[&(dyn Encode + Sync)],
    policy: SignerPolicy<'_>,
) -> Result<TxHash, InvokeError> {
    let mut tx = Transaction::new_native_invoke(
        gas.price,
        gas.limit,
        NATIVE_INVOKE_VERSION,
        contract,
        method,
        params,
    );
    policy.apply(&mut tx)?;
    if !tx.is_signed() {
        return Err(InvokeError::NoSigner);
    }
    debug!(
        target: "native::invoke",
        method,
        contract = %contract.to_hex_string(),
        policy = policy.label(),
        sig_entries = tx.sigs().len(),
        payer = %tx.payer(),
        "交易签名完成"
    );

    let hash = client.send_raw_transaction(tx).await?;
    info!(
        target: "native::invoke",
        method,
        tx_hash = %hash,
        "交易已提交"
    );
    Ok(hash)
}

/// 委员会多签后由提交者单签提交，门限为 `ceil(5N / 7)`。
#[allow(clippy::too_many_arguments)]
pub async fn invoke_with_multi_sign(
    client: &dyn NodeClient,
    gas: GasSettings,
    pubkeys: &[PublicKey],
    committee: &[Account],
    submitter: &Account,
    contract: Address,
    method: &str,
    params: &[&(dyn Encode + Sync)],
) -> Result<TxHash, InvokeError> {
    invoke_native(
        client,
        gas,
        contract,
        method,
        params,
        SignerPolicy::MultiSign {
            pubkeys,
            committee,
            submitter: Some(submitter),
        },
    )
    .await
}
