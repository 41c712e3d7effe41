use crate::account::{Account, Address, PublicKey};

use super::{MAX_SIG_ENTRIES, Sig, Transaction, TransactionError};

/// 治理多签门限：`ceil(5N / 7)`。
pub fn multi_sign_threshold(key_count: usize) -> u16 {
    ((5 * key_count + 6) / 7) as u16
}

/// 追加单签条目。交易尚未设置付款人时以签名账户为付款人。
pub fn sign_to_transaction(tx: &mut Transaction, account: &Account) -> Result<(), TransactionError> {
    if tx.sigs().len() >= MAX_SIG_ENTRIES {
        return Err(TransactionError::TooManySigEntries);
    }
    tx.set_payer_if_unset(account.address());
    let signature = account.sign(tx.hash().as_bytes());
    tx.sigs_mut().push(Sig {
        m: 1,
        pubkeys: vec![account.public_key().clone()],
        sig_data: vec![signature],
    });
    Ok(())
}

/// 以 `(m, pubkeys)` 多签策略追加一份签名。
///
/// 同一 `(m, pubkeys)` 的签名汇聚到同一个条目中；公钥列表按给定顺序比较，
/// 所有委员必须使用完全相同的有序列表与门限，否则会产生新的条目与不同的聚合地址。
/// 条目最多容纳 `pubkeys.len()` 份签名，同一账户重复签名时不再追加。
/// 不校验 `account` 是否属于 `pubkeys`。
pub fn multi_sign_to_transaction(
    tx: &mut Transaction,
    m: u16,
    pubkeys: &[PublicKey],
    account: &Account,
) -> Result<(), TransactionError> {
    let aggregate = Address::from_multi_public_keys(pubkeys, m)?;
    tx.set_payer_if_unset(aggregate);
    // ed25519 签名是确定性的，同一账户对同一哈希的签名字节相同
    let signature = account.sign(tx.hash().as_bytes());

    if let Some(entry) = tx
        .sigs_mut()
        .iter_mut()
        .find(|entry| entry.m == m && entry.pubkeys == pubkeys)
    {
        if entry.sig_data.contains(&signature) {
            return Ok(());
        }
        if entry.sig_data.len() >= pubkeys.len() {
            return Err(TransactionError::TooManySignatures { n: pubkeys.len() });
        }
        entry.sig_data.push(signature);
        return Ok(());
    }

    if tx.sigs().len() >= MAX_SIG_ENTRIES {
        return Err(TransactionError::TooManySigEntries);
    }
    tx.sigs_mut().push(Sig {
        m,
        pubkeys: pubkeys.to_vec(),
        sig_data: vec![signature],
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committee(count: u8) -> Vec<Account> {
        (1..=count)
            .map(|seed| Account::from_secret_bytes([seed; 32]))
            .collect()
    }

    fn commit_tx() -> Transaction {
        Transaction::new_native_invoke(500, 20_000, 0, Address::native(7), "commitDpos", &[])
    }

    #[test]
    fn threshold_is_five_sevenths_rounded_up() {
        assert_eq!(multi_sign_threshold(1), 1);
        assert_eq!(multi_sign_threshold(2), 2);
        assert_eq!(multi_sign_threshold(4), 3);
        assert_eq!(multi_sign_threshold(7), 5);
        assert_eq!(multi_sign_threshold(10), 8);
        assert_eq!(multi_sign_threshold(14), 10);
    }

    #[test]
    fn committee_signatures_collect_into_one_entry() {
        let members = committee(7);
        let pubkeys: Vec<PublicKey> = members.iter().map(|a| a.public_key().clone()).collect();
        let m = multi_sign_threshold(pubkeys.len());
        let mut tx = commit_tx();
        for member in members.iter().take(5) {
            multi_sign_to_transaction(&mut tx, m, &pubkeys, member).unwrap();
        }
        assert_eq!(tx.sigs().len(), 1);
        assert_eq!(tx.sigs()[0].sig_data.len(), 5);
        assert_eq!(
            tx.payer(),
            Address::from_multi_public_keys(&pubkeys, m).unwrap()
        );
    }

    #[test]
    fn every_committee_member_may_sign() {
        let members = committee(7);
        let pubkeys: Vec<PublicKey> = members.iter().map(|a| a.public_key().clone()).collect();
        let m = multi_sign_threshold(pubkeys.len());
        let mut tx = commit_tx();
        for member in &members {
            multi_sign_to_transaction(&mut tx, m, &pubkeys, member).unwrap();
        }
        assert_eq!(tx.sigs().len(), 1);
        assert_eq!(tx.sigs()[0].sig_data.len(), 7);

        // 超出公钥数量的签名无处可放
        let outsider = Account::from_secret_bytes([99u8; 32]);
        let err = multi_sign_to_transaction(&mut tx, m, &pubkeys, &outsider).unwrap_err();
        assert!(matches!(err, TransactionError::TooManySignatures { n: 7 }));
    }

    #[test]
    fn duplicate_signer_is_counted_once() {
        let members = committee(3);
        let pubkeys: Vec<PublicKey> = members.iter().map(|a| a.public_key().clone()).collect();
        let mut tx = commit_tx();
        multi_sign_to_transaction(&mut tx, 2, &pubkeys, &members[0]).unwrap();
        multi_sign_to_transaction(&mut tx, 2, &pubkeys, &members[0]).unwrap();
        assert_eq!(tx.sigs()[0].sig_data.len(), 1);

        multi_sign_to_transaction(&mut tx, 2, &pubkeys, &members[1]).unwrap();
        assert_eq!(tx.sigs()[0].sig_data.len(), 2);
    }

    #[test]
    fn reordered_key_list_does_not_match_declared_address() {
        let members = committee(7);
        let declared: Vec<PublicKey> = members.iter().map(|a| a.public_key().clone()).collect();
        let m = multi_sign_threshold(declared.len());
        let expected = Address::from_multi_public_keys(&declared, m).unwrap();

        let mut reordered = declared.clone();
        reordered.reverse();
        let mut tx = commit_tx();
        for member in members.iter().take(5) {
            multi_sign_to_transaction(&mut tx, m, &reordered, member).unwrap();
        }

        let signers = tx.signer_addresses().unwrap();
        assert_eq!(signers.len(), 1);
        assert_ne!(signers[0], expected);
        assert_ne!(tx.payer(), expected);
    }

    #[test]
    fn submitter_signature_is_appended_last() {
        let members = committee(4);
        let submitter = Account::from_secret_bytes([42u8; 32]);
        let pubkeys: Vec<PublicKey> = members.iter().map(|a| a.public_key().clone()).collect();
        let m = multi_sign_threshold(pubkeys.len());
        let mut tx = commit_tx();
        for member in members.iter().take(usize::from(m)) {
            multi_sign_to_transaction(&mut tx, m, &pubkeys, member).unwrap();
        }
        sign_to_transaction(&mut tx, &submitter).unwrap();

        let signers = tx.signer_addresses().unwrap();
        assert_eq!(signers.last(), Some(&submitter.address()));
        // 付款人已由多签设定，单签不会覆盖
        assert_eq!(
            tx.payer(),
            Address::from_multi_public_keys(&pubkeys, m).unwrap()
        );
    }
}
