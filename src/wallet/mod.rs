//! 钱包文件：以密码加密保存的账户私钥。
//!
//! 文件为 JSON，`encrypted` 字段为 Base64 编码的
//! `MAGIC ‖ 版本 ‖ salt ‖ nonce ‖ AES-256-GCM 密文`，密钥由 Argon2id 派生。

use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::account::Account;

const MAGIC: &[u8; 8] = b"MRDNKEYS";
const FORMAT_VERSION: u8 = 1;
const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("读取钱包文件失败 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("钱包文件格式错误 {path}: {message}")]
    Format { path: PathBuf, message: String },
    #[error("加解密失败: {0}")]
    Crypto(String),
    #[error("钱包密码错误或数据已损坏")]
    WrongPassword,
    #[error("钱包地址不匹配: 文件记录 {expected}，私钥推导 {actual}")]
    AddressMismatch { expected: String, actual: String },
}

/// Argon2id 参数，随密文一同保存。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 128 * 1024,
            iterations: 3,
            parallelism: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystore {
    #[serde(default)]
    pub remark: String,
    pub public_key: String,
    pub address: String,
    pub encrypted: String,
    #[serde(default)]
    pub kdf: KdfParams,
}

impl Keystore {
    pub fn seal(account: &Account, remark: &str, password: &str) -> Result<Self, WalletError> {
        Self::seal_with(account, remark, password, KdfParams::default())
    }

    pub fn seal_with(
        account: &Account,
        remark: &str,
        password: &str,
        kdf: KdfParams,
    ) -> Result<Self, WalletError> {
        let mut secret = account.secret_bytes();
        let sealed = encrypt_secret(&secret, password, &kdf);
        secret.zeroize();
        Ok(Self {
            remark: remark.to_string(),
            public_key: account.public_key().to_hex(),
            address: account.address().to_base58(),
            encrypted: general_purpose::STANDARD.encode(sealed?),
            kdf,
        })
    }

    pub fn unseal(&self, password: &str) -> Result<Account, WalletError> {
        let data = general_purpose::STANDARD
            .decode(self.encrypted.trim().as_bytes())
            .map_err(|err| WalletError::Crypto(format!("Base64 解码失败: {err}")))?;
        let plaintext = decrypt_secret(&data, password, &self.kdf)?;
        if plaintext.len() != SECRET_LEN {
            return Err(WalletError::Crypto(format!(
                "私钥长度应为 {SECRET_LEN}，实际 {}",
                plaintext.len()
            )));
        }
        let mut secret = [0u8; SECRET_LEN];
        secret.copy_from_slice(&plaintext);
        let account = Account::from_secret_bytes(secret);
        secret.zeroize();

        let actual = account.address().to_base58();
        if actual != self.address {
            return Err(WalletError::AddressMismatch {
                expected: self.address.clone(),
                actual,
            });
        }
        Ok(account)
    }

    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let content = fs::read_to_string(path).map_err(|source| WalletError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|err| WalletError::Format {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let content = serde_json::to_string_pretty(self).map_err(|err| WalletError::Format {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| WalletError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| WalletError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 打开钱包文件并解密出账户。
pub fn load_account(path: &Path, password: &str) -> Result<Account, WalletError> {
    let keystore = Keystore::load(path)?;
    let account = keystore.unseal(password)?;
    debug!(
        target: "wallet",
        path = %path.display(),
        address = %account.address(),
        "钱包已解锁"
    );
    Ok(account)
}

fn encrypt_secret(
    plaintext: &[u8],
    password: &str,
    kdf: &KdfParams,
) -> Result<Vec<u8>, WalletError> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let mut encryption_key = derive_encryption_key(password, &salt, kdf)?;
    let cipher = Aes256Gcm::new_from_slice(&encryption_key)
        .map_err(|err| WalletError::Crypto(format!("初始化加密器失败: {err}")))?;
    encryption_key.zeroize();

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|err| WalletError::Crypto(format!("加密私钥失败: {err}")))?;

    let mut data = Vec::with_capacity(MAGIC.len() + 1 + SALT_SIZE + NONCE_SIZE + ciphertext.len());
    data.extend_from_slice(MAGIC);
    data.push(FORMAT_VERSION);
    data.extend_from_slice(&salt);
    data.extend_from_slice(&nonce);
    data.extend_from_slice(&ciphertext);
    Ok(data)
}

fn decrypt_secret(
    data: &[u8],
    password: &str,
    kdf: &KdfParams,
) -> Result<Zeroizing<Vec<u8>>, WalletError> {
    let header_len = MAGIC.len() + 1;
    if data.len() < header_len + SALT_SIZE + NONCE_SIZE {
        return Err(WalletError::Crypto("密文长度不足".to_string()));
    }

    let (magic, rest) = data.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(WalletError::Crypto("未知的钱包密文格式".to_string()));
    }
    let version = rest[0];
    if version != FORMAT_VERSION {
        return Err(WalletError::Crypto(format!("不支持的钱包密文版本: {version}")));
    }
    let rest = &rest[1..];

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&rest[..SALT_SIZE]);
    let nonce = &rest[SALT_SIZE..SALT_SIZE + NONCE_SIZE];
    let ciphertext = &rest[SALT_SIZE + NONCE_SIZE..];

    let mut encryption_key = derive_encryption_key(password, &salt, kdf)?;
    let cipher = Aes256Gcm::new_from_slice(&encryption_key)
        .map_err(|err| WalletError::Crypto(format!("初始化解密器失败: {err}")))?;
    encryption_key.zeroize();

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| WalletError::WrongPassword)
}

fn derive_encryption_key(
    password: &str,
    salt: &[u8; SALT_SIZE],
    kdf: &KdfParams,
) -> Result<[u8; 32], WalletError> {
    let params = Params::new(kdf.memory_kib, kdf.iterations, kdf.parallelism, Some(32))
        .map_err(|err| WalletError::Crypto(format!("Argon2 参数无效: {err}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut key = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|err| WalletError::Crypto(format!("派生加密密钥失败: {err}")))?;
    Ok(key)
}
