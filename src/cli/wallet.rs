use anyhow::{Result, anyhow, bail};

use crate::account::Account;
use crate::cli::args::{WalletCmd, WalletNewArgs, WalletShowArgs};
use crate::config::AppConfig;
use crate::wallet::Keystore;

pub fn handle_wallet_command(cmd: &WalletCmd, config: &AppConfig) -> Result<()> {
    match cmd {
        WalletCmd::New(args) => handle_wallet_new(args, config),
        WalletCmd::Show(args) => handle_wallet_show(args, config),
    }
}

fn require_password(config: &AppConfig) -> Result<String> {
    config.wallet.resolve_password().ok_or_else(|| {
        anyhow!(
            "未配置钱包密码，请在配置文件中设置 wallet.password 或环境变量 {}",
            config.wallet.password_env
        )
    })
}

fn handle_wallet_new(args: &WalletNewArgs, config: &AppConfig) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "钱包文件已存在: {}（如需覆盖请加 --force）",
            args.output.display()
        );
    }
    let password = require_password(config)?;
    let account = Account::generate();
    Keystore::seal(&account, &args.remark, &password)?.save(&args.output)?;

    println!("🔐 已生成钱包 {}", args.output.display());
    println!("地址：{}", account.address());
    println!("公钥：{}", account.public_key().to_hex());
    Ok(())
}

fn handle_wallet_show(args: &WalletShowArgs, config: &AppConfig) -> Result<()> {
    let keystore = Keystore::load(&args.path)?;
    if !keystore.remark.is_empty() {
        println!("备注：{}", keystore.remark);
    }
    println!("地址：{}", keystore.address);
    println!("公钥：{}", keystore.public_key);

    if args.verify {
        let password = require_password(config)?;
        keystore.unseal(&password)?;
        println!("密码校验通过");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_wallet_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("peer.json");
        std::fs::write(&output, "{}").unwrap();

        let mut config = AppConfig::default();
        config.wallet.password = Some("pw".to_string());
        let args = WalletNewArgs {
            output: output.clone(),
            remark: String::new(),
            force: false,
        };
        assert!(handle_wallet_new(&args, &config).is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "{}");
    }
}
