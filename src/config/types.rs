use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub params: ParamsConfig,
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    /// 发送交易与后续审批之间的等待时间，0 表示不等待。
    #[serde(default = "super::default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "super::default_rpc_url")]
    pub url: String,
    #[serde(default = "super::default_rpc_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: super::default_rpc_url(),
            timeout_ms: super::default_rpc_timeout_ms(),
        }
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GasConfig {
    #[serde(default = "super::default_gas_price")]
    pub price: u64,
    #[serde(default = "super::default_gas_limit")]
    pub limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            price: super::default_gas_price(),
            limit: super::default_gas_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "super::default_password_env")]
    pub password_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            password: None,
            password_env: super::default_password_env(),
        }
    }
}

impl WalletConfig {
    /// 配置中的密码优先，其次读取环境变量。
    pub fn resolve_password(&self) -> Option<String> {
        self.password
            .as_ref()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| {
                std::env::var(&self.password_env)
                    .ok()
                    .filter(|value| !value.is_empty())
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamsConfig {
    #[serde(default = "super::default_side_chain_dir")]
    pub side_chain_dir: String,
    #[serde(default = "super::default_governance_dir")]
    pub governance_dir: String,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            side_chain_dir: super::default_side_chain_dir(),
            governance_dir: super::default_governance_dir(),
        }
    }
}

impl ParamsConfig {
    pub fn side_chain_path(&self) -> PathBuf {
        PathBuf::from(&self.side_chain_dir)
    }

    pub fn governance_path(&self) -> PathBuf {
        PathBuf::from(&self.governance_dir)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ConfirmationConfig {
    #[serde(default = "super::default_true")]
    pub enable: bool,
    #[serde(default = "super::default_confirmation_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "super::default_confirmation_initial_interval_ms")]
    pub initial_interval_ms: u64,
    #[serde(default = "super::default_confirmation_max_interval_ms")]
    pub max_interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            timeout_ms: super::default_confirmation_timeout_ms(),
            initial_interval_ms: super::default_confirmation_initial_interval_ms(),
            max_interval_ms: super::default_confirmation_max_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoggingProfile {
    #[default]
    Lean,
    Verbose,
}

impl LoggingProfile {
    pub fn is_verbose(self) -> bool {
        matches!(self, LoggingProfile::Verbose)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "super::default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default = "super::default_logging_profile")]
    pub profile: LoggingProfile,
    #[serde(default = "super::default_timezone_offset_hours")]
    pub timezone_offset_hours: i8,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: super::default_logging_level(),
            json: false,
            profile: super::default_logging_profile(),
            timezone_offset_hours: super::default_timezone_offset_hours(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("parse yaml");
        assert_eq!(config.rpc.url, "http://127.0.0.1:20336");
        assert_eq!(config.gas.price, 2_500);
        assert_eq!(config.gas.limit, 20_000);
        assert!(config.confirmation.enable);
        assert_eq!(config.settle_delay(), Duration::from_secs(1));
        assert_eq!(config.logging.profile, LoggingProfile::Lean);
        assert_eq!(config.wallet.password_env, "MERIDIAN_WALLET_PASSWORD");
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let yaml = "gas:\n  limit: 40000\nconfirmation:\n  enable: false\nlogging:\n  profile: verbose\n";
        let config: AppConfig = serde_yaml::from_str(yaml).expect("parse yaml");
        assert_eq!(config.gas.price, 2_500);
        assert_eq!(config.gas.limit, 40_000);
        assert!(!config.confirmation.enable);
        assert_eq!(config.confirmation.timeout_ms, 30_000);
        assert!(config.logging.profile.is_verbose());
    }

    #[test]
    fn inline_password_wins_over_env() {
        let wallet = WalletConfig {
            password: Some(" hunter2 ".to_string()),
            password_env: "MERIDIAN_TEST_UNSET_PASSWORD_VAR".to_string(),
        };
        assert_eq!(wallet.resolve_password().as_deref(), Some("hunter2"));

        let blank = WalletConfig {
            password: Some("   ".to_string()),
            password_env: "MERIDIAN_TEST_UNSET_PASSWORD_VAR".to_string(),
        };
        assert_eq!(blank.resolve_password(), None);
    }
}
