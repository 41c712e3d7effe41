pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

use self::types as cfg;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_rpc_url() -> String {
    "http://127.0.0.1:20336".to_string()
}

pub(crate) fn default_rpc_timeout_ms() -> u64 {
    10_000
}

pub(crate) fn default_gas_price() -> u64 {
    2_500
}

pub(crate) fn default_gas_limit() -> u64 {
    20_000
}

pub(crate) fn default_password_env() -> String {
    "MERIDIAN_WALLET_PASSWORD".to_string()
}

pub(crate) fn default_side_chain_dir() -> String {
    "./side_chain_params".to_string()
}

pub(crate) fn default_governance_dir() -> String {
    "./governance_params".to_string()
}

pub(crate) fn default_confirmation_timeout_ms() -> u64 {
    30_000
}

pub(crate) fn default_confirmation_initial_interval_ms() -> u64 {
    500
}

pub(crate) fn default_confirmation_max_interval_ms() -> u64 {
    4_000
}

pub(crate) fn default_settle_delay_ms() -> u64 {
    1_000
}

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_logging_profile() -> cfg::LoggingProfile {
    cfg::LoggingProfile::Lean
}

pub(crate) fn default_timezone_offset_hours() -> i8 {
    0
}
