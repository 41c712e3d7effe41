//! 参数文件驱动的测试场景。
//!
//! 每个场景读取 `<参数目录>/<场景名>.json`，解锁钱包，构建并提交原生合约调用，
//! 再等待交易确认。场景在启动时统一注册到 [`ScenarioRegistry`]。

pub mod context;
pub mod governance;
pub mod registry;
pub mod side_chain;
pub mod wait;

#[cfg(test)]
mod tests;

pub use context::{Committee, ScenarioContext, Signers};
pub use registry::{RunSummary, Scenario, ScenarioFn, ScenarioRegistry};
pub use wait::{Confirmation, ConfirmationError, ConfirmationPolicy, wait_for_confirmation};
