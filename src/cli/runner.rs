use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::args::{Cli, Command};
use crate::cli::context::init_configs;
use crate::cli::wallet::handle_wallet_command;
use crate::config::AppConfig;
use crate::scenario::{ScenarioContext, ScenarioRegistry};

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let registry = ScenarioRegistry::standard();
    dispatch(cli.command, config, &registry).await
}

async fn dispatch(command: Command, config: AppConfig, registry: &ScenarioRegistry) -> Result<()> {
    match command {
        Command::List(cmd) => {
            list_scenarios(registry, cmd.group.as_deref());
        }
        Command::Run(cmd) => {
            run_scenarios(registry, &config, &cmd.names).await?;
        }
        Command::Wallet(cmd) => {
            handle_wallet_command(&cmd, &config)?;
        }
        Command::Init(args) => {
            init_configs(args)?;
        }
    }

    Ok(())
}

fn list_scenarios(registry: &ScenarioRegistry, group: Option<&str>) {
    let width = registry.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for scenario in registry
        .iter()
        .filter(|s| group.is_none_or(|group| s.group == group))
    {
        println!(
            "{:<width$}  [{}]  {}",
            scenario.name, scenario.group, scenario.description
        );
    }
}

async fn run_scenarios(
    registry: &ScenarioRegistry,
    config: &AppConfig,
    names: &[String],
) -> Result<()> {
    let unknown: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| registry.get(name).is_none())
        .collect();
    if !unknown.is_empty() {
        warn!(target: "scenario", ?unknown, "存在未注册的场景，执行 `meridian list` 查看可用场景");
    }

    let ctx = ScenarioContext::from_config(config)?;
    info!(
        target: "scenario",
        rpc = ctx.client().endpoint(),
        count = names.len(),
        "开始执行场景"
    );
    let summary = registry.run_all(names, &ctx).await;
    info!(
        target: "scenario",
        passed = summary.passed.len(),
        failed = summary.failed.len(),
        "场景执行完毕"
    );

    if !summary.is_success() {
        bail!(
            "{} 个场景失败: {}",
            summary.failed.len(),
            summary.failed.join(", ")
        );
    }
    Ok(())
}
