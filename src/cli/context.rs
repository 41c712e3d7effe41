use std::fs;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use time::{UtcOffset, macros::format_description};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::args::InitCmd;
use crate::config::{AppConfig, ConfigError, LoggingConfig, LoggingProfile, load_config};

/// 初始化 tracing，兼顾 JSON 与文本输出模式。
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let mut filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // 默认压低 HTTP 客户端的调试输出；Verbose 模式打开交易与存储细节。
    if matches!(config.profile, LoggingProfile::Lean) {
        const QUIET_TARGETS: &[(&str, &str)] = &[
            ("hyper", "warn"),
            ("hyper_util::client::legacy", "warn"),
            ("reqwest", "info"),
        ];
        for (module, level) in QUIET_TARGETS {
            if !config.level.contains(module) {
                if let Ok(directive) = format!("{module}={level}").parse() {
                    filter = filter.add_directive(directive);
                }
            }
        }
    }

    if matches!(config.profile, LoggingProfile::Verbose) {
        const VERBOSE_TARGETS: &[(&str, &str)] = &[
            ("scenario", "debug"),
            ("native::invoke", "debug"),
            ("rpc", "debug"),
            ("storage", "debug"),
            ("wallet", "debug"),
        ];
        for (module, level) in VERBOSE_TARGETS {
            if let Ok(directive) = format!("{module}={level}").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    let time_format =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");
    let offset = UtcOffset::from_hms(config.timezone_offset_hours, 0, 0).map_err(|err| {
        anyhow!(
            "日志时区偏移非法 {}: {err}",
            config.timezone_offset_hours
        )
    })?;
    let offset_timer = OffsetTime::new(offset, time_format);

    let base = fmt()
        .with_timer(offset_timer)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true)
        .with_level(true);

    if config.json {
        base.json()
            .with_current_span(false)
            .with_span_list(false)
            .with_env_filter(filter)
            .try_init()
            .map_err(|err| anyhow!(err.to_string()))?;
    } else {
        base.with_env_filter(filter)
            .event_format(fmt::format().compact())
            .try_init()
            .map_err(|err| anyhow!(err.to_string()))?;
    }
    Ok(())
}

/// 加载主配置；用于 `meridian --config` 的入口。
pub fn load_configuration(path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    load_config(path)
}

pub fn init_configs(args: InitCmd) -> Result<()> {
    let output_dir = match args.output {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    fs::create_dir_all(&output_dir)?;

    let templates: [(&str, &str); 1] = [(
        "meridian.yaml",
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/meridian.yaml")),
    )];

    for (filename, contents) in templates {
        let target_path = output_dir.join(filename);
        if target_path.exists() && !args.force {
            println!(
                "跳过 {}（文件已存在，如需覆盖请加 --force）",
                target_path.display()
            );
            continue;
        }

        fs::write(&target_path, contents)?;
        println!("已写入 {}", target_path.display());
    }

    for dir in ["side_chain_params", "governance_params"] {
        fs::create_dir_all(output_dir.join(dir))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_template_and_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("meridian.yaml");

        init_configs(InitCmd {
            output: Some(dir.path().to_path_buf()),
            force: false,
        })
        .unwrap();
        let written = fs::read_to_string(&target).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&written).unwrap();
        assert_eq!(parsed.rpc.url, "http://127.0.0.1:20336");
        assert!(dir.path().join("governance_params").is_dir());

        fs::write(&target, "settle_delay_ms: 5\n").unwrap();
        init_configs(InitCmd {
            output: Some(dir.path().to_path_buf()),
            force: false,
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "settle_delay_ms: 5\n");

        init_configs(InitCmd {
            output: Some(dir.path().to_path_buf()),
            force: true,
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), written);
    }
}
