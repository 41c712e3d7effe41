use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::AppConfig;

pub const DEFAULT_CONFIG_PATHS: &[&str] =
    &["meridian.yaml", "config/meridian.yaml", "meridian.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置失败 {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("解析 YAML 配置失败 {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("解析 TOML 配置失败 {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("配置项非法: {0}")]
    Invalid(String),
}

pub fn load_config(path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let candidate_paths = match path {
        Some(p) => vec![p],
        None => DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<PathBuf>>(),
    };

    for candidate in candidate_paths {
        if let Some(config) = try_load_file(&candidate)? {
            debug!(target: "config", path = %candidate.display(), "已加载配置文件");
            return Ok(config);
        }
    }

    debug!(target: "config", "未找到配置文件，使用默认配置");
    Ok(AppConfig::default())
}

fn try_load_file(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: AppConfig = if is_toml {
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    };

    validate(&config)?;
    Ok(Some(config))
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.rpc.url.trim().is_empty() {
        return Err(ConfigError::Invalid("rpc.url 不能为空".to_string()));
    }
    if config.gas.limit == 0 {
        return Err(ConfigError::Invalid("gas.limit 不能为 0".to_string()));
    }
    if config.confirmation.enable && config.confirmation.timeout_ms == 0 {
        return Err(ConfigError::Invalid(
            "confirmation.timeout_ms 为 0 时请关闭 confirmation.enable".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config.settle_delay_ms, 1_000);
    }

    #[test]
    fn toml_file_is_parsed_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meridian.toml");
        fs::write(&path, "settle_delay_ms = 0\n[rpc]\nurl = \"http://10.0.0.1:20336\"\n").unwrap();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.settle_delay_ms, 0);
        assert_eq!(config.rpc.url, "http://10.0.0.1:20336");
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meridian.yaml");
        fs::write(&path, "rpc: [unclosed\n").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
        assert!(err.to_string().contains("meridian.yaml"));
    }

    #[test]
    fn zero_gas_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meridian.yaml");
        fs::write(&path, "gas:\n  limit: 0\n").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
