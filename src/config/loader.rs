//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, PersistenceKind};
use crate::infrastructure::adapters::KNOWN_BACKENDS;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `CLONEVOX_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `CLONEVOX_SERVER__PORT=9000`
/// - `CLONEVOX_BACKENDS__ACTIVE=openvoice`
/// - `CLONEVOX_BACKENDS__XTTS__URL=http://gpu-box:8801`
/// - `CLONEVOX_SPEAKERS__PERSISTENCE=memory`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8765)?
        .set_default("server.max_upload_size", 50 * 1024 * 1024)?
        .set_default("backends.active", "xtts")?
        .set_default("backends.wide_language_backend", "xtts")?
        .set_default("backends.fake", false)?
        .set_default("synthesis.language", "en")?
        .set_default("synthesis.chunk_size", 200)?
        .set_default("synthesis.chunk_min_seconds", 2.0)?
        .set_default("synthesis.chunk_retries", 0)?
        .set_default("synthesis.max_text_chars", 5000)?
        .set_default("speakers.storage_dir", "data/speakers")?
        .set_default("speakers.persistence", "sqlite")?
        .set_default("speakers.min_duration_secs", 3.0)?
        .set_default("speakers.max_duration_secs", 60.0)?
        .set_default("database.path", "data/clonevox.db")?
        .set_default("database.max_connections", 5)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: CLONEVOX_BACKENDS__XTTS__URL=http://gpu-box:8801
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("CLONEVOX")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

fn ensure_known_backend(field: &str, name: &str) -> Result<(), ConfigError> {
    if KNOWN_BACKENDS.contains(&name.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} refers to unknown backend \"{}\" (known: {})",
            field,
            name,
            KNOWN_BACKENDS.join(", ")
        )))
    }
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    let backends = &config.backends;
    ensure_known_backend("backends.active", &backends.active)?;
    ensure_known_backend("backends.wide_language_backend", &backends.wide_language_backend)?;
    for name in &backends.priority {
        ensure_known_backend("backends.priority", name)?;
    }
    for name in KNOWN_BACKENDS {
        if let Some(endpoint) = backends.endpoint(name) {
            if endpoint.enabled && endpoint.url.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "backends.{}.url cannot be empty when enabled",
                    name
                )));
            }
        }
    }

    let speakers = &config.speakers;
    if !(speakers.min_duration_secs > 0.0 && speakers.min_duration_secs < speakers.max_duration_secs)
    {
        return Err(ConfigError::ValidationError(format!(
            "Invalid reference duration bounds: [{}, {}]",
            speakers.min_duration_secs, speakers.max_duration_secs
        )));
    }

    if speakers.persistence == PersistenceKind::Sqlite && config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    // 默认分段参数须能通过请求校验，否则省略这些字段的请求全部被拒绝
    let synthesis = &config.synthesis;
    let limits = synthesis.limits();
    if synthesis.chunk_size < limits.min_chunk_chars || synthesis.chunk_size > limits.max_text_chars {
        return Err(ConfigError::ValidationError(format!(
            "synthesis.chunk_size must be between {} and {}",
            limits.min_chunk_chars, limits.max_text_chars
        )));
    }
    if !synthesis.chunk_min_seconds.is_finite() || synthesis.chunk_min_seconds > limits.max_chunk_secs {
        return Err(ConfigError::ValidationError(format!(
            "synthesis.chunk_min_seconds must be at most {}",
            limits.max_chunk_secs
        )));
    }
    if synthesis.chunk_retries > synthesis.max_chunk_retries {
        return Err(ConfigError::ValidationError(format!(
            "synthesis.chunk_retries cannot exceed {}",
            synthesis.max_chunk_retries
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Max Upload Size: {} bytes", config.server.max_upload_size);
    tracing::info!("Active Backend (configured): {}", config.backends.active);
    tracing::info!("Backend Priority: {}", config.backends.priority.join(" > "));
    tracing::info!(
        "Wide Languages ({}): {}",
        config.backends.wide_language_backend,
        config.backends.wide_languages.join(" ")
    );
    if config.backends.fake {
        tracing::info!("Backends: built-in fake (development mode)");
    } else {
        for name in KNOWN_BACKENDS {
            if let Some(endpoint) = config.backends.endpoint(name) {
                tracing::info!(
                    "Backend {}: {} (enabled={}, timeout={}s)",
                    name,
                    endpoint.url,
                    endpoint.enabled,
                    endpoint.timeout_secs
                );
            }
        }
    }
    tracing::info!(
        "Chunking: size={}, min_secs={}, retries={}",
        config.synthesis.chunk_size,
        config.synthesis.chunk_min_seconds,
        config.synthesis.chunk_retries
    );
    tracing::info!("Speaker Storage: {:?}", config.speakers.storage_dir);
    tracing::info!("Speaker Persistence: {}", config.speakers.persistence);
    if config.speakers.persistence == PersistenceKind::Sqlite {
        tracing::info!("Database: {}", config.database.path);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_unknown_backend() {
        let mut config = AppConfig::default();
        config.backends.active = "tacotron".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.backends.priority.push("tacotron".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_enabled_backend_without_url() {
        let mut config = AppConfig::default();
        config.backends.chatterbox.url = String::new();
        assert!(validate_config(&config).is_err());

        config.backends.chatterbox.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_inverted_duration_bounds() {
        let mut config = AppConfig::default();
        config.speakers.min_duration_secs = 60.0;
        config.speakers.max_duration_secs = 3.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_chunk_size_uses_request_lower_bound() {
        let mut config = AppConfig::default();
        config.synthesis.chunk_size = 5;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("between 10 and 5000"));

        config.synthesis.chunk_size = 10;
        assert!(validate_config(&config).is_ok());

        config.synthesis.chunk_min_seconds = 61.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());

        config.speakers.persistence = PersistenceKind::Memory;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [server]
            port = 9100

            [backends]
            active = "openvoice"

            [synthesis]
            chunk_retries = 2
            "#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.backends.active, "openvoice");
        assert_eq!(config.synthesis.chunk_retries, 2);
        assert_eq!(config.synthesis.chunk_size, 200);
        assert_eq!(config.backends.wide_languages.len(), 11);
    }
}
