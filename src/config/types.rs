//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::application::services::BackendRegistryConfig;
use crate::domain::speaker::DurationBounds;
use crate::domain::synthesis::{ChunkPolicy, RequestLimits, TuningParams};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 合成后端配置
    #[serde(default)]
    pub backends: BackendsConfig,

    /// 合成请求默认值与上限
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 说话人存储配置
    #[serde(default)]
    pub speakers: SpeakersConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// ============================================================================
// Server
// ============================================================================

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 上传文件最大大小（字节）
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

fn default_max_upload_size() -> usize {
    50 * 1024 * 1024 // 50 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Backends
// ============================================================================

/// 单个模型服务端点
#[derive(Debug, Clone, Deserialize)]
pub struct BackendEndpointConfig {
    /// 是否启用
    #[serde(default = "default_backend_enabled")]
    pub enabled: bool,

    /// 模型服务基础 URL
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_enabled() -> bool {
    true
}

fn default_backend_timeout() -> u64 {
    120
}

impl BackendEndpointConfig {
    fn local(port: u16) -> Self {
        Self {
            enabled: default_backend_enabled(),
            url: format!("http://127.0.0.1:{}", port),
            timeout_secs: default_backend_timeout(),
        }
    }
}

/// 合成后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendsConfig {
    /// 期望的初始 active 后端
    #[serde(default = "default_active_backend")]
    pub active: String,

    /// 默认选择顺序
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,

    /// 宽语言集合专用后端
    #[serde(default = "default_active_backend")]
    pub wide_language_backend: String,

    /// 强制交给宽语言后端的语言
    #[serde(default = "default_wide_languages")]
    pub wide_languages: Vec<String>,

    /// 使用内置 fake 后端代替模型服务（本地开发）
    #[serde(default)]
    pub fake: bool,

    #[serde(default = "default_xtts_endpoint")]
    pub xtts: BackendEndpointConfig,

    #[serde(default = "default_openvoice_endpoint")]
    pub openvoice: BackendEndpointConfig,

    #[serde(default = "default_chatterbox_endpoint")]
    pub chatterbox: BackendEndpointConfig,
}

fn default_active_backend() -> String {
    "xtts".to_string()
}

fn default_priority() -> Vec<String> {
    vec![
        "xtts".to_string(),
        "openvoice".to_string(),
        "chatterbox".to_string(),
    ]
}

fn default_wide_languages() -> Vec<String> {
    ["it", "de", "pt", "pl", "tr", "ru", "nl", "cs", "ar", "hu", "vi"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_xtts_endpoint() -> BackendEndpointConfig {
    BackendEndpointConfig::local(8801)
}

fn default_openvoice_endpoint() -> BackendEndpointConfig {
    BackendEndpointConfig::local(8802)
}

fn default_chatterbox_endpoint() -> BackendEndpointConfig {
    BackendEndpointConfig::local(8803)
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            active: default_active_backend(),
            priority: default_priority(),
            wide_language_backend: default_active_backend(),
            wide_languages: default_wide_languages(),
            fake: false,
            xtts: default_xtts_endpoint(),
            openvoice: default_openvoice_endpoint(),
            chatterbox: default_chatterbox_endpoint(),
        }
    }
}

impl BackendsConfig {
    /// 按名称获取端点配置
    pub fn endpoint(&self, name: &str) -> Option<&BackendEndpointConfig> {
        match name {
            "xtts" => Some(&self.xtts),
            "openvoice" => Some(&self.openvoice),
            "chatterbox" => Some(&self.chatterbox),
            _ => None,
        }
    }

    pub fn registry_config(&self) -> BackendRegistryConfig {
        BackendRegistryConfig {
            active: self.active.to_lowercase(),
            priority: self.priority.iter().map(|p| p.to_lowercase()).collect(),
            wide_language_backend: self.wide_language_backend.to_lowercase(),
            wide_languages: self
                .wide_languages
                .iter()
                .map(|l| l.to_lowercase())
                .collect::<BTreeSet<_>>(),
        }
    }
}

// ============================================================================
// Synthesis
// ============================================================================

/// 合成请求默认值与上限
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,
    #[serde(default = "default_min_p")]
    pub min_p: f32,
    #[serde(default)]
    pub cfg_weight: f32,
    #[serde(default)]
    pub exaggeration: f32,

    /// 分段最大字符数
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// 分段最短可接受时长（秒），<= 0 关闭时长检查
    #[serde(default = "default_chunk_min_seconds")]
    pub chunk_min_seconds: f64,
    /// 每个分段的重试次数
    #[serde(default)]
    pub chunk_retries: u32,

    /// 文本最大字符数
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    /// 请求允许的最大重试次数
    #[serde(default = "default_max_chunk_retries")]
    pub max_chunk_retries: u32,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_speed() -> f32 {
    1.0
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.8
}

fn default_repetition_penalty() -> f32 {
    2.0
}

fn default_min_p() -> f32 {
    0.05
}

fn default_chunk_size() -> usize {
    200
}

fn default_chunk_min_seconds() -> f64 {
    2.0
}

fn default_max_text_chars() -> usize {
    5000
}

fn default_max_chunk_retries() -> u32 {
    10
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            speed: default_speed(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
            min_p: default_min_p(),
            cfg_weight: 0.0,
            exaggeration: 0.0,
            chunk_size: default_chunk_size(),
            chunk_min_seconds: default_chunk_min_seconds(),
            chunk_retries: 0,
            max_text_chars: default_max_text_chars(),
            max_chunk_retries: default_max_chunk_retries(),
        }
    }
}

impl SynthesisConfig {
    pub fn tuning(&self) -> TuningParams {
        TuningParams {
            temperature: self.temperature,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
            min_p: self.min_p,
            cfg_weight: self.cfg_weight,
            exaggeration: self.exaggeration,
        }
    }

    pub fn policy(&self) -> ChunkPolicy {
        ChunkPolicy {
            max_chunk_chars: self.chunk_size,
            min_chunk_secs: self.chunk_min_seconds,
            max_retries: self.chunk_retries,
        }
    }

    pub fn limits(&self) -> RequestLimits {
        RequestLimits {
            max_text_chars: self.max_text_chars,
            max_chunk_retries: self.max_chunk_retries,
            ..RequestLimits::default()
        }
    }
}

// ============================================================================
// Speakers
// ============================================================================

/// 说话人元数据持久化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceKind {
    #[default]
    Sqlite,
    Memory,
}

impl std::fmt::Display for PersistenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceKind::Sqlite => write!(f, "sqlite"),
            PersistenceKind::Memory => write!(f, "memory"),
        }
    }
}

/// 说话人存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakersConfig {
    /// 参考音频存储目录
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    #[serde(default)]
    pub persistence: PersistenceKind,

    /// 参考音频最短时长（秒，含）
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: f64,

    /// 参考音频最长时长（秒，含）
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f64,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("data/speakers")
}

fn default_min_duration() -> f64 {
    3.0
}

fn default_max_duration() -> f64 {
    60.0
}

impl Default for SpeakersConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            persistence: PersistenceKind::default(),
            min_duration_secs: default_min_duration(),
            max_duration_secs: default_max_duration(),
        }
    }
}

impl SpeakersConfig {
    pub fn bounds(&self) -> DurationBounds {
        DurationBounds {
            min_secs: self.min_duration_secs,
            max_secs: self.max_duration_secs,
        }
    }
}

// ============================================================================
// Database
// ============================================================================

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/clonevox.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

// ============================================================================
// Log
// ============================================================================

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
