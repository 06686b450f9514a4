//! Backend Registry - 后端可用性与选择策略
//!
//! 可用性在启动时探测一次，运行期间不变；全局 active 后端可显式切换。
//! 每个后端实例是不可重入的资源，所有调用经 [`BackendHandle`] 的互斥锁串行化。

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    BackendError, BackendSynthesisRequest, LanguageSupport, SynthesisBackendPort,
};
use crate::domain::audio::PcmBuffer;

/// 已加载的后端实例及其独占访问锁
pub struct BackendHandle {
    backend: Arc<dyn SynthesisBackendPort>,
    guard: Mutex<()>,
    available: bool,
    priority: usize,
}

impl BackendHandle {
    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn priority(&self) -> usize {
        self.priority
    }

    pub fn supported_languages(&self) -> LanguageSupport {
        self.backend.supported_languages()
    }

    /// 持有独占锁执行一次合成，调用结束（含被取消）即释放
    pub async fn synthesize(&self, request: BackendSynthesisRequest) -> Result<PcmBuffer, BackendError> {
        let _guard = self.guard.lock().await;
        self.backend.synthesize(request).await
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("name", &self.name())
            .field("available", &self.available)
            .field("priority", &self.priority)
            .finish()
    }
}

/// 后端描述（对外展示）
#[derive(Debug, Clone, Serialize)]
pub struct BackendDescriptor {
    pub name: String,
    /// 支持的语言代码，"all" 表示与语言无关
    pub languages: Vec<String>,
    pub available: bool,
    /// 默认选择顺序，0 最高
    pub priority: usize,
    pub active: bool,
}

/// 选择策略配置
#[derive(Debug, Clone)]
pub struct BackendRegistryConfig {
    /// 期望的初始 active 后端
    pub active: String,
    /// 默认选择顺序
    pub priority: Vec<String>,
    /// 宽语言集合专用后端
    pub wide_language_backend: String,
    /// 只交给宽语言后端处理的语言
    pub wide_languages: BTreeSet<String>,
}

impl Default for BackendRegistryConfig {
    fn default() -> Self {
        Self {
            active: "xtts".to_string(),
            priority: vec![
                "xtts".to_string(),
                "openvoice".to_string(),
                "chatterbox".to_string(),
            ],
            wide_language_backend: "xtts".to_string(),
            wide_languages: ["it", "de", "pt", "pl", "tr", "ru", "nl", "cs", "ar", "hu", "vi"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Backend Registry
pub struct BackendRegistry {
    /// 按优先级排序
    handles: Vec<Arc<BackendHandle>>,
    active: RwLock<Option<String>>,
    wide_language_backend: String,
    wide_languages: BTreeSet<String>,
}

impl BackendRegistry {
    /// 并发探测所有后端，探测结果即本次运行的可用性
    pub async fn load(
        backends: Vec<Arc<dyn SynthesisBackendPort>>,
        config: BackendRegistryConfig,
    ) -> Self {
        let probes = backends.iter().map(|backend| backend.health_check());
        let results = join_all(probes).await;

        let entries = backends
            .into_iter()
            .zip(results)
            .map(|(backend, available)| {
                if available {
                    tracing::info!(backend = %backend.name(), "Backend loaded");
                } else {
                    tracing::warn!(backend = %backend.name(), "Backend unavailable");
                }
                (backend, available)
            })
            .collect();

        Self::from_availability(entries, config)
    }

    /// 使用已知的可用性构造
    pub fn from_availability(
        backends: Vec<(Arc<dyn SynthesisBackendPort>, bool)>,
        config: BackendRegistryConfig,
    ) -> Self {
        let rank = |name: &str| {
            config
                .priority
                .iter()
                .position(|p| p == name)
                .unwrap_or(config.priority.len())
        };

        let mut handles: Vec<BackendHandle> = backends
            .into_iter()
            .map(|(backend, available)| BackendHandle {
                priority: rank(backend.name()),
                backend,
                guard: Mutex::new(()),
                available,
            })
            .collect();
        // 稳定排序：不在优先级列表中的后端保持传入顺序
        handles.sort_by_key(|h| h.priority);
        for (i, handle) in handles.iter_mut().enumerate() {
            handle.priority = i;
        }
        let handles: Vec<Arc<BackendHandle>> = handles.into_iter().map(Arc::new).collect();

        let active = handles
            .iter()
            .find(|h| h.available && h.name() == config.active)
            .or_else(|| handles.iter().find(|h| h.available))
            .map(|h| h.name().to_string());

        match &active {
            Some(name) if *name != config.active => {
                tracing::warn!(
                    configured = %config.active,
                    active = %name,
                    "Configured backend unavailable, falling back"
                );
            }
            None => tracing::warn!("No synthesis backend available, service not ready"),
            _ => {}
        }

        Self {
            handles,
            active: RwLock::new(active),
            wide_language_backend: config.wide_language_backend,
            wide_languages: config
                .wide_languages
                .into_iter()
                .map(|l| l.to_lowercase())
                .collect(),
        }
    }

    fn find_available(&self, name: &str) -> Option<&Arc<BackendHandle>> {
        self.handles
            .iter()
            .find(|h| h.available && h.name() == name)
    }

    /// 当前 active 后端
    pub fn active(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 至少有一个后端可用
    pub fn is_ready(&self) -> bool {
        self.handles.iter().any(|h| h.available)
    }

    /// 可用后端名称（按优先级）
    pub fn available_names(&self) -> Vec<String> {
        self.handles
            .iter()
            .filter(|h| h.available)
            .map(|h| h.name().to_string())
            .collect()
    }

    pub fn descriptors(&self) -> Vec<BackendDescriptor> {
        let active = self.active();
        self.handles
            .iter()
            .map(|h| BackendDescriptor {
                name: h.name().to_string(),
                languages: h.supported_languages().to_codes(),
                available: h.available,
                priority: h.priority,
                active: active.as_deref() == Some(h.name()),
            })
            .collect()
    }

    /// 选择后端
    ///
    /// 按顺序：
    /// 1. 宽语言集合中的语言交给宽语言后端（若可用），忽略 active 与请求偏好
    /// 2. 请求偏好的后端，其次全局 active 后端
    /// 3. 按优先级第一个可用的后端
    pub fn resolve(
        &self,
        language: &str,
        preference: Option<&str>,
    ) -> Result<Arc<BackendHandle>, ApplicationError> {
        let language = language.to_lowercase();

        if self.wide_languages.contains(&language) {
            if let Some(handle) = self.find_available(&self.wide_language_backend) {
                tracing::debug!(
                    language = %language,
                    backend = %handle.name(),
                    "Wide-language routing"
                );
                return Ok(Arc::clone(handle));
            }
        }

        let active = self.active();
        let preferred = preference.into_iter().chain(active.as_deref());
        for name in preferred {
            if let Some(handle) = self.find_available(name) {
                return Ok(Arc::clone(handle));
            }
            tracing::debug!(backend = %name, "Preferred backend unavailable");
        }

        self.handles
            .iter()
            .find(|h| h.available)
            .map(Arc::clone)
            .ok_or_else(|| ApplicationError::NoBackendAvailable(format!("language={}", language)))
    }

    /// 切换全局 active 后端，目标不可用时失败
    pub fn switch(&self, name: &str) -> Result<(), ApplicationError> {
        let handle = self
            .find_available(name)
            .ok_or_else(|| ApplicationError::BackendNotAvailable(name.to_string()))?;

        let mut active = self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = active.replace(handle.name().to_string());

        tracing::info!(
            from = previous.as_deref().unwrap_or("none"),
            to = %handle.name(),
            "Active backend switched"
        );
        Ok(())
    }
}
