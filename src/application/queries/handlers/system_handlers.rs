//! System Query Handlers - 后端列表与健康状态

use std::sync::Arc;

use serde::Serialize;

use crate::application::error::ApplicationError;
use crate::application::ports::SpeakerRepositoryPort;
use crate::application::queries::{HealthStatus, ListBackends};
use crate::application::services::{BackendDescriptor, BackendRegistry};

// ============================================================================
// Response DTOs
// ============================================================================

/// 后端列表响应
#[derive(Debug, Clone, Serialize)]
pub struct BackendsResponse {
    pub active: Option<String>,
    pub backends: Vec<BackendDescriptor>,
}

/// 健康状态响应
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// 至少一个后端可用
    pub ready: bool,
    pub active_backend: Option<String>,
    pub available_backends: Vec<String>,
    pub speaker_count: usize,
    pub version: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListBackends Handler
pub struct ListBackendsHandler {
    registry: Arc<BackendRegistry>,
}

impl ListBackendsHandler {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    pub fn handle(&self, _query: ListBackends) -> BackendsResponse {
        BackendsResponse {
            active: self.registry.active(),
            backends: self.registry.descriptors(),
        }
    }
}

/// HealthStatus Handler
pub struct HealthStatusHandler {
    registry: Arc<BackendRegistry>,
    speaker_repo: Arc<dyn SpeakerRepositoryPort>,
}

impl HealthStatusHandler {
    pub fn new(registry: Arc<BackendRegistry>, speaker_repo: Arc<dyn SpeakerRepositoryPort>) -> Self {
        Self {
            registry,
            speaker_repo,
        }
    }

    pub async fn handle(&self, _query: HealthStatus) -> Result<HealthResponse, ApplicationError> {
        Ok(HealthResponse {
            ready: self.registry.is_ready(),
            active_backend: self.registry.active(),
            available_backends: self.registry.available_names(),
            speaker_count: self.speaker_repo.count().await?,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
