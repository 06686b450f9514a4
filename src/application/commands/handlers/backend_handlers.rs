//! Backend Command Handlers

use std::sync::Arc;

use crate::application::commands::SwitchBackend;
use crate::application::error::ApplicationError;
use crate::application::services::BackendRegistry;

/// SwitchBackend Handler
pub struct SwitchBackendHandler {
    registry: Arc<BackendRegistry>,
}

impl SwitchBackendHandler {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    /// 切换成功后返回新的 active 后端
    pub fn handle(&self, command: SwitchBackend) -> Result<String, ApplicationError> {
        let name = command.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ApplicationError::validation("model cannot be empty"));
        }
        self.registry.switch(&name)?;
        Ok(name)
    }
}
