//! Backend Commands

/// 切换全局 active 后端
#[derive(Debug, Clone)]
pub struct SwitchBackend {
    pub name: String,
}
