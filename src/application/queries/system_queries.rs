//! System Queries - 后端与健康状态

/// 列出所有后端及 active 后端
#[derive(Debug, Clone)]
pub struct ListBackends;

/// 服务健康状态查询
#[derive(Debug, Clone)]
pub struct HealthStatus;
