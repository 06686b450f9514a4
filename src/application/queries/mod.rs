//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod speaker_queries;
mod system_queries;

pub mod handlers;

pub use speaker_queries::*;
pub use system_queries::*;
