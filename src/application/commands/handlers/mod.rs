//! Command Handlers 实现
//!
//! 合成命令由 [`crate::application::services::SynthesisService`] 处理

mod backend_handlers;
mod speaker_handlers;

pub use backend_handlers::*;
pub use speaker_handlers::*;
