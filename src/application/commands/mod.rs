//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod backend_commands;
mod speaker_commands;
mod synthesis_commands;

pub mod handlers;

pub use backend_commands::*;
pub use speaker_commands::*;
pub use synthesis_commands::*;
