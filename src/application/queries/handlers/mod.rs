//! Query Handlers 实现

mod speaker_handlers;
mod system_handlers;

pub use speaker_handlers::*;
pub use system_handlers::*;
