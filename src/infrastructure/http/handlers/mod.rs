//! HTTP Handlers

mod speaker;
mod synthesis;
mod system;

pub use speaker::*;
pub use synthesis::*;
pub use system::*;
