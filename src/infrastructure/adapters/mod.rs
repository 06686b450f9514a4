//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod backends;
pub mod codec;
pub mod storage;

pub use backends::*;
pub use codec::*;
pub use storage::*;
