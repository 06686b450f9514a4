//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod speaker_repo;

pub use database::*;
pub use speaker_repo::*;
