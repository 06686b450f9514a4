//! Memory Layer - In-Memory State Management
//!
//! 内存版说话人仓储

mod speaker_repository;

pub use speaker_repository::InMemorySpeakerRepository;
