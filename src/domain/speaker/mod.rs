//! Speaker Context - 说话人限界上下文
//!
//! 职责:
//! - 说话人 ID 校验
//! - 参考音频时长校验（仅在注册时）
//! - Speaker 聚合

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::Speaker;
pub use errors::SpeakerError;
pub use value_objects::{DurationBounds, ReferenceDuration, SpeakerId, MAX_SPEAKER_ID_CHARS};
