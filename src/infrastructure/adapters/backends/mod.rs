//! Backend Adapters - 合成后端实现
//!
//! - XTTS / OpenVoice / Chatterbox: 外部模型服务的 HTTP 客户端
//! - Fake: 脚本化的测试后端

mod chatterbox;
mod fake_backend;
mod model_server;
mod openvoice;
mod xtts;

pub use chatterbox::{ChatterboxBackend, CHATTERBOX_BACKEND};
pub use fake_backend::{FakeOutcome, FakeSynthesisBackend, FakeSynthesisBackendConfig};
pub use model_server::{ModelServerClient, ModelServerConfig};
pub use openvoice::{openvoice_language, OpenVoiceBackend, OPENVOICE_BACKEND};
pub use xtts::{xtts_language, XttsBackend, XTTS_BACKEND, XTTS_LANGUAGES};

/// 已知的后端名称（按默认优先级）
pub const KNOWN_BACKENDS: [&str; 3] = [XTTS_BACKEND, OPENVOICE_BACKEND, CHATTERBOX_BACKEND];
