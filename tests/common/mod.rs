#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use clonevox::application::{
    AudioCodecPort, BackendRegistry, BackendRegistryConfig, SpeakerRepositoryPort,
    SynthesisBackendPort,
};
use clonevox::domain::audio::{PcmBuffer, PcmFormat};
use clonevox::domain::speaker::{DurationBounds, ReferenceDuration, Speaker, SpeakerId};
use clonevox::infrastructure::adapters::{FakeSynthesisBackend, WavCodec};
use clonevox::infrastructure::memory::InMemorySpeakerRepository;

/// 指定时长的静音 WAV（8kHz 单声道 16bit）
pub fn wav_bytes(duration_ms: u64) -> Vec<u8> {
    let format = PcmFormat::mono_16bit(8000);
    let frames = (duration_ms * 8) as usize;
    let buffer = PcmBuffer::silence(format, frames).unwrap();
    WavCodec::new().encode(&buffer)
}

/// xtts / openvoice / chatterbox 三个 fake 后端
pub struct Backends {
    pub xtts: Arc<FakeSynthesisBackend>,
    pub openvoice: Arc<FakeSynthesisBackend>,
    pub chatterbox: Arc<FakeSynthesisBackend>,
}

impl Backends {
    pub fn new(xtts: FakeSynthesisBackend) -> Self {
        Self {
            xtts: Arc::new(xtts),
            openvoice: Arc::new(FakeSynthesisBackend::named("openvoice").unhealthy()),
            chatterbox: Arc::new(FakeSynthesisBackend::named("chatterbox")),
        }
    }

    pub async fn registry(&self) -> Arc<BackendRegistry> {
        let backends: Vec<Arc<dyn SynthesisBackendPort>> = vec![
            self.chatterbox.clone() as Arc<dyn SynthesisBackendPort>,
            self.openvoice.clone() as Arc<dyn SynthesisBackendPort>,
            self.xtts.clone() as Arc<dyn SynthesisBackendPort>,
        ];
        Arc::new(BackendRegistry::load(backends, BackendRegistryConfig::default()).await)
    }
}

pub async fn repo_with_speaker(id: &str) -> Arc<InMemorySpeakerRepository> {
    let repo = Arc::new(InMemorySpeakerRepository::new());
    let speaker = Speaker::register(
        SpeakerId::new(id).unwrap(),
        PathBuf::from(format!("data/speakers/{}.wav", id)),
        ReferenceDuration::validate(6.0, DurationBounds::default()).unwrap(),
    );
    repo.save(&speaker).await.unwrap();
    repo
}
