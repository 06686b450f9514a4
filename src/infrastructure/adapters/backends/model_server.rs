//! Model Server Client - 调用外部模型推理服务
//!
//! 每种后端各自部署一个模型服务，协议相同：
//! - `POST {base_url}/synthesize`，JSON 请求体（字段因后端而异），返回 audio/wav
//! - `GET  {base_url}/health`

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::application::ports::{AudioCodecPort, BackendError};
use crate::domain::audio::PcmBuffer;
use crate::infrastructure::adapters::codec::WavCodec;

/// 模型服务客户端配置
#[derive(Debug, Clone)]
pub struct ModelServerConfig {
    /// 模型服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for ModelServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ModelServerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// 模型服务 HTTP 客户端
pub struct ModelServerClient {
    client: Client,
    config: ModelServerConfig,
    codec: WavCodec,
}

impl ModelServerClient {
    pub fn new(config: ModelServerConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            codec: WavCodec::new(),
        })
    }


    fn synthesize_url(&self) -> String {
        format!("{}/synthesize", self.config.base_url.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }

    /// 发送合成请求并解码返回的 WAV
    pub async fn synthesize<T: Serialize + ?Sized>(
        &self,
        backend: &str,
        payload: &T,
    ) -> Result<PcmBuffer, BackendError> {
        let url = self.synthesize_url();

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else if e.is_connect() {
                    BackendError::NetworkError(format!("Cannot connect to {} server: {}", backend, e))
                } else {
                    BackendError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackendError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to read audio: {}", e)))?;

        let buffer = self
            .codec
            .decode(&audio_data)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            backend,
            audio_size = audio_data.len(),
            duration_secs = buffer.duration_secs(),
            format = %buffer.format(),
            "Model server synthesis completed"
        );

        Ok(buffer)
    }

    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(&self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// 参考音频必须存在才能克隆
pub async fn ensure_reference_audio(path: &Path) -> Result<(), BackendError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        _ => Err(BackendError::ReferenceAudioMissing(
            path.display().to_string(),
        )),
    }
}
