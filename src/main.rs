//! CloneVox - 声音克隆 TTS 服务
//!
//! 启动流程：加载配置 → 初始化日志 → 探测后端 → 构建服务 → 启动 HTTP

use std::sync::Arc;

use clonevox::application::{
    AudioCodecPort, BackendRegistry, ReferenceAudioStoragePort, SpeakerRepositoryPort,
    SynthesisBackendPort,
};
use clonevox::config::{load_config, print_config, AppConfig, PersistenceKind};
use clonevox::infrastructure::adapters::{
    ChatterboxBackend, FakeSynthesisBackend, FileReferenceAudioStorage, ModelServerConfig,
    OpenVoiceBackend, WavCodec, XttsBackend, KNOWN_BACKENDS, OPENVOICE_BACKEND, XTTS_BACKEND,
};
use clonevox::infrastructure::http::{serve, AppState, ServerConfig, SynthesisDefaults};
use clonevox::infrastructure::memory::InMemorySpeakerRepository;
use clonevox::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, SqliteSpeakerRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("CloneVox v{} - voice cloning TTS", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 探测后端，结果即为本次运行的可用性
    let backends = build_backends(&config)?;
    let registry = Arc::new(
        BackendRegistry::load(backends, config.backends.registry_config()).await,
    );
    for d in registry.descriptors() {
        tracing::info!(
            backend = %d.name,
            available = d.available,
            priority = d.priority,
            active = d.active,
            languages = %d.languages.join(" "),
            "Backend status"
        );
    }
    if !registry.is_ready() {
        tracing::warn!("No synthesis backend available, service is not ready");
    }

    // 说话人仓储
    let speaker_repo: Arc<dyn SpeakerRepositoryPort> = match config.speakers.persistence {
        PersistenceKind::Sqlite => {
            if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let pool = create_pool(
                &config.database.database_url(),
                config.database.max_connections,
            )
            .await?;
            run_migrations(&pool).await?;
            Arc::new(SqliteSpeakerRepository::new(pool))
        }
        PersistenceKind::Memory => InMemorySpeakerRepository::new().arc(),
    };

    let storage: Arc<dyn ReferenceAudioStoragePort> =
        Arc::new(FileReferenceAudioStorage::new(&config.speakers.storage_dir));
    let codec: Arc<dyn AudioCodecPort> = Arc::new(WavCodec::new());

    let defaults = SynthesisDefaults {
        language: config.synthesis.language.clone(),
        speed: config.synthesis.speed,
        tuning: config.synthesis.tuning(),
        policy: config.synthesis.policy(),
    };

    let state = AppState::new(
        registry,
        speaker_repo,
        storage,
        codec,
        config.speakers.bounds(),
        config.synthesis.limits(),
        defaults,
    );

    let server_config = ServerConfig::new(
        &config.server.host,
        config.server.port,
        config.server.max_upload_size,
    );

    // 启动服务器（带优雅关闭）
    serve(server_config, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
        tracing::info!("Received shutdown signal");
    })
    .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志，RUST_LOG 优先于配置
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},clonevox={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置创建已启用的后端
fn build_backends(config: &AppConfig) -> anyhow::Result<Vec<Arc<dyn SynthesisBackendPort>>> {
    let mut backends: Vec<Arc<dyn SynthesisBackendPort>> = Vec::new();

    for name in KNOWN_BACKENDS {
        let Some(endpoint) = config.backends.endpoint(name) else {
            continue;
        };
        if !endpoint.enabled {
            tracing::info!(backend = name, "Backend disabled by configuration");
            continue;
        }

        if config.backends.fake {
            backends.push(Arc::new(FakeSynthesisBackend::named(name)));
            continue;
        }

        let server = ModelServerConfig::new(&endpoint.url).with_timeout(endpoint.timeout_secs);
        let backend: Arc<dyn SynthesisBackendPort> = match name {
            XTTS_BACKEND => Arc::new(XttsBackend::new(server)?),
            OPENVOICE_BACKEND => Arc::new(OpenVoiceBackend::new(server)?),
            _ => Arc::new(ChatterboxBackend::new(server)?),
        };
        backends.push(backend);
    }

    Ok(backends)
}
