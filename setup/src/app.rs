use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use axum::Router;
use tokio::net::TcpListener;

use asr_application::{
    AsrUseCase, AsrUseCaseConfig, AsrUseCaseImpl, DecodingConfigManager, RequestDefaults,
    RequestLimits,
};
use asr_configuration::{AppConfig, ServerConfig};
use asr_domain::{DecodingProfile, InferencePort};
use asr_http_server::{create_router, AppState, HttpSettings};
use asr_infra_asr_whisper::WHISPER_SAMPLE_RATE_HZ;
use asr_infra_audio::{WavCanonicalizer, WavChunker};

pub async fn build_and_run(config: AppConfig, server_config: ServerConfig) -> Result<(), Error> {
    let app = Application::new(config).await?;
    app.run(server_config).await
}

pub struct Application {
    pub config: AppConfig,
    pub router: Router,
}

impl Application {
    /// Loads the whisper model named in the config and wires the service.
    pub async fn new(config: AppConfig) -> Result<Self, Error> {
        #[cfg(feature = "whisper-cuda")]
        tracing::info!("whisper backend: CUDA");
        #[cfg(feature = "whisper-vulkan")]
        tracing::info!("whisper backend: Vulkan");
        #[cfg(all(
            feature = "whisper-runtime",
            not(feature = "whisper-cuda"),
            not(feature = "whisper-vulkan")
        ))]
        tracing::info!("whisper backend: CPU");

        let sample_rate_hz = config.service.audio.sample_rate_hz;
        if sample_rate_hz != WHISPER_SAMPLE_RATE_HZ {
            anyhow::bail!(
                "service.audio.sample_rate_hz is {sample_rate_hz} but the whisper backend \
                 reads {WHISPER_SAMPLE_RATE_HZ} Hz audio"
            );
        }

        let inference = load_inference(&config)?;
        Self::with_inference(config, inference)
    }

    /// Wires the service around an already constructed inference capability.
    pub fn with_inference(
        config: AppConfig,
        inference: Box<dyn InferencePort>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let audio = &config.service.audio;
        let asr = &config.service.asr;
        tracing::info!(
            sample_rate_hz = audio.sample_rate_hz,
            max_chunk_duration_secs = audio.max_chunk_duration_secs,
            default_beam_size = asr.default_beam_size,
            supported_languages = ?asr.supported_languages,
            "initializing ASR application"
        );

        let decoding = Arc::new(DecodingConfigManager::new(
            inference,
            DecodingProfile::with_beam_size(asr.default_beam_size),
        )?);
        let usecase: Arc<dyn AsrUseCase> = Arc::new(AsrUseCaseImpl::new(
            AsrUseCaseConfig {
                supported_languages: asr.supported_languages.clone(),
                max_chunk_duration_secs: audio.max_chunk_duration_secs,
                scratch_dir: audio.scratch_dir.clone(),
                max_words_per_cue: config.service.subtitles.max_words_per_cue,
                limits: RequestLimits {
                    max_beam_size: asr.max_beam_size,
                    max_batch_size: asr.max_batch_size,
                },
                request_timeout: Duration::from_secs(config.service.http.request_timeout_secs),
            },
            Arc::new(WavCanonicalizer::new(audio.sample_rate_hz)),
            Arc::new(WavChunker::new(audio.scratch_dir.clone())),
            decoding,
        ));

        let router = create_router(
            AppState::new(usecase).with_defaults(RequestDefaults {
                beam_size: asr.default_beam_size,
                batch_size: asr.default_batch_size,
            }),
            HttpSettings {
                max_upload_bytes: config.service.http.max_upload_bytes,
            },
        );
        Ok(Self { config, router })
    }

    pub async fn run(self, server_config: ServerConfig) -> Result<(), Error> {
        let address = server_config.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|err| anyhow::anyhow!("bind to {address} failed: {err}"))?;
        tracing::info!(
            host = %server_config.host,
            port = server_config.port,
            "starting ASR HTTP routes"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| anyhow::anyhow!("server error: {err}"))
    }
}

#[cfg(feature = "whisper-runtime")]
fn load_inference(config: &AppConfig) -> Result<Box<dyn InferencePort>, Error> {
    use asr_infra_asr_whisper::{WhisperAdapterConfig, WhisperInference};

    let asr = &config.service.asr;
    let adapter = WhisperInference::load(WhisperAdapterConfig {
        model_path: asr.model_path.clone(),
        temperature: asr.temperature,
        threads: asr.threads,
        timestamps: asr.timestamps,
    })?;
    Ok(Box::new(adapter))
}

#[cfg(not(feature = "whisper-runtime"))]
fn load_inference(_config: &AppConfig) -> Result<Box<dyn InferencePort>, Error> {
    anyhow::bail!("service compiled without `whisper-runtime`; no inference backend available")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
