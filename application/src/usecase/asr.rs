use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use validator::Validate;

use asr_domain::{AudioCanonicalizer, AudioChunker, DecodingProfile, ScratchAsset};

use crate::{
    ApplicationError, ChunkParameters, ChunkPlan, ChunkPlanner, DecodingConfigManager,
    InputValidator, OutputFormatter, ScratchSpace, TimestampPolicy, TimestampReconciler,
    TranscribeAudioRequest, TranscriptionInvoker, TranscriptionPayload,
};

#[async_trait]
pub trait AsrUseCase: Send + Sync {
    async fn transcribe(
        &self,
        request: TranscribeAudioRequest,
    ) -> Result<TranscriptionPayload, ApplicationError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_beam_size: u32,
    pub max_batch_size: u32,
}

impl RequestLimits {
    fn check(&self, request: &TranscribeAudioRequest) -> Result<(), ApplicationError> {
        if request.beam_size > self.max_beam_size {
            return Err(ApplicationError::Validation(format!(
                "beam_size must be between 1 and {}",
                self.max_beam_size
            )));
        }
        if request.batch_size > self.max_batch_size {
            return Err(ApplicationError::Validation(format!(
                "batch_size must be between 1 and {}",
                self.max_batch_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AsrUseCaseConfig {
    pub supported_languages: Vec<String>,
    pub max_chunk_duration_secs: f64,
    pub scratch_dir: Option<PathBuf>,
    pub max_words_per_cue: usize,
    pub limits: RequestLimits,
    pub request_timeout: Duration,
}

pub struct AsrUseCaseImpl {
    validator: InputValidator,
    canonicalizer: Arc<dyn AudioCanonicalizer>,
    scratch: ScratchSpace,
    planner: Arc<ChunkPlanner>,
    decoding: Arc<DecodingConfigManager>,
    formatter: OutputFormatter,
    limits: RequestLimits,
    request_timeout: Duration,
}

impl AsrUseCaseImpl {
    pub fn new(
        config: AsrUseCaseConfig,
        canonicalizer: Arc<dyn AudioCanonicalizer>,
        chunker: Arc<dyn AudioChunker>,
        decoding: Arc<DecodingConfigManager>,
    ) -> Self {
        Self {
            validator: InputValidator::new(&config.supported_languages),
            canonicalizer,
            scratch: ScratchSpace::new(config.scratch_dir),
            planner: Arc::new(ChunkPlanner::new(chunker, config.max_chunk_duration_secs)),
            decoding,
            formatter: OutputFormatter::new(config.max_words_per_cue),
            limits: config.limits,
            request_timeout: config.request_timeout,
        }
    }

    async fn run_pipeline(
        &self,
        run: &mut RequestRun,
        request: TranscribeAudioRequest,
    ) -> Result<TranscriptionPayload, ApplicationError> {
        request.validate()?;
        self.limits.check(&request)?;
        let TranscribeAudioRequest {
            language,
            punctuation,
            timestamps,
            beam_size,
            batch_size,
            response_format,
            word_boost,
            audio,
        } = request;

        let language = self.validator.validate(&language, &audio)?;
        let policy = TimestampPolicy::resolve(response_format, timestamps);

        run.advance(PipelineState::Canonicalizing);
        let canonicalizer = Arc::clone(&self.canonicalizer);
        let scratch = self.scratch.clone();
        // Owned for the whole pipeline; dropping it (any exit, including
        // cancellation) deletes the file.
        let asset: ScratchAsset = run_blocking(move || {
            let mono = canonicalizer.to_mono_wav(&audio)?;
            scratch.persist(&mono)
        })
        .await?;

        run.advance(PipelineState::Planning);
        let planner = Arc::clone(&self.planner);
        let asset_path = asset.path().to_path_buf();
        let plan: ChunkPlan = run_blocking(move || planner.plan(&asset_path)).await?;
        tracing::debug!(
            duration_secs = plan.total_duration,
            chunk_count = plan.chunks.len(),
            split = plan.is_split(),
            "chunk plan ready"
        );

        policy.check_capability(self.decoding.supports_timestamps())?;
        let mut lease = self
            .decoding
            .ensure(DecodingProfile::with_beam_size(beam_size))
            .await?;

        let invoker = TranscriptionInvoker::new(ChunkParameters {
            language: language.clone(),
            punctuation,
            timestamps: policy.is_enabled(),
            batch_size,
            word_boost,
        });
        let chunk_count = plan.chunks.len();
        let mut outcomes = Vec::with_capacity(chunk_count);
        // Chunks still in the iterator are dropped, and their files removed,
        // if a transcription fails.
        for chunk in plan.chunks {
            run.advance(PipelineState::Transcribing {
                chunk: chunk.index + 1,
                of: chunk_count,
            });
            outcomes.push(invoker.invoke(&mut lease, chunk).await?);
        }
        drop(lease);

        run.advance(PipelineState::Reconciling);
        let result = TimestampReconciler::reconcile(language, outcomes, policy.is_enabled());

        run.advance(PipelineState::Formatting);
        let payload = self.formatter.render(&result, response_format)?;

        if let Err(err) = asset.close() {
            tracing::warn!(error = %err, "failed to delete request audio file");
        }
        Ok(payload)
    }
}

#[async_trait]
impl AsrUseCase for AsrUseCaseImpl {
    async fn transcribe(
        &self,
        request: TranscribeAudioRequest,
    ) -> Result<TranscriptionPayload, ApplicationError> {
        tracing::debug!(
            audio_bytes = request.audio.len(),
            language = %request.language,
            response_format = %request.response_format,
            beam_size = request.beam_size,
            batch_size = request.batch_size,
            word_boost_count = request.word_boost.len(),
            "starting asr transcription"
        );

        let mut run = RequestRun::default();
        let outcome = match tokio::time::timeout(
            self.request_timeout,
            self.run_pipeline(&mut run, request),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ApplicationError::Timeout(self.request_timeout.as_secs())),
        };

        match &outcome {
            Ok(_) => run.advance(PipelineState::Done),
            Err(err) => run.fail(err),
        }
        outcome
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Validating,
    Canonicalizing,
    Planning,
    Transcribing { chunk: usize, of: usize },
    Reconciling,
    Formatting,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => f.write_str("validating"),
            Self::Canonicalizing => f.write_str("canonicalizing"),
            Self::Planning => f.write_str("planning"),
            Self::Transcribing { chunk, of } => write!(f, "transcribing {chunk}/{of}"),
            Self::Reconciling => f.write_str("reconciling"),
            Self::Formatting => f.write_str("formatting"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Tracks where a request is in the pipeline, for logs.
struct RequestRun {
    state: PipelineState,
}

impl Default for RequestRun {
    fn default() -> Self {
        Self {
            state: PipelineState::Validating,
        }
    }
}

impl RequestRun {
    fn advance(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
    }

    fn fail(&mut self, error: &ApplicationError) {
        if error.is_client_error() {
            tracing::info!(state = %self.state, error = %error, "request rejected");
        } else {
            tracing::error!(state = %self.state, error = %error, "request failed");
        }
        self.state = PipelineState::Failed;
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, ApplicationError>
where
    F: FnOnce() -> Result<T, ApplicationError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| ApplicationError::Internal(format!("blocking task failed: {err}")))?
}
