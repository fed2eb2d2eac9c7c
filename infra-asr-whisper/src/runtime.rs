use asr_domain::{
    ChunkTranscript, DecodingProfile, DomainError, InferencePort, InferenceRequest,
};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperTokenData,
};

use crate::{
    boost_prompt, build_transcript, read_mono_samples, to_ms_10ms_units, DecodedSegment,
    DecodingStrategy, TokenHint, WhisperAdapterConfig,
};

/// A loaded whisper model plus the decoding strategy it currently runs with.
pub struct WhisperInference {
    config: WhisperAdapterConfig,
    context: WhisperContext,
    strategy: DecodingStrategy,
}

impl WhisperInference {
    pub fn load(config: WhisperAdapterConfig) -> Result<Self, DomainError> {
        let context =
            WhisperContext::new_with_params(&config.model_path, WhisperContextParameters::default())
                .map_err(|err| {
                    DomainError::external_service_error(
                        "whisper",
                        &format!("failed to load model: {err}"),
                    )
                })?;
        tracing::info!(
            model_path = %config.model_path,
            threads = config.threads,
            timestamps = config.timestamps,
            "whisper model loaded"
        );

        Ok(Self {
            config,
            context,
            strategy: DecodingStrategy::Greedy,
        })
    }

    fn sampling(&self) -> SamplingStrategy {
        match self.strategy {
            DecodingStrategy::Greedy => SamplingStrategy::Greedy { best_of: 1 },
            DecodingStrategy::BeamSearch { beam_size } => SamplingStrategy::BeamSearch {
                beam_size: beam_size as i32,
                patience: -1.0,
            },
        }
    }

    fn decode(
        &self,
        samples: &[f32],
        request: &InferenceRequest,
    ) -> Result<Vec<DecodedSegment>, DomainError> {
        let mut state = self.context.create_state().map_err(|err| {
            DomainError::external_service_error(
                "whisper",
                &format!("failed to create state: {err}"),
            )
        })?;

        let timestamps = request.timestamps && self.config.timestamps;
        let mut params = FullParams::new(self.sampling());
        params.set_n_threads(self.config.threads as i32);
        params.set_language(Some(request.source_language.as_str()));
        params.set_translate(request.target_language != request.source_language);
        params.set_no_timestamps(false);
        params.set_token_timestamps(timestamps);
        params.set_temperature(self.config.temperature);
        params.set_single_segment(false);
        params.set_print_realtime(false);
        params.set_print_progress(false);
        params.set_print_timestamps(false);
        let prompt = boost_prompt(&request.word_boost);
        if let Some(prompt) = prompt.as_deref() {
            params.set_initial_prompt(prompt);
        }

        state.full(params, samples).map_err(|err| {
            DomainError::external_service_error("whisper", &format!("full decode failed: {err}"))
        })?;

        let mut segments = Vec::new();
        for idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(idx) else {
                continue;
            };
            let start_ms = to_ms_10ms_units(segment.start_timestamp()).unwrap_or(0);
            let end_ms = to_ms_10ms_units(segment.end_timestamp()).unwrap_or(start_ms);
            let text = segment
                .to_str_lossy()
                .map(|cow| cow.to_string())
                .unwrap_or_default();

            let mut tokens = Vec::new();
            if timestamps {
                for token_idx in 0..segment.n_tokens().max(0) {
                    let Some(token) = segment.get_token(token_idx) else {
                        continue;
                    };
                    let token_text = token
                        .to_str_lossy()
                        .map(|cow| cow.to_string())
                        .unwrap_or_default();
                    tokens.push((token_text, token_hint(token.token_data())));
                }
            }

            segments.push(DecodedSegment {
                text,
                start_ms,
                end_ms,
                tokens,
            });
        }
        Ok(segments)
    }
}

fn token_hint(token_data: WhisperTokenData) -> TokenHint {
    TokenHint {
        start_ms: to_ms_10ms_units(token_data.t_dtw).or_else(|| to_ms_10ms_units(token_data.t0)),
        end_ms: to_ms_10ms_units(token_data.t1),
    }
}

impl InferencePort for WhisperInference {
    fn supports_timestamps(&self) -> bool {
        self.config.timestamps
    }

    fn reconfigure_decoding(&mut self, profile: &DecodingProfile) -> Result<(), DomainError> {
        let strategy = DecodingStrategy::from_profile(profile)?;
        tracing::debug!(?strategy, "whisper decoding strategy set");
        self.strategy = strategy;
        Ok(())
    }

    fn transcribe(
        &mut self,
        request: &InferenceRequest,
    ) -> Result<Vec<ChunkTranscript>, DomainError> {
        tracing::debug!(
            files = request.audio_paths.len(),
            batch_size = request.batch_size,
            language = %request.source_language,
            strategy = ?self.strategy,
            "whisper transcription"
        );

        request
            .audio_paths
            .iter()
            .map(|path| {
                let samples = read_mono_samples(path)?;
                let segments = self.decode(&samples, request)?;
                Ok(build_transcript(
                    &segments,
                    request.punctuation,
                    request.timestamps && self.config.timestamps,
                ))
            })
            .collect()
    }
}
