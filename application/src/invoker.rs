use asr_domain::{ChunkDescriptor, ChunkOutcome, DomainError, InferenceRequest, LanguageTag};

use crate::{ApplicationError, InferenceLease};

/// Per-request knobs forwarded to every inference call.
#[derive(Debug, Clone)]
pub struct ChunkParameters {
    pub language: LanguageTag,
    pub punctuation: bool,
    pub timestamps: bool,
    pub batch_size: u32,
    pub word_boost: Vec<String>,
}

pub struct TranscriptionInvoker {
    parameters: ChunkParameters,
}

impl TranscriptionInvoker {
    pub fn new(parameters: ChunkParameters) -> Self {
        Self { parameters }
    }

    /// Transcribes one chunk, then deletes its scratch file whatever the outcome.
    pub async fn invoke(
        &self,
        lease: &mut InferenceLease,
        chunk: ChunkDescriptor,
    ) -> Result<ChunkOutcome, ApplicationError> {
        let ChunkDescriptor {
            index,
            start_offset,
            duration,
            asset,
        } = chunk;

        let request = InferenceRequest {
            audio_paths: vec![asset.path().to_path_buf()],
            source_language: self.parameters.language.clone(),
            target_language: self.parameters.language.clone(),
            punctuation: self.parameters.punctuation,
            timestamps: self.parameters.timestamps,
            batch_size: self.parameters.batch_size,
            word_boost: self.parameters.word_boost.clone(),
        };
        tracing::debug!(
            chunk_index = index,
            duration_secs = duration,
            timestamps = request.timestamps,
            "transcribing chunk"
        );

        let result = lease.transcribe(request).await;

        if let Err(err) = asset.release() {
            tracing::warn!(chunk_index = index, error = %err, "failed to delete chunk file");
        }

        let mut transcript = result
            .and_then(|mut transcripts| {
                if transcripts.is_empty() {
                    return Err(DomainError::internal_error("model returned no transcript"));
                }
                Ok(transcripts.swap_remove(0))
            })
            .map_err(|source| ApplicationError::ChunkTranscriptionFailed { index, source })?;

        if !self.parameters.timestamps {
            transcript.timestamps = None;
        }

        Ok(ChunkOutcome {
            index,
            start_offset,
            duration,
            transcript,
        })
    }
}
