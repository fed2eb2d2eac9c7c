use std::path::Path;

use crate::{ChunkTranscript, DecodingProfile, DomainError, InferenceRequest, ScratchAsset};

/// The speech model. Implementations are stateful (active decoding profile)
/// and not assumed to tolerate concurrent calls, hence `&mut self`.
pub trait InferencePort: Send {
    fn supports_timestamps(&self) -> bool;

    fn reconfigure_decoding(&mut self, profile: &DecodingProfile) -> Result<(), DomainError>;

    /// Returns one transcript per entry of `request.audio_paths`, in order.
    fn transcribe(&mut self, request: &InferenceRequest)
        -> Result<Vec<ChunkTranscript>, DomainError>;
}

pub trait AudioCanonicalizer: Send + Sync {
    /// Converts an uploaded WAV payload to the canonical mono WAV encoding.
    fn to_mono_wav(&self, audio: &[u8]) -> Result<Vec<u8>, DomainError>;
}

pub trait AudioChunker: Send + Sync {
    fn duration_secs(&self, path: &Path) -> Result<f64, DomainError>;

    /// Splits `path` into consecutive sub-files of at most `max_duration_secs`.
    fn split(&self, path: &Path, max_duration_secs: f64) -> Result<Vec<ScratchAsset>, DomainError>;
}
