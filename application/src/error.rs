use thiserror::Error;

use asr_domain::{DomainError, ResponseFormat};

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Unsupported language '{language}'. Supported languages: {supported}")]
    UnsupportedLanguage { language: String, supported: String },
    #[error("Invalid audio format (must be WAV)")]
    InvalidAudioContainer,
    #[error("Unsupported response_format '{0}'. Supported formats: text, json, verbose_json, srt, vtt")]
    UnsupportedResponseFormat(String),
    #[error("Timestamps are not supported by the loaded model")]
    TimestampsUnsupported,
    #[error("Timestamps are required for {0} output. Set timestamps=yes.")]
    TimestampsRequiredForFormat(ResponseFormat),
    #[error("decoding reconfiguration to beam_size={beam_size} failed: {source}")]
    DecodingReconfigurationFailed {
        beam_size: u32,
        #[source]
        source: DomainError,
    },
    #[error("transcription of chunk {index} failed: {source}")]
    ChunkTranscriptionFailed {
        index: usize,
        #[source]
        source: DomainError,
    },
    #[error("{0}")]
    Validation(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Errors caused by the request itself, safe to echo back to the caller.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLanguage { .. }
                | Self::InvalidAudioContainer
                | Self::UnsupportedResponseFormat(_)
                | Self::TimestampsUnsupported
                | Self::TimestampsRequiredForFormat(_)
                | Self::Validation(_)
        )
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidInput(message) => Self::Validation(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApplicationError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
