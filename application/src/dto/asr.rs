use validator::Validate;

use asr_domain::ResponseFormat;

use crate::ApplicationError;

const DEFAULT_LANGUAGE: &str = "en";

/// Decoding values applied when the form leaves a field out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDefaults {
    pub beam_size: u32,
    pub batch_size: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            beam_size: 1,
            batch_size: 1,
        }
    }
}

/// Form fields exactly as received, before any interpretation.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionForm {
    pub language: Option<String>,
    pub pnc: Option<String>,
    pub timestamps: Option<String>,
    pub beam_size: Option<String>,
    pub batch_size: Option<String>,
    pub response_format: Option<String>,
    pub word_boosting: Option<String>,
}

impl TranscriptionForm {
    /// Fields accepted by the OpenAI-compatible endpoint; decoding knobs are pinned.
    pub fn openai_compatible(
        language: Option<String>,
        response_format: Option<String>,
        word_boosting: Option<String>,
    ) -> Self {
        Self {
            language,
            pnc: Some("yes".to_string()),
            timestamps: Some("no".to_string()),
            beam_size: Some("1".to_string()),
            batch_size: Some("1".to_string()),
            response_format,
            word_boosting,
        }
    }

    pub fn into_request(
        self,
        audio: Vec<u8>,
        defaults: RequestDefaults,
    ) -> Result<TranscribeAudioRequest, ApplicationError> {
        let response_format = match non_empty(self.response_format.as_deref()) {
            None => ResponseFormat::Json,
            Some(raw) => ResponseFormat::parse(raw)
                .ok_or_else(|| ApplicationError::UnsupportedResponseFormat(raw.to_string()))?,
        };

        let request = TranscribeAudioRequest {
            language: non_empty(self.language.as_deref())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
            punctuation: parse_pnc(self.pnc.as_deref()),
            timestamps: parse_timestamps(self.timestamps.as_deref()),
            beam_size: parse_integer("beam_size", self.beam_size.as_deref(), defaults.beam_size)?,
            batch_size: parse_integer(
                "batch_size",
                self.batch_size.as_deref(),
                defaults.batch_size,
            )?,
            response_format,
            word_boost: parse_word_boosting(self.word_boosting.as_deref()),
            audio,
        };
        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct TranscribeAudioRequest {
    #[validate(length(min = 1, max = 16))]
    pub language: String,
    pub punctuation: bool,
    /// Caller's timestamp flag; the effective value also depends on the format.
    pub timestamps: bool,
    #[validate(range(min = 1))]
    pub beam_size: u32,
    #[validate(range(min = 1))]
    pub batch_size: u32,
    pub response_format: ResponseFormat,
    pub word_boost: Vec<String>,
    pub audio: Vec<u8>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_pnc(value: Option<&str>) -> bool {
    match non_empty(value) {
        None => true,
        Some("yes") => true,
        Some("no") => false,
        Some(raw) => {
            tracing::warn!(pnc = raw, "unknown pnc value, keeping punctuation enabled");
            true
        }
    }
}

fn parse_timestamps(value: Option<&str>) -> bool {
    match non_empty(value) {
        None => false,
        Some("yes") => true,
        Some("no") => false,
        Some(raw) => {
            tracing::warn!(timestamps = raw, "unknown timestamps value, disabling timestamps");
            false
        }
    }
}

fn parse_integer(field: &str, value: Option<&str>, default: u32) -> Result<u32, ApplicationError> {
    let Some(raw) = non_empty(value) else {
        return Ok(default);
    };
    raw.parse::<u32>().map_err(|_| {
        ApplicationError::Validation(format!("{field} must be a positive integer, got '{raw}'"))
    })
}

fn parse_word_boosting(value: Option<&str>) -> Vec<String> {
    let Some(raw) = non_empty(value) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(words) => words
            .into_iter()
            .map(|word| word.trim().to_string())
            .filter(|word| !word.is_empty())
            .collect(),
        Err(err) => {
            tracing::warn!(word_boosting = raw, error = %err, "invalid word_boosting format, ignoring");
            Vec::new()
        }
    }
}
