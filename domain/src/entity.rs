use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ChunkAsset;

/// ISO-639-1 style language code, e.g. `en`. Compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn new(code: &str) -> Self {
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    Json,
    VerboseJson,
    Srt,
    Vtt,
}

impl ResponseFormat {
    pub const ALL: [ResponseFormat; 5] = [
        ResponseFormat::Text,
        ResponseFormat::Json,
        ResponseFormat::VerboseJson,
        ResponseFormat::Srt,
        ResponseFormat::Vtt,
    ];

    /// Exact wire name only; `JSON` is not `json`.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::VerboseJson => "verbose_json",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    pub fn is_subtitle(self) -> bool {
        matches!(self, Self::Srt | Self::Vtt)
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A word or segment with start/end times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TimedToken {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            text: self.text.clone(),
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkTimestamps {
    pub words: Vec<TimedToken>,
    pub segments: Vec<TimedToken>,
}

/// Raw output of one inference call for one audio input.
///
/// `timestamps` is `None` when they were not requested or the model did not
/// emit any; times are relative to the start of that input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkTranscript {
    pub text: String,
    pub timestamps: Option<ChunkTimestamps>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodingProfile {
    pub beam_size: u32,
}

impl DecodingProfile {
    pub fn with_beam_size(beam_size: u32) -> Self {
        Self { beam_size }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub audio_paths: Vec<PathBuf>,
    pub source_language: LanguageTag,
    pub target_language: LanguageTag,
    pub punctuation: bool,
    pub timestamps: bool,
    pub batch_size: u32,
    pub word_boost: Vec<String>,
}

/// One contiguous slice of the request audio, in playback order.
#[derive(Debug)]
pub struct ChunkDescriptor {
    pub index: usize,
    pub start_offset: f64,
    pub duration: f64,
    pub asset: ChunkAsset,
}

/// Per-chunk result kept alongside the timing it was produced for.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOutcome {
    pub index: usize,
    pub start_offset: f64,
    pub duration: f64,
    pub transcript: ChunkTranscript,
}

/// Merged transcript in global time.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptResult {
    pub text: String,
    pub language: LanguageTag,
    pub timeline: Option<ChunkTimestamps>,
    pub chunks: Vec<ChunkOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_format_parses_exact_wire_names() {
        assert_eq!(ResponseFormat::parse("json"), Some(ResponseFormat::Json));
        assert_eq!(
            ResponseFormat::parse("verbose_json"),
            Some(ResponseFormat::VerboseJson)
        );
        assert_eq!(ResponseFormat::parse("vtt"), Some(ResponseFormat::Vtt));
        assert_eq!(ResponseFormat::parse("tsv"), None);
        assert_eq!(ResponseFormat::parse("Verbose_JSON"), None);
        assert_eq!(ResponseFormat::parse("SRT"), None);
    }

    #[test]
    fn only_srt_and_vtt_are_subtitles() {
        let subtitles: Vec<_> = ResponseFormat::ALL
            .into_iter()
            .filter(|format| format.is_subtitle())
            .collect();
        assert_eq!(subtitles, [ResponseFormat::Srt, ResponseFormat::Vtt]);
    }

    #[test]
    fn response_format_serializes_as_wire_name() {
        let value = serde_json::to_value(ResponseFormat::VerboseJson).expect("serializes");
        assert_eq!(value, serde_json::json!("verbose_json"));
    }

    #[test]
    fn shifted_token_moves_both_bounds() {
        let token = TimedToken::new("hello", 0.5, 0.75).shifted(20.0);
        assert_eq!(token.start, 20.5);
        assert_eq!(token.end, 20.75);
        assert_eq!(token.text, "hello");
    }

    #[test]
    fn language_tag_keeps_code_as_given() {
        assert_eq!(LanguageTag::new("en").as_str(), "en");
        assert_ne!(LanguageTag::new("EN"), LanguageTag::new("en"));
    }
}
