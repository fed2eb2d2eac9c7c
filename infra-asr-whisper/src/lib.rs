mod audio;
#[cfg(feature = "whisper-runtime")]
mod runtime;
mod tokens;

use asr_domain::{ChunkTimestamps, ChunkTranscript, DecodingProfile, DomainError, TimedToken};

pub use audio::{read_mono_samples, WHISPER_SAMPLE_RATE_HZ};
#[cfg(feature = "whisper-runtime")]
pub use runtime::WhisperInference;
pub use tokens::{
    assemble_words, is_special_token, resolve_token_windows, strip_punctuation, to_ms_10ms_units,
    TokenHint,
};

/// Widest beam whisper.cpp accepts.
pub const MAX_BEAM_SIZE: u32 = 8;

#[derive(Debug, Clone)]
pub struct WhisperAdapterConfig {
    pub model_path: String,
    pub temperature: f32,
    pub threads: usize,
    /// Whether word and segment timings are reported.
    pub timestamps: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingStrategy {
    Greedy,
    BeamSearch { beam_size: u32 },
}

impl DecodingStrategy {
    pub fn from_profile(profile: &DecodingProfile) -> Result<Self, DomainError> {
        match profile.beam_size {
            0 => Err(DomainError::invalid_input("beam size must be at least 1")),
            1 => Ok(Self::Greedy),
            beam_size if beam_size <= MAX_BEAM_SIZE => Ok(Self::BeamSearch { beam_size }),
            beam_size => Err(DomainError::external_service_error(
                "whisper",
                &format!("beam size {beam_size} exceeds the supported maximum of {MAX_BEAM_SIZE}"),
            )),
        }
    }
}

/// Builds the decoder prompt that biases it towards the boosted words.
pub fn boost_prompt(words: &[String]) -> Option<String> {
    let words: Vec<&str> = words
        .iter()
        .map(|word| word.trim())
        .filter(|word| !word.is_empty())
        .collect();
    (!words.is_empty()).then(|| words.join(", "))
}

/// One decoded segment as whisper reports it.
#[derive(Debug, Clone, Default)]
pub struct DecodedSegment {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub tokens: Vec<(String, TokenHint)>,
}

pub fn build_transcript(
    segments: &[DecodedSegment],
    punctuation: bool,
    timestamps: bool,
) -> ChunkTranscript {
    let clean = |text: &str| {
        if punctuation {
            text.trim().to_string()
        } else {
            strip_punctuation(text)
        }
    };

    let text = segments
        .iter()
        .map(|segment| clean(&segment.text))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let timestamps = timestamps.then(|| {
        let mut timed_tokens = Vec::new();
        let mut timed_segments = Vec::with_capacity(segments.len());
        for segment in segments {
            let hints: Vec<TokenHint> = segment.tokens.iter().map(|(_, hint)| *hint).collect();
            let windows = resolve_token_windows(segment.start_ms, segment.end_ms, &hints);
            for ((token_text, _), (start_ms, end_ms)) in segment.tokens.iter().zip(windows) {
                timed_tokens.push(TimedToken::new(
                    token_text.as_str(),
                    ms_to_secs(start_ms),
                    ms_to_secs(end_ms),
                ));
            }
            timed_segments.push(TimedToken::new(
                clean(&segment.text),
                ms_to_secs(segment.start_ms),
                ms_to_secs(segment.end_ms.max(segment.start_ms)),
            ));
        }

        let words = assemble_words(&timed_tokens)
            .into_iter()
            .filter_map(|mut word| {
                word.text = clean(&word.text);
                (!word.text.is_empty()).then_some(word)
            })
            .collect();
        ChunkTimestamps {
            words,
            segments: timed_segments,
        }
    });

    ChunkTranscript { text, timestamps }
}

fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hinted(text: &str, start_ms: u64, end_ms: u64) -> (String, TokenHint) {
        (
            text.to_string(),
            TokenHint {
                start_ms: Some(start_ms),
                end_ms: Some(end_ms),
            },
        )
    }

    fn sample_segments() -> Vec<DecodedSegment> {
        vec![
            DecodedSegment {
                text: " Hello, world.".to_string(),
                start_ms: 0,
                end_ms: 1_000,
                tokens: vec![
                    hinted("[_BEG_]", 0, 0),
                    hinted(" Hello", 0, 400),
                    hinted(",", 400, 450),
                    hinted(" world", 500, 900),
                    hinted(".", 900, 1_000),
                ],
            },
            DecodedSegment {
                text: " Again!".to_string(),
                start_ms: 1_000,
                end_ms: 1_500,
                tokens: vec![hinted(" Again", 1_000, 1_400), hinted("!", 1_400, 1_500)],
            },
        ]
    }

    #[test]
    fn beam_one_is_greedy_and_wider_beams_search() {
        assert_eq!(
            DecodingStrategy::from_profile(&DecodingProfile::with_beam_size(1)).expect("greedy"),
            DecodingStrategy::Greedy
        );
        assert_eq!(
            DecodingStrategy::from_profile(&DecodingProfile::with_beam_size(5)).expect("beam"),
            DecodingStrategy::BeamSearch { beam_size: 5 }
        );
    }

    #[test]
    fn out_of_range_beams_are_rejected() {
        assert!(DecodingStrategy::from_profile(&DecodingProfile::with_beam_size(0)).is_err());
        assert!(DecodingStrategy::from_profile(&DecodingProfile::with_beam_size(9)).is_err());
    }

    #[test]
    fn boost_prompt_skips_blank_words() {
        assert_eq!(
            boost_prompt(&["Canary".to_string(), " ".to_string(), "NeMo ".to_string()]),
            Some("Canary, NeMo".to_string())
        );
        assert_eq!(boost_prompt(&[]), None);
    }

    #[test]
    fn transcript_keeps_punctuation_and_builds_word_timeline() {
        let transcript = build_transcript(&sample_segments(), true, true);

        assert_eq!(transcript.text, "Hello, world. Again!");
        let timestamps = transcript.timestamps.expect("timestamps requested");
        let words: Vec<&str> = timestamps.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["Hello,", "world.", "Again!"]);
        assert_eq!(timestamps.words[1].start, 0.5);
        assert_eq!(timestamps.words[1].end, 1.0);
        assert_eq!(timestamps.segments.len(), 2);
        assert_eq!(timestamps.segments[1].start, 1.0);
    }

    #[test]
    fn transcript_without_punctuation_is_normalized() {
        let transcript = build_transcript(&sample_segments(), false, true);

        assert_eq!(transcript.text, "hello world again");
        let timestamps = transcript.timestamps.expect("timestamps requested");
        let words: Vec<&str> = timestamps.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["hello", "world", "again"]);
    }

    #[test]
    fn timestamps_are_omitted_when_not_requested() {
        let transcript = build_transcript(&sample_segments(), true, false);
        assert!(transcript.timestamps.is_none());
    }
}
