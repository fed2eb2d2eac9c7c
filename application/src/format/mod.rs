mod subtitle;

use serde::Serialize;
use serde_json::Value;

use asr_domain::{ChunkTimestamps, ResponseFormat, TranscriptResult};

use crate::ApplicationError;

pub use subtitle::{render_srt, render_vtt};

/// Final response body, tagged by how it has to be served.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionPayload {
    Text(String),
    Json(Value),
    Srt(String),
    Vtt(String),
}

pub struct OutputFormatter {
    max_words_per_cue: usize,
}

impl OutputFormatter {
    pub fn new(max_words_per_cue: usize) -> Self {
        Self {
            max_words_per_cue: max_words_per_cue.max(1),
        }
    }

    pub fn render(
        &self,
        result: &TranscriptResult,
        format: ResponseFormat,
    ) -> Result<TranscriptionPayload, ApplicationError> {
        match format {
            ResponseFormat::Text => Ok(TranscriptionPayload::Text(normalize_whitespace(
                &result.text,
            ))),
            ResponseFormat::Json => to_json(&JsonBody {
                text: &result.text,
                timestamps: result.timeline.as_ref().map(TimelineBody::from),
            })
            .map(TranscriptionPayload::Json),
            ResponseFormat::VerboseJson => {
                let records: Vec<ChunkRecord<'_>> = result
                    .chunks
                    .iter()
                    .map(|chunk| ChunkRecord {
                        index: chunk.index,
                        offset: chunk.start_offset,
                        duration: chunk.duration,
                        text: &chunk.transcript.text,
                        language: result.language.as_str(),
                        timestamps: chunk.transcript.timestamps.as_ref().map(TimelineBody::from),
                    })
                    .collect();
                to_json(&records).map(TranscriptionPayload::Json)
            }
            ResponseFormat::Srt | ResponseFormat::Vtt => {
                let words = result
                    .timeline
                    .as_ref()
                    .map(|timeline| timeline.words.as_slice())
                    .filter(|words| !words.is_empty())
                    .ok_or(ApplicationError::TimestampsRequiredForFormat(format))?;
                Ok(if format == ResponseFormat::Srt {
                    TranscriptionPayload::Srt(render_srt(words, self.max_words_per_cue))
                } else {
                    TranscriptionPayload::Vtt(render_vtt(words, self.max_words_per_cue))
                })
            }
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn to_json<T: Serialize>(body: &T) -> Result<Value, ApplicationError> {
    serde_json::to_value(body)
        .map_err(|err| ApplicationError::Internal(format!("failed to encode response: {err}")))
}

#[derive(Serialize)]
struct JsonBody<'a> {
    text: &'a str,
    timestamps: Option<TimelineBody<'a>>,
}

#[derive(Serialize)]
struct ChunkRecord<'a> {
    index: usize,
    offset: f64,
    duration: f64,
    text: &'a str,
    language: &'a str,
    timestamps: Option<TimelineBody<'a>>,
}

#[derive(Serialize)]
struct TimelineBody<'a> {
    word: Vec<WordEntry<'a>>,
    segment: Vec<SegmentEntry<'a>>,
}

#[derive(Serialize)]
struct WordEntry<'a> {
    word: &'a str,
    start: f64,
    end: f64,
}

#[derive(Serialize)]
struct SegmentEntry<'a> {
    segment: &'a str,
    start: f64,
    end: f64,
}

impl<'a> From<&'a ChunkTimestamps> for TimelineBody<'a> {
    fn from(timestamps: &'a ChunkTimestamps) -> Self {
        Self {
            word: timestamps
                .words
                .iter()
                .map(|word| WordEntry {
                    word: &word.text,
                    start: word.start,
                    end: word.end,
                })
                .collect(),
            segment: timestamps
                .segments
                .iter()
                .map(|segment| SegmentEntry {
                    segment: &segment.text,
                    start: segment.start,
                    end: segment.end,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use asr_domain::{ChunkOutcome, ChunkTranscript, LanguageTag, TimedToken};
    use serde_json::json;

    use super::*;

    fn result(with_timeline: bool) -> TranscriptResult {
        let timestamps = ChunkTimestamps {
            words: vec![
                TimedToken::new("hello", 0.0, 0.5),
                TimedToken::new("world", 0.5, 1.0),
            ],
            segments: vec![TimedToken::new("hello world", 0.0, 1.0)],
        };
        TranscriptResult {
            text: "  hello \n\t world  ".to_string(),
            language: LanguageTag::new("en"),
            timeline: with_timeline.then(|| timestamps.clone()),
            chunks: vec![ChunkOutcome {
                index: 0,
                start_offset: 0.0,
                duration: 1.5,
                transcript: ChunkTranscript {
                    text: "hello world".to_string(),
                    timestamps: with_timeline.then_some(timestamps),
                },
            }],
        }
    }

    #[test]
    fn text_is_whitespace_normalized() {
        let payload = OutputFormatter::new(8)
            .render(&result(false), ResponseFormat::Text)
            .expect("text renders");
        assert_eq!(payload, TranscriptionPayload::Text("hello world".to_string()));
    }

    #[test]
    fn json_without_timestamps_has_null_timestamps() {
        let payload = OutputFormatter::new(8)
            .render(&result(false), ResponseFormat::Json)
            .expect("json renders");
        assert_eq!(
            payload,
            TranscriptionPayload::Json(json!({"text": "  hello \n\t world  ", "timestamps": null}))
        );
    }

    #[test]
    fn json_with_timestamps_exposes_word_and_segment_timelines() {
        let TranscriptionPayload::Json(body) = OutputFormatter::new(8)
            .render(&result(true), ResponseFormat::Json)
            .expect("json renders")
        else {
            panic!("expected json");
        };
        assert_eq!(
            body["timestamps"]["word"][1],
            json!({"word": "world", "start": 0.5, "end": 1.0})
        );
        assert_eq!(
            body["timestamps"]["segment"][0],
            json!({"segment": "hello world", "start": 0.0, "end": 1.0})
        );
    }

    #[test]
    fn verbose_json_lists_every_chunk_record() {
        let TranscriptionPayload::Json(body) = OutputFormatter::new(8)
            .render(&result(true), ResponseFormat::VerboseJson)
            .expect("verbose renders")
        else {
            panic!("expected json");
        };
        let records = body.as_array().expect("array of chunks");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["index"], 0);
        assert_eq!(records[0]["duration"], 1.5);
        assert_eq!(records[0]["language"], "en");
        assert_eq!(records[0]["text"], "hello world");
        assert!(records[0]["timestamps"]["word"].is_array());
    }

    #[test]
    fn subtitles_without_word_timeline_fail() {
        let formatter = OutputFormatter::new(8);
        for format in [ResponseFormat::Srt, ResponseFormat::Vtt] {
            let err = formatter
                .render(&result(false), format)
                .expect_err("no timeline");
            assert!(matches!(err, ApplicationError::TimestampsRequiredForFormat(f) if f == format));
        }

        let mut empty = result(true);
        if let Some(timeline) = empty.timeline.as_mut() {
            timeline.words.clear();
        }
        assert!(formatter.render(&empty, ResponseFormat::Srt).is_err());
    }

    #[test]
    fn rendering_is_deterministic() {
        let formatter = OutputFormatter::new(1);
        let transcript = result(true);
        for format in ResponseFormat::ALL {
            let first = formatter.render(&transcript, format).expect("renders");
            let second = formatter.render(&transcript, format).expect("renders");
            assert_eq!(first, second, "{format} output differs between runs");
        }
    }

    #[test]
    fn srt_payload_uses_configured_cue_size() {
        let payload = OutputFormatter::new(1)
            .render(&result(true), ResponseFormat::Srt)
            .expect("srt renders");
        assert_eq!(
            payload,
            TranscriptionPayload::Srt(
                "1\n00:00:00,000 --> 00:00:00,500\nhello\n\n2\n00:00:00,500 --> 00:00:01,000\nworld\n"
                    .to_string()
            )
        );
    }
}
