use asr_domain::{ChunkOutcome, ChunkTimestamps, LanguageTag, TranscriptResult};

pub struct TimestampReconciler;

impl TimestampReconciler {
    /// Merges chunk results, in chunk order, into one global transcript.
    ///
    /// Chunk `i` is shifted by the summed durations of chunks `0..i`; tokens
    /// keep their order inside a chunk. The timeline is `None` unless
    /// `timestamps` is set.
    pub fn reconcile(
        language: LanguageTag,
        outcomes: Vec<ChunkOutcome>,
        timestamps: bool,
    ) -> TranscriptResult {
        let mut timeline = timestamps.then(ChunkTimestamps::default);
        let mut offset = 0.0;
        for outcome in &outcomes {
            if let (Some(global), Some(local)) = (timeline.as_mut(), &outcome.transcript.timestamps) {
                global
                    .words
                    .extend(local.words.iter().map(|word| word.shifted(offset)));
                global
                    .segments
                    .extend(local.segments.iter().map(|segment| segment.shifted(offset)));
            }
            offset += outcome.duration;
        }

        let text = outcomes
            .iter()
            .map(|outcome| outcome.transcript.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        TranscriptResult {
            text,
            language,
            timeline,
            chunks: outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use asr_domain::{ChunkTranscript, TimedToken};

    use super::*;

    fn outcome(index: usize, duration: f64, text: &str, words: &[(&str, f64, f64)]) -> ChunkOutcome {
        ChunkOutcome {
            index,
            start_offset: 0.0,
            duration,
            transcript: ChunkTranscript {
                text: text.to_string(),
                timestamps: Some(ChunkTimestamps {
                    words: words
                        .iter()
                        .map(|(word, start, end)| TimedToken::new(*word, *start, *end))
                        .collect(),
                    segments: vec![TimedToken::new(text, 0.0, duration)],
                }),
            },
        }
    }

    #[test]
    fn second_chunk_is_offset_by_first_chunk_duration() {
        let outcomes = vec![
            outcome(0, 20.0, "hello there", &[("hello", 0.2, 0.6), ("there", 0.7, 1.1)]),
            outcome(1, 20.0, "general kenobi", &[("general", 0.1, 0.5), ("kenobi", 0.6, 1.2)]),
        ];

        let result = TimestampReconciler::reconcile(LanguageTag::new("en"), outcomes, true);

        assert_eq!(result.text, "hello there general kenobi");
        let timeline = result.timeline.expect("timestamps requested");
        let starts: Vec<f64> = timeline.words.iter().map(|word| word.start).collect();
        assert_abs_diff_eq!(starts[0], 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(starts[2], 20.1, epsilon = 1e-9);
        assert_abs_diff_eq!(timeline.words[3].end, 21.2, epsilon = 1e-9);
        assert_abs_diff_eq!(timeline.segments[1].start, 20.0, epsilon = 1e-9);
        assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn offset_of_each_chunk_is_sum_of_previous_durations() {
        let durations = [12.5, 20.0, 7.25, 20.0];
        let outcomes = durations
            .iter()
            .enumerate()
            .map(|(index, duration)| outcome(index, *duration, "w", &[("w", 0.0, 0.1)]))
            .collect();

        let result = TimestampReconciler::reconcile(LanguageTag::new("en"), outcomes, true);

        let words = result.timeline.expect("timeline").words;
        let mut expected = 0.0;
        for (word, duration) in words.iter().zip(durations) {
            assert_abs_diff_eq!(word.start, expected, epsilon = 1e-9);
            expected += duration;
        }
    }

    #[test]
    fn timeline_is_absent_when_not_requested() {
        let outcomes = vec![outcome(0, 5.0, "only text", &[("only", 0.0, 0.3)])];
        let result = TimestampReconciler::reconcile(LanguageTag::new("de"), outcomes, false);
        assert!(result.timeline.is_none());
        assert_eq!(result.text, "only text");
        assert_eq!(result.chunks.len(), 1);
    }

    #[test]
    fn chunk_without_timestamps_still_advances_the_offset() {
        let mut silent = outcome(0, 10.0, "", &[]);
        silent.transcript.timestamps = None;
        let outcomes = vec![silent, outcome(1, 10.0, "late", &[("late", 1.0, 1.5)])];

        let result = TimestampReconciler::reconcile(LanguageTag::new("en"), outcomes, true);

        assert_eq!(result.text, " late");
        let words = result.timeline.expect("timeline").words;
        assert_eq!(words.len(), 1);
        assert_abs_diff_eq!(words[0].start, 11.0, epsilon = 1e-9);
    }
}
