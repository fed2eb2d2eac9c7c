use asr_domain::TimedToken;

/// Renders word timings as SRT cues.
///
/// Words are grouped in order into cues of at most `max_words_per_cue`
/// words. A cue runs from its first word's start to its last word's end.
pub fn render_srt(words: &[TimedToken], max_words_per_cue: usize) -> String {
    render_cues(words, max_words_per_cue, ',')
}

/// Same cues as [`render_srt`], with the `WEBVTT` header and `.` as the
/// millisecond separator.
pub fn render_vtt(words: &[TimedToken], max_words_per_cue: usize) -> String {
    format!("WEBVTT\n\n{}", render_cues(words, max_words_per_cue, '.'))
}

fn render_cues(words: &[TimedToken], max_words_per_cue: usize, separator: char) -> String {
    words
        .chunks(max_words_per_cue.max(1))
        .enumerate()
        .map(|(idx, cue)| {
            let start = cue.first().map(|word| word.start).unwrap_or_default();
            let end = cue.last().map(|word| word.end).unwrap_or(start);
            let text = cue
                .iter()
                .map(|word| word.text.trim())
                .filter(|word| !word.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                "{}\n{} --> {}\n{}\n",
                idx + 1,
                format_timestamp(start, separator),
                format_timestamp(end, separator),
                text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_timestamp(seconds: f64, separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}{separator}{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Vec<TimedToken> {
        vec![
            TimedToken::new("Hello,", 0.0, 0.48),
            TimedToken::new("world", 0.5, 1.0),
            TimedToken::new("again", 61.25, 3725.0021),
        ]
    }

    #[test]
    fn timestamps_round_to_milliseconds() {
        assert_eq!(format_timestamp(0.0, ','), "00:00:00,000");
        assert_eq!(format_timestamp(1.2346, ','), "00:00:01,235");
        assert_eq!(format_timestamp(3725.5, '.'), "01:02:05.500");
        assert_eq!(format_timestamp(-0.3, ','), "00:00:00,000");
    }

    #[test]
    fn srt_groups_words_into_numbered_cues() {
        let srt = render_srt(&words(), 2);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:01,000\nHello, world\n\
             \n\
             2\n00:01:01,250 --> 01:02:05,002\nagain\n"
        );
    }

    #[test]
    fn vtt_has_header_and_dot_separators_but_keeps_text_commas() {
        let vtt = render_vtt(&words(), 8);
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert_eq!(
            vtt,
            "WEBVTT\n\n1\n00:00:00.000 --> 01:02:05.002\nHello, world again\n"
        );
        for line in vtt.lines().filter(|line| line.contains("-->")) {
            assert!(!line.contains(','), "comma in timing line {line}");
        }
    }

    #[test]
    fn zero_cue_size_falls_back_to_one_word_per_cue() {
        let srt = render_srt(&words(), 0);
        assert_eq!(srt.matches("-->").count(), 3);
    }
}
