use asr_domain::TimedToken;

/// Timing hints whisper reported for one token, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenHint {
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
}

/// Whisper reports token times in 10 ms units; negative means unknown.
pub fn to_ms_10ms_units(raw: i64) -> Option<u64> {
    let raw_u64 = u64::try_from(raw).ok()?;
    raw_u64.checked_mul(10)
}

/// Resolves a `[start, end)` window for every token of a segment.
///
/// Hints are used when present and clamped to the segment span; tokens
/// without hints get an even share of the segment. Every window is at least
/// 1 ms long and windows never start before the segment.
pub fn resolve_token_windows(
    segment_start_ms: u64,
    segment_end_ms: u64,
    hints: &[TokenHint],
) -> Vec<(u64, u64)> {
    let segment_end_ms = segment_end_ms.max(segment_start_ms);
    let token_span = if hints.is_empty() {
        1
    } else {
        (segment_end_ms.saturating_sub(segment_start_ms) / hints.len() as u64).max(1)
    };

    hints
        .iter()
        .enumerate()
        .map(|(idx, hint)| {
            let fallback_start = segment_start_ms.saturating_add(idx as u64 * token_span);
            let fallback_end = fallback_start.saturating_add(token_span).min(segment_end_ms);
            let next_start = hints.get(idx + 1).and_then(|next| next.start_ms);

            let start = hint
                .start_ms
                .unwrap_or(fallback_start)
                .clamp(segment_start_ms, segment_end_ms);
            let end = hint
                .end_ms
                .filter(|end| *end > start)
                .or_else(|| next_start.filter(|next| *next > start))
                .unwrap_or(fallback_end);

            let min_end = start.saturating_add(1);
            (start, end.clamp(min_end, segment_end_ms.max(min_end)))
        })
        .collect()
}

/// Control tokens such as `[_BEG_]` or `<|endoftext|>`.
pub fn is_special_token(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with("[_") || trimmed.starts_with("<|")
}

/// Merges sub-word tokens into words.
///
/// A token opening with whitespace starts a new word; anything else is glued
/// to the current word. Times are in seconds.
pub fn assemble_words(tokens: &[TimedToken]) -> Vec<TimedToken> {
    let mut words: Vec<TimedToken> = Vec::new();
    for token in tokens {
        if token.text.trim().is_empty() || is_special_token(&token.text) {
            continue;
        }
        let starts_word = token.text.starts_with(char::is_whitespace);
        match words.last_mut() {
            Some(word) if !starts_word => {
                word.text.push_str(&token.text);
                word.end = word.end.max(token.end);
            }
            _ => words.push(TimedToken::new(token.text.trim_start(), token.start, token.end)),
        }
    }
    words
}

/// Lower-cases and drops punctuation, collapsing the whitespace left behind.
pub fn strip_punctuation(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_ascii_punctuation() || *c == '\'')
        .flat_map(char::to_lowercase)
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_ms_units_convert_and_negative_is_unknown() {
        assert_eq!(to_ms_10ms_units(12), Some(120));
        assert_eq!(to_ms_10ms_units(-1), None);
    }

    #[test]
    fn hinted_windows_are_clamped_to_segment() {
        let hints = [
            TokenHint {
                start_ms: Some(50),
                end_ms: Some(300),
            },
            TokenHint {
                start_ms: Some(300),
                end_ms: Some(2_000),
            },
        ];
        let windows = resolve_token_windows(100, 1_000, &hints);
        assert_eq!(windows, vec![(100, 300), (300, 1_000)]);
    }

    #[test]
    fn missing_hints_share_the_segment_evenly() {
        let windows = resolve_token_windows(0, 900, &[TokenHint::default(); 3]);
        assert_eq!(windows, vec![(0, 300), (300, 600), (600, 900)]);
    }

    #[test]
    fn missing_end_uses_next_start() {
        let hints = [
            TokenHint {
                start_ms: Some(0),
                end_ms: None,
            },
            TokenHint {
                start_ms: Some(400),
                end_ms: Some(500),
            },
        ];
        let windows = resolve_token_windows(0, 1_000, &hints);
        assert_eq!(windows[0], (0, 400));
    }

    #[test]
    fn zero_length_segment_still_yields_positive_windows() {
        let windows = resolve_token_windows(500, 500, &[TokenHint::default()]);
        assert_eq!(windows, vec![(500, 501)]);
    }

    #[test]
    fn sub_word_tokens_are_merged_and_control_tokens_dropped() {
        let tokens = vec![
            TimedToken::new("[_BEG_]", 0.0, 0.0),
            TimedToken::new(" Hel", 0.0, 0.2),
            TimedToken::new("lo", 0.2, 0.4),
            TimedToken::new(",", 0.4, 0.45),
            TimedToken::new(" world", 0.5, 1.0),
            TimedToken::new("<|endoftext|>", 1.0, 1.0),
        ];
        let words = assemble_words(&tokens);
        assert_eq!(
            words,
            vec![
                TimedToken::new("Hello,", 0.0, 0.45),
                TimedToken::new("world", 0.5, 1.0),
            ]
        );
    }

    #[test]
    fn punctuation_is_stripped_and_text_lowercased() {
        assert_eq!(strip_punctuation(" Hello, World! It's fine. "), "hello world it's fine");
        assert_eq!(strip_punctuation("..."), "");
    }
}
