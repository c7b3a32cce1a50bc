use serde::Serialize;

/// A single spoken word with timing, as reported by the local model.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Word {
    /// Start time in seconds.
    pub start_seconds: f32,
    /// End time in seconds.
    pub end_seconds: f32,
    /// Word text without surrounding whitespace.
    pub text: String,
}

/// A contiguous span of transcribed speech.
///
/// `words` is empty when the backend could not produce word-level timing;
/// consumers fall back to segment-level cues in that case.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Segment {
    pub start_seconds: f32,
    pub end_seconds: f32,
    pub text: String,
    pub words: Vec<Word>,
}
