//! Turns the local backend's raw segments into caption cues.
//!
//! Two independent transformations compose here:
//! - regrouping words into captions of at most `max_words_per_caption` words
//! - word-level highlight rendering, where each spoken word gets its own cue
//!   with the active word wrapped in a markup pair
//!
//! The hosted backend never reaches this module; it renders cues itself.

use crate::config::LocalWhisperOptions;
use crate::cue::Cue;
use crate::segment::Segment;

/// Markup pair used when highlighting is on but no color was requested.
const DEFAULT_HIGHLIGHT_TAG: (&str, &str) = ("<u>", "</u>");

/// Convert raw transcription segments into ordered caption cues.
pub fn format_transcript(segments: &[Segment], opts: &LocalWhisperOptions) -> Vec<Cue> {
    let regrouped;
    let segments = match opts.max_words_per_caption {
        Some(n) if n > 0 => {
            regrouped = regroup_by_max_words(segments, n as usize);
            regrouped.as_slice()
        }
        _ => segments,
    };

    match highlight_tag(opts) {
        Some((open, close)) => word_level_cues(segments, &open, &close),
        None => segments.iter().map(plain_cue).collect(),
    }
}

/// Derive the effective highlight markup pair.
///
/// A highlight color implies highlighting even when it was not requested
/// directly; a bare highlight request falls back to the underline pair.
fn highlight_tag(opts: &LocalWhisperOptions) -> Option<(String, String)> {
    if let Some(color) = opts.highlight_color {
        return Some(color.markup_pair());
    }
    if opts.highlight_words {
        let (open, close) = DEFAULT_HIGHLIGHT_TAG;
        return Some((open.to_owned(), close.to_owned()));
    }
    None
}

/// Split segments so no caption carries more than `max_words` words.
///
/// Chunking happens within each segment, so natural sentence boundaries
/// survive. Cue timings are recomputed from the covered words; the word
/// sequence itself is preserved exactly.
fn regroup_by_max_words(segments: &[Segment], max_words: usize) -> Vec<Segment> {
    let mut out = Vec::new();

    for segment in segments {
        if segment.words.is_empty() {
            // No word timing to split on; keep the segment whole.
            out.push(segment.clone());
            continue;
        }

        for chunk in segment.words.chunks(max_words) {
            let (Some(first), Some(last)) = (chunk.first(), chunk.last()) else {
                continue;
            };
            out.push(Segment {
                start_seconds: first.start_seconds,
                end_seconds: last.end_seconds,
                text: chunk
                    .iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
                words: chunk.to_vec(),
            });
        }
    }

    out
}

/// Render one cue per spoken word, with the active word wrapped in the tag
/// pair. Downstream players animate the highlight by flipping through cues.
fn word_level_cues(segments: &[Segment], open: &str, close: &str) -> Vec<Cue> {
    let mut cues = Vec::new();

    for segment in segments {
        if segment.words.is_empty() {
            // No word timing available; fall back to a plain segment cue.
            cues.push(plain_cue(segment));
            continue;
        }

        for (active, word) in segment.words.iter().enumerate() {
            let text = segment
                .words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    if i == active {
                        format!("{open}{}{close}", w.text)
                    } else {
                        w.text.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");

            cues.push(Cue {
                start_seconds: word.start_seconds,
                end_seconds: word.end_seconds,
                text,
            });
        }
    }

    cues
}

fn plain_cue(segment: &Segment) -> Cue {
    Cue {
        start_seconds: segment.start_seconds,
        end_seconds: segment.end_seconds,
        text: segment.text.trim().to_owned(),
    }
}
