use std::io::Write;

use crate::cue::Cue;
use crate::cue_encoder::CueEncoder;
use crate::error::{Error, Result};

/// A `CueEncoder` that writes cues in SubRip (SRT) format.
///
/// Design:
/// - We stream output directly to a `Write` implementation.
/// - Cue numbering is handled here so callers never track indices.
/// - This module also carries the minimal SRT parser the styling pass needs
///   to rewrite files it (or the hosted backend) previously produced.
pub struct SrtEncoder<W: Write> {
    /// The underlying writer we stream SRT into.
    w: W,

    /// Index of the next cue to be written. SRT numbering starts at 1.
    next_index: u32,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    /// Create a new SRT encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            next_index: 1,
            closed: false,
        }
    }
}

impl<W: Write> CueEncoder for SrtEncoder<W> {
    /// Write a single numbered cue in SRT format.
    fn write_cue(&mut self, cue: &Cue) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write cue: encoder is already closed"));
        }

        // Index line, timing line, text, then a blank line separating cues.
        writeln!(&mut self.w, "{}", self.next_index)?;
        self.next_index += 1;

        let start = format_timestamp_srt(cue.start_seconds);
        let end = format_timestamp_srt(cue.end_seconds);
        writeln!(&mut self.w, "{start} --> {end}")?;

        writeln!(&mut self.w, "{}", cue.text)?;
        writeln!(&mut self.w)?;

        // Flush so streaming consumers (stdout, pipes) see output promptly.
        self.w.flush()?;

        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Format seconds into an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Rounding policy:
/// - We round to the nearest millisecond to reduce drift when converting from `f32`.
fn format_timestamp_srt(seconds: f32) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Parse an SRT document into cues.
///
/// Tolerances:
/// - CRLF line endings are normalized away.
/// - The numeric index line is optional; timing lines are recognized by the
///   `-->` arrow so renumbered or unnumbered files still parse.
/// - Multi-line cue text is preserved with embedded newlines.
pub fn parse_srt(input: &str) -> Result<Vec<Cue>> {
    let normalized = input.replace("\r\n", "\n");
    let mut cues = Vec::new();

    for block in normalized.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let mut lines = block.lines();
        let first = lines
            .next()
            .ok_or_else(|| Error::MalformedSubtitle(block.to_owned()))?;

        let timing = if first.contains("-->") {
            first
        } else {
            lines
                .next()
                .ok_or_else(|| Error::MalformedSubtitle(block.to_owned()))?
        };

        let (start_seconds, end_seconds) = parse_timing_line(timing)?;
        let text = lines.collect::<Vec<_>>().join("\n");

        cues.push(Cue {
            start_seconds,
            end_seconds,
            text,
        });
    }

    Ok(cues)
}

fn parse_timing_line(line: &str) -> Result<(f32, f32)> {
    let mut parts = line.splitn(2, "-->");
    let start = parts
        .next()
        .ok_or_else(|| Error::MalformedSubtitle(line.to_owned()))?;
    let end = parts
        .next()
        .ok_or_else(|| Error::MalformedSubtitle(line.to_owned()))?;

    Ok((
        parse_timestamp_srt(start.trim())?,
        parse_timestamp_srt(end.trim())?,
    ))
}

/// Parse an `HH:MM:SS,mmm` timestamp into seconds.
fn parse_timestamp_srt(value: &str) -> Result<f32> {
    let malformed = || Error::MalformedSubtitle(value.to_owned());

    let (clock, ms) = value.split_once(',').ok_or_else(malformed)?;
    let mut clock_parts = clock.split(':');

    let h: u64 = clock_parts
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(malformed)?;
    let m: u64 = clock_parts
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(malformed)?;
    let s: u64 = clock_parts
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(malformed)?;
    if clock_parts.next().is_some() {
        return Err(malformed());
    }
    let ms: u64 = ms.parse().map_err(|_| malformed())?;

    Ok((h * 3600 + m * 60 + s) as f32 + ms as f32 / 1000.0)
}
