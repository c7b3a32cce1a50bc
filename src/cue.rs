use std::io::Write;

use serde::Serialize;

use crate::cue_encoder::CueEncoder;
use crate::error::Result;
use crate::output_format::OutputFormat;
use crate::srt_encoder::SrtEncoder;
use crate::vtt_encoder::VttEncoder;

/// A single timed caption entry.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds.
    pub start_seconds: f32,

    /// End time in seconds; never earlier than `start_seconds`.
    pub end_seconds: f32,

    /// Caption text, possibly carrying inline markup.
    pub text: String,
}

/// An ordered sequence of cues tagged with the format they serialize to.
///
/// Cues are ordered by start time non-decreasing; a successful transcription
/// of speech produces a non-empty document.
#[derive(Debug, Clone)]
pub struct CaptionDocument {
    pub format: OutputFormat,
    pub cues: Vec<Cue>,
}

impl CaptionDocument {
    pub fn new(format: OutputFormat, cues: Vec<Cue>) -> Self {
        Self { format, cues }
    }

    /// Serialize every cue through the format's encoder.
    pub fn write_to<W: Write>(&self, w: W) -> Result<()> {
        let mut encoder: Box<dyn CueEncoder + '_> = match self.format {
            OutputFormat::Srt => Box::new(SrtEncoder::new(w)),
            OutputFormat::Vtt => Box::new(VttEncoder::new(w)),
        };

        for cue in &self.cues {
            encoder.write_cue(cue)?;
        }
        encoder.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cues() -> Vec<Cue> {
        vec![
            Cue {
                start_seconds: 0.0,
                end_seconds: 1.0,
                text: "first".to_owned(),
            },
            Cue {
                start_seconds: 1.0,
                end_seconds: 2.0,
                text: "second".to_owned(),
            },
        ]
    }

    #[test]
    fn document_serializes_as_srt() -> anyhow::Result<()> {
        let mut out = Vec::new();
        CaptionDocument::new(OutputFormat::Srt, cues()).write_to(&mut out)?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("1\n00:00:00,000 --> 00:00:01,000\nfirst\n\n"));
        assert!(s.contains("2\n00:00:01,000 --> 00:00:02,000\nsecond\n\n"));
        Ok(())
    }

    #[test]
    fn document_serializes_as_vtt() -> anyhow::Result<()> {
        let mut out = Vec::new();
        CaptionDocument::new(OutputFormat::Vtt, cues()).write_to(&mut out)?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("WEBVTT\n\n"));
        assert!(s.contains("00:00:00.000 --> 00:00:01.000\nfirst\n\n"));
        Ok(())
    }
}
