//! Optional font styling applied to a finished subtitle file.
//!
//! SRT players honor inline `<font>` markup; WebVTT renderers do not, so the
//! pass warns and leaves VTT files untouched instead of corrupting them.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::config::FontOptions;
use crate::cue::CaptionDocument;
use crate::error::Result;
use crate::output_format::OutputFormat;
use crate::srt_encoder::parse_srt;

/// Wrap every cue's text in the configured font markup, rewriting the file
/// in place. Timings and ordering are preserved exactly.
///
/// Nesting is an observable serialization detail: the face span is applied
/// first and the size span wraps it, so a fully-styled cue reads
/// `<font size='20'><font face='Arial'>text</font></font>`.
pub fn apply_font_styling(path: &Path, opts: &FontOptions, format: OutputFormat) -> Result<()> {
    if !opts.any_set() {
        return Ok(());
    }

    if !format.supports_inline_styling() {
        tracing::warn!(
            format = %format,
            "font options are not supported for this output format, leaving the file unchanged"
        );
        return Ok(());
    }

    let contents = fs::read_to_string(path)?;
    let mut cues = parse_srt(&contents)?;

    for cue in &mut cues {
        if let Some(font) = &opts.font {
            cue.text = format!("<font face='{font}'>{}</font>", cue.text);
        }
        if let Some(size) = opts.font_size {
            cue.text = format!("<font size='{size}'>{}</font>", cue.text);
        }
    }

    let file = fs::File::create(path)?;
    CaptionDocument::new(format, cues).write_to(BufWriter::new(file))?;

    Ok(())
}
