//! High-level orchestration: media in, subtitle file out.
//!
//! The pipeline is deliberately a straight line:
//! normalize -> size-govern -> resolve prompt -> dispatch backend ->
//! format (local only) -> style (optional) -> write.
//!
//! Every frontend (CLI, GUI, batch jobs) consumes the same uniform
//! [`Outcome`]: diagnostics go to the `tracing` log stream, the returned
//! message is the one line a user should see.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::audio;
use crate::backend::{
    CancelToken, RawTranscript, Transcriber, TranscriptionRequest, select_transcriber,
};
use crate::config::{GenerateConfig, LocalWhisperOptions};
use crate::cue::CaptionDocument;
use crate::error::{Error, Result};
use crate::formatter;
use crate::output_format::OutputFormat;
use crate::prompt;
use crate::styling;
use crate::transcoder::{FfmpegTranscoder, MediaTranscoder};

/// Uniform result contract shared by every entry point.
///
/// `status` follows process exit conventions: 0 for success, 1 for any
/// failure. `message` is the single human-readable line frontends print.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub status: i32,
    pub message: String,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Generate captions using the production collaborators (ffmpeg, real
/// backends) and a fresh cancellation token.
pub fn generate_captions(cfg: &GenerateConfig) -> Outcome {
    generate_captions_with(cfg, &FfmpegTranscoder::new(), &CancelToken::new())
}

/// Generate captions with an explicit transcoder and cancellation token.
///
/// A GUI wires its cancel button to the token; tests substitute a fake
/// transcoder.
pub fn generate_captions_with(
    cfg: &GenerateConfig,
    transcoder: &dyn MediaTranscoder,
    cancel: &CancelToken,
) -> Outcome {
    match run(cfg, transcoder, cancel) {
        Ok(path) => Outcome {
            status: 0,
            message: format!("Transcription complete, saved to {}", path.display()),
        },
        Err(err) => Outcome {
            status: 1,
            message: err.to_string(),
        },
    }
}

fn run(
    cfg: &GenerateConfig,
    transcoder: &dyn MediaTranscoder,
    cancel: &CancelToken,
) -> Result<PathBuf> {
    check_preconditions(cfg)?;

    // Scratch space is unique per run and released when this function
    // returns, success or failure.
    let scratch = tempfile::tempdir()?;

    let transcriber = select_transcriber(cfg, transcoder, scratch.path(), cancel)?;
    run_steps(cfg, transcoder, &*transcriber, scratch.path(), cancel)
}

/// Run the pipeline steps against an explicit backend.
///
/// This is primarily intended for tests and embedding; `generate_captions`
/// performs precondition checks and backend selection before ending up here.
pub fn run_with_transcriber(
    cfg: &GenerateConfig,
    transcoder: &dyn MediaTranscoder,
    transcriber: &dyn Transcriber,
) -> Result<PathBuf> {
    let scratch = tempfile::tempdir()?;
    run_steps(cfg, transcoder, transcriber, scratch.path(), &CancelToken::new())
}

/// Preconditions, checked in order before any work happens. Each failure is
/// fatal and reported without side effects.
fn check_preconditions(cfg: &GenerateConfig) -> Result<()> {
    if !cfg.media.is_file() {
        return Err(Error::MediaNotFound(cfg.media.clone()));
    }

    if !cfg.effective_use_local() && cfg.resolved_api_key().is_none() {
        return Err(Error::MissingApiKey);
    }

    // The output format is typed ([`OutputFormat`]); anything unsupported was
    // already rejected at the parse boundary, so there is nothing to check
    // here at run time.

    Ok(())
}

fn run_steps(
    cfg: &GenerateConfig,
    transcoder: &dyn MediaTranscoder,
    transcriber: &dyn Transcriber,
    scratch: &Path,
    cancel: &CancelToken,
) -> Result<PathBuf> {
    let output = cfg.output_path();
    let prompt = prompt::resolve(&cfg.prompt);

    let artifact = audio::normalize(&cfg.media, transcoder, scratch)?;
    // The size check runs on both backends. Only the hosted API enforces a
    // payload cap, but the governor is a no-op for in-limit artifacts, so the
    // local path just passes through.
    let artifact = audio::ensure_within_limit(
        artifact,
        audio::REMOTE_PAYLOAD_LIMIT_BYTES,
        transcoder,
        scratch,
    )?;
    tracing::info!(size_bytes = artifact.size_bytes, "audio artifact ready");

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let request = TranscriptionRequest::new(artifact, prompt, cfg.language.clone(), cfg.translate);
    tracing::info!(
        backend = transcriber.name(),
        format = %cfg.format,
        translate = cfg.translate,
        "starting transcription"
    );

    let raw = transcriber.transcribe(&request, cfg.format)?;
    write_transcript(raw, &cfg.local_whisper, cfg.format, &output)?;

    styling::apply_font_styling(&output, &cfg.font, cfg.format)?;

    Ok(output)
}

fn write_transcript(
    raw: RawTranscript,
    opts: &LocalWhisperOptions,
    format: OutputFormat,
    output: &Path,
) -> Result<()> {
    match raw {
        // The hosted API already rendered the requested format.
        RawTranscript::Rendered(text) => fs::write(output, text)?,

        RawTranscript::Segments(segments) => {
            let doc = CaptionDocument::new(format, formatter::format_transcript(&segments, opts));
            if doc.cues.is_empty() {
                tracing::warn!("transcription produced no cues");
            }
            doc.write_to(BufWriter::new(fs::File::create(output)?))?;
        }
    }

    Ok(())
}
