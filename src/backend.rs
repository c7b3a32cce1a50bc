use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::AudioArtifact;
use crate::config::GenerateConfig;
use crate::error::{Error, Result};
use crate::output_format::OutputFormat;
use crate::remote::RemoteWhisper;
use crate::segment::Segment;
use crate::transcoder::MediaTranscoder;

/// Whether speech is transcribed verbatim or translated to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Transcribe,
    Translate,
}

/// Everything a backend needs to produce a transcript.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// The size-governed audio artifact to submit.
    pub audio: AudioArtifact,

    /// Resolved context prompt; empty means "no prompt".
    pub prompt: String,

    /// Language hint (ISO 639-1). `None` asks the backend to auto-detect.
    pub language: Option<String>,

    pub mode: Mode,
}

impl TranscriptionRequest {
    /// Build a request, deriving the effective language.
    ///
    /// Translation always produces English; any caller-supplied language is
    /// overridden so the request carries the output language, not a stale
    /// input hint.
    pub fn new(
        audio: AudioArtifact,
        prompt: String,
        language: Option<String>,
        translate: bool,
    ) -> Self {
        let mode = if translate {
            Mode::Translate
        } else {
            Mode::Transcribe
        };
        let language = if translate {
            Some("en".to_owned())
        } else {
            language
        };

        Self {
            audio,
            prompt,
            language,
            mode,
        }
    }
}

/// What a backend hands back.
///
/// The hosted API renders cues itself and returns finished subtitle text; the
/// local model returns structured segments that still need formatting. Keeping
/// the two shapes in one enum lets the pipeline dispatch post-processing
/// without downcasting.
#[derive(Debug, Clone)]
pub enum RawTranscript {
    /// Subtitle text already rendered in the requested output format.
    Rendered(String),

    /// Timed segments requiring local cue formatting.
    Segments(Vec<Segment>),
}

/// Pluggable speech-to-text backend used by the pipeline.
///
/// A backend is selected once per run and invoked exactly once; there is no
/// retry or fallback between backends.
pub trait Transcriber {
    /// Turn the request's audio into a transcript.
    ///
    /// `format` is the subtitle format the caller will write; backends that
    /// render their own output (the hosted API) honor it, backends that return
    /// segments ignore it.
    fn transcribe(&self, request: &TranscriptionRequest, format: OutputFormat)
    -> Result<RawTranscript>;

    /// Human-readable backend name for logging.
    fn name(&self) -> &str;
}

/// Cooperative cancellation flag threaded through a pipeline run.
///
/// The local model polls it from whisper.cpp's abort callback; the pipeline
/// checks it between stages. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Select and construct the backend for this run.
///
/// The decision comes from [`GenerateConfig::effective_use_local`], computed
/// up front from the whole configuration rather than mutated along the way.
pub fn select_transcriber<'a>(
    cfg: &GenerateConfig,
    transcoder: &'a dyn MediaTranscoder,
    scratch: &Path,
    cancel: &CancelToken,
) -> Result<Box<dyn Transcriber + 'a>> {
    if cfg.effective_use_local() {
        return local_transcriber(cfg, transcoder, scratch, cancel);
    }

    let api_key = cfg.resolved_api_key().ok_or(Error::MissingApiKey)?;
    Ok(Box::new(RemoteWhisper::new(api_key)?))
}

#[cfg(feature = "local-whisper")]
fn local_transcriber<'a>(
    cfg: &GenerateConfig,
    transcoder: &'a dyn MediaTranscoder,
    scratch: &Path,
    cancel: &CancelToken,
) -> Result<Box<dyn Transcriber + 'a>> {
    let backend = crate::local::LocalWhisper::new(
        cfg.whisper_model.as_deref(),
        transcoder,
        scratch.to_path_buf(),
        cancel.clone(),
    )?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "local-whisper"))]
fn local_transcriber<'a>(
    _cfg: &GenerateConfig,
    _transcoder: &'a dyn MediaTranscoder,
    _scratch: &Path,
    _cancel: &CancelToken,
) -> Result<Box<dyn Transcriber + 'a>> {
    // The flag surface stays stable in remote-only builds; the error tells the
    // user how to get a build that can honor the request.
    tracing::error!("local whisper requested but this build does not include it");
    Err(Error::LocalSupportUnavailable)
}
