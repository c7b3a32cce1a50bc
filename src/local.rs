//! Local whisper.cpp backend, available behind the `local-whisper` feature.
//!
//! Unlike the hosted API, this path returns structured segments with
//! word-level timing, which the formatter then turns into cues. The audio
//! artifact is first decoded to the mono 16 kHz PCM stream whisper.cpp
//! expects, via the same external transcoder the rest of the pipeline uses.

use std::path::{Path, PathBuf};

use anyhow::Context;
use hound::WavReader;
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperSegment,
};

use crate::backend::{CancelToken, Mode, RawTranscript, Transcriber, TranscriptionRequest};
use crate::error::{Error, Result};
use crate::output_format::OutputFormat;
use crate::segment::{Segment, Word};
use crate::transcoder::MediaTranscoder;

/// Environment variable naming a ggml model file for local runs.
pub const MODEL_PATH_ENV: &str = "CAPGEN_WHISPER_MODEL";

/// Conventional model locations probed when nothing explicit is configured.
const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "models/ggml-base.bin",
    "models/ggml-base.en.bin",
    "models/ggml-small.bin",
    "models/ggml-small.en.bin",
];

/// Sample rate whisper.cpp expects.
const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Built-in backend powered by `whisper-rs` / whisper.cpp.
pub struct LocalWhisper<'a> {
    ctx: WhisperContext,
    transcoder: &'a dyn MediaTranscoder,
    scratch: PathBuf,
    cancel: CancelToken,
}

impl<'a> LocalWhisper<'a> {
    /// Resolve a model path and load it.
    ///
    /// Model loading is expensive, so this happens once per run, at dispatch
    /// time, never earlier.
    pub fn new(
        model_path: Option<&Path>,
        transcoder: &'a dyn MediaTranscoder,
        scratch: PathBuf,
        cancel: CancelToken,
    ) -> Result<Self> {
        let model_path = resolve_model_path(model_path)?;
        tracing::info!(model = %model_path.display(), "loading local whisper model");

        let model_path_str = model_path
            .to_str()
            .ok_or_else(|| Error::Backend(format!("model path is not valid UTF-8: {}", model_path.display())))?;

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(model_path_str, ctx_params).map_err(|err| {
            Error::Backend(format!(
                "failed to load whisper model from '{}': {err}",
                model_path.display()
            ))
        })?;

        Ok(Self {
            ctx,
            transcoder,
            scratch,
            cancel,
        })
    }

    fn run_model(&self, request: &TranscriptionRequest, samples: &[f32]) -> Result<Vec<Segment>> {
        let params = build_full_params(request, &self.cancel);

        let mut state = self
            .ctx
            .create_state()
            .context("failed to create whisper state")?;

        let full_res = state.full(params, samples);
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        full_res.context("failed to run whisper full()")?;

        let mut segments = Vec::new();
        for whisper_segment in state.as_iter() {
            segments.push(to_segment(whisper_segment)?);
        }
        Ok(segments)
    }
}

impl Transcriber for LocalWhisper<'_> {
    fn transcribe(
        &self,
        request: &TranscriptionRequest,
        _format: OutputFormat,
    ) -> Result<RawTranscript> {
        let wav_path = self.scratch.join("audio_16k.wav");
        self.transcoder
            .transcode_to_wav_16k_mono(&request.audio.path, &wav_path)?;

        let samples = read_mono_16k_samples(&wav_path)?;
        tracing::info!(
            samples = samples.len(),
            "running local whisper inference"
        );

        let segments = self.run_model(request, &samples)?;
        Ok(RawTranscript::Segments(segments))
    }

    fn name(&self) -> &str {
        "local Whisper model"
    }
}

fn resolve_model_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_owned());
        }
        return Err(Error::Backend(format!(
            "whisper model not found at '{}'",
            path.display()
        )));
    }

    if let Ok(from_env) = std::env::var(MODEL_PATH_ENV) {
        let path = PathBuf::from(from_env);
        if path.is_file() {
            return Ok(path);
        }
        return Err(Error::Backend(format!(
            "whisper model not found at '{}' (from {MODEL_PATH_ENV})",
            path.display()
        )));
    }

    for candidate in DEFAULT_MODEL_CANDIDATES {
        let path = PathBuf::from(candidate);
        if path.is_file() {
            return Ok(path);
        }
    }

    Err(Error::Backend(format!(
        "no whisper model found; pass --whisper-model, set {MODEL_PATH_ENV}, or place a ggml model under ./models"
    )))
}

fn build_full_params<'a>(
    request: &'a TranscriptionRequest,
    cancel: &CancelToken,
) -> FullParams<'a, 'a> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: 5,
        patience: 1.0,
    });

    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(matches!(request.mode, Mode::Translate));
    match request.mode {
        // Translation auto-detects the source language; the request's forced
        // "en" describes the output, not a hint about the input.
        Mode::Translate => params.set_language(None),
        Mode::Transcribe => params.set_language(request.language.as_deref()),
    }
    params.set_no_context(true);
    params.set_single_segment(false);

    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    params.set_token_timestamps(true);

    if !request.prompt.is_empty() {
        params.set_initial_prompt(&request.prompt);
    }

    let cancel = cancel.clone();
    params.set_abort_callback_safe(move || cancel.is_cancelled());

    params
}

fn to_segment(segment: WhisperSegment) -> Result<Segment> {
    let text = segment
        .to_str()
        .context("failed to get segment text")?
        .trim()
        .to_owned();

    let words = words_from_tokens(&segment)?;

    // Prefer word-derived timing when available to avoid long segments that
    // include leading/trailing silence. Fall back to whisper's segment-level
    // timestamps when word timing is unavailable.
    let (start_seconds, end_seconds) = match (words.first(), words.last()) {
        (Some(first), Some(last)) if last.end_seconds >= first.start_seconds => {
            (first.start_seconds, last.end_seconds)
        }
        _ => (
            centiseconds_to_seconds(segment.start_timestamp()),
            centiseconds_to_seconds(segment.end_timestamp()),
        ),
    };

    Ok(Segment {
        start_seconds,
        end_seconds,
        text,
        words,
    })
}

/// Group whisper's subword tokens into words with timing.
///
/// Whisper marks a word boundary with a leading space on the first token of
/// the word; continuation tokens (including attached punctuation) are glued
/// onto the previous word and extend its end time.
fn words_from_tokens(segment: &WhisperSegment) -> Result<Vec<Word>> {
    let token_count = usize::try_from(segment.n_tokens()).unwrap_or(0);
    let mut words: Vec<Word> = Vec::with_capacity(token_count);

    for token_idx in 0..token_count {
        let token = segment
            .get_token(token_idx as i32)
            .context("failed to get token from segment")?;

        let text = token
            .to_str()
            .with_context(|| format!("failed to get token text at index {token_idx}"))?
            .to_owned();

        // Whisper control tokens look like `[_BEG_]` / `[_TT_500]`; they carry no speech.
        if text.starts_with("[_") && text.ends_with("_]") {
            continue;
        }

        let data = token.token_data();
        // whisper uses -1 for unknown; clamp to 0 so consumers don't see -0.01s
        let start_seconds = centiseconds_to_seconds(data.t0);
        let end_seconds = centiseconds_to_seconds(data.t1);

        let starts_new_word = text.starts_with(' ') || words.is_empty();
        if starts_new_word {
            words.push(Word {
                start_seconds,
                end_seconds,
                text: text.trim().to_owned(),
            });
        } else if let Some(last) = words.last_mut() {
            last.text.push_str(text.trim_end());
            last.end_seconds = last.end_seconds.max(end_seconds);
        }
    }

    words.retain(|w| !w.text.is_empty());
    Ok(words)
}

fn centiseconds_to_seconds(value: i64) -> f32 {
    if value < 0 { 0.0 } else { value as f32 / 100.0 }
}

/// Load WAV audio produced by the transcoder and return normalized samples.
///
/// Format requirements (enforced, not resampled here):
/// - Mono (1 channel)
/// - 16 kHz sample rate
///
/// Enforcing constraints here keeps the inference call simple and predictable;
/// the transcoder is responsible for meeting them.
fn read_mono_16k_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("failed to read WAV from {}", path.display()))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(Error::Backend(format!(
            "expected mono WAV (1 channel), got {} channels",
            spec.channels
        )));
    }
    if spec.sample_rate != TARGET_SAMPLE_RATE {
        return Err(Error::Backend(format!(
            "expected {TARGET_SAMPLE_RATE} Hz sample rate, got {} Hz",
            spec.sample_rate
        )));
    }

    // Normalize from i16 PCM to f32 in [-1.0, 1.0], the shape whisper expects.
    let mut samples = Vec::new();
    for sample in reader.samples::<i16>() {
        let pcm = sample.context("failed to decode WAV sample")?;
        samples.push(pcm as f32 / i16::MAX as f32);
    }

    Ok(samples)
}
