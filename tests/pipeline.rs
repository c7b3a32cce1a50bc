//! Pipeline-level scenarios driven through stub collaborators.
//!
//! The transcoder stub fails loudly if invoked: every input here is already a
//! small audio file, so neither extraction nor downsampling may run. The
//! transcriber stub records the request it saw and plays back a canned
//! response, which lets these tests assert on the request contract without a
//! network or a model.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use capgen::backend::{CancelToken, Mode, RawTranscript, Transcriber, TranscriptionRequest};
use capgen::config::{FontOptions, GenerateConfig, HighlightColor, LocalWhisperOptions};
use capgen::output_format::OutputFormat;
use capgen::pipeline::{generate_captions_with, run_with_transcriber};
use capgen::segment::{Segment, Word};
use capgen::transcoder::MediaTranscoder;

const RENDERED_SRT: &str = "1\n00:00:00,000 --> 00:00:02,000\nhola mundo\n\n";

/// A transcoder that must never run.
struct UnusedTranscoder;

impl MediaTranscoder for UnusedTranscoder {
    fn transcode_to_mono_mp3(
        &self,
        _input: &Path,
        _bitrate_kbps: u32,
        _output: &Path,
    ) -> capgen::Result<()> {
        panic!("transcoder must not run for small audio inputs");
    }

    fn transcode_to_wav_16k_mono(&self, _input: &Path, _output: &Path) -> capgen::Result<()> {
        panic!("transcoder must not run for small audio inputs");
    }
}

#[derive(Debug, Clone)]
struct SeenRequest {
    language: Option<String>,
    mode: Mode,
    prompt: String,
    format: OutputFormat,
}

/// Records every request and plays back a canned transcript.
struct RecordingTranscriber {
    seen: RefCell<Vec<SeenRequest>>,
    response: RawTranscript,
}

impl RecordingTranscriber {
    fn new(response: RawTranscript) -> Self {
        Self {
            seen: RefCell::new(Vec::new()),
            response,
        }
    }

    fn only_request(&self) -> SeenRequest {
        let seen = self.seen.borrow();
        assert_eq!(seen.len(), 1, "expected exactly one backend call");
        seen[0].clone()
    }
}

impl Transcriber for RecordingTranscriber {
    fn transcribe(
        &self,
        request: &TranscriptionRequest,
        format: OutputFormat,
    ) -> capgen::Result<RawTranscript> {
        self.seen.borrow_mut().push(SeenRequest {
            language: request.language.clone(),
            mode: request.mode,
            prompt: request.prompt.clone(),
            format,
        });
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "recording stub"
    }
}

fn write_media(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"tiny fake audio").unwrap();
    path
}

fn word(start: f32, end: f32, text: &str) -> Word {
    Word {
        start_seconds: start,
        end_seconds: end,
        text: text.to_owned(),
    }
}

fn spoken_segment(words: Vec<Word>) -> Segment {
    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Segment {
        start_seconds: words.first().map(|w| w.start_seconds).unwrap_or(0.0),
        end_seconds: words.last().map(|w| w.end_seconds).unwrap_or(0.0),
        text,
        words,
    }
}

#[test]
fn remote_transcribe_passes_language_and_writes_rendered_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let media = write_media(&dir, "talk.mp3");

    let prompt_file = dir.path().join("context.txt");
    std::fs::write(&prompt_file, "A conversation about weather.")?;

    let mut cfg = GenerateConfig::new(&media);
    cfg.output = Some(dir.path().join("talk.srt"));
    cfg.language = Some("es".to_owned());
    cfg.prompt = prompt_file.to_str().unwrap().to_owned();

    let transcriber = RecordingTranscriber::new(RawTranscript::Rendered(RENDERED_SRT.to_owned()));
    let written = run_with_transcriber(&cfg, &UnusedTranscoder, &transcriber)?;

    assert_eq!(written, dir.path().join("talk.srt"));
    assert_eq!(std::fs::read_to_string(&written)?, RENDERED_SRT);

    let seen = transcriber.only_request();
    assert_eq!(seen.language.as_deref(), Some("es"));
    assert_eq!(seen.mode, Mode::Transcribe);
    assert_eq!(seen.format, OutputFormat::Srt);
    // The prompt argument named a file, so the backend must see its contents.
    assert_eq!(seen.prompt, "A conversation about weather.");
    Ok(())
}

#[test]
fn translate_mode_forces_english_over_the_caller_language() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let media = write_media(&dir, "talk.mp3");

    let mut cfg = GenerateConfig::new(&media);
    cfg.translate = true;
    cfg.language = Some("fr".to_owned());

    let transcriber = RecordingTranscriber::new(RawTranscript::Rendered(RENDERED_SRT.to_owned()));
    run_with_transcriber(&cfg, &UnusedTranscoder, &transcriber)?;

    let seen = transcriber.only_request();
    assert_eq!(seen.mode, Mode::Translate);
    assert_eq!(seen.language.as_deref(), Some("en"));
    Ok(())
}

#[test]
fn default_output_path_derives_from_the_media_path() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let media = write_media(&dir, "episode.mp3");

    let cfg = GenerateConfig::new(&media);
    let transcriber = RecordingTranscriber::new(RawTranscript::Rendered(RENDERED_SRT.to_owned()));
    let written = run_with_transcriber(&cfg, &UnusedTranscoder, &transcriber)?;

    assert_eq!(written, dir.path().join("episode.srt"));
    assert!(written.is_file());
    Ok(())
}

#[test]
fn highlight_color_alone_enables_word_level_rendering() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let media = write_media(&dir, "talk.mp3");

    let mut cfg = GenerateConfig::new(&media);
    cfg.local_whisper = LocalWhisperOptions {
        highlight_words: false,
        highlight_color: Some(HighlightColor::Red),
        max_words_per_caption: None,
    };

    let segments = vec![spoken_segment(vec![
        word(0.0, 0.5, "hola"),
        word(0.5, 1.0, "mundo"),
    ])];
    let transcriber = RecordingTranscriber::new(RawTranscript::Segments(segments));
    let written = run_with_transcriber(&cfg, &UnusedTranscoder, &transcriber)?;

    let rendered = std::fs::read_to_string(&written)?;
    // One cue per spoken word, active word wrapped in the red pair.
    assert!(rendered.contains("<font color=\"red\">hola</font> mundo"));
    assert!(rendered.contains("hola <font color=\"red\">mundo</font>"));
    Ok(())
}

#[test]
fn local_segments_render_as_vtt_when_requested() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let media = write_media(&dir, "talk.mp3");

    let mut cfg = GenerateConfig::new(&media);
    cfg.format = OutputFormat::Vtt;

    let segments = vec![spoken_segment(vec![
        word(0.0, 0.5, "hello"),
        word(0.5, 1.0, "world"),
    ])];
    let transcriber = RecordingTranscriber::new(RawTranscript::Segments(segments));
    let written = run_with_transcriber(&cfg, &UnusedTranscoder, &transcriber)?;

    assert_eq!(written, dir.path().join("talk.vtt"));
    let rendered = std::fs::read_to_string(&written)?;
    assert!(rendered.starts_with("WEBVTT\n\n"));
    assert!(rendered.contains("00:00:00.000 --> 00:00:01.000\nhello world\n"));
    Ok(())
}

#[test]
fn font_styling_wraps_rendered_srt_with_size_outside_face() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let media = write_media(&dir, "talk.mp3");

    let mut cfg = GenerateConfig::new(&media);
    cfg.font = FontOptions {
        font: Some("Arial".to_owned()),
        font_size: Some(20),
    };

    let transcriber = RecordingTranscriber::new(RawTranscript::Rendered(RENDERED_SRT.to_owned()));
    let written = run_with_transcriber(&cfg, &UnusedTranscoder, &transcriber)?;

    let rendered = std::fs::read_to_string(&written)?;
    assert!(rendered.contains("<font size='20'><font face='Arial'>hola mundo</font></font>"));
    Ok(())
}

#[test]
fn missing_media_fails_before_any_work() {
    let cfg = GenerateConfig::new("/no/such/file.mp4");
    let outcome = generate_captions_with(&cfg, &UnusedTranscoder, &CancelToken::new());

    assert_eq!(outcome.status, 1);
    assert!(outcome.message.contains("does not exist"));
}

#[test]
fn missing_api_key_fails_when_the_hosted_backend_is_selected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let media = write_media(&dir, "talk.mp3");

    let cfg = GenerateConfig::new(&media);
    let outcome = generate_captions_with(&cfg, &UnusedTranscoder, &CancelToken::new());

    assert_eq!(outcome.status, 1);
    assert!(outcome.message.contains("API key"));
    Ok(())
}

#[cfg(not(feature = "local-whisper"))]
#[test]
fn local_options_force_local_mode_even_without_local_support() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let media = write_media(&dir, "talk.mp3");

    // No explicit local flag and no API key: the highlight option alone must
    // route dispatch to the local backend, which this build does not include.
    let mut cfg = GenerateConfig::new(&media);
    cfg.local_whisper.highlight_words = true;

    let outcome = generate_captions_with(&cfg, &UnusedTranscoder, &CancelToken::new());

    assert_eq!(outcome.status, 1);
    assert!(outcome.message.contains("local-whisper"));
    Ok(())
}
