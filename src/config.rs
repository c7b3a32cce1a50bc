use std::path::PathBuf;

use crate::output_format::OutputFormat;

/// Options that control how a caption run is performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (GUIs, tests, batch jobs) can construct options programmatically
///
/// Credential sourcing note: `api_key` is expected to be already resolved by
/// the frontend (explicit flag or the `OPENAI_API_KEY` environment variable).
/// The library never reads the environment itself, which keeps runs
/// reproducible under test.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Path to the input media file. Read-only; never mutated by the pipeline.
    pub media: PathBuf,

    /// Path to the output subtitle file.
    ///
    /// When `None`, the output lands next to the input with the format's
    /// extension (`talk.mp4` -> `talk.srt`).
    pub output: Option<PathBuf>,

    /// Bearer credential for the hosted backend. Unused for local runs.
    pub api_key: Option<String>,

    /// Context prompt for the model: either literal text or a path to a text
    /// file (resolved by [`crate::prompt::resolve`]).
    pub prompt: String,

    /// The desired subtitle output format.
    pub format: OutputFormat,

    /// Language of the input media (ISO 639-1). `None` lets the backend
    /// auto-detect. Ignored when translating.
    pub language: Option<String>,

    /// Translate speech to English instead of transcribing verbatim.
    pub translate: bool,

    /// Explicitly request the local whisper backend.
    ///
    /// Note that any set field in `local_whisper` forces local mode even when
    /// this flag is false; see [`GenerateConfig::effective_use_local`].
    pub run_whisper_locally: bool,

    /// Formatting options only the local backend can honor.
    pub local_whisper: LocalWhisperOptions,

    /// Optional font styling applied as a post-processing pass.
    pub font: FontOptions,

    /// Path to a ggml whisper model for local runs. `None` falls back to the
    /// `CAPGEN_WHISPER_MODEL` environment variable, then to `./models`.
    pub whisper_model: Option<PathBuf>,
}

impl GenerateConfig {
    /// A minimal configuration: hosted backend, SRT output, no styling.
    pub fn new(media: impl Into<PathBuf>) -> Self {
        Self {
            media: media.into(),
            output: None,
            api_key: None,
            prompt: String::new(),
            format: OutputFormat::Srt,
            language: None,
            translate: false,
            run_whisper_locally: false,
            local_whisper: LocalWhisperOptions::default(),
            font: FontOptions::default(),
            whisper_model: None,
        }
    }

    /// The effective backend selection, derived from the whole configuration.
    ///
    /// Any set local-only option forces local mode, overriding an explicit
    /// request for the hosted backend. We compute this in one place instead of
    /// mutating flags mid-pipeline so the decision is auditable and testable.
    pub fn effective_use_local(&self) -> bool {
        self.run_whisper_locally || self.local_whisper.any_set()
    }

    /// The credential, treating a blank string as absent.
    pub fn resolved_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// The output path: caller-specified, or derived from the input path.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.media.with_extension(self.format.extension()),
        }
    }
}

/// Formatting options that require running whisper locally.
///
/// Invariant: the presence of ANY set field here implies local-backend
/// dispatch. That cross-field dependency is part of the contract, not an
/// incidental detail; the hosted API returns pre-rendered subtitle text and
/// cannot honor any of these.
#[derive(Debug, Clone, Default)]
pub struct LocalWhisperOptions {
    /// Highlight each word in the captions as it is spoken.
    pub highlight_words: bool,

    /// Color of the word highlight. Setting a color also turns highlighting on.
    pub highlight_color: Option<HighlightColor>,

    /// Maximum number of words per caption. Zero counts as unset.
    pub max_words_per_caption: Option<u32>,
}

impl LocalWhisperOptions {
    /// Whether any field carries a value that demands local processing.
    pub fn any_set(&self) -> bool {
        self.highlight_words
            || self.highlight_color.is_some()
            || self.max_words_per_caption.is_some_and(|n| n > 0)
    }
}

/// Optional font styling for the caption text.
#[derive(Debug, Clone, Default)]
pub struct FontOptions {
    /// Font face name; must be installed on the viewer's system.
    pub font: Option<String>,

    /// Font size in pixels.
    pub font_size: Option<u32>,
}

impl FontOptions {
    pub fn any_set(&self) -> bool {
        self.font.is_some() || self.font_size.is_some()
    }
}

/// The recognized word-highlight colors.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightColor {
    Bold,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    White,
}

impl HighlightColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }

    /// The markup pair wrapped around the active word.
    ///
    /// `bold` is special-cased to a bold tag; every other value becomes a
    /// color-parameterized font tag.
    pub fn markup_pair(self) -> (String, String) {
        match self {
            Self::Bold => ("<b>".to_owned(), "</b>".to_owned()),
            color => (
                format!("<font color=\"{}\">", color.as_str()),
                "</font>".to_owned(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_selects_local() {
        let mut cfg = GenerateConfig::new("talk.mp4");
        assert!(!cfg.effective_use_local());
        cfg.run_whisper_locally = true;
        assert!(cfg.effective_use_local());
    }

    #[test]
    fn any_local_option_forces_local_mode() {
        let mut cfg = GenerateConfig::new("talk.mp4");

        cfg.local_whisper.highlight_words = true;
        assert!(cfg.effective_use_local());

        cfg.local_whisper = LocalWhisperOptions {
            highlight_color: Some(HighlightColor::Red),
            ..Default::default()
        };
        assert!(cfg.effective_use_local());

        cfg.local_whisper = LocalWhisperOptions {
            max_words_per_caption: Some(4),
            ..Default::default()
        };
        assert!(cfg.effective_use_local());
    }

    #[test]
    fn zero_max_words_does_not_force_local_mode() {
        let mut cfg = GenerateConfig::new("talk.mp4");
        cfg.local_whisper.max_words_per_caption = Some(0);
        assert!(!cfg.effective_use_local());
    }

    #[test]
    fn blank_api_keys_count_as_absent() {
        let mut cfg = GenerateConfig::new("talk.mp4");
        assert_eq!(cfg.resolved_api_key(), None);

        cfg.api_key = Some("   ".to_owned());
        assert_eq!(cfg.resolved_api_key(), None);

        cfg.api_key = Some("sk-test".to_owned());
        assert_eq!(cfg.resolved_api_key(), Some("sk-test"));
    }

    #[test]
    fn output_path_defaults_to_media_with_format_extension() {
        let mut cfg = GenerateConfig::new("clips/talk.mp4");
        assert_eq!(cfg.output_path(), PathBuf::from("clips/talk.srt"));

        cfg.format = OutputFormat::Vtt;
        assert_eq!(cfg.output_path(), PathBuf::from("clips/talk.vtt"));

        cfg.output = Some(PathBuf::from("custom.srt"));
        assert_eq!(cfg.output_path(), PathBuf::from("custom.srt"));
    }

    #[test]
    fn bold_maps_to_bold_markup_pair() {
        let (open, close) = HighlightColor::Bold.markup_pair();
        assert_eq!(open, "<b>");
        assert_eq!(close, "</b>");
    }

    #[test]
    fn colors_map_to_font_markup_pairs() {
        for color in [
            HighlightColor::Red,
            HighlightColor::Green,
            HighlightColor::Blue,
            HighlightColor::Yellow,
            HighlightColor::Magenta,
            HighlightColor::Cyan,
            HighlightColor::White,
        ] {
            let (open, close) = color.markup_pair();
            assert!(open.contains(color.as_str()));
            assert_eq!(close, "</font>");
        }
    }
}
