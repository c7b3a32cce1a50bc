use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use capgen::config::{FontOptions, GenerateConfig, HighlightColor, LocalWhisperOptions};
use capgen::output_format::OutputFormat;
use capgen::pipeline::generate_captions;

/// Generate captions for a media file using OpenAI's Whisper API or a local
/// Whisper model.
#[derive(Parser, Debug)]
#[command(name = "capgen")]
#[command(version, about = "Generate captions for a media file")]
struct Args {
    /// Path to the media file.
    media: PathBuf,

    /// Path to the output file (default: the media path with the output
    /// format's extension).
    #[arg(long)]
    output: Option<PathBuf>,

    /// OpenAI API key (default: read from the OPENAI_API_KEY environment
    /// variable). Not needed when running Whisper locally.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Prompt to use as context for the model (e.g. the media's summary or
    /// script). Can be a file path or a literal string.
    #[arg(long, default_value = "")]
    prompt: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Srt)]
    output_format: OutputFormat,

    /// Language of the input media for transcribing (ISO 639-1). For
    /// translating, the input language is auto-detected and the output
    /// language is always English.
    #[arg(long)]
    language: Option<String>,

    /// Translate the input media to English before generating captions.
    #[arg(long, default_value_t = false)]
    translate_to_english: bool,

    /// Use a local Whisper model instead of the OpenAI API. Does not require
    /// an API key.
    #[arg(long, default_value_t = false)]
    run_whisper_locally: bool,

    /// Highlight each word in the captions as it is spoken. Will run Whisper
    /// locally.
    #[arg(long, default_value_t = false)]
    highlight_words: bool,

    /// Color of the highlight. Will run Whisper locally and highlight words.
    #[arg(long, value_enum)]
    highlight_color: Option<HighlightColor>,

    /// Maximum number of words per caption; if none provided, caption bounds
    /// follow the model's segments. Will run Whisper locally.
    #[arg(long)]
    max_words_per_caption: Option<u32>,

    /// Font used for the captions. It must be installed on the viewer's
    /// system. SRT output only.
    #[arg(long)]
    captions_font: Option<String>,

    /// Font size (in px) used for the captions. SRT output only.
    #[arg(long)]
    captions_font_size: Option<u32>,

    /// Path to a ggml Whisper model for local runs (default: the
    /// CAPGEN_WHISPER_MODEL environment variable, then ./models).
    #[arg(long)]
    whisper_model: Option<PathBuf>,
}

fn main() -> ExitCode {
    capgen::logging::init();

    let args = Args::parse();
    let cfg = GenerateConfig {
        media: args.media,
        output: args.output,
        api_key: args.api_key,
        prompt: args.prompt,
        format: args.output_format,
        language: args.language,
        translate: args.translate_to_english,
        run_whisper_locally: args.run_whisper_locally,
        local_whisper: LocalWhisperOptions {
            highlight_words: args.highlight_words,
            highlight_color: args.highlight_color,
            max_words_per_caption: args.max_words_per_caption,
        },
        font: FontOptions {
            font: args.captions_font,
            font_size: args.captions_font_size,
        },
        whisper_model: args.whisper_model,
    };

    let outcome = generate_captions(&cfg);
    println!("{}", outcome.message);
    ExitCode::from(outcome.status as u8)
}
