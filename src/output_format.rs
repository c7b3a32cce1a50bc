use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The supported subtitle formats for generated captions.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of output formats
///   across the CLI and library code.
/// - Using an enum avoids stringly-typed conditionals and keeps format
///   selection explicit and discoverable.
///
/// Integration notes:
/// - `ValueEnum` (behind the `cli` feature) allows this enum to be used
///   directly as a CLI flag with `clap`.
/// - Callers arriving with a raw string go through `FromStr`, which rejects
///   anything outside the supported set.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// SubRip subtitles: numbered cues, comma-separated milliseconds.
    Srt,

    /// WebVTT subtitles: `WEBVTT` header, dot-separated milliseconds.
    Vtt,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    /// File extension used when deriving a default output path.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Whether the format tolerates inline `<font>` markup.
    ///
    /// WebVTT renderers reject raw font tags, so the styling pass skips VTT
    /// files instead of corrupting them.
    pub fn supports_inline_styling(self) -> bool {
        matches!(self, Self::Srt)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            other => Err(Error::UnsupportedFormat(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_formats() {
        assert_eq!("srt".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert_eq!("vtt".parse::<OutputFormat>().unwrap(), OutputFormat::Vtt);
    }

    #[test]
    fn rejects_unknown_formats_with_the_supported_list() {
        let err = "ass".parse::<OutputFormat>().unwrap_err();
        assert!(err.to_string().contains("not supported"));
        assert!(err.to_string().contains("srt, vtt"));
    }

    #[test]
    fn only_srt_supports_inline_styling() {
        assert!(OutputFormat::Srt.supports_inline_styling());
        assert!(!OutputFormat::Vtt.supports_inline_styling());
    }
}
