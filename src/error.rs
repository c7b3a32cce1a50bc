use std::path::PathBuf;

use thiserror::Error;

/// Capgen's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Capgen's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The input media path did not point at an existing file.
    #[error("media file {} does not exist", .0.display())]
    MediaNotFound(PathBuf),

    /// The hosted backend was selected but no credential was supplied.
    #[error("an API key is required, none provided or found in environment")]
    MissingApiKey,

    #[error("output format {0} is not supported, must be one of: srt, vtt")]
    UnsupportedFormat(String),

    /// No bitrate in the downsampling ladder produced an artifact under the limit.
    #[error(
        "unable to downsample audio under {limit} bytes; splitting into chunks is not supported, open a feature request if you need it"
    )]
    SizeLimitUnsatisfiable { limit: u64 },

    /// The local backend was requested but the crate was built without it.
    #[error("local transcription support is not compiled in; rebuild with the `local-whisper` feature enabled")]
    LocalSupportUnavailable,

    #[error("run cancelled")]
    Cancelled,

    #[error("transcoder: {0}")]
    Transcoder(String),

    #[error("transcription backend: {0}")]
    Backend(String),

    #[error("malformed subtitle file: {0}")]
    MalformedSubtitle(String),

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Message(String),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}
