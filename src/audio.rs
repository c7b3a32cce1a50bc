//! Media normalization and the hosted backend's payload size governor.
//!
//! The normalizer turns arbitrary media into a single mono audio artifact,
//! reusing the source file directly when it is already audio. The governor
//! walks a fixed descending bitrate ladder until the artifact fits under the
//! hosted API's payload cap, or fails fatally; splitting audio into multiple
//! chunks is explicitly unsupported.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::transcoder::MediaTranscoder;

/// Hard payload ceiling enforced by the hosted transcription API (25 MiB).
pub const REMOTE_PAYLOAD_LIMIT_BYTES: u64 = 26_214_400;

/// Bitrate used when first extracting audio from a non-audio container.
const EXTRACT_BITRATE_KBPS: u32 = 128;

/// Downsampling ladder tried, in order, when an artifact exceeds the limit.
const DOWNSAMPLE_BITRATES_KBPS: [u32; 3] = [64, 32, 16];

/// Extensions we treat as "already audio" and submit without re-encoding.
const AUDIO_EXTENSIONS: &[&str] = &[
    "aac", "aif", "aiff", "flac", "m4a", "m4b", "mka", "mp3", "oga", "ogg", "opus", "wav", "wma",
];

/// A mono audio file owned by the current pipeline run.
///
/// Artifacts live in the run's scratch directory (except when the source media
/// is reused directly) and are superseded, not deleted, by each downsampling
/// attempt; the scratch directory cleans everything up when the run ends.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl AudioArtifact {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let size_bytes = std::fs::metadata(&path)?.len();
        Ok(Self { path, size_bytes })
    }
}

/// Produce a mono audio artifact from `media`.
///
/// Audio inputs are returned as-is (no copy, no re-encode), so the artifact
/// path is not necessarily inside `scratch`; callers must not assume a fixed
/// location. Everything else is reduced to one channel and encoded as MP3 at
/// the default extraction bitrate.
pub fn normalize(
    media: &Path,
    transcoder: &dyn MediaTranscoder,
    scratch: &Path,
) -> Result<AudioArtifact> {
    if is_audio_file(media) {
        tracing::info!(media = %media.display(), "media is already audio, no conversion needed");
        return AudioArtifact::from_path(media);
    }

    let output = scratch.join("audio.mp3");
    tracing::info!(media = %media.display(), "extracting audio track");
    transcoder.transcode_to_mono_mp3(media, EXTRACT_BITRATE_KBPS, &output)?;

    AudioArtifact::from_path(output)
}

/// Return an artifact strictly under `limit_bytes`, downsampling if needed.
///
/// Artifacts already within the limit pass through untouched, with no
/// transcoder call. Oversized artifacts are re-encoded from the original at
/// each ladder bitrate in turn; the first result strictly under the limit
/// wins. Running out of ladder is fatal.
pub fn ensure_within_limit(
    artifact: AudioArtifact,
    limit_bytes: u64,
    transcoder: &dyn MediaTranscoder,
    scratch: &Path,
) -> Result<AudioArtifact> {
    if artifact.size_bytes <= limit_bytes {
        return Ok(artifact);
    }

    tracing::warn!(
        size_bytes = artifact.size_bytes,
        limit_bytes,
        "audio exceeds the upload limit, attempting to downsample"
    );

    let output = scratch.join("audio_downsampled.mp3");
    for bitrate_kbps in DOWNSAMPLE_BITRATES_KBPS {
        transcoder.transcode_to_mono_mp3(&artifact.path, bitrate_kbps, &output)?;
        let candidate = AudioArtifact::from_path(&output)?;

        if candidate.size_bytes < limit_bytes {
            tracing::info!(
                bitrate_kbps,
                size_bytes = candidate.size_bytes,
                "downsampled audio fits under the limit"
            );
            return Ok(candidate);
        }

        tracing::debug!(
            bitrate_kbps,
            size_bytes = candidate.size_bytes,
            "still over the limit"
        );
    }

    Err(Error::SizeLimitUnsatisfiable { limit: limit_bytes })
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
