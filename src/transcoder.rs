use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// The external media transcoding capability.
///
/// The pipeline never decodes audio itself; it asks this trait to produce the
/// shapes the backends need. Keeping it a trait lets tests substitute a fake
/// that fabricates artifacts of known sizes, and lets embedders swap in a
/// different engine without touching pipeline logic.
pub trait MediaTranscoder {
    /// Re-encode `input` into a single-channel MP3 at `bitrate_kbps`,
    /// writing to `output` (overwritten if present).
    fn transcode_to_mono_mp3(&self, input: &Path, bitrate_kbps: u32, output: &Path) -> Result<()>;

    /// Decode `input` into a mono 16 kHz signed 16-bit PCM WAV at `output`,
    /// the input shape local whisper inference expects.
    fn transcode_to_wav_16k_mono(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Production transcoder that shells out to `ffmpeg`.
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegTranscoder {
    /// Use `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit ffmpeg binary, for hosts where it isn't on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, cmd: &mut Command) -> Result<()> {
        let output = cmd.output().map_err(|err| {
            Error::Transcoder(format!(
                "failed to run {}: {err}; is ffmpeg installed?",
                self.program.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Transcoder(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl MediaTranscoder for FfmpegTranscoder {
    fn transcode_to_mono_mp3(&self, input: &Path, bitrate_kbps: u32, output: &Path) -> Result<()> {
        tracing::debug!(
            input = %input.display(),
            bitrate_kbps,
            output = %output.display(),
            "transcoding to mono mp3"
        );

        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-vn")
            .arg("-ac")
            .arg("1")
            .arg("-b:a")
            .arg(format!("{bitrate_kbps}k"))
            .arg("-f")
            .arg("mp3")
            .arg(output);
        self.run(&mut cmd)
    }

    fn transcode_to_wav_16k_mono(&self, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            "decoding to 16 kHz mono wav"
        );

        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-vn")
            .arg("-ac")
            .arg("1")
            .arg("-ar")
            .arg("16000")
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("-f")
            .arg("wav")
            .arg(output);
        self.run(&mut cmd)
    }
}
