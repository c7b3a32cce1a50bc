//! Hosted Whisper API backend.
//!
//! Posts the audio artifact as a multipart upload and asks the service to
//! render cues in the requested subtitle format directly, so no local
//! formatting is needed on this path.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};

use crate::backend::{Mode, RawTranscript, Transcriber, TranscriptionRequest};
use crate::error::{Error, Result};
use crate::output_format::OutputFormat;

const API_BASE_URL: &str = "https://api.openai.com/v1";

/// Fixed model identifier the hosted endpoint expects.
const MODEL_ID: &str = "whisper-1";

/// Uploads can be 25 MiB and transcription is slow; budget generously.
/// A hung connection still fails instead of blocking a run forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

pub struct RemoteWhisper {
    api_key: String,
    client: Client,
    base_url: String,
}

impl RemoteWhisper {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, API_BASE_URL)
    }

    /// Point the client at a different host.
    ///
    /// Useful for API-compatible gateways and for tests.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: base_url.into(),
        })
    }
}

impl Transcriber for RemoteWhisper {
    fn transcribe(
        &self,
        request: &TranscriptionRequest,
        format: OutputFormat,
    ) -> Result<RawTranscript> {
        let endpoint = match request.mode {
            Mode::Transcribe => "audio/transcriptions",
            Mode::Translate => "audio/translations",
        };
        let url = format!("{}/{}", self.base_url, endpoint);

        let bytes = fs::read(&request.audio.path)?;
        let file_name = request
            .audio
            .path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or("audio.mp3")
            .to_owned();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for_path(&request.audio.path))?;

        let mut form = Form::new()
            .text("model", MODEL_ID)
            .text("response_format", format.as_str())
            .part("file", part);
        if !request.prompt.is_empty() {
            form = form.text("prompt", request.prompt.clone());
        }
        // The translation endpoint auto-detects the input language and takes
        // no language parameter.
        if let (Mode::Transcribe, Some(language)) = (request.mode, request.language.as_deref()) {
            form = form.text("language", language.to_owned());
        }

        tracing::info!(
            endpoint,
            size_bytes = request.audio.size_bytes,
            "uploading audio to the hosted API"
        );

        let response = self
            .client
            .post(url.as_str())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Backend(format!(
                "hosted transcription failed with {status}: {}",
                api_error_message(&body)
            )));
        }

        Ok(RawTranscript::Rendered(response.text()?))
    }

    fn name(&self) -> &str {
        "OpenAI Whisper API"
    }
}

/// Pull the human-readable message out of an API error body, if there is one.
///
/// The hosted API wraps failures as `{"error": {"message": ...}}`; anything
/// else is surfaced raw.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_owned())
}

fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") | Some("oga") | Some("opus") => "audio/ogg",
        Some("m4a") | Some("m4b") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_prefers_the_structured_message() {
        let body = r#"{"error": {"message": "Invalid file format.", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Invalid file format.");
    }

    #[test]
    fn api_error_message_falls_back_to_the_raw_body() {
        assert_eq!(api_error_message("  upstream exploded \n"), "upstream exploded");
    }

    #[test]
    fn mime_types_follow_the_artifact_extension() {
        assert_eq!(mime_for_path(Path::new("a.mp3")), "audio/mpeg");
        assert_eq!(mime_for_path(Path::new("a.WAV")), "audio/wav");
        assert_eq!(mime_for_path(Path::new("a.opus")), "audio/ogg");
        assert_eq!(mime_for_path(Path::new("a.bin")), "application/octet-stream");
    }
}
