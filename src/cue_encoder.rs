use crate::cue::Cue;
use crate::error::Result;

/// Streaming serializer for caption cues.
///
/// Implementations write cues as they arrive and finalize output on `close`.
/// Callers own the encoder lifecycle; pipeline stages never close an encoder
/// they did not create.
pub trait CueEncoder {
    fn write_cue(&mut self, cue: &Cue) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
