//! Prompt argument resolution.

use std::fs;
use std::path::Path;

/// Resolve a prompt argument into literal prompt text.
///
/// A prompt that names an existing readable file is replaced by that file's
/// contents. Every probe or read failure (nonexistent path, permission error,
/// a string far too long to be a path at all) falls back to returning the
/// argument verbatim: prompt text can coincidentally look like a broken path,
/// and it must still be usable as-is. The fallback is silent by design.
pub fn resolve(prompt_arg: &str) -> String {
    let path = Path::new(prompt_arg);
    if path.is_file() {
        if let Ok(contents) = fs::read_to_string(path) {
            tracing::debug!(path = prompt_arg, "prompt resolved from file");
            return contents;
        }
    }

    prompt_arg.to_owned()
}
