//! Text cleanup for speech synthesis
//!
//! Speech engines should not vocalize formatting tokens, so any text
//! destined for TTS goes through here first.

use once_cell::sync::Lazy;
use regex::Regex;

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());

/// Strip markdown emphasis, headings, backticks and link syntax,
/// keeping link labels.
pub fn text_for_speech(text: &str) -> String {
    let text = LINK_RE.replace_all(text, "$1");
    let text = HEADING_RE.replace_all(&text, "");
    text.replace("**", "").replace('*', "").replace('`', "")
}
