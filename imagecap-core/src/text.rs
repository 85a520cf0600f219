use regex::Regex;
use std::sync::OnceLock;

// User-facing messages. The view writes these into its single error slot.
pub const MSG_NOT_AN_IMAGE: &str = "Please upload a valid image file.";
pub const MSG_NO_FILE: &str = "Upload an image first.";
pub const MSG_COPY_FAILED: &str = "Copy failed. Clipboard access may be blocked.";
pub const MSG_PREVIEW_FAILED: &str = "Could not prepare a preview for this image.";

pub const NO_CAPTION_PLACEHOLDER: &str = "No caption returned from server.";
pub const DEFAULT_FALLBACK_CAPTION: &str = "A small dog sitting on a wooden floor looking up.";

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Turns the backend's optional caption field into display text.
///
/// Collapses runs of whitespace; a missing or blank caption becomes
/// [`NO_CAPTION_PLACEHOLDER`].
pub fn normalize_caption(raw: Option<&str>) -> String {
    let collapsed = raw
        .map(|s| whitespace_re().replace_all(s, " ").trim().to_string())
        .unwrap_or_default();

    if collapsed.is_empty() {
        NO_CAPTION_PLACEHOLDER.to_string()
    } else {
        collapsed
    }
}

/// `"Backend error: <reason>"`, using the numeric code when no reason phrase is known.
pub fn backend_error_message(status: u16, reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("Backend error: {reason}"),
        None => format!("Backend error: HTTP {status}"),
    }
}
