use imagecap_core::status::RequestStatus;
use imagecap_engine::state::ViewSnapshot;
use std::fmt::Write;

const NO_IMAGE: &str = "No image yet. Upload an image to preview it.";
const NO_CAPTION: &str = "No caption generated yet.";

pub fn render(snap: &ViewSnapshot) -> String {
    let mut out = String::new();

    match &snap.file {
        Some(f) => {
            let _ = writeln!(
                out,
                "image:   {} ({}, {} bytes)",
                f.filename,
                f.media_type.as_str(),
                f.size_bytes
            );
        }
        None => {
            let _ = writeln!(out, "image:   {NO_IMAGE}");
        }
    }

    if let Some(p) = &snap.preview {
        let _ = writeln!(out, "preview: {}", p.location);
    }

    let status = match (snap.status, snap.last_request_ms) {
        (RequestStatus::InFlight, _) => "Generating...".to_string(),
        (s, Some(ms)) if s.is_terminal() => format!("{} ({ms}ms)", s.label()),
        (s, _) => s.label().to_string(),
    };
    let _ = writeln!(out, "status:  {status}");
    let _ = writeln!(
        out,
        "caption: {}",
        snap.caption.as_deref().unwrap_or(NO_CAPTION)
    );

    if let Some(e) = &snap.error {
        let _ = writeln!(out, "error:   {e}");
    }
    out
}
