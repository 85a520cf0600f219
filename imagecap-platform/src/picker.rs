use anyhow::Context;
use image::ImageFormat;
use imagecap_core::types::{FileInput, MediaType};
use std::path::Path;

/// Reads a picked file and declares its media type the way a browser picker would.
///
/// The extension decides first; files without a recognizable image extension
/// are sniffed by magic bytes. Anything else gets no media type and will be
/// rejected by the view.
pub fn read_file_input(path: &Path) -> anyhow::Result<FileInput> {
    let bytes = std::fs::read(path).with_context(|| format!("read image: {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let media_type = detect_media_type(path, &bytes);
    Ok(FileInput {
        filename,
        media_type,
        bytes,
    })
}

pub fn detect_media_type(path: &Path, bytes: &[u8]) -> Option<MediaType> {
    ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .ok()
        .map(|f| MediaType::new(f.to_mime_type()))
}
