use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaType(pub String);

impl MediaType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for any `image/<subtype>` declaration (case-insensitive top-level type).
    pub fn is_image(&self) -> bool {
        match self.0.split_once('/') {
            Some((top, sub)) => top.trim().eq_ignore_ascii_case("image") && !sub.trim().is_empty(),
            None => false,
        }
    }
}

/// A file as handed over by a picker, before validation.
#[derive(Clone, PartialEq, Eq)]
pub struct FileInput {
    pub filename: String,
    pub media_type: Option<MediaType>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FileInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileInput")
            .field("filename", &self.filename)
            .field("media_type", &self.media_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl FileInput {
    pub fn new(filename: impl Into<String>, media_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.map(MediaType::new),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type.as_ref().is_some_and(MediaType::is_image)
    }
}

/// A validated image selection. Bytes are shared so an in-flight upload
/// does not have to copy them out of the view state.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub filename: String,
    pub media_type: MediaType,
    pub bytes: Arc<[u8]>,
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("filename", &self.filename)
            .field("media_type", &self.media_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl SelectedFile {
    /// Returns `None` unless the input declares an image media type.
    pub fn from_input(input: FileInput) -> Option<Self> {
        let media_type = input.media_type.filter(MediaType::is_image)?;
        Some(Self {
            filename: input.filename,
            media_type,
            bytes: input.bytes.into(),
        })
    }

    pub fn info(&self) -> SelectedFileInfo {
        SelectedFileInfo {
            filename: self.filename.clone(),
            media_type: self.media_type.clone(),
            size_bytes: self.bytes.len() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFileInfo {
    pub filename: String,
    pub media_type: MediaType,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewId(pub Uuid);

impl PreviewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PreviewId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque, revocable reference to a displayable copy of the selected image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewHandle {
    pub id: PreviewId,
    // Something a renderer can open: a file path, URL, or registry key.
    pub location: String,
}

impl PreviewHandle {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            id: PreviewId::new(),
            location: location.into(),
        }
    }
}
