use imagecap_core::status::RequestStatus;
use imagecap_core::types::{PreviewHandle, SelectedFile, SelectedFileInfo};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mutable state owned by a `CaptionView`. Lives behind the view's mutex.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub selected: Option<SelectedFile>,
    pub preview: Option<PreviewHandle>,
    pub caption: Option<String>,
    pub status: RequestStatus,
    pub error: Option<String>,

    // Filename currently shown by the picker control.
    pub picker_value: Option<String>,
    pub last_request_ms: Option<u64>,
}

impl ViewState {
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            file: self.selected.as_ref().map(SelectedFile::info),
            preview: self.preview.clone(),
            caption: self.caption.clone(),
            status: self.status,
            status_label: self.status.label().into(),
            error: self.error.clone(),
            picker_value: self.picker_value.clone(),
            last_request_ms: self.last_request_ms,
        }
    }
}

/// Render-ready copy of the view state (no image bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub file: Option<SelectedFileInfo>,
    pub preview: Option<PreviewHandle>,
    pub caption: Option<String>,
    pub status: RequestStatus,
    pub status_label: String,
    pub error: Option<String>,
    pub picker_value: Option<String>,
    pub last_request_ms: Option<u64>,
}

impl ViewSnapshot {
    /// True when every slot holds its initial value.
    pub fn is_pristine(&self) -> bool {
        self.file.is_none()
            && self.preview.is_none()
            && self.caption.is_none()
            && self.status == RequestStatus::Idle
            && self.error.is_none()
            && self.picker_value.is_none()
    }
}

pub fn ms(d: Duration) -> u64 {
    d.as_millis().try_into().unwrap_or(u64::MAX)
}
