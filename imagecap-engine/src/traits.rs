use async_trait::async_trait;
use imagecap_core::types::{PreviewHandle, SelectedFile};

/// What the captioning endpoint said about one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionReply {
    /// 2xx with a JSON body. Either field may be absent.
    Caption {
        caption: Option<String>,
        backend_error: Option<String>,
    },
    /// Non-2xx status.
    Rejected { status: u16, reason: Option<String> },
}

/// Owner of displayable preview copies of selected images.
///
/// Every handle returned by `create` must be passed to `release` exactly once.
pub trait PreviewResources: Send + Sync {
    fn create(&self, file: &SelectedFile) -> anyhow::Result<PreviewHandle>;
    fn release(&self, handle: &PreviewHandle) -> anyhow::Result<()>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// `Err` means the exchange never completed or the body could not be decoded.
    async fn caption(&self, image: &SelectedFile) -> anyhow::Result<CaptionReply>;
}
