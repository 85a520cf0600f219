use std::sync::Arc;

use imagecap_core::config::AppConfig;
use imagecap_engine::traits::{CaptionProvider, Clipboard, PreviewResources};
use imagecap_engine::view::{CaptionView, ViewConfig};

use crate::caption::HttpCaptionProvider;

/// Build a view from config + platform capabilities.
///
/// This keeps front ends thin.
pub fn build_view_from_config(
    cfg: AppConfig,
    previews: Arc<dyn PreviewResources>,
    clipboard: Arc<dyn Clipboard>,
) -> CaptionView {
    log::info!("caption endpoint: {:?}", cfg.endpoint);

    let provider: Arc<dyn CaptionProvider> =
        Arc::new(HttpCaptionProvider::new(cfg.endpoint, cfg.http));

    CaptionView::new(
        ViewConfig {
            fallback_caption: cfg.fallback_caption,
        },
        previews,
        clipboard,
        provider,
    )
}
