use imagecap_core::config::{EndpointConfig, HttpTimeouts};
use imagecap_core::types::SelectedFile;
use imagecap_engine::traits::{CaptionProvider, CaptionReply};
use imagecap_providers::caption::build_caption_request;
use imagecap_providers::parse::parse_caption_response;
use imagecap_providers::runtime;
use log::debug;

/// Captions images through the HTTP endpoint described by `EndpointConfig`.
#[derive(Debug, Clone)]
pub struct HttpCaptionProvider {
    endpoint: EndpointConfig,
    timeouts: HttpTimeouts,
}

impl HttpCaptionProvider {
    pub fn new(endpoint: EndpointConfig, timeouts: HttpTimeouts) -> Self {
        Self { endpoint, timeouts }
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl CaptionProvider for HttpCaptionProvider {
    async fn caption(&self, image: &SelectedFile) -> anyhow::Result<CaptionReply> {
        let req = build_caption_request(&self.endpoint, image);
        debug!("sending {req:?}");

        let resp = runtime::execute(&req, &self.timeouts).await?;
        if !resp.is_success() {
            debug!(
                "caption endpoint rejected upload: status={} body={}",
                resp.status,
                String::from_utf8_lossy(&resp.body)
            );
            return Ok(CaptionReply::Rejected {
                status: resp.status,
                reason: resp.reason,
            });
        }

        // A 2xx body that is not JSON is treated like a failed exchange.
        let parsed = parse_caption_response(&resp.body)?;
        Ok(CaptionReply::Caption {
            caption: parsed.caption,
            backend_error: parsed.error,
        })
    }
}
