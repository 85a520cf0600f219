use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptionResponse {
    #[serde(default)]
    pub caption: Option<String>,

    // The reference backend answers 200 with `{"error": "..."}` when inference fails.
    #[serde(default)]
    pub error: Option<String>,
}

/// Decodes a caption response body.
///
/// Only a body that is not JSON at all is an error. Any JSON value is
/// accepted; fields that are missing or not strings come back as `None`.
pub fn parse_caption_response(body: &[u8]) -> anyhow::Result<CaptionResponse> {
    let value: serde_json::Value =
        serde_json::from_slice(body).context("decode caption JSON")?;

    let field = |name: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    Ok(CaptionResponse {
        caption: field("caption"),
        error: field("error"),
    })
}
