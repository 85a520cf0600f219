use crate::text::DEFAULT_FALLBACK_CAPTION;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CAPTION_PATH: &str = "/generate-caption";
pub const DEFAULT_UPLOAD_FIELD: &str = "file";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    #[serde(default = "default_caption_path")]
    pub caption_path: String,
    #[serde(default = "default_upload_field")]
    pub upload_field: String,

    // Optional bearer token for hosted backends; the reference backend is unauthenticated.
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("caption_path", &self.caption_path)
            .field("upload_field", &self.upload_field)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            caption_path: default_caption_path(),
            upload_field: default_upload_field(),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTimeouts {
    pub connect_timeout_secs: u64,
    // Captioning models can be slow on CPU; keep this generous.
    pub request_timeout_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub http: HttpTimeouts,
    #[serde(default = "default_fallback_caption")]
    pub fallback_caption: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            http: HttpTimeouts::default(),
            fallback_caption: default_fallback_caption(),
        }
    }
}

fn default_caption_path() -> String {
    DEFAULT_CAPTION_PATH.into()
}

fn default_upload_field() -> String {
    DEFAULT_UPLOAD_FIELD.into()
}

fn default_fallback_caption() -> String {
    DEFAULT_FALLBACK_CAPTION.into()
}
