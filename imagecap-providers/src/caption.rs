use crate::request::{Body, HttpRequest};
use imagecap_core::config::EndpointConfig;
use imagecap_core::types::SelectedFile;

/// Builds the multipart upload for `POST {base_url}{caption_path}`.
///
/// The image goes into a single file field (`file` by default) with its
/// original filename and media type.
pub fn build_caption_request(endpoint: &EndpointConfig, image: &SelectedFile) -> HttpRequest {
    let boundary = format!("Boundary-{}", uuid::Uuid::new_v4());

    let mut body: Vec<u8> = Vec::with_capacity(image.bytes.len() + 256);
    append_file(
        &mut body,
        &boundary,
        &endpoint.upload_field,
        &image.filename,
        image.media_type.as_str(),
        &image.bytes,
    );
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    let mut headers = vec![
        (
            "Content-Type".into(),
            format!("multipart/form-data; boundary={}", boundary),
        ),
        ("Accept".into(), "application/json".into()),
    ];
    if let Some(token) = endpoint.auth_token.as_ref().filter(|t| !t.trim().is_empty()) {
        headers.push(("Authorization".into(), format!("Bearer {}", token.trim())));
    }

    HttpRequest {
        method: "POST".into(),
        url: join_url(&endpoint.base_url, &endpoint.caption_path),
        headers,
        body: Body::MultipartFormData {
            boundary,
            bytes: body,
        },
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

fn append_file(
    body: &mut Vec<u8>,
    boundary: &str,
    name: &str,
    filename: &str,
    mime_type: &str,
    bytes: &[u8],
) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            quote_param(name),
            quote_param(filename)
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
}

// Same escaping browsers apply to form-data parameter values.
fn quote_param(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
