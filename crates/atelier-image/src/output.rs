use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Downloaded image bytes plus their MIME type
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl GeneratedImage {
    pub fn new(data: Vec<u8>, content_type: Option<&str>) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        Self { data, content_type }
    }

    pub(crate) async fn from_response(response: reqwest::Response) -> reqwest::Result<Self> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await?.to_vec();
        Ok(Self::new(data, content_type.as_deref()))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.data))
    }
}

/// Payload part of a `data:` URL, or `None` for anything else
pub fn strip_data_url(value: &str) -> Option<&str> {
    let rest = value.strip_prefix("data:")?;
    rest.split_once(',').map(|(_, payload)| payload)
}
