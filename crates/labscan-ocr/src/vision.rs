//! Google Cloud Vision Provider
//!
//! Sends documents to the Cloud Vision `images:annotate` REST endpoint with
//! `DOCUMENT_TEXT_DETECTION`. PDFs are submitted the same way as images.
//!
//! # Features
//!
//! - API-key authentication
//! - Per-request timeout
//! - Retry with exponential backoff on transport and 5xx errors
//!
//! # Examples
//!
//! ```no_run
//! use labscan_ocr::VisionProvider;
//! use labscan_domain::traits::OcrProvider;
//!
//! let provider = VisionProvider::new("my-api-key");
//! let output = provider.recognize(&std::fs::read("report.jpg").unwrap()).unwrap();
//! println!("{}", output.text);
//! ```

use crate::OcrError;
use base64::Engine;
use labscan_domain::traits::{OcrOutput, OcrProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Cloud Vision annotate endpoint
pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Default timeout for one annotate request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per document
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Header carrying the API key; keeps the key out of URLs and error text
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Cloud Vision OCR provider
pub struct VisionProvider {
    endpoint: String,
    api_key: String,
    timeout: Duration,
    max_retries: u32,
}

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: [ImageRequest<'a>; 1],
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image: ImageContent,
    features: [Feature<'a>; 1],
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    full_text_annotation: Option<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    confidence: f64,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl VisionProvider {
    /// Create a provider using the public endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key)
    }

    /// Create a provider against a custom endpoint (proxies, emulators)
    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_body(document: &[u8]) -> AnnotateRequest<'static> {
        AnnotateRequest {
            requests: [ImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(document),
                },
                features: [Feature {
                    kind: "DOCUMENT_TEXT_DETECTION",
                }],
            }],
        }
    }

    fn send(&self, document: &[u8]) -> Result<OcrOutput, OcrError> {
        // The blocking client owns a runtime; build it on the calling thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| OcrError::Communication(format!("Failed to build client: {}", e)))?;

        let body = Self::request_body(document);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            let request = client
                .post(&self.endpoint)
                .header(API_KEY_HEADER, &self.api_key)
                .json(&body);

            match request.send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = response.text().map_err(|e| {
                            OcrError::InvalidResponse(format!("Failed to read response: {}", e))
                        })?;
                        return parse_response(&text);
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(OcrError::RateLimitExceeded);
                    } else if status.is_client_error() {
                        let error_text = response
                            .text()
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(OcrError::Api(format!("HTTP {}: {}", status, error_text)));
                    } else {
                        let error_text = response
                            .text()
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(OcrError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(OcrError::Communication(format!(
                        "Request failed: {}",
                        e.without_url()
                    )));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(attempt = attempts, delay_secs = delay.as_secs(), "OCR request failed, retrying");
                std::thread::sleep(delay);
            }
        }

        Err(last_error
            .unwrap_or_else(|| OcrError::Communication("Max retries exceeded".to_string())))
    }
}

impl OcrProvider for VisionProvider {
    type Error = OcrError;

    fn recognize(&self, document: &[u8]) -> Result<OcrOutput, Self::Error> {
        if document.is_empty() {
            return Err(OcrError::InvalidInput("empty document".to_string()));
        }
        self.send(document)
    }
}

/// Interpret an annotate response body
///
/// An image without detected text is not an error: it yields empty text with
/// confidence 0.0.
fn parse_response(body: &str) -> Result<OcrOutput, OcrError> {
    let response: AnnotateResponse = serde_json::from_str(body)
        .map_err(|e| OcrError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let image = response
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| OcrError::InvalidResponse("no image response".to_string()))?;

    if let Some(status) = image.error {
        if !status.message.is_empty() || status.code != 0 {
            return Err(OcrError::Api(format!("{} (code {})", status.message, status.code)));
        }
    }

    let Some(annotation) = image.full_text_annotation else {
        debug!("OCR found no text");
        return Ok(OcrOutput::new("", 0.0, 0));
    };

    let page_count = annotation.pages.len();
    let confidence = if page_count == 0 {
        0.0
    } else {
        annotation.pages.iter().map(|p| p.confidence).sum::<f64>() / page_count as f64
    };

    debug!(pages = page_count, confidence, "OCR completed");
    Ok(OcrOutput::new(annotation.text, confidence, page_count))
}
