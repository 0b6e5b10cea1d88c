//! VeoClient - handles communication with the Gemini API video endpoints.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::generation::{
    AspectRatio, GenerationOperation, GenerationRequest, OperationError, ProviderError,
    Resolution, VideoProvider,
};

/// Default base URL for the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for video generation.
pub const DEFAULT_MODEL: &str = "veo-3.0-generate-preview";

/// Header carrying the API key on submit and status requests.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Query parameter carrying the API key on the file download.
const API_KEY_QUERY_PARAM: &str = "key";

/// Default timeout for submit and status requests.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A download fails only if the connection stalls this long between reads.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One video per request.
const SAMPLE_COUNT: u32 = 1;

/// HTTP status code for rate limiting.
const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// HTTP status code for bad request (often content policy).
const HTTP_STATUS_BAD_REQUEST: u16 = 400;

/// HTTP status code for forbidden (content policy violation).
const HTTP_STATUS_FORBIDDEN: u16 = 403;

/// Keywords that indicate a content policy violation in error messages.
const CONTENT_POLICY_KEYWORDS: &[&str] = &[
    "content policy",
    "policy violation",
    "safety",
    "responsible ai",
    "inappropriate",
    "prohibited",
    "blocked",
    "violates",
];

/// Check if an error message indicates a content policy violation.
fn is_content_policy_error(error_text: &str) -> bool {
    let lower = error_text.to_lowercase();
    CONTENT_POLICY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Parse the Retry-After header value in seconds.
fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Request body for `predictLongRunning`.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<InlineImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    generate_audio: bool,
}

/// Long-running operation as returned by submit and status calls.
#[derive(Debug, Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<StatusError>,
    #[serde(default)]
    response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
struct StatusError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    #[serde(default)]
    uri: Option<String>,
}

impl From<OperationResponse> for GenerationOperation {
    fn from(op: OperationResponse) -> Self {
        let result_uri = op
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);

        let error = op.error.map(|e| OperationError {
            code: e.code,
            message: if e.message.is_empty() {
                "Unknown error occurred during generation".to_string()
            } else {
                e.message
            },
        });

        GenerationOperation {
            name: op.name,
            done: op.done,
            error,
            result_uri,
        }
    }
}

/// Client for the Gemini API long-running video endpoint.
pub struct VeoClient {
    api_key: String,
    base_url: String,
    model: String,
    request_timeout: Duration,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for VeoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VeoClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl VeoClient {
    /// Create a client with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingApiKey` if `api_key` is empty, or
    /// `ProviderError::Http` if the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        // No client-wide total timeout: it would also cap the streamed download
        let http_client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .read_timeout(DEFAULT_READ_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            http_client,
        })
    }

    /// Override the total timeout of submit and status requests.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create a client against the public API with the default model.
    pub fn with_api_key(api_key: String) -> Result<Self, ProviderError> {
        Self::new(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    /// Create a client with a custom base URL. Useful against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        Self::new(api_key, base_url, DEFAULT_MODEL.to_string())
    }

    /// Create a client with a custom model.
    pub fn with_model(api_key: String, model: String) -> Result<Self, ProviderError> {
        Self::new(api_key, DEFAULT_BASE_URL.to_string(), model)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:predictLongRunning", self.base_url, self.model)
    }

    fn operation_url(&self, operation_name: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            operation_name.trim_start_matches('/')
        )
    }

    /// The result locator with the API key appended as a query parameter.
    fn download_url(&self, locator: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(locator).map_err(|e| {
            ProviderError::InvalidResponse(format!("Invalid download link '{}': {}", locator, e))
        })?;
        url.query_pairs_mut()
            .append_pair(API_KEY_QUERY_PARAM, &self.api_key);
        Ok(url)
    }

    fn build_payload<'a>(&self, request: &'a GenerationRequest) -> PredictRequest<'a> {
        // Aspect ratio and resolution are collected but not transmitted
        if request.aspect_ratio() != AspectRatio::default()
            || request.resolution() != Resolution::default()
        {
            log::warn!(
                "Aspect ratio {} / resolution {} are not sent to {}; the model default is used",
                request.aspect_ratio(),
                request.resolution(),
                self.model
            );
        }

        let image = request.image().map(|image| InlineImage {
            bytes_base64_encoded: base64::engine::general_purpose::STANDARD.encode(image.bytes()),
            mime_type: image.mime_type().to_string(),
        });

        PredictRequest {
            instances: vec![Instance {
                prompt: request.prompt(),
                image,
            }],
            parameters: Parameters {
                sample_count: SAMPLE_COUNT,
                generate_audio: request.sound_enabled(),
            },
        }
    }

    /// Classify a non-success response.
    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status();

        if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
            let retry_after_secs = parse_retry_after(&response);
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Rate limit exceeded".to_string());
            log::warn!(
                "Rate limited by Gemini API. Retry-After: {:?} seconds",
                retry_after_secs
            );
            return ProviderError::RateLimited {
                message,
                retry_after_secs,
            };
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if (status.as_u16() == HTTP_STATUS_BAD_REQUEST || status.as_u16() == HTTP_STATUS_FORBIDDEN)
            && is_content_policy_error(&message)
        {
            log::warn!("Request rejected by content policy: {}", message);
            return ProviderError::ContentPolicyViolation { message };
        }

        ProviderError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl VideoProvider for VeoClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOperation, ProviderError> {
        let body = self.build_payload(request);

        let response = self
            .http_client
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let operation: OperationResponse = response.json().await?;
        Ok(operation.into())
    }

    async fn poll(
        &self,
        operation: &GenerationOperation,
    ) -> Result<GenerationOperation, ProviderError> {
        let response = self
            .http_client
            .get(self.operation_url(&operation.name))
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let refreshed: OperationResponse = response.json().await?;
        Ok(refreshed.into())
    }

    /// Streams the download to disk without loading the full video into memory.
    async fn download(&self, locator: &str, dest: &Path) -> Result<u64, ProviderError> {
        let url = self.download_url(locator)?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // The URL carries the key; strip it from any error before it can be logged
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: format!("Video download failed: {}", message),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        use futures_util::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProviderError::Http(e.without_url()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;

        Ok(written)
    }
}
