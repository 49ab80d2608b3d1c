/// LLM client: the single point of entry for all generative-model calls in Aura.
///
/// ARCHITECTURAL RULE: No other module may call the model provider directly.
/// All model interactions go through `PaletteModel`; `GeminiClient` is the
/// production implementation.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model returned empty content")]
    EmptyContent,
}

/// An image attached to a generation request, already split into mime type and base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Parses `data:<mime>;base64,<data>`. Anything else is passed through as
    /// raw base64 with an `image/jpeg` mime type.
    pub fn from_data_url(raw: &str) -> Self {
        parse_data_url(raw).unwrap_or_else(|| InlineImage {
            mime_type: DEFAULT_IMAGE_MIME.to_string(),
            data: raw.to_string(),
        })
    }
}

fn parse_data_url(raw: &str) -> Option<InlineImage> {
    let rest = raw.strip_prefix("data:")?;
    let (mime, data) = rest.split_once(";base64,")?;
    let mime_ok = !mime.is_empty()
        && mime
            .chars()
            .all(|c| c.is_ascii_alphabetic() || matches!(c, '-' | '+' | '/'));
    if !mime_ok || data.is_empty() {
        return None;
    }
    Some(InlineImage {
        mime_type: mime.to_string(),
        data: data.to_string(),
    })
}

/// A backing model that turns an instruction (plus optional image) into raw text.
///
/// Carried in `AppState` inside the generation gateway as `Arc<dyn PaletteModel>`.
#[async_trait]
pub trait PaletteModel: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        instruction: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_tokens: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    pub output_tokens: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl PaletteModel for GeminiClient {
    /// One call, no retries: fallback across models is the gateway's job.
    async fn generate(
        &self,
        model: &str,
        instruction: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, LlmError> {
        let mut parts = vec![RequestPart::Text { text: instruction }];
        if let Some(image) = image {
            parts.push(RequestPart::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            });
        }
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts,
            }],
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_BASE}/{model}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                model,
                prompt_tokens = usage.prompt_tokens,
                output_tokens = usage.output_tokens,
                "Model call succeeded"
            );
        }
        parsed.text().ok_or(LlmError::EmptyContent)
    }
}

/// Pulls the JSON object out of model output: drops Markdown fence markers,
/// then keeps everything from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> String {
    let mut cleaned = text.trim().to_string();
    if cleaned.contains("```") {
        cleaned = cleaned
            .replace("```json", "")
            .replace("```", "")
            .trim()
            .to_string();
    }
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start <= end => cleaned[start..=end].to_string(),
        _ => cleaned,
    }
}
