//! Identity-field extraction from a document photo through a vision
//! chat-completions endpoint (OpenAI-compatible, e.g. Groq).

use crate::{http_client, read_base64, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use presence_verification::{DocumentExtractor, DocumentFields, ExtractionError};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default OpenAI-compatible chat-completions endpoint.
pub const DEFAULT_EXTRACTION_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default vision model.
pub const DEFAULT_EXTRACTION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

const MAX_TOKENS: u32 = 300;

const PROMPT: &str = "\
You are given an image of a student ID card.

Task:
- Extract the student's full name
- Extract the branch / department

Rules:
- Ignore background text
- Ignore addresses, dates, phone numbers, fees, receipts
- Focus ONLY on identity information
- If a field is missing, return null

Return ONLY valid JSON in this exact format:
{
  \"name\": \"...\",
  \"branch\": \"...\"
}
";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// [`DocumentExtractor`] that asks a vision model to read the document.
pub struct ChatCompletionsExtractor {
    http_client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsExtractor {
    pub fn new(url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_timeout(url, model, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client: http_client(timeout),
            url: url.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl DocumentExtractor for ChatCompletionsExtractor {
    async fn extract(&self, image: &Path) -> Result<DocumentFields, ExtractionError> {
        let Some(api_key) = &self.api_key else {
            return Err(ExtractionError::NotConfigured);
        };
        let encoded = read_base64(image)
            .await
            .map_err(|_| ExtractionError::InputNotFound(image.display().to_string()))?;

        info!(image = %image.display(), model = %self.model, "extracting document fields");

        let body = json!({
            "model": self.model,
            "temperature": 0,
            "max_tokens": MAX_TOKENS,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:image/jpeg;base64,{encoded}") }
                    }
                ]
            }]
        });

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Request(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ExtractionError::Request(format!("connection failed: {e}"))
                } else {
                    ExtractionError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ExtractionError::Request(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Parse(format!("invalid completion response: {e}")))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractionError::Parse("completion has no content".into()))?;
        debug!(raw = %content, "raw model output");

        let fields = parse_fields(&content)?;
        info!(
            name = fields.name.as_deref().unwrap_or("-"),
            branch = fields.branch.as_deref().unwrap_or("-"),
            "document fields extracted"
        );
        Ok(fields)
    }
}

/// The span from the first `{` to the last `}`, if any.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the identity fields out of free-form model output.
fn parse_fields(text: &str) -> Result<DocumentFields, ExtractionError> {
    let object = first_json_object(text)
        .ok_or_else(|| ExtractionError::Parse(format!("no JSON object found in model output: {text}")))?;
    serde_json::from_str(object).map_err(|e| ExtractionError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_object() {
        let fields = parse_fields(r#"{"name": "Rahul Kumar", "branch": "Computer Science"}"#).unwrap();
        assert_eq!(fields.name.as_deref(), Some("Rahul Kumar"));
        assert_eq!(fields.branch.as_deref(), Some("Computer Science"));
    }

    #[test]
    fn test_parse_object_wrapped_in_prose() {
        let text = "Sure! Here is the data:\n```json\n{\n  \"name\": \"Priya Singh\",\n  \"branch\": null\n}\n```\nLet me know.";
        let fields = parse_fields(text).unwrap();
        assert_eq!(fields.name.as_deref(), Some("Priya Singh"));
        assert_eq!(fields.branch, None);
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let fields =
            parse_fields(r#"{"name": "Amit", "branch": "Mech", "roll_no": "42"}"#).unwrap();
        assert_eq!(fields.branch.as_deref(), Some("Mech"));
    }

    #[test]
    fn test_no_object_is_parse_error() {
        assert!(matches!(
            parse_fields("I cannot read this card."),
            Err(ExtractionError::Parse(_))
        ));
        assert!(matches!(parse_fields("} backwards {"), Err(ExtractionError::Parse(_))));
    }

    #[test]
    fn test_malformed_object_is_parse_error() {
        assert!(matches!(
            parse_fields(r#"{"name": "Unclosed}"#),
            Err(ExtractionError::Parse(_))
        ));
    }

    #[test]
    fn test_completion_response_shape() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}]}"#,
        )
        .unwrap();
        assert_eq!(chat.choices[0].message.content.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let extractor =
            ChatCompletionsExtractor::new(DEFAULT_EXTRACTION_URL, DEFAULT_EXTRACTION_MODEL, Some("  ".into()));
        assert!(!extractor.is_configured());
        let err = extractor.extract(Path::new("card.jpg")).await.unwrap_err();
        assert_eq!(err, ExtractionError::NotConfigured);
    }

    #[tokio::test]
    async fn test_missing_image_is_input_not_found() {
        let extractor = ChatCompletionsExtractor::new(
            "http://127.0.0.1:9/v1/chat/completions",
            DEFAULT_EXTRACTION_MODEL,
            Some("test-key".into()),
        );
        let err = extractor
            .extract(Path::new("/definitely/not/here/card.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InputNotFound(_)));
    }
}
