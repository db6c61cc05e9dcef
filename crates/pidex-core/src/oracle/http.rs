//! Chat-completions oracle over HTTPS.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::decode::decode_records;
use super::{ApiKey, FieldOracle, OracleFuture};
use crate::error::OracleError;
use crate::models::config::OracleConfig;
use crate::models::record::ExtractionRecord;

const SYSTEM_PROMPT: &str = "You extract structured data from proforma invoices and other \
commercial documents. Pay particular attention to item tables where one item spans several \
lines. Always answer with valid JSON and no commentary.";

/// Oracle backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionOracle {
    client: reqwest::Client,
    config: OracleConfig,
    api_key: ApiKey,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionOracle {
    /// Create an oracle; the HTTP client carries the configured timeout.
    pub fn new(config: OracleConfig, api_key: ApiKey) -> Result<Self, OracleError> {
        if config.endpoint.trim().is_empty() {
            return Err(OracleError::Config("endpoint is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    async fn complete(&self, text: &str) -> Result<String, OracleError> {
        let prompt = task_prompt(text);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            "Sending {} chars to {} ({})",
            text.len(),
            self.config.endpoint,
            self.config.model
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Decode(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(OracleError::EmptyResponse)?;

        trace!("Oracle content: {}", content);
        Ok(content)
    }
}

impl FieldOracle for ChatCompletionOracle {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn extract<'a>(&'a self, text: &'a str) -> OracleFuture<'a> {
        Box::pin(async move {
            let content = self.complete(text).await?;
            let records: Vec<ExtractionRecord> = decode_records(&content)?;
            debug!("Oracle returned {} record(s)", records.len());
            Ok(records)
        })
    }
}

fn task_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following text extracted from a proforma invoice PDF and return one JSON object per item of the item table, as a JSON array.

For every item:
- "itemNo" is the code in the first column of the item table (e.g. 72692-01, 72692-02)
- "description" is the product name (e.g. coffee maker 127V), without Serial NO., G.W., N.W. or carton totals
- "quantity", "unitPrice" and "amount" are copied exactly as printed

Header fields are repeated on every item:
- piNo (P/I No.)
- poNo (P/O No.)
- scNo (S/C No.)
- beneficiary (BENEFICIARY)
- nameOfBank (NAME OF THE BANK)
- accountNo (ACCOUNT No.)
- swift (SWIFT)

Use an empty string "" for any field that is not found.

PDF text:
{text}

Answer with the JSON array only:"#
    )
}

/// The `error.message` of an API error body, or the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                "unknown error".to_string()
            } else {
                body.chars().take(200).collect()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_api_body() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
        assert_eq!(error_message(""), "unknown error");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_task_prompt_embeds_text() {
        let prompt = task_prompt("P/I No.: PI-1001");
        assert!(prompt.contains("P/I No.: PI-1001"));
        assert!(prompt.contains("\"itemNo\""));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "text",
                },
            ],
            temperature: 0.1,
            max_tokens: 4096,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 4096);
    }

    #[test]
    fn test_empty_endpoint_is_rejected() {
        let config = OracleConfig {
            endpoint: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ChatCompletionOracle::new(config, ApiKey::new("k")),
            Err(OracleError::Config(_))
        ));
    }

    #[test]
    fn test_response_without_choices() {
        let body: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(body.choices.is_empty());
    }
}
