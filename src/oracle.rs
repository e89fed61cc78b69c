//! Optional LLM assistance.
//!
//! The oracle is an injected collaborator behind a narrow interface: it may
//! propose per-article labels and a narrative summary. Both are advisory.
//! Canonical categories always come from the rule engine, and every oracle
//! failure degrades to rule-only behavior without failing the batch.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::types::{NewsItem, PipelineError, Result};

/// How many articles are offered for labeling / summarizing per run. The
/// batch is capped to keep prompts bounded.
const LABEL_BATCH: usize = 60;
const SUMMARY_BATCH: usize = 16;

#[async_trait]
pub trait Oracle: Send + Sync {
    fn name(&self) -> &str;

    /// Propose one short free-text label per article id.
    async fn suggest_labels(&self, items: &[NewsItem]) -> Result<HashMap<String, String>>;

    /// Produce a short narrative over the batch.
    async fn summarize(&self, items: &[NewsItem]) -> Result<String>;
}

/// Oracle backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiOracle {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiOracle {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            api_key,
            model,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Build an oracle when credentials are configured, `None` otherwise.
    pub fn from_config(config: &PipelineConfig) -> Option<Self> {
        config
            .openai_api_key
            .as_ref()
            .map(|key| Self::new(key.clone(), config.openai_model.clone()))
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn chat(&self, prompt: String, max_tokens: u32, temperature: f64) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Oracle(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Oracle(format!("API error {status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Oracle(format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| PipelineError::Oracle("empty response".to_string()))
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    fn name(&self) -> &str {
        "openai"
    }

    async fn suggest_labels(&self, items: &[NewsItem]) -> Result<HashMap<String, String>> {
        let batch: Vec<_> = items
            .iter()
            .take(LABEL_BATCH)
            .map(|it| json!({"id": it.id, "title": it.title, "summary": it.summary}))
            .collect();

        let prompt = format!(
            "Assign one short topic label to each item for older-adult news. \
             Use only these buckets when possible: Medicare; Social Security; Finance & Retirement; Travel; Golf & Leisure; \
             Cooking & Nutrition; Caregiving & LTC; Aging Research; Safety & Scams; Policy & Legislation; General. \
             Return JSON object {{id: label}}.\nItems:\n{}",
            serde_json::to_string(&batch)?
        );

        let text = self.chat(prompt, 900, 0.1).await?;

        // Tolerate prose around the JSON object; a response we cannot parse
        // is treated as "no suggestions".
        match extract_json_object(&text) {
            Some(labels) => {
                debug!(count = labels.len(), "oracle proposed labels");
                Ok(labels)
            }
            None => {
                warn!("oracle label response was not parseable JSON");
                Ok(HashMap::new())
            }
        }
    }

    async fn summarize(&self, items: &[NewsItem]) -> Result<String> {
        let bullets: Vec<String> = items
            .iter()
            .take(SUMMARY_BATCH)
            .map(|it| {
                format!(
                    "• {} — {}",
                    it.title,
                    crate::utils::text::truncate_chars(&it.summary, 200)
                )
            })
            .collect();

        let prompt = format!(
            "Summarize key developments for U.S. older adults in 120–180 words. \
             Cover Medicare, Social Security, Finance/Retirement, Aging Research, Caregiving/LTC, Travel/Leisure, \
             Cooking/Nutrition, and Safety/Scams if present. Neutral, precise, plain English. \
             Provide 3–5 crisp bullets after the paragraph.\n\nHeadlines:\n{}",
            bullets.join("\n")
        );

        self.chat(prompt, 400, 0.2).await
    }
}

/// Fixed-response oracle for tests and offline development.
pub struct MockOracle {
    labels: HashMap<String, String>,
    summary: String,
}

impl MockOracle {
    pub fn new(labels: HashMap<String, String>, summary: impl Into<String>) -> Self {
        Self {
            labels,
            summary: summary.into(),
        }
    }
}

#[async_trait]
impl Oracle for MockOracle {
    fn name(&self) -> &str {
        "mock"
    }

    async fn suggest_labels(&self, _items: &[NewsItem]) -> Result<HashMap<String, String>> {
        Ok(self.labels.clone())
    }

    async fn summarize(&self, _items: &[NewsItem]) -> Result<String> {
        Ok(self.summary.clone())
    }
}

/// Pull the outermost `{...}` span out of a model response and parse it as a
/// string-to-string map.
fn extract_json_object(text: &str) -> Option<HashMap<String, String>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}
