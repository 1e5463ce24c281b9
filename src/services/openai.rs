use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use std::{thread, time::Duration};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::model::{TranslationResponse, WordAlignment};
use crate::services::provider::{self, TranslationProvider};

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const TIMEOUT_SECS: u64 = 120;
const TEMPERATURE: f64 = 0.3;

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

fn endpoint_for(provider_type: &str, base_url: Option<&str>) -> Result<String, ProviderError> {
    if let Some(base) = base_url {
        return Ok(format!("{}/chat/completions", base.trim_end_matches('/')));
    }
    match provider_type {
        "openai" => Ok("https://api.openai.com/v1/chat/completions".into()),
        "deepseek" => Ok("https://api.deepseek.com/v1/chat/completions".into()),
        "openrouter" => Ok("https://openrouter.ai/api/v1/chat/completions".into()),
        "ollama" => Ok("http://localhost:11434/v1/chat/completions".into()),
        other => Err(ProviderError::UnsupportedProvider(other.to_string())),
    }
}

fn needs_api_key(provider_type: &str) -> bool {
    provider_type != "ollama"
}

/// Chat-completions provider for OpenAI and compatible endpoints.
pub struct OpenAiCompatibleProvider {
    client: Client,
    endpoint: String,
    config: ProviderConfig,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let endpoint = endpoint_for(&config.provider_type, config.base_url.as_deref())?;

        if needs_api_key(&config.provider_type) && config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey(config.name.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, user_prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": provider::SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt }
            ],
            "temperature": TEMPERATURE,
            "response_format": { "type": "json_object" }
        })
    }

    /// Sends one completion request, retrying transient failures with jittered
    /// exponential backoff. Returns the message content.
    fn complete(&self, user_prompt: &str) -> Result<String, ProviderError> {
        let body = self.request_body(user_prompt);
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRIES {
            let mut req = self.client.post(&self.endpoint).json(&body);
            if !self.config.api_key.is_empty() {
                req = req.bearer_auth(&self.config.api_key);
            }

            let resp = match req.send() {
                Ok(r) => r,
                Err(e) => {
                    last_err = e.to_string();
                    self.pause(attempt, &last_err);
                    continue;
                }
            };

            let status = resp.status();
            // Read as text first so an error body is not lost to a JSON failure.
            let text = match resp.text() {
                Ok(t) => t,
                Err(e) => {
                    last_err = e.to_string();
                    self.pause(attempt, &last_err);
                    continue;
                }
            };

            if !status.is_success() {
                last_err = extract_error_message(status, &text);
                if should_retry_http(status) {
                    self.pause(attempt, &last_err);
                    continue;
                }
                break;
            }

            match message_content(&text) {
                Ok(content) => {
                    debug!(provider = %self.config.name, attempt, "completion received");
                    return Ok(content);
                }
                Err(e) => {
                    last_err = e;
                    self.pause(attempt, &last_err);
                }
            }
        }

        Err(ProviderError::Exhausted {
            attempts: MAX_RETRIES,
            last_error: last_err,
        })
    }

    fn pause(&self, attempt: usize, reason: &str) {
        if attempt + 1 < MAX_RETRIES {
            warn!(provider = %self.config.name, attempt, reason, "retrying provider request");
            thread::sleep(backoff(attempt));
        }
    }
}

impl TranslationProvider for OpenAiCompatibleProvider {
    fn translate(
        &self,
        sentences: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<TranslationResponse, ProviderError> {
        let prompt = provider::translation_prompt(sentences, source_lang, target_lang);
        let content = self.complete(&prompt)?;
        parse_translation(&content)
    }

    fn regenerate_alignment(
        &self,
        source_text: &str,
        natural_translation: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<WordAlignment>, ProviderError> {
        let prompt = provider::alignment_prompt(source_text, natural_translation, source_lang, target_lang);
        let content = self.complete(&prompt)?;
        parse_alignments(&content)
    }

    fn detect_language(&self, text: &str) -> Result<String, ProviderError> {
        let content = self.complete(&provider::detection_prompt(text))?;
        parse_language(&content)
    }
}

fn message_content(body: &str) -> Result<String, String> {
    let v: Value = serde_json::from_str(body).map_err(|_| "invalid JSON from provider".to_string())?;
    v.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|c| c.trim().to_string())
        .ok_or_else(|| "missing choices[0].message.content".to_string())
}

// Models sometimes wrap JSON in a markdown fence.
fn strip_fence(content: &str) -> &str {
    let t = content.trim();
    let t = t
        .strip_prefix("```json")
        .or_else(|| t.strip_prefix("```"))
        .unwrap_or(t);
    t.strip_suffix("```").unwrap_or(t).trim()
}

pub fn parse_translation(content: &str) -> Result<TranslationResponse, ProviderError> {
    let parsed: TranslationResponse = serde_json::from_str(strip_fence(content))
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    if parsed.sentences.is_empty() {
        return Err(ProviderError::InvalidResponse("response holds no sentences".into()));
    }
    Ok(parsed)
}

pub fn parse_alignments(content: &str) -> Result<Vec<WordAlignment>, ProviderError> {
    #[derive(Deserialize)]
    struct Alignments {
        word_alignments: Vec<WordAlignment>,
    }

    serde_json::from_str::<Alignments>(strip_fence(content))
        .map(|a| a.word_alignments)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

pub fn parse_language(content: &str) -> Result<String, ProviderError> {
    #[derive(Deserialize)]
    struct Detected {
        language: String,
    }

    let detected: Detected = serde_json::from_str(strip_fence(content))
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    provider::normalize_language_code(&detected.language)
        .ok_or_else(|| ProviderError::InvalidResponse(format!("not a language code: {}", detected.language)))
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx are usually transient.
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet: String = if trimmed.chars().count() > 400 {
        format!("{}...", trimmed.chars().take(400).collect::<String>())
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider_type: &str, api_key: &str) -> ProviderConfig {
        ProviderConfig {
            name: "test".into(),
            provider_type: provider_type.into(),
            model: "m".into(),
            api_key: api_key.into(),
            base_url: None,
            is_default: false,
        }
    }

    #[test]
    fn endpoints_by_provider_type() {
        assert_eq!(
            endpoint_for("openai", None).unwrap(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint_for("custom", Some("http://host:8080/v1/")).unwrap(),
            "http://host:8080/v1/chat/completions"
        );
        assert!(matches!(
            endpoint_for("carrier-pigeon", None),
            Err(ProviderError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn api_key_required_except_local() {
        assert!(matches!(
            OpenAiCompatibleProvider::new(config("openai", " ")),
            Err(ProviderError::MissingApiKey(_))
        ));
        let local = OpenAiCompatibleProvider::new(config("ollama", "")).unwrap();
        assert_eq!(local.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn extracts_message_content() {
        let body = r#"{"choices":[{"message":{"content":"  {\"sentences\":[]} "}}]}"#;
        assert_eq!(message_content(body).unwrap(), r#"{"sentences":[]}"#);
        assert!(message_content(r#"{"choices":[]}"#).is_err());
        assert!(message_content("not json").is_err());
    }

    #[test]
    fn parses_fenced_translation() {
        let content = "```json\n{\"sentences\":[{\"source_text\":\"Hola\",\"natural_translation\":\"Hallo\",\
                       \"word_alignments\":[{\"source_word\":\"Hola\",\"target_word\":\"Hallo\",\"position\":0}]}]}\n```";
        let parsed = parse_translation(content).unwrap();
        assert_eq!(parsed.sentences[0].word_alignments[0].target_word, "Hallo");

        assert!(matches!(
            parse_translation("{\"sentences\":[]}"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parses_alignments() {
        let out = parse_alignments(
            r#"{"word_alignments":[{"source_word":"te","target_word":"dich","position":0}]}"#,
        )
        .unwrap();
        assert_eq!(out, vec![WordAlignment::new("te", "dich", 0)]);
    }

    #[test]
    fn parses_detected_language() {
        assert_eq!(parse_language(r#"{"language":"ES"}"#).unwrap(), "es");
        assert!(matches!(
            parse_language(r#"{"language":"Klingon"}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(parse_language("es").is_err());
    }

    #[test]
    fn error_messages_prefer_json_fields() {
        assert_eq!(
            extract_error_message(StatusCode::TOO_MANY_REQUESTS, r#"{"error":{"message":"slow down"}}"#),
            "HTTP 429: slow down"
        );
        assert_eq!(
            extract_error_message(StatusCode::BAD_GATEWAY, "upstream gone"),
            "HTTP 502: upstream gone"
        );
        assert!(should_retry_http(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!should_retry_http(StatusCode::UNAUTHORIZED));
    }
}
