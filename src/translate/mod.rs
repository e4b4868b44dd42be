// Search term translation into the indexing language
//
// Labels are stored in English (the model's class names), so queries typed
// in other languages are translated before the exact-match lookup.

use std::time::Duration;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, VidSearchError};

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Client for the Google Translate web endpoint (`translate_a/single`)
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    target_language: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: &str, target_language: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            target_language: target_language.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.translate_endpoint,
            &config.target_language,
            Duration::from_secs(config.translate_timeout_secs),
        )
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target_language.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        parse_translation(&body)
    }
}

/// Hands text back untouched
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload is positional: `[[["<translated>", "<source>", ...], ...], ...]`.
pub fn parse_translation(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| VidSearchError::Translation("response has no segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(VidSearchError::Translation("response has no translated text".to_string()));
    }
    Ok(translated)
}

/// Normalize a query into the form labels are stored in.
/// Translation failures fall back to the original text.
pub async fn to_index_term(translator: Option<&dyn Translator>, text: &str) -> String {
    let text = text.trim();
    let Some(translator) = translator else {
        return text.to_lowercase();
    };

    match translator.translate(text).await {
        Ok(translated) => translated.trim().to_lowercase(),
        Err(e) => {
            log::warn!("Translation of '{}' failed, searching untranslated: {}", text, e);
            text.to_lowercase()
        }
    }
}
