//! HTTP client for the Gemini `generateContent` REST endpoint.
//!
//! Sends a single-turn prompt asking for a JSON document and decodes the
//! first candidate's text into a [`Recommendation`].

use std::time::Duration;

use dinnerbot_core::{AppConfig, Recommendation, Recommender};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GeminiError;
use crate::prompt;

const TEMPERATURE: f32 = 0.9;

/// [`Recommender`] backed by a Gemini model.
///
/// Use [`GeminiRecommender::new`] for production or
/// [`GeminiRecommender::with_base_url`] to point at a mock server in tests.
pub struct GeminiRecommender {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiRecommender {
    /// Creates a recommender from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, GeminiError> {
        Self::with_base_url(
            &config.gemini_api_key,
            &config.gemini_model,
            config.http_timeout_secs,
            &config.gemini_api_base,
        )
    }

    /// Creates a recommender with a custom API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("dinnerbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model.trim()
        );

        Ok(Self {
            client,
            api_key: api_key.trim().to_owned(),
            endpoint,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<Recommendation, GeminiError> {
        if self.api_key.is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GeminiError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::Deserialize {
                context: "generateContent response".to_string(),
                source: e,
            })?;

        let text = first_candidate_text(envelope).ok_or(GeminiError::EmptyResponse)?;
        parse_recommendation(&text)
    }
}

fn first_candidate_text(envelope: GenerateResponse) -> Option<String> {
    let text: String = envelope
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

fn parse_recommendation(text: &str) -> Result<Recommendation, GeminiError> {
    let recommendation: Recommendation = serde_json::from_str(prompt::strip_code_fence(text))
        .map_err(|e| GeminiError::Deserialize {
            context: "recommendation JSON".to_string(),
            source: e,
        })?;

    if recommendation.dishes.is_empty() {
        return Err(GeminiError::NoDishes);
    }
    Ok(recommendation)
}

impl Recommender for GeminiRecommender {
    type Error = GeminiError;

    async fn generate(&self) -> Result<Recommendation, GeminiError> {
        tracing::debug!("gemini: requesting daily dinner recommendation");
        self.complete(&prompt::daily_dinner()).await
    }

    async fn generate_from_ingredients(
        &self,
        ingredients: &str,
    ) -> Result<Recommendation, GeminiError> {
        tracing::debug!(ingredients, "gemini: requesting leftover recommendation");
        self.complete(&prompt::leftover_dinner(ingredients)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recommendation_rejects_empty_dish_list() {
        let err = parse_recommendation(r#"{"title":"x","dishes":[]}"#).unwrap_err();
        assert!(matches!(err, GeminiError::NoDishes));
    }

    #[test]
    fn parse_recommendation_reports_malformed_json() {
        let err = parse_recommendation("not json").unwrap_err();
        assert!(matches!(err, GeminiError::Deserialize { .. }));
    }

    #[test]
    fn first_candidate_text_joins_parts() {
        let envelope: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(first_candidate_text(envelope).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn first_candidate_text_is_none_without_candidates() {
        let envelope: GenerateResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(first_candidate_text(envelope).is_none());
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let rec = GeminiRecommender::with_base_url("k", "gemini-1.5-pro", 5, "http://x/").unwrap();
        assert_eq!(
            rec.endpoint,
            "http://x/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
