// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Calibrated forecasting adapter.
//!
//! Talks to OpenForecaster-8B through the HuggingFace Inference API. The
//! model is trained specifically for forecasting and provides calibrated
//! probabilities: when it says 70%, it is right about 70% of the time.
//!
//! Absence of a token is a normal, silent "disabled" state: the client is
//! constructed either way, and a disabled client answers `Ok(None)` without
//! touching the network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::forecast::{extract_probability, ForecastError, Forecaster};

pub const DEFAULT_MODEL_ID: &str = "nikhilchandak/OpenForecaster-8B";

const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";

pub struct OpenForecastClient {
    client: reqwest::Client,
    token: Option<String>,
    model_id: String,
}

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct InferenceResponse {
    generated_text: String,
}

impl OpenForecastClient {
    pub fn new(token: Option<String>, model_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.filter(|t| !t.is_empty()),
            model_id,
        }
    }

    pub fn from_token(token: Option<String>) -> Self {
        Self::new(token, DEFAULT_MODEL_ID.to_string())
    }

    /// A client that always reports "no calibrated estimate".
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_MODEL_ID.to_string())
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    fn forecast_prompt(hypothesis: &str, background: Option<&str>) -> String {
        let background_part = match background {
            Some(b) => format!("\n\nBackground: {}", b),
            None => String::new(),
        };

        format!(
            r#"Question: What is the probability that the following hypothesis is true or will succeed?

Hypothesis: {hypothesis}{background_part}

Resolution Criteria: The hypothesis is considered resolved TRUE if the stated outcome occurs or the claim is validated.

Provide your probability estimate as a decimal between 0.0 and 1.0.
Think step by step about the factors that support and oppose this hypothesis.
End with your final probability on a new line as just the number."#
        )
    }
}

#[async_trait]
impl Forecaster for OpenForecastClient {
    async fn calibrated_probability(
        &self,
        hypothesis: &str,
        background: Option<&str>,
    ) -> Result<Option<f64>, ForecastError> {
        let Some(token) = &self.token else {
            return Ok(None);
        };

        let request = InferenceRequest {
            inputs: Self::forecast_prompt(hypothesis, background),
            parameters: InferenceParameters {
                max_new_tokens: 1024,
                // Low temperature for consistent probabilities
                temperature: 0.3,
                do_sample: true,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(format!("{}/{}", INFERENCE_BASE_URL, self.model_id))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ForecastError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::Provider(format!("HTTP {}: {}", status, body)));
        }

        // The inference API returns a one-element array of generations.
        let generations: Vec<InferenceResponse> = response
            .json()
            .await
            .map_err(|e| ForecastError::Provider(format!("Failed to parse response: {}", e)))?;

        let text = match generations.first() {
            Some(g) => g.generated_text.as_str(),
            None => return Ok(None),
        };

        let probability = extract_probability(text);
        if probability.is_none() {
            tracing::debug!(model = %self.model_id, "forecast output carried no probability signal");
        }
        Ok(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_client_is_silently_unavailable() {
        let client = OpenForecastClient::disabled();
        assert!(!client.is_enabled());
        let result = client
            .calibrated_probability("We will reach 10M ARR", None)
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_empty_token_counts_as_disabled() {
        let client = OpenForecastClient::from_token(Some(String::new()));
        assert!(!client.is_enabled());
    }

    #[test]
    fn test_prompt_demands_final_number() {
        let prompt = OpenForecastClient::forecast_prompt("hypothesis", Some("context"));
        assert!(prompt.contains("Background: context"));
        assert!(prompt.contains("final probability on a new line"));
    }
}
