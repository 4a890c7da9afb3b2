// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Calibrated forecasting service boundary.
//!
//! A calibrated forecast is a probability from a model whose historical
//! accuracy at stated confidence levels has been validated. The service is
//! optional: an unconfigured or signal-less response is the normal
//! `Ok(None)` state, while `Err` is reserved for transport failures that the
//! caller folds into unavailability. "Unavailable" must never silently turn
//! into a default number.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

/// Domain interface for the calibrated forecasting service
#[async_trait]
pub trait Forecaster: Send + Sync {
    /// Estimate the probability that the hypothesis is true or will succeed.
    ///
    /// `Ok(Some(p))` with `p` in [0.0, 1.0], `Ok(None)` when the service is
    /// unconfigured or produced no extractable probability.
    async fn calibrated_probability(
        &self,
        hypothesis: &str,
        background: Option<&str>,
    ) -> Result<Option<f64>, ForecastError>;
}

/// Transport-level forecasting failures. Callers treat these as equivalent
/// to the service being absent; they never abort a validation.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

// Forecasting models narrate before answering; the final probability is the
// last token that looks like one.
static DECIMAL_PROBABILITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(0\.\d+|1\.00?)\b").expect("decimal probability regex"));
static PERCENT_PROBABILITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})%").expect("percent probability regex"));

/// Extract a probability from free-text model output.
///
/// Scans for decimal tokens (`0.xx`, `1.0`) and takes the last match; failing
/// that, scans for percentage tokens (`NN%`) and takes the last, divided by
/// 100. The result is clamped to [0.0, 1.0] unconditionally. Returns `None`
/// when neither pattern appears.
pub fn extract_probability(text: &str) -> Option<f64> {
    if let Some(last) = DECIMAL_PROBABILITY
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .last()
    {
        if let Ok(value) = last.as_str().parse::<f64>() {
            return Some(value.clamp(0.0, 1.0));
        }
    }

    if let Some(last) = PERCENT_PROBABILITY
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .last()
    {
        if let Ok(value) = last.as_str().parse::<f64>() {
            return Some((value / 100.0).clamp(0.0, 1.0));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_decimal_wins() {
        let text = "Factors in favor suggest 0.42, but weighing the risks I land at 0.71 final";
        assert_eq!(extract_probability(text), Some(0.71));
    }

    #[test]
    fn test_percentage_fallback() {
        let text = "I'd put the odds at roughly 85% given the track record.";
        assert_eq!(extract_probability(text), Some(0.85));
    }

    #[test]
    fn test_decimal_preferred_over_percentage() {
        let text = "Around 60% seems right, so: 0.55";
        assert_eq!(extract_probability(text), Some(0.55));
    }

    #[test]
    fn test_no_signal_is_none() {
        assert_eq!(extract_probability("The outlook is murky at best."), None);
        assert_eq!(extract_probability(""), None);
    }

    #[test]
    fn test_out_of_range_percentage_is_clamped() {
        assert_eq!(extract_probability("confidence: 250%"), Some(1.0));
    }

    #[test]
    fn test_exact_one_parses() {
        assert_eq!(extract_probability("final answer: 1.0"), Some(1.0));
        assert_eq!(extract_probability("final answer: 1.00"), Some(1.0));
    }

    #[test]
    fn test_multiline_final_answer() {
        let text = "Step by step:\n- base rate 0.3\n- strong team, adjust up\n\n0.45";
        assert_eq!(extract_probability(text), Some(0.45));
    }
}
