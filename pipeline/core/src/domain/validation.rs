// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Validation record produced by the probability fusion step.

use serde::{Deserialize, Serialize};

/// Outcome of validating a hypothesis.
///
/// `confidence` is the reasoning service's own qualitative estimate;
/// `calibrated_confidence` is the forecasting model's, attached unmodified
/// when available. The two are reported side by side and never averaged:
/// calibration comes from a model validated on track record, reasoning
/// confidence from qualitative analysis, and disagreement between them is
/// itself signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationAssessment {
    /// Reasoning service confidence, in [0.0, 1.0]
    pub confidence: f64,

    /// Calibrated forecast, in [0.0, 1.0]; absent when the forecasting
    /// service is unconfigured or produced no signal
    pub calibrated_confidence: Option<f64>,

    /// Honest qualitative assessment behind the confidence level
    pub reasoning: String,

    /// What could go wrong if this is acted upon
    pub risks: Vec<String>,

    /// What to do to increase confidence
    pub next_steps: Vec<String>,
}

impl ValidationAssessment {
    /// Absolute disagreement between the two estimates, when both exist.
    /// Large gaps flag hypotheses where qualitative reasoning and track-record
    /// calibration diverge.
    pub fn estimate_gap(&self) -> Option<f64> {
        self.calibrated_confidence
            .map(|calibrated| (self.confidence - calibrated).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_gap_requires_both_scores() {
        let mut assessment = ValidationAssessment {
            confidence: 0.8,
            calibrated_confidence: None,
            reasoning: String::new(),
            risks: vec![],
            next_steps: vec![],
        };
        assert_eq!(assessment.estimate_gap(), None);

        assessment.calibrated_confidence = Some(0.55);
        assert!((assessment.estimate_gap().unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_absent_calibration_serializes_as_null() {
        let assessment = ValidationAssessment {
            confidence: 0.4,
            calibrated_confidence: None,
            reasoning: "weak".to_string(),
            risks: vec![],
            next_steps: vec![],
        };
        let json = serde_json::to_value(&assessment).unwrap();
        assert!(json["calibrated_confidence"].is_null());
    }
}
