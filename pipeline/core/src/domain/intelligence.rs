// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Typed outputs of the exploration and planning operations, and the error
//! taxonomy shared by every orchestrator call.

use serde::{Deserialize, Serialize};

use crate::domain::llm::LLMError;

/// A nascent direction worth investigating, produced by exploration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NascentIdea {
    /// Concise name (3-6 words)
    pub title: String,
    /// 2-3 sentences on what this is
    pub description: String,
    /// One sentence on how it connects to the goal
    pub why_relevant: String,
}

/// Effort band for a planned action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortLevel {
    /// Under a day
    Low,
    /// 1-5 days
    Medium,
    /// More than 5 days
    High,
}

/// A concrete step in an action plan, ordered by priority/sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanAction {
    /// Specific, measurable step (starts with a verb)
    pub action: String,
    /// One sentence on how it advances the goal
    pub why: String,
    pub effort: EffortLevel,
    /// Actions in the same plan, referenced by their text, that must happen
    /// first. Empty means no prerequisite.
    pub dependencies: Vec<String>,
}

/// Failures of a single orchestrator operation.
///
/// Both kinds are operation-fatal but process-safe: the caller gets an
/// explicit error naming the failing stage, never an empty or default result,
/// so "the system could not answer" stays distinguishable from "the idea is
/// not promising".
#[derive(Debug, thiserror::Error)]
pub enum IntelligenceError {
    /// The reasoning service call itself failed (network/auth/rate-limit).
    #[error("Reasoning service call failed: {0}")]
    Generation(#[from] LLMError),

    /// The reasoning service answered, but its output could not be decoded
    /// into the required shape after fence-stripping.
    #[error("Malformed reasoning output in {operation}: {detail}")]
    Parse {
        operation: &'static str,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effort_wire_form() {
        assert_eq!(serde_json::to_string(&EffortLevel::Low).unwrap(), "\"low\"");
        let parsed: EffortLevel = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, EffortLevel::Medium);
        assert!(serde_json::from_str::<EffortLevel>("\"herculean\"").is_err());
    }

    #[test]
    fn test_plan_action_deserializes_from_model_output() {
        let raw = r#"{
            "action": "Talk to 5 potential customers",
            "why": "Validates demand before building",
            "effort": "low",
            "dependencies": []
        }"#;
        let action: PlanAction = serde_json::from_str(raw).unwrap();
        assert_eq!(action.effort, EffortLevel::Low);
        assert!(action.dependencies.is_empty());
    }

    #[test]
    fn test_error_names_failing_stage() {
        let err = IntelligenceError::Parse {
            operation: "plan",
            detail: "expected array".to_string(),
        };
        assert!(err.to_string().contains("plan"));

        let err = IntelligenceError::Generation(LLMError::RateLimit);
        assert!(err.to_string().contains("Reasoning service"));
    }
}
