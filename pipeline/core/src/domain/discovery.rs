// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Context discovery types: the questions the system asks the user, and the
//! completeness self-assessment that comes back with them.

use serde::{Deserialize, Serialize};

/// The five fixed categories the discovery loop organizes knowledge into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCategory {
    Product,
    Market,
    Team,
    Finance,
    Strategy,
}

impl ContextCategory {
    pub const ALL: [ContextCategory; 5] = [
        ContextCategory::Product,
        ContextCategory::Market,
        ContextCategory::Team,
        ContextCategory::Finance,
        ContextCategory::Strategy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContextCategory::Product => "product",
            ContextCategory::Market => "market",
            ContextCategory::Team => "team",
            ContextCategory::Finance => "finance",
            ContextCategory::Strategy => "strategy",
        }
    }
}

/// How urgently an unknown needs answering before advice can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPriority {
    High,
    Medium,
    Low,
}

/// A single gap in project knowledge, surfaced to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextQuestion {
    pub question: String,
    pub why_it_matters: String,
    pub priority: QuestionPriority,
    pub category: ContextCategory,
}

/// Result of a discovery pass over the current ledger: the most valuable
/// unknowns (3-5), a holistic completeness self-assessment, and a short
/// summary of what is already known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDiscovery {
    pub questions: Vec<ContextQuestion>,
    /// In [0.0, 1.0]; a judgment over the whole ledger, not a question count
    pub context_completeness: f64,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_form_is_snake_case() {
        let json = serde_json::to_string(&ContextCategory::Finance).unwrap();
        assert_eq!(json, "\"finance\"");
        let parsed: ContextCategory = serde_json::from_str("\"market\"").unwrap();
        assert_eq!(parsed, ContextCategory::Market);
    }

    #[test]
    fn test_discovery_deserializes_from_model_output() {
        let raw = r#"{
            "questions": [
                {
                    "question": "What is the current MRR?",
                    "why_it_matters": "Revenue anchors every growth plan",
                    "priority": "high",
                    "category": "finance"
                }
            ],
            "context_completeness": 0.35,
            "summary": "Early-stage B2B product, team of four, no revenue data yet."
        }"#;
        let discovery: ContextDiscovery = serde_json::from_str(raw).unwrap();
        assert_eq!(discovery.questions.len(), 1);
        assert_eq!(discovery.questions[0].priority, QuestionPriority::High);
        assert_eq!(discovery.questions[0].category, ContextCategory::Finance);
        assert!((discovery.context_completeness - 0.35).abs() < 1e-9);
    }
}
