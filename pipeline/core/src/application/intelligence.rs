// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Intelligence Orchestrator
//!
//! The four strategic operations (explore, validate, plan, discover gaps)
//! plus answer integration. Each builds a deterministic prompt from
//! structured inputs, makes a single reasoning-service call, and decodes the
//! response into a typed result.
//!
//! Validation is the probability fusion step: a calibrated forecast is
//! fetched first, independently, and attached to the reasoning verdict
//! unmodified. The two scores are never averaged; disagreement between them
//! is signal the caller should see.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::application::response::decode;
use crate::domain::discovery::ContextDiscovery;
use crate::domain::forecast::Forecaster;
use crate::domain::intelligence::{IntelligenceError, NascentIdea, PlanAction};
use crate::domain::llm::{GenerationOptions, ReasoningProvider};
use crate::domain::validation::ValidationAssessment;

/// Orchestrator interface consumed by the request layer.
///
/// All operations are stateless request/response calls. The only required
/// sequencing is the discovery cycle: after `integrate_answers` the caller
/// must re-invoke `discover_context` on the new ledger to obtain a fresh
/// completeness score and summary — completeness is a holistic judgment over
/// the whole blob, not a count of answered questions, so it is re-derived,
/// never incremented.
#[async_trait]
pub trait IntelligenceService: Send + Sync {
    /// Explore a problem space and return 3-5 nascent directions.
    async fn wander(
        &self,
        context: &str,
        goal: &str,
        project_context: Option<&Value>,
    ) -> Result<Vec<NascentIdea>, IntelligenceError>;

    /// Test a hypothesis: calibrated forecast (when available) plus an
    /// independent reasoning verdict, reported side by side.
    async fn validate(
        &self,
        hypothesis: &str,
        context: Option<&str>,
    ) -> Result<ValidationAssessment, IntelligenceError>;

    /// Convert a validated idea into 3-7 ordered, concrete actions.
    async fn plan(
        &self,
        validated_idea: &str,
        goal: &str,
        constraints: Option<&str>,
    ) -> Result<Vec<PlanAction>, IntelligenceError>;

    /// Identify the most valuable unknowns in the project's ledger.
    async fn discover_context(
        &self,
        project_name: &str,
        goal: &str,
        known_context: Option<&Value>,
    ) -> Result<ContextDiscovery, IntelligenceError>;

    /// Merge the user's answers into the ledger, returning the new blob.
    async fn integrate_answers(
        &self,
        project_name: &str,
        goal: &str,
        existing_context: Option<&Value>,
        answers: &HashMap<String, String>,
    ) -> Result<Value, IntelligenceError>;
}

/// Standard implementation over injected service boundaries. No global
/// client handles: both collaborators arrive through the constructor so
/// tests can script them.
pub struct StandardIntelligenceService {
    reasoning: Arc<dyn ReasoningProvider>,
    forecaster: Arc<dyn Forecaster>,
}

impl StandardIntelligenceService {
    pub fn new(reasoning: Arc<dyn ReasoningProvider>, forecaster: Arc<dyn Forecaster>) -> Self {
        Self {
            reasoning,
            forecaster,
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, IntelligenceError> {
        let options = GenerationOptions {
            max_tokens: Some(1024),
            temperature: Some(temperature),
        };
        let response = self.reasoning.generate(prompt, &options).await?;
        Ok(response.text)
    }
}

/// Wire shape of the reasoning verdict, before the calibrated estimate is
/// attached. Exactly the four fields the prompt demands.
#[derive(Debug, Deserialize)]
struct ReasoningVerdict {
    confidence: f64,
    reasoning: String,
    risks: Vec<String>,
    next_steps: Vec<String>,
}

#[async_trait]
impl IntelligenceService for StandardIntelligenceService {
    async fn wander(
        &self,
        context: &str,
        goal: &str,
        project_context: Option<&Value>,
    ) -> Result<Vec<NascentIdea>, IntelligenceError> {
        let prompt = wander_prompt(context, goal, project_context);
        let text = self.generate(&prompt, 0.8).await?;
        decode("wander", &text)
    }

    async fn validate(
        &self,
        hypothesis: &str,
        context: Option<&str>,
    ) -> Result<ValidationAssessment, IntelligenceError> {
        // Step 1: calibrated forecast, independent of the reasoning call.
        // Transport failures degrade to "no calibrated estimate"; they must
        // never block or fail the validation.
        let calibrated = match self
            .forecaster
            .calibrated_probability(hypothesis, context)
            .await
        {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "forecasting service unavailable, validating without calibration");
                None
            }
        };

        // Step 2+3: reasoning verdict with its own independent confidence.
        let prompt = validate_prompt(hypothesis, context, calibrated);
        let text = self.generate(&prompt, 0.2).await?;
        let verdict: ReasoningVerdict = decode("validate", &text)?;

        // Step 4: attach the forecast unmodified. Side by side, not fused.
        Ok(ValidationAssessment {
            confidence: verdict.confidence.clamp(0.0, 1.0),
            calibrated_confidence: calibrated,
            reasoning: verdict.reasoning,
            risks: verdict.risks,
            next_steps: verdict.next_steps,
        })
    }

    async fn plan(
        &self,
        validated_idea: &str,
        goal: &str,
        constraints: Option<&str>,
    ) -> Result<Vec<PlanAction>, IntelligenceError> {
        let prompt = plan_prompt(validated_idea, goal, constraints);
        let text = self.generate(&prompt, 0.4).await?;
        decode("plan", &text)
    }

    async fn discover_context(
        &self,
        project_name: &str,
        goal: &str,
        known_context: Option<&Value>,
    ) -> Result<ContextDiscovery, IntelligenceError> {
        let prompt = discover_prompt(project_name, goal, known_context);
        let text = self.generate(&prompt, 0.3).await?;
        let discovery: ContextDiscovery = decode("discover_context", &text)?;
        Ok(ContextDiscovery {
            context_completeness: discovery.context_completeness.clamp(0.0, 1.0),
            ..discovery
        })
    }

    async fn integrate_answers(
        &self,
        project_name: &str,
        goal: &str,
        existing_context: Option<&Value>,
        answers: &HashMap<String, String>,
    ) -> Result<Value, IntelligenceError> {
        let prompt = integrate_prompt(project_name, goal, existing_context, answers);
        let text = self.generate(&prompt, 0.2).await?;
        let merged: Value = decode("integrate_answers", &text)?;

        // The category schema is a suggestion to the model, not validated
        // here; but the ledger must at least be a JSON object.
        if !merged.is_object() {
            return Err(IntelligenceError::Parse {
                operation: "integrate_answers",
                detail: "merged context is not a JSON object".to_string(),
            });
        }
        Ok(merged)
    }
}

fn wander_prompt(context: &str, goal: &str, project_context: Option<&Value>) -> String {
    let grounding = match project_context {
        Some(ledger) => format!(
            "\n\nWhat is already known about this project:\n{}\n\nGround your suggestions in these facts.",
            pretty(ledger)
        ),
        None => String::new(),
    };

    format!(
        r#"You are a strategic advisor helping identify paths to: {goal}

The user wants to explore: {context}{grounding}

Generate 3-5 nascent ideas worth investigating. For each:
- title: concise name (3-6 words)
- description: 2-3 sentences on what this is
- why_relevant: one sentence on how it connects to the goal

Be creative but grounded. These are starting points for exploration, not complete solutions.
Look for non-obvious angles, underexplored opportunities, and strategic leverage points.

Return ONLY a JSON array, no other text:
[{{"title": "...", "description": "...", "why_relevant": "..."}}]"#
    )
}

fn validate_prompt(hypothesis: &str, context: Option<&str>, calibrated: Option<f64>) -> String {
    let context_section = match context {
        Some(c) => format!("\n\nAdditional context: {}", c),
        None => String::new(),
    };

    let calibration_note = match calibrated {
        Some(p) => format!(
            "\n\nNote: A calibrated forecasting model (OpenForecaster-8B, trained on 52k forecasting questions) \
             estimates the probability of this hypothesis at {:.0}%. \
             This model has been validated to be well-calibrated - when it says X%, it's right about X% of the time. \
             Factor this into your assessment, but also provide your own analysis.",
            p * 100.0
        ),
        None => String::new(),
    };

    format!(
        r#"Evaluate this hypothesis:

"{hypothesis}"{context_section}{calibration_note}

Be rigorous and intellectually honest. Consider:
1. What evidence or reasoning supports this?
2. What evidence or reasoning contradicts this?
3. What's unknown that would significantly affect the assessment?
4. What could go wrong if this is acted upon?

Return ONLY a JSON object, no other text:
{{
  "confidence": <number between 0.0 and 1.0>,
  "reasoning": "<your honest assessment in 2-4 sentences>",
  "risks": ["<risk 1>", "<risk 2>", ...],
  "next_steps": ["<what to do to increase confidence>", ...]
}}

Calibration guide:
- 0.0-0.3: Unlikely or deeply flawed
- 0.3-0.5: Possible but significant concerns
- 0.5-0.7: Reasonable but needs validation
- 0.7-0.85: Strong case with minor uncertainties
- 0.85-1.0: Very high confidence (rare)

Do NOT be agreeable. If it's a bad idea, say so clearly."#
    )
}

fn plan_prompt(validated_idea: &str, goal: &str, constraints: Option<&str>) -> String {
    let constraints_section = match constraints {
        Some(c) => format!("\nConstraints: {}", c),
        None => String::new(),
    };

    format!(
        r#"Create an action plan to execute this idea.

Goal: {goal}
Validated idea: {validated_idea}{constraints_section}

Generate 3-7 concrete next actions. For each:
- action: specific, measurable step (starts with a verb)
- why: one sentence on how it advances toward the goal
- effort: "low" (< 1 day), "medium" (1-5 days), or "high" (> 5 days)
- dependencies: list of actions (by their exact text from this plan) that must happen first (empty list if none)

Requirements:
- First action should be doable THIS WEEK
- Actions should be concrete, not vague ("Talk to 5 potential customers" not "Do market research")
- Order by priority/sequence

Return ONLY a JSON array, no other text:
[{{"action": "...", "why": "...", "effort": "low|medium|high", "dependencies": [...]}}]"#
    )
}

fn discover_prompt(project_name: &str, goal: &str, known_context: Option<&Value>) -> String {
    let known_section = match known_context {
        Some(ledger) => format!(
            "\n\nWhat is already known (do NOT re-ask anything answered here):\n{}",
            pretty(ledger)
        ),
        None => "\n\nNothing is known about this project yet.".to_string(),
    };

    format!(
        r#"You are building context about a project to give trustworthy strategic advice.

Project: {project_name}
Goal: {goal}{known_section}

Identify the most valuable unknowns across exactly these five categories: product, market, team, finance, strategy.
Ask 3-5 questions total, the ones whose answers would most change the advice. For each:
- question: the question to ask the user
- why_it_matters: one sentence on why the answer changes the advice
- priority: "high", "medium", or "low"
- category: "product" | "market" | "team" | "finance" | "strategy"

Also assess, honestly, how complete the current knowledge is for advising on this goal,
and summarize what is known in one or two sentences.

Return ONLY a JSON object, no other text:
{{
  "questions": [{{"question": "...", "why_it_matters": "...", "priority": "high|medium|low", "category": "product|market|team|finance|strategy"}}],
  "context_completeness": <number between 0.0 and 1.0>,
  "summary": "<one or two sentences on what is known so far>"
}}"#
    )
}

fn integrate_prompt(
    project_name: &str,
    goal: &str,
    existing_context: Option<&Value>,
    answers: &HashMap<String, String>,
) -> String {
    let existing_section = match existing_context {
        Some(ledger) => pretty(ledger),
        None => "{}".to_string(),
    };
    let answers_json =
        serde_json::to_string_pretty(answers).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You maintain the knowledge base for a project.

Project: {project_name}
Goal: {goal}

Current knowledge (category -> facts):
{existing_section}

The user has answered these questions:
{answers_json}

Merge the answers into the knowledge base:
- Extract facts from the answers; do not copy question/answer text verbatim
- Preserve existing facts unless an answer explicitly contradicts them
- Organize into these categories: product, market, team, finance, strategy

Return ONLY the updated knowledge base as a JSON object, no other text."#
    )
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_calibration_note_only_when_forecast_exists() {
        let with = validate_prompt("We can hit 10M ARR", None, Some(0.42));
        assert!(with.contains("OpenForecaster-8B"));
        assert!(with.contains("42%"));

        let without = validate_prompt("We can hit 10M ARR", None, None);
        assert!(!without.contains("OpenForecaster"));
    }

    #[test]
    fn test_validate_prompt_carries_rubric_and_pushback() {
        let prompt = validate_prompt("h", Some("ctx"), None);
        assert!(prompt.contains("0.85-1.0: Very high confidence (rare)"));
        assert!(prompt.contains("Do NOT be agreeable"));
        assert!(prompt.contains("Additional context: ctx"));
    }

    #[test]
    fn test_wander_prompt_embeds_ledger_verbatim() {
        let ledger = json!({"finance": ["$10k MRR"]});
        let prompt = wander_prompt("enterprise expansion", "10M ARR", Some(&ledger));
        assert!(prompt.contains("$10k MRR"));
        assert!(prompt.contains("Ground your suggestions"));

        let bare = wander_prompt("enterprise expansion", "10M ARR", None);
        assert!(!bare.contains("already known"));
    }

    #[test]
    fn test_discover_prompt_forbids_reasking() {
        let ledger = json!({"finance": ["revenue is $10k MRR"]});
        let prompt = discover_prompt("CC4", "10M ARR", Some(&ledger));
        assert!(prompt.contains("do NOT re-ask"));
        assert!(prompt.contains("revenue is $10k MRR"));
    }

    #[test]
    fn test_integrate_prompt_includes_answers_and_existing_facts() {
        let mut answers = HashMap::new();
        answers.insert("revenue?".to_string(), "$10k MRR".to_string());
        let existing = json!({"team": ["4 engineers"]});
        let prompt = integrate_prompt("CC4", "10M ARR", Some(&existing), &answers);
        assert!(prompt.contains("$10k MRR"));
        assert!(prompt.contains("4 engineers"));
        assert!(prompt.contains("Preserve existing facts"));
    }
}
