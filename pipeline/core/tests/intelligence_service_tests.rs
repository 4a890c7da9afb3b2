// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the intelligence orchestrator, driven by scripted
//! service doubles injected through the domain traits:
//! - fusion reports both confidence scores side by side and degrades to
//!   "no calibrated estimate" when forecasting is absent or failing
//! - fenced model output is tolerated, malformed output is an explicit
//!   error (never an empty default result)
//! - the discover -> integrate -> re-discover cycle threads the merged
//!   ledger back into the next prompt

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crucible_core::application::{IntelligenceService, StandardIntelligenceService};
use crucible_core::domain::forecast::{ForecastError, Forecaster};
use crucible_core::domain::intelligence::{EffortLevel, IntelligenceError};
use crucible_core::domain::llm::{
    FinishReason, GenerationOptions, GenerationResponse, LLMError, ReasoningProvider,
};

/// Reasoning double that replays scripted responses and records every prompt.
struct ScriptedReasoner {
    responses: Mutex<VecDeque<Result<String, LLMError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedReasoner {
    fn replying(responses: impl IntoIterator<Item = &'static str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses.into_iter().map(|r| Ok(r.to_string())).collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: LLMError) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ReasoningProvider for ScriptedReasoner {
    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted reasoner ran out of responses");
        next.map(|text| GenerationResponse {
            text,
            tokens_used: 64,
            finish_reason: FinishReason::Stop,
        })
    }
}

/// Forecaster double with a fixed outcome.
struct StaticForecaster(Result<Option<f64>, ()>);

impl StaticForecaster {
    fn estimating(p: f64) -> Arc<Self> {
        Arc::new(Self(Ok(Some(p))))
    }

    fn unavailable() -> Arc<Self> {
        Arc::new(Self(Ok(None)))
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self(Err(())))
    }
}

#[async_trait]
impl Forecaster for StaticForecaster {
    async fn calibrated_probability(
        &self,
        _hypothesis: &str,
        _background: Option<&str>,
    ) -> Result<Option<f64>, ForecastError> {
        match &self.0 {
            Ok(p) => Ok(*p),
            Err(()) => Err(ForecastError::Network("connection refused".to_string())),
        }
    }
}

fn service(
    reasoner: &Arc<ScriptedReasoner>,
    forecaster: Arc<StaticForecaster>,
) -> StandardIntelligenceService {
    StandardIntelligenceService::new(reasoner.clone(), forecaster)
}

const VERDICT: &str = r#"{
    "confidence": 0.7,
    "reasoning": "Strong demand signals, unproven pricing.",
    "risks": ["incumbents react", "pricing may not hold"],
    "next_steps": ["run 10 pricing interviews"]
}"#;

#[tokio::test]
async fn test_validate_reports_both_scores_side_by_side() {
    let reasoner = ScriptedReasoner::replying([VERDICT]);
    let svc = service(&reasoner, StaticForecaster::estimating(0.42));

    let assessment = svc
        .validate("Enterprises will pay for this", None)
        .await
        .unwrap();

    assert_eq!(assessment.confidence, 0.7);
    assert_eq!(assessment.calibrated_confidence, Some(0.42));
    assert!((0.0..=1.0).contains(&assessment.confidence));
    assert_eq!(assessment.risks.len(), 2);

    // The calibrated estimate reaches the reasoning prompt as an advisory
    // note naming its source, and the rubric + pushback are always present.
    let prompt = reasoner.prompt(0);
    assert!(prompt.contains("42%"));
    assert!(prompt.contains("OpenForecaster-8B"));
    assert!(prompt.contains("Do NOT be agreeable"));
    assert!(prompt.contains("0.85-1.0"));
}

#[tokio::test]
async fn test_validate_without_forecaster_leaves_calibration_absent() {
    let reasoner = ScriptedReasoner::replying([VERDICT]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let assessment = svc.validate("hypothesis", None).await.unwrap();

    // Unavailable must stay absent, never a default number.
    assert_eq!(assessment.calibrated_confidence, None);
    assert!(!reasoner.prompt(0).contains("OpenForecaster"));
}

#[tokio::test]
async fn test_forecaster_failure_never_aborts_validation() {
    let reasoner = ScriptedReasoner::replying([VERDICT]);
    let svc = service(&reasoner, StaticForecaster::failing());

    let assessment = svc.validate("hypothesis", Some("background")).await.unwrap();
    assert_eq!(assessment.calibrated_confidence, None);
    assert_eq!(assessment.confidence, 0.7);
}

#[tokio::test]
async fn test_validate_tolerates_code_fences_and_clamps() {
    let fenced = "```json\n{\"confidence\": 1.4, \"reasoning\": \"r\", \"risks\": [], \"next_steps\": []}\n```";
    let reasoner = ScriptedReasoner::replying([fenced]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let assessment = svc.validate("hypothesis", None).await.unwrap();
    assert_eq!(assessment.confidence, 1.0);
}

#[tokio::test]
async fn test_validate_malformed_output_is_parse_error_not_default() {
    let reasoner = ScriptedReasoner::replying(["I think this idea is quite good overall!"]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let err = svc.validate("hypothesis", None).await.unwrap_err();
    match err {
        IntelligenceError::Parse { operation, .. } => assert_eq!(operation, "validate"),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reasoning_failure_propagates_as_generation_error() {
    let reasoner = ScriptedReasoner::failing(LLMError::RateLimit);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let err = svc.validate("hypothesis", None).await.unwrap_err();
    assert!(matches!(err, IntelligenceError::Generation(LLMError::RateLimit)));
}

#[tokio::test]
async fn test_wander_returns_grounded_directions() {
    let ideas = r#"[
        {"title": "Design partner program", "description": "Recruit three lighthouse enterprise customers.", "why_relevant": "Anchors the 10M ARR path in real accounts"},
        {"title": "Usage-based pricing", "description": "Price on seats plus volume.", "why_relevant": "Expands contract value without new sales motion"},
        {"title": "Compliance wedge", "description": "Lead with SOC2-ready workflows.", "why_relevant": "Removes the main enterprise blocker"}
    ]"#;
    let reasoner = ScriptedReasoner::replying([ideas]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let result = svc
        .wander("expand into enterprise", "10M ARR", None)
        .await
        .unwrap();

    assert!((3..=5).contains(&result.len()));
    for idea in &result {
        assert!(!idea.title.is_empty());
        assert!(!idea.description.is_empty());
        assert!(!idea.why_relevant.is_empty());
    }
}

#[tokio::test]
async fn test_wander_grounds_prompt_in_ledger() {
    let reasoner = ScriptedReasoner::replying([r#"[{"title": "t", "description": "d", "why_relevant": "w"}]"#]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let ledger = json!({"finance": ["$10k MRR"], "team": ["2 engineers"]});
    svc.wander("growth", "10M ARR", Some(&ledger)).await.unwrap();

    let prompt = reasoner.prompt(0);
    assert!(prompt.contains("$10k MRR"));
    assert!(prompt.contains("2 engineers"));
}

#[tokio::test]
async fn test_plan_actions_reference_each_other_by_text() {
    let actions = r#"[
        {"action": "Ship a pricing calculator landing page", "why": "Captures intent", "effort": "low", "dependencies": []},
        {"action": "Drive 100 visitors from the newsletter", "why": "Tests demand", "effort": "low", "dependencies": ["Ship a pricing calculator landing page"]},
        {"action": "Interview the 10 highest-intent visitors", "why": "Validates willingness to pay", "effort": "medium", "dependencies": ["Drive 100 visitors from the newsletter"]}
    ]"#;
    let reasoner = ScriptedReasoner::replying([actions]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let plan = svc
        .plan("Build a pricing calculator", "10M ARR", Some("2 engineers"))
        .await
        .unwrap();

    assert!((3..=7).contains(&plan.len()));
    assert_eq!(plan[0].effort, EffortLevel::Low);
    assert!(plan[0].dependencies.is_empty());

    let titles: Vec<&str> = plan.iter().map(|a| a.action.as_str()).collect();
    for action in &plan {
        for dep in &action.dependencies {
            assert!(titles.contains(&dep.as_str()), "dangling dependency: {}", dep);
        }
    }

    assert!(reasoner.prompt(0).contains("Constraints: 2 engineers"));
}

#[tokio::test]
async fn test_plan_malformed_output_is_an_error_not_an_empty_plan() {
    let reasoner = ScriptedReasoner::replying(["Here are some steps you could take..."]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let err = svc.plan("idea", "goal", None).await.unwrap_err();
    assert!(matches!(err, IntelligenceError::Parse { operation: "plan", .. }));
}

const DISCOVERY_EMPTY_LEDGER: &str = r#"{
    "questions": [
        {"question": "What is the current MRR?", "why_it_matters": "Revenue anchors the plan", "priority": "high", "category": "finance"},
        {"question": "Who is the buyer persona?", "why_it_matters": "Shapes positioning", "priority": "high", "category": "market"},
        {"question": "How large is the team?", "why_it_matters": "Bounds execution speed", "priority": "medium", "category": "team"}
    ],
    "context_completeness": 0.2,
    "summary": "Almost nothing is known about this project yet."
}"#;

const DISCOVERY_AFTER_ANSWER: &str = r#"{
    "questions": [
        {"question": "Who is the buyer persona?", "why_it_matters": "Shapes positioning", "priority": "high", "category": "market"},
        {"question": "What is the runway?", "why_it_matters": "Bounds risk appetite", "priority": "medium", "category": "finance"}
    ],
    "context_completeness": 0.45,
    "summary": "Revenue is $10k MRR; market and team details still missing."
}"#;

#[tokio::test]
async fn test_discover_context_parses_questions_and_completeness() {
    let reasoner = ScriptedReasoner::replying([DISCOVERY_EMPTY_LEDGER]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let discovery = svc.discover_context("CC4", "10M ARR", None).await.unwrap();

    assert!((3..=5).contains(&discovery.questions.len()));
    assert!((0.0..=1.0).contains(&discovery.context_completeness));
    assert!(!discovery.summary.is_empty());
}

#[tokio::test]
async fn test_answer_integration_cycle_rederives_completeness() {
    // integrate_answers, then discover_context on the merged ledger.
    let merged = r#"{"finance": ["Revenue is $10k MRR"], "product": [], "market": [], "team": [], "strategy": []}"#;
    let reasoner = ScriptedReasoner::replying([merged, DISCOVERY_AFTER_ANSWER]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let mut answers = HashMap::new();
    answers.insert("What is the current MRR?".to_string(), "$10k MRR".to_string());

    let ledger = svc
        .integrate_answers("CC4", "10M ARR", None, &answers)
        .await
        .unwrap();
    assert!(ledger.is_object());
    assert!(ledger["finance"][0].as_str().unwrap().contains("$10k MRR"));

    let reassessment = svc
        .discover_context("CC4", "10M ARR", Some(&ledger))
        .await
        .unwrap();

    // The merged fact reaches the next discovery prompt with the no-re-ask
    // instruction, and the answered question is gone from the output.
    let discover_prompt = reasoner.prompt(1);
    assert!(discover_prompt.contains("$10k MRR"));
    assert!(discover_prompt.contains("do NOT re-ask"));
    assert!(reassessment
        .questions
        .iter()
        .all(|q| !q.question.contains("MRR")));

    // Re-derived completeness did not regress on a strictly larger ledger.
    assert!(reassessment.context_completeness >= 0.2);
}

#[tokio::test]
async fn test_integrate_answers_rejects_non_object_ledger() {
    let reasoner = ScriptedReasoner::replying(["[1, 2, 3]"]);
    let svc = service(&reasoner, StaticForecaster::unavailable());

    let err = svc
        .integrate_answers("CC4", "goal", None, &HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IntelligenceError::Parse { operation: "integrate_answers", .. }
    ));
}
