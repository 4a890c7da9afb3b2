// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Idea aggregate: a unit of strategic content that crystallizes through
//! stages (resonance -> idea -> hypothesis -> task) and carries the dual
//! confidence scores produced by validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::project::ProjectId;
use crate::domain::validation::ValidationAssessment;

/// Idea identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdeaId(pub Uuid);

impl IdeaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IdeaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdeaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle stage of an idea. The ordering expresses the intended
/// progression; it is deliberately not enforced, so callers may set any
/// stage directly (e.g. dragging a card backwards on the canvas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    Resonance,
    Idea,
    Hypothesis,
    Task,
}

impl IdeaStatus {
    /// Next stage of the progression. `Task` is terminal.
    pub fn next(self) -> Self {
        match self {
            IdeaStatus::Resonance => IdeaStatus::Idea,
            IdeaStatus::Idea => IdeaStatus::Hypothesis,
            IdeaStatus::Hypothesis => IdeaStatus::Task,
            IdeaStatus::Task => IdeaStatus::Task,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IdeaStatus::Resonance => "resonance",
            IdeaStatus::Idea => "idea",
            IdeaStatus::Hypothesis => "hypothesis",
            IdeaStatus::Task => "task",
        }
    }
}

impl Default for IdeaStatus {
    fn default() -> Self {
        IdeaStatus::Resonance
    }
}

impl std::fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdeaStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resonance" => Ok(IdeaStatus::Resonance),
            "idea" => Ok(IdeaStatus::Idea),
            "hypothesis" => Ok(IdeaStatus::Hypothesis),
            "task" => Ok(IdeaStatus::Task),
            other => Err(format!("unknown idea status: {}", other)),
        }
    }
}

/// An idea on a project's canvas.
///
/// `confidence` is the reasoning service's own assessment;
/// `calibrated_confidence` comes from the forecasting model. Both are genuine
/// optionals: absence means "not validated" / "no calibrated estimate", which
/// must stay distinguishable from "estimated near zero".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    pub id: IdeaId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub status: IdeaStatus,
    pub confidence: Option<f64>,
    pub calibrated_confidence: Option<f64>,
    pub validation_reasoning: Option<String>,
    /// Crystallization lineage: the vaguer idea this one was refined from.
    /// Children are discovered by reverse lookup, not stored pointers.
    pub parent_id: Option<IdeaId>,
    pub position_x: f64,
    pub position_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: IdeaId::new(),
            project_id,
            title: title.into(),
            description: None,
            status: IdeaStatus::Resonance,
            confidence: None,
            calibrated_confidence: None,
            validation_reasoning: None,
            parent_id: None,
            position_x: 0.0,
            position_y: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: IdeaStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_parent(mut self, parent_id: IdeaId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position_x = x;
        self.position_y = y;
        self
    }

    /// Refine this idea into a more concrete child: same project, lineage
    /// back-reference, one stage further along the progression.
    pub fn crystallize(&self, title: impl Into<String>) -> Idea {
        Idea::new(self.project_id, title)
            .with_parent(self.id)
            .with_status(self.status.next())
    }

    /// Copy a validation result onto the idea. The two scores are stored side
    /// by side, exactly as reported.
    pub fn record_validation(&mut self, assessment: &ValidationAssessment) {
        self.confidence = Some(assessment.confidence);
        self.calibrated_confidence = assessment.calibrated_confidence;
        self.validation_reasoning = Some(assessment.reasoning.clone());
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
