// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Project aggregate: a goal plus the context ledger accumulated toward it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Project identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A project with a goal (e.g. "100M ARR by 2027") and the structured
/// knowledge the discovery loop has gathered about it so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub goal: Option<String>,
    /// Context ledger blob: category -> facts mapping produced by the
    /// discovery/answer cycle. Opaque to the graph store.
    pub context: Option<Value>,
    /// Self-assessed completeness of the ledger, in [0.0, 1.0].
    pub context_completeness: f64,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, goal: Option<String>) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            goal,
            context: None,
            context_completeness: 0.0,
            created_at: Utc::now(),
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) {
        self.goal = Some(goal.into());
    }

    /// Replace the whole ledger blob. The ledger is swapped atomically, never
    /// patched in place, so readers observe either the old or the new blob.
    pub fn set_context(&mut self, context: Value) {
        self.context = Some(context);
    }

    pub fn set_context_completeness(&mut self, completeness: f64) {
        self.context_completeness = completeness.clamp(0.0, 1.0);
    }

    /// Goal statement used when building prompts. Projects created without a
    /// goal still get a neutral framing rather than an empty string.
    pub fn goal_or_default(&self) -> &str {
        self.goal.as_deref().unwrap_or("achieving strategic objectives")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_project_has_empty_ledger() {
        let project = Project::new("CC4", Some("100M ARR by 2027".to_string()));
        assert!(project.context.is_none());
        assert_eq!(project.context_completeness, 0.0);
    }

    #[test]
    fn test_completeness_is_clamped() {
        let mut project = Project::new("p", None);
        project.set_context_completeness(1.7);
        assert_eq!(project.context_completeness, 1.0);
        project.set_context_completeness(-0.2);
        assert_eq!(project.context_completeness, 0.0);
    }

    #[test]
    fn test_context_swap_replaces_blob() {
        let mut project = Project::new("p", None);
        project.set_context(json!({"finance": ["$10k MRR"]}));
        project.set_context(json!({"market": ["B2B SaaS"]}));
        assert_eq!(project.context, Some(json!({"market": ["B2B SaaS"]})));
    }

    #[test]
    fn test_goal_fallback() {
        let project = Project::new("p", None);
        assert_eq!(project.goal_or_default(), "achieving strategic objectives");
    }
}
