// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Directed edges between ideas on the canvas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::idea::IdeaId;

/// Connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A directed `source -> target` edge between two ideas, with an optional
/// label. Duplicate edges and cycles are legal; the edge does not own its
/// endpoints but dies with either of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub source_id: IdeaId,
    pub target_id: IdeaId,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(source_id: IdeaId, target_id: IdeaId, label: Option<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            source_id,
            target_id,
            label,
            created_at: Utc::now(),
        }
    }

    /// Whether this edge touches the given idea (as source or target).
    pub fn touches(&self, idea_id: IdeaId) -> bool {
        self.source_id == idea_id || self.target_id == idea_id
    }
}
