// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Graph Store Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! the domain layer, following the Repository pattern from DDD.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve the idea graph
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **InMemoryGraphStore** - one shared state map under a single async
//!   RwLock, so cascade deletes, referential checks, and batch inserts are
//!   atomic; used for development and testing
//! - **Postgres repositories** (`postgres` module) - production persistence
//!   where the same invariants are carried by `ON DELETE CASCADE` foreign
//!   keys and transactions

pub mod postgres;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::connection::{Connection, ConnectionId};
use crate::domain::idea::{Idea, IdeaId};
use crate::domain::project::{Project, ProjectId};
use crate::domain::repository::{
    ConnectionRepository, IdeaRepository, ProjectRepository, RepositoryError,
};

#[derive(Default)]
struct GraphState {
    projects: HashMap<ProjectId, Project>,
    ideas: HashMap<IdeaId, Idea>,
    connections: HashMap<ConnectionId, Connection>,
}

impl GraphState {
    /// Validate the invariants for inserting one idea. Does not mutate.
    fn check_idea(&self, idea: &Idea) -> Result<(), RepositoryError> {
        if !self.projects.contains_key(&idea.project_id) {
            return Err(RepositoryError::NotFound(format!(
                "Project not found: {}",
                idea.project_id
            )));
        }
        if let Some(parent_id) = idea.parent_id {
            let parent = self.ideas.get(&parent_id).ok_or_else(|| {
                RepositoryError::NotFound(format!("Parent idea not found: {}", parent_id))
            })?;
            if parent.project_id != idea.project_id {
                return Err(RepositoryError::Integrity(format!(
                    "Parent idea {} belongs to another project",
                    parent_id
                )));
            }
        }
        Ok(())
    }

    /// Remove an idea and everything whose lifetime is bounded by it.
    fn remove_idea(&mut self, id: IdeaId) {
        self.ideas.remove(&id);
        self.connections.retain(|_, c| !c.touches(id));
        // Children survive their parent; only the lineage back-reference is
        // cleared.
        for idea in self.ideas.values_mut() {
            if idea.parent_id == Some(id) {
                idea.parent_id = None;
            }
        }
    }
}

/// In-memory graph store implementing all three repository contracts over a
/// single shared state, so cross-entity operations never observe torn state.
#[derive(Clone, Default)]
pub struct InMemoryGraphStore {
    state: Arc<RwLock<GraphState>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryGraphStore {
    async fn create(&self, project: &Project) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.projects.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Project>, RepositoryError> {
        let state = self.state.read().await;
        let mut projects: Vec<_> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn update(&self, project: &Project) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.projects.contains_key(&project.id) {
            return Err(RepositoryError::NotFound(format!(
                "Project not found: {}",
                project.id
            )));
        }
        state.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.projects.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(format!("Project not found: {}", id)));
        }

        let orphaned: Vec<IdeaId> = state
            .ideas
            .values()
            .filter(|i| i.project_id == id)
            .map(|i| i.id)
            .collect();
        for idea_id in orphaned {
            state.remove_idea(idea_id);
        }
        Ok(())
    }
}

#[async_trait]
impl IdeaRepository for InMemoryGraphStore {
    async fn create(&self, idea: &Idea) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.check_idea(idea)?;
        state.ideas.insert(idea.id, idea.clone());
        Ok(())
    }

    async fn create_batch(&self, ideas: &[Idea]) -> Result<(), RepositoryError> {
        // Validate every member before writing any, under one guard: a bad
        // member yields an error and zero rows.
        let mut state = self.state.write().await;
        for idea in ideas {
            state.check_idea(idea)?;
        }
        for idea in ideas {
            state.ideas.insert(idea.id, idea.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: IdeaId) -> Result<Option<Idea>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.ideas.get(&id).cloned())
    }

    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Idea>, RepositoryError> {
        let state = self.state.read().await;
        let mut ideas: Vec<_> = state
            .ideas
            .values()
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect();
        ideas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ideas)
    }

    async fn update(&self, idea: &Idea) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.ideas.contains_key(&idea.id) {
            return Err(RepositoryError::NotFound(format!("Idea not found: {}", idea.id)));
        }
        state.ideas.insert(idea.id, idea.clone());
        Ok(())
    }

    async fn delete(&self, id: IdeaId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.ideas.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!("Idea not found: {}", id)));
        }
        state.remove_idea(id);
        Ok(())
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryGraphStore {
    async fn create(&self, connection: &Connection) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;

        let source = state.ideas.get(&connection.source_id).ok_or_else(|| {
            RepositoryError::NotFound(format!("Source idea not found: {}", connection.source_id))
        })?;
        let target = state.ideas.get(&connection.target_id).ok_or_else(|| {
            RepositoryError::NotFound(format!("Target idea not found: {}", connection.target_id))
        })?;
        if source.project_id != target.project_id {
            return Err(RepositoryError::Integrity(
                "Connection endpoints belong to different projects".to_string(),
            ));
        }

        state.connections.insert(connection.id, connection.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ConnectionId) -> Result<Option<Connection>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.connections.get(&id).cloned())
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Connection>, RepositoryError> {
        let state = self.state.read().await;
        let member_ids: HashSet<IdeaId> = state
            .ideas
            .values()
            .filter(|i| i.project_id == project_id)
            .map(|i| i.id)
            .collect();

        Ok(state
            .connections
            .values()
            .filter(|c| member_ids.contains(&c.source_id) || member_ids.contains(&c.target_id))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ConnectionId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.connections.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(format!(
                "Connection not found: {}",
                id
            )));
        }
        Ok(())
    }
}
