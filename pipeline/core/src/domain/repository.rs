// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate of the idea graph, following the
//! DDD Repository pattern: one repository per aggregate, interface defined in
//! the domain layer, implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `ProjectRepository` | `Project` | `InMemoryProjectRepository`, `PostgresProjectRepository` |
//! | `IdeaRepository` | `Idea` | `InMemoryIdeaRepository`, `PostgresIdeaRepository` |
//! | `ConnectionRepository` | `Connection` | `InMemoryConnectionRepository`, `PostgresConnectionRepository` |
//!
//! ## Referential invariants
//!
//! The store, not its callers, is responsible for:
//! - an Idea's project must exist (`NotFound` otherwise);
//! - an Idea's parent, if set, must be an idea of the same project
//!   (`Integrity` otherwise);
//! - a Connection's endpoints must exist (`NotFound`) and belong to the same
//!   project (`Integrity`);
//! - deleting a Project cascades to its Ideas; deleting an Idea cascades to
//!   every Connection touching it. No residual rows survive a cascade.

use async_trait::async_trait;

use crate::domain::connection::{Connection, ConnectionId};
use crate::domain::idea::{Idea, IdeaId};
use crate::domain::project::{Project, ProjectId};

/// Repository interface for Project aggregates
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persist a new project
    async fn create(&self, project: &Project) -> Result<(), RepositoryError>;

    /// Find project by ID
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError>;

    /// List all projects, newest first
    async fn list_all(&self) -> Result<Vec<Project>, RepositoryError>;

    /// Update an existing project (NotFound if it does not exist)
    async fn update(&self, project: &Project) -> Result<(), RepositoryError>;

    /// Delete a project and cascade to its ideas and their connections
    async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError>;
}

/// Repository interface for Idea aggregates
#[async_trait]
pub trait IdeaRepository: Send + Sync {
    /// Persist a new idea (NotFound if its project does not exist; Integrity
    /// if its parent belongs to another project)
    async fn create(&self, idea: &Idea) -> Result<(), RepositoryError>;

    /// Persist a batch of ideas in order. The batch is all-or-nothing: every
    /// member is validated before any row is written, and members are not
    /// cross-validated against each other beyond that.
    async fn create_batch(&self, ideas: &[Idea]) -> Result<(), RepositoryError>;

    /// Find idea by ID
    async fn find_by_id(&self, id: IdeaId) -> Result<Option<Idea>, RepositoryError>;

    /// List ideas belonging to a project, newest first. Never includes
    /// another project's ideas.
    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Idea>, RepositoryError>;

    /// Update an existing idea (NotFound if it does not exist)
    async fn update(&self, idea: &Idea) -> Result<(), RepositoryError>;

    /// Delete an idea and cascade to connections touching it
    async fn delete(&self, id: IdeaId) -> Result<(), RepositoryError>;
}

/// Repository interface for Connection entities
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Persist a new connection (NotFound if either endpoint idea is missing;
    /// Integrity if the endpoints belong to different projects). On failure
    /// no row is written.
    async fn create(&self, connection: &Connection) -> Result<(), RepositoryError>;

    /// Find connection by ID
    async fn find_by_id(&self, id: ConnectionId) -> Result<Option<Connection>, RepositoryError>;

    /// List every connection with at least one endpoint in the project
    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Connection>, RepositoryError>;

    /// Delete a connection by ID
    async fn delete(&self, id: ConnectionId) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Referential integrity violation: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
