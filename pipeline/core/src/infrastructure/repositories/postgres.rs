// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Graph Store
//!
//! Production repository implementations backed by the `projects`, `ideas`,
//! and `connections` tables via `sqlx`. Cascade semantics live in the schema
//! (`ON DELETE CASCADE` on idea and connection foreign keys, `SET NULL` on
//! the lineage back-reference), so a project delete leaves zero residual
//! rows without application-side sweeps.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::connection::{Connection, ConnectionId};
use crate::domain::idea::{Idea, IdeaId, IdeaStatus};
use crate::domain::project::{Project, ProjectId};
use crate::domain::repository::{
    ConnectionRepository, IdeaRepository, ProjectRepository, RepositoryError,
};

/// Create the graph tables when they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            goal TEXT,
            context JSONB,
            context_completeness DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ideas (
            id UUID PRIMARY KEY,
            project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL,
            confidence DOUBLE PRECISION,
            calibrated_confidence DOUBLE PRECISION,
            validation_reasoning TEXT,
            parent_id UUID REFERENCES ideas(id) ON DELETE SET NULL,
            position_x DOUBLE PRECISION NOT NULL DEFAULT 0,
            position_y DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS connections (
            id UUID PRIMARY KEY,
            source_id UUID NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
            target_id UUID NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
            label TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn project_from_row(row: &PgRow) -> Result<Project, RepositoryError> {
    Ok(Project {
        id: ProjectId(row.get("id")),
        name: row.get("name"),
        goal: row.get("goal"),
        context: row.get("context"),
        context_completeness: row.get("context_completeness"),
        created_at: row.get("created_at"),
    })
}

fn idea_from_row(row: &PgRow) -> Result<Idea, RepositoryError> {
    let status_str: String = row.get("status");
    let status: IdeaStatus = status_str
        .parse()
        .map_err(RepositoryError::Serialization)?;

    Ok(Idea {
        id: IdeaId(row.get("id")),
        project_id: ProjectId(row.get("project_id")),
        title: row.get("title"),
        description: row.get("description"),
        status,
        confidence: row.get("confidence"),
        calibrated_confidence: row.get("calibrated_confidence"),
        validation_reasoning: row.get("validation_reasoning"),
        parent_id: row.get::<Option<uuid::Uuid>, _>("parent_id").map(IdeaId),
        position_x: row.get("position_x"),
        position_y: row.get("position_y"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn connection_from_row(row: &PgRow) -> Connection {
    Connection {
        id: ConnectionId(row.get("id")),
        source_id: IdeaId(row.get("source_id")),
        target_id: IdeaId(row.get("target_id")),
        label: row.get("label"),
        created_at: row.get("created_at"),
    }
}

pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn create(&self, project: &Project) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, goal, context, context_completeness, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(&project.goal)
        .bind(&project.context)
        .bind(project.context_completeness)
        .bind(project.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to create project: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM projects ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(project_from_row).collect()
    }

    async fn update(&self, project: &Project) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET name = $2, goal = $3, context = $4, context_completeness = $5
            WHERE id = $1
            "#,
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(&project.goal)
        .bind(&project.context)
        .bind(project.context_completeness)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Project not found: {}",
                project.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Project not found: {}", id)));
        }
        Ok(())
    }
}

pub struct PostgresIdeaRepository {
    pool: PgPool,
}

impl PostgresIdeaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Referential checks the schema alone cannot express: the owning
    /// project must exist and a parent must live in the same project.
    async fn check_idea(
        idea: &Idea,
        conn: &mut sqlx::PgConnection,
    ) -> Result<(), RepositoryError> {
        let project_exists: Option<PgRow> =
            sqlx::query("SELECT 1 AS one FROM projects WHERE id = $1")
                .bind(idea.project_id.0)
                .fetch_optional(&mut *conn)
                .await?;
        if project_exists.is_none() {
            return Err(RepositoryError::NotFound(format!(
                "Project not found: {}",
                idea.project_id
            )));
        }

        if let Some(parent_id) = idea.parent_id {
            let parent = sqlx::query("SELECT project_id FROM ideas WHERE id = $1")
                .bind(parent_id.0)
                .fetch_optional(&mut *conn)
                .await?;
            match parent {
                None => {
                    return Err(RepositoryError::NotFound(format!(
                        "Parent idea not found: {}",
                        parent_id
                    )))
                }
                Some(row) => {
                    let parent_project: uuid::Uuid = row.get("project_id");
                    if parent_project != idea.project_id.0 {
                        return Err(RepositoryError::Integrity(format!(
                            "Parent idea {} belongs to another project",
                            parent_id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    async fn insert_idea(
        idea: &Idea,
        conn: &mut sqlx::PgConnection,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO ideas (
                id, project_id, title, description, status,
                confidence, calibrated_confidence, validation_reasoning,
                parent_id, position_x, position_y, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(idea.id.0)
        .bind(idea.project_id.0)
        .bind(&idea.title)
        .bind(&idea.description)
        .bind(idea.status.as_str())
        .bind(idea.confidence)
        .bind(idea.calibrated_confidence)
        .bind(&idea.validation_reasoning)
        .bind(idea.parent_id.map(|p| p.0))
        .bind(idea.position_x)
        .bind(idea.position_y)
        .bind(idea.created_at)
        .bind(idea.updated_at)
        .execute(conn)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to create idea: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl IdeaRepository for PostgresIdeaRepository {
    async fn create(&self, idea: &Idea) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        Self::check_idea(idea, &mut *tx).await?;
        Self::insert_idea(idea, &mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn create_batch(&self, ideas: &[Idea]) -> Result<(), RepositoryError> {
        // One transaction: a bad member rolls the whole batch back.
        let mut tx = self.pool.begin().await?;
        for idea in ideas {
            Self::check_idea(idea, &mut *tx).await?;
        }
        for idea in ideas {
            Self::insert_idea(idea, &mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: IdeaId) -> Result<Option<Idea>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM ideas WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(idea_from_row).transpose()
    }

    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Idea>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM ideas WHERE project_id = $1 ORDER BY created_at DESC")
                .bind(project_id.0)
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(idea_from_row).collect()
    }

    async fn update(&self, idea: &Idea) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE ideas
            SET title = $2, description = $3, status = $4,
                confidence = $5, calibrated_confidence = $6, validation_reasoning = $7,
                position_x = $8, position_y = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(idea.id.0)
        .bind(&idea.title)
        .bind(&idea.description)
        .bind(idea.status.as_str())
        .bind(idea.confidence)
        .bind(idea.calibrated_confidence)
        .bind(&idea.validation_reasoning)
        .bind(idea.position_x)
        .bind(idea.position_y)
        .bind(idea.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Idea not found: {}", idea.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: IdeaId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ideas WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Idea not found: {}", id)));
        }
        Ok(())
    }
}

pub struct PostgresConnectionRepository {
    pool: PgPool,
}

impl PostgresConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRepository for PostgresConnectionRepository {
    async fn create(&self, connection: &Connection) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let source = sqlx::query("SELECT project_id FROM ideas WHERE id = $1")
            .bind(connection.source_id.0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                RepositoryError::NotFound(format!(
                    "Source idea not found: {}",
                    connection.source_id
                ))
            })?;
        let target = sqlx::query("SELECT project_id FROM ideas WHERE id = $1")
            .bind(connection.target_id.0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                RepositoryError::NotFound(format!(
                    "Target idea not found: {}",
                    connection.target_id
                ))
            })?;

        let source_project: uuid::Uuid = source.get("project_id");
        let target_project: uuid::Uuid = target.get("project_id");
        if source_project != target_project {
            return Err(RepositoryError::Integrity(
                "Connection endpoints belong to different projects".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO connections (id, source_id, target_id, label, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(connection.id.0)
        .bind(connection.source_id.0)
        .bind(connection.target_id.0)
        .bind(&connection.label)
        .bind(connection.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to create connection: {}", e)))?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: ConnectionId) -> Result<Option<Connection>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM connections WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(connection_from_row))
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Connection>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT c.* FROM connections c
            JOIN ideas s ON s.id = c.source_id
            JOIN ideas t ON t.id = c.target_id
            WHERE s.project_id = $1 OR t.project_id = $1
            "#,
        )
        .bind(project_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(connection_from_row).collect())
    }

    async fn delete(&self, id: ConnectionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM connections WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Connection not found: {}",
                id
            )));
        }
        Ok(())
    }
}
