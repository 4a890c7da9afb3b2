use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::application::IntelligenceService;
use crate::domain::connection::{Connection, ConnectionId};
use crate::domain::idea::{Idea, IdeaId, IdeaStatus};
use crate::domain::intelligence::IntelligenceError;
use crate::domain::project::{Project, ProjectId};
use crate::domain::repository::{
    ConnectionRepository, IdeaRepository, ProjectRepository, RepositoryError,
};

pub struct AppState {
    pub projects: Arc<dyn ProjectRepository>,
    pub ideas: Arc<dyn IdeaRepository>,
    pub connections: Arc<dyn ConnectionRepository>,
    pub intelligence: Arc<dyn IntelligenceService>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/projects", post(create_project).get(list_projects))
        .route(
            "/api/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/api/ideas", post(create_idea).get(list_ideas))
        .route("/api/ideas/batch", post(create_ideas_batch))
        .route(
            "/api/ideas/{id}",
            get(get_idea).patch(update_idea).delete(delete_idea),
        )
        .route("/api/connections", post(create_connection).get(list_connections))
        .route("/api/connections/{id}", axum::routing::delete(delete_connection))
        .route("/api/wander", post(wander))
        .route("/api/validate", post(validate))
        .route("/api/plan", post(plan))
        .route("/api/discover-context", post(discover_context))
        .route("/api/answer-context", post(answer_context))
        .with_state(state)
}

/// Errors surfaced by the request layer. Not-found conditions on referenced
/// identifiers map to 404, integrity violations to 409, upstream model
/// failures (call or parse) to 502 — a failed operation is always an explicit
/// error body, never an empty result.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Intelligence(#[from] IntelligenceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Repository(RepositoryError::Integrity(_)) => StatusCode::CONFLICT,
            ApiError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Intelligence(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "features": ["openforecaster"],
    }))
}

// --- Projects ---

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub goal: Option<String>,
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let project = Project::new(payload.name, payload.goal);
    state.projects.create(&project).await?;
    Ok(Json(project))
}

async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.projects.list_all().await?))
}

async fn fetch_project(state: &AppState, id: Uuid) -> Result<Project, ApiError> {
    state
        .projects
        .find_by_id(ProjectId(id))
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Project not found: {}", id)).into())
}

async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(fetch_project(&state, id).await?))
}

#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub context: Option<Value>,
    pub context_completeness: Option<f64>,
}

async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let mut project = fetch_project(&state, id).await?;

    if let Some(name) = payload.name {
        project.rename(name);
    }
    if let Some(goal) = payload.goal {
        project.set_goal(goal);
    }
    if let Some(context) = payload.context {
        project.set_context(context);
    }
    if let Some(completeness) = payload.context_completeness {
        project.set_context_completeness(completeness);
    }

    state.projects.update(&project).await?;
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.projects.delete(ProjectId(id)).await?;
    Ok(Json(json!({ "deleted": true })))
}

// --- Ideas ---

#[derive(Deserialize)]
pub struct CreateIdeaRequest {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: IdeaStatus,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
}

impl CreateIdeaRequest {
    fn into_idea(self) -> Idea {
        let mut idea = Idea::new(ProjectId(self.project_id), self.title)
            .with_status(self.status)
            .with_position(self.position_x, self.position_y);
        idea.description = self.description;
        idea.parent_id = self.parent_id.map(IdeaId);
        idea
    }
}

async fn create_idea(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateIdeaRequest>,
) -> Result<Json<Idea>, ApiError> {
    let idea = payload.into_idea();
    state.ideas.create(&idea).await?;
    Ok(Json(idea))
}

/// Create multiple ideas at once (for wander results).
async fn create_ideas_batch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Vec<CreateIdeaRequest>>,
) -> Result<Json<Vec<Idea>>, ApiError> {
    let ideas: Vec<Idea> = payload.into_iter().map(CreateIdeaRequest::into_idea).collect();
    state.ideas.create_batch(&ideas).await?;
    Ok(Json(ideas))
}

#[derive(Deserialize)]
pub struct ProjectScope {
    pub project_id: Uuid,
}

async fn list_ideas(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<ProjectScope>,
) -> Result<Json<Vec<Idea>>, ApiError> {
    Ok(Json(state.ideas.list_by_project(ProjectId(scope.project_id)).await?))
}

async fn get_idea(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Idea>, ApiError> {
    state
        .ideas
        .find_by_id(IdeaId(id))
        .await?
        .map(Json)
        .ok_or_else(|| RepositoryError::NotFound(format!("Idea not found: {}", id)).into())
}

#[derive(Deserialize)]
pub struct UpdateIdeaRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<IdeaStatus>,
    pub confidence: Option<f64>,
    pub calibrated_confidence: Option<f64>,
    pub validation_reasoning: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

async fn update_idea(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIdeaRequest>,
) -> Result<Json<Idea>, ApiError> {
    let mut idea = state
        .ideas
        .find_by_id(IdeaId(id))
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Idea not found: {}", id)))?;

    if let Some(title) = payload.title {
        idea.title = title;
    }
    if let Some(description) = payload.description {
        idea.description = Some(description);
    }
    if let Some(status) = payload.status {
        idea.status = status;
    }
    if let Some(confidence) = payload.confidence {
        idea.confidence = Some(confidence);
    }
    if let Some(calibrated) = payload.calibrated_confidence {
        idea.calibrated_confidence = Some(calibrated);
    }
    if let Some(reasoning) = payload.validation_reasoning {
        idea.validation_reasoning = Some(reasoning);
    }
    if let Some(x) = payload.position_x {
        idea.position_x = x;
    }
    if let Some(y) = payload.position_y {
        idea.position_y = y;
    }
    idea.touch();

    state.ideas.update(&idea).await?;
    Ok(Json(idea))
}

async fn delete_idea(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.ideas.delete(IdeaId(id)).await?;
    Ok(Json(json!({ "deleted": true })))
}

// --- Connections ---

#[derive(Deserialize)]
pub struct CreateConnectionRequest {
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub label: Option<String>,
}

async fn create_connection(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateConnectionRequest>,
) -> Result<Json<Connection>, ApiError> {
    let connection = Connection::new(
        IdeaId(payload.source_id),
        IdeaId(payload.target_id),
        payload.label,
    );
    state.connections.create(&connection).await?;
    Ok(Json(connection))
}

async fn list_connections(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<ProjectScope>,
) -> Result<Json<Vec<Connection>>, ApiError> {
    Ok(Json(
        state
            .connections
            .list_by_project(ProjectId(scope.project_id))
            .await?,
    ))
}

async fn delete_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.connections.delete(ConnectionId(id)).await?;
    Ok(Json(json!({ "deleted": true })))
}

// --- Strategic Intelligence ---

#[derive(Deserialize)]
pub struct WanderRequest {
    pub project_id: Uuid,
    /// What to explore
    pub context: String,
}

async fn wander(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WanderRequest>,
) -> Result<Json<Value>, ApiError> {
    let project = fetch_project(&state, payload.project_id).await?;

    let ideas = state
        .intelligence
        .wander(
            &payload.context,
            project.goal_or_default(),
            project.context.as_ref(),
        )
        .await?;
    Ok(Json(json!({ "ideas": ideas })))
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub hypothesis: String,
    pub context: Option<String>,
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Response, ApiError> {
    let assessment = state
        .intelligence
        .validate(&payload.hypothesis, payload.context.as_deref())
        .await?;
    Ok(Json(assessment).into_response())
}

#[derive(Deserialize)]
pub struct PlanRequest {
    pub project_id: Uuid,
    pub validated_idea: String,
    pub constraints: Option<String>,
}

async fn plan(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlanRequest>,
) -> Result<Json<Value>, ApiError> {
    let project = fetch_project(&state, payload.project_id).await?;

    let actions = state
        .intelligence
        .plan(
            &payload.validated_idea,
            project.goal_or_default(),
            payload.constraints.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "actions": actions })))
}

// --- Context Discovery ---

#[derive(Deserialize)]
pub struct DiscoverContextRequest {
    pub project_id: Uuid,
}

/// Identify gaps in project context and generate questions to fill them.
/// This inverts the usual flow: the system asks the user what it needs to
/// know.
async fn discover_context(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DiscoverContextRequest>,
) -> Result<Response, ApiError> {
    let project = fetch_project(&state, payload.project_id).await?;

    let discovery = state
        .intelligence
        .discover_context(
            &project.name,
            project.goal_or_default(),
            project.context.as_ref(),
        )
        .await?;
    Ok(Json(discovery).into_response())
}

#[derive(Deserialize)]
pub struct AnswerContextRequest {
    pub project_id: Uuid,
    /// question text -> answer text
    pub answers: HashMap<String, String>,
}

/// Integrate the user's answers into the ledger, then re-derive completeness
/// on the merged blob. Completeness is a holistic judgment over the whole
/// ledger, so it is re-assessed, never bumped.
async fn answer_context(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnswerContextRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut project = fetch_project(&state, payload.project_id).await?;
    let goal = project.goal_or_default().to_string();

    let merged = state
        .intelligence
        .integrate_answers(
            &project.name,
            &goal,
            project.context.as_ref(),
            &payload.answers,
        )
        .await?;

    project.set_context(merged.clone());
    state.projects.update(&project).await?;

    let reassessment = state
        .intelligence
        .discover_context(&project.name, &goal, Some(&merged))
        .await?;

    project.set_context_completeness(reassessment.context_completeness);
    state.projects.update(&project).await?;

    Ok(Json(json!({
        "context": merged,
        "context_completeness": project.context_completeness,
        "summary": reassessment.summary,
    })))
}
