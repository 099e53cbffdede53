//! Character project handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use reelgen_models::{CharacterProject, CreateProjectRequest, ProjectId, SceneRecord};
use reelgen_synthesis::VariantProfile;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::security::{is_valid_project_id, sanitize_string};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<CharacterProject>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct CreateProjectResponse {
    pub project_id: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ProjectScenesResponse {
    pub project: CharacterProject,
    pub scenes: Vec<SceneRecord>,
    pub total_scenes: usize,
}

#[derive(Serialize)]
pub struct UpsertSceneResponse {
    pub project_id: String,
    pub scene_number: u32,
    pub message: String,
}

#[derive(Serialize)]
pub struct DeleteProjectResponse {
    pub project_id: String,
    pub message: String,
}

fn parse_project_id(raw: &str) -> ApiResult<ProjectId> {
    if is_valid_project_id(raw) {
        Ok(ProjectId::from(raw))
    } else {
        Err(ApiError::bad_request("Invalid project id"))
    }
}

/// List the caller's projects, most recently updated first.
pub async fn list_projects(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProjectListResponse>> {
    let projects = state.projects(&user)?.list().await?;
    Ok(Json(ProjectListResponse {
        total: projects.len(),
        projects,
    }))
}

/// Create an empty project from its metadata.
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut request): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<CreateProjectResponse>)> {
    request.scenario = request.scenario.as_deref().map(sanitize_string);
    request.visual_style = request.visual_style.filter(|s| !s.trim().is_empty());
    request.validate().map_err(ApiError::Validation)?;

    let repo = state.projects(&user)?;
    let default_style = VariantProfile::for_kind(request.content_type).default_visual_style;
    let project = request.into_project(user.uid.clone(), default_style);
    repo.create(&project).await?;

    info!(user_id = %user.uid, project_id = %project.project_id, "Project created");
    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            project_id: project.project_id.to_string(),
            message: format!("Project '{}' created", project.project_name),
        }),
    ))
}

/// A project with its scenes in order. 404 unless it belongs to the caller.
pub async fn get_project_scenes(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectScenesResponse>> {
    let project_id = parse_project_id(&project_id)?;
    let repo = state.projects(&user)?;

    let project = repo
        .get(&project_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Project {} not found", project_id)))?;
    let scenes = repo.scenes(&project_id).list().await?;

    Ok(Json(ProjectScenesResponse {
        total_scenes: scenes.len(),
        project,
        scenes,
    }))
}

/// Write one scene of a project, replacing the stored scene with that number.
///
/// The path number wins over any `scene_number` in the body.
pub async fn upsert_project_scene(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, scene_number)): Path<(String, u32)>,
    Json(mut scene): Json<SceneRecord>,
) -> ApiResult<Json<UpsertSceneResponse>> {
    let project_id = parse_project_id(&project_id)?;
    if scene_number == 0 {
        return Err(ApiError::Validation("Scene numbers start at 1".into()));
    }
    scene.scene_number = scene_number;
    scene.dialogue = sanitize_string(&scene.dialogue).trim().to_string();
    scene.visual_description = sanitize_string(&scene.visual_description);
    scene.teaching_point = sanitize_string(&scene.teaching_point);
    if scene.dialogue.is_empty() {
        return Err(ApiError::Validation("Scene dialogue is required".into()));
    }

    let repo = state.projects(&user)?;
    let mut project = repo
        .get(&project_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Project {} not found", project_id)))?;

    repo.scenes(&project_id).upsert(&scene).await?;
    project.touch();
    repo.upsert(&project).await?;

    info!(user_id = %user.uid, project_id = %project_id, scene_number, "Scene saved");
    Ok(Json(UpsertSceneResponse {
        project_id: project_id.to_string(),
        scene_number,
        message: format!("Scene {} saved", scene_number),
    }))
}

/// Delete a project and all of its scenes.
pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DeleteProjectResponse>> {
    let project_id = parse_project_id(&project_id)?;
    let repo = state.projects(&user)?;

    if repo.get(&project_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Project {} not found", project_id)));
    }
    repo.delete(&project_id).await?;

    info!(user_id = %user.uid, project_id = %project_id, "Project deleted");
    Ok(Json(DeleteProjectResponse {
        project_id: project_id.to_string(),
        message: "Project and scenes deleted".to_string(),
    }))
}
