//! Character scene generation handler.

use axum::extract::State;
use axum::{Extension, Json};
use tracing::{debug, info, warn};

use reelgen_models::{CharacterDialogueResponse, CharacterProject, CharacterSceneRequest, ProjectId};
use reelgen_synthesis::{SynthesisInput, SynthesisLogger, SynthesisOutput};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_persistence_failure;
use crate::middleware::RequestId;
use crate::security::{is_valid_project_id, sanitize_string};
use crate::state::AppState;

/// Generate a scene sequence and store it under the caller's projects.
///
/// Without `project_id` a new project is created. With one, the project is
/// upserted and its scenes replaced. Storage failures do not fail the
/// request; the scenes are returned with `saved: false`.
pub async fn generate_character_scenes(
    State(state): State<AppState>,
    user: AuthUser,
    request_id: Option<Extension<RequestId>>,
    Json(mut request): Json<CharacterSceneRequest>,
) -> ApiResult<Json<CharacterDialogueResponse>> {
    request.scenario = request.scenario.as_deref().map(sanitize_string);
    request.project_id = request.project_id.filter(|id| !id.trim().is_empty());

    request
        .validate(state.pipeline.config().max_total_duration_secs)
        .map_err(ApiError::Validation)?;
    if let Some(id) = &request.project_id {
        if !is_valid_project_id(id) {
            return Err(ApiError::bad_request("Invalid project id"));
        }
    }

    let operation = format!("{}_scenes", request.content_type);
    let logger = match request_id {
        Some(Extension(RequestId(id))) => SynthesisLogger::new(id, operation),
        None => SynthesisLogger::generate(operation),
    };

    let output = state
        .pipeline
        .synthesize(&SynthesisInput::from_request(&request), &logger)
        .await?;

    let (project_id, saved) = if state.firestore.is_none() {
        debug!("Project storage not configured, skipping save");
        (request.project_id.clone(), false)
    } else {
        match persist(&state, &user, &request, &output).await {
            Ok(id) => (Some(id.to_string()), true),
            Err(e) => {
                warn!(
                    request_id = %logger.request_id(),
                    user_id = %user.uid,
                    error = %e,
                    "Generated scenes could not be saved"
                );
                record_persistence_failure("generate");
                (request.project_id.clone(), false)
            }
        }
    };

    let total_scenes = output.scenes.len();
    info!(
        request_id = %logger.request_id(),
        user_id = %user.uid,
        scenes = total_scenes,
        strategy = ?output.report.strategy,
        saved,
        "Character scenes generated"
    );

    Ok(Json(CharacterDialogueResponse {
        project_id,
        saved,
        message: if saved {
            format!("Generated {} scenes and saved them to the project", total_scenes)
        } else {
            format!("Generated {} scenes (not saved)", total_scenes)
        },
        total_scenes,
        character_name: request.character_name.trim().to_string(),
        topic: request.content_type.to_string(),
        parse_report: output.report,
        scenes: output.scenes,
    }))
}

async fn persist(
    state: &AppState,
    user: &AuthUser,
    request: &CharacterSceneRequest,
    output: &SynthesisOutput,
) -> ApiResult<ProjectId> {
    let repo = state.projects(user)?;
    let project_id = request
        .project_id
        .as_deref()
        .map(ProjectId::from)
        .unwrap_or_default();
    let mut project =
        CharacterProject::from_request(project_id, &user.uid, request, &output.visual_style);

    if request.project_id.is_some() {
        if let Some(stored) = repo.get(&project.project_id).await? {
            project.created_at = stored.created_at;
        }
        repo.upsert(&project).await?;
    } else {
        repo.create(&project).await?;
    }

    repo.scenes(&project.project_id)
        .replace_all(&output.scenes)
        .await?;
    Ok(project.project_id)
}
