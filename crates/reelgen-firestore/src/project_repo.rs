//! Character project repository: `users/{uid}/character_projects/{pid}`.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use reelgen_models::{CharacterProject, ContentKind, Language, ProjectId, TopicMode};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::scene_repo::SceneRepository;
use crate::types::{Document, ToFirestoreValue, Value};

/// Repository for one user's character projects.
#[derive(Clone)]
pub struct ProjectRepository {
    client: FirestoreClient,
    user_id: String,
}

impl ProjectRepository {
    pub fn new(client: FirestoreClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }

    fn collection(&self) -> String {
        format!("users/{}/character_projects", self.user_id)
    }

    /// Scene repository for one of this user's projects.
    pub fn scenes(&self, project_id: &ProjectId) -> SceneRepository {
        SceneRepository::new(self.client.clone(), self.user_id.clone(), project_id.clone())
    }

    /// Create a project. Fails if the id is already taken.
    pub async fn create(&self, project: &CharacterProject) -> FirestoreResult<()> {
        self.client
            .create_document(
                &self.collection(),
                project.project_id.as_str(),
                project_to_fields(project),
            )
            .await?;

        info!(
            user_id = %self.user_id,
            project_id = %project.project_id,
            "Created character project"
        );
        Ok(())
    }

    pub async fn get(&self, project_id: &ProjectId) -> FirestoreResult<Option<CharacterProject>> {
        self.client
            .get_document(&self.collection(), project_id.as_str())
            .await?
            .map(|doc| document_to_project(&doc, &self.user_id, project_id.clone()))
            .transpose()
    }

    /// Overwrite the project's metadata, creating the document if missing.
    ///
    /// `created_at` is kept from the stored document when there is one.
    pub async fn upsert(&self, project: &CharacterProject) -> FirestoreResult<()> {
        let collection = self.collection();
        let id = project.project_id.as_str();

        let mut fields = project_to_fields(project);
        fields.remove("created_at");
        let mask: Vec<String> = fields.keys().cloned().collect();

        match self
            .client
            .update_document(&collection, id, fields, Some(mask))
            .await
        {
            Ok(_) => Ok(()),
            Err(FirestoreError::NotFound(_)) => {
                match self
                    .client
                    .create_document(&collection, id, project_to_fields(project))
                    .await
                {
                    // Lost a race with a concurrent create; the document exists now.
                    Ok(_) | Err(FirestoreError::AlreadyExists(_)) => Ok(()),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// All projects, most recently updated first.
    pub async fn list(&self) -> FirestoreResult<Vec<CharacterProject>> {
        let mut projects = self
            .client
            .list_all(&self.collection())
            .await?
            .iter()
            .filter_map(|doc| {
                let id = ProjectId::from(doc.id()?);
                Some(document_to_project(doc, &self.user_id, id))
            })
            .collect::<FirestoreResult<Vec<_>>>()?;

        projects.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(projects)
    }

    /// Delete a project and all of its scenes.
    pub async fn delete(&self, project_id: &ProjectId) -> FirestoreResult<()> {
        let scenes = self.scenes(project_id).delete_all().await?;
        self.client
            .delete_document(&self.collection(), project_id.as_str())
            .await?;

        info!(
            user_id = %self.user_id,
            project_id = %project_id,
            scenes_deleted = scenes,
            "Deleted character project"
        );
        Ok(())
    }
}

fn project_to_fields(project: &CharacterProject) -> HashMap<String, Value> {
    HashMap::from([
        ("project_name".to_string(), project.project_name.to_firestore_value()),
        ("character_name".to_string(), project.character_name.to_firestore_value()),
        ("voice_tone".to_string(), project.voice_tone.to_firestore_value()),
        ("topic_mode".to_string(), project.topic_mode.as_str().to_firestore_value()),
        (
            "content_type".to_string(),
            project.content_type.as_str().to_firestore_value(),
        ),
        ("scenario".to_string(), project.scenario.to_firestore_value()),
        ("visual_style".to_string(), project.visual_style.to_firestore_value()),
        ("language".to_string(), project.language.as_str().to_firestore_value()),
        ("total_duration".to_string(), project.total_duration.to_firestore_value()),
        ("created_at".to_string(), project.created_at.to_firestore_value()),
        ("last_updated".to_string(), project.last_updated.to_firestore_value()),
    ])
}

fn document_to_project(
    doc: &Document,
    user_id: &str,
    project_id: ProjectId,
) -> FirestoreResult<CharacterProject> {
    let character_name: String = doc.require("character_name")?;
    let topic_mode = doc
        .get::<String>("topic_mode")
        .map(|s| TopicMode::parse(&s))
        .unwrap_or_default();
    let created_at = doc.get("created_at").unwrap_or_else(Utc::now);

    Ok(CharacterProject {
        project_name: doc
            .get("project_name")
            .unwrap_or_else(|| format!("{} - {}", character_name, topic_mode)),
        project_id,
        user_id: user_id.to_string(),
        voice_tone: doc.get("voice_tone").unwrap_or_default(),
        topic_mode,
        content_type: doc
            .get::<String>("content_type")
            .map(|s| ContentKind::parse(&s))
            .unwrap_or_default(),
        scenario: doc.get::<Option<String>>("scenario").flatten(),
        visual_style: doc.get("visual_style").unwrap_or_default(),
        language: doc
            .get::<String>("language")
            .and_then(|s| Language::parse(&s))
            .unwrap_or_default(),
        total_duration: doc.get("total_duration").unwrap_or_default(),
        last_updated: doc.get("last_updated").unwrap_or(created_at),
        created_at,
        character_name,
    })
}
