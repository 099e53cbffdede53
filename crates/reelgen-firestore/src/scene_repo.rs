//! Scene repository: `users/{uid}/character_projects/{pid}/scenes/{NNN}`.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::info;

use reelgen_models::{ProjectId, SceneOrigin, SceneRecord, SlotRole};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, ToFirestoreValue, Value, Write};

/// Repository for the scenes of one project.
#[derive(Clone)]
pub struct SceneRepository {
    client: FirestoreClient,
    user_id: String,
    project_id: ProjectId,
}

impl SceneRepository {
    pub fn new(client: FirestoreClient, user_id: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            client,
            user_id: user_id.into(),
            project_id,
        }
    }

    fn collection(&self) -> String {
        format!(
            "users/{}/character_projects/{}/scenes",
            self.user_id, self.project_id
        )
    }

    /// Zero-padded so lexical order matches scene order.
    pub fn doc_id(scene_number: u32) -> String {
        format!("{:03}", scene_number)
    }

    /// Write one scene, replacing any stored scene with the same number.
    pub async fn upsert(&self, record: &SceneRecord) -> FirestoreResult<()> {
        let name = self
            .client
            .full_document_name(&self.collection(), &Self::doc_id(record.scene_number));
        let fields = scene_to_fields(record);

        self.client
            .with_retry("upsert_scene", || {
                self.client
                    .batch_write(vec![Write::upsert(name.clone(), fields.clone())])
            })
            .await?;
        Ok(())
    }

    /// Make `records` the project's complete scene list in one commit.
    ///
    /// Stored scenes whose numbers are not in `records` are deleted in the
    /// same commit, so readers never see new and stale scenes mixed.
    pub async fn replace_all(&self, records: &[SceneRecord]) -> FirestoreResult<()> {
        let collection = self.collection();
        let keep: HashSet<String> = records
            .iter()
            .map(|r| Self::doc_id(r.scene_number))
            .collect();

        let stale: Vec<String> = self
            .client
            .list_all(&collection)
            .await?
            .iter()
            .filter_map(Document::id)
            .filter(|id| !keep.contains(*id))
            .map(str::to_string)
            .collect();

        let writes: Vec<Write> = records
            .iter()
            .map(|r| {
                Write::upsert(
                    self.client
                        .full_document_name(&collection, &Self::doc_id(r.scene_number)),
                    scene_to_fields(r),
                )
            })
            .chain(
                stale
                    .iter()
                    .map(|id| Write::delete(self.client.full_document_name(&collection, id))),
            )
            .collect();

        self.client
            .with_retry("replace_scenes", || self.client.commit(writes.clone()))
            .await?;

        info!(
            user_id = %self.user_id,
            project_id = %self.project_id,
            written = records.len(),
            deleted = stale.len(),
            "Replaced project scenes"
        );
        Ok(())
    }

    /// All stored scenes ordered by scene number.
    pub async fn list(&self) -> FirestoreResult<Vec<SceneRecord>> {
        let mut scenes = self
            .client
            .list_all(&self.collection())
            .await?
            .iter()
            .map(document_to_scene)
            .collect::<FirestoreResult<Vec<_>>>()?;
        scenes.sort_by_key(|s| s.scene_number);
        Ok(scenes)
    }

    /// Delete every stored scene of the project.
    pub async fn delete_all(&self) -> FirestoreResult<usize> {
        let collection = self.collection();
        let writes: Vec<Write> = self
            .client
            .list_all(&collection)
            .await?
            .iter()
            .filter_map(Document::id)
            .map(|id| Write::delete(self.client.full_document_name(&collection, id)))
            .collect();
        let count = writes.len();

        self.client
            .with_retry("delete_scenes", || self.client.batch_write(writes.clone()))
            .await?;
        Ok(count)
    }
}

fn scene_to_fields(record: &SceneRecord) -> HashMap<String, Value> {
    HashMap::from([
        ("scene_number".to_string(), record.scene_number.to_firestore_value()),
        ("role".to_string(), record.role.as_str().to_firestore_value()),
        ("dialogue".to_string(), record.dialogue.to_firestore_value()),
        ("emotion".to_string(), record.emotion.to_firestore_value()),
        ("teaching_point".to_string(), record.teaching_point.to_firestore_value()),
        (
            "visual_description".to_string(),
            record.visual_description.to_firestore_value(),
        ),
        ("speaker_id".to_string(), record.speaker_id.to_firestore_value()),
        (
            "voice_descriptor".to_string(),
            record.voice_descriptor.to_firestore_value(),
        ),
        ("origin".to_string(), record.origin.as_str().to_firestore_value()),
        ("generated_prompt".to_string(), record.prompt.to_firestore_value()),
        ("duration".to_string(), record.duration_secs.to_firestore_value()),
        ("updated_at".to_string(), Utc::now().to_firestore_value()),
    ])
}

fn document_to_scene(doc: &Document) -> FirestoreResult<SceneRecord> {
    let role: String = doc.require("role")?;
    let role = SlotRole::parse(&role)
        .ok_or_else(|| FirestoreError::invalid_response(format!("unknown scene role '{role}'")))?;

    Ok(SceneRecord {
        scene_number: doc.require("scene_number")?,
        role,
        duration_secs: doc.get("duration").unwrap_or_default(),
        visual_description: doc.get("visual_description").unwrap_or_default(),
        dialogue: doc.get("dialogue").unwrap_or_default(),
        teaching_point: doc.get("teaching_point").unwrap_or_default(),
        emotion: doc.get("emotion").unwrap_or_default(),
        speaker_id: doc.get("speaker_id").unwrap_or_default(),
        voice_descriptor: doc.get("voice_descriptor").unwrap_or_default(),
        origin: doc
            .get::<String>("origin")
            .and_then(|o| SceneOrigin::parse(&o))
            .unwrap_or_default(),
        prompt: doc.get("generated_prompt").unwrap_or_default(),
    })
}
