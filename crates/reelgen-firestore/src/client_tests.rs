//! Client tests against a mock Firestore emulator.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{body_partial_json, header, method, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use reelgen_models::{ProjectId, SceneOrigin, SceneRecord, SlotRole};

use crate::client::{FirestoreClient, FirestoreConfig, MAX_BATCH_WRITES};
use crate::error::FirestoreError;
use crate::retry::RetryConfig;
use crate::scene_repo::SceneRepository;
use crate::types::{ToFirestoreValue, Write};

fn test_config(server: &MockServer) -> FirestoreConfig {
    FirestoreConfig {
        project_id: "test-project".to_string(),
        database_id: "(default)".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
        emulator_host: Some(server.address().to_string()),
    }
}

async fn client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::new(test_config(server)).await.unwrap()
}

#[tokio::test]
async fn test_get_document_missing_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/documents/users/u1/character_projects/p1$"))
        .and(header("authorization", "Bearer owner"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let doc = client(&server)
        .await
        .get_document("users/u1/character_projects", "p1")
        .await
        .unwrap();
    assert!(doc.is_none());
}

#[tokio::test]
async fn test_get_document_parses_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/character_projects/p1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/test-project/databases/(default)/documents/users/u1/character_projects/p1",
            "fields": {"character_name": {"stringValue": "Ava"}}
        })))
        .mount(&server)
        .await;

    let doc = client(&server)
        .await
        .get_document("users/u1/character_projects", "p1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.id(), Some("p1"));
    assert_eq!(doc.get::<String>("character_name").as_deref(), Some("Ava"));
}

#[tokio::test]
async fn test_create_conflict_is_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/character_projects$"))
        .and(query_param("documentId", "p1"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let mut fields = HashMap::new();
    fields.insert("character_name".to_string(), "Ava".to_firestore_value());
    let err = client(&server)
        .await
        .create_document("users/u1/character_projects", "p1", fields)
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_update_requires_existing_document() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"/character_projects/p1$"))
        .and(query_param("currentDocument.exists", "true"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .update_document("users/u1/character_projects", "p1", HashMap::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::NotFound(_)));
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .get_document("users/u1/character_projects", "p1")
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::RateLimited(2000)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unauthorized_without_expiry_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .delete_document("users/u1/character_projects", "p1")
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::AuthError(_)));
}

#[tokio::test]
async fn test_list_all_follows_page_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/scenes$"))
        .and(|req: &Request| !req.url.query_pairs().any(|(k, _)| k == "pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{"name": "x/scenes/001", "fields": {}}],
            "nextPageToken": "p2"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/scenes$"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{"name": "x/scenes/002", "fields": {}}]
        })))
        .mount(&server)
        .await;

    let docs = client(&server)
        .await
        .list_all("users/u1/character_projects/p1/scenes")
        .await
        .unwrap();
    let ids: Vec<_> = docs.iter().filter_map(|d| d.id()).collect();
    assert_eq!(ids, vec!["001", "002"]);
}

#[tokio::test]
async fn test_batch_write_surfaces_partial_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:batchWrite$"))
        .and(body_partial_json(json!({"writes": [{"delete": "docs/a"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": [{"code": 5, "message": "not found"}]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .batch_write(vec![Write::delete("docs/a".into())])
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::RequestFailed(_)));
}

#[tokio::test]
async fn test_batch_write_limits() {
    let server = MockServer::start().await;
    let client = client(&server).await;

    assert!(client.batch_write(Vec::new()).await.is_ok());

    let writes = (0..=MAX_BATCH_WRITES)
        .map(|i| Write::delete(format!("docs/{i}")))
        .collect();
    assert!(client.batch_write(writes).await.is_err());
}

#[tokio::test]
async fn test_commit_limits() {
    let server = MockServer::start().await;
    let client = client(&server).await;

    assert!(client.commit(Vec::new()).await.is_ok());

    let writes = (0..=MAX_BATCH_WRITES)
        .map(|i| Write::delete(format!("docs/{i}")))
        .collect();
    assert!(client.commit(writes).await.is_err());
}

fn scene(n: u32) -> SceneRecord {
    SceneRecord {
        scene_number: n,
        role: SlotRole::OnCamera,
        duration_secs: 7,
        visual_description: format!("Scene {n}"),
        dialogue: format!("Line {n}"),
        teaching_point: format!("Point {n}"),
        emotion: "engaging".into(),
        speaker_id: "ava_female_friendly".into(),
        voice_descriptor: "Warm, clear voice".into(),
        origin: SceneOrigin::Parsed,
        prompt: String::new(),
    }
}

/// Trailing document ids of the update and delete writes in a request body.
fn write_targets(req: &Request) -> (Vec<String>, Vec<String>) {
    let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
    let last_segment = |name: &str| name.rsplit('/').next().unwrap_or_default().to_string();
    let writes = body["writes"].as_array().cloned().unwrap_or_default();

    let updates = writes
        .iter()
        .filter_map(|w| w["update"]["name"].as_str())
        .map(last_segment)
        .collect();
    let deletes = writes
        .iter()
        .filter_map(|w| w["delete"].as_str())
        .map(last_segment)
        .collect();
    (updates, deletes)
}

#[tokio::test]
async fn test_scene_upsert_writes_one_numbered_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:batchWrite$"))
        .and(|req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
            let writes = body["writes"].as_array().cloned().unwrap_or_default();
            writes.len() == 1
                && writes[0]["update"]["name"]
                    .as_str()
                    .is_some_and(|n| n.ends_with("/users/u1/character_projects/p1/scenes/003"))
                && writes[0]["update"]["fields"]["dialogue"]["stringValue"] == "Line 3"
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    SceneRepository::new(client(&server).await, "u1", ProjectId::from("p1"))
        .upsert(&scene(3))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_replace_all_deletes_stale_scenes_in_one_commit() {
    let server = MockServer::start().await;
    let stored: Vec<_> = (1..=5)
        .map(|n| {
            json!({
                "name": format!(
                    "projects/test-project/databases/(default)/documents/users/u1/character_projects/p1/scenes/{:03}",
                    n
                ),
                "fields": {}
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path_regex(r"/character_projects/p1/scenes$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents": stored})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:commit$"))
        .and(|req: &Request| {
            let (mut updates, mut deletes) = write_targets(req);
            updates.sort();
            deletes.sort();
            updates == ["001", "002", "003"] && deletes == ["004", "005"]
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commitTime": "2026-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:batchWrite$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let records: Vec<_> = (1..=3).map(scene).collect();
    SceneRepository::new(client(&server).await, "u1", ProjectId::from("p1"))
        .replace_all(&records)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_commit_is_retried_whole() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/scenes$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:commit$"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:commit$"))
        .and(|req: &Request| write_targets(req).0.len() == 2)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let records: Vec<_> = (1..=2).map(scene).collect();
    SceneRepository::new(client(&server).await, "u1", ProjectId::from("p1"))
        .replace_all(&records)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_full_document_name() {
    let server = MockServer::start().await;
    let name = client(&server)
        .await
        .full_document_name("users/u1/character_projects", "p1");
    assert_eq!(
        name,
        "projects/test-project/databases/(default)/documents/users/u1/character_projects/p1"
    );
}

#[test]
fn test_error_mapping() {
    let cases = [
        (401, true, false),
        (404, false, false),
        (409, false, false),
        (429, false, true),
        (503, false, true),
        (400, false, false),
    ];
    for (status, is_auth, retryable) in cases {
        let err = FirestoreError::from_http_status(status, "x");
        assert_eq!(matches!(err, FirestoreError::AuthError(_)), is_auth, "{status}");
        assert_eq!(err.is_retryable(), retryable, "{status}");
        assert_eq!(err.http_status(), if status == 400 { None } else { Some(status) });
    }
}

#[test]
#[serial]
fn test_config_requires_project_id() {
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("FIREBASE_PROJECT_ID");
    assert!(FirestoreConfig::from_env().is_err());
}

#[test]
#[serial]
fn test_config_defaults() {
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::set_var("FIREBASE_PROJECT_ID", "reelgen-test");
    std::env::remove_var("FIRESTORE_DATABASE_ID");
    std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
    std::env::remove_var("FIRESTORE_EMULATOR_HOST");

    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.project_id, "reelgen-test");
    assert_eq!(config.database_id, "(default)");
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert!(config.emulator_host.is_none());

    std::env::remove_var("FIREBASE_PROJECT_ID");
}
