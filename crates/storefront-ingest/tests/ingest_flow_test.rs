//! End-to-end ingestion flow: select, upload, persist, commit, reload.

use std::collections::HashMap;
use std::sync::Arc;

use mockito::Matcher;
use storefront_core::{Config, UploadPolicy};
use storefront_ingest::test_helpers::{png_file, MockFeatureCatalog, MockObjectStore, MockReferenceStore};
use storefront_ingest::{
    AssetUploadController, CandidateFile, FeatureAssetRegistry, FileSource, IngestError,
    IngestPipeline, IngestionState,
};
use storefront_storage::LocalStorage;
use tempfile::TempDir;

#[tokio::test]
async fn photo_is_uploaded_confirmed_and_committed() {
    let store = Arc::new(MockObjectStore::new());
    store.push_url("https://cdn.example.com/features/photo.png");
    let references = Arc::new(MockReferenceStore::new());
    let catalog = Arc::new(MockFeatureCatalog::new());
    let controller =
        AssetUploadController::new(store.clone(), references.clone(), UploadPolicy::default());
    let mut registry = FeatureAssetRegistry::new(catalog.clone());

    let task = controller
        .select_file(FileSource::Picker(vec![png_file("photo.png")]))
        .unwrap();
    let state = task.wait().await;
    let url = "https://cdn.example.com/features/photo.png";
    assert_eq!(state, IngestionState::Confirmed(url.to_string()));
    assert_eq!(references.persisted(), vec![url.to_string()]);

    let outcome = registry.commit(&controller).await.unwrap();

    assert_eq!(outcome.remote_url, url);
    assert_eq!(registry.assets().len(), 1);
    assert_eq!(registry.assets()[0].remote_url, url);
    assert_eq!(catalog.list_calls(), 1);
    assert_eq!(controller.state(), IngestionState::Empty);
}

#[tokio::test]
async fn failed_upload_leaves_nothing_to_commit() {
    let store = Arc::new(MockObjectStore::new());
    store.push_failure("unsupported file");
    let references = Arc::new(MockReferenceStore::new());
    let catalog = Arc::new(MockFeatureCatalog::new());
    let policy = Config::from_lookup(|_| None).unwrap().upload_policy;
    let controller = AssetUploadController::new(store.clone(), references.clone(), policy);
    let mut registry = FeatureAssetRegistry::new(catalog.clone());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.exe");
    tokio::fs::write(&path, b"MZ\x90\x00").await.unwrap();
    let file = CandidateFile::from_path(&path).await.unwrap();
    let state = controller
        .select_file(FileSource::Drop(vec![file]))
        .unwrap()
        .wait()
        .await;
    assert_eq!(state, IngestionState::Failed("upload failed".to_string()));
    assert_eq!(store.uploaded_names(), vec!["bad.exe".to_string()]);
    assert!(references.persisted().is_empty());

    let err = registry.commit(&controller).await.unwrap_err();

    assert!(matches!(err, IngestError::NothingToCommit));
    assert!(catalog.append_calls().is_empty());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn local_backend_writes_file_before_confirming() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://localhost:5000/media".to_string())
        .await
        .unwrap();
    let references = Arc::new(MockReferenceStore::new());
    let controller =
        AssetUploadController::new(Arc::new(storage), references.clone(), UploadPolicy::default());

    let state = controller
        .select_file(FileSource::Picker(vec![png_file("photo.png")]))
        .unwrap()
        .wait()
        .await;

    let url = state.confirmed_url().unwrap();
    assert!(url.starts_with("http://localhost:5000/media/features/"));
    assert!(url.ends_with(".png"));
    let key = url.trim_start_matches("http://localhost:5000/media/");
    assert!(dir.path().join(key).exists());
    assert_eq!(references.persisted(), vec![url.to_string()]);
}

#[tokio::test]
async fn pipeline_talks_to_hosted_store_and_backend() {
    let mut host = mockito::Server::new_async().await;
    let mut backend = mockito::Server::new_async().await;
    let url = "https://res.example.com/image/upload/v1/photo.png";

    let upload = host
        .mock("POST", "/image/upload")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"secure_url":"{}","public_id":"photo"}}"#, url))
        .create_async()
        .await;
    let save = backend
        .mock("POST", "/api/admin/products/save-image")
        .match_body(Matcher::Json(serde_json::json!({ "image": url })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;
    let add = backend
        .mock("POST", "/api/common/feature/add")
        .match_body(Matcher::Json(serde_json::json!({ "image": url })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;
    let list = backend
        .mock("GET", "/api/common/feature/get")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"success":true,"data":[{{"_id":"65f0c1","image":"{}"}}]}}"#,
            url
        ))
        .expect(1)
        .create_async()
        .await;

    let vars: HashMap<&str, String> = HashMap::from([
        ("STOREFRONT_API_URL", backend.url()),
        ("HOSTED_UPLOAD_URL", format!("{}/image/upload", host.url())),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    config.validate().unwrap();

    let IngestPipeline {
        controller,
        mut registry,
        ..
    } = IngestPipeline::from_config(&config).await.unwrap();

    let state = controller
        .select_file(FileSource::Picker(vec![png_file("photo.png")]))
        .unwrap()
        .wait()
        .await;
    assert_eq!(state.confirmed_url(), Some(url));

    registry.commit(&controller).await.unwrap();
    assert_eq!(registry.assets()[0].id, "65f0c1");

    upload.assert_async().await;
    save.assert_async().await;
    add.assert_async().await;
    list.assert_async().await;
}
