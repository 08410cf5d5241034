//! Mock object store

use super::Gate;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storefront_core::{CandidateFile, ObjectStoreBackend};
use storefront_storage::{ObjectStore, StorageError, StorageResult, UploadedObject};

/// Object store that answers from a scripted queue.
///
/// Without scripted answers every upload succeeds with
/// `https://cdn.example.com/{name}`.
#[derive(Default)]
pub struct MockObjectStore {
    responses: Mutex<VecDeque<Result<String, String>>>,
    uploads: Mutex<Vec<CandidateFile>>,
    active: Arc<AtomicUsize>,
    gate: Gate,
}

/// Counts an upload as active until its future completes or is dropped.
struct ActiveUpload(Arc<AtomicUsize>);

impl ActiveUpload {
    fn start(active: &Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(active))
    }
}

impl Drop for ActiveUpload {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads stay pending until `release` is called once per upload.
    pub fn gated() -> Self {
        Self {
            gate: Gate::closed(),
            ..Self::default()
        }
    }

    pub fn push_url(&self, url: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(url.to_string()));
    }

    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn release(&self) {
        self.gate.release();
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// Uploads currently pending inside the store.
    pub fn active_uploads(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn upload(&self, file: &CandidateFile) -> StorageResult<UploadedObject> {
        self.uploads.lock().unwrap().push(file.clone());
        let _active = ActiveUpload::start(&self.active);
        self.gate.pass().await;

        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(url)) => Ok(UploadedObject {
                storage_key: url.clone(),
                remote_url: url,
            }),
            Some(Err(message)) => Err(StorageError::Rejected(message)),
            None => {
                let url = format!("https://cdn.example.com/{}", file.name);
                Ok(UploadedObject {
                    storage_key: file.name.clone(),
                    remote_url: url,
                })
            }
        }
    }

    fn backend_type(&self) -> ObjectStoreBackend {
        ObjectStoreBackend::Hosted
    }
}
