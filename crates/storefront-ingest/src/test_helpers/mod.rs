//! Test helpers for ingestion tests
//!
//! In-memory implementations of the object store and backend collaborators.
//! Every mock can be gated so a call stays pending until the test releases it.

pub mod mock_backend;
pub mod mock_storage;

pub use mock_backend::{MockFeatureCatalog, MockReferenceStore};
pub use mock_storage::MockObjectStore;

use std::sync::Arc;
use storefront_core::CandidateFile;
use tokio::sync::Semaphore;

/// Holds calls pending until released. An open gate never blocks.
#[derive(Clone, Default)]
pub struct Gate(Option<Arc<Semaphore>>);

impl Gate {
    pub fn closed() -> Self {
        Self(Some(Arc::new(Semaphore::new(0))))
    }

    /// Let one pending (or future) call through.
    pub fn release(&self) {
        if let Some(semaphore) = &self.0 {
            semaphore.add_permits(1);
        }
    }

    pub async fn pass(&self) {
        if let Some(semaphore) = &self.0 {
            if let Ok(permit) = semaphore.acquire().await {
                permit.forget();
            }
        }
    }
}

/// A small PNG candidate file.
pub fn png_file(name: &str) -> CandidateFile {
    CandidateFile::new(name, "image/png", b"\x89PNG\r\n\x1a\nfake".to_vec())
}
