//! Mock backend collaborators

use super::Gate;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use storefront_core::{Ack, FeatureAsset, FeatureCatalog, ReferenceStore};

/// Reference store answering from a scripted queue, `Ack::ok()` by default.
#[derive(Default)]
pub struct MockReferenceStore {
    responses: Mutex<VecDeque<Result<Ack, String>>>,
    persisted: Mutex<Vec<String>>,
    gate: Gate,
}

impl MockReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Gate::closed(),
            ..Self::default()
        }
    }

    pub fn push_ack(&self, ack: Ack) {
        self.responses.lock().unwrap().push_back(Ok(ack));
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

    pub fn persisted(&self) -> Vec<String> {
        self.persisted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReferenceStore for MockReferenceStore {
    async fn persist(&self, remote_url: &str) -> anyhow::Result<Ack> {
        self.persisted.lock().unwrap().push(remote_url.to_string());
        self.gate.pass().await;

        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(ack)) => Ok(ack),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Ack::ok()),
        }
    }
}

/// Feature catalog backed by a vector; ids are assigned 1, 2, 3, ...
#[derive(Default)]
pub struct MockFeatureCatalog {
    assets: Mutex<Vec<FeatureAsset>>,
    append_responses: Mutex<VecDeque<Result<Ack, String>>>,
    list_failures: Mutex<VecDeque<String>>,
    append_calls: Mutex<Vec<String>>,
    list_calls: Mutex<usize>,
}

impl MockFeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(assets: Vec<FeatureAsset>) -> Self {
        Self {
            assets: Mutex::new(assets),
            ..Self::default()
        }
    }

    /// Script the next append answer. A rejected ack does not store the URL.
    pub fn push_append_ack(&self, ack: Ack) {
        self.append_responses.lock().unwrap().push_back(Ok(ack));
    }

    pub fn push_append_failure(&self, message: &str) {
        self.append_responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn push_list_failure(&self, message: &str) {
        self.list_failures
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    pub fn append_calls(&self) -> Vec<String> {
        self.append_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl FeatureCatalog for MockFeatureCatalog {
    async fn append(&self, remote_url: &str) -> anyhow::Result<Ack> {
        self.append_calls
            .lock()
            .unwrap()
            .push(remote_url.to_string());

        let scripted = self.append_responses.lock().unwrap().pop_front();
        match scripted {
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            Some(Ok(ack)) if !ack.success => Ok(ack),
            _ => {
                let mut assets = self.assets.lock().unwrap();
                let id = (assets.len() + 1).to_string();
                assets.push(FeatureAsset::new(id, remote_url));
                Ok(Ack::ok())
            }
        }
    }

    async fn list(&self) -> anyhow::Result<Vec<FeatureAsset>> {
        *self.list_calls.lock().unwrap() += 1;

        if let Some(message) = self.list_failures.lock().unwrap().pop_front() {
            return Err(anyhow::anyhow!(message));
        }
        Ok(self.assets.lock().unwrap().clone())
    }
}
