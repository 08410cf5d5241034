//! Upload controller
//!
//! Owns one candidate file and drives it through upload and reference
//! persistence. Selecting a file starts the upload immediately; there is no
//! confirmation step in between.
//!
//! ```text
//! Empty --select--> Selected --(immediately)--> Uploading
//! Uploading --upload ok, persist ok--> Confirmed(url)
//! Uploading --upload or persist failure--> Failed(message)
//! Uploading --cancel--> Cancelled
//! any settled state --select--> Selected --> Uploading
//! any settled state --remove--> Empty
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use storefront_core::{
    CandidateFile, FileSource, IngestError, IngestionState, ReferenceStore, UploadPolicy,
};
use storefront_storage::ObjectStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// The file input the candidate was picked from.
///
/// Cleared on removal so that picking the same file again is seen as a new
/// selection.
pub trait InputControl: Send + Sync {
    fn clear(&self);
}

/// Why a selection was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectRejection {
    #[error("an upload is already in progress")]
    UploadInFlight,
    #[error("file selection is disabled while editing")]
    Disabled,
    #[error("no file was selected")]
    NoFile,
}

/// Why remove, cancel or retry was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionRejection {
    #[error("an upload is already in progress")]
    UploadInFlight,
    #[error("no upload is in progress")]
    NotUploading,
    #[error("there is no failed save to retry")]
    NothingToRetry,
}

/// Settled part of the controller state. `Uploading` is derived from the
/// in-flight marker.
#[derive(Debug, Clone)]
enum Phase {
    Empty,
    Selected,
    Confirmed(String),
    Failed {
        message: String,
        /// Uploaded but not recorded by the backend.
        unsaved_url: Option<String>,
    },
    Cancelled,
}

impl Phase {
    fn failed(error: &IngestError, unsaved_url: Option<String>) -> Self {
        Phase::Failed {
            message: error.to_string(),
            unsaved_url,
        }
    }
}

struct InFlight {
    attempt: u64,
    cancel: CancellationToken,
}

struct Inner {
    candidate: Option<CandidateFile>,
    phase: Phase,
    in_flight: Option<InFlight>,
    disabled: bool,
    input: Option<Arc<dyn InputControl>>,
    next_attempt: u64,
}

impl Inner {
    fn state(&self) -> IngestionState {
        if self.in_flight.is_some() {
            return IngestionState::Uploading;
        }
        match &self.phase {
            Phase::Empty => IngestionState::Empty,
            Phase::Selected => IngestionState::Selected,
            Phase::Confirmed(url) => IngestionState::Confirmed(url.clone()),
            Phase::Failed { message, .. } => IngestionState::Failed(message.clone()),
            Phase::Cancelled => IngestionState::Cancelled,
        }
    }

    fn start_attempt(&mut self) -> (u64, CancellationToken) {
        self.next_attempt += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            attempt: self.next_attempt,
            cancel: cancel.clone(),
        });
        (self.next_attempt, cancel)
    }
}

struct Shared {
    object_store: Arc<dyn ObjectStore>,
    reference_store: Arc<dyn ReferenceStore>,
    policy: UploadPolicy,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<IngestionState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.state());
    }

    /// Record the outcome of an attempt. Outcomes of attempts that were
    /// cancelled in the meantime are dropped.
    fn finish(&self, attempt: u64, outcome: Phase) -> IngestionState {
        let mut inner = self.lock();
        if inner.in_flight.as_ref().map(|f| f.attempt) != Some(attempt) {
            return IngestionState::Cancelled;
        }
        inner.phase = outcome;
        inner.in_flight = None;
        let state = inner.state();
        self.state_tx.send_replace(state.clone());
        state
    }

    async fn upload_and_persist(&self, file: &CandidateFile, cancel: &CancellationToken) -> Phase {
        if let Err(reason) = self.policy.check(file.size(), &file.content_type) {
            let error = IngestError::InvalidInput(reason);
            tracing::warn!(
                file_name = %file.name,
                content_type = %file.content_type,
                error_code = error.error_code(),
                error = %error,
                "Candidate file rejected before upload"
            );
            return Phase::failed(&error, None);
        }

        let start = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Phase::Cancelled,
            result = self.object_store.upload(file) => result,
        };

        let uploaded = match result {
            Ok(uploaded) => uploaded,
            Err(e) => {
                tracing::error!(
                    file_name = %file.name,
                    backend = %self.object_store.backend_type(),
                    error = %e,
                    "Object store upload failed"
                );
                return Phase::failed(&IngestError::UploadFailure(e.into()), None);
            }
        };

        tracing::info!(
            file_name = %file.name,
            remote_url = %uploaded.remote_url,
            storage_key = %uploaded.storage_key,
            size_bytes = file.size(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File uploaded to object store"
        );

        self.persist_reference(uploaded.remote_url, cancel).await
    }

    async fn persist_reference(&self, remote_url: String, cancel: &CancellationToken) -> Phase {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(
                    remote_url = %remote_url,
                    "Cancelled before the reference was saved, uploaded object left orphaned"
                );
                return Phase::Cancelled;
            }
            result = self.reference_store.persist(&remote_url) => result,
        };

        match result.and_then(|ack| ack.into_result("save image")) {
            Ok(()) => {
                tracing::info!(remote_url = %remote_url, "Image reference saved");
                Phase::Confirmed(remote_url)
            }
            Err(e) => {
                tracing::warn!(
                    remote_url = %remote_url,
                    error = %format!("{:#}", e),
                    "Failed to save image reference, uploaded object left orphaned"
                );
                let error = IngestError::PersistFailure(e);
                Phase::failed(&error, Some(remote_url))
            }
        }
    }
}

/// Handle on a running upload. Dropping it does not stop the upload.
pub struct UploadTask {
    handle: JoinHandle<IngestionState>,
    shared: Arc<Shared>,
    attempt: u64,
}

impl UploadTask {
    /// Wait for the attempt to settle and return the resulting state.
    pub async fn wait(self) -> IngestionState {
        match self.handle.await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(attempt = self.attempt, error = %e, "Upload task aborted");
                let error = IngestError::UploadFailure(anyhow::Error::new(e));
                self.shared.finish(self.attempt, Phase::failed(&error, None))
            }
        }
    }
}

impl fmt::Debug for UploadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadTask")
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// Per-file upload controller.
///
/// Cheap to clone; clones drive the same candidate. At most one upload/persist
/// sequence is in flight at a time. Methods that start work spawn onto the
/// current tokio runtime and must be called from within one.
#[derive(Clone)]
pub struct AssetUploadController {
    shared: Arc<Shared>,
}

impl AssetUploadController {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        reference_store: Arc<dyn ReferenceStore>,
        policy: UploadPolicy,
    ) -> Self {
        let (state_tx, _) = watch::channel(IngestionState::Empty);
        let inner = Inner {
            candidate: None,
            phase: Phase::Empty,
            in_flight: None,
            disabled: false,
            input: None,
            next_attempt: 0,
        };
        Self {
            shared: Arc::new(Shared {
                object_store,
                reference_store,
                policy,
                inner: Mutex::new(inner),
                state_tx,
            }),
        }
    }

    /// Take the first file of `source` as the new candidate and start uploading it.
    ///
    /// Any previous candidate, URL and error are discarded.
    pub fn select_file(&self, source: FileSource) -> Result<UploadTask, SelectRejection> {
        let kind = source.kind();
        let mut inner = self.shared.lock();

        if inner.in_flight.is_some() {
            tracing::debug!(source = kind, "Selection ignored, upload in progress");
            return Err(SelectRejection::UploadInFlight);
        }
        if inner.disabled {
            tracing::debug!(source = kind, "Selection ignored, controller disabled");
            return Err(SelectRejection::Disabled);
        }
        let file = source.into_first().ok_or(SelectRejection::NoFile)?;

        tracing::info!(
            file_name = %file.name,
            content_type = %file.content_type,
            size_bytes = file.size(),
            source = kind,
            "Candidate file selected"
        );

        inner.candidate = Some(file.clone());
        inner.phase = Phase::Selected;
        self.shared.publish(&inner);

        let (attempt, cancel) = inner.start_attempt();
        self.shared.publish(&inner);
        drop(inner);

        Ok(self.begin_upload(attempt, file, cancel))
    }

    fn begin_upload(&self, attempt: u64, file: CandidateFile, cancel: CancellationToken) -> UploadTask {
        let shared = Arc::clone(&self.shared);
        let span = tracing::info_span!("upload", attempt, file_name = %file.name);
        let handle = tokio::spawn(
            async move {
                let outcome = shared.upload_and_persist(&file, &cancel).await;
                shared.finish(attempt, outcome)
            }
            .instrument(span),
        );
        UploadTask {
            handle,
            shared: Arc::clone(&self.shared),
            attempt,
        }
    }

    /// Save the reference of an object that was uploaded but not recorded,
    /// without uploading it again.
    pub fn retry_persist(&self) -> Result<UploadTask, ActionRejection> {
        let mut inner = self.shared.lock();
        if inner.in_flight.is_some() {
            return Err(ActionRejection::UploadInFlight);
        }
        let remote_url = match &inner.phase {
            Phase::Failed {
                unsaved_url: Some(url),
                ..
            } => url.clone(),
            _ => return Err(ActionRejection::NothingToRetry),
        };

        let (attempt, cancel) = inner.start_attempt();
        self.shared.publish(&inner);
        drop(inner);

        tracing::info!(attempt, remote_url = %remote_url, "Retrying image reference save");

        let shared = Arc::clone(&self.shared);
        let span = tracing::info_span!("retry_persist", attempt);
        let handle = tokio::spawn(
            async move {
                let outcome = shared.persist_reference(remote_url, &cancel).await;
                shared.finish(attempt, outcome)
            }
            .instrument(span),
        );
        Ok(UploadTask {
            handle,
            shared: Arc::clone(&self.shared),
            attempt,
        })
    }

    /// Abandon the running attempt. The candidate is kept.
    ///
    /// The controller is `Cancelled` as soon as this returns, but on a
    /// multi-threaded runtime the abandoned request is only dropped once its
    /// task observes the token. Await the attempt's [`UploadTask::wait`]
    /// before selecting again if the two requests must not overlap.
    pub fn cancel(&self) -> Result<(), ActionRejection> {
        let mut inner = self.shared.lock();
        let flight = inner
            .in_flight
            .take()
            .ok_or(ActionRejection::NotUploading)?;
        flight.cancel.cancel();
        inner.phase = Phase::Cancelled;
        self.shared.publish(&inner);

        tracing::info!(attempt = flight.attempt, "Upload cancelled");
        Ok(())
    }

    /// Discard the candidate and any result, and clear the bound input.
    pub fn remove_file(&self) -> Result<(), ActionRejection> {
        let input = {
            let mut inner = self.shared.lock();
            if inner.in_flight.is_some() {
                return Err(ActionRejection::UploadInFlight);
            }
            inner.candidate = None;
            inner.phase = Phase::Empty;
            self.shared.publish(&inner);
            inner.input.clone()
        };

        if let Some(input) = input {
            input.clear();
        }
        tracing::debug!("Candidate file removed");
        Ok(())
    }

    /// Return to `Empty` after the registry committed `remote_url`.
    ///
    /// Does nothing if the controller moved on in the meantime.
    pub(crate) fn reset_after_commit(&self, remote_url: &str) -> bool {
        let input = {
            let mut inner = self.shared.lock();
            let committed = inner.in_flight.is_none()
                && matches!(&inner.phase, Phase::Confirmed(url) if url == remote_url);
            if !committed {
                return false;
            }
            inner.candidate = None;
            inner.phase = Phase::Empty;
            self.shared.publish(&inner);
            inner.input.clone()
        };

        if let Some(input) = input {
            input.clear();
        }
        true
    }

    /// Edit mode: selections are ignored while disabled.
    pub fn set_disabled(&self, disabled: bool) {
        self.shared.lock().disabled = disabled;
    }

    pub fn bind_input(&self, input: Arc<dyn InputControl>) {
        self.shared.lock().input = Some(input);
    }

    pub fn state(&self) -> IngestionState {
        self.shared.lock().state()
    }

    pub fn confirmed_url(&self) -> Option<String> {
        self.state().confirmed_url().map(str::to_string)
    }

    pub fn error_message(&self) -> Option<String> {
        self.state().error_message().map(str::to_string)
    }

    pub fn candidate_name(&self) -> Option<String> {
        self.shared.lock().candidate.as_ref().map(|f| f.name.clone())
    }

    pub fn is_uploading(&self) -> bool {
        self.shared.lock().in_flight.is_some()
    }

    pub fn is_disabled(&self) -> bool {
        self.shared.lock().disabled
    }

    /// Receive every published state change.
    pub fn subscribe(&self) -> watch::Receiver<IngestionState> {
        self.shared.state_tx.subscribe()
    }
}

impl fmt::Debug for AssetUploadController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("AssetUploadController")
            .field("state", &inner.state())
            .field("candidate", &inner.candidate.as_ref().map(|c| &c.name))
            .field("disabled", &inner.disabled)
            .finish()
    }
}
