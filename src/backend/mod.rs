//! Recording backend seam and wire types.
//!
//! # Overview
//!
//! [`RecordingBackend`] is the proxy interface the tile controller uses to
//! talk to the external recording service. It is object-safe and
//! `Send + Sync` so it can be held behind an `Arc<dyn RecordingBackend>`.
//!
//! Every command is a non-blocking, fire-and-forget dispatch: a returned
//! `Ok(())` means **intent sent**, never "state changed". Actual state
//! changes only arrive back asynchronously, either as [`StatusEvent`]s on
//! the broadcast subscription or as a [`QueryResponse`] on the oneshot
//! reply handle passed to [`query_status`](RecordingBackend::query_status).
//!
//! [`sim::SimulatedRecorder`] is an in-process stand-in for the real
//! service, used by the demo binary. `MockBackend` (available under
//! `#[cfg(test)]`) records issued commands and lets tests inject events
//! deterministically.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::{broadcast, oneshot};

use crate::config::SamplingRate;

pub mod sim;

// ---------------------------------------------------------------------------
// AudioArtifact
// ---------------------------------------------------------------------------

/// Opaque handle to a completed audio recording.
///
/// The controller never looks inside the URI; only the playback engine
/// resolves it to a concrete resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact(String);

impl AudioArtifact {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_uri(&self) -> &str {
        &self.0
    }

    /// Resolve the artifact to a filesystem path, stripping a `file://`
    /// scheme when present.
    pub fn file_path(&self) -> PathBuf {
        PathBuf::from(self.0.strip_prefix("file://").unwrap_or(&self.0))
    }
}

// ---------------------------------------------------------------------------
// StatusEvent / QueryResponse
// ---------------------------------------------------------------------------

/// Asynchronous status broadcast by the recording service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// The service returned to idle without producing a new recording.
    Idle,
    /// Recording has actually started.
    Started,
    /// Recording has stopped; `artifact` addresses the captured audio when
    /// the service persisted one.
    Stopped { artifact: Option<AudioArtifact> },
    /// The service failed; recording is no longer in progress.
    Error { message: String },
}

/// Recording status as reported in a query reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Started,
    Stopped,
}

/// One-shot answer to an explicit status query, correlated by the reply
/// handle rather than by content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub status: QueryStatus,
    pub artifact: Option<AudioArtifact>,
}

// ---------------------------------------------------------------------------
// BackendError
// ---------------------------------------------------------------------------

/// Errors that can arise when dispatching a command to the backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The command could not be handed to the service at all (service gone,
    /// queue full). The tile state is unchanged when this is returned.
    #[error("recording backend unreachable: {0}")]
    Unreachable(String),
}

// ---------------------------------------------------------------------------
// RecordingBackend trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe proxy to the external recording service.
///
/// # Contract
///
/// - All three command methods are non-blocking dispatches; `Ok(())` only
///   means the command left the building.
/// - `query_status` answers at most once on `reply`; dropping the sender
///   without answering is allowed (the service may be shutting down) and
///   callers must tolerate it.
/// - `subscribe` may be called repeatedly; each call yields an independent
///   receiver for the status broadcast.
pub trait RecordingBackend: Send + Sync {
    /// Ask the service to start capturing at the given quality.
    fn start_recording(&self, quality: SamplingRate) -> Result<(), BackendError>;

    /// Ask the service to stop the in-progress capture.
    fn stop_recording(&self) -> Result<(), BackendError>;

    /// Ask for the service's current authoritative status. The answer
    /// arrives asynchronously on `reply`.
    fn query_status(&self, reply: oneshot::Sender<QueryResponse>) -> Result<(), BackendError>;

    /// Subscribe to the service's status broadcast.
    fn subscribe(&self) -> broadcast::Receiver<StatusEvent>;
}

// Compile-time assertion: Arc<dyn RecordingBackend> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: std::sync::Arc<dyn RecordingBackend>) {}
};

// ---------------------------------------------------------------------------
// MockBackend  (test-only)
// ---------------------------------------------------------------------------

/// A command issued through the [`MockBackend`].
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuedCommand {
    Start(SamplingRate),
    Stop,
}

/// Test double that records issued commands and lets tests inject
/// [`StatusEvent`]s and queue a [`QueryResponse`].
#[cfg(test)]
pub struct MockBackend {
    commands: std::sync::Mutex<Vec<IssuedCommand>>,
    status_tx: broadcast::Sender<StatusEvent>,
    query_response: std::sync::Mutex<Option<QueryResponse>>,
    held_replies: std::sync::Mutex<Vec<oneshot::Sender<QueryResponse>>>,
    subscriptions: std::sync::atomic::AtomicUsize,
    unreachable: bool,
    hold_replies: bool,
}

#[cfg(test)]
impl MockBackend {
    /// A backend that accepts every command.
    pub fn new() -> Self {
        let (status_tx, _) = broadcast::channel(16);
        Self {
            commands: std::sync::Mutex::new(Vec::new()),
            status_tx,
            query_response: std::sync::Mutex::new(None),
            held_replies: std::sync::Mutex::new(Vec::new()),
            subscriptions: std::sync::atomic::AtomicUsize::new(0),
            unreachable: false,
            hold_replies: false,
        }
    }

    /// A backend whose every dispatch fails with
    /// [`BackendError::Unreachable`].
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new()
        }
    }

    /// A backend that accepts queries but holds the reply handles instead
    /// of answering, so tests choose when (and whether) a reply lands.
    pub fn holding_query_replies() -> Self {
        Self {
            hold_replies: true,
            ..Self::new()
        }
    }

    /// Take the oldest held query reply handle, if any.
    pub fn take_held_reply(&self) -> Option<oneshot::Sender<QueryResponse>> {
        let mut held = self.held_replies.lock().unwrap();
        if held.is_empty() {
            None
        } else {
            Some(held.remove(0))
        }
    }

    /// Commands issued so far, in dispatch order.
    pub fn issued(&self) -> Vec<IssuedCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Queue the answer the next `query_status` call will deliver.
    pub fn queue_query_response(&self, response: QueryResponse) {
        *self.query_response.lock().unwrap() = Some(response);
    }

    /// Publish a status event to all subscribers.
    pub fn publish(&self, event: StatusEvent) {
        let _ = self.status_tx.send(event);
    }

    /// Number of `subscribe` calls observed.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl RecordingBackend for MockBackend {
    fn start_recording(&self, quality: SamplingRate) -> Result<(), BackendError> {
        if self.unreachable {
            return Err(BackendError::Unreachable("mock is unreachable".into()));
        }
        self.commands
            .lock()
            .unwrap()
            .push(IssuedCommand::Start(quality));
        Ok(())
    }

    fn stop_recording(&self) -> Result<(), BackendError> {
        if self.unreachable {
            return Err(BackendError::Unreachable("mock is unreachable".into()));
        }
        self.commands.lock().unwrap().push(IssuedCommand::Stop);
        Ok(())
    }

    fn query_status(&self, reply: oneshot::Sender<QueryResponse>) -> Result<(), BackendError> {
        if self.unreachable {
            return Err(BackendError::Unreachable("mock is unreachable".into()));
        }
        if self.hold_replies {
            self.held_replies.lock().unwrap().push(reply);
            return Ok(());
        }
        if let Some(response) = self.query_response.lock().unwrap().take() {
            let _ = reply.send(response);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.subscriptions
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.status_tx.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- AudioArtifact ---

    #[test]
    fn artifact_file_path_strips_file_scheme() {
        let artifact = AudioArtifact::new("file:///tmp/clip.wav");
        assert_eq!(artifact.file_path(), PathBuf::from("/tmp/clip.wav"));
    }

    #[test]
    fn artifact_plain_path_passes_through() {
        let artifact = AudioArtifact::new("/tmp/clip.wav");
        assert_eq!(artifact.file_path(), PathBuf::from("/tmp/clip.wav"));
        assert_eq!(artifact.as_uri(), "/tmp/clip.wav");
    }

    // ---- MockBackend ---

    #[test]
    fn mock_records_commands_in_order() {
        let backend = MockBackend::new();
        backend.start_recording(SamplingRate::High).unwrap();
        backend.stop_recording().unwrap();
        assert_eq!(
            backend.issued(),
            vec![IssuedCommand::Start(SamplingRate::High), IssuedCommand::Stop]
        );
    }

    #[test]
    fn unreachable_mock_fails_every_dispatch() {
        let backend = MockBackend::unreachable();
        assert!(backend.start_recording(SamplingRate::Low).is_err());
        assert!(backend.stop_recording().is_err());
        let (tx, _rx) = oneshot::channel();
        assert!(backend.query_status(tx).is_err());
        assert!(backend.issued().is_empty());
    }

    #[tokio::test]
    async fn mock_query_answers_on_the_reply_handle() {
        let backend = MockBackend::new();
        backend.queue_query_response(QueryResponse {
            status: QueryStatus::Started,
            artifact: None,
        });

        let (tx, rx) = oneshot::channel();
        backend.query_status(tx).unwrap();
        let response = rx.await.unwrap();
        assert_eq!(response.status, QueryStatus::Started);
    }

    #[tokio::test]
    async fn holding_mock_parks_the_reply_handle() {
        let backend = MockBackend::holding_query_replies();
        let (tx, mut rx) = oneshot::channel();
        backend.query_status(tx).unwrap();

        // No answer until the test releases the held handle.
        assert!(rx.try_recv().is_err());
        let held = backend.take_held_reply().unwrap();
        held.send(QueryResponse {
            status: QueryStatus::Idle,
            artifact: None,
        })
        .unwrap();
        assert_eq!(rx.await.unwrap().status, QueryStatus::Idle);
    }

    #[tokio::test]
    async fn mock_publishes_to_subscribers() {
        let backend = MockBackend::new();
        let mut rx = backend.subscribe();
        backend.publish(StatusEvent::Started);
        assert_eq!(rx.recv().await.unwrap(), StatusEvent::Started);
        assert_eq!(backend.subscription_count(), 1);
    }
}
