//! In-process simulated recording service.
//!
//! The real recording service is a separate component; this module stands
//! in for it so the demo binary (and integration-style tests) have a live
//! counterpart speaking the same protocol: commands in over an mpsc
//! channel, status out over a broadcast channel, query answers on a
//! oneshot reply handle.
//!
//! The simulator does not capture audio. "Stopping a recording" hands back
//! a pre-configured clip URI as the artifact, which is all the tile
//! controller ever needs from it.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::config::SamplingRate;

use super::{
    AudioArtifact, BackendError, QueryResponse, QueryStatus, RecordingBackend, StatusEvent,
};

// ---------------------------------------------------------------------------
// ServiceCommand
// ---------------------------------------------------------------------------

enum ServiceCommand {
    Start(SamplingRate),
    Stop,
    Query(oneshot::Sender<QueryResponse>),
}

// ---------------------------------------------------------------------------
// SimulatedRecorder
// ---------------------------------------------------------------------------

/// Service task emulating the external recorder.
///
/// Spawn with [`SimulatedRecorder::spawn`]; the returned handle implements
/// [`RecordingBackend`].
pub struct SimulatedRecorder {
    commands: mpsc::Receiver<ServiceCommand>,
    status_tx: broadcast::Sender<StatusEvent>,
    clip_uri: String,
    recording: bool,
    last_artifact: Option<AudioArtifact>,
}

/// Cloneable front-end to a running [`SimulatedRecorder`].
#[derive(Clone)]
pub struct SimulatedRecorderHandle {
    commands: mpsc::Sender<ServiceCommand>,
    status_tx: broadcast::Sender<StatusEvent>,
}

impl SimulatedRecorder {
    /// Spawn the service task. `clip_uri` is the artifact every completed
    /// recording will address.
    pub fn spawn(clip_uri: impl Into<String>) -> SimulatedRecorderHandle {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (status_tx, _) = broadcast::channel(16);

        let service = Self {
            commands: command_rx,
            status_tx: status_tx.clone(),
            clip_uri: clip_uri.into(),
            recording: false,
            last_artifact: None,
        };
        tokio::spawn(service.run());

        SimulatedRecorderHandle {
            commands: command_tx,
            status_tx,
        }
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                ServiceCommand::Start(quality) => {
                    if !self.recording {
                        self.recording = true;
                        log::info!("sim recorder: recording at {} Hz", quality.hertz());
                        let _ = self.status_tx.send(StatusEvent::Started);
                    }
                }

                ServiceCommand::Stop => {
                    if self.recording {
                        self.recording = false;
                        self.last_artifact = Some(AudioArtifact::new(self.clip_uri.clone()));
                        log::info!("sim recorder: stopped, artifact {}", self.clip_uri);
                        let _ = self.status_tx.send(StatusEvent::Stopped {
                            artifact: self.last_artifact.clone(),
                        });
                    }
                }

                ServiceCommand::Query(reply) => {
                    let status = if self.recording {
                        QueryStatus::Started
                    } else {
                        QueryStatus::Idle
                    };
                    let _ = reply.send(QueryResponse {
                        status,
                        artifact: self.last_artifact.clone(),
                    });
                }
            }
        }
        log::debug!("sim recorder: command channel closed, shutting down");
    }
}

impl RecordingBackend for SimulatedRecorderHandle {
    fn start_recording(&self, quality: SamplingRate) -> Result<(), BackendError> {
        self.commands
            .try_send(ServiceCommand::Start(quality))
            .map_err(|e| BackendError::Unreachable(e.to_string()))
    }

    fn stop_recording(&self) -> Result<(), BackendError> {
        self.commands
            .try_send(ServiceCommand::Stop)
            .map_err(|e| BackendError::Unreachable(e.to_string()))
    }

    fn query_status(&self, reply: oneshot::Sender<QueryResponse>) -> Result<(), BackendError> {
        self.commands
            .try_send(ServiceCommand::Query(reply))
            .map_err(|e| BackendError::Unreachable(e.to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.status_tx.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_broadcasts_started_once() {
        let handle = SimulatedRecorder::spawn("/tmp/clip.wav");
        let mut status = handle.subscribe();

        handle.start_recording(SamplingRate::Medium).unwrap();
        // A second start while recording is swallowed by the service.
        handle.start_recording(SamplingRate::Medium).unwrap();
        handle.stop_recording().unwrap();

        assert_eq!(status.recv().await.unwrap(), StatusEvent::Started);
        match status.recv().await.unwrap() {
            StatusEvent::Stopped { artifact } => {
                assert_eq!(artifact, Some(AudioArtifact::new("/tmp/clip.wav")));
            }
            other => panic!("expected Stopped, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn query_reports_recording_axis_and_artifact() {
        let handle = SimulatedRecorder::spawn("/tmp/clip.wav");
        let mut status = handle.subscribe();

        let (tx, rx) = oneshot::channel();
        handle.query_status(tx).unwrap();
        let response = rx.await.unwrap();
        assert_eq!(response.status, QueryStatus::Idle);
        assert_eq!(response.artifact, None);

        handle.start_recording(SamplingRate::Low).unwrap();
        assert_eq!(status.recv().await.unwrap(), StatusEvent::Started);

        let (tx, rx) = oneshot::channel();
        handle.query_status(tx).unwrap();
        assert_eq!(rx.await.unwrap().status, QueryStatus::Started);

        handle.stop_recording().unwrap();
        assert!(matches!(
            status.recv().await.unwrap(),
            StatusEvent::Stopped { .. }
        ));

        let (tx, rx) = oneshot::channel();
        handle.query_status(tx).unwrap();
        let response = rx.await.unwrap();
        assert_eq!(response.status, QueryStatus::Idle);
        assert!(response.artifact.is_some());
    }

    #[tokio::test]
    async fn stop_without_start_is_silent() {
        let handle = SimulatedRecorder::spawn("/tmp/clip.wav");
        let mut status = handle.subscribe();

        handle.stop_recording().unwrap();

        // Force the service to process the stop, then confirm nothing was
        // broadcast by round-tripping a query.
        let (tx, rx) = oneshot::channel();
        handle.query_status(tx).unwrap();
        rx.await.unwrap();
        assert!(matches!(
            status.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
