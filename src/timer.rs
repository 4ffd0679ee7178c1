//! Auto-stop timer.
//!
//! [`AutoStopTimer`] holds at most one pending delayed event, backed by an
//! abortable tokio task. Scheduling while a timer is pending replaces it;
//! cancelling (or dropping the timer) aborts the task so the event never
//! fires. The fire itself is just a [`TileEvent::AutoStopElapsed`] posted
//! onto the controller's queue; whether it means anything is decided by
//! the controller when the event is processed.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::tile::TileEvent;

/// Single-purpose, replace-on-schedule delayed event.
#[derive(Default)]
pub struct AutoStopTimer {
    pending: Option<JoinHandle<()>>,
}

impl AutoStopTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer. A previously pending timer is replaced.
    pub fn schedule(&mut self, delay: Duration, events: mpsc::Sender<TileEvent>) {
        self.cancel();
        // Anchor the deadline at schedule time, not at the task's first
        // poll; otherwise a paused clock advanced before the spawn is
        // polled would push the fire past T+D.
        let deadline = tokio::time::Instant::now() + delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Queue gone means the controller was torn down first.
            let _ = events.send(TileEvent::AutoStopElapsed).await;
        }));
    }

    /// Abort the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a timer is armed and has not yet fired.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutoStopTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
