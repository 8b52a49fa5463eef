//! Background work attached to an extended restoration.

use log::error;
use std::thread::JoinHandle;

/// Completion state of the host handshake for one relaunch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HandshakeState {
    Idle,
    Extended,
    Completed,
}

/// Handle to follow-up initialization running off the main context.
///
/// Must be handed back to `RestorationCoordinator::complete_restoration`
/// from the main context; the worker result is only observed there.
#[derive(Debug)]
#[must_use = "pass the handle to complete_restoration, or the host never sees completion"]
pub struct PendingRestoration<T> {
    worker: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> PendingRestoration<T> {
    pub(super) fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            worker: Some(std::thread::spawn(work)),
        }
    }

    /// Waits for the worker on the calling thread, blocking until it returns.
    ///
    /// Returns `None` when the worker panicked.
    pub(super) fn join(mut self) -> Option<T> {
        let worker = self.worker.take()?;
        match worker.join() {
            Ok(value) => Some(value),
            Err(_) => {
                error!(
                    "event=restoration_worker module=restoration status=error error_code=worker_panicked"
                );
                None
            }
        }
    }

    /// Whether completing now would return without blocking.
    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map_or(true, |worker| worker.is_finished())
    }
}

impl<T> Drop for PendingRestoration<T> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            error!(
                "event=restoration_complete module=restoration status=error error_code=completion_missing"
            );
        }
    }
}
