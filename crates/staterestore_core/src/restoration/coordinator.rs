//! Restoration state machine.
//!
//! `Cold -> Resuming -> Active` on relaunch, `Active -> Suspending -> Cold`
//! on suspend. An extended handshake holds the coordinator in `Resuming`
//! until it completes, so suspend and relaunch wait for it. The handshake
//! resets on each relaunch.

use super::handshake::{HandshakeState, PendingRestoration};
use super::{
    EditContextView, RestorationError, RestorationHost, RestorationPhase, RestorationResult,
    RestorationStorage, RESTORE_ACTIVITY_KEY,
};
use crate::activity::codec::ActivityCodec;
use crate::activity::ActivityRecord;
use crate::store::ItemStore;
use log::{debug, error, info, warn};

/// Where a relaunch takes its context from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchSource {
    /// Nothing to restore; also used for a warm return to foreground.
    Fresh,
    /// Live record handed over without a cold restart.
    Continuation(ActivityRecord),
    /// Archive bytes supplied by the host.
    Archive(Vec<u8>),
    /// Archive stored under `RESTORE_ACTIVITY_KEY` in restoration storage.
    StoredArchive,
}

impl LaunchSource {
    /// Picks the live continuation when present, else the stored archive.
    pub fn resolve(continuation: Option<ActivityRecord>) -> Self {
        continuation.map_or(Self::StoredArchive, Self::Continuation)
    }
}

/// Result of applying a record to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The item was presented again.
    Restored { identifier: String, editing: bool },
    /// No usable context; UI and store untouched.
    NothingToRestore,
}

/// Result of a suspend capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendOutcome {
    /// Record encoded and stored.
    Archived { was_editing: bool },
    /// No item on screen; any stale archive was cleared.
    NothingCaptured,
    /// Capture happened but could not be stored.
    WriteFailed,
}

/// Coordinates capture and replay of edit context across relaunches.
pub struct RestorationCoordinator<S: RestorationStorage> {
    codec: ActivityCodec,
    storage: S,
    phase: RestorationPhase,
    handshake: HandshakeState,
}

impl<S: RestorationStorage> RestorationCoordinator<S> {
    pub fn new(codec: ActivityCodec, storage: S) -> Self {
        Self {
            codec,
            storage,
            phase: RestorationPhase::Cold,
            handshake: HandshakeState::Idle,
        }
    }

    pub fn phase(&self) -> RestorationPhase {
        self.phase
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Snapshots the current on-screen edit context, if any.
    pub fn capture_now(
        &self,
        store: &ItemStore,
        view: &dyn EditContextView,
    ) -> Option<ActivityRecord> {
        view.current_context()
            .map(|context| ActivityRecord::capture(store, &context))
    }

    /// Presents `record` again when its target still exists in `store`.
    pub fn apply_restored(
        &self,
        record: &ActivityRecord,
        store: &ItemStore,
        view: &mut dyn EditContextView,
    ) -> RestoreOutcome {
        let Some(identifier) = record.target_identifier.as_deref() else {
            debug!("event=restoration_apply module=restoration status=skipped reason=no_target");
            return RestoreOutcome::NothingToRestore;
        };
        let Ok(baseline) = store.item_by_identifier(identifier) else {
            info!("event=restoration_apply module=restoration status=skipped reason=unknown_target");
            return RestoreOutcome::NothingToRestore;
        };

        let item = record.restored_item(baseline);
        view.present(item, record.was_editing);
        info!(
            "event=restoration_apply module=restoration status=ok editing={}",
            record.was_editing
        );
        RestoreOutcome::Restored {
            identifier: identifier.to_string(),
            editing: record.was_editing,
        }
    }

    /// Handles a (re)launch: decodes `source` and applies it.
    ///
    /// Decode and storage failures end in `Active` with nothing restored.
    pub fn relaunch(
        &mut self,
        source: LaunchSource,
        store: &ItemStore,
        view: &mut dyn EditContextView,
    ) -> RestorationResult<RestoreOutcome> {
        self.require_phase(RestorationPhase::Cold, "relaunch")?;
        self.handshake = HandshakeState::Idle;
        self.phase = RestorationPhase::Resuming;

        let outcome = match self.record_from(source) {
            Some(record) => self.apply_restored(&record, store, view),
            None => RestoreOutcome::NothingToRestore,
        };

        self.phase = RestorationPhase::Active;
        Ok(outcome)
    }

    /// Handles imminent backgrounding: captures, encodes and stores context.
    pub fn suspend(
        &mut self,
        store: &ItemStore,
        view: &dyn EditContextView,
    ) -> RestorationResult<SuspendOutcome> {
        self.require_phase(RestorationPhase::Active, "suspend")?;
        self.phase = RestorationPhase::Suspending;

        let outcome = match self.capture_now(store, view) {
            Some(record) => match self.archive(&record) {
                Ok(()) => SuspendOutcome::Archived {
                    was_editing: record.was_editing,
                },
                Err(err) => {
                    error!(
                        "event=restoration_suspend module=restoration status=error error_code=archive_failed error={}",
                        err
                    );
                    SuspendOutcome::WriteFailed
                }
            },
            None => {
                if let Err(err) = self.storage.remove(RESTORE_ACTIVITY_KEY) {
                    warn!(
                        "event=restoration_suspend module=restoration status=degraded error_code=clear_failed error={}",
                        err
                    );
                }
                SuspendOutcome::NothingCaptured
            }
        };

        info!(
            "event=restoration_suspend module=restoration status=ok outcome={:?}",
            outcome
        );
        self.phase = RestorationPhase::Cold;
        Ok(outcome)
    }

    /// Tells the host restoration continues past launch processing.
    ///
    /// Only valid from `Active`; moves back to `Resuming` until
    /// `mark_restoration_completed`.
    pub fn mark_restoration_started(
        &mut self,
        host: &mut dyn RestorationHost,
    ) -> RestorationResult<()> {
        match self.handshake {
            HandshakeState::Idle => {
                self.require_phase(RestorationPhase::Active, "extend restoration")?;
                self.handshake = HandshakeState::Extended;
                self.phase = RestorationPhase::Resuming;
                host.restoration_extended();
                debug!("event=restoration_extend module=restoration status=ok");
                Ok(())
            }
            HandshakeState::Extended => Err(RestorationError::AlreadyExtended),
            HandshakeState::Completed => Err(RestorationError::AlreadyCompleted),
        }
    }

    /// Tells the host restoration is finished. Allowed once per relaunch.
    pub fn mark_restoration_completed(
        &mut self,
        host: &mut dyn RestorationHost,
    ) -> RestorationResult<()> {
        match self.handshake {
            HandshakeState::Extended => {
                self.handshake = HandshakeState::Completed;
                self.phase = RestorationPhase::Active;
                host.restoration_completed();
                info!("event=restoration_complete module=restoration status=ok");
                Ok(())
            }
            HandshakeState::Completed => Err(RestorationError::AlreadyCompleted),
            HandshakeState::Idle => Err(RestorationError::NotExtended),
        }
    }

    /// Extends restoration and runs `work` on a background thread.
    ///
    /// `work` must not need the store or the view; it gets neither.
    pub fn extend_restoration<T, F>(
        &mut self,
        host: &mut dyn RestorationHost,
        work: F,
    ) -> RestorationResult<PendingRestoration<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.mark_restoration_started(host)?;
        Ok(PendingRestoration::spawn(work))
    }

    /// Joins the background work on the calling context, then completes.
    ///
    /// Blocks until the worker finishes. Callers on a UI loop should poll
    /// `PendingRestoration::is_finished` first. Completion is signalled even
    /// when the worker panicked; the result is `None` in that case.
    pub fn complete_restoration<T: Send + 'static>(
        &mut self,
        pending: PendingRestoration<T>,
        host: &mut dyn RestorationHost,
    ) -> RestorationResult<Option<T>> {
        let value = pending.join();
        self.mark_restoration_completed(host)?;
        Ok(value)
    }

    fn record_from(&self, source: LaunchSource) -> Option<ActivityRecord> {
        match source {
            LaunchSource::Fresh => None,
            LaunchSource::Continuation(record) => Some(record),
            LaunchSource::Archive(bytes) => self.codec.decode(&bytes),
            LaunchSource::StoredArchive => match self.storage.read(RESTORE_ACTIVITY_KEY) {
                Ok(Some(bytes)) => self.codec.decode(&bytes),
                Ok(None) => None,
                Err(err) => {
                    warn!(
                        "event=restoration_relaunch module=restoration status=degraded error_code=read_failed error={}",
                        err
                    );
                    None
                }
            },
        }
    }

    fn archive(&mut self, record: &ActivityRecord) -> RestorationResult<()> {
        let bytes = self.codec.encode(record)?;
        self.storage.write(RESTORE_ACTIVITY_KEY, &bytes)
    }

    fn require_phase(
        &self,
        expected: RestorationPhase,
        action: &'static str,
    ) -> RestorationResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(RestorationError::InvalidTransition {
                from: self.phase,
                action,
            })
        }
    }
}
