//! Restoration lifecycle orchestration.
//!
//! # Responsibility
//! - Capture the on-screen edit context when the app is about to suspend.
//! - Replay a stored or handed-over context when the app relaunches.
//! - Drive the "extend then complete" handshake with the host.
//!
//! # Invariants
//! - Every failure on these paths degrades to "no restored context".
//! - The host sees "restoration complete" at most once per relaunch.
//! - Store, view and host are only touched from the caller's context; the
//!   background worker receives none of them.

use crate::activity::codec::CodecError;
use crate::activity::EditContext;
use crate::model::item::Item;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod coordinator;
mod handshake;
mod storage;

pub use coordinator::{LaunchSource, RestorationCoordinator, RestoreOutcome, SuspendOutcome};
pub use handshake::PendingRestoration;
pub use storage::{FileRestorationStorage, MemoryRestorationStorage, RestorationStorage};

/// Key under which the encoded activity record is kept in restoration storage.
pub const RESTORE_ACTIVITY_KEY: &str = "RestoreActivity";

pub type RestorationResult<T> = Result<T, RestorationError>;

/// Lifecycle phase of one coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorationPhase {
    /// No context applied; initial and post-suspend state.
    Cold,
    /// A launch source is being applied, or extended restoration is running.
    Resuming,
    /// Context applied, UI live.
    Active,
    /// Capturing context before the process may terminate.
    Suspending,
}

impl RestorationPhase {
    fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Resuming => "resuming",
            Self::Active => "active",
            Self::Suspending => "suspending",
        }
    }
}

impl Display for RestorationPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restoration lifecycle and storage errors.
#[derive(Debug)]
pub enum RestorationError {
    /// Lifecycle hook called from a phase that does not allow it.
    InvalidTransition {
        from: RestorationPhase,
        action: &'static str,
    },
    /// "Restoration started" signalled twice in one cycle.
    AlreadyExtended,
    /// "Restoration complete" signalled twice in one cycle.
    AlreadyCompleted,
    /// "Restoration complete" signalled without a prior start.
    NotExtended,
    /// Restoration storage could not be read or written.
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Record could not be encoded.
    Codec(CodecError),
}

impl Display for RestorationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {action} while restoration phase is `{from}`")
            }
            Self::AlreadyExtended => write!(f, "restoration already marked as in progress"),
            Self::AlreadyCompleted => write!(f, "restoration already marked as complete"),
            Self::NotExtended => write!(f, "restoration completed without being started"),
            Self::Storage { path, source } => {
                write!(f, "restoration storage failed at `{}`: {source}", path.display())
            }
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RestorationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CodecError> for RestorationError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// UI-layer collaborator that owns the detail screen.
pub trait EditContextView {
    /// Current on-screen edit state, or `None` when no item is shown.
    fn current_context(&self) -> Option<EditContext>;
    /// Shows `item`, entering edit mode when `editing` is set.
    fn present(&mut self, item: Item, editing: bool);
}

/// Host environment signals for asynchronous restoration.
pub trait RestorationHost {
    /// Restoration continues after launch processing returns.
    fn restoration_extended(&mut self);
    /// Restoration has finished; sent at most once per cycle.
    fn restoration_completed(&mut self);
}
