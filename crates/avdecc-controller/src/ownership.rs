// ── Acquire/lock ownership state ──
//
// Two independent state machines driven by the orchestrator from
// ACQUIRE_ENTITY / LOCK_ENTITY responses. The core only records the
// states; policy about who may acquire lives above.

use serde::{Deserialize, Serialize};

/// ACQUIRE_ENTITY state of an entity, from this controller's point of
/// view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireState {
    /// Not yet queried.
    Undefined,
    NotAcquired,
    AcquireInProgress,
    /// Acquired by this controller.
    Acquired,
    AcquiredByOther,
    ReleaseInProgress,
}

impl Default for AcquireState {
    fn default() -> Self {
        Self::Undefined
    }
}

/// LOCK_ENTITY state, mirroring [`AcquireState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Undefined,
    NotLocked,
    LockInProgress,
    /// Locked by this controller.
    Locked,
    LockedByOther,
    UnlockInProgress,
}

impl Default for LockState {
    fn default() -> Self {
        Self::Undefined
    }
}
