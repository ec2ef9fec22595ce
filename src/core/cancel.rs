/*!
 * Lifecycle Cancellation
 *
 * `stop()` bumps an epoch. Every remediation pass captures the epoch it
 * started under and re-checks it at each resumption point, so a pass that
 * was suspended when the monitor stopped abandons its remaining bursts.
 * Passes started after a stop run normally because they capture the new epoch.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared cancellation epoch
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    epoch: Arc<AtomicU64>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every pass started before this call
    pub fn cancel_all(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Capture the current epoch for a new pass
    pub fn guard(&self) -> PassGuard {
        PassGuard {
            token: self.clone(),
            epoch: self.epoch.load(Ordering::Acquire),
        }
    }
}

/// Per-pass view of the cancellation epoch
#[derive(Debug, Clone)]
pub struct PassGuard {
    token: CancelToken,
    epoch: u64,
}

impl PassGuard {
    /// A guard that is never cancelled (standalone use of the dispatcher)
    pub fn detached() -> Self {
        CancelToken::new().guard()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.epoch.load(Ordering::Acquire) != self.epoch
    }
}
