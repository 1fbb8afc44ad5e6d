use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

use tokio_util::sync::CancellationToken;

/// Cancellation-capable handle shared between the runner and the interrupt
/// path. The interrupt side only flips the token; killing the child and
/// printing happen on the runner's normal control path.
///
/// Tokens are armed per run: `begin` replaces the current token, so a
/// termination request no run consumed cannot leak into the next scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    cancel: Arc<Mutex<CancellationToken>>,
    active: Arc<AtomicBool>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the runner to kill the child and stop. Safe to call from any
    /// task, any number of times.
    pub fn request_termination(&self) {
        self.lock_token().cancel();
    }

    /// Whether a child process is currently being streamed.
    pub fn is_scanning(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock_token().is_cancelled()
    }

    /// Arm a fresh token for one run and mark the scan as in flight for the
    /// lifetime of the returned guard.
    pub(crate) fn begin(&self) -> (CancellationToken, ActiveGuard<'_>) {
        let token = CancellationToken::new();
        *self.lock_token() = token.clone();
        self.active.store(true, Ordering::SeqCst);
        (token, ActiveGuard(&self.active))
    }

    fn lock_token(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub(crate) struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_request_is_observable() {
        let session = ScanSession::new();
        let handle = session.clone();
        let (token, _guard) = session.begin();
        assert!(!session.is_cancelled());
        handle.request_termination();
        assert!(session.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[test]
    fn begin_clears_a_stale_termination_request() {
        let session = ScanSession::new();
        session.request_termination();
        assert!(session.is_cancelled());

        let (token, _guard) = session.begin();
        assert!(!token.is_cancelled());
        assert!(!session.is_cancelled());
    }

    #[test]
    fn begin_guard_tracks_the_in_flight_window() {
        let session = ScanSession::new();
        assert!(!session.is_scanning());
        {
            let (_token, _guard) = session.begin();
            assert!(session.is_scanning());
        }
        assert!(!session.is_scanning());
    }
}
