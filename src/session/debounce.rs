use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Coalesces bursts of calls into one run of the latest task after a quiet
/// period. Replaced tasks never start. Tasks that do start run one at a time.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Mutex<Option<CancellationToken>>,
    serial: Arc<tokio::sync::Mutex<()>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: Mutex::new(None),
            serial: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Schedules `task`, replacing whatever was scheduled before.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().unwrap().replace(token.clone()) {
            previous.cancel();
        }

        let quiet = self.quiet;
        let serial = self.serial.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(quiet) => {}
            }
            let _guard = serial.lock().await;
            // A newer task may have been scheduled while an earlier run held
            // the guard.
            if token.is_cancelled() {
                return;
            }
            task().await;
        });
    }

    /// Drops the scheduled task, if it has not started yet.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().unwrap().take() {
            token.cancel();
        }
    }
}
