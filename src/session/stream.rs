use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

/// One logical stream of requests where only the newest one matters.
///
/// Starting a request cancels the token of the previous one, so a response
/// that arrives late can tell it has been superseded.
#[derive(Debug)]
pub struct RequestStream {
    name: &'static str,
    current: Mutex<Option<CancellationToken>>,
}

#[derive(Debug, Clone)]
pub struct RequestTicket {
    token: CancellationToken,
}

impl RequestStream {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: Mutex::new(None),
        }
    }

    pub fn begin(&self) -> RequestTicket {
        let token = CancellationToken::new();
        let previous = self.current.lock().unwrap().replace(token.clone());
        if let Some(previous) = previous {
            if !previous.is_cancelled() {
                log::debug!("Superseding in-flight {} request", self.name);
            }
            previous.cancel();
        }
        RequestTicket { token }
    }

    /// Cancels the in-flight request, if any. Safe to call repeatedly.
    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().unwrap().take() {
            token.cancel();
        }
    }
}

impl RequestTicket {
    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once a newer request replaced this one.
    pub async fn superseded(&self) {
        self.token.cancelled().await
    }
}
