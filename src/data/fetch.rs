use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Sequence number attached to each requested load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchToken(u64);

type Delivery<T> = (FetchToken, anyhow::Result<T>);

/// Runs loads on background threads and applies only the most recently requested one.
///
/// Results from superseded requests are dropped whenever they arrive, so a slow
/// first load can never overwrite a newer dataset.
pub struct Fetcher<T> {
    tx: Sender<Delivery<T>>,
    rx: Receiver<Delivery<T>>,
    issued: u64,
    latest: Option<FetchToken>,
}

impl<T: Send + 'static> Fetcher<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            issued: 0,
            latest: None,
        }
    }

    pub fn request<F>(&mut self, load: F) -> FetchToken
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        self.issued += 1;
        let token = FetchToken(self.issued);
        self.latest = Some(token);

        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send((token, load()));
        });

        debug!(token = token.0, "fetch requested");
        token
    }

    /// Forgets the outstanding request; its result will be discarded.
    pub fn cancel(&mut self) {
        self.latest = None;
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Non-blocking poll for the latest request's result.
    pub fn poll(&mut self) -> Option<anyhow::Result<T>> {
        loop {
            match self.rx.try_recv() {
                Ok(delivery) => {
                    if let Some(result) = self.accept(delivery) {
                        return Some(result);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Blocks up to `timeout` for the latest request's result.
    pub fn wait(&mut self, timeout: Duration) -> Option<anyhow::Result<T>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(delivery) => {
                    if let Some(result) = self.accept(delivery) {
                        return Some(result);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&mut self, (token, result): Delivery<T>) -> Option<anyhow::Result<T>> {
        if self.latest == Some(token) {
            self.latest = None;
            Some(result)
        } else {
            debug!(token = token.0, "discarding stale fetch result");
            None
        }
    }
}

impl<T: Send + 'static> Default for Fetcher<T> {
    fn default() -> Self {
        Self::new()
    }
}
