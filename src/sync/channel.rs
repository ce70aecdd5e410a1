use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ChannelError;

/// Shared flag that aborts a pending receive from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How long a receive may wait, and how it can be interrupted.
#[derive(Debug, Clone)]
pub struct ReceiveOptions {
    /// Give up after this long. `None` waits until cancelled or closed.
    pub timeout: Option<Duration>,
    /// Granularity at which cancellation and the deadline are checked.
    pub poll_interval: Duration,
    pub cancel: CancelToken,
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        ReceiveOptions {
            timeout: None,
            poll_interval: Duration::from_millis(100),
            cancel: CancelToken::new(),
        }
    }
}

/// Reliable, ordered, message-oriented link to the peer instance.
pub trait Channel: Send {
    /// Send one complete message.
    fn send(&mut self, payload: &[u8]) -> Result<(), ChannelError>;

    /// Wait for the next complete message.
    fn receive(&mut self, options: &ReceiveOptions) -> Result<Vec<u8>, ChannelError>;
}

/// Run `attempt` repeatedly with a bounded wait until it yields a value, the
/// deadline passes, or the token is cancelled.
pub(crate) fn poll_until<T>(
    options: &ReceiveOptions,
    mut attempt: impl FnMut(Duration) -> Result<Option<T>, ChannelError>,
) -> Result<T, ChannelError> {
    let started = Instant::now();
    let slice = options.poll_interval.max(Duration::from_millis(1));

    loop {
        if options.cancel.is_cancelled() {
            return Err(ChannelError::Cancelled);
        }

        let wait = match options.timeout {
            Some(limit) => {
                let elapsed = started.elapsed();
                if elapsed >= limit {
                    return Err(ChannelError::Timeout(limit));
                }
                slice.min(limit - elapsed)
            }
            None => slice,
        };

        if let Some(value) = attempt(wait)? {
            return Ok(value);
        }
    }
}

/// In-process channel backed by a pair of `mpsc` queues.
#[derive(Debug)]
pub struct MemoryChannel {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl MemoryChannel {
    /// Two connected ends: what one sends, the other receives.
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let (a_tx, b_rx) = mpsc::channel();
        let (b_tx, a_rx) = mpsc::channel();
        (
            MemoryChannel { tx: a_tx, rx: a_rx },
            MemoryChannel { tx: b_tx, rx: b_rx },
        )
    }
}

impl Channel for MemoryChannel {
    fn send(&mut self, payload: &[u8]) -> Result<(), ChannelError> {
        self.tx
            .send(payload.to_vec())
            .map_err(|_| ChannelError::Closed)
    }

    fn receive(&mut self, options: &ReceiveOptions) -> Result<Vec<u8>, ChannelError> {
        poll_until(options, |wait| match self.rx.recv_timeout(wait) {
            Ok(payload) => Ok(Some(payload)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ChannelError::Closed),
        })
    }
}
