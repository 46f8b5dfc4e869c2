//! Cooperative cancellation for in-flight exchanges.
//!
//! An [`AbortSignal`] is the registration hook through which a caller can
//! cancel an exchange after handing the request to the pipeline: the caller
//! keeps a clone, the request carries another, and the terminal middleware
//! races the signal against the network exchange. Whichever side settles
//! first wins; the loser is discarded.
//!
//! ```rust
//! use courier_core::AbortSignal;
//!
//! let signal = AbortSignal::new();
//! let for_request = signal.clone();
//!
//! signal.abort();
//! assert!(for_request.is_aborted());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// A signal used to cancel an in-flight exchange.
///
/// All clones observe the same state. Triggering is idempotent, and a signal
/// aborted before anyone waits on it still completes waiters immediately, so
/// registration order does not matter.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    /// Whether the abort has been triggered
    triggered: Arc<AtomicBool>,

    /// Broadcast sender for notifying waiters
    sender: broadcast::Sender<()>,
}

impl AbortSignal {
    /// Creates a new, untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Triggers the abort.
    ///
    /// Safe to call multiple times; only the first call has an effect.
    pub fn abort(&self) {
        // Only trigger once
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // Ignore error if no receivers
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` if the abort has been triggered.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Completes when the abort is triggered.
    ///
    /// Completes immediately if the signal was already triggered. If every
    /// clone of the signal is dropped without an abort, this future never
    /// completes - it must only be used inside a race against the exchange.
    pub async fn aborted(&self) {
        // The flag is set before the broadcast in `abort`, so checking it
        // after subscribing cannot miss a trigger.
        let mut receiver = self.sender.subscribe();
        if self.is_aborted() {
            return;
        }

        loop {
            match receiver.recv().await {
                Ok(()) => return,
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if self.is_aborted() {
                        return;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    // Senders gone without a trigger; stay pending forever.
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}
