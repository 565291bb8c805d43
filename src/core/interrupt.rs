//! Cooperative interruption for blocking waits.
//!
//! A booking thread may block for a driver or sleep through a simulated
//! pickup/drive. An [`Interrupt`] is the escape hatch: firing it wakes every
//! waiter at once. The underlying channel never carries a message; firing
//! drops its only sender and the disconnect is what wakes receivers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::debug;

use super::error::Interrupted;

struct Signal {
    fired: AtomicBool,
    tx: Mutex<Option<Sender<()>>>,
    rx: Receiver<()>,
}

/// Cloneable, one-shot interruption token.
#[derive(Clone)]
pub struct Interrupt {
    signal: Arc<Signal>,
}

impl Interrupt {
    /// Create a token that has not fired.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            signal: Arc::new(Signal {
                fired: AtomicBool::new(false),
                tx: Mutex::new(Some(tx)),
                rx,
            }),
        }
    }

    /// Fire the token. Idempotent.
    pub fn interrupt(&self) {
        if self.signal.fired.swap(true, Ordering::AcqRel) {
            return;
        }
        self.signal.tx.lock().take();
        debug!("interrupt fired");
    }

    /// Whether [`interrupt`](Self::interrupt) has been called.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.signal.fired.load(Ordering::Acquire)
    }

    /// Sleep for `duration`, returning early with [`Interrupted`] if the token fires.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if the token fired before or during the sleep.
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        if self.is_interrupted() {
            return Err(Interrupted);
        }
        match self.signal.rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(Interrupted),
        }
    }

    /// Receiver that becomes ready (disconnected) once the token fires.
    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.signal.rx
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupt")
            .field("fired", &self.is_interrupted())
            .finish()
    }
}
