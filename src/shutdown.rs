/// Cooperative shutdown signal shared by the scheduler, the delivery pool
/// and the query endpoint.
///
/// Cloning yields another handle to the same signal. `wait_timeout` lets
/// the scheduler sleep between ticks while still waking immediately when
/// shutdown is triggered. SIGINT and SIGTERM trigger it once
/// `install_signal_handler` has run; a second signal exits at once.

use std::process;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// What a received termination signal should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First signal: stop gracefully.
    Drain,
    /// Repeated signal while draining: exit without waiting.
    Exit,
}

#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (flag, condvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a termination signal. The first one triggers shutdown.
    pub fn on_signal(&self) -> SignalAction {
        if self.is_triggered() {
            return SignalAction::Exit;
        }
        self.trigger();
        SignalAction::Drain
    }

    /// Routes SIGINT and SIGTERM to this handle. Call once per process.
    pub fn install_signal_handler(&self) -> Result<(), ctrlc::Error> {
        let shutdown = self.clone();
        ctrlc::set_handler(move || match shutdown.on_signal() {
            SignalAction::Drain => {
                info!("shutdown signal received, finishing the current pass");
            }
            SignalAction::Exit => {
                warn!("second shutdown signal, exiting now");
                process::exit(130);
            }
        })
    }

    /// Blocks for up to `timeout`. Returns true if shutdown was triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let (flag, condvar) = &*self.inner;
        let mut triggered = flag.lock().unwrap_or_else(PoisonError::into_inner);

        while !*triggered {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            triggered = condvar
                .wait_timeout(triggered, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}
