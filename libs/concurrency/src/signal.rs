//! One-shot signal that any number of tasks can wait for.
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(test)]
mod tests;

/// Event which fires at most once.
///
/// Waiting is done on a semaphore without permits: closing it wakes every
/// waiter and makes every future wait return immediately. The `fired` flag
/// makes sure only a single `send()` is ever reported as the one that fired.
#[derive(Debug)]
pub struct Once {
    sem: tokio::sync::Semaphore,
    fired: AtomicBool,
}

impl Default for Once {
    fn default() -> Once {
        Once::new()
    }
}

impl Once {
    /// Constructs a signal that has not fired yet.
    pub fn new() -> Self {
        Self {
            sem: tokio::sync::Semaphore::new(0),
            fired: AtomicBool::new(false),
        }
    }

    /// Fires the signal, waking all tasks waiting in `recv()`.
    ///
    /// Returns true iff this call fired it; any later call is a noop and returns false.
    pub fn send(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.sem.close();
        true
    }

    /// Waits until the signal fires. Cancel-safe.
    pub async fn recv(&self) {
        // No permits are ever added, so acquiring can only end with the semaphore closed.
        let res = self.sem.acquire().await;
        debug_assert!(res.is_err());
    }

    /// Checks whether the signal has already fired.
    pub fn try_recv(&self) -> bool {
        self.sem.is_closed()
    }
}
