//! Cooperative cancellation for invocation workers.
//!
//! Running code cannot be stopped from outside. When the invoker abandons a worker it trips that worker's
//! [`CancelToken`]; tested code that polls [`is_cancelled`] or calls [`checkpoint`] then stops early instead of
//! running to completion in the background. Code that never checks keeps running and its result is discarded.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gauntlet_core::Fault;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

thread_local! {
    static CURRENT: RefCell<Option<CancelToken>> = const { RefCell::new(None) };
}

/// Make `token` the current thread's token.
pub(crate) fn install(token: CancelToken) {
    CURRENT.with(|slot| *slot.borrow_mut() = Some(token));
}

/// The token of the current worker, if this thread is one.
pub fn current() -> Option<CancelToken> {
    CURRENT.with(|slot| slot.borrow().clone())
}

/// Whether the invocation running on this thread has been abandoned.
///
/// Always `false` outside a worker.
pub fn is_cancelled() -> bool {
    CURRENT.with(|slot| slot.borrow().as_ref().is_some_and(CancelToken::is_cancelled))
}

/// Unwind out of an abandoned invocation.
///
/// Does nothing unless the current worker has been cancelled; then it panics with a non-termination fault, which the
/// worker catches and discards.
#[track_caller]
pub fn checkpoint() {
    if is_cancelled() {
        std::panic::panic_any(Fault::non_termination());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_a_worker_nothing_is_cancelled() {
        let handle = std::thread::spawn(|| (is_cancelled(), current().is_none()));
        assert_eq!(handle.join().unwrap(), (false, true));
    }

    #[test]
    fn installed_token_is_observed() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = std::thread::spawn(move || {
            install(remote);
            while !is_cancelled() {
                std::thread::yield_now();
            }
            current().is_some()
        });
        token.cancel();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn checkpoint_unwinds_with_non_termination() {
        let handle = std::thread::spawn(|| {
            let token = CancelToken::new();
            install(token.clone());
            checkpoint();
            token.cancel();
            std::panic::catch_unwind(checkpoint)
        });
        let payload = handle.join().unwrap().unwrap_err();
        let fault = Fault::from_panic(&*payload);
        assert!(fault.is_non_termination());
    }
}
