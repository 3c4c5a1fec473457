// ── Bounded blocking calls ────────────────────────────────────────────────────
//
// Modal dialogs block until the user answers.  During startup that must not
// hang the process forever, so the dialog runs on its own thread and the
// caller gives up waiting after a timeout.  The dialog thread is detached and
// may outlive the wait.

use std::{sync::mpsc, thread, time::Duration};

/// How a bounded call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
    /// `f` returned before the timeout.
    Completed,
    /// The timeout elapsed first; `f` is still running.
    TimedOut,
    /// The thread could not be spawned or `f` panicked.
    Failed,
}

/// Run `f` on a new thread and wait at most `timeout` for it to finish.
pub(crate) fn run_bounded<F>(timeout: Duration, f: F) -> Wait
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("flicker-dialog".to_owned())
        .spawn(move || {
            f();
            // The receiver may already be gone after a timeout.
            let _ = tx.send(());
        });

    if let Err(e) = spawned {
        log::error!("could not spawn dialog thread: {e}");
        return Wait::Failed;
    }

    match rx.recv_timeout(timeout) {
        Ok(()) => Wait::Completed,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            log::warn!("dialog still open after {timeout:?}; continuing");
            Wait::TimedOut
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Wait::Failed,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn quick_call_completes() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let wait = run_bounded(Duration::from_secs(5), move || {
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(wait, Wait::Completed);
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn slow_call_times_out() {
        let wait = run_bounded(Duration::from_millis(10), || {
            thread::sleep(Duration::from_millis(500));
        });
        assert_eq!(wait, Wait::TimedOut);
    }

    #[test]
    fn panicking_call_is_reported() {
        let wait = run_bounded(Duration::from_secs(5), || panic!("dialog blew up"));
        assert_eq!(wait, Wait::Failed);
    }
}
