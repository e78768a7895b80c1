use std::future::{poll_fn, Future};
use std::pin::pin;
use std::sync::{mpsc, Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::task::Poll;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, warn};

use crate::errors::Cancelled;

/// Exit status when a second Ctrl-C forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Cooperative cancellation flag shared between the match loop and whoever may abort it
/// (Ctrl-C handler, tests, an input device...).
///
/// Every blocking delay of the simulation goes through [`CancellationToken::wait`], so an
/// abort is noticed as soon as the current sub-delay is interrupted instead of after a full
/// reaction-time or key-hold interval.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every pending [`wait`](Self::wait).
    pub fn cancel(&self) {
        let mut cancelled = self.flag();
        *cancelled = true;
        self.inner.1.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Cancel on the first Ctrl-C, exit with [`FORCED_EXIT_CODE`] on the second.
    ///
    /// Listens on a helper thread and returns once the handler is installed, so a Ctrl-C
    /// arriving after this call always reaches the token.
    pub fn cancel_on_ctrl_c(&self) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("could not build signal runtime")?;
        let (ready_tx, ready_rx) = mpsc::channel();
        let cancel = self.clone();

        thread::Builder::new()
            .name("ctrl-c".to_owned())
            .spawn(move || {
                runtime.block_on(async {
                    let mut first = pin!(tokio::signal::ctrl_c());
                    // the handler is installed by the first poll
                    let polled = poll_fn(|cx| Poll::Ready(first.as_mut().poll(cx))).await;
                    let received = match polled {
                        Poll::Ready(Err(e)) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                        Poll::Ready(Ok(())) => {
                            let _ = ready_tx.send(Ok(()));
                            Ok(())
                        }
                        Poll::Pending => {
                            let _ = ready_tx.send(Ok(()));
                            first.await
                        }
                    };
                    if received.is_err() {
                        return;
                    }

                    info!("ctrl-c received, finishing current match");
                    cancel.cancel();

                    if tokio::signal::ctrl_c().await.is_ok() {
                        warn!("second ctrl-c, exiting without a final report");
                        std::process::exit(FORCED_EXIT_CODE);
                    }
                })
            })
            .context("could not spawn signal thread")?;

        ready_rx
            .recv()
            .context("signal thread stopped before installing its handler")?
            .context("could not install the ctrl-c handler")
    }

    /// Block for `duration` unless cancelled first.
    ///
    /// Returns `Err(Cancelled)` if the flag is raised before or while waiting, including
    /// for a zero duration.
    pub fn wait(&self, duration: Duration) -> Result<(), Cancelled> {
        match Instant::now().checked_add(duration) {
            Some(deadline) => self.wait_until(deadline),
            None => self.wait_for_cancel(),
        }
    }

    /// Block until `deadline` unless cancelled first.
    pub fn wait_until(&self, deadline: Instant) -> Result<(), Cancelled> {
        let mut cancelled = self.flag();
        loop {
            if *cancelled {
                return Err(Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            // spurious wake-ups loop back to the checks above
            cancelled = self
                .inner
                .1
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn wait_for_cancel(&self) -> Result<(), Cancelled> {
        let mut cancelled = self.flag();
        while !*cancelled {
            cancelled = self
                .inner
                .1
                .wait(cancelled)
                .unwrap_or_else(PoisonError::into_inner);
        }
        Err(Cancelled)
    }

    /// The flag is a plain bool, a panic while holding it cannot leave it inconsistent.
    fn flag(&self) -> MutexGuard<'_, bool> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
