//! Cancellable repeating timer.
//!
//! Both session clocks (elapsed time and the rest countdown) run on a
//! [`RepeatingTimer`]: a background tokio task that invokes a callback once
//! per period until the callback returns [`ControlFlow::Break`], the handle is
//! cancelled, or the handle is dropped.

use log::debug;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

pub struct RepeatingTimer {
    name: &'static str,
    cancel: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl RepeatingTimer {
    /// Spawn the timer task. The first tick fires one `period` after start.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(name: &'static str, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let join_handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!("{} timer cancelled", name);
                        return;
                    }
                    _ = interval.tick() => {
                        if token.is_cancelled() {
                            return;
                        }
                        if on_tick().is_break() {
                            debug!("{} timer finished", name);
                            return;
                        }
                    }
                }
            }
        });

        debug!("{} timer started with period {:?}", name, period);
        Self {
            name,
            cancel,
            join_handle: Some(join_handle),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the task has exited, either by cancellation or by breaking.
    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_none_or(|handle| handle.is_finished())
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
        debug!("{} timer shut down", self.name);
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
