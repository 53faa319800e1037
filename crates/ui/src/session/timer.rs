use std::time::Duration;

use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

/// One-shot delayed signal that can be canceled.
///
/// Canceling is idempotent, and so is canceling after the timer fired.
/// Dropping the timer cancels it.
#[derive(Debug)]
pub struct CancelableTimer {
    delay: Duration,
    task: Option<JoinHandle<()>>,
    fired: Option<oneshot::Receiver<()>>,
}

impl CancelableTimer {
    /// Arm a timer on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn start(delay: Duration) -> Self {
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        });
        Self {
            delay,
            task: Some(task),
            fired: Some(rx),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Armed and neither fired-and-consumed nor canceled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.fired.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.fired = None;
    }

    /// Consume the firing without waiting. `true` exactly once, after the delay.
    pub fn try_fire(&mut self) -> bool {
        let Some(rx) = self.fired.as_mut() else {
            return false;
        };
        match rx.try_recv() {
            Ok(()) => {
                self.disarm();
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Closed) => {
                self.disarm();
                false
            }
        }
    }

    /// Wait for the delay. `false` if the timer is canceled or already consumed.
    pub async fn fired(&mut self) -> bool {
        let Some(rx) = self.fired.as_mut() else {
            return false;
        };
        let fired = rx.await.is_ok();
        self.disarm();
        fired
    }

    fn disarm(&mut self) {
        self.fired = None;
        self.task = None;
    }
}

impl Drop for CancelableTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let mut timer = CancelableTimer::start(Duration::from_secs(3));
        assert!(timer.is_pending());
        assert!(!timer.try_fire());

        assert!(timer.fired().await);
        assert!(!timer.is_pending());
        assert!(!timer.fired().await);
    }

    #[tokio::test(start_paused = true)]
    async fn try_fire_sees_elapsed_timer() {
        let mut timer = CancelableTimer::start(Duration::from_millis(500));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(timer.try_fire());
        assert!(!timer.try_fire());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let mut timer = CancelableTimer::start(Duration::from_secs(3));
        timer.cancel();
        timer.cancel();
        assert!(!timer.is_pending());
        assert!(!timer.fired().await);
        assert!(!timer.try_fire());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_firing_is_a_no_op() {
        let mut timer = CancelableTimer::start(Duration::from_millis(10));
        assert!(timer.fired().await);
        timer.cancel();
        assert!(!timer.is_pending());
    }
}
