//! Debounced propagation of search keystrokes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delay between the last keystroke and the emitted search.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Emits the latest search text once typing pauses.
///
/// Each [`push`](Self::push) cancels the pending emission and schedules a new
/// one. Dropping the debouncer cancels whatever is pending, so a screen that
/// unmounts mid-typing never triggers a fetch. Must be used inside a Tokio
/// runtime.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    tx: mpsc::UnboundedSender<String>,
    pending: Option<JoinHandle<()>>,
    latest: Arc<Mutex<Option<String>>>,
}

impl SearchDebouncer {
    /// Returns the debouncer and the receiving end of its emissions.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = SearchDebouncer {
            delay,
            tx,
            pending: None,
            latest: Arc::new(Mutex::new(None)),
        };
        (debouncer, rx)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records a keystroke.
    pub fn push(&mut self, text: impl Into<String>) {
        self.cancel();
        let text = text.into();
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(text);
        }

        let tx = self.tx.clone();
        let latest = Arc::clone(&self.latest);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Send under the lock so `is_pending` never reports false while
            // the text is in neither place.
            if let Ok(mut latest) = latest.lock() {
                if let Some(text) = latest.take() {
                    log::debug!("search settled on '{text}'");
                    let _ = tx.send(text);
                }
            }
        }));
    }

    /// Emits the pending text now instead of waiting. Returns whether anything
    /// was pending.
    pub fn flush(&mut self) -> bool {
        self.cancel();
        match self.latest.lock() {
            Ok(mut latest) => match latest.take() {
                Some(text) => self.tx.send(text).is_ok(),
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Whether an emission is scheduled.
    pub fn is_pending(&self) -> bool {
        self.latest.lock().map(|l| l.is_some()).unwrap_or(false)
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_keystroke_is_emitted() {
        let (mut debouncer, mut rx) = SearchDebouncer::new(DEFAULT_DEBOUNCE);
        debouncer.push("j");
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.push("ju");
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.push("juan");

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await.as_deref(), Some("juan"));
        assert!(rx.try_recv().is_err());
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_emission() {
        let (mut debouncer, mut rx) = SearchDebouncer::new(DEFAULT_DEBOUNCE);
        debouncer.push("maria");
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;
        // Sender dropped with nothing sent.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_emits_immediately() {
        let (mut debouncer, mut rx) = SearchDebouncer::new(DEFAULT_DEBOUNCE);
        assert!(!debouncer.flush());
        debouncer.push("rice");
        assert!(debouncer.flush());
        assert_eq!(rx.try_recv().ok().as_deref(), Some("rice"));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn settled_text_is_queued_once_nothing_is_pending() {
        let (mut debouncer, mut rx) = SearchDebouncer::new(Duration::ZERO);
        for i in 0..200 {
            let text = format!("farmer {i}");
            debouncer.push(text.as_str());
            tokio::task::yield_now().await;
            // Either flush or the timer task sent it; both finish before the
            // text leaves `latest`.
            debouncer.flush();
            assert!(!debouncer.is_pending());
            assert_eq!(rx.try_recv().ok(), Some(text));
            assert!(rx.try_recv().is_err());
        }
    }
}
