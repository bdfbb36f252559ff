//! Quiet-window coalescing for search-as-you-type input.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

/// Quiet window applied to search boxes.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Emits only the last search value after input stays quiet for a window.
#[derive(Debug, Clone, Copy)]
pub struct SearchDebouncer {
    quiet_window: Duration,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    /// Creates a debouncer with a custom quiet window.
    #[must_use]
    pub fn new(quiet_window: Duration) -> Self {
        Self { quiet_window }
    }

    /// Returns the configured quiet window.
    #[must_use]
    pub fn quiet_window(&self) -> Duration {
        self.quiet_window
    }

    /// Waits for the next settled value.
    ///
    /// Returns `None` once the input is closed with nothing pending. A value
    /// pending when the input closes is still emitted.
    pub async fn settle(&self, input: &mut mpsc::Receiver<String>) -> Option<String> {
        let mut latest = input.recv().await?;

        loop {
            match timeout(self.quiet_window, input.recv()).await {
                Ok(Some(next)) => latest = next,
                Ok(None) | Err(_) => return Some(latest),
            }
        }
    }

    /// Forwards settled values from `input` until it closes.
    pub fn spawn(self, mut input: mpsc::Receiver<String>) -> mpsc::Receiver<String> {
        let (sender, output) = mpsc::channel(8);

        tokio::spawn(async move {
            while let Some(settled) = self.settle(&mut input).await {
                if sender.send(settled).await.is_err() {
                    break;
                }
            }
        });

        output
    }
}
