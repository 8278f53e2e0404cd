// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

/// Fires once every producer of a tag has announced.
#[derive(Debug)]
pub(crate) struct Signal {
    remaining: AtomicUsize,
    ready: watch::Sender<bool>,
}

impl Signal {
    pub(crate) fn new(producers: usize) -> Self {
        let (ready, _) = watch::channel(producers == 0);
        Self {
            remaining: AtomicUsize::new(producers),
            ready,
        }
    }

    /// Counts down one producer. The last one fires the signal.
    pub(crate) fn announce(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.ready.send_replace(true);
        }
    }

    pub(crate) async fn wait(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn fires_after_last_producer() {
        let signal = Signal::new(2);
        signal.announce();
        assert!(!*signal.ready.borrow());
        signal.announce();
        assert!(*signal.ready.borrow());
        signal.wait().await;
    }

    #[tokio::test]
    async fn producerless_signal_starts_ready() {
        Signal::new(0).wait().await;
    }
}
