//! # Cancellation
//!
//! A cycle stops early when its [`Canceller`] fires or its deadline passes.
//! Stopping means: no further blocks are enqueued, each worker finishes the
//! block it is querying and takes no more, and the cycle ranks whatever was
//! accumulated, flagging the result as partial.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Create a linked canceller and signal.
pub fn cancel_pair() -> (Canceller, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (
        Canceller { tx: Arc::new(tx) },
        CancelSignal {
            rx: Some(rx),
            deadline: None,
        },
    )
}

/// Trigger side. Cloning shares the same signal.
#[derive(Debug, Clone)]
pub struct Canceller {
    tx: Arc<watch::Sender<bool>>,
}

impl Canceller {
    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observe side, handed to the pool and every worker.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self {
            rx: None,
            deadline: None,
        }
    }

    /// Also fire at `deadline`. The earlier of two deadlines wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Also fire `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Whether the signal has fired.
    pub fn is_triggered(&self) -> bool {
        let cancelled = self.rx.as_ref().is_some_and(|rx| *rx.borrow());
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        cancelled || expired
    }

    /// Resolve once the signal fires. Pends forever for [`never`](Self::never).
    pub async fn triggered(&self) {
        let flag = async {
            match &self.rx {
                Some(rx) => {
                    let mut rx = rx.clone();
                    let sender_gone = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    if sender_gone {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let timer = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = flag => {}
            _ = timer => {}
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}
