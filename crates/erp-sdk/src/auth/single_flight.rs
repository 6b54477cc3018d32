//! Start-or-join execution of a shared asynchronous computation
//!
//! [`SingleFlight`] owns a single slot. The first caller to find the slot
//! empty creates the computation and stores it; callers arriving while it is
//! pending await the same computation. The slot is emptied when the
//! computation settles, before any waiter observes the outcome, so the next
//! caller after that starts a fresh one.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

type SharedCall<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

struct InFlight<T, E> {
    id: u64,
    call: SharedCall<T, E>,
}

/// At most one computation in flight per instance
pub struct SingleFlight<T, E> {
    slot: Arc<Mutex<Option<InFlight<T, E>>>>,
    next_id: AtomicU64,
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    /// Join the pending computation, or start one from `start`.
    ///
    /// `start` is only invoked when nothing is in flight. Every caller
    /// attached to the same computation receives a clone of its outcome.
    pub async fn run<F, Fut>(&self, start: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let call = {
            let mut slot = self.slot.lock();
            match slot.as_ref() {
                Some(in_flight) => {
                    debug!(id = in_flight.id, "Joining in-flight computation");
                    in_flight.call.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    debug!(id, "Starting new computation");
                    let call = Self::settle_into(Arc::clone(&self.slot), id, start());
                    *slot = Some(InFlight {
                        id,
                        call: call.clone(),
                    });
                    call
                }
            }
        };

        call.await
    }

    /// Whether a computation is currently pending
    pub fn is_in_flight(&self) -> bool {
        self.slot.lock().is_some()
    }

    fn settle_into<Fut>(
        slot: Arc<Mutex<Option<InFlight<T, E>>>>,
        id: u64,
        computation: Fut,
    ) -> SharedCall<T, E>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        async move {
            let outcome = computation.await;
            let mut slot = slot.lock();
            if slot.as_ref().is_some_and(|in_flight| in_flight.id == id) {
                *slot = None;
            }
            outcome
        }
        .boxed()
        .shared()
    }
}

impl<T, E> Default for SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> std::fmt::Debug for SingleFlight<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.slot.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_execution() {
        let flight = Arc::new(SingleFlight::<u32, String>::new());
        let starts = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let release_rx = Arc::new(Mutex::new(Some(release_rx)));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let flight = Arc::clone(&flight);
            let starts = Arc::clone(&starts);
            let release_rx = Arc::clone(&release_rx);
            handles.push(tokio::spawn(async move {
                flight
                    .run(|| {
                        starts.fetch_add(1, Ordering::SeqCst);
                        let rx = release_rx.lock().take();
                        async move {
                            if let Some(rx) = rx {
                                let _ = rx.await;
                            }
                            Ok(7)
                        }
                    })
                    .await
            }));
        }

        // Let every task attach before releasing the computation
        while !flight.is_in_flight() {
            tokio::task::yield_now().await;
        }
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        release_tx.send(()).unwrap();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert!(!flight.is_in_flight());
    }

    #[tokio::test]
    async fn test_slot_is_empty_after_failure() {
        let flight = SingleFlight::<u32, String>::new();

        let result = flight.run(|| async { Err("boom".to_string()) }).await;
        assert_eq!(result, Err("boom".to_string()));
        assert!(!flight.is_in_flight());
    }

    #[tokio::test]
    async fn test_sequential_calls_start_fresh_computations() {
        let flight = SingleFlight::<usize, String>::new();
        let starts = AtomicUsize::new(0);

        for expected in 1..=3 {
            let result = flight
                .run(|| {
                    let n = starts.fetch_add(1, Ordering::SeqCst) + 1;
                    async move { Ok(n) }
                })
                .await;
            assert_eq!(result, Ok(expected));
        }
        assert_eq!(starts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_dropped_waiter_does_not_cancel_others() {
        let flight = Arc::new(SingleFlight::<u32, String>::new());
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .run(|| async move {
                        let _ = release_rx.await;
                        Ok(1)
                    })
                    .await
            })
        };
        while !flight.is_in_flight() {
            tokio::task::yield_now().await;
        }

        let second = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move { flight.run(|| async { Ok(2) }).await })
        };
        tokio::task::yield_now().await;

        first.abort();
        release_tx.send(()).unwrap();

        assert_eq!(second.await.unwrap(), Ok(1));
        assert!(!flight.is_in_flight());
    }
}
