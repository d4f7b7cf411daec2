//! Latest-value-wins channel between the capture thread and frame analysis.
//!
//! The channel holds at most one value.  Publishing while a value is still
//! waiting replaces it: the superseded value is dropped and counted, never
//! queued.  This is the "keep only latest" backpressure policy for frame
//! analysis: when analysis falls behind, it always sees the newest frame.
//!
//! The sender side is synchronous so it can be called from a plain capture
//! thread; the receiver side is async and is drained by a Tokio task.
//!
//! Dropping the [`LatestSender`] closes the channel.  A value published before
//! the close is still delivered; after that, [`LatestReceiver::recv`] returns
//! `None`.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use tokio::sync::Notify;

struct Shared<T> {
    slot: Mutex<Option<T>>,
    notify: Notify,
    closed: AtomicBool,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl<T> Shared<T> {
    fn slot(&self) -> MutexGuard<'_, Option<T>> {
        // The slot holds plain data; a panic while it was locked cannot leave
        // it half-updated.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates a latest-value-wins channel with capacity one.
pub fn latest_channel<T>() -> (LatestSender<T>, LatestReceiver<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        notify: Notify::new(),
        closed: AtomicBool::new(false),
        published: AtomicU64::new(0),
        dropped: AtomicU64::new(0),
    });
    (
        LatestSender {
            shared: Arc::clone(&shared),
        },
        LatestReceiver { shared },
    )
}

/// Producer half.  Not `Clone`: there is one capture thread per binding.
pub struct LatestSender<T> {
    shared: Arc<Shared<T>>,
}

impl<T> LatestSender<T> {
    /// Stores `value`, replacing any value that has not been received yet.
    ///
    /// Returns `true` if an unreceived value was superseded (and dropped).
    pub fn publish(&self, value: T) -> bool {
        let superseded = self.shared.slot().replace(value).is_some();
        self.shared.published.fetch_add(1, Ordering::Relaxed);
        if superseded {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.shared.notify.notify_one();
        superseded
    }

    /// Number of values published so far.
    pub fn published(&self) -> u64 {
        self.shared.published.load(Ordering::Relaxed)
    }

    /// Number of values superseded before they were received.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl<T> Drop for LatestSender<T> {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }
}

/// Consumer half.
pub struct LatestReceiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> LatestReceiver<T> {
    /// Waits for the next value.
    ///
    /// Returns `None` once the sender has been dropped and no value is left.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            if let Some(value) = self.try_recv() {
                return Some(value);
            }
            if self.shared.closed.load(Ordering::Acquire) {
                // A publish may have raced with the close.
                return self.try_recv();
            }
            self.shared.notify.notified().await;
        }
    }

    /// Takes the waiting value, if any, without blocking.
    pub fn try_recv(&mut self) -> Option<T> {
        self.shared.slot().take()
    }

    /// Number of values superseded before they were received.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// `true` once the sender has been dropped.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
