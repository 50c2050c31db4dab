//! Synthetic request-count throttle.
//!
//! Not a rate limiter: a counter that trips once every `limit + 1` requests
//! so clients can exercise their handling of fault 105.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide request counter shared by all request tasks.
#[derive(Debug)]
pub struct RequestCounter {
    count: AtomicUsize,
    limit: usize,
}

impl RequestCounter {
    pub fn new(limit: usize) -> Self {
        Self {
            count: AtomicUsize::new(0),
            limit,
        }
    }

    /// Count one request. Returns false when it crossed the limit, in which
    /// case the counter has been reset to zero.
    ///
    /// Increment, compare and reset happen in a single atomic update, so
    /// concurrent callers never both pass on a stale value.
    pub fn admit(&self) -> bool {
        let limit = self.limit;
        let previous = match self.count.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            Some(if n + 1 > limit { 0 } else { n + 1 })
        }) {
            Ok(n) | Err(n) => n,
        };
        previous < limit
    }

    /// Requests counted since the last reset.
    pub fn current(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
