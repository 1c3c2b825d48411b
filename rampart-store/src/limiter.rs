//! Sliding-window rate limiter

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Denied; wait this long until the oldest acceptance falls out of the
    /// window.
    Limited { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn retry_after_secs(&self) -> u64 {
        match self {
            Decision::Allowed => 0,
            Decision::Limited { retry_after } => retry_after.as_secs(),
        }
    }
}

/// At most `capacity` acceptances per sliding `window`.
///
/// Each `allow()` call drops timestamps older than the window; if the list
/// is under capacity the call is accepted and stamped. Accepted timestamps
/// are never rolled back, even if the guarded request is later cancelled.
pub struct SlidingWindowLimiter {
    capacity: usize,
    window: Duration,
    stamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity,
            window,
            stamps: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn allow(&self) -> Decision {
        let now = Instant::now();
        // Recover the stamp list from a poisoned lock; timestamps are
        // always in a consistent state.
        let mut stamps = match self.stamps.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        while let Some(oldest) = stamps.front() {
            if now.duration_since(*oldest) >= self.window {
                stamps.pop_front();
            } else {
                break;
            }
        }

        if stamps.len() < self.capacity {
            stamps.push_back(now);
            Decision::Allowed
        } else {
            // stamps is non-empty here: capacity is at least 1.
            let oldest = *stamps.front().unwrap_or(&now);
            let retry_after = self.window.saturating_sub(now.duration_since(oldest));
            Decision::Limited { retry_after }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl std::fmt::Debug for SlidingWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowLimiter")
            .field("capacity", &self.capacity)
            .field("window", &self.window)
            .finish()
    }
}
