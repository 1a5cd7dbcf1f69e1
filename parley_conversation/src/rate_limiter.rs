//! Per-user fixed-window throttle for completion requests.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Minimum spacing between two accepted messages from the same user.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(2);

/// Map size at which elapsed entries are pruned.
pub const DEFAULT_MAX_TRACKED_USERS: usize = 10_000;

/// Remembers when each user last got a request through.
///
/// The instant is supplied by the caller, which keeps the limiter
/// deterministic under test. State is process-local and lost on restart.
pub struct RateLimiter {
    window: Duration,
    max_tracked_users: usize,
    last_request: Mutex<HashMap<i64, Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            max_tracked_users: DEFAULT_MAX_TRACKED_USERS,
            last_request: Mutex::new(HashMap::new()),
        }
    }

    /// Set the map size at which entries whose window has elapsed are dropped.
    ///
    /// This is a prune threshold, not a hard cap: users still inside their
    /// window are kept, so the map may grow past it.
    #[must_use]
    pub fn with_max_tracked_users(mut self, max_tracked_users: usize) -> Self {
        self.max_tracked_users = max_tracked_users.max(1);
        self
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` and records `now` if `user_id` has no request inside the
    /// window. A rejected attempt leaves the stored instant untouched.
    pub async fn try_acquire(&self, user_id: i64, now: Instant) -> bool {
        let mut last_request = self.last_request.lock().await;

        if let Some(last) = last_request.get(&user_id) {
            if now.saturating_duration_since(*last) < self.window {
                return false;
            }
        } else if last_request.len() >= self.max_tracked_users {
            let before = last_request.len();
            last_request.retain(|_, last| now.saturating_duration_since(*last) < self.window);
            debug!(
                "Pruned {} idle rate limiter entries",
                before - last_request.len()
            );
        }

        last_request.insert(user_id, now);
        true
    }

    /// Number of users currently remembered.
    pub async fn tracked_users(&self) -> usize {
        self.last_request.lock().await.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_WINDOW)
    }
}
