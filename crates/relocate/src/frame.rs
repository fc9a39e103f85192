use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use tokio::time::{Instant, sleep_until};

/// Rendering-frame deferral: placement writes wait for the next frame boundary
/// so changes arriving together are written together.
#[derive(Debug)]
pub struct FrameScheduler {
    budget: Duration,
    origin: Instant,
    /// Number of writes deferred to a frame boundary during this session.
    deferred_count: AtomicU64,
}

impl FrameScheduler {
    /// Frames start every `budget` (at least 1ms), counted from now.
    pub fn new(budget: Duration) -> Self {
        Self {
            budget: budget.max(Duration::from_millis(1)),
            origin: Instant::now(),
            deferred_count: AtomicU64::new(0),
        }
    }

    /// Return the configured frame budget duration.
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Start of the first frame strictly after `now`.
    pub fn next_frame_at(&self, now: Instant) -> Instant {
        let budget = self.budget.as_nanos().max(1);
        let elapsed = now.saturating_duration_since(self.origin).as_nanos();
        let frames = elapsed / budget + 1;
        let offset = u64::try_from(frames.saturating_mul(budget)).unwrap_or(u64::MAX);
        self.origin + Duration::from_nanos(offset)
    }

    /// Wait for the next frame boundary.
    pub async fn next_frame(&self) {
        self.deferred_count.fetch_add(1, Ordering::Relaxed);
        sleep_until(self.next_frame_at(Instant::now())).await;
    }

    /// Return the number of times work was deferred to a frame boundary.
    pub fn deferred(&self) -> u64 {
        self.deferred_count.load(Ordering::Relaxed)
    }
}
