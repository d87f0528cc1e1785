use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_delay: Duration,
    pub factor: f64,
}

impl RetryPolicy {
    pub fn start(&self) -> Backoff {
        Backoff {
            policy: *self,
            failures: 0,
            delay: self.initial_delay,
        }
    }
}

#[derive(Debug)]
pub struct Backoff {
    policy: RetryPolicy,
    failures: u32,
    delay: Duration,
}

impl Backoff {
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Records a failed attempt and gives the delay to wait before the next
    /// one, or `None` once the retries are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures > self.policy.retries {
            return None;
        }
        let delay = self.delay;
        self.delay = Duration::try_from_secs_f64(delay.as_secs_f64() * self.policy.factor)
            .unwrap_or(delay);
        Some(delay)
    }
}
