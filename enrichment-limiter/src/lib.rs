//! A queued, per-provider rate limiter combining a token bucket (rate) with
//! a concurrency cap, and a strict FIFO waiting queue over both. `execute`
//! is generic over the callable's own `Result<T, E>` — the limiter has no
//! failure modes of its own, so `E` is whatever error type the caller's
//! work produces.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterStats {
    pub queue_length: usize,
    pub active_requests: usize,
    pub available_tokens: u64,
}

struct State {
    tokens: f64,
    max_tokens: f64,
    last_refill: Instant,
    refill_rate_per_ms: f64,
    active_requests: usize,
    max_concurrent: usize,
    /// FIFO order of enqueue tickets. Only the ticket at the front may be
    /// admitted — head-of-line blocking is intentional.
    queue: VecDeque<u64>,
    next_ticket: u64,
}

impl State {
    fn saturation_percent(&self) -> f64 {
        self.active_requests as f64 / self.max_concurrent as f64
    }

    fn refill(&mut self, now: Instant) {
        let elapsed_ms = now.duration_since(self.last_refill).as_secs_f64() * 1000.0;
        if elapsed_ms <= 0.0 {
            return;
        }
        self.tokens = (self.tokens + elapsed_ms * self.refill_rate_per_ms).min(self.max_tokens);
        self.last_refill = now;
    }

    /// Time until at least one token is available, given the current
    /// (already-refilled) token count.
    fn time_to_next_token(&self) -> Duration {
        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }
        let ms_needed = (1.0 - self.tokens) / self.refill_rate_per_ms;
        Duration::from_millis(ms_needed.ceil().max(0.0) as u64)
    }
}

/// Per-provider queued rate limiter: token bucket + concurrency cap + FIFO queue.
pub struct QueuedRateLimiter {
    name: String,
    state: Mutex<State>,
    notify: Notify,
}

impl QueuedRateLimiter {
    /// `max_tokens` tokens refill continuously over `time_window`, and at
    /// most `max_concurrent` callables may run at once. `name` labels the
    /// saturation gauge so several limiters can be told apart on one dashboard.
    pub fn new(name: impl Into<String>, max_tokens: u32, time_window: Duration, max_concurrent: usize) -> Self {
        let refill_rate_per_ms = max_tokens as f64 / time_window.as_millis().max(1) as f64;
        Self {
            name: name.into(),
            state: Mutex::new(State {
                tokens: max_tokens as f64,
                max_tokens: max_tokens as f64,
                last_refill: Instant::now(),
                refill_rate_per_ms,
                active_requests: 0,
                max_concurrent,
                queue: VecDeque::new(),
                next_ticket: 0,
            }),
            notify: Notify::new(),
        }
    }

    fn report_saturation(&self, saturation_percent: f64) {
        metrics::gauge!("provider_limiter_saturation_percent", "provider" => self.name.clone())
            .set(saturation_percent);
    }

    /// Point-in-time, best-effort snapshot.
    pub async fn stats(&self) -> LimiterStats {
        let mut state = self.state.lock().await;
        state.refill(Instant::now());
        LimiterStats {
            queue_length: state.queue.len(),
            active_requests: state.active_requests,
            available_tokens: state.tokens.floor() as u64,
        }
    }

    /// Run `operation` once admitted: one token consumed and one
    /// concurrency slot held for its duration. Waiters are admitted in
    /// strict FIFO order of `execute` entry; the result or failure of
    /// `operation` is propagated unchanged.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ticket = self.enqueue().await;
        self.admit(ticket).await;

        let result = operation().await;

        self.release().await;
        result
    }

    async fn enqueue(&self) -> u64 {
        let mut state = self.state.lock().await;
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.queue.push_back(ticket);
        ticket
    }

    /// Block until `ticket` is at the front of the queue and can be
    /// admitted (a free concurrency slot and at least one token).
    async fn admit(&self, ticket: u64) {
        loop {
            let notified = self.notify.notified();
            let wait = {
                let mut state = self.state.lock().await;
                state.refill(Instant::now());

                let is_front = state.queue.front() == Some(&ticket);
                let can_admit = is_front
                    && state.tokens >= 1.0
                    && state.active_requests < state.max_concurrent;

                if can_admit {
                    state.queue.pop_front();
                    state.tokens -= 1.0;
                    state.active_requests += 1;
                    let saturation_percent = state.saturation_percent();
                    drop(state);
                    trace!(ticket, "admitted");
                    self.report_saturation(saturation_percent);
                    return;
                }

                if is_front {
                    // Head of line, just waiting on tokens or a concurrency slot.
                    Some(state.time_to_next_token())
                } else {
                    // Someone ahead of us hasn't been admitted yet; wait for
                    // a state change rather than busy-polling.
                    None
                }
            };

            match wait {
                Some(duration) if duration > Duration::ZERO => {
                    tokio::select! {
                        _ = tokio::time::sleep(duration) => {}
                        _ = notified => {}
                    }
                }
                _ => notified.await,
            }
        }
    }

    async fn release(&self) {
        let mut state = self.state.lock().await;
        state.active_requests -= 1;
        let saturation_percent = state.saturation_percent();
        drop(state);
        self.report_saturation(saturation_percent);
        self.notify.notify_waiters();
    }
}
