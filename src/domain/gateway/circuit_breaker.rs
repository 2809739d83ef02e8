//! Per-provider circuit breaker
//!
//! `Closed --threshold consecutive failures--> Open --cooldown--> HalfOpen`.
//! A half-open circuit admits a single probe: success closes it, failure
//! reopens it and restarts the cooldown.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Time an open circuit waits before admitting a probe
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(5 * 60),
        }
    }
}

/// Decision for a caller asking to use the guarded provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit closed; normal retry budget applies
    Allowed,
    /// Circuit half-open; exactly one attempt is permitted
    Probe,
    Rejected,
}

/// Externally visible view of a breaker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub last_failure: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    last_failure_at: Option<DateTime<Utc>>,
    probe_started: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure: None,
            last_failure_at: None,
            probe_started: None,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// State as it would be observed at `now`, without transitioning.
    ///
    /// An open circuit whose cooldown has elapsed reports `HalfOpen`.
    pub fn effective_state(&self, now: Instant) -> CircuitState {
        match self.state {
            CircuitState::Open if self.cooldown_elapsed(now) => CircuitState::HalfOpen,
            state => state,
        }
    }

    /// Ask to route a call through this breaker
    pub fn try_acquire(&mut self, now: Instant) -> Admission {
        match self.state {
            CircuitState::Closed => Admission::Allowed,
            CircuitState::Open => {
                if !self.cooldown_elapsed(now) {
                    return Admission::Rejected;
                }

                self.state = CircuitState::HalfOpen;
                self.probe_started = Some(now);
                Admission::Probe
            }
            CircuitState::HalfOpen => {
                // A probe abandoned by a cancelled caller is considered stale
                // after one cooldown period.
                let probe_active = self
                    .probe_started
                    .is_some_and(|started| now.duration_since(started) < self.config.cooldown);

                if probe_active {
                    Admission::Rejected
                } else {
                    self.probe_started = Some(now);
                    Admission::Probe
                }
            }
        }
    }

    pub fn record_success(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.last_failure = None;
        self.last_failure_at = None;
        self.probe_started = None;
    }

    /// Record a failed call. Returns `true` when this failure opened the circuit.
    pub fn record_failure(&mut self, now: Instant) -> bool {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure = Some(now);
        self.last_failure_at = Some(Utc::now());
        self.probe_started = None;

        let should_open = self.state == CircuitState::HalfOpen
            || self.failure_count >= self.config.failure_threshold;

        if should_open && self.state != CircuitState::Open {
            self.state = CircuitState::Open;
            return true;
        }

        false
    }

    pub fn snapshot(&self, now: Instant) -> CircuitSnapshot {
        CircuitSnapshot {
            state: self.effective_state(now),
            failure_count: self.failure_count,
            last_failure: self.last_failure_at,
        }
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        self.last_failure
            .is_none_or(|failed_at| now.duration_since(failed_at) >= self.config.cooldown)
    }
}
