//! Per-domain sequencer.
//!
//! Each domain gets exactly one [`Sequencer`], running as its own tokio task
//! and reading [`MintRequest`]s from a private FIFO queue. The sequencer is the
//! only owner of its `(reserved_timestamp, counter)` pair, so no locking is
//! involved in minting.
//!
//! The reserved timestamp deliberately trails the wall clock by up to
//! `reserved_seconds_count` seconds. That slack absorbs small backward clock
//! adjustments without reusing a `(timestamp, counter)` pair.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::domain::{Bounds, GeneratorConfig, IdComponents};
use crate::service::clock::Clock;
use crate::service::codec;

/// A batch request for one domain.
#[derive(Debug)]
pub struct MintRequest {
    /// Number of ids to mint.
    pub count: usize,
    /// Where to deliver the ids, in issuance order.
    pub respond_to: oneshot::Sender<Vec<u64>>,
}

/// Outcome of one step of the sequencing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A fresh `(reserved_timestamp, counter)` pair is ready.
    Issued,
    /// The counter is exhausted and the wall clock has not passed the reserved
    /// second yet. The caller must wait until `until_second` and then call
    /// [`SequencerState::roll_over`].
    Wait {
        /// Unix second to wait for.
        until_second: i64,
    },
}

/// Mutable state owned by a single sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerState {
    /// Unix second currently handed out.
    pub reserved_timestamp: i64,
    /// Position within the reserved second.
    pub counter: u64,
}

impl SequencerState {
    /// State seeded at `reserved_timestamp` with a zero counter.
    #[must_use]
    pub const fn new(reserved_timestamp: i64) -> Self {
        Self {
            reserved_timestamp,
            counter: 0,
        }
    }

    /// Apply the sequencing policy for one id at wall-clock second `now`.
    pub const fn advance(&mut self, now: i64, max_counter: u64, reserved_seconds: i64) -> Advance {
        let delta = now.saturating_sub(self.reserved_timestamp);

        if delta > reserved_seconds {
            // Idle or just started: pull the reservation up behind the clock.
            self.reserved_timestamp = now.saturating_sub(reserved_seconds);
            self.counter = 0;
            Advance::Issued
        } else if self.counter < max_counter {
            self.counter += 1;
            Advance::Issued
        } else if delta > 0 {
            self.roll_over();
            Advance::Issued
        } else {
            Advance::Wait {
                until_second: self.reserved_timestamp.saturating_add(1),
            }
        }
    }

    /// Move to the next reserved second.
    pub const fn roll_over(&mut self) {
        self.reserved_timestamp = self.reserved_timestamp.saturating_add(1);
        self.counter = 0;
    }
}

/// Sequencer for a single domain.
pub struct Sequencer {
    domain: u64,
    state: SequencerState,
    config: Arc<GeneratorConfig>,
    bounds: Bounds,
    clock: Arc<dyn Clock>,
}

impl Sequencer {
    /// Create a sequencer seeded at the current time plus the configured
    /// startup offset.
    #[must_use]
    pub fn new(
        domain: u64,
        config: Arc<GeneratorConfig>,
        bounds: Bounds,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let seed = clock
            .now_seconds()
            .saturating_add(config.startup_second_offset);

        Self {
            domain,
            state: SequencerState::new(seed),
            config,
            bounds,
            clock,
        }
    }

    /// Domain served by this sequencer.
    #[must_use]
    pub const fn domain(&self) -> u64 {
        self.domain
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SequencerState {
        self.state
    }

    /// Overwrite the state.
    pub const fn set_state(&mut self, state: SequencerState) {
        self.state = state;
    }

    /// Mint one id, waiting for the next second if this domain's counter is
    /// exhausted.
    ///
    /// Waiting suspends only this sequencer; other domains keep running.
    pub async fn mint(&mut self) -> u64 {
        let advance = self.state.advance(
            self.clock.now_seconds(),
            self.bounds.max_counter,
            self.bounds.reserved_seconds,
        );

        if let Advance::Wait { until_second } = advance {
            self.wait_until(until_second).await;
            self.state.roll_over();
        }

        let components = IdComponents {
            timestamp: self.state.reserved_timestamp,
            counter: self.state.counter,
            instance_id: self.config.instance_id,
            domain: self.domain,
        };

        codec::encode(&components, &self.config.layout())
    }

    #[allow(clippy::cast_sign_loss)]
    async fn wait_until(&self, second: i64) {
        let target = second.saturating_mul(1000);
        let wait_ms = target - self.clock.now_millis();

        warn!(
            domain = self.domain,
            wait_ms,
            "Counter exhausted, sleeping until next second"
        );
        metrics::counter!("idgen_sequencer_waits_total").increment(1);

        // The tokio timer is monotonic, so re-check against the wall clock.
        loop {
            let remaining = target - self.clock.now_millis();
            if remaining <= 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(remaining as u64)).await;
        }
    }

    /// Serve requests until every sender of `rx` is dropped.
    ///
    /// Requests already queued when the senders go away are still answered.
    /// `guard` is released when the task ends, panics included.
    pub async fn run(mut self, mut rx: mpsc::Receiver<MintRequest>, guard: ActiveGuard) {
        let _guard = guard;
        trace!(domain = self.domain, "Sequencer started");

        while let Some(request) = rx.recv().await {
            let mut ids = Vec::with_capacity(request.count);
            for _ in 0..request.count {
                ids.push(self.mint().await);
            }

            metrics::counter!("idgen_ids_generated_total").increment(ids.len() as u64);

            if request.respond_to.send(ids).is_err() {
                debug!(domain = self.domain, "Requester went away before ids were delivered");
            }

            debug!(
                domain = self.domain,
                count = request.count,
                "ID generation request completed"
            );
        }

        trace!(domain = self.domain, "Sequencer stopped");
    }
}

/// Counts one live sequencer task from creation until drop.
#[derive(Debug)]
pub struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    /// Register a task in `active`.
    #[must_use]
    pub fn new(active: Arc<AtomicUsize>) -> Self {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        set_active_gauge(now);
        Self(active)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let now = self.0.fetch_sub(1, Ordering::SeqCst) - 1;
        set_active_gauge(now);
    }
}

#[allow(clippy::cast_precision_loss)]
fn set_active_gauge(active: usize) {
    metrics::gauge!("idgen_active_sequencers").set(active as f64);
}
