//! Domain-partitioned ID generator.
//!
//! The [`Generator`] owns one [`Sequencer`] task per domain in
//! `[0, max_domain]`. Requests are routed to the owning sequencer over its
//! bounded queue and answered through a oneshot channel, so requests to one
//! domain are served in arrival order while different domains run in parallel.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::{Bounds, GeneratorConfig, IdComponents};
use crate::error::GeneratorError;
use crate::service::clock::{Clock, SystemClock};
use crate::service::codec;
use crate::service::sequencer::{ActiveGuard, MintRequest, Sequencer};

/// Pool of per-domain sequencers.
pub struct Generator {
    config: Arc<GeneratorConfig>,
    bounds: Bounds,
    /// One sender per domain, indexed by domain. Emptied on shutdown.
    senders: RwLock<Vec<mpsc::Sender<MintRequest>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    accepting: AtomicBool,
    active: Arc<AtomicUsize>,
}

impl Generator {
    /// Create a generator driven by the system clock.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is inconsistent (see
    /// [`Bounds::resolve`]). No sequencer is started in that case.
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a generator driven by `clock`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is inconsistent.
    pub fn with_clock(
        config: GeneratorConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GeneratorError> {
        let bounds = Bounds::resolve(&config)?;
        let config = Arc::new(config);
        let domain_count = bounds.domain_count();
        let capacity = config.queue_capacity.max(1);
        let active = Arc::new(AtomicUsize::new(0));

        let mut senders = Vec::with_capacity(domain_count);
        let mut handles = Vec::with_capacity(domain_count);

        for domain in 0..=bounds.max_domain {
            let (tx, rx) = mpsc::channel(capacity);
            let sequencer = Sequencer::new(
                domain,
                Arc::clone(&config),
                bounds,
                Arc::clone(&clock),
            );
            // Counted before spawning so the total is exact once `new` returns.
            let guard = ActiveGuard::new(Arc::clone(&active));
            handles.push(tokio::spawn(sequencer.run(rx, guard)));
            senders.push(tx);
        }

        info!(
            domain_count,
            instance_id = config.instance_id,
            "ID generator initialized"
        );

        Ok(Self {
            config,
            bounds,
            senders: RwLock::new(senders),
            handles: Mutex::new(handles),
            accepting: AtomicBool::new(true),
            active,
        })
    }

    /// Generator configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Field maxima.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Largest valid domain.
    #[must_use]
    pub const fn max_domain(&self) -> u64 {
        self.bounds.max_domain
    }

    /// Whether new requests are accepted.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Number of sequencer tasks still running.
    #[must_use]
    pub fn active_sequencers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Generate `count` ids for `domain`, in issuance order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `domain` exceeds the configured maximum
    /// - `count` is zero
    /// - the generator has been shut down
    pub async fn generate(&self, domain: u64, count: usize) -> Result<Vec<u64>, GeneratorError> {
        self.check_request(domain, count)?;
        let pending = self.submit(domain, count).await?;
        receive(domain, pending).await
    }

    /// Generate `count` ids for each of `domains`, grouped by domain.
    ///
    /// Duplicated domains are served once. Every domain is validated before
    /// any work is queued; the domains are then served in parallel.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Generator::generate`].
    pub async fn generate_many(
        &self,
        domains: &[u64],
        count: usize,
    ) -> Result<BTreeMap<u64, Vec<u64>>, GeneratorError> {
        let domains: BTreeSet<u64> = domains.iter().copied().collect();
        for &domain in &domains {
            self.check_request(domain, count)?;
        }

        // Fan out: queue everything before waiting on anything.
        let mut pending = Vec::with_capacity(domains.len());
        for domain in domains {
            pending.push((domain, self.submit(domain, count).await?));
        }

        // Fan in.
        let mut results = BTreeMap::new();
        for (domain, rx) in pending {
            results.insert(domain, receive(domain, rx).await?);
        }

        Ok(results)
    }

    /// Decode an id produced with this generator's configuration.
    #[must_use]
    pub fn decode(&self, id: u64) -> IdComponents {
        codec::decode(id, &self.config.layout())
    }

    /// Stop accepting requests and wait for every sequencer to exit.
    ///
    /// Requests already queued are still answered. Calling this more than once
    /// is harmless.
    pub async fn shutdown(&self) {
        self.accepting.store(false, Ordering::SeqCst);

        // Dropping the senders closes every queue once in-flight sends finish.
        drop(std::mem::take(&mut *self.senders.write()));

        let handles = std::mem::take(&mut *self.handles.lock());
        if handles.is_empty() {
            return;
        }

        info!(count = handles.len(), "Waiting for sequencers to drain");
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Sequencer task failed");
            }
        }

        info!("All domain sequencers finished");
    }

    fn check_request(&self, domain: u64, count: usize) -> Result<(), GeneratorError> {
        if !self.is_accepting() {
            return Err(GeneratorError::ShutDown);
        }
        if !self.bounds.contains_domain(domain) {
            return Err(GeneratorError::DomainOutOfRange {
                domain,
                max: self.bounds.max_domain,
            });
        }
        if count == 0 {
            return Err(GeneratorError::InvalidCount);
        }
        Ok(())
    }

    async fn submit(
        &self,
        domain: u64,
        count: usize,
    ) -> Result<oneshot::Receiver<Vec<u64>>, GeneratorError> {
        let sender = usize::try_from(domain)
            .ok()
            .and_then(|index| self.senders.read().get(index).cloned())
            .ok_or(GeneratorError::ShutDown)?;

        let (respond_to, rx) = oneshot::channel();
        sender
            .send(MintRequest { count, respond_to })
            .await
            .map_err(|_| GeneratorError::SequencerUnavailable { domain })?;

        Ok(rx)
    }
}

async fn receive(
    domain: u64,
    rx: oneshot::Receiver<Vec<u64>>,
) -> Result<Vec<u64>, GeneratorError> {
    rx.await
        .map_err(|_| GeneratorError::SequencerUnavailable { domain })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            domain_bits: 2,
            ..GeneratorConfig::with_instance_id(3)
        }
    }

    #[tokio::test]
    async fn test_generate_stamps_domain_and_instance() {
        let generator = Generator::new(config()).unwrap();
        assert_eq!(generator.active_sequencers(), 4);

        let ids = generator.generate(2, 1).await.unwrap();
        let components = generator.decode(ids[0]);
        assert_eq!(components.domain, 2);
        assert_eq!(components.instance_id, 3);
        assert!(components.timestamp <= SystemClock.now_seconds());

        generator.shutdown().await;
    }

    #[tokio::test]
    async fn test_generate_unique_and_increasing() {
        let generator = Generator::new(config()).unwrap();

        let first = generator.generate(1, 500).await.unwrap();
        let second = generator.generate(1, 500).await.unwrap();

        assert_eq!(first.len(), 500);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
        assert!(second.windows(2).all(|w| w[0] < w[1]));
        assert!(first.last() < second.first());

        let unique: BTreeSet<u64> = first.iter().chain(&second).copied().collect();
        assert_eq!(unique.len(), 1000);

        generator.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_config_starts_nothing() {
        let config = GeneratorConfig {
            timestamp_bits: 64,
            ..config()
        };
        let err = Generator::new(config).err().unwrap();
        assert!(matches!(err, GeneratorError::WidthOverflow { total_bits: 86 }));
    }

    #[tokio::test]
    async fn test_domain_out_of_range() {
        let generator = Generator::new(config()).unwrap();

        let err = generator.generate(4, 1).await.unwrap_err();
        assert_eq!(err, GeneratorError::DomainOutOfRange { domain: 4, max: 3 });

        let err = generator.generate_many(&[0, 9], 1).await.unwrap_err();
        assert_eq!(err, GeneratorError::DomainOutOfRange { domain: 9, max: 3 });

        generator.shutdown().await;
    }

    #[tokio::test]
    async fn test_zero_count_rejected() {
        let generator = Generator::new(config()).unwrap();
        assert_eq!(
            generator.generate(0, 0).await.unwrap_err(),
            GeneratorError::InvalidCount
        );
        generator.shutdown().await;
    }

    #[tokio::test]
    async fn test_generate_many_groups_by_domain() {
        let generator = Generator::new(config()).unwrap();

        let ids = generator.generate_many(&[3, 0, 3], 5).await.unwrap();
        assert_eq!(ids.keys().copied().collect::<Vec<_>>(), vec![0, 3]);

        for (domain, ids) in &ids {
            assert_eq!(ids.len(), 5);
            assert!(ids.iter().all(|&id| generator.decode(id).domain == *domain));
        }

        generator.shutdown().await;
    }

    #[tokio::test]
    async fn test_decode_round_trip() {
        let generator = Generator::new(GeneratorConfig::with_instance_id(5)).unwrap();
        let components = generator.decode(391_531_634_640_137);
        assert_eq!(components, IdComponents::new(1_673_989_769, 1, 5, 9));
        generator.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocked_domain_does_not_stall_others() {
        let generator = Arc::new(
            Generator::new(GeneratorConfig {
                counter_bits: 3,
                ..config()
            })
            .unwrap(),
        );

        // 24 ids with an 8-per-second budget forces domain 0 to wait ~2-3s.
        let busy = {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move { generator.generate(0, 24).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = Instant::now();
        let ids = generator.generate(1, 1).await.unwrap();
        assert_eq!(ids.len(), 1);
        assert!(started.elapsed() < Duration::from_millis(500));

        let busy_ids = busy.await.unwrap().unwrap();
        assert_eq!(busy_ids.len(), 24);
        assert!(busy_ids.windows(2).all(|w| w[0] < w[1]));

        generator.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_domains_wait_in_parallel() {
        let generator = Generator::new(GeneratorConfig {
            counter_bits: 3,
            ..config()
        })
        .unwrap();

        // Each domain alone has to wait for at least two second boundaries.
        let started = Instant::now();
        let ids = generator.generate_many(&[0, 1], 24).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(ids[&0].len(), 24);
        assert_eq!(ids[&1].len(), 24);
        assert!(elapsed >= Duration::from_secs(1), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(3_800), "{elapsed:?}");

        generator.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_sequencers_and_rejects_requests() {
        let generator = Generator::new(config()).unwrap();
        generator.generate(0, 3).await.unwrap();

        generator.shutdown().await;
        assert_eq!(generator.active_sequencers(), 0);
        assert!(!generator.is_accepting());

        assert_eq!(
            generator.generate(0, 1).await.unwrap_err(),
            GeneratorError::ShutDown
        );
        assert_eq!(
            generator.generate_many(&[1, 2], 1).await.unwrap_err(),
            GeneratorError::ShutDown
        );

        // Idempotent.
        generator.shutdown().await;
    }
}
