//! Conversion pool implementation.
//!
//! Workers pull item ids from a shared queue, so at most `concurrency`
//! requests are in flight while the queue drains in submission order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::item::ItemStore;
use crate::metrics;
use crate::service::{ConversionSettings, ConvertService};

use super::config::PoolConfig;
use super::types::{BulkOutcome, PoolError};

/// The conversion worker pool.
pub struct ConversionPool<S>
where
    S: ConvertService + 'static,
{
    config: PoolConfig,
    store: Arc<ItemStore>,
    service: Arc<S>,
    busy: Arc<AtomicBool>,
}

impl<S> ConversionPool<S>
where
    S: ConvertService + 'static,
{
    /// Create a new pool.
    pub fn new(config: PoolConfig, store: Arc<ItemStore>, service: Arc<S>) -> Self {
        Self {
            config,
            store,
            service,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a bulk run is currently in progress.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Convert every item in the store, bounded by the configured
    /// concurrency. Results from a previous run are cleared first so
    /// the run converts the full set.
    ///
    /// Returns [`PoolError::Busy`] if another bulk run is active.
    pub async fn convert_all(
        &self,
        settings: &ConversionSettings,
    ) -> Result<BulkOutcome, PoolError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            warn!("Bulk conversion requested while another run is active");
            return Err(PoolError::Busy);
        }

        metrics::BULK_RUNS.inc();
        self.store.clear_results();

        let ids = self.store.snapshot_ids();
        info!(
            items = ids.len(),
            concurrency = self.config.concurrency,
            format = %settings.format,
            "Starting bulk conversion"
        );

        let queue = Arc::new(Mutex::new(ids.into_iter().collect::<VecDeque<u64>>()));
        let converted = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));

        let workers = (0..self.config.concurrency.max(1)).map(|worker| {
            let queue = Arc::clone(&queue);
            let store = Arc::clone(&self.store);
            let service = Arc::clone(&self.service);
            let settings = settings.clone();
            let converted = Arc::clone(&converted);
            let failed = Arc::clone(&failed);
            let skipped = Arc::clone(&skipped);

            async move {
                loop {
                    // Pop inside a block so the guard is dropped before awaiting.
                    let id = {
                        let mut queue = queue.lock().expect("pool queue lock poisoned");
                        queue.pop_front()
                    };
                    let Some(id) = id else {
                        break;
                    };

                    debug!(worker, item_id = id, "Worker picked up item");
                    match run_item(&store, service.as_ref(), id, &settings).await {
                        ItemOutcome::Converted => converted.fetch_add(1, Ordering::SeqCst),
                        ItemOutcome::Failed => failed.fetch_add(1, Ordering::SeqCst),
                        ItemOutcome::Skipped => skipped.fetch_add(1, Ordering::SeqCst),
                    };
                }
            }
        });

        futures::future::join_all(workers).await;
        self.busy.store(false, Ordering::SeqCst);

        let outcome = BulkOutcome {
            converted: converted.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
            skipped: skipped.load(Ordering::SeqCst),
        };
        info!(
            converted = outcome.converted,
            failed = outcome.failed,
            skipped = outcome.skipped,
            "Bulk conversion finished"
        );
        Ok(outcome)
    }

    /// Convert a single item. Returns `Ok(true)` if the item was
    /// converted, `Ok(false)` if it failed or was not eligible.
    pub async fn convert_one(
        &self,
        id: u64,
        settings: &ConversionSettings,
    ) -> Result<bool, PoolError> {
        let outcome = run_item(&self.store, self.service.as_ref(), id, settings).await;
        Ok(matches!(outcome, ItemOutcome::Converted))
    }
}

enum ItemOutcome {
    Converted,
    Failed,
    Skipped,
}

/// Drive one item through a conversion request and write the result back.
async fn run_item<S>(
    store: &ItemStore,
    service: &S,
    id: u64,
    settings: &ConversionSettings,
) -> ItemOutcome
where
    S: ConvertService + ?Sized,
{
    // Claims the item; None means it is absent, already converting,
    // or already done.
    let Some(source) = store.begin_convert(id) else {
        metrics::CONVERSION_ATTEMPTS
            .with_label_values(&["skipped"])
            .inc();
        return ItemOutcome::Skipped;
    };

    let start = Instant::now();
    match service.convert(&source, settings).await {
        Ok(image) => {
            metrics::CONVERSION_ATTEMPTS
                .with_label_values(&["done"])
                .inc();
            metrics::CONVERSION_DURATION
                .with_label_values(&["done"])
                .observe(start.elapsed().as_secs_f64());

            let handle = store.registry().create(image.bytes);
            if store.complete(id, handle, image.name) {
                debug!(item_id = id, "Conversion complete");
                ItemOutcome::Converted
            } else {
                // Item was removed while the request was in flight; the
                // handle we just created is dropped and revoked here.
                debug!(item_id = id, "Item removed mid-conversion, discarding result");
                ItemOutcome::Skipped
            }
        }
        Err(e) => {
            metrics::CONVERSION_ATTEMPTS
                .with_label_values(&["failed"])
                .inc();
            metrics::CONVERSION_DURATION
                .with_label_values(&["failed"])
                .observe(start.elapsed().as_secs_f64());

            warn!(item_id = id, error = %e, "Conversion failed");
            if store.fail(id, e.item_message()) {
                ItemOutcome::Failed
            } else {
                ItemOutcome::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemStatus, SourceImage};
    use crate::testing::MockConvertService;

    fn store_with(names: &[&str]) -> Arc<ItemStore> {
        let store = Arc::new(ItemStore::new());
        store.add(
            names
                .iter()
                .map(|n| SourceImage {
                    name: n.to_string(),
                    bytes: vec![1, 2, 3],
                })
                .collect(),
        );
        store
    }

    #[tokio::test]
    async fn test_convert_all_settles_every_item() {
        let store = store_with(&["a.png", "b.png", "c.png"]);
        let service = Arc::new(MockConvertService::new());
        let pool = ConversionPool::new(PoolConfig::default(), Arc::clone(&store), service);

        let settings = ConversionSettings::new("webp");
        let outcome = pool.convert_all(&settings).await.unwrap();

        assert_eq!(outcome.converted, 3);
        assert_eq!(outcome.failed, 0);
        assert_eq!(store.count_status(ItemStatus::Done), 3);
        assert_eq!(store.count_status(ItemStatus::Converting), 0);
    }

    #[tokio::test]
    async fn test_convert_all_mixed_results() {
        let store = store_with(&["ok.png", "bad.png", "also_ok.png"]);
        let service = Arc::new(MockConvertService::new().fail_for("bad.png", "decode error"));
        let pool = ConversionPool::new(PoolConfig::default(), Arc::clone(&store), service);

        let settings = ConversionSettings::new("webp");
        let outcome = pool.convert_all(&settings).await.unwrap();

        assert_eq!(outcome.converted, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(store.count_status(ItemStatus::Done), 2);
        assert_eq!(store.count_status(ItemStatus::Error), 1);
    }

    #[tokio::test]
    async fn test_convert_all_respects_concurrency_bound() {
        let store = store_with(&["a.png", "b.png", "c.png", "d.png", "e.png", "f.png"]);
        let service = Arc::new(MockConvertService::new().with_latency_ms(20));
        let config = PoolConfig { concurrency: 2 };
        let pool = ConversionPool::new(config, Arc::clone(&store), Arc::clone(&service));

        let settings = ConversionSettings::new("webp");
        pool.convert_all(&settings).await.unwrap();

        assert!(service.max_in_flight() <= 2);
        assert_eq!(store.count_status(ItemStatus::Done), 6);
    }

    #[tokio::test]
    async fn test_convert_all_rejects_reentrant_run() {
        let store = store_with(&["a.png"]);
        let service = Arc::new(MockConvertService::new().with_latency_ms(50));
        let pool = Arc::new(ConversionPool::new(
            PoolConfig::default(),
            store,
            service,
        ));

        let settings = ConversionSettings::new("webp");
        let first = {
            let pool = Arc::clone(&pool);
            let settings = settings.clone();
            tokio::spawn(async move { pool.convert_all(&settings).await })
        };

        // Wait until the first run has claimed the busy flag.
        while !pool.is_busy() {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        let second = pool.convert_all(&settings).await;
        assert!(matches!(second, Err(PoolError::Busy)));

        first.await.unwrap().unwrap();
        assert!(!pool.is_busy());
    }

    #[tokio::test]
    async fn test_convert_one_skips_done_item() {
        let store = store_with(&["a.png"]);
        let service = Arc::new(MockConvertService::new());
        let pool = ConversionPool::new(PoolConfig::default(), Arc::clone(&store), service);

        let settings = ConversionSettings::new("webp");
        assert!(pool.convert_one(1, &settings).await.unwrap());
        // Already done, begin_convert declines.
        assert!(!pool.convert_one(1, &settings).await.unwrap());
    }

    #[tokio::test]
    async fn test_removed_mid_flight_result_is_discarded() {
        let store = store_with(&["a.png"]);
        let service = Arc::new(MockConvertService::new().with_latency_ms(30));
        let pool = Arc::new(ConversionPool::new(
            PoolConfig::default(),
            Arc::clone(&store),
            service,
        ));

        let settings = ConversionSettings::new("webp");
        let run = {
            let pool = Arc::clone(&pool);
            let settings = settings.clone();
            tokio::spawn(async move { pool.convert_all(&settings).await })
        };

        // Remove the item while its request is in flight.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        store.remove(1);

        let outcome = run.await.unwrap().unwrap();
        assert_eq!(outcome.converted, 0);
        assert!(store.is_empty());
        // Both the preview and the orphaned result handle are revoked.
        assert_eq!(store.registry().active(), 0);
    }
}
