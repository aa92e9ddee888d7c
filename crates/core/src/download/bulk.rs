//! Paced bulk delivery of ready results.

use std::time::Duration;

use tracing::{info, warn};

use crate::item::ItemStore;
use crate::metrics;

use super::sink::DownloadSink;

const DEFAULT_PACE: Duration = Duration::from_millis(150);

/// Delivers every ready result through a sink, pausing between files.
///
/// Delivery runs in display order and never aborts on a failed file;
/// failures are logged and counted while the walk continues.
pub struct BulkDownloader {
    pace: Duration,
}

impl Default for BulkDownloader {
    fn default() -> Self {
        Self { pace: DEFAULT_PACE }
    }
}

impl BulkDownloader {
    pub fn new(pace: Duration) -> Self {
        Self { pace }
    }

    pub fn with_pace_ms(pace_ms: u64) -> Self {
        Self::new(Duration::from_millis(pace_ms))
    }

    /// Deliver all ready results. Returns the number delivered.
    pub async fn download_all<K>(&self, store: &ItemStore, sink: &K) -> usize
    where
        K: DownloadSink + ?Sized,
    {
        let results = store.ready_results();
        if results.is_empty() {
            info!("No converted results to deliver");
            return 0;
        }

        info!(count = results.len(), "Delivering converted results");
        let total = results.len();
        let mut delivered = 0;

        for (pos, result) in results.into_iter().enumerate() {
            match sink.deliver(&result.name, &result.bytes).await {
                Ok(()) => {
                    metrics::DOWNLOADS_DELIVERED.inc();
                    delivered += 1;
                }
                Err(e) => {
                    metrics::DOWNLOADS_FAILED.inc();
                    warn!(item_id = result.id, name = %result.name, error = %e, "Delivery failed");
                }
            }

            // Pause between files, not after the last one.
            if pos + 1 < total && !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }
        }

        info!(delivered, "Delivery finished");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemStore, SourceImage};
    use crate::testing::MockSink;
    use std::sync::Arc;

    fn store_with_done(names: &[&str]) -> Arc<ItemStore> {
        let store = Arc::new(ItemStore::new());
        let ids = store.add(
            names
                .iter()
                .map(|n| SourceImage {
                    name: n.to_string(),
                    bytes: vec![0],
                })
                .collect(),
        );
        for (id, name) in ids.into_iter().zip(names) {
            store.begin_convert(id).unwrap();
            let handle = store.registry().create(vec![9, 9, 9]);
            store.complete(id, handle, format!("{name}.webp"));
        }
        store
    }

    #[tokio::test]
    async fn test_download_all_delivers_in_display_order() {
        let store = store_with_done(&["a", "b", "c"]);
        let sink = MockSink::new();
        let downloader = BulkDownloader::with_pace_ms(0);

        let delivered = downloader.download_all(&store, &sink).await;

        assert_eq!(delivered, 3);
        assert_eq!(sink.delivered_names(), vec!["a.webp", "b.webp", "c.webp"]);
    }

    #[tokio::test]
    async fn test_download_all_empty_store() {
        let store = ItemStore::new();
        let sink = MockSink::new();
        let downloader = BulkDownloader::default();

        assert_eq!(downloader.download_all(&store, &sink).await, 0);
        assert!(sink.delivered_names().is_empty());
    }

    #[tokio::test]
    async fn test_download_all_skips_unconverted_items() {
        let store = store_with_done(&["done"]);
        store.add(vec![SourceImage {
            name: "idle.png".to_string(),
            bytes: vec![0],
        }]);
        let sink = MockSink::new();
        let downloader = BulkDownloader::with_pace_ms(0);

        let delivered = downloader.download_all(&store, &sink).await;

        assert_eq!(delivered, 1);
        assert_eq!(sink.delivered_names(), vec!["done.webp"]);
    }

    #[tokio::test]
    async fn test_download_all_continues_past_failures() {
        let store = store_with_done(&["a", "bad", "c"]);
        let sink = MockSink::new().fail_for("bad.webp");
        let downloader = BulkDownloader::with_pace_ms(0);

        let delivered = downloader.download_all(&store, &sink).await;

        assert_eq!(delivered, 2);
        assert_eq!(sink.delivered_names(), vec!["a.webp", "c.webp"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_all_paces_between_files() {
        let store = store_with_done(&["a", "b", "c"]);
        let sink = MockSink::new();
        let downloader = BulkDownloader::with_pace_ms(150);

        let start = tokio::time::Instant::now();
        downloader.download_all(&store, &sink).await;

        // Two pauses for three files, none after the last.
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }
}
