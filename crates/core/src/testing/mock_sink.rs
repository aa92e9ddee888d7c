//! Mock download sink for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::download::{DownloadSink, SinkError};

/// A delivery recorded by [`MockSink`].
#[derive(Debug, Clone)]
pub struct Delivery {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Mock sink that records deliveries in order.
pub struct MockSink {
    deliveries: Mutex<Vec<Delivery>>,
    failures: Mutex<HashSet<String>>,
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            failures: Mutex::new(HashSet::new()),
        }
    }

    /// Script a failure for deliveries with this name.
    pub fn fail_for(self, name: &str) -> Self {
        self.failures.lock().unwrap().insert(name.to_string());
        self
    }

    /// Names of successful deliveries, in delivery order.
    pub fn delivered_names(&self) -> Vec<String> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    /// All successful deliveries, in delivery order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadSink for MockSink {
    async fn deliver(&self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        if self.failures.lock().unwrap().contains(name) {
            return Err(SinkError::Io(std::io::Error::other("mock delivery failure")));
        }
        self.deliveries.lock().unwrap().push(Delivery {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
