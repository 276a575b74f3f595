//! In-memory CRUD service with simulated network latency.

use std::time::Duration;

use agrilend_browser::Schema;
use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;

use crate::error::{ClientError, Result};
use crate::memory::page_of;
use crate::source::{PageRequest, PageResponse, RecordSource};

/// Artificial delay applied before every mock call resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latency {
    #[default]
    None,
    Fixed(Duration),
    /// Uniformly drawn from `min..=max` on every call.
    Random { min: Duration, max: Duration },
}

impl Latency {
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Latency::None
        } else {
            Latency::Fixed(Duration::from_millis(ms))
        }
    }

    /// The delay for one call.
    pub fn sample(&self) -> Duration {
        match *self {
            Latency::None => Duration::ZERO,
            Latency::Fixed(d) => d,
            Latency::Random { min, max } if max > min => {
                let ms = rand::rng().random_range(min.as_millis()..=max.as_millis());
                Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
            }
            Latency::Random { min, .. } => min,
        }
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Stand-in for a backend resource.
///
/// Records are identified by the schema's key column. Missing ids produce
/// [`ClientError::NotFound`]; nothing is retried and calls cannot be
/// cancelled once started.
#[derive(Debug)]
pub struct MockService<T> {
    kind: String,
    records: RwLock<Vec<T>>,
    schema: Schema<T>,
    latency: Latency,
}

impl<T> MockService<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(kind: impl Into<String>, records: Vec<T>, schema: Schema<T>) -> Self {
        MockService {
            kind: kind.into(),
            records: RwLock::new(records),
            schema,
            latency: Latency::None,
        }
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    pub async fn list(&self) -> Vec<T> {
        self.latency.wait().await;
        self.records.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<T> {
        self.latency.wait().await;
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| self.schema.record_key(r) == id)
            .cloned()
            .ok_or_else(|| self.missing(id))
    }

    /// Appends `record`. An existing record with the same key is replaced.
    pub async fn create(&self, record: T) -> T {
        self.latency.wait().await;
        let key = self.schema.record_key(&record);
        let mut records = self.records.write().await;
        records.retain(|r| self.schema.record_key(r) != key);
        records.push(record.clone());
        log::debug!("mock {}: created '{key}'", self.kind);
        record
    }

    pub async fn update(&self, id: &str, record: T) -> Result<T> {
        self.latency.wait().await;
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|r| self.schema.record_key(r) == id)
            .ok_or_else(|| self.missing(id))?;
        *slot = record.clone();
        log::debug!("mock {}: updated '{id}'", self.kind);
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.latency.wait().await;
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| self.schema.record_key(r) == id)
            .ok_or_else(|| self.missing(id))?;
        records.remove(index);
        log::debug!("mock {}: deleted '{id}'", self.kind);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    fn missing(&self, id: &str) -> ClientError {
        ClientError::not_found(self.kind.clone(), id)
    }
}

#[async_trait]
impl<T> RecordSource<T> for MockService<T>
where
    T: Clone + Send + Sync,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResponse<T>> {
        self.latency.wait().await;
        let records = self.records.read().await;
        Ok(page_of(&records, &self.schema, &request))
    }
}
