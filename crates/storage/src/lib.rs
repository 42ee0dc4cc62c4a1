use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use shared::domain::{Record, RecordId};

/// Backing store for submitted records. The only mutations are append and
/// full clear; records never change after `create` returns them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, fields: Map<String, Value>) -> Result<Record>;
    async fn list(&self) -> Result<Vec<Record>>;
    /// Drops every record and returns how many were removed.
    async fn clear(&self) -> Result<usize>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    last_id: Option<RecordId>,
}

/// Process-local store. Contents live as long as the process does and are
/// not shared between instances.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            clock,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Ids are creation times in milliseconds, bumped past the last issued id
/// so that two creates in the same millisecond still get distinct ids.
fn next_id(timestamp: &DateTime<Utc>, last_id: Option<RecordId>) -> RecordId {
    let candidate = timestamp.timestamp_millis();
    match last_id {
        Some(RecordId(last)) if candidate <= last => RecordId(last + 1),
        _ => RecordId(candidate),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, fields: Map<String, Value>) -> Result<Record> {
        let mut guard = self.inner.write().await;
        // Stored at the precision the wire format carries.
        let timestamp = self.clock.now().trunc_subsecs(3);
        let id = next_id(&timestamp, guard.last_id);
        let record = Record::new(id, timestamp, fields);
        guard.last_id = Some(id);
        guard.records.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<Record>> {
        Ok(self.inner.read().await.records.clone())
    }

    async fn clear(&self) -> Result<usize> {
        let mut guard = self.inner.write().await;
        let removed = guard.records.len();
        guard.records.clear();
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
