//! In-process stores backed by a mutex-guarded map.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{CounterSink, JobStore, StoreError};
use crate::models::job::Job;
use crate::services::claim::claim_first_queued;

pub type JobTable = BTreeMap<Uuid, Job>;

/// Job store kept in memory. Iteration order is key order, so it has no
/// relation to insertion order.
#[derive(Default)]
pub struct MemoryJobStore {
    table: Mutex<JobTable>,
    writes: AtomicU64,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, JobTable> {
        // A panic inside a transaction closure leaves the map usable.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` with exclusive access to the table. Reads and writes made by
    /// `f` are isolated from every other call on this store.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut JobTable) -> R) -> R {
        let mut table = self.lock();
        f(&mut table)
    }

    /// Number of writes performed through the store API.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn scan(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.transaction(|table| table.values().cloned().collect()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.transaction(|table| table.get(&id).cloned()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Job>, StoreError> {
        Ok(self.transaction(|table| table.values().find(|job| job.name == name).cloned()))
    }

    async fn put(&self, job: &Job) -> Result<(), StoreError> {
        self.transaction(|table| table.insert(job.id, job.clone()));
        self.record_write();
        Ok(())
    }

    async fn insert_unique(&self, job: &Job) -> Result<bool, StoreError> {
        let inserted = self.transaction(|table| {
            if table.values().any(|existing| existing.name == job.name) {
                return false;
            }
            table.insert(job.id, job.clone());
            true
        });
        if inserted {
            self.record_write();
        }
        Ok(inserted)
    }

    async fn claim_next(&self) -> Result<Option<Job>, StoreError> {
        let claimed = self.transaction(|table| claim_first_queued(table.values_mut()));
        if claimed.is_some() {
            self.record_write();
        }
        Ok(claimed)
    }
}

/// Counter sink kept in memory.
#[derive(Default)]
pub struct MemoryCounters {
    counters: Mutex<HashMap<String, u64>>,
}

impl MemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CounterSink for MemoryCounters {
    async fn increment(&self, key: &str) -> Result<(), StoreError> {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *counters.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.snapshot().get(key).copied().unwrap_or(0))
    }
}
