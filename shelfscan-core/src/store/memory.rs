//! In-process product store.
//!
//! Same id format and update semantics as [`MongoStore`](super::MongoStore);
//! records live only as long as the store value. Used by `--dry-run` and by
//! tests.

use super::{ProductRecord, ProductStore, ProductUpdate};
use crate::error::{CoreError, CoreResult};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<ObjectId, ProductRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, BTreeMap<ObjectId, ProductRecord>>> {
        self.records
            .lock()
            .map_err(|_| CoreError::Store("in-memory store lock poisoned".to_string()))
    }
}

impl ProductStore for MemoryStore {
    fn insert(&self, record: &ProductRecord) -> CoreResult<String> {
        let oid = ObjectId::new();
        let id = oid.to_hex();

        let mut stored = record.clone();
        stored.id = Some(id.clone());
        stored.processed_date = Some(Utc::now());

        self.lock()?.insert(oid, stored);
        log::debug!("Stored product record {} in memory", id);
        Ok(id)
    }

    fn get(&self, id: &str) -> CoreResult<Option<ProductRecord>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.lock()?.get(&oid).cloned())
    }

    fn get_all(&self) -> CoreResult<Vec<ProductRecord>> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn update(&self, id: &str, update: &ProductUpdate) -> CoreResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let mut records = self.lock()?;
        Ok(records
            .get_mut(&oid)
            .is_some_and(|record| update.apply_to(record)))
    }

    fn delete(&self, id: &str) -> CoreResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        Ok(self.lock()?.remove(&oid).is_some())
    }
}
