// ============================================================================
// shelfscan-core/src/store/mod.rs
// ============================================================================
//
// METADATA STORE: Persistence of Product Records
//
// Product records are kept in a single document collection keyed by an
// opaque identifier (a BSON ObjectId rendered as 24 hex characters). The
// store stamps every insert with the processing time; the pipeline only ever
// inserts, while get/update/delete are available to other callers.
//
// KEY COMPONENTS:
// - ProductRecord: one stored product with its provenance
// - ProductUpdate: sparse set of fields for partial updates
// - ProductStore: the storage trait
// - MongoStore: MongoDB-backed implementation
// - MemoryStore: in-process implementation for dry runs and tests

// ---- Internal crate imports ----
use crate::error::CoreResult;
use crate::processing::text_extractor::ProductInfo;

// ---- External crate imports ----
use chrono::{DateTime, Utc};

// ---- Standard library imports ----
use std::path::Path;

/// In-process store
pub mod memory;

/// MongoDB-backed store
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

// ============================================================================
// RECORD TYPES
// ============================================================================

/// A product extracted from one cropped object, with its provenance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductRecord {
    /// Store identifier; `None` until the record has been inserted
    pub id: Option<String>,
    pub product_name: String,
    pub company_name: String,
    pub product_description: String,
    pub confidence: f64,
    pub raw_text: String,
    pub source_video: String,
    pub source_frame: String,
    pub object_image: String,
    /// Set by the store on insert
    pub processed_date: Option<DateTime<Utc>>,
}

impl ProductRecord {
    /// Combines parsed OCR output with the paths it came from.
    pub fn from_product(info: ProductInfo, video: &Path, frame: &Path, object: &Path) -> Self {
        Self {
            id: None,
            product_name: info.product_name,
            company_name: info.company_name,
            product_description: info.product_description,
            confidence: info.confidence,
            raw_text: info.raw_text,
            source_video: video.display().to_string(),
            source_frame: frame.display().to_string(),
            object_image: object.display().to_string(),
            processed_date: None,
        }
    }
}

/// Fields to overwrite on an existing record. `None` leaves a field as is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductUpdate {
    pub product_name: Option<String>,
    pub company_name: Option<String>,
    pub product_description: Option<String>,
    pub confidence: Option<f64>,
    pub raw_text: Option<String>,
    pub source_video: Option<String>,
    pub source_frame: Option<String>,
    pub object_image: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes the present fields into `record`, returning whether any value
    /// actually changed.
    pub fn apply_to(&self, record: &mut ProductRecord) -> bool {
        fn merge<T: Clone + PartialEq>(target: &mut T, value: &Option<T>) -> bool {
            match value {
                Some(v) if target != v => {
                    *target = v.clone();
                    true
                }
                _ => false,
            }
        }

        let mut changed = false;
        changed |= merge(&mut record.product_name, &self.product_name);
        changed |= merge(&mut record.company_name, &self.company_name);
        changed |= merge(&mut record.product_description, &self.product_description);
        changed |= merge(&mut record.confidence, &self.confidence);
        changed |= merge(&mut record.raw_text, &self.raw_text);
        changed |= merge(&mut record.source_video, &self.source_video);
        changed |= merge(&mut record.source_frame, &self.source_frame);
        changed |= merge(&mut record.object_image, &self.object_image);
        changed
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// CRUD access to the product collection.
pub trait ProductStore {
    /// Stamps `processed_date` with the current UTC time, persists the
    /// record and returns its new id.
    fn insert(&self, record: &ProductRecord) -> CoreResult<String>;

    /// Returns the record with `id`, or `None` if it does not exist or `id`
    /// is not a valid identifier.
    fn get(&self, id: &str) -> CoreResult<Option<ProductRecord>>;

    fn get_all(&self) -> CoreResult<Vec<ProductRecord>>;

    /// Applies `update` and returns true only if a record was modified.
    fn update(&self, id: &str, update: &ProductUpdate) -> CoreResult<bool>;

    /// Returns whether a record was removed.
    fn delete(&self, id: &str) -> CoreResult<bool>;
}

impl<S: ProductStore + ?Sized> ProductStore for &S {
    fn insert(&self, record: &ProductRecord) -> CoreResult<String> {
        (**self).insert(record)
    }

    fn get(&self, id: &str) -> CoreResult<Option<ProductRecord>> {
        (**self).get(id)
    }

    fn get_all(&self) -> CoreResult<Vec<ProductRecord>> {
        (**self).get_all()
    }

    fn update(&self, id: &str, update: &ProductUpdate) -> CoreResult<bool> {
        (**self).update(id, update)
    }

    fn delete(&self, id: &str) -> CoreResult<bool> {
        (**self).delete(id)
    }
}
