//! MongoDB-backed product store.
//!
//! Uses the synchronous driver API. Records are persisted through a private
//! document mirror so the public [`ProductRecord`] stays free of BSON types.

use super::{ProductRecord, ProductStore, ProductUpdate};
use crate::config::DatabaseConfig;
use crate::error::{CoreError, CoreResult};
use chrono::{TimeZone, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document, doc};
use mongodb::sync::{Client, Collection};
use serde::{Deserialize, Serialize};

/// Stored shape of a product record.
///
/// Every field but `_id` falls back to its default so documents written by
/// other clients with missing keys still load.
#[derive(Debug, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    product_description: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    raw_text: String,
    #[serde(default)]
    source_video: String,
    #[serde(default)]
    source_frame: String,
    #[serde(default)]
    object_image: String,
    #[serde(default)]
    processed_date: Option<bson::DateTime>,
}

impl ProductDocument {
    fn new(id: ObjectId, record: &ProductRecord) -> Self {
        Self {
            id,
            product_name: record.product_name.clone(),
            company_name: record.company_name.clone(),
            product_description: record.product_description.clone(),
            confidence: record.confidence,
            raw_text: record.raw_text.clone(),
            source_video: record.source_video.clone(),
            source_frame: record.source_frame.clone(),
            object_image: record.object_image.clone(),
            processed_date: record
                .processed_date
                .map(|date| bson::DateTime::from_millis(date.timestamp_millis())),
        }
    }
}

impl From<ProductDocument> for ProductRecord {
    fn from(document: ProductDocument) -> Self {
        Self {
            id: Some(document.id.to_hex()),
            product_name: document.product_name,
            company_name: document.company_name,
            product_description: document.product_description,
            confidence: document.confidence,
            raw_text: document.raw_text,
            source_video: document.source_video,
            source_frame: document.source_frame,
            object_image: document.object_image,
            processed_date: document
                .processed_date
                .and_then(|date| Utc.timestamp_millis_opt(date.timestamp_millis()).single()),
        }
    }
}

/// Builds the `$set` body for a partial update.
fn set_document(update: &ProductUpdate) -> Document {
    let mut set = Document::new();
    let text_fields = [
        ("product_name", &update.product_name),
        ("company_name", &update.company_name),
        ("product_description", &update.product_description),
        ("raw_text", &update.raw_text),
        ("source_video", &update.source_video),
        ("source_frame", &update.source_frame),
        ("object_image", &update.object_image),
    ];
    for (key, value) in text_fields {
        if let Some(value) = value {
            set.insert(key, value.clone());
        }
    }
    if let Some(confidence) = update.confidence {
        set.insert("confidence", confidence);
    }
    set
}

/// `ProductStore` over one MongoDB collection.
pub struct MongoStore {
    collection: Collection<ProductDocument>,
}

impl MongoStore {
    /// Connects using the `database` configuration section.
    ///
    /// The driver connects lazily; a server that is unreachable surfaces as a
    /// store error on the first operation.
    pub fn connect(config: &DatabaseConfig) -> CoreResult<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri).map_err(|e| {
            CoreError::Store(format!(
                "Failed to create MongoDB client for {}: {e}",
                config.mongodb_uri
            ))
        })?;
        let collection = client
            .database(&config.database_name)
            .collection::<ProductDocument>(&config.collection_name);

        log::debug!(
            "Using MongoDB collection {}.{}",
            config.database_name,
            config.collection_name
        );
        Ok(Self { collection })
    }
}

impl ProductStore for MongoStore {
    fn insert(&self, record: &ProductRecord) -> CoreResult<String> {
        let mut stamped = record.clone();
        stamped.processed_date = Some(Utc::now());

        let oid = ObjectId::new();
        self.collection
            .insert_one(ProductDocument::new(oid, &stamped), None)?;
        Ok(oid.to_hex())
    }

    fn get(&self, id: &str) -> CoreResult<Option<ProductRecord>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let found = self.collection.find_one(doc! { "_id": oid }, None)?;
        Ok(found.map(ProductRecord::from))
    }

    fn get_all(&self) -> CoreResult<Vec<ProductRecord>> {
        let cursor = self.collection.find(None, None)?;
        cursor
            .map(|document| -> CoreResult<ProductRecord> { Ok(ProductRecord::from(document?)) })
            .collect()
    }

    fn update(&self, id: &str, update: &ProductUpdate) -> CoreResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        if update.is_empty() {
            return Ok(false);
        }

        let result = self.collection.update_one(
            doc! { "_id": oid },
            doc! { "$set": set_document(update) },
            None,
        )?;
        Ok(result.modified_count > 0)
    }

    fn delete(&self, id: &str) -> CoreResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }, None)?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_document_only_present_fields() {
        let update = ProductUpdate {
            product_name: Some("Acme".to_string()),
            confidence: Some(91.0),
            ..Default::default()
        };
        let set = set_document(&update);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("product_name").unwrap(), "Acme");
        assert_eq!(set.get_f64("confidence").unwrap(), 91.0);
    }

    #[test]
    fn test_document_roundtrip_keeps_millisecond_date() {
        let record = ProductRecord {
            product_name: "Acme".to_string(),
            processed_date: Utc.timestamp_millis_opt(1_700_000_000_123).single(),
            ..Default::default()
        };
        let oid = ObjectId::new();

        let document = bson::to_document(&ProductDocument::new(oid, &record)).unwrap();
        assert_eq!(document.get_object_id("_id").unwrap(), oid);

        let restored: ProductDocument = bson::from_document(document).unwrap();
        let restored = ProductRecord::from(restored);
        assert_eq!(restored.id, Some(oid.to_hex()));
        assert_eq!(restored.processed_date, record.processed_date);
        assert_eq!(restored.product_name, "Acme");
    }

    #[test]
    fn test_sparse_document_loads_with_defaults() {
        let oid = ObjectId::new();
        let sparse = doc! { "_id": oid, "product_name": "Acme", "confidence": 72.5 };

        let document: ProductDocument = bson::from_document(sparse).unwrap();
        let record = ProductRecord::from(document);
        assert_eq!(record.id, Some(oid.to_hex()));
        assert_eq!(record.product_name, "Acme");
        assert_eq!(record.confidence, 72.5);
        assert_eq!(record.raw_text, "");
        assert_eq!(record.source_video, "");
        assert_eq!(record.processed_date, None);
    }

    #[test]
    fn test_connect_rejects_malformed_uri() {
        let config = DatabaseConfig {
            mongodb_uri: "not-a-mongodb-uri".to_string(),
            database_name: "shelfscan".to_string(),
            collection_name: "products".to_string(),
        };
        assert!(matches!(MongoStore::connect(&config), Err(CoreError::Store(_))));
    }
}
