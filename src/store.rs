//! In-memory record store.
//!
//! The store is built once at startup from the quotes collection document and
//! is never mutated afterwards, so it can be shared between request tasks
//! behind an `Arc` without locking.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Result, WisdomError};

/// A single quotation with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WisdomRecord {
    pub id: u64,
    pub text: String,
    pub author: String,
    pub source: String,
    pub category: String,
    pub language: String,
}

/// Lowercased copies of the fields queries compare against.
#[derive(Debug, Clone)]
pub(crate) struct FoldedFields {
    pub text: String,
    pub author: String,
    pub source: String,
    pub category: String,
}

impl FoldedFields {
    fn from_record(record: &WisdomRecord) -> Self {
        Self {
            text: record.text.to_lowercase(),
            author: record.author.to_lowercase(),
            source: record.source.to_lowercase(),
            category: record.category.to_lowercase(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Collection {
    #[serde(default)]
    metadata: Option<CollectionMetadata>,
    #[serde(alias = "records")]
    quotes: Vec<WisdomRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct CollectionMetadata {
    #[serde(default)]
    total_quotes: Option<usize>,
}

/// The collection may sit at the top level or under a single named key,
/// e.g. `{"tibetan_quotes_collection": {"metadata": ..., "quotes": [...]}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Bare(Collection),
    Named(HashMap<String, Collection>),
}

impl Document {
    fn into_collection(self) -> Result<Collection> {
        match self {
            Document::Bare(collection) => Ok(collection),
            Document::Named(mut named) => {
                if named.len() != 1 {
                    return Err(WisdomError::DataLoad(format!(
                        "expected exactly one named collection, found {}",
                        named.len()
                    )));
                }
                named
                    .drain()
                    .next()
                    .map(|(_, collection)| collection)
                    .ok_or_else(|| WisdomError::DataLoad("empty document".to_string()))
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<WisdomRecord>,
    folded: Vec<FoldedFields>,
    by_id: HashMap<u64, usize>,
    categories: BTreeSet<String>,
    authors: BTreeSet<String>,
    sources: BTreeSet<String>,
}

impl RecordStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the store from a JSON document on disk.
    ///
    /// A missing file yields an empty store. Any other read failure, a
    /// malformed document, or an invalid record is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Wisdom data file not found, serving an empty collection");
                return Ok(Self::empty());
            }
            Err(e) => {
                return Err(WisdomError::DataLoad(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let store = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            records = store.count(),
            categories = store.categories.len(),
            authors = store.authors.len(),
            "Loaded wisdom collection"
        );
        Ok(store)
    }

    /// Parse a store from the text of a collection document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let document: Document = serde_json::from_str(raw)
            .map_err(|e| WisdomError::DataLoad(format!("malformed collection document: {}", e)))?;
        let collection = document.into_collection()?;

        if let Some(declared) = collection.metadata.and_then(|m| m.total_quotes) {
            if declared != collection.quotes.len() {
                warn!(
                    declared,
                    loaded = collection.quotes.len(),
                    "Collection metadata total_quotes does not match the number of quotes"
                );
            }
        }

        Self::from_records(collection.quotes)
    }

    /// Build a store from records in load order.
    pub fn from_records(records: Vec<WisdomRecord>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut categories = BTreeSet::new();
        let mut authors = BTreeSet::new();
        let mut sources = BTreeSet::new();

        for (position, record) in records.iter().enumerate() {
            if record.text.is_empty() {
                return Err(WisdomError::DataLoad(format!(
                    "record {} has empty text",
                    record.id
                )));
            }
            if by_id.insert(record.id, position).is_some() {
                return Err(WisdomError::DataLoad(format!(
                    "duplicate record id {}",
                    record.id
                )));
            }
            categories.insert(record.category.clone());
            authors.insert(record.author.clone());
            sources.insert(record.source.clone());
        }

        let folded = records.iter().map(FoldedFields::from_record).collect();

        Ok(Self {
            records,
            folded,
            by_id,
            categories,
            authors,
            sources,
        })
    }

    pub fn get_by_id(&self, id: u64) -> Option<&WisdomRecord> {
        self.by_id.get(&id).map(|&position| &self.records[position])
    }

    /// All records in load order.
    pub fn all(&self) -> &[WisdomRecord] {
        &self.records
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn authors(&self) -> &BTreeSet<String> {
        &self.authors
    }

    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn iter_folded(&self) -> impl Iterator<Item = (&WisdomRecord, &FoldedFields)> {
        self.records.iter().zip(self.folded.iter())
    }
}
