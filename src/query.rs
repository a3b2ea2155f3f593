//! Filtering, search and pagination over the record store.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, WisdomError};
use crate::store::{FoldedFields, RecordStore, WisdomRecord};
use crate::validation::PageRequest;

/// Field filters for listing. Absent or empty values do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    category: Option<String>,
    author: Option<String>,
    source: Option<String>,
}

impl ListFilters {
    pub fn new(category: Option<&str>, author: Option<&str>, source: Option<&str>) -> Self {
        Self {
            category: fold(category),
            author: fold(author),
            source: fold(source),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.author.is_none() && self.source.is_none()
    }

    fn matches(&self, fields: &FoldedFields) -> bool {
        // category is exact, author and source are substring matches
        self.category.as_deref().map_or(true, |c| fields.category == c)
            && self.author.as_deref().map_or(true, |a| fields.author.contains(a))
            && self.source.as_deref().map_or(true, |s| fields.source.contains(s))
    }
}

fn fold(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_lowercase)
}

/// One page of matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a WisdomRecord>,
    /// Number of records matching the query before pagination.
    pub total: usize,
    pub page: u64,
    pub per_page: u32,
}

pub struct QueryEngine<'a> {
    store: &'a RecordStore,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    pub fn random(&self) -> Result<&'a WisdomRecord> {
        self.random_with(&mut rand::thread_rng())
    }

    /// Pick a record uniformly at random using the given entropy source.
    pub fn random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&'a WisdomRecord> {
        self.store
            .all()
            .choose(rng)
            .ok_or(WisdomError::EmptyCollection)
    }

    pub fn list(&self, filters: &ListFilters, request: PageRequest) -> Page<'a> {
        let matches = self
            .store
            .iter_folded()
            .filter(|(_, fields)| filters.matches(fields))
            .map(|(record, _)| record);
        paginate(matches, request)
    }

    /// Case-insensitive substring search over text, author and source.
    pub fn search(&self, query: &str, request: PageRequest) -> Page<'a> {
        let needle = query.to_lowercase();
        let matches = self
            .store
            .iter_folded()
            .filter(|(_, fields)| {
                fields.text.contains(&needle)
                    || fields.author.contains(&needle)
                    || fields.source.contains(&needle)
            })
            .map(|(record, _)| record);
        paginate(matches, request)
    }

    pub fn get(&self, id: u64) -> Result<&'a WisdomRecord> {
        self.store.get_by_id(id).ok_or_else(|| WisdomError::NotFound(id.to_string()))
    }
}

fn paginate<'a>(matches: impl Iterator<Item = &'a WisdomRecord>, request: PageRequest) -> Page<'a> {
    let matches: Vec<&WisdomRecord> = matches.collect();
    let total = matches.len();
    let items = matches
        .into_iter()
        .skip(request.offset())
        .take(request.per_page as usize)
        .collect();

    Page {
        items,
        total,
        page: request.page,
        per_page: request.per_page,
    }
}
