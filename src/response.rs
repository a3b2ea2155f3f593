use serde::Serialize;
use std::collections::BTreeSet;

use crate::query::Page;
use crate::store::WisdomRecord;

pub const API_NAME: &str = "Tibetan Wisdom API";
pub const API_DESCRIPTION: &str = "Access over 1000 pieces of Tibetan wisdom from Buddhist masters and traditional teachings. Developed by Thukpa Labs.";

#[derive(Debug, Serialize)]
pub struct WisdomResponse<'a> {
    pub wisdom: &'a WisdomRecord,
}

#[derive(Debug, Serialize)]
pub struct WisdomListResponse<'a> {
    pub wisdom: Vec<&'a WisdomRecord>,
    pub total: usize,
    pub page: u64,
    pub per_page: u32,
}

impl<'a> From<Page<'a>> for WisdomListResponse<'a> {
    fn from(page: Page<'a>) -> Self {
        Self {
            wisdom: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InfoResponse<'a> {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub total_wisdom: usize,
    pub categories: &'a BTreeSet<String>,
    pub authors: &'a BTreeSet<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse<'a> {
    pub categories: &'a BTreeSet<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorsResponse<'a> {
    pub authors: &'a BTreeSet<String>,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse<'a> {
    pub sources: &'a BTreeSet<String>,
}
