use std::num::IntErrorKind;

use crate::error::{Result, WisdomError};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_LIST_PER_PAGE: u32 = 100;
pub const MAX_SEARCH_PER_PAGE: u32 = 50;

/// A validated pagination request: `page >= 1`, `1 <= per_page <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64, max_per_page: u32) -> Result<Self> {
        let page = u64::try_from(page)
            .ok()
            .filter(|&p| p >= 1)
            .ok_or_else(|| {
                WisdomError::Validation(format!("page must be greater than or equal to 1, got {}", page))
            })?;

        let per_page = u32::try_from(per_page)
            .ok()
            .filter(|&n| (1..=max_per_page).contains(&n))
            .ok_or_else(|| {
                WisdomError::Validation(format!(
                    "per_page must be between 1 and {}, got {}",
                    max_per_page, per_page
                ))
            })?;

        Ok(Self { page, per_page })
    }

    /// Apply defaults for omitted parameters, then validate.
    pub fn from_params(page: Option<i64>, per_page: Option<i64>, max_per_page: u32) -> Result<Self> {
        Self::new(
            page.unwrap_or(DEFAULT_PAGE),
            per_page.unwrap_or(DEFAULT_PER_PAGE),
            max_per_page,
        )
    }

    /// Index of the first item on this page, saturating for very large pages.
    pub fn offset(&self) -> usize {
        let offset = (self.page - 1).saturating_mul(u64::from(self.per_page));
        usize::try_from(offset).unwrap_or(usize::MAX)
    }
}

/// Request validation utilities
pub struct RequestValidator;

impl RequestValidator {
    /// The search query is required but may be empty.
    pub fn validate_search_query(q: Option<String>) -> Result<String> {
        q.ok_or_else(|| WisdomError::Validation("Missing required 'q' parameter".to_string()))
    }

    /// Parse a record id taken from the request path.
    ///
    /// Any integer is a well-formed id. Negative or oversized integers cannot
    /// name a stored record, so they are reported as not found.
    pub fn validate_id(raw: &str) -> Result<u64> {
        let raw = raw.trim();
        match raw.parse::<i128>() {
            Ok(id) => u64::try_from(id).map_err(|_| WisdomError::NotFound(raw.to_string())),
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                Err(WisdomError::NotFound(raw.to_string()))
            }
            Err(_) => Err(WisdomError::Validation(format!(
                "id must be an integer, got '{}'",
                raw
            ))),
        }
    }
}
