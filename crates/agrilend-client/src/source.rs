//! Data-source abstractions screens depend on.
//!
//! Production code fetches through [`RecordSource`] and [`OptionSource`];
//! tests and mock mode swap in the in-memory implementations.

use agrilend_browser::{FilterMap, FilterOption, DEFAULT_PAGE_SIZE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One page request as a screen issues it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(default, skip_serializing_if = "FilterMap::is_empty")]
    pub filters: FilterMap,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
            search: String::new(),
            filters: FilterMap::new(),
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, per_page: usize) -> Self {
        PageRequest {
            page: page.max(1),
            per_page: per_page.max(1),
            ..Default::default()
        }
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn filters(mut self, filters: FilterMap) -> Self {
        self.filters = filters;
        self
    }
}

/// Server pagination block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total_items: usize,
    pub per_page: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

impl PageMeta {
    /// Derives page counts the same way the browser does: at least one page.
    pub fn new(total_items: usize, per_page: usize, current_page: usize) -> Self {
        let per_page = per_page.max(1);
        PageMeta {
            total_items,
            per_page,
            current_page: current_page.max(1),
            total_pages: total_items.div_ceil(per_page).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

/// `{ "data": { "items": [...], "pagination": {...} } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub data: PageData<T>,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, pagination: PageMeta) -> Self {
        PageResponse {
            data: PageData { items, pagination },
        }
    }

    pub fn items(&self) -> &[T] {
        &self.data.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.data.items
    }

    pub fn pagination(&self) -> PageMeta {
        self.data.pagination
    }
}

/// A paged record fetch.
#[async_trait]
pub trait RecordSource<T>: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResponse<T>>;
}

/// Enumerated options for select filters.
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn fetch_options(&self, filter_id: &str) -> Result<Vec<FilterOption>>;
}
