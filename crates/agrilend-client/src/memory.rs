//! In-memory sources.

use std::collections::BTreeMap;

use agrilend_browser::{BrowseQuery, Capabilities, FilterOption, Schema};
use async_trait::async_trait;

use crate::error::Result;
use crate::source::{OptionSource, PageMeta, PageRequest, PageResponse, RecordSource};

/// Runs `request` over `records` with the browser pipeline and clones out the
/// requested page.
pub fn page_of<T: Clone>(
    records: &[T],
    schema: &Schema<T>,
    request: &PageRequest,
) -> PageResponse<T> {
    let mut query = BrowseQuery::new()
        .search(request.search.clone())
        .page(request.page)
        .page_size(request.per_page);
    query.filters = request.filters.clone();

    let view = query.run(records, schema, Capabilities::default());
    let info = &view.info;
    let meta = PageMeta::new(info.filtered_count, info.page_size, info.page);
    PageResponse::new(view.rows.into_iter().cloned().collect(), meta)
}

/// Serves pages out of a vector without any delay.
#[derive(Debug)]
pub struct InMemorySource<T> {
    records: Vec<T>,
    schema: Schema<T>,
}

impl<T> InMemorySource<T> {
    pub fn new(records: Vec<T>, schema: Schema<T>) -> Self {
        InMemorySource { records, schema }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }
}

#[async_trait]
impl<T> RecordSource<T> for InMemorySource<T>
where
    T: Clone + Send + Sync,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResponse<T>> {
        Ok(page_of(&self.records, &self.schema, &request))
    }
}

/// Fixed option lists keyed by filter id. Unknown ids yield an empty list.
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    options: BTreeMap<String, Vec<FilterOption>>,
}

impl StaticOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter_id: impl Into<String>, options: Vec<FilterOption>) -> Self {
        self.options.insert(filter_id.into(), options);
        self
    }

    /// Collects the declared options of every select filter in `schema`.
    pub fn from_schema<T>(schema: &Schema<T>) -> Self {
        let options = schema
            .filters()
            .iter()
            .filter(|f| !f.options.is_empty())
            .map(|f| (f.id.clone(), f.options.clone()))
            .collect();
        StaticOptions { options }
    }
}

#[async_trait]
impl OptionSource for StaticOptions {
    async fn fetch_options(&self, filter_id: &str) -> Result<Vec<FilterOption>> {
        Ok(self.options.get(filter_id).cloned().unwrap_or_default())
    }
}
