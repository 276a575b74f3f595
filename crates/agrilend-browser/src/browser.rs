//! Stateful record browser.
//!
//! [`RecordBrowser`] owns the loaded records, the schema and the ephemeral
//! UI state (search, filters, sort, page, selection). Setters only change
//! state; [`RecordBrowser::view`] re-runs the whole pipeline each time.

use crate::aggregate::TotalsScope;
use crate::capabilities::Capabilities;
use crate::error::{BrowserError, Result};
use crate::export::{ExportFormat, ExportHooks};
use crate::filter::{FilterMap, FilterValue};
use crate::ordering::{Dir, SortSpec};
use crate::page::Pagination;
use crate::query::{BrowseQuery, BrowseView};
use crate::schema::Schema;
use crate::selection::Selection;

/// A record listing with its interaction state.
///
/// # Example
///
/// ```
/// use agrilend_browser::{ColumnSpec, RecordBrowser, Schema, TableVariant, Value};
///
/// struct Farmer { id: u32, name: String }
///
/// let schema = Schema::builder()
///     .column(ColumnSpec::new("id", "ID", |f: &Farmer| Value::from(f.id)))
///     .column(ColumnSpec::new("name", "Name", |f: &Farmer| Value::from(&f.name)))
///     .build()
///     .unwrap();
///
/// let farmers = (1..=12)
///     .map(|id| Farmer { id, name: format!("Farmer {id:02}") })
///     .collect();
///
/// let mut browser = RecordBrowser::new(farmers, schema)
///     .with_capabilities(TableVariant::Selectable.capabilities());
/// browser.set_page(2);
/// browser.select_all();
///
/// assert_eq!(browser.view().len(), 2);
/// assert_eq!(browser.selection().len(), 2);
/// ```
#[derive(Debug)]
pub struct RecordBrowser<T> {
    records: Vec<T>,
    schema: Schema<T>,
    capabilities: Capabilities,
    query: BrowseQuery,
    selection: Selection,
    exports: ExportHooks<T>,
    clear_selection_on_reset: bool,
}

impl<T> RecordBrowser<T> {
    pub fn new(records: Vec<T>, schema: Schema<T>) -> Self {
        RecordBrowser {
            records,
            schema,
            capabilities: Capabilities::default(),
            query: BrowseQuery::new(),
            selection: Selection::new(),
            exports: ExportHooks::new(),
            clear_selection_on_reset: true,
        }
    }

    pub fn with_capabilities(mut self, capabilities: impl Into<Capabilities>) -> Self {
        self.capabilities = capabilities.into();
        if !self.capabilities.selection {
            self.selection.select_none();
        }
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.query.pagination = Pagination::new(1, page_size);
        self
    }

    pub fn with_exports(mut self, exports: ExportHooks<T>) -> Self {
        self.exports = exports;
        self
    }

    /// Whether [`reset_filters`](Self::reset_filters) also clears the selection
    /// (default `true`).
    pub fn clear_selection_on_reset(mut self, clear: bool) -> Self {
        self.clear_selection_on_reset = clear;
        self
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn query(&self) -> &BrowseQuery {
        &self.query
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn search(&self) -> &str {
        &self.query.search
    }

    pub fn filters(&self) -> &FilterMap {
        &self.query.filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.query.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.query.pagination.page
    }

    pub fn page_size(&self) -> usize {
        self.query.pagination.page_size
    }

    /// Runs the pipeline over the loaded records.
    pub fn view(&self) -> BrowseView<'_, T> {
        self.query.run(&self.records, &self.schema, self.capabilities)
    }

    /// Number of records surviving search and filters.
    pub fn filtered_count(&self) -> usize {
        self.query.count(&self.records, &self.schema)
    }

    pub fn page_count(&self) -> usize {
        if self.capabilities.pagination {
            self.query.pagination.page_count(self.filtered_count())
        } else {
            1
        }
    }

    /// Replaces the loaded records wholesale, as after a refetch.
    ///
    /// Selected keys that no longer exist are dropped and the page is clamped.
    pub fn replace_records(&mut self, records: Vec<T>) {
        self.records = records;
        let keys: std::collections::HashSet<String> =
            self.records.iter().map(|r| self.schema.record_key(r)).collect();
        let dropped = self.selection.retain(|k| keys.contains(k));
        if dropped > 0 {
            log::debug!("dropped {dropped} selected keys no longer loaded");
        }
        self.clamp_page();
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.query.search {
            self.query.search = text;
            self.first_page();
        }
    }

    /// Sets one filter; inactive values (`""`, `"all"`) clear it.
    pub fn set_filter(&mut self, id: &str, value: impl Into<FilterValue>) {
        if self.query.filters.set(id, value) {
            self.first_page();
        }
    }

    pub fn clear_filter(&mut self, id: &str) {
        if self.query.filters.remove(id) {
            self.first_page();
        }
    }

    /// Clears search and every filter. Calling it twice is the same as once.
    pub fn reset_filters(&mut self) {
        self.query.filters.clear();
        self.query.search.clear();
        if self.clear_selection_on_reset {
            self.selection.select_none();
        }
        self.first_page();
    }

    /// Returns every piece of state to its initial value.
    pub fn reset(&mut self) {
        let page_size = self.query.pagination.page_size;
        self.query = BrowseQuery::new().page_size(page_size);
        self.selection.select_none();
    }

    pub fn set_sort(&mut self, column: &str, dir: Dir) {
        self.query.sort = Some(SortSpec::new(column, dir));
    }

    pub fn clear_sort(&mut self) {
        self.query.sort = None;
    }

    /// Header click: none → asc → desc → none. A different column starts at
    /// asc. Columns marked unsortable are left alone.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.schema.column(column).is_some_and(|c| !c.sortable) {
            log::debug!("column '{column}' is not sortable");
            return;
        }
        self.query.sort = match self.query.sort.take() {
            Some(sort) if sort.column == column => match sort.dir {
                Dir::Asc => Some(SortSpec::desc(column)),
                Dir::Desc => None,
            },
            _ => Some(SortSpec::asc(column)),
        };
    }

    /// Moves to `page`, clamped to `[1, page_count]`.
    pub fn set_page(&mut self, page: usize) {
        self.query.pagination.page = page.clamp(1, self.page_count());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page().saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page().saturating_sub(1));
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.query.pagination = Pagination::new(1, page_size);
    }

    pub fn set_totals_scope(&mut self, scope: TotalsScope) {
        self.query.totals = scope;
    }

    /// Selects every record on the current page.
    pub fn select_all(&mut self) {
        if !self.selection_enabled() {
            return;
        }
        let keys = self.view().keys(&self.schema);
        self.selection.select_all(keys);
    }

    pub fn select_none(&mut self) {
        self.selection.select_none();
    }

    /// Header checkbox on the current page.
    pub fn toggle_all(&mut self) {
        if !self.selection_enabled() {
            return;
        }
        let keys = self.view().keys(&self.schema);
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.selection.toggle_all(&refs);
    }

    /// Flips one record. Keys that are not loaded are ignored.
    pub fn toggle(&mut self, key: &str) -> bool {
        if !self.selection_enabled() {
            return false;
        }
        if self.find(key).is_none() {
            log::debug!("ignoring toggle of unknown key '{key}'");
            return false;
        }
        self.selection.toggle(key)
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.is_selected(key)
    }

    /// Header checkbox mixed state for the current page.
    pub fn is_indeterminate(&self) -> bool {
        let keys = self.view().keys(&self.schema);
        let selected = keys.iter().filter(|k| self.selection.is_selected(k)).count();
        selected > 0 && selected < keys.len()
    }

    /// Selected records in source order.
    pub fn selected_records(&self) -> Vec<&T> {
        self.records
            .iter()
            .filter(|r| self.selection.is_selected(&self.schema.record_key(r)))
            .collect()
    }

    pub fn find(&self, key: &str) -> Option<&T> {
        self.records.iter().find(|r| self.schema.record_key(r) == key)
    }

    /// Invokes the row action labelled `label` on the record with `key`.
    pub fn run_action(&self, label: &str, key: &str) -> Result<()> {
        let action = self
            .schema
            .actions()
            .iter()
            .find(|a| a.label == label)
            .ok_or_else(|| BrowserError::UnknownAction(label.to_string()))?;
        let record = self
            .find(key)
            .ok_or_else(|| BrowserError::UnknownRecord(key.to_string()))?;
        action.invoke(record);
        Ok(())
    }

    /// Invokes the bulk action labelled `label` on the selection. Returns the
    /// number of records passed to it.
    pub fn run_bulk_action(&self, label: &str) -> Result<usize> {
        let action = self
            .schema
            .bulk_actions()
            .iter()
            .find(|a| a.label == label)
            .ok_or_else(|| BrowserError::UnknownAction(label.to_string()))?;
        let selected = self.selected_records();
        action.invoke(&selected);
        Ok(selected.len())
    }

    /// Exports every row matching search and filters, in display order.
    pub fn export(&self, format: ExportFormat) -> bool {
        let rows = self.query.filter_sorted(&self.records, &self.schema);
        self.exports.export(format, &rows, &self.schema)
    }

    fn selection_enabled(&self) -> bool {
        if !self.capabilities.selection {
            log::debug!("selection is disabled for this browser");
        }
        self.capabilities.selection
    }

    fn first_page(&mut self) {
        self.query.pagination.page = 1;
    }

    fn clamp_page(&mut self) {
        let count = self.filtered_count();
        self.query.pagination = self.query.pagination.clamped(count);
    }
}
