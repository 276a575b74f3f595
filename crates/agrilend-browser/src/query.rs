//! Query builder and pipeline executor.
//!
//! A [`BrowseQuery`] holds the inputs of the pipeline apart from the records
//! themselves. Running it is a pure function:
//!
//! ```text
//! records ─▶ search ─▶ filter ─▶ sort ─▶ paginate ─▶ rows
//!                                  └──────▶ totals (filtered or page scope)
//! ```

use serde::{Deserialize, Serialize};

use crate::aggregate::{Totals, TotalsScope};
use crate::capabilities::Capabilities;
use crate::filter::{FilterMap, FilterValue};
use crate::ordering::{Dir, SortSpec};
use crate::page::{PageInfo, Pagination};
use crate::schema::{HeaderGroup, Schema};
use crate::search::SearchNeedle;

/// Search text, filters, sort and page: everything a view depends on.
///
/// # Example
///
/// ```
/// use agrilend_browser::{BrowseQuery, ColumnSpec, Schema, Value};
///
/// struct Farmer { id: u32, name: &'static str }
///
/// let schema: Schema<Farmer> = Schema::builder()
///     .column(ColumnSpec::new("id", "ID", |f: &Farmer| Value::from(f.id)))
///     .column(ColumnSpec::new("name", "Name", |f: &Farmer| Value::from(f.name)))
///     .build()
///     .unwrap();
///
/// let farmers = vec![
///     Farmer { id: 1, name: "Juan" },
///     Farmer { id: 2, name: "Maria" },
///     Farmer { id: 3, name: "Ariel" },
/// ];
///
/// let view = BrowseQuery::new()
///     .search("ari")
///     .sort_asc("name")
///     .run(&farmers, &schema, Default::default());
///
/// let names: Vec<_> = view.rows.iter().map(|f| f.name).collect();
/// assert_eq!(names, ["Ariel", "Maria"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseQuery {
    pub search: String,
    pub filters: FilterMap,
    pub sort: Option<SortSpec>,
    pub pagination: Pagination,
    /// Footer scope when the footer capability is on.
    pub totals: TotalsScope,
}

impl BrowseQuery {
    /// An empty query matches every record.
    pub fn new() -> Self {
        BrowseQuery::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn filter(mut self, id: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.set(id, value);
        self
    }

    pub fn sort_by(mut self, column: &str, dir: Dir) -> Self {
        self.sort = Some(SortSpec::new(column, dir));
        self
    }

    pub fn sort_asc(self, column: &str) -> Self {
        self.sort_by(column, Dir::Asc)
    }

    pub fn sort_desc(self, column: &str) -> Self {
        self.sort_by(column, Dir::Desc)
    }

    pub fn page(mut self, page: usize) -> Self {
        self.pagination = Pagination::new(page, self.pagination.page_size);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.pagination = Pagination::new(self.pagination.page, page_size);
        self
    }

    pub fn totals(mut self, scope: TotalsScope) -> Self {
        self.totals = scope;
        self
    }

    /// Tests one record against the search and filter stages.
    pub fn matches<T>(&self, record: &T, schema: &Schema<T>) -> bool {
        let needle = SearchNeedle::new(&self.search);
        let filters = self.filters.resolve(schema);
        needle.matches(record, schema.columns()) && filters.iter().all(|f| f.matches(record))
    }

    /// Search, filter and sort; no pagination.
    pub fn filter_sorted<'a, T>(&self, records: &'a [T], schema: &Schema<T>) -> Vec<&'a T> {
        let needle = SearchNeedle::new(&self.search);
        let filters = self.filters.resolve(schema);

        let mut rows: Vec<&'a T> = records
            .iter()
            .filter(|r| needle.matches(*r, schema.columns()))
            .filter(|r| filters.iter().all(|f| f.matches(*r)))
            .collect();

        if let Some(sort) = &self.sort {
            sort.sort(&mut rows, schema);
        }
        rows
    }

    /// Number of records surviving search and filters.
    pub fn count<T>(&self, records: &[T], schema: &Schema<T>) -> usize {
        let needle = SearchNeedle::new(&self.search);
        let filters = self.filters.resolve(schema);
        records
            .iter()
            .filter(|r| {
                needle.matches(*r, schema.columns()) && filters.iter().all(|f| f.matches(*r))
            })
            .count()
    }

    /// Runs the full pipeline.
    pub fn run<'a, T>(
        &self,
        records: &'a [T],
        schema: &Schema<T>,
        capabilities: Capabilities,
    ) -> BrowseView<'a, T> {
        let filtered = self.filter_sorted(records, schema);
        let filtered_count = filtered.len();

        let pagination = if capabilities.pagination {
            self.pagination.clamped(filtered_count)
        } else {
            Pagination::new(1, filtered_count.max(1))
        };
        let rows = pagination.slice(&filtered).to_vec();

        let totals = capabilities.footer.then(|| match self.totals {
            TotalsScope::Filtered => Totals::compute(&filtered, schema, TotalsScope::Filtered),
            TotalsScope::Page => Totals::compute(&rows, schema, TotalsScope::Page),
        });

        let header_groups = if capabilities.grouped_headers {
            schema.header_groups()
        } else {
            Vec::new()
        };

        log::debug!(
            "browse: {} of {} records matched, page {}/{} shows {}",
            filtered_count,
            records.len(),
            pagination.page,
            pagination.page_count(filtered_count),
            rows.len()
        );

        BrowseView {
            rows,
            info: PageInfo::new(pagination, filtered_count, records.len()),
            totals,
            header_groups,
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct BrowseView<'a, T> {
    /// Rows of the displayed page, in display order.
    pub rows: Vec<&'a T>,
    pub info: PageInfo,
    /// Footer row, present when the footer capability is on.
    pub totals: Option<Totals>,
    /// Upper header row, empty unless grouped headers are on.
    pub header_groups: Vec<HeaderGroup>,
}

impl<T> BrowseView<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Keys of the rows on this page.
    pub fn keys(&self, schema: &Schema<T>) -> Vec<String> {
        self.rows.iter().map(|r| schema.record_key(*r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::TableVariant;
    use crate::schema::{ColumnSpec, FilterSpec};
    use crate::value::Value;

    #[derive(Debug, Clone, PartialEq)]
    struct Crop {
        id: u32,
        crop: &'static str,
        status: &'static str,
        area: f64,
        planted: Option<&'static str>,
    }

    fn schema() -> Schema<Crop> {
        Schema::builder()
            .column(ColumnSpec::new("id", "ID", |c: &Crop| Value::from(c.id)))
            .column(
                ColumnSpec::new("crop", "Crop", |c: &Crop| {
                    Value::from(c.crop)
                })
                .group("what"),
            )
            .column(
                ColumnSpec::new("status", "Status", |c: &Crop| {
                    Value::from(c.status)
                })
                .group("what"),
            )
            .column(
                ColumnSpec::new("area", "Area", |c: &Crop| {
                    Value::from(c.area)
                })
                .sum(),
            )
            .column(ColumnSpec::new("planted", "Planted", |c: &Crop| {
                Value::from(c.planted)
            }))
            .filter(FilterSpec::select("status", "Status"))
            .filter(FilterSpec::date_range("planted", "Planted"))
            .group("what", "Crop")
            .build()
            .unwrap()
    }

    fn crop(
        id: u32,
        crop: &'static str,
        status: &'static str,
        area: f64,
        planted: Option<&'static str>,
    ) -> Crop {
        Crop {
            id,
            crop,
            status,
            area,
            planted,
        }
    }

    fn crops() -> Vec<Crop> {
        vec![
            crop(1, "Rice", "Growing", 1.5, Some("2024-01-10")),
            crop(2, "Corn", "Harvested", 2.0, Some("2023-11-02")),
            crop(3, "Rice", "Harvested", 0.5, None),
            crop(4, "Cassava", "Growing", 3.0, Some("2024-02-20")),
        ]
    }

    #[test]
    fn empty_query_passes_everything_through() {
        let data = crops();
        let view = BrowseQuery::new().run(&data, &schema(), Capabilities::default());
        assert_eq!(view.len(), 4);
        assert_eq!(view.info.page_count, 1);
        assert!(view.totals.is_none());
        assert!(view.header_groups.is_empty());
    }

    #[test]
    fn unknown_filter_and_sort_are_ignored() {
        let data = crops();
        let view = BrowseQuery::new()
            .filter("no_such_filter", "x")
            .sort_asc("no_such_column")
            .run(&data, &schema(), Capabilities::default());
        let ids: Vec<u32> = view.rows.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn column_without_filter_spec_uses_equality() {
        let data = crops();
        let view = BrowseQuery::new()
            .filter("crop", "Rice")
            .run(&data, &schema(), Capabilities::default());
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn date_range_excludes_missing_dates() {
        let data = crops();
        let range = FilterValue::parse_range(Some("2024-01-01"), None).unwrap();
        let view = BrowseQuery::new()
            .filter("planted", range)
            .run(&data, &schema(), Capabilities::default());
        let ids: Vec<u32> = view.rows.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn report_variant_totals_filtered_set_and_skips_paging() {
        let data = crops();
        let view = BrowseQuery::new()
            .filter("status", "Growing")
            .page_size(1)
            .run(&data, &schema(), TableVariant::Report.capabilities());
        assert_eq!(view.len(), 2);
        assert_eq!(view.info.page_count, 1);
        assert_eq!(view.totals.as_ref().and_then(|t| t.get("area")), Some(4.5));
        assert_eq!(
            view.header_groups.iter().map(|g| g.span).collect::<Vec<_>>(),
            vec![1, 2, 2]
        );
    }

    #[test]
    fn page_scope_totals_only_the_page() {
        let data = crops();
        let caps = Capabilities::default().with_footer(true);
        let view = BrowseQuery::new()
            .sort_desc("area")
            .page_size(2)
            .totals(TotalsScope::Page)
            .run(&data, &schema(), caps);
        assert_eq!(view.totals.and_then(|t| t.get("area")), Some(5.0));
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let data = crops();
        let view = BrowseQuery::new()
            .page_size(3)
            .page(7)
            .run(&data, &schema(), Capabilities::default());
        assert_eq!(view.info.page, 2);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn count_and_matches_agree_with_run() {
        let data = crops();
        let query = BrowseQuery::new().search("rice");
        assert_eq!(query.count(&data, &schema()), 2);
        assert!(query.matches(&data[0], &schema()));
        assert!(!query.matches(&data[1], &schema()));
    }
}
