//! Browser - Generic record listing engine for typed collections.
//!
//! A listing screen is described once by a [`Schema`]: its columns, filters,
//! row actions and bulk actions. The engine then turns the loaded records and
//! the current UI state into the rows to display:
//!
//! - Free-text search across every column
//! - Select, text, date and date-range filters
//! - Single-column sorting with nulls last
//! - Pagination with page clamping
//! - Column totals over the filtered set or the visible page
//! - Checkbox selection tracked by record key
//!
//! # Quick Start
//!
//! ```rust
//! use agrilend_browser::{
//!     BrowseQuery, Capabilities, ColumnSpec, FilterSpec, Schema, TableVariant, Value,
//! };
//!
//! struct Farmer {
//!     id: u32,
//!     name: String,
//!     status: &'static str,
//!     loan: f64,
//! }
//!
//! let schema = Schema::builder()
//!     .column(ColumnSpec::new("id", "ID", |f: &Farmer| Value::from(f.id)))
//!     .column(ColumnSpec::new("name", "Name", |f: &Farmer| Value::from(&f.name)))
//!     .column(ColumnSpec::new("status", "Status", |f: &Farmer| Value::from(f.status)))
//!     .column(ColumnSpec::new("loan", "Loan", |f: &Farmer| Value::from(f.loan)).sum())
//!     .filter(FilterSpec::select("status", "Status").option("Active", "Active"))
//!     .build()
//!     .unwrap();
//!
//! let farmers = vec![
//!     Farmer { id: 1, name: "Juan Dela Cruz".into(), status: "Active", loan: 15000.0 },
//!     Farmer { id: 2, name: "Maria Santos".into(), status: "Inactive", loan: 8000.0 },
//!     Farmer { id: 3, name: "Ariel Reyes".into(), status: "Active", loan: 22000.0 },
//! ];
//!
//! let caps: Capabilities = TableVariant::Report.into();
//! let view = BrowseQuery::new()
//!     .filter("status", "Active")
//!     .sort_desc("loan")
//!     .run(&farmers, &schema, caps);
//!
//! assert_eq!(view.rows[0].name, "Ariel Reyes");
//! assert_eq!(view.totals.unwrap().get("loan"), Some(37000.0));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! records ─▶ search ─▶ filter ─▶ sort ─▶ paginate ─▶ page rows
//! ```
//!
//! Every stage is a pure function of its inputs. Changing the search text, a
//! filter or the page size returns the view to page 1; sorting keeps the page.
//!
//! # Inactive filters
//!
//! A filter that is not in the [`FilterMap`] is inactive. Setting a filter to
//! `""` or to the [`ALL_SENTINEL`] (`"all"`) removes it, so there is exactly
//! one way to express "no constraint".
//!
//! For the stateful wrapper used by listing screens, see [`RecordBrowser`].

mod aggregate;
mod browser;
mod capabilities;
mod date;
mod error;
mod export;
mod filter;
mod ordering;
mod page;
mod query;
mod schema;
mod search;
mod selection;
mod value;

// Re-export public API
pub use aggregate::{ColumnTotal, Totals, TotalsScope};
pub use browser::RecordBrowser;
pub use capabilities::{Capabilities, TableVariant};
pub use date::{parse_date, parse_date_like};
pub use error::{BrowserError, Result};
pub use export::{ExportFormat, ExportHandler, ExportHooks};
pub use filter::{DateRange, FilterMap, FilterValue, ResolvedFilter, ALL_SENTINEL};
pub use ordering::{collate, compare_nulls_last, compare_values, Dir, SortSpec};
pub use page::{PageInfo, Pagination, DEFAULT_PAGE_SIZE};
pub use query::{BrowseQuery, BrowseView};
pub use schema::{
    Accessor, ActionPlacement, ActionSpec, ActionVariant, Aggregate, Align, BulkActionSpec,
    BulkHandler, ColumnSpec, FilterKind, FilterOption, FilterSpec, HeaderGroup, Renderer,
    RowHandler, Schema, SchemaBuilder,
};
pub use search::SearchNeedle;
pub use selection::Selection;
pub use value::{Number, Timestamp, Value};
