//! Client - The async boundary of agrilend screens.
//!
//! Screens never talk to a backend directly. They depend on:
//!
//! - [`RecordSource`] for paged records and [`OptionSource`] for select
//!   filter options, with in-memory ([`InMemorySource`], [`StaticOptions`]),
//!   mock ([`MockService`]) and HTTP ([`HttpRecordSource`],
//!   [`HttpOptionSource`]) implementations
//! - [`CachedOptionSource`] to fetch option lists at most once per TTL
//! - [`SearchDebouncer`] to turn keystrokes into settled search text
//! - [`ScreenData`] to hold fetched data and drop late responses
//! - [`CropAnalyzer`] for photo-based damage assessment
//!
//! Failures come back as [`ClientError`], whose messages are fit to show
//! inline. Nothing is retried automatically.
//!
//! ```rust
//! use agrilend_browser::{ColumnSpec, Schema, Value};
//! use agrilend_client::{InMemorySource, PageRequest, RecordSource};
//!
//! #[derive(Clone)]
//! struct Farmer { id: u32 }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let schema = Schema::builder()
//!     .column(ColumnSpec::new("id", "ID", |f: &Farmer| Value::from(f.id)))
//!     .build()
//!     .unwrap();
//! let source = InMemorySource::new((1..=25).map(|id| Farmer { id }).collect(), schema);
//!
//! let page = source.fetch_page(PageRequest::new(3, 10)).await.unwrap();
//! assert_eq!(page.items().len(), 5);
//! assert_eq!(page.pagination().total_pages, 3);
//! # });
//! ```

mod analysis;
mod cache;
mod debounce;
mod error;
mod fetch;
mod http;
mod memory;
mod mock;
mod source;

pub use analysis::{
    parse_analysis, AnalyzerConfig, CropAnalysis, CropAnalyzer, ImagePayload, Severity,
    DEFAULT_ENDPOINT, DEFAULT_MODEL,
};
pub use cache::{CachedOptionSource, DEFAULT_OPTION_TTL};
pub use debounce::{SearchDebouncer, DEFAULT_DEBOUNCE};
pub use error::{ClientError, Result};
pub use fetch::{FetchState, ScreenData, Ticket};
pub use http::{
    page_query, ApiClient, CredentialStore, HttpOptionSource, HttpRecordSource, LogSessionExpiry,
    SessionHandler, StaticCredentials, BRANCH_HEADER, TENANT_HEADER,
};
pub use memory::{page_of, InMemorySource, StaticOptions};
pub use mock::{Latency, MockService};
pub use source::{OptionSource, PageData, PageMeta, PageRequest, PageResponse, RecordSource};
