//! Agrilend back-office listings.
//!
//! The binary wires the record browser, date picker and async client crates
//! into three listing screens (farmers, crops and crop damage reports) plus a
//! photo-based damage analyzer:
//!
//! - [`records`] and [`schemas`] define the records and how each is listed
//! - [`screen`] drives a [`RecordBrowser`](agrilend_browser::RecordBrowser)
//!   from one [`BrowseRequest`](screen::BrowseRequest)
//! - [`output`] renders a [`ListView`](view::ListView) as a text table or as
//!   JSON, YAML or CSV
//! - [`config`] resolves settings from defaults, YAML, environment and flags

pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod logging;
pub mod output;
pub mod records;
pub mod schemas;
pub mod screen;
pub mod seed;
pub mod view;
