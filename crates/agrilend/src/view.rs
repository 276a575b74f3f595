//! Result of a listing command, independent of output format.
//!
//! A [`ListView`] carries the displayed items plus everything a renderer
//! needs around them:
//! - an optional intro line (screen title)
//! - page counts for "Showing X–Y of N"
//! - the footer totals, when the table has one
//! - the active filter summary
//! - status messages (info, warnings, errors)

use std::fmt;

use agrilend_browser::{PageInfo, Totals};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageLevel::Info => write!(f, "info"),
            MessageLevel::Success => write!(f, "success"),
            MessageLevel::Warning => write!(f, "warning"),
            MessageLevel::Error => write!(f, "error"),
        }
    }
}

/// A status line shown after the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, text)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListView<T> {
    /// Items on the displayed page, in display order.
    pub items: Vec<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,

    pub page: PageInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,

    /// Keys of the selected records.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected: Vec<String>,

    /// Applied filters, e.g. `status=Active, registered_on=2024-01-01..`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_summary: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
}

impl<T> ListView<T> {
    pub fn builder(items: impl IntoIterator<Item = T>, page: PageInfo) -> ListViewBuilder<T> {
        ListViewBuilder::new(items, page)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// "Showing 11–20 of 42", or "No records" for an empty result.
    pub fn showing(&self) -> String {
        if self.page.filtered_count == 0 {
            return "No records".to_string();
        }
        let mut text = format!(
            "Showing {}–{} of {}",
            self.page.first_row, self.page.last_row, self.page.filtered_count
        );
        if self.page.filtered_count != self.page.total_count {
            text.push_str(&format!(" (filtered from {})", self.page.total_count));
        }
        if self.page.page_count > 1 {
            let (page, pages) = (self.page.page, self.page.page_count);
            text.push_str(&format!(" · page {page}/{pages}"));
        }
        text
    }
}

#[derive(Debug)]
pub struct ListViewBuilder<T> {
    view: ListView<T>,
}

impl<T> ListViewBuilder<T> {
    pub fn new(items: impl IntoIterator<Item = T>, page: PageInfo) -> Self {
        Self {
            view: ListView {
                items: items.into_iter().collect(),
                intro: None,
                page,
                totals: None,
                selected: Vec::new(),
                filter_summary: None,
                messages: Vec::new(),
            },
        }
    }

    pub fn intro(mut self, text: impl Into<String>) -> Self {
        self.view.intro = Some(text.into());
        self
    }

    pub fn totals(mut self, totals: Option<Totals>) -> Self {
        self.view.totals = totals;
        self
    }

    pub fn selected(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.view.selected = keys.into_iter().collect();
        self
    }

    pub fn filter_summary(mut self, summary: Option<String>) -> Self {
        self.view.filter_summary = summary;
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.view.messages.push(message);
        self
    }

    pub fn build(self) -> ListView<T> {
        self.view
    }
}
