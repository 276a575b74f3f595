//! Optional table features as tagged configuration.

use serde::{Deserialize, Serialize};

/// Features a record browser turns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Checkbox selection and bulk actions.
    pub selection: bool,
    /// Paged output; when off the whole filtered set is one page.
    pub pagination: bool,
    /// Two-row header built from column groups.
    pub grouped_headers: bool,
    /// Footer row with column totals.
    pub footer: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        TableVariant::Basic.capabilities()
    }
}

impl Capabilities {
    pub fn with_selection(mut self, on: bool) -> Self {
        self.selection = on;
        self
    }

    pub fn with_pagination(mut self, on: bool) -> Self {
        self.pagination = on;
        self
    }

    pub fn with_grouped_headers(mut self, on: bool) -> Self {
        self.grouped_headers = on;
        self
    }

    pub fn with_footer(mut self, on: bool) -> Self {
        self.footer = on;
        self
    }
}

/// Presets for the listing screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableVariant {
    /// Paged listing.
    #[default]
    Basic,
    /// Paged listing with checkboxes.
    Selectable,
    /// Paged listing with grouped column headers.
    Grouped,
    /// Unpaged report with grouped headers and a totals footer.
    Report,
}

impl TableVariant {
    pub fn capabilities(self) -> Capabilities {
        let base = Capabilities {
            selection: false,
            pagination: true,
            grouped_headers: false,
            footer: false,
        };
        match self {
            TableVariant::Basic => base,
            TableVariant::Selectable => base.with_selection(true),
            TableVariant::Grouped => base.with_grouped_headers(true),
            TableVariant::Report => base
                .with_pagination(false)
                .with_grouped_headers(true)
                .with_footer(true),
        }
    }
}

impl From<TableVariant> for Capabilities {
    fn from(variant: TableVariant) -> Self {
        variant.capabilities()
    }
}
