//! Caller-supplied export callbacks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// Export target offered by the listing toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("csv"),
            ExportFormat::Pdf => f.write_str("pdf"),
        }
    }
}

/// Receives the rows to export (search, filters and sort applied).
pub type ExportHandler<T> = Arc<dyn Fn(&[&T], &Schema<T>) + Send + Sync>;

/// Optional export callbacks. A missing callback makes export a logged no-op.
pub struct ExportHooks<T> {
    csv: Option<ExportHandler<T>>,
    pdf: Option<ExportHandler<T>>,
}

impl<T> Default for ExportHooks<T> {
    fn default() -> Self {
        ExportHooks {
            csv: None,
            pdf: None,
        }
    }
}

impl<T> Clone for ExportHooks<T> {
    fn clone(&self) -> Self {
        ExportHooks {
            csv: self.csv.clone(),
            pdf: self.pdf.clone(),
        }
    }
}

impl<T> fmt::Debug for ExportHooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportHooks")
            .field("csv", &self.csv.is_some())
            .field("pdf", &self.pdf.is_some())
            .finish()
    }
}

impl<T> ExportHooks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_csv(mut self, handler: impl Fn(&[&T], &Schema<T>) + Send + Sync + 'static) -> Self {
        self.csv = Some(Arc::new(handler));
        self
    }

    pub fn on_pdf(mut self, handler: impl Fn(&[&T], &Schema<T>) + Send + Sync + 'static) -> Self {
        self.pdf = Some(Arc::new(handler));
        self
    }

    pub fn has(&self, format: ExportFormat) -> bool {
        self.handler(format).is_some()
    }

    fn handler(&self, format: ExportFormat) -> Option<&ExportHandler<T>> {
        match format {
            ExportFormat::Csv => self.csv.as_ref(),
            ExportFormat::Pdf => self.pdf.as_ref(),
        }
    }

    /// Hands `rows` to the registered callback. Returns `false` when none is
    /// registered.
    pub fn export(&self, format: ExportFormat, rows: &[&T], schema: &Schema<T>) -> bool {
        match self.handler(format) {
            Some(handler) => {
                handler(rows, schema);
                true
            }
            None => {
                log::info!(
                    "{format} export requested for {} rows but no handler is registered",
                    rows.len()
                );
                false
            }
        }
    }
}
