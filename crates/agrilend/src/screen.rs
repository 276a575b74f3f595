//! A listing screen: a [`RecordBrowser`] plus the request that drives it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use agrilend_browser::{
    BrowserError, ExportFormat, ExportHooks, FilterValue, PageInfo, RecordBrowser, Schema,
    SortSpec, TotalsScope,
};
use agrilend_client::{ClientError, MockService, PageMeta};
use agrilend_picker::{DatePicker, PickerError, PickerMode};
use chrono::NaiveDate;

use crate::output::{
    render_text, serialize_structured, table_csv, OutputFormat, SerializeError, TableLayout,
};
use crate::schemas::Listing;
use crate::view::{ListView, Message};

/// Dates given on the command line for a screen's date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSelection {
    #[default]
    None,
    On(NaiveDate),
    Range {
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
}

impl DateSelection {
    /// Filter value as the date picker would produce it.
    pub fn to_filter_value(self) -> Result<Option<FilterValue>, PickerError> {
        match self {
            DateSelection::None => Ok(None),
            DateSelection::On(date) => {
                let mut picker = DatePicker::new(PickerMode::Single);
                picker.pick(date);
                Ok(picker.to_filter_value())
            }
            DateSelection::Range { from, to } => {
                let mut picker = DatePicker::new(PickerMode::Range);
                picker.set_range(from, to)?;
                Ok(picker.to_filter_value())
            }
        }
    }
}

/// Everything a browse request can set.
#[derive(Debug, Clone, Default)]
pub struct BrowseRequest {
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    pub dates: DateSelection,
    /// Filter the dates apply to; the screen's own date filter when unset.
    pub date_filter: Option<String>,
    pub sort: Option<SortSpec>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub totals: TotalsScope,
    pub select: Vec<String>,
    pub select_all: bool,
    /// `(label, key)` of a row action to run.
    pub action: Option<(String, String)>,
    pub bulk_action: Option<String>,
    pub export: Option<ExportFormat>,
    pub export_file: Option<PathBuf>,
}

/// Where the exported CSV went, shared with the export hook.
type ExportSink = Arc<Mutex<Option<String>>>;

pub struct Screen<T: Listing> {
    browser: RecordBrowser<T>,
    messages: Vec<Message>,
    /// Page counts reported by the backend, when the backend paginated.
    remote_page: Option<PageInfo>,
    export_sink: ExportSink,
}

impl<T: Listing> Screen<T> {
    pub fn new(records: Vec<T>, page_size: usize) -> Result<Self, BrowserError> {
        let export_sink: ExportSink = Arc::default();
        let sink = Arc::clone(&export_sink);
        let exports =
            ExportHooks::new().on_csv(move |rows: &[&T], schema| store_csv(&sink, rows, schema));

        let browser = RecordBrowser::new(records, T::schema()?)
            .with_capabilities(T::variant())
            .with_page_size(page_size)
            .with_exports(exports);
        Ok(Screen {
            browser,
            messages: Vec::new(),
            remote_page: None,
            export_sink,
        })
    }

    /// Wraps one page already searched, filtered and paged by the backend.
    pub fn from_remote(items: Vec<T>, meta: PageMeta) -> Result<Self, BrowserError> {
        let mut screen = Self::new(items, meta.per_page.max(1))?;
        let capabilities = screen.browser.capabilities().with_pagination(false);
        screen.browser = screen.browser.with_capabilities(capabilities);
        let shown = screen.browser.records().len();
        let first_row = if shown == 0 {
            0
        } else {
            (meta.current_page.max(1) - 1)
                .saturating_mul(meta.per_page)
                .saturating_add(1)
        };
        screen.remote_page = Some(PageInfo {
            page: meta.current_page.max(1),
            page_size: meta.per_page,
            page_count: meta.total_pages.max(1),
            filtered_count: meta.total_items,
            total_count: meta.total_items,
            first_row,
            last_row: if shown == 0 {
                0
            } else {
                first_row.saturating_add(shown - 1)
            },
        });
        Ok(screen)
    }

    pub fn browser(&self) -> &RecordBrowser<T> {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut RecordBrowser<T> {
        &mut self.browser
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Applies a request in the order a user would: query state first, then
    /// page, then selection, then actions and export.
    pub fn apply(&mut self, request: &BrowseRequest) -> Result<(), PickerError> {
        if let Some(size) = request.page_size {
            self.browser.set_page_size(size);
        }
        if let Some(search) = &request.search {
            self.browser.set_search(search.as_str());
        }
        for (id, value) in &request.filters {
            let schema = self.browser.schema();
            if schema.filter(id).is_none() && schema.column(id).is_none() {
                let text = format!("unknown filter '{id}' ignored");
                self.messages.push(Message::warning(text));
                continue;
            }
            self.browser.set_filter(id, value.as_str());
        }
        if let Some(value) = request.dates.to_filter_value()? {
            let id = request.date_filter.as_deref().unwrap_or(T::DATE_FILTER);
            self.browser.set_filter(id, value);
        }
        if let Some(sort) = &request.sort {
            let sortable = self
                .browser
                .schema()
                .column(&sort.column)
                .is_some_and(|c| c.sortable);
            if sortable {
                self.browser.set_sort(&sort.column, sort.dir);
            } else {
                let text = format!("cannot sort by '{}'", sort.column);
                self.messages.push(Message::warning(text));
            }
        }
        self.browser.set_totals_scope(request.totals);
        if let Some(page) = request.page {
            self.browser.set_page(page);
        }

        if request.select_all || !request.select.is_empty() {
            if !self.browser.capabilities().selection {
                let text = format!("{} cannot be selected", T::NAME);
                self.messages.push(Message::warning(text));
            }
            if request.select_all {
                self.browser.select_all();
            }
            for key in &request.select {
                self.browser.toggle(key);
            }
        }

        if let Some((label, key)) = &request.action {
            let message = match self.browser.run_action(label, key) {
                Ok(()) => Message::success(format!("{label}: {} {key}", T::NOUN)),
                Err(err) => Message::error(err.to_string()),
            };
            self.messages.push(message);
        }
        if let Some(label) = &request.bulk_action {
            let message = match self.browser.run_bulk_action(label) {
                Ok(0) => Message::warning(format!("{label}: nothing selected")),
                Ok(n) => Message::success(format!("{label}: {n} {}(s)", T::NOUN)),
                Err(err) => Message::error(err.to_string()),
            };
            self.messages.push(message);
        }
        if let Some(format) = request.export {
            self.export(format, request.export_file.clone());
        }
        Ok(())
    }

    fn export(&mut self, format: ExportFormat, file: Option<PathBuf>) {
        if !self.browser.export(format) {
            let text = format!("{format} export is not available");
            self.messages.push(Message::warning(text));
            return;
        }
        let csv = self.export_sink.lock().ok().and_then(|mut slot| slot.take());
        let (Some(csv), Some(path)) = (csv, file) else {
            return;
        };
        let message = match std::fs::write(&path, csv) {
            Ok(()) => Message::success(format!("exported to {}", path.display())),
            Err(err) => Message::error(format!("cannot write {}: {err}", path.display())),
        };
        self.messages.push(message);
    }

    /// Exported CSV not yet written anywhere, if any.
    pub fn take_export(&self) -> Option<String> {
        self.export_sink.lock().ok().and_then(|mut slot| slot.take())
    }

    pub fn list_view(&self) -> ListView<&T> {
        let view = self.browser.view();
        let info = self.remote_page.unwrap_or(view.info);
        let selected = self.browser.selection().keys().map(str::to_string);
        let mut builder = ListView::builder(view.rows, info)
            .intro(title(T::NAME))
            .totals(view.totals)
            .selected(selected)
            .filter_summary(self.browser.filters().summary());
        for message in &self.messages {
            builder = builder.message(message.clone());
        }
        builder.build()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, SerializeError> {
        let view = self.list_view();
        match format {
            OutputFormat::Text => {
                let layout = TableLayout {
                    selection: self.browser.capabilities().selection,
                    header_groups: self.browser.view().header_groups,
                };
                Ok(render_text(&view, self.browser.schema(), &layout))
            }
            OutputFormat::Csv => serialize_structured(&view.items, format),
            _ => serialize_structured(&view, format),
        }
    }
}

fn store_csv<T>(sink: &ExportSink, rows: &[&T], schema: &Schema<T>) {
    match table_csv(rows, schema) {
        Ok(csv) => {
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(csv);
            }
        }
        Err(err) => log::error!("csv export failed: {err}"),
    }
}

fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Runs a mock-service mutation and reloads the screen from the service.
///
/// A failed mutation is logged and reported; the screen keeps its records.
pub async fn apply_mutation<T, F, R>(
    screen: &mut Screen<T>,
    service: &MockService<T>,
    mutation: F,
) -> bool
where
    T: Listing,
    F: std::future::Future<Output = Result<R, ClientError>>,
{
    match mutation.await {
        Ok(_) => {
            let records = service.list().await;
            screen.browser_mut().replace_records(records);
            true
        }
        Err(err) => {
            log::error!("{} update failed: {err}", T::NOUN);
            screen.push_message(Message::error(err.to_string()));
            false
        }
    }
}
