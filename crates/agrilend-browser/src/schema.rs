//! Schema contracts: columns, filters, and actions.
//!
//! A [`Schema`] is supplied once by the screen that lists records. It is
//! immutable for the lifetime of a [`RecordBrowser`](crate::RecordBrowser) and
//! tells the pipeline how to read, search, filter, sort and total records.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BrowserError, Result};
use crate::value::Value;

/// Reads one attribute from a record.
pub type Accessor<T> = fn(&T) -> Value<'_>;

/// Produces the display text of a cell, overriding the default coercion.
pub type Renderer<T> = fn(&T) -> String;

/// Handler bound to a single record.
pub type RowHandler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handler bound to the current selection.
pub type BulkHandler<T> = Arc<dyn Fn(&[&T]) + Send + Sync>;

/// Footer behaviour of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    #[default]
    None,
    /// Sum coerced numeric values.
    Sum,
}

/// Horizontal alignment hint for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// How to read and display one attribute of a record.
pub struct ColumnSpec<T> {
    pub id: String,
    pub header: String,
    accessor: Accessor<T>,
    pub sortable: bool,
    renderer: Option<Renderer<T>>,
    display_map: BTreeMap<String, String>,
    pub aggregate: Aggregate,
    pub group: Option<String>,
    pub align: Align,
}

impl<T> ColumnSpec<T> {
    /// Creates a sortable column with no footer behaviour.
    pub fn new(id: impl Into<String>, header: impl Into<String>, accessor: Accessor<T>) -> Self {
        ColumnSpec {
            id: id.into(),
            header: header.into(),
            accessor,
            sortable: true,
            renderer: None,
            display_map: BTreeMap::new(),
            aggregate: Aggregate::None,
            group: None,
            align: Align::Left,
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Uses a custom renderer for the cell text.
    pub fn render(mut self, renderer: Renderer<T>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Maps a raw value (as text) to a display label, e.g. `"1"` to `"Active"`.
    pub fn display(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.display_map.insert(value.into(), label.into());
        self
    }

    /// Marks the column as numeric: its values are summed in the footer.
    /// Numeric columns are right-aligned.
    pub fn sum(mut self) -> Self {
        self.aggregate = Aggregate::Sum;
        self.align = Align::Right;
        self
    }

    /// Places the column under a header group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Reads this column's raw value from a record.
    pub fn value<'a>(&self, record: &'a T) -> Value<'a> {
        (self.accessor)(record)
    }

    pub fn accessor(&self) -> Accessor<T> {
        self.accessor
    }

    /// Text shown in the cell.
    ///
    /// A custom renderer wins; otherwise the coerced value is passed through
    /// the display mapping. Missing values render as an empty string.
    pub fn display_text(&self, record: &T) -> String {
        if let Some(render) = self.renderer {
            return render(record);
        }
        let raw = self.value(record).coerce_string().unwrap_or_default();
        match self.display_map.get(&raw) {
            Some(label) => label.clone(),
            None => raw,
        }
    }
}

impl<T> Clone for ColumnSpec<T> {
    fn clone(&self) -> Self {
        ColumnSpec {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor,
            sortable: self.sortable,
            renderer: self.renderer,
            display_map: self.display_map.clone(),
            aggregate: self.aggregate,
            group: self.group.clone(),
            align: self.align,
        }
    }
}

impl<T> fmt::Debug for ColumnSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("custom_renderer", &self.renderer.is_some())
            .field("display_map", &self.display_map)
            .field("aggregate", &self.aggregate)
            .field("group", &self.group)
            .finish()
    }
}

/// Matching behaviour of a filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Enumerated select: exact match.
    Select,
    /// Free text: case-insensitive substring.
    Text,
    /// Single date: same calendar day.
    Date,
    /// Inclusive date range.
    DateRange,
}

impl FilterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Select => "select",
            FilterKind::Text => "text",
            FilterKind::Date => "date",
            FilterKind::DateRange => "date_range",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(self, FilterKind::Date | FilterKind::DateRange)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an enumerated filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        FilterOption {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A user-facing filter control.
///
/// The filter reads its own accessor when one is given, otherwise the column
/// with the same id.
pub struct FilterSpec<T> {
    pub id: String,
    pub label: String,
    pub kind: FilterKind,
    pub options: Vec<FilterOption>,
    pub placeholder: Option<String>,
    accessor: Option<Accessor<T>>,
}

impl<T> FilterSpec<T> {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        FilterSpec {
            id: id.into(),
            label: label.into(),
            kind,
            options: Vec::new(),
            placeholder: None,
            accessor: None,
        }
    }

    pub fn select(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Select)
    }

    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Text)
    }

    pub fn date(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Date)
    }

    pub fn date_range(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::DateRange)
    }

    pub fn option(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(FilterOption::new(label, value));
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = FilterOption>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Reads the filtered attribute with this accessor instead of a column.
    pub fn accessor(mut self, accessor: Accessor<T>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    pub fn own_accessor(&self) -> Option<Accessor<T>> {
        self.accessor
    }
}

impl<T> Clone for FilterSpec<T> {
    fn clone(&self) -> Self {
        FilterSpec {
            id: self.id.clone(),
            label: self.label.clone(),
            kind: self.kind,
            options: self.options.clone(),
            placeholder: self.placeholder.clone(),
            accessor: self.accessor,
        }
    }
}

impl<T> fmt::Debug for FilterSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSpec")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

/// Visual emphasis of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    #[default]
    Default,
    Primary,
    Secondary,
    Danger,
    Ghost,
}

/// Where an action is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPlacement {
    Header,
    #[default]
    Row,
}

/// An action bound to a single record.
pub struct ActionSpec<T> {
    pub label: String,
    pub icon: Option<String>,
    pub variant: ActionVariant,
    pub placement: ActionPlacement,
    handler: RowHandler<T>,
}

impl<T> ActionSpec<T> {
    pub fn new(label: impl Into<String>, handler: impl Fn(&T) + Send + Sync + 'static) -> Self {
        ActionSpec {
            label: label.into(),
            icon: None,
            variant: ActionVariant::Default,
            placement: ActionPlacement::Row,
            handler: Arc::new(handler),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn placement(mut self, placement: ActionPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn invoke(&self, record: &T) {
        (self.handler)(record)
    }
}

impl<T> Clone for ActionSpec<T> {
    fn clone(&self) -> Self {
        ActionSpec {
            label: self.label.clone(),
            icon: self.icon.clone(),
            variant: self.variant,
            placement: self.placement,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T> fmt::Debug for ActionSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSpec")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("variant", &self.variant)
            .field("placement", &self.placement)
            .finish()
    }
}

/// An action bound to the selected records.
pub struct BulkActionSpec<T> {
    pub label: String,
    pub icon: Option<String>,
    pub variant: ActionVariant,
    pub placement: ActionPlacement,
    handler: BulkHandler<T>,
}

impl<T> BulkActionSpec<T> {
    pub fn new(label: impl Into<String>, handler: impl Fn(&[&T]) + Send + Sync + 'static) -> Self {
        BulkActionSpec {
            label: label.into(),
            icon: None,
            variant: ActionVariant::Default,
            placement: ActionPlacement::Header,
            handler: Arc::new(handler),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn invoke(&self, records: &[&T]) {
        (self.handler)(records)
    }
}

impl<T> Clone for BulkActionSpec<T> {
    fn clone(&self) -> Self {
        BulkActionSpec {
            label: self.label.clone(),
            icon: self.icon.clone(),
            variant: self.variant,
            placement: self.placement,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T> fmt::Debug for BulkActionSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkActionSpec")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("variant", &self.variant)
            .finish()
    }
}

/// One cell of the upper header row when columns are grouped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderGroup {
    /// Group label; empty for runs of ungrouped columns.
    pub label: String,
    /// Number of consecutive columns spanned.
    pub span: usize,
}

/// The full description of a record listing.
pub struct Schema<T> {
    key: String,
    columns: Vec<ColumnSpec<T>>,
    filters: Vec<FilterSpec<T>>,
    actions: Vec<ActionSpec<T>>,
    bulk_actions: Vec<BulkActionSpec<T>>,
    groups: BTreeMap<String, String>,
    totals_label: String,
}

impl<T> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder::new()
    }

    /// Id of the column holding the record key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn columns(&self) -> &[ColumnSpec<T>] {
        &self.columns
    }

    pub fn filters(&self) -> &[FilterSpec<T>] {
        &self.filters
    }

    pub fn actions(&self) -> &[ActionSpec<T>] {
        &self.actions
    }

    pub fn bulk_actions(&self) -> &[BulkActionSpec<T>] {
        &self.bulk_actions
    }

    pub fn totals_label(&self) -> &str {
        &self.totals_label
    }

    pub fn column(&self, id: &str) -> Option<&ColumnSpec<T>> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn filter(&self, id: &str) -> Option<&FilterSpec<T>> {
        self.filters.iter().find(|f| f.id == id)
    }

    /// Key of a record: the key column's value as text.
    pub fn record_key(&self, record: &T) -> String {
        self.column(&self.key)
            .and_then(|c| c.value(record).coerce_string())
            .unwrap_or_default()
    }

    /// Upper header row for grouped columns.
    ///
    /// Consecutive columns sharing a group collapse into one cell; ungrouped
    /// runs produce cells with an empty label.
    pub fn header_groups(&self) -> Vec<HeaderGroup> {
        let mut out: Vec<(Option<&str>, usize)> = Vec::new();
        for column in &self.columns {
            let group = column.group.as_deref();
            match out.last_mut() {
                Some(last) if last.0 == group => last.1 += 1,
                _ => out.push((group, 1)),
            }
        }
        out.into_iter()
            .map(|(group, span)| HeaderGroup {
                label: group.map(|id| self.group_label(id)).unwrap_or_default(),
                span,
            })
            .collect()
    }

    fn group_label(&self, id: &str) -> String {
        self.groups
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Schema {
            key: self.key.clone(),
            columns: self.columns.clone(),
            filters: self.filters.clone(),
            actions: self.actions.clone(),
            bulk_actions: self.bulk_actions.clone(),
            groups: self.groups.clone(),
            totals_label: self.totals_label.clone(),
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("key", &self.key)
            .field("columns", &self.columns)
            .field("filters", &self.filters)
            .field("actions", &self.actions)
            .field("bulk_actions", &self.bulk_actions)
            .field("groups", &self.groups)
            .field("totals_label", &self.totals_label)
            .finish()
    }
}

/// Builder for [`Schema`].
///
/// ```
/// use agrilend_browser::{ColumnSpec, FilterSpec, Schema, Value};
///
/// struct Plot { id: u32, crop: String }
///
/// let schema: Schema<Plot> = Schema::builder()
///     .column(ColumnSpec::new("id", "ID", |p: &Plot| Value::from(p.id)))
///     .column(ColumnSpec::new("crop", "Crop", |p: &Plot| Value::from(&p.crop)))
///     .filter(FilterSpec::select("crop", "Crop").option("Rice", "Rice"))
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.key(), "id");
/// ```
pub struct SchemaBuilder<T> {
    key: String,
    columns: Vec<ColumnSpec<T>>,
    filters: Vec<FilterSpec<T>>,
    actions: Vec<ActionSpec<T>>,
    bulk_actions: Vec<BulkActionSpec<T>>,
    groups: BTreeMap<String, String>,
    totals_label: String,
}

impl<T> Default for SchemaBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SchemaBuilder<T> {
    pub fn new() -> Self {
        SchemaBuilder {
            key: "id".to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            actions: Vec::new(),
            bulk_actions: Vec::new(),
            groups: BTreeMap::new(),
            totals_label: "Total".to_string(),
        }
    }

    /// Sets the key column id (default `"id"`).
    pub fn key(mut self, column: impl Into<String>) -> Self {
        self.key = column.into();
        self
    }

    pub fn column(mut self, column: ColumnSpec<T>) -> Self {
        self.columns.push(column);
        self
    }

    pub fn filter(mut self, filter: FilterSpec<T>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn action(mut self, action: ActionSpec<T>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn bulk_action(mut self, action: BulkActionSpec<T>) -> Self {
        self.bulk_actions.push(action);
        self
    }

    /// Labels a header group referenced by [`ColumnSpec::group`].
    pub fn group(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.groups.insert(id.into(), label.into());
        self
    }

    /// Label of the leading footer cell (default `"Total"`).
    pub fn totals_label(mut self, label: impl Into<String>) -> Self {
        self.totals_label = label.into();
        self
    }

    pub fn build(self) -> Result<Schema<T>> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.id.as_str()) {
                return Err(BrowserError::DuplicateColumn(column.id.clone()));
            }
        }
        if !seen.contains(self.key.as_str()) {
            return Err(BrowserError::MissingKeyColumn(self.key));
        }

        let mut seen = HashSet::new();
        for filter in &self.filters {
            if !seen.insert(filter.id.as_str()) {
                return Err(BrowserError::DuplicateFilter(filter.id.clone()));
            }
        }

        Ok(Schema {
            key: self.key,
            columns: self.columns,
            filters: self.filters,
            actions: self.actions,
            bulk_actions: self.bulk_actions,
            groups: self.groups,
            totals_label: self.totals_label,
        })
    }
}
