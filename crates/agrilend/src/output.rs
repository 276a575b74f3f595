//! Output formats: aligned text tables and structured JSON, YAML and CSV.

use agrilend_browser::{Align, HeaderGroup, Schema};
use clap::ValueEnum;
use console::style;
use serde::Serialize;
use thiserror::Error;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::view::{ListView, MessageLevel};

/// Widest a text cell may grow before it is truncated.
pub const MAX_CELL_WIDTH: usize = 32;

const GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
    Csv,
}

impl OutputFormat {
    pub fn is_structured(self) -> bool {
        !matches!(self, OutputFormat::Text)
    }
}

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(String),

    #[error("not a structured output format")]
    NotStructured,
}

/// Serializes `data` as JSON, YAML or CSV.
pub fn serialize_structured<T: Serialize + ?Sized>(
    data: &T,
    format: OutputFormat,
) -> Result<String, SerializeError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Csv => serialize_csv(data),
        OutputFormat::Text => Err(SerializeError::NotStructured),
    }
}

/// Serializes to CSV by way of JSON: an array of objects becomes one row per
/// object with the first object's keys as headers.
pub fn serialize_csv<T: Serialize + ?Sized>(data: &T) -> Result<String, SerializeError> {
    let value = serde_json::to_value(data)?;
    flatten_json_to_csv(&value)
}

fn flatten_json_to_csv(value: &serde_json::Value) -> Result<String, SerializeError> {
    use serde_json::Value;

    let csv_err = |e: csv::Error| SerializeError::Csv(e.to_string());
    let mut wtr = csv::Writer::from_writer(vec![]);

    match value {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => {
                let headers: Vec<&str> = first.keys().map(String::as_str).collect();
                wtr.write_record(&headers).map_err(csv_err)?;
                for item in items {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| obj.get(*h).map(value_to_string).unwrap_or_default())
                            .collect();
                        wtr.write_record(&row).map_err(csv_err)?;
                    }
                }
            }
            Some(_) => {
                wtr.write_record(["value"]).map_err(csv_err)?;
                for item in items {
                    wtr.write_record([value_to_string(item)]).map_err(csv_err)?;
                }
            }
            None => {}
        },
        Value::Object(obj) => {
            wtr.write_record(["key", "value"]).map_err(csv_err)?;
            for (k, v) in obj {
                wtr.write_record([k.as_str(), &value_to_string(v)])
                    .map_err(csv_err)?;
            }
        }
        scalar => {
            wtr.write_record(["value"]).map_err(csv_err)?;
            wtr.write_record([value_to_string(scalar)]).map_err(csv_err)?;
        }
    }

    csv_text(wtr)
}

fn csv_text(wtr: csv::Writer<Vec<u8>>) -> Result<String, SerializeError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| SerializeError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializeError::Csv(e.to_string()))
}

fn value_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Writes the displayed rows as CSV using each column's header and cell text.
pub fn table_csv<T>(rows: &[&T], schema: &Schema<T>) -> Result<String, SerializeError> {
    let csv_err = |e: csv::Error| SerializeError::Csv(e.to_string());
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(schema.columns().iter().map(|c| c.header.as_str()))
        .map_err(csv_err)?;
    for row in rows {
        wtr.write_record(schema.columns().iter().map(|c| c.display_text(*row)))
            .map_err(csv_err)?;
    }
    csv_text(wtr)
}

/// Truncates `s` to `max_width` display columns, ending in `…` when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn pad(s: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(s.width());
    match align {
        Align::Left => format!("{s}{}", " ".repeat(fill)),
        Align::Right => format!("{}{s}", " ".repeat(fill)),
        Align::Center => {
            let left = fill / 2;
            format!("{}{s}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}

/// Formats a footer total: integers without decimals, everything else with
/// two, both with thousands separators.
pub fn format_total(total: f64) -> String {
    let negative = total < 0.0;
    let abs = total.abs();
    let (whole, frac) = if abs.fract() == 0.0 {
        (format!("{abs:.0}"), String::new())
    } else {
        let fixed = format!("{abs:.2}");
        match fixed.split_once('.') {
            Some((w, f)) => (w.to_string(), format!(".{f}")),
            None => (fixed, String::new()),
        }
    };
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{grouped}{frac}", if negative { "-" } else { "" })
}

/// Width of adjacent columns joined by gaps.
fn spanned_width(widths: &[usize]) -> usize {
    widths.iter().sum::<usize>() + GAP.len() * widths.len().saturating_sub(1)
}

/// How the text table is laid out.
#[derive(Debug, Clone, Default)]
pub struct TableLayout {
    /// Leading checkbox column.
    pub selection: bool,
    /// Upper header row; empty for a single header row.
    pub header_groups: Vec<HeaderGroup>,
}

/// Renders a page as an aligned text table followed by the footer,
/// the "Showing" line, the filter summary and status messages.
pub fn render_text<T>(view: &ListView<&T>, schema: &Schema<T>, layout: &TableLayout) -> String {
    let columns = schema.columns();
    let keys: Vec<String> = view.items.iter().map(|r| schema.record_key(*r)).collect();

    let cells: Vec<Vec<String>> = view
        .items
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| truncate_to_width(&c.display_text(*r), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let footer: Option<Vec<String>> = view.totals.as_ref().map(|totals| {
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| match totals.get(&c.id) {
                Some(total) => format_total(total),
                None if i == 0 => totals.label.clone(),
                None => String::new(),
            })
            .collect()
    });

    let mut widths: Vec<usize> = columns.iter().map(|c| c.header.width()).collect();
    for row in cells.iter().chain(footer.iter()) {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    // Group labels wider than their span stretch the last spanned column.
    let mut start = 0;
    for group in &layout.header_groups {
        let end = (start + group.span).min(widths.len());
        if start < end {
            let spanned = spanned_width(&widths[start..end]);
            let label = group.label.width();
            if label > spanned {
                widths[end - 1] += label - spanned;
            }
        }
        start = end;
    }

    let check_width = 3;
    let mut out = String::new();

    if let Some(intro) = &view.intro {
        out.push_str(&style(intro).bold().to_string());
        out.push('\n');
    }

    if !layout.header_groups.is_empty() {
        let mut line = Vec::new();
        if layout.selection {
            line.push(" ".repeat(check_width));
        }
        let mut start = 0;
        for group in &layout.header_groups {
            let end = (start + group.span).min(widths.len());
            if start >= end {
                break;
            }
            let spanned = spanned_width(&widths[start..end]);
            let cell = pad(&group.label, spanned, Align::Center);
            line.push(if group.label.is_empty() {
                cell
            } else {
                style(cell).bold().underlined().to_string()
            });
            start = end;
        }
        out.push_str(line.join(GAP).trim_end());
        out.push('\n');
    }

    let mut header = Vec::new();
    if layout.selection {
        let selected = keys.iter().filter(|k| view.selected.contains(k)).count();
        let mark = match selected {
            0 => "[ ]",
            n if n == keys.len() => "[x]",
            _ => "[-]",
        };
        header.push(mark.to_string());
    }
    for (c, w) in columns.iter().zip(&widths) {
        header.push(style(pad(&c.header, *w, c.align)).bold().to_string());
    }
    out.push_str(header.join(GAP).trim_end());
    out.push('\n');

    let mut rule_width = spanned_width(&widths);
    if layout.selection {
        rule_width += check_width + GAP.len();
    }
    let rule = "─".repeat(rule_width);
    out.push_str(&style(&rule).dim().to_string());
    out.push('\n');

    for (row, key) in cells.iter().zip(&keys) {
        let mut line = Vec::new();
        if layout.selection {
            let mark = if view.selected.contains(key) {
                "[x]"
            } else {
                "[ ]"
            };
            line.push(mark.to_string());
        }
        for ((cell, c), w) in row.iter().zip(columns).zip(&widths) {
            line.push(pad(cell, *w, c.align));
        }
        out.push_str(line.join(GAP).trim_end());
        out.push('\n');
    }

    if let Some(footer) = footer {
        out.push_str(&style(&rule).dim().to_string());
        out.push('\n');
        let mut line = Vec::new();
        if layout.selection {
            line.push(" ".repeat(check_width));
        }
        for ((cell, c), w) in footer.iter().zip(columns).zip(&widths) {
            line.push(style(pad(cell, *w, c.align)).bold().to_string());
        }
        out.push_str(line.join(GAP).trim_end());
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&view.showing());
    out.push('\n');

    if let Some(summary) = &view.filter_summary {
        out.push_str(&format!("Filtered by: {summary}\n"));
    }
    if !view.selected.is_empty() {
        out.push_str(&format!("{} selected\n", view.selected.len()));
    }
    for message in &view.messages {
        let text = match message.level {
            MessageLevel::Info => style(&message.text).cyan(),
            MessageLevel::Success => style(&message.text).green(),
            MessageLevel::Warning => style(&message.text).yellow(),
            MessageLevel::Error => style(&message.text).red(),
        };
        out.push_str(&format!("{text}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrilend_browser::{ColumnSpec, PageInfo, Pagination, Totals, TotalsScope, Value};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Plot {
        id: u32,
        barangay: String,
        area: f64,
    }

    fn schema() -> Schema<Plot> {
        Schema::builder()
            .column(ColumnSpec::new("id", "ID", |p: &Plot| Value::from(p.id)))
            .column(
                ColumnSpec::new("barangay", "Barangay", |p: &Plot| Value::from(&p.barangay))
                    .group("loc"),
            )
            .column(
                ColumnSpec::new("area", "Area", |p: &Plot| {
                    Value::from(p.area)
                })
                .sum(),
            )
            .group("loc", "Location")
            .build()
            .unwrap()
    }

    fn plots() -> Vec<Plot> {
        vec![
            Plot {
                id: 1,
                barangay: "Santo Niño".into(),
                area: 1.5,
            },
            Plot {
                id: 2,
                barangay: "Poblacion".into(),
                area: 2.0,
            },
        ]
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("Hello", 10), "Hello");
        assert_eq!(truncate_to_width("Hello World", 6), "Hello…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn totals_format() {
        assert_eq!(format_total(37000.0), "37,000");
        assert_eq!(format_total(1234.5), "1,234.50");
        assert_eq!(format_total(-12.0), "-12");
        assert_eq!(format_total(0.0), "0");
    }

    #[test]
    fn csv_uses_first_object_keys() {
        let csv = serialize_csv(&plots()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,barangay,area"));
        assert_eq!(lines.next(), Some("1,Santo Niño,1.5"));
    }

    #[test]
    fn table_csv_uses_headers_and_cell_text() {
        let plots = plots();
        let rows: Vec<&Plot> = plots.iter().collect();
        let csv = table_csv(&rows, &schema()).unwrap();
        assert!(csv.starts_with("ID,Barangay,Area\n"));
    }

    #[test]
    fn text_is_not_structured() {
        assert!(matches!(
            serialize_structured(&plots(), OutputFormat::Text),
            Err(SerializeError::NotStructured)
        ));
    }

    #[test]
    fn text_table_has_groups_footer_and_showing_line() {
        console::set_colors_enabled(false);
        let schema = schema();
        let plots = plots();
        let rows: Vec<&Plot> = plots.iter().collect();
        let totals = Totals::compute(&rows, &schema, TotalsScope::Filtered);
        let view = ListView::builder(rows, PageInfo::new(Pagination::new(1, 10), 2, 2))
            .totals(Some(totals))
            .selected(vec!["2".to_string()])
            .build();
        let layout = TableLayout {
            selection: true,
            header_groups: schema.header_groups(),
        };
        let text = render_text(&view, &schema, &layout);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("Location"));
        assert!(lines[1].starts_with("[-]  ID"));
        assert!(lines[3].starts_with("[ ]  1"));
        assert!(lines[4].starts_with("[x]  2"));
        assert!(lines[6].contains("Total"));
        assert!(lines[6].ends_with("3.50"));
        assert!(text.contains("Showing 1–2 of 2"));
        assert!(text.contains("1 selected"));
    }
}
