//! Footer totals for numeric columns.

use serde::{Deserialize, Serialize};

use crate::schema::{Aggregate, Schema};

/// Which rows the footer sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalsScope {
    /// Every row that survived search and filters.
    #[default]
    Filtered,
    /// Only the rows on the displayed page.
    Page,
}

/// Sum of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTotal {
    pub column: String,
    pub total: f64,
}

/// Footer row: a leading label plus one total per summed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub label: String,
    pub scope: TotalsScope,
    pub columns: Vec<ColumnTotal>,
}

impl Totals {
    /// Sums every [`Aggregate::Sum`] column over `rows`.
    pub fn compute<T>(rows: &[&T], schema: &Schema<T>, scope: TotalsScope) -> Self {
        let columns = schema
            .columns()
            .iter()
            .filter(|c| c.aggregate == Aggregate::Sum)
            .map(|c| ColumnTotal {
                column: c.id.clone(),
                total: rows.iter().map(|r| c.value(*r).coerce_number()).sum(),
            })
            .collect();
        Totals {
            label: schema.totals_label().to_string(),
            scope,
            columns,
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|t| t.column == column)
            .map(|t| t.total)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSpec;
    use crate::value::Value;

    struct Loan {
        id: u32,
        amount: Option<f64>,
        note: &'static str,
    }

    fn loan(id: u32, amount: Option<f64>, note: &'static str) -> Loan {
        Loan { id, amount, note }
    }

    fn schema() -> Schema<Loan> {
        Schema::builder()
            .column(ColumnSpec::new("id", "ID", |l: &Loan| Value::from(l.id)))
            .column(
                ColumnSpec::new("amount", "Amount", |l: &Loan| {
                    Value::from(l.amount)
                })
                .sum(),
            )
            .column(
                ColumnSpec::new("note", "Note", |l: &Loan| {
                    Value::from(l.note)
                })
                .sum(),
            )
            .totals_label("Grand total")
            .build()
            .unwrap()
    }

    #[test]
    fn sums_flagged_columns_treating_junk_as_zero() {
        let loans = [
            loan(1, Some(100.0), "12"),
            loan(2, None, "n/a"),
            loan(3, Some(f64::NAN), "3.5"),
            loan(4, Some(50.5), ""),
        ];
        let rows: Vec<&Loan> = loans.iter().collect();
        let totals = Totals::compute(&rows, &schema(), TotalsScope::Filtered);

        assert_eq!(totals.label, "Grand total");
        assert_eq!(totals.get("amount"), Some(150.5));
        assert_eq!(totals.get("note"), Some(15.5));
        assert_eq!(totals.get("id"), None);
    }

    #[test]
    fn empty_rows_total_zero() {
        let totals = Totals::compute::<Loan>(&[], &schema(), TotalsScope::Page);
        assert_eq!(totals.get("amount"), Some(0.0));
        assert_eq!(totals.scope, TotalsScope::Page);
    }
}
