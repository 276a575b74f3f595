//! Sort direction, sort spec and value comparison.

use std::cmp::Ordering;

use deunicode::deunicode;
use serde::{Deserialize, Serialize};

use crate::schema::Schema;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn toggled(self) -> Dir {
        match self {
            Dir::Asc => Dir::Desc,
            Dir::Desc => Dir::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Dir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Dir::Asc),
            "desc" | "descending" => Ok(Dir::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// Column and direction to sort by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub dir: Dir,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        SortSpec {
            column: column.into(),
            dir: Dir::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        SortSpec {
            column: column.into(),
            dir: Dir::Desc,
        }
    }

    pub fn new(column: impl Into<String>, dir: Dir) -> Self {
        SortSpec {
            column: column.into(),
            dir,
        }
    }

    /// Sorts `rows` in place (stable).
    ///
    /// An unknown column leaves the order untouched. Missing values go last
    /// in both directions.
    pub fn sort<T>(&self, rows: &mut [&T], schema: &Schema<T>) {
        let Some(column) = schema.column(&self.column) else {
            log::debug!("sort column '{}' not in schema; keeping order", self.column);
            return;
        };
        rows.sort_by(|a, b| {
            compare_nulls_last(&column.value(*a), &column.value(*b), self.dir)
        });
    }
}

/// Compares two values, sinking `None` to the bottom whatever the direction.
///
/// The direction only flips comparisons between two defined values.
pub fn compare_nulls_last(a: &Value<'_>, b: &Value<'_>, dir: Dir) -> Ordering {
    match (a.is_none(), b.is_none()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => dir.apply(compare_values(a, b).unwrap_or(Ordering::Equal)),
    }
}

/// Compares two defined values of compatible types.
///
/// Strings use [`collate`]. Numbers, timestamps and booleans compare
/// relationally. Returns `None` on type mismatch or NaN.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_str(), b.as_str()) {
        return Some(collate(a, b));
    }
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Locale-style string collation.
///
/// Primary key: the text with diacritics folded to ASCII and lower-cased,
/// so `"Ñino"` sits next to `"nino"` and `"apple"` before `"Banana"`.
/// Ties fall back to plain code-point order to keep the result total.
pub fn collate(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| deunicode(s).to_lowercase();
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}
