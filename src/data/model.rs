use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common CSV column types.
/// Used as a group key and inside `BTreeSet` selections, so it must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

// Equality follows `Ord` and `Hash`: two NaN floats are the same key.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl CellValue {
    /// Interpret the value as a number; `None` for text, bools and nulls.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Infer a typed value from raw text: empty or NaN → Null, then i64, f64, bool.
    pub fn infer(s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            // "NaN" marks a missing value, not a number.
            return if f.is_nan() {
                CellValue::Null
            } else {
                CellValue::Float(f)
            };
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// DatasetKind – the four fixed datasets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Claims,
    FoodListings,
    Providers,
    Receivers,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Claims,
        DatasetKind::FoodListings,
        DatasetKind::Providers,
        DatasetKind::Receivers,
    ];

    /// Logical dataset name, used in warnings and config keys.
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Claims => "claims",
            DatasetKind::FoodListings => "food_listings",
            DatasetKind::Providers => "providers",
            DatasetKind::Receivers => "receivers",
        }
    }

    /// Heading shown above the dataset's section.
    pub fn title(self) -> &'static str {
        match self {
            DatasetKind::Claims => "Claims Data",
            DatasetKind::FoodListings => "Food Listings Data",
            DatasetKind::Providers => "Providers Data",
            DatasetKind::Receivers => "Receivers Data",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("{}_data.csv", self.name())
    }

    pub fn id_column(self) -> &'static str {
        match self {
            DatasetKind::Claims => "Claim_ID",
            DatasetKind::FoodListings => "Food_ID",
            DatasetKind::Providers => "Provider_ID",
            DatasetKind::Receivers => "Receiver_ID",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Table – one loaded dataset
// ---------------------------------------------------------------------------

/// An ordered sequence of rows sharing a fixed column schema.
///
/// Every row holds exactly one cell per column; constructors enforce this.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Dataset name (e.g. `food_listings`), reported in schema warnings.
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, rejecting rows whose width differs from the header.
    pub fn new(name: &str, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DashboardError::Parse {
                dataset: name.to_string(),
                message: format!(
                    "row {i} has {} cells but the header has {} columns",
                    row.len(),
                    columns.len()
                ),
            });
        }
        Ok(Table {
            name: name.to_string(),
            columns,
            rows,
        })
    }

    /// An empty table with the given schema.
    pub fn empty(name: &str, columns: Vec<String>) -> Self {
        Table {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Same schema, different rows. Rows are assumed to match the schema.
    pub(crate) fn with_rows(&self, rows: Vec<Vec<CellValue>>) -> Self {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Position of `column`, or `SchemaMismatch` naming this table.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DashboardError::schema_mismatch(&self.name, column))
    }

    /// Iterate over one column's cells in row order.
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = &CellValue>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Sorted set of distinct values in `column`.
    pub fn distinct_values(&self, column: &str) -> Result<BTreeSet<CellValue>> {
        Ok(self.column_values(column)?.cloned().collect())
    }
}
