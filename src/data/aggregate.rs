use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use super::model::{CellValue, Table};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Aggregated values
// ---------------------------------------------------------------------------

/// Result of one group's aggregation.
///
/// Sums follow the value column's type: integer columns sum to `Integer`,
/// columns holding any float sum to `Float`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggValue {
    Count(u64),
    Integer(i64),
    Float(f64),
}

impl AggValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            AggValue::Count(c) => c as f64,
            AggValue::Integer(i) => i as f64,
            AggValue::Float(f) => f,
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AggValue::Count(a), AggValue::Count(b)) => a.cmp(b),
            (AggValue::Integer(a), AggValue::Integer(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for AggValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggValue::Count(c) => write!(f, "{c}"),
            AggValue::Integer(i) => write!(f, "{i}"),
            AggValue::Float(v) => write!(f, "{v:.2}"),
        }
    }
}

/// `(group key, aggregated value)` pairs.
pub type Groups = Vec<(CellValue, AggValue)>;

/// How to reduce the rows of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggFn {
    /// Number of rows.
    Count,
    /// Null-safe sum of the named numeric column.
    Sum(String),
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Groups in first-encounter order.
struct GroupIndex<T> {
    positions: HashMap<CellValue, usize>,
    groups: Vec<(CellValue, T)>,
}

impl<T: Default> GroupIndex<T> {
    fn new() -> Self {
        Self {
            positions: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn slot(&mut self, key: &CellValue) -> &mut T {
        let idx = match self.positions.get(key) {
            Some(&idx) => idx,
            None => {
                self.positions.insert(key.clone(), self.groups.len());
                self.groups.push((key.clone(), T::default()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx].1
    }
}

/// Row count per distinct value of `group_column`, in encounter order.
/// Nulls form their own group, so the counts always add up to the row count.
pub fn group_count(table: &Table, group_column: &str) -> Result<Groups> {
    let mut index: GroupIndex<u64> = GroupIndex::new();
    for key in table.column_values(group_column)? {
        *index.slot(key) += 1;
    }
    Ok(index
        .groups
        .into_iter()
        .map(|(key, count)| (key, AggValue::Count(count)))
        .collect())
}

#[derive(Default)]
struct NumericSum {
    int: i64,
    float: f64,
}

/// Sum of `value_column` per group, in encounter order.
///
/// Null and non-numeric cells add nothing, but their rows still define
/// groups: a group whose values are all missing sums to zero.
pub fn group_sum(table: &Table, group_column: &str, value_column: &str) -> Result<Groups> {
    let key_idx = table.column_index(group_column)?;
    let value_idx = table.column_index(value_column)?;
    let float_column = table
        .rows
        .iter()
        .any(|row| matches!(row[value_idx], CellValue::Float(_)));

    let mut index: GroupIndex<NumericSum> = GroupIndex::new();
    for row in &table.rows {
        let sum = index.slot(&row[key_idx]);
        match row[value_idx] {
            CellValue::Integer(i) => {
                sum.int = sum.int.saturating_add(i);
                sum.float += i as f64;
            }
            CellValue::Float(f) if f.is_finite() => sum.float += f,
            _ => {}
        }
    }

    Ok(index
        .groups
        .into_iter()
        .map(|(key, sum)| {
            let value = if float_column {
                AggValue::Float(sum.float)
            } else {
                AggValue::Integer(sum.int)
            };
            (key, value)
        })
        .collect())
}

/// Null-safe total of `column` over the whole table.
pub fn sum_column(table: &Table, column: &str) -> Result<AggValue> {
    let idx = table.column_index(column)?;
    let mut sum = NumericSum::default();
    let mut float_column = false;
    for row in &table.rows {
        match row[idx] {
            CellValue::Integer(i) => {
                sum.int = sum.int.saturating_add(i);
                sum.float += i as f64;
            }
            CellValue::Float(f) => {
                float_column = true;
                if f.is_finite() {
                    sum.float += f;
                }
            }
            _ => {}
        }
    }
    Ok(if float_column {
        AggValue::Float(sum.float)
    } else {
        AggValue::Integer(sum.int)
    })
}

/// Group `table` by `group_column` and reduce each group with `agg`.
pub fn aggregate(table: &Table, group_column: &str, agg: &AggFn) -> Result<Groups> {
    match agg {
        AggFn::Count => group_count(table, group_column),
        AggFn::Sum(value_column) => group_sum(table, group_column, value_column),
    }
}

/// The `n` largest groups, descending by value; ties go to the smaller key.
pub fn top_n(mut groups: Groups, n: usize) -> Groups {
    groups.sort_by(|(ka, va), (kb, vb)| vb.total_cmp(va).then_with(|| ka.cmp(kb)));
    groups.truncate(n);
    groups
}

// ---------------------------------------------------------------------------
// Joins
// ---------------------------------------------------------------------------

/// Inner join on `key`.
///
/// Output columns are the left columns followed by the right ones, minus the
/// right key; right columns whose name clashes get a `_right` suffix. Rows
/// follow left order, each expanded by its right matches in right order.
/// Rows without a match on the other side, and null keys, are dropped.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    let left_key = left.column_index(key)?;
    let right_key = right.column_index(key)?;

    let mut right_rows: HashMap<&CellValue, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows.iter().enumerate() {
        if !row[right_key].is_null() {
            right_rows.entry(&row[right_key]).or_default().push(i);
        }
    }

    let mut columns = left.columns.clone();
    for (i, col) in right.columns.iter().enumerate() {
        if i == right_key {
            continue;
        }
        if left.has_column(col) {
            columns.push(format!("{col}_right"));
        } else {
            columns.push(col.clone());
        }
    }

    let mut rows = Vec::new();
    for row in &left.rows {
        let Some(matches) = right_rows.get(&row[left_key]) else {
            continue;
        };
        for &m in matches {
            let mut joined = row.clone();
            joined.extend(
                right.rows[m]
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != right_key)
                    .map(|(_, v)| v.clone()),
            );
            rows.push(joined);
        }
    }

    log::debug!(
        "Joined {} ({} rows) with {} ({} rows) on {key}: {} rows",
        left.name,
        left.len(),
        right.name,
        right.len(),
        rows.len()
    );
    Table::new(&format!("{} join {}", left.name, right.name), columns, rows)
}

/// Inner-join `left` and `right` on `key`, then aggregate by `group_column`.
///
/// Unmatched rows are dropped by the join and never reach a group.
pub fn join_and_aggregate(
    left: &Table,
    right: &Table,
    key: &str,
    group_column: &str,
    agg: &AggFn,
) -> Result<Groups> {
    let joined = inner_join(left, right, key)?;
    aggregate(&joined, group_column, agg)
}
