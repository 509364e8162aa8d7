use crate::data::model::Table;

/// Upper bound on rows shown in a raw-data preview.
pub const MAX_PREVIEW_ROWS: usize = 50;

/// The first `max_rows` rows (at most [`MAX_PREVIEW_ROWS`]), unmodified.
pub fn to_preview(table: &Table, max_rows: usize) -> Table {
    let n = max_rows.min(MAX_PREVIEW_ROWS);
    table.with_rows(table.rows.iter().take(n).cloned().collect())
}

/// Column names as a pretty-printed JSON array, for the "available columns" view.
pub fn columns_json(table: &Table) -> String {
    serde_json::to_string_pretty(&table.columns).unwrap_or_else(|_| format!("{:?}", table.columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn numbered(n: i64) -> Table {
        Table::new(
            "claims",
            vec!["Claim_ID".into()],
            (1..=n).map(|i| vec![CellValue::Integer(i)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn preview_truncates_in_order() {
        let preview = to_preview(&numbered(20), 5);
        assert_eq!(preview.len(), 5);
        assert_eq!(preview.rows[0][0], CellValue::Integer(1));
        assert_eq!(preview.rows[4][0], CellValue::Integer(5));
    }

    #[test]
    fn preview_is_capped() {
        assert_eq!(to_preview(&numbered(80), 1000).len(), MAX_PREVIEW_ROWS);
        assert_eq!(to_preview(&numbered(3), 10).len(), 3);
    }

    #[test]
    fn columns_render_as_json_array() {
        let json = columns_json(&numbered(0));
        let parsed: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec!["Claim_ID"]);
    }
}
