use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{CellValue, DatasetKind, Table};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Source locations
// ---------------------------------------------------------------------------

/// Where a dataset is read from. Also the cache key for loaded tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLocation {
    File(PathBuf),
    Url(String),
    /// In-memory table registered with the cache.
    Fixture(DatasetKind),
}

impl SourceLocation {
    /// Interpret a configured source: `http(s)://` URLs stay URLs,
    /// anything else is a path relative to `base_dir`.
    pub fn parse(base_dir: &Path, raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            SourceLocation::Url(raw.to_string())
        } else {
            SourceLocation::File(base_dir.join(raw))
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::File(p) => write!(f, "{}", p.display()),
            SourceLocation::Url(u) => write!(f, "{u}"),
            SourceLocation::Fixture(kind) => write!(f, "<fixture:{kind}>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one dataset from its configured location.
pub fn load_source(kind: DatasetKind, location: &SourceLocation) -> Result<Table> {
    let dataset = kind.name();
    match location {
        SourceLocation::File(path) => load_file(dataset, path),
        SourceLocation::Url(url) => load_url(dataset, url),
        // Fixtures live in the cache; reaching the loader means none was registered.
        SourceLocation::Fixture(_) => Err(DashboardError::DataSourceNotFound {
            dataset: dataset.to_string(),
            location: location.to_string(),
        }),
    }
}

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line (recommended)
/// * `.json`    – `[{ "Claim_ID": 1, "Status": "Pending", ... }, ...]`
/// * `.parquet` – flat columns of strings, ints, floats or bools
pub fn load_file(dataset: &str, path: &Path) -> Result<Table> {
    if !path.is_file() {
        return Err(DashboardError::DataSourceNotFound {
            dataset: dataset.to_string(),
            location: path.display().to_string(),
        });
    }

    let ext = extension_of(&path.to_string_lossy());
    let decoded = match ext.as_str() {
        "csv" => std::fs::File::open(path)
            .context("opening CSV")
            .and_then(|file| load_csv(dataset, file)),
        "json" => std::fs::read_to_string(path)
            .context("reading JSON file")
            .and_then(|text| load_json(dataset, &text)),
        "parquet" | "pq" => std::fs::File::open(path)
            .context("opening parquet file")
            .and_then(|file| load_parquet(dataset, file)),
        _ => return Err(unsupported(dataset, ext.clone())),
    };
    let table = decoded.map_err(|e| parse_error(dataset, e))?;

    log::info!(
        "Loaded {dataset} from {}: {} rows, columns {:?}",
        path.display(),
        table.len(),
        table.columns
    );
    Ok(table)
}

/// Fetch a table over HTTP(S). The URL path's extension picks the format.
fn load_url(dataset: &str, url: &str) -> Result<Table> {
    let fetch_err = |message: String| DashboardError::Fetch {
        dataset: dataset.to_string(),
        url: url.to_string(),
        message,
    };

    let response = reqwest::blocking::get(url).map_err(|e| fetch_err(e.to_string()))?;
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(DashboardError::DataSourceNotFound {
            dataset: dataset.to_string(),
            location: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(fetch_err(format!("HTTP {status}")));
    }
    let body = response.bytes().map_err(|e| fetch_err(e.to_string()))?;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = extension_of(path);
    let decoded = match ext.as_str() {
        "csv" => load_csv(dataset, &body[..]),
        "json" => std::str::from_utf8(&body)
            .context("JSON body is not UTF-8")
            .and_then(|text| load_json(dataset, text)),
        "parquet" | "pq" => load_parquet(dataset, body),
        _ => return Err(unsupported(dataset, ext.clone())),
    };
    let table = decoded.map_err(|e| parse_error(dataset, e))?;

    log::info!("Fetched {dataset} from {url}: {} rows", table.len());
    Ok(table)
}

fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn unsupported(dataset: &str, extension: String) -> DashboardError {
    DashboardError::UnsupportedFormat {
        dataset: dataset.to_string(),
        extension,
    }
}

fn parse_error(dataset: &str, err: anyhow::Error) -> DashboardError {
    match err.downcast::<DashboardError>() {
        Ok(err) => err,
        Err(err) => DashboardError::Parse {
            dataset: dataset.to_string(),
            message: format!("{err:#}"),
        },
    }
}

fn into_table(dataset: &str, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> anyhow::Result<Table> {
    Table::new(dataset, columns, rows).map_err(anyhow::Error::from)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every record the same width.
/// Cell types are inferred per cell (see [`CellValue::infer`]).
fn load_csv<R: Read>(dataset: &str, source: R) -> anyhow::Result<Table> {
    let mut reader = csv::Reader::from_reader(source);
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(CellValue::infer).collect());
    }

    into_table(dataset, columns, rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (an array of records):
///
/// ```json
/// [
///   { "Provider_ID": 1, "Name": "Green Grocer", "City": "Austin" },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys in first-seen order; absent keys become nulls.
fn load_json(dataset: &str, text: &str) -> anyhow::Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    into_table(dataset, columns, rows)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table, such as the ones written by
/// `generate_sample --parquet`. Unknown column types are rendered to text.
fn load_parquet<R: ChunkReader + 'static>(dataset: &str, source: R) -> anyhow::Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(source)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell_value(col, row))
                .collect::<anyhow::Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    into_table(dataset, columns, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> anyhow::Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::List(_) | DataType::LargeList(_) | DataType::Struct(_) | DataType::Map(_, _) => {
            bail!("nested column type {:?} is not supported", col.data_type())
        }
        _ => CellValue::String(
            array_value_to_string(&**col, row).context("formatting parquet value")?,
        ),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_cells_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "food_listings_data.csv",
            "Food_ID,Food_Name,Quantity,Food_Type\n1,Bread,20,Vegetarian\n2,Soup,,Vegan\n3,Rice,7.5,Vegan\n",
        );

        let table = load_file("food_listings", &path).unwrap();
        assert_eq!(table.columns, vec!["Food_ID", "Food_Name", "Quantity", "Food_Type"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0][2], CellValue::Integer(20));
        assert_eq!(table.rows[1][2], CellValue::Null);
        assert_eq!(table.rows[2][2], CellValue::Float(7.5));
        assert_eq!(table.name, "food_listings");
    }

    #[test]
    fn missing_file_is_data_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let location = SourceLocation::File(dir.path().join("claims_data.csv"));
        let err = load_source(DatasetKind::Claims, &location).unwrap_err();
        match err {
            DashboardError::DataSourceNotFound { dataset, location } => {
                assert_eq!(dataset, "claims");
                assert!(location.ends_with("claims_data.csv"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ragged_csv_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "claims_data.csv", "Claim_ID,Status\n1,Pending,extra\n");
        let err = load_file("claims", &path).unwrap_err();
        assert!(matches!(err, DashboardError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn json_records_fill_absent_keys_with_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "receivers.json",
            r#"[{"Receiver_ID": 1, "City": "Austin"}, {"Receiver_ID": 2}]"#,
        );
        let table = load_file("receivers", &path).unwrap();
        let city = table.column_index("City").unwrap();
        assert_eq!(table.rows[0][city], CellValue::from("Austin"));
        assert_eq!(table.rows[1][city], CellValue::Null);
    }

    #[test]
    fn json_columns_keep_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "receivers.json",
            r#"[{"Receiver_ID": 1, "City": "Austin"}, {"Receiver_ID": 2, "Name": "Pantry", "City": "Boston"}]"#,
        );
        let table = load_file("receivers", &path).unwrap();
        assert_eq!(table.columns, ["Receiver_ID", "City", "Name"]);
    }

    #[test]
    fn json_root_must_be_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "receivers.json", r#"{"Receiver_ID": 1}"#);
        let err = load_file("receivers", &path).unwrap_err();
        assert!(err.to_string().contains("top-level JSON array"), "{err}");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "providers.xlsx", "");
        let err = load_file("providers", &path).unwrap_err();
        assert_eq!(
            err,
            DashboardError::UnsupportedFormat {
                dataset: "providers".into(),
                extension: "xlsx".into(),
            }
        );
    }

    #[test]
    fn parquet_round_trips_flat_columns() {
        use arrow::array::{Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Provider_ID", DataType::Int64, false),
            Field::new("City", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec![Some("Austin"), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("providers_data.parquet");
        let mut writer = ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file("providers", &path).unwrap();
        assert_eq!(table.columns, vec!["Provider_ID", "City"]);
        assert_eq!(table.rows[0], vec![CellValue::Integer(1), CellValue::from("Austin")]);
        assert_eq!(table.rows[1], vec![CellValue::Integer(2), CellValue::Null]);
    }

    #[test]
    fn source_parse_distinguishes_urls() {
        let base = Path::new("/data");
        assert_eq!(
            SourceLocation::parse(base, "https://example.org/claims_data.csv"),
            SourceLocation::Url("https://example.org/claims_data.csv".into())
        );
        assert_eq!(
            SourceLocation::parse(base, "claims.csv"),
            SourceLocation::File(PathBuf::from("/data/claims.csv"))
        );
    }
}
