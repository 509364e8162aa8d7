use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use food_dashboard::data::model::{CellValue, DatasetKind, Table};

const CITIES: [&str; 8] = [
    "Austin", "Boston", "Chicago", "Denver", "Houston", "Miami", "Portland", "Seattle",
];
const PROVIDER_TYPES: [&str; 4] = ["Restaurant", "Grocery Store", "Supermarket", "Catering Service"];
const RECEIVER_TYPES: [&str; 4] = ["NGO", "Shelter", "Charity", "Individual"];
const FOODS: [(&str, &str); 10] = [
    ("Bread", "Vegetarian"),
    ("Rice", "Vegan"),
    ("Vegetables", "Vegan"),
    ("Fruits", "Vegan"),
    ("Soup", "Vegetarian"),
    ("Pasta", "Vegetarian"),
    ("Dairy", "Vegetarian"),
    ("Chicken", "Non-Vegetarian"),
    ("Fish", "Non-Vegetarian"),
    ("Salad", "Vegan"),
];
const MEAL_TYPES: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snacks"];
const STATUSES: [&str; 3] = ["Completed", "Pending", "Cancelled"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Uniform integer in `1..=n`.
    fn id(&mut self, n: usize) -> i64 {
        (self.next_u64() % n as u64) as i64 + 1
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|c| c.to_string()).collect()
}

fn text(s: impl Into<String>) -> CellValue {
    CellValue::String(s.into())
}

fn providers(rng: &mut SimpleRng, n: usize) -> Result<Table> {
    let rows = (1..=n as i64)
        .map(|id| {
            vec![
                CellValue::Integer(id),
                text(format!("Provider {id}")),
                text(rng.pick(&PROVIDER_TYPES)),
                text(format!("{} Market Street", 10 + id * 7)),
                text(rng.pick(&CITIES)),
                text(format!("555-01{id:02}")),
            ]
        })
        .collect();
    Ok(Table::new(
        DatasetKind::Providers.name(),
        columns(&["Provider_ID", "Name", "Type", "Address", "City", "Contact"]),
        rows,
    )?)
}

fn receivers(rng: &mut SimpleRng, n: usize) -> Result<Table> {
    let rows = (1..=n as i64)
        .map(|id| {
            vec![
                CellValue::Integer(id),
                text(format!("Receiver {id}")),
                text(rng.pick(&RECEIVER_TYPES)),
                text(rng.pick(&CITIES)),
                text(format!("555-02{id:02}")),
            ]
        })
        .collect();
    Ok(Table::new(
        DatasetKind::Receivers.name(),
        columns(&["Receiver_ID", "Name", "Type", "City", "Contact"]),
        rows,
    )?)
}

/// Every 17th listing has no quantity, to exercise null-safe sums.
fn food_listings(rng: &mut SimpleRng, n: usize, providers: &Table) -> Result<Table> {
    let rows = (1..=n as i64)
        .map(|id| {
            let (name, food_type) = FOODS[(rng.next_u64() % FOODS.len() as u64) as usize];
            let quantity = if id % 17 == 0 {
                CellValue::Null
            } else {
                CellValue::Integer(rng.gauss(25.0, 12.0).round().clamp(1.0, 60.0) as i64)
            };
            let provider = &providers.rows[(rng.id(providers.len()) - 1) as usize];
            vec![
                CellValue::Integer(id),
                text(name),
                quantity,
                text(format!("2025-03-{:02}", rng.id(28))),
                provider[0].clone(),
                provider[2].clone(),
                provider[4].clone(),
                text(food_type),
                text(rng.pick(&MEAL_TYPES)),
            ]
        })
        .collect();
    Ok(Table::new(
        DatasetKind::FoodListings.name(),
        columns(&[
            "Food_ID",
            "Food_Name",
            "Quantity",
            "Expiry_Date",
            "Provider_ID",
            "Provider_Type",
            "Location",
            "Food_Type",
            "Meal_Type",
        ]),
        rows,
    )?)
}

/// A few claims reference receivers that do not exist; joins drop them.
fn claims(rng: &mut SimpleRng, n: usize, n_food: usize, n_receivers: usize) -> Result<Table> {
    let rows = (1..=n as i64)
        .map(|id| {
            vec![
                CellValue::Integer(id),
                CellValue::Integer(rng.id(n_food)),
                CellValue::Integer(rng.id(n_receivers + 3)),
                text(rng.pick(&STATUSES)),
                text(format!(
                    "2025-03-{:02} {:02}:{:02}:00",
                    rng.id(28),
                    rng.id(24) - 1,
                    rng.id(60) - 1
                )),
            ]
        })
        .collect();
    Ok(Table::new(
        DatasetKind::Claims.name(),
        columns(&["Claim_ID", "Food_ID", "Receiver_ID", "Status", "Timestamp"]),
        rows,
    )?)
}

fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| match cell {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }))?;
    }
    writer.flush()?;
    Ok(())
}

/// Integer-only columns become Int64, everything else Utf8.
fn write_parquet(table: &Table, path: &Path) -> Result<()> {
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());

    for (idx, name) in table.columns.iter().enumerate() {
        let cells = table.rows.iter().map(|row| &row[idx]);
        let integer = cells
            .clone()
            .all(|c| matches!(c, CellValue::Integer(_) | CellValue::Null));
        if integer {
            let values: Int64Array = cells
                .map(|c| match c {
                    CellValue::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect();
            fields.push(Field::new(name, DataType::Int64, true));
            arrays.push(Arc::new(values));
        } else {
            let values: StringArray = cells
                .map(|c| match c {
                    CellValue::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
            fields.push(Field::new(name, DataType::Utf8, true));
            arrays.push(Arc::new(values));
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut out_dir = PathBuf::from(".");
    let mut parquet = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--parquet" => parquet = true,
            other => out_dir = PathBuf::from(other),
        }
    }
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let providers = providers(&mut rng, 25)?;
    let receivers = receivers(&mut rng, 40)?;
    let food = food_listings(&mut rng, 120, &providers)?;
    let claims = claims(&mut rng, 200, food.len(), receivers.len())?;

    for table in [&claims, &food, &providers, &receivers] {
        let path = if parquet {
            let path = out_dir.join(format!("{}_data.parquet", table.name));
            write_parquet(table, &path)?;
            path
        } else {
            let path = out_dir.join(format!("{}_data.csv", table.name));
            write_csv(table, &path)?;
            path
        };
        println!("Wrote {} rows to {}", table.len(), path.display());
    }

    if parquet {
        println!(
            "Point food_dashboard.json \"sources\" at the .parquet files to use them, e.g. \
             {{\"sources\": {{\"claims\": \"claims_data.parquet\"}}}}"
        );
    }
    Ok(())
}
