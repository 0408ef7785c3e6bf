use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{Dataset, INTERACTIONS_KEY, InteractionRow, InteractionTable};

/// Parquet footer entry naming the `uns` slot a table belongs to.
pub const UNS_KEY_METADATA: &str = "uns_key";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset container from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one interactions table; slot named by the `uns_key` footer entry
/// * `.json`    – `{ "uns": { "<key>": [ {row}, ... ] } }`
/// * `.csv`     – the five interaction columns, stored as `nichenet_lr_res`
pub fn load_dataset(name: &str, path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let uns = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    for (key, table) in &uns {
        validate(table).with_context(|| format!("uns['{key}']"))?;
    }

    Ok(Dataset {
        uns,
        ..Dataset::new(name)
    })
}

/// Weights must be finite and non-negative.
fn validate(table: &InteractionTable) -> Result<()> {
    for (i, row) in table.iter().enumerate() {
        if !row.weight.is_finite() || row.weight < 0.0 {
            bail!("row {i}: weight {} is not a non-negative number", row.weight);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct JsonContainer {
    uns: serde_json::Map<String, JsonValue>,
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "uns": {
///     "nichenet_lr_res": [
///       { "source": "Adipocytes", "target": "SMCs",
///         "ligand_complex": "Lep", "receptor_complex": "Lepr", "weight": 1.4 },
///       ...
///     ],
///     "log1p": { "base": null }
///   }
/// }
/// ```
///
/// Entries that are not arrays of records are skipped.
fn load_json(path: &Path) -> Result<BTreeMap<String, InteractionTable>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let container: JsonContainer = serde_json::from_str(&text).context("parsing JSON")?;

    let mut uns = BTreeMap::new();
    for (key, value) in container.uns {
        let is_records = match &value {
            JsonValue::Array(items) => items.first().map_or(true, JsonValue::is_object),
            _ => false,
        };
        if !is_records {
            log::debug!("{}: skipping non-tabular uns entry '{key}'", path.display());
            continue;
        }
        let rows: Vec<InteractionRow> = serde_json::from_value(value)
            .with_context(|| format!("uns['{key}'] is not an interactions table"))?;
        uns.insert(key, InteractionTable::new(rows));
    }
    Ok(uns)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row `source,target,ligand_complex,receptor_complex,weight`
/// (any column order, extra columns ignored).
fn load_csv(path: &Path) -> Result<BTreeMap<String, InteractionTable>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<InteractionRow>().enumerate() {
        rows.push(result.with_context(|| format!("CSV row {row_no}"))?);
    }

    Ok(BTreeMap::from([(
        INTERACTIONS_KEY.to_string(),
        InteractionTable::new(rows),
    )]))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one interactions table.
///
/// Expected schema:
/// - `source`, `target`, `ligand_complex`, `receptor_complex`: Utf8, LargeUtf8
///   or Dictionary<_, Utf8> (pandas categoricals)
/// - `weight`: any numeric type
///
/// Other columns are ignored.  The table lands in the `uns` slot named by the
/// `uns_key` footer entry, or `nichenet_lr_res` when the footer has none.
fn load_parquet(path: &Path) -> Result<BTreeMap<String, InteractionTable>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let key = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|entries| entries.iter().find(|kv| kv.key == UNS_KEY_METADATA))
        .and_then(|kv| kv.value.clone())
        .unwrap_or_else(|| INTERACTIONS_KEY.to_string());

    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_batch(&batch, &mut rows)?;
    }

    Ok(BTreeMap::from([(key, InteractionTable::new(rows))]))
}

// -- Parquet / Arrow helpers --

fn append_batch(batch: &RecordBatch, rows: &mut Vec<InteractionRow>) -> Result<()> {
    let source = string_column(batch, "source")?;
    let target = string_column(batch, "target")?;
    let ligand = string_column(batch, "ligand_complex")?;
    let receptor = string_column(batch, "receptor_complex")?;
    let weight = f64_column(batch, "weight")?;

    let n = batch.num_rows();
    rows.reserve(n);
    let columns = source
        .into_iter()
        .zip(target)
        .zip(ligand)
        .zip(receptor)
        .zip(weight);
    for ((((source, target), ligand_complex), receptor_complex), weight) in columns {
        rows.push(InteractionRow {
            source,
            target,
            ligand_complex,
            receptor_complex,
            weight,
        });
    }
    Ok(())
}

/// Read a text column, casting large and dictionary-encoded strings to Utf8.
fn string_column(batch: &RecordBatch, name: &str) -> Result<Vec<String>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow!("Parquet file missing '{name}' column"))?;
    let col = cast(batch.column(idx), &DataType::Utf8)
        .with_context(|| format!("column '{name}' is not text"))?;
    let strings = col.as_string::<i32>();

    (0..strings.len())
        .map(|row| {
            if strings.is_null(row) {
                bail!("Row {row}: null in '{name}'");
            }
            Ok(strings.value(row).to_string())
        })
        .collect()
}

/// Read a numeric column as `f64`, whatever its physical type.
fn f64_column(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow!("Parquet file missing '{name}' column"))?;
    let col = cast(batch.column(idx), &DataType::Float64)
        .with_context(|| format!("column '{name}' is not numeric"))?;
    let values = col.as_primitive::<Float64Type>();

    (0..values.len())
        .map(|row| {
            if values.is_null(row) {
                bail!("Row {row}: null in '{name}'");
            }
            Ok(values.value(row))
        })
        .collect()
}
