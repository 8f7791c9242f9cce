//! Conversion of merged response blocks into polars dataframes.

use polars::prelude::*;

use crate::merged::{Block, BlockTable, MergedResponse};

/// Build one dataframe per block present in the response.
///
/// A block with an empty row list still produces an (empty) dataframe so
/// callers can tell "present but empty" from "not requested".
pub fn response_frames(response: &MergedResponse) -> PolarsResult<Vec<(Block, DataFrame)>> {
    let mut frames = Vec::new();
    for block in Block::ALL {
        if let Some(table) = response.block(block) {
            frames.push((block, table_to_frame(table)?));
        }
    }
    Ok(frames)
}

/// Build a dataframe from a block's row list.
///
/// Column order follows the `columns` field when the service sent one,
/// else first-seen key order across the rows.
pub fn table_to_frame(table: &BlockTable) -> PolarsResult<DataFrame> {
    if table.rows.is_empty() {
        return Ok(DataFrame::empty());
    }

    let columns = if table.columns.is_empty() {
        infer_columns(&table.rows)
    } else {
        table.columns.clone()
    };

    let mut series = Vec::with_capacity(columns.len());
    for name in &columns {
        let values: Vec<AnyValue> = table
            .rows
            .iter()
            .map(|row| json_to_any(row.get(name)))
            .collect();
        let column = Series::from_any_values(name.as_str().into(), &values, false)?;
        series.push(column.into_column());
    }
    DataFrame::new(series)
}

/// First-seen key order across all rows.
fn infer_columns(rows: &[serde_json::Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Some(object) = row.as_object() {
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

fn json_to_any(value: Option<&serde_json::Value>) -> AnyValue<'static> {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) => AnyValue::Null,
        Some(Value::Bool(b)) => AnyValue::Boolean(*b),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => AnyValue::Float64(f),
            None => AnyValue::Null,
        },
        Some(Value::String(s)) => AnyValue::StringOwned(s.as_str().into()),
        // Nested arrays/objects are opaque to the tabular view.
        Some(other) => AnyValue::StringOwned(other.to_string().into()),
    }
}
