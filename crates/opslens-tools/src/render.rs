//! Fixed-width rendering of query results.

use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

const MAX_DISPLAY_ROWS: usize = 100;
const NO_ROWS_MESSAGE: &str = "Query executed successfully. No rows returned.";

/// Render a row set as an aligned text table.
///
/// Column widths are computed over the full result set before any line
/// is emitted; display is capped at 100 rows with the full count
/// reported in the trailer. An empty result set renders as a fixed
/// message, never as a header-only table.
pub fn render_rows(rows: &[PgRow]) -> String {
    if rows.is_empty() {
        return NO_ROWS_MESSAGE.to_string();
    }

    let columns: Vec<String> = rows[0]
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| (0..columns.len()).map(|index| column_text(row, index)).collect())
        .collect();

    render_table(&columns, &cells)
}

/// Render a mutating statement's outcome.
pub fn render_affected(count: u64) -> String {
    format!(
        "Query executed successfully. {} row{} affected.",
        count,
        if count == 1 { "" } else { "s" }
    )
}

fn render_table(columns: &[String], cells: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|name| name.len()).collect();
    for row in cells {
        for (index, value) in row.iter().enumerate() {
            widths[index] = widths[index].max(value.len());
        }
    }

    let mut lines = Vec::with_capacity(cells.len().min(MAX_DISPLAY_ROWS) + 3);
    lines.push(
        columns
            .iter()
            .enumerate()
            .map(|(index, name)| format!("{:<width$}", name, width = widths[index]))
            .collect::<Vec<_>>()
            .join(" | "),
    );
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in cells.iter().take(MAX_DISPLAY_ROWS) {
        lines.push(
            row.iter()
                .enumerate()
                .map(|(index, value)| format!("{:<width$}", value, width = widths[index]))
                .collect::<Vec<_>>()
                .join(" | "),
        );
    }

    let total = cells.len();
    if total > MAX_DISPLAY_ROWS {
        lines.push(format!(
            "\n... showing {MAX_DISPLAY_ROWS} of {total} rows"
        ));
    } else {
        lines.push(format!(
            "\nTotal: {} row{}",
            total,
            if total == 1 { "" } else { "s" }
        ));
    }

    lines.join("\n")
}

/// Backend-native text for one cell; `NULL` for SQL nulls.
///
/// Values pass through the driver's decoding for the common analytic
/// types; anything undecodable renders as a placeholder instead of
/// failing the whole result set.
fn column_text(row: &PgRow, index: usize) -> String {
    let type_name = {
        let raw = match row.try_get_raw(index) {
            Ok(raw) => raw,
            Err(error) => return format!("<decode error: {error}>"),
        };
        if raw.is_null() {
            return "NULL".to_string();
        }
        raw.type_info().name().to_string()
    };

    match type_name.as_str() {
        "BOOL" => decoded::<bool>(row, index),
        "INT2" => decoded::<i16>(row, index),
        "INT4" => decoded::<i32>(row, index),
        "INT8" => decoded::<i64>(row, index),
        "FLOAT4" => decoded::<f32>(row, index),
        "FLOAT8" => decoded::<f64>(row, index),
        "TEXT" | "VARCHAR" | "CHAR" | "NAME" => decoded::<String>(row, index),
        "TIMESTAMP" => decoded::<chrono::NaiveDateTime>(row, index),
        "TIMESTAMPTZ" => decoded::<chrono::DateTime<chrono::Utc>>(row, index),
        "DATE" => decoded::<chrono::NaiveDate>(row, index),
        "TIME" => decoded::<chrono::NaiveTime>(row, index),
        "UUID" => decoded::<uuid::Uuid>(row, index),
        "JSON" | "JSONB" => decoded::<serde_json::Value>(row, index),
        other => format!("<unsupported: {other}>"),
    }
}

fn decoded<'r, T>(row: &'r PgRow, index: usize) -> String
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + std::fmt::Display,
{
    match row.try_get::<T, _>(index) {
        Ok(value) => value.to_string(),
        Err(error) => format!("<decode error: {error}>"),
    }
}
