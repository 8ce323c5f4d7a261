//! Text rendering of query results.
//!
//! `run_query` and the resources return human-readable tables; the JSON tools
//! return rows as-is.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use unicode_width::UnicodeWidthStr;

/// Text layout for `run_query`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// Markdown table (default)
    #[default]
    Markdown,
    /// ASCII table (like the psql/sqlite3 shells)
    Table,
}

pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(arr) => serde_json::to_string(arr).unwrap_or_default(),
        JsonValue::Object(obj) => serde_json::to_string(obj).unwrap_or_default(),
    }
}

/// Markdown cells cannot contain raw pipes or line breaks.
fn markdown_cell(value: &JsonValue) -> String {
    format_value(value)
        .replace('|', "\\|")
        .replace(['\n', '\r'], " ")
}

pub fn format_as_table(
    columns: &[String],
    rows: &[serde_json::Map<String, JsonValue>],
    execution_time_ms: u64,
) -> String {
    if columns.is_empty() {
        return "Empty set".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in rows {
        for (i, col) in columns.iter().enumerate() {
            if let Some(value) = row.get(col) {
                widths[i] = widths[i].max(format_value(value).width());
            }
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    let mut output = separator.clone();
    // Pad by display width, not char count, so CJK names stay aligned.
    let pad = |text: &str, width: usize, right: bool| {
        let fill = " ".repeat(width.saturating_sub(text.width()));
        if right {
            format!("| {}{} ", fill, text)
        } else {
            format!("| {}{} ", text, fill)
        }
    };

    output.extend(columns.iter().zip(&widths).map(|(c, w)| pad(c, *w, false)));
    output.push_str("|\n");
    output.push_str(&separator);

    for row in rows {
        for (col, w) in columns.iter().zip(&widths) {
            let value = row.get(col).unwrap_or(&JsonValue::Null);
            let text = format_value(value);
            output.push_str(&pad(&text, *w, matches!(value, JsonValue::Number(_))));
        }
        output.push_str("|\n");
    }

    output.push_str(&separator);

    let row_text = if rows.len() == 1 { "row" } else { "rows" };
    output.push_str(&format!(
        "{} {} in set ({:.2} sec)\n",
        rows.len(),
        row_text,
        execution_time_ms as f64 / 1000.0
    ));

    output
}

pub fn format_as_markdown(columns: &[String], rows: &[serde_json::Map<String, JsonValue>]) -> String {
    if columns.is_empty() {
        return "*Empty set*".to_string();
    }

    let mut output = String::new();

    output.extend(columns.iter().map(|c| format!("| {} ", c)));
    output.push_str("|\n");
    output.extend(columns.iter().map(|_| "|---"));
    output.push_str("|\n");

    for row in rows {
        for col in columns {
            let value = row.get(col).unwrap_or(&JsonValue::Null);
            output.push_str(&format!("| {} ", markdown_cell(value)));
        }
        output.push_str("|\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> (Vec<String>, Vec<serde_json::Map<String, JsonValue>>) {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            json!({"id": 1, "name": "Alice Smith"}),
            json!({"id": 22, "name": null}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        (columns, rows)
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&JsonValue::Null), "NULL");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_ascii_table() {
        let (columns, rows) = rows();
        let table = format_as_table(&columns, &rows, 1500);
        assert!(table.starts_with("+----+-------------+\n"));
        assert!(table.contains("|  1 | Alice Smith |"));
        assert!(table.contains("| 22 | NULL        |"));
        assert!(table.ends_with("2 rows in set (1.50 sec)\n"));
    }

    #[test]
    fn test_markdown_table() {
        let (columns, rows) = rows();
        let md = format_as_markdown(&columns, &rows);
        assert!(md.starts_with("| id | name |\n|---|---|\n"));
        assert!(md.contains("| 1 | Alice Smith |"));
        assert!(md.contains("| 22 | NULL |"));
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let columns = vec!["note".to_string()];
        let rows = vec![json!({"note": "a|b\nc"}).as_object().cloned().unwrap()];
        assert!(format_as_markdown(&columns, &rows).contains("| a\\|b c |"));
    }

    #[test]
    fn test_empty_columns() {
        assert_eq!(format_as_table(&[], &[], 0), "Empty set");
        assert_eq!(format_as_markdown(&[], &[]), "*Empty set*");
    }

    #[test]
    fn test_wide_characters_align() {
        let columns = vec!["name".to_string()];
        let rows = vec![json!({"name": "日本"}).as_object().cloned().unwrap()];
        let table = format_as_table(&columns, &rows, 0);
        assert!(table.contains("| 日本 |"));
    }
}
