//! Plain-text and JSON rendering helpers.

use chrono::{DateTime, Utc};
use psm_utils::dates::display_local;
use serde::Serialize;

/// Pretty JSON for `--json` output.
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers, &widths));
    out.push(line(&rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    for row in rows {
        out.push(line(&row.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    }
    out.join("\n")
}

fn line(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// One decimal place, as readings are entered.
pub fn amount(value: f64) -> String {
    format!("{:.1}", value)
}

pub fn when(instant: Option<&DateTime<Utc>>) -> String {
    instant.map(display_local).unwrap_or_else(|| "-".to_string())
}

/// Empty strings show as a dash in tables.
pub fn or_dash(s: &str) -> String {
    if s.trim().is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}
