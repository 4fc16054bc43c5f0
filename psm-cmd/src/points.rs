//! Ponding point listing and readings.

use chrono::Utc;
use psm_core::{PointInput, PondingPoint, PondingPointService};
use serde::Deserialize;
use std::path::Path;

use crate::output::{amount, json, or_dash, table, when};
use crate::Context;

/// One row of a batch update file.
#[derive(Debug, Deserialize)]
struct BatchRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "CURRENT_SPELL")]
    current_spell: f64,
    #[serde(rename = "PONDING")]
    ponding: f64,
    #[serde(rename = "CLEARED_IN", default)]
    cleared_in: Option<String>,
}

impl From<BatchRow> for PointInput {
    fn from(row: BatchRow) -> PointInput {
        PointInput {
            id: Some(row.id),
            name: None,
            current_spell: row.current_spell,
            ponding: row.ponding,
            cleared_in_time: row.cleared_in,
        }
    }
}

/// Parse a batch update CSV (`ID,CURRENT_SPELL,PONDING,CLEARED_IN`, with headers).
///
/// An empty `CLEARED_IN` keeps the stored clearance time.
pub fn parse_batch(csv_data: &str) -> anyhow::Result<Vec<PointInput>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());
    let mut inputs = Vec::new();
    for (index, result) in rdr.deserialize::<BatchRow>().enumerate() {
        let row = result.map_err(|e| anyhow::anyhow!("Row {}: {}", index + 1, e))?;
        inputs.push(row.into());
    }
    Ok(inputs)
}

pub fn list(ctx: &Context, city: &str) -> anyhow::Result<String> {
    let points = PondingPointService::new(&ctx.db).list(city)?;
    if ctx.json {
        return json(&points);
    }
    if points.is_empty() {
        return Ok(format!("No ponding points recorded for {}", city));
    }
    Ok(points_table(&points))
}

pub fn upsert(ctx: &Context, city: &str, input: PointInput) -> anyhow::Result<String> {
    let point = PondingPointService::new(&ctx.db).add_or_update(city, &input, Utc::now())?;
    if ctx.json {
        return json(&point);
    }
    Ok(format!(
        "Saved {} ({}): spell {} mm, ponding {} in",
        point.name,
        point.id,
        amount(point.current_spell),
        amount(point.ponding)
    ))
}

pub fn batch_update_file(ctx: &Context, city: &str, file: &Path) -> anyhow::Result<String> {
    let data = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    let inputs = parse_batch(&data)?;
    let updated = PondingPointService::new(&ctx.db).batch_update(city, &inputs, Utc::now())?;
    if ctx.json {
        return json(&updated);
    }
    Ok(format!("Updated {} ponding points in {}", updated.len(), city))
}

pub fn delete(ctx: &Context, id: &str) -> anyhow::Result<String> {
    PondingPointService::new(&ctx.db).delete(id)?;
    Ok(format!("Deleted ponding point {}", id.trim()))
}

fn points_table(points: &[PondingPoint]) -> String {
    let rows: Vec<Vec<String>> = points
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                amount(p.current_spell),
                amount(p.max_spell_rainfall),
                amount(p.daily_max_spell),
                amount(p.ponding),
                or_dash(&p.cleared_in_time),
                when(p.updated_at.as_ref()),
                p.id.clone(),
            ]
        })
        .collect();
    table(
        &[
            "Point",
            "Spell mm",
            "Max mm",
            "Today mm",
            "Ponding in",
            "Cleared in",
            "Updated",
            "ID",
        ],
        &rows,
    )
}
