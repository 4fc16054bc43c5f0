//! Report of the most recently completed spell.
//!
//! CSV output has one row per archived point:
//! `point,total_rainfall_mm,ponding_in,cleared_in`.

use clap::ValueEnum;
use log::info;
use psm_core::{Spell, SpellLifecycle};

use crate::output::{amount, json, or_dash, table, when};
use crate::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
    Csv,
}

pub fn run_report(ctx: &Context, city: &str, format: ReportFormat) -> anyhow::Result<String> {
    let Some(spell) = SpellLifecycle::new(&ctx.db).latest_report(city)? else {
        anyhow::bail!("No completed spell found for {}.", city);
    };
    info!(
        "Reporting spell {} for {} ({} points)",
        spell.id,
        city,
        spell.spell_data.len()
    );
    match format {
        ReportFormat::Table => Ok(render_table(&spell)),
        ReportFormat::Json => json(&spell),
        ReportFormat::Csv => render_csv(&spell),
    }
}

pub fn render_table(spell: &Spell) -> String {
    let header = format!(
        "{}: spell {} to {}",
        spell.city_name,
        when(Some(&spell.start_time)),
        when(spell.end_time.as_ref())
    );
    let rows: Vec<Vec<String>> = spell
        .spell_data
        .iter()
        .map(|e| {
            vec![
                e.point_name.clone(),
                amount(e.total_rainfall),
                amount(e.ponding_level),
                or_dash(&e.cleared_in_time),
            ]
        })
        .collect();
    format!(
        "{}\n\n{}",
        header,
        table(&["Point", "Rainfall mm", "Ponding in", "Cleared in"], &rows)
    )
}

pub fn render_csv(spell: &Spell) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["point", "total_rainfall_mm", "ponding_in", "cleared_in"])?;
    for e in &spell.spell_data {
        let rainfall = e.total_rainfall.to_string();
        let ponding = e.ponding_level.to_string();
        wtr.write_record([
            e.point_name.as_str(),
            rainfall.as_str(),
            ponding.as_str(),
            e.cleared_in_time.as_str(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(String::from_utf8(bytes)?)
}
