//! Spell start/stop and the city dashboard.

use chrono::Utc;
use psm_core::{CityRegistry, CitySummary, SpellLifecycle, WeatherReading};
use serde::Serialize;

use crate::output::{amount, json, table, when};
use crate::Context;

pub fn start(ctx: &Context, city: &str) -> anyhow::Result<String> {
    let spell = SpellLifecycle::new(&ctx.db).start_spell(city, Utc::now())?;
    if ctx.json {
        return json(&spell);
    }
    Ok(format!(
        "Spell started for {} at {} ({})",
        spell.city_name,
        when(Some(&spell.start_time)),
        spell.id
    ))
}

pub fn stop(ctx: &Context, city: &str) -> anyhow::Result<String> {
    let spell = SpellLifecycle::new(&ctx.db).stop_spell(city, Utc::now())?;
    if ctx.json {
        return json(&spell);
    }
    let lasted = spell
        .duration()
        .map(|d| format!("{}h {:02}m", d.num_hours(), d.num_minutes() % 60))
        .unwrap_or_else(|| "-".to_string());
    Ok(format!(
        "Spell stopped for {} after {}; archived {} ponding points",
        spell.city_name,
        lasted,
        spell.spell_data.len()
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    #[serde(flatten)]
    summary: CitySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    weather: Option<WeatherReading>,
}

/// Summary of a city, with weather when a source is configured.
pub fn status(ctx: &Context, city: &str) -> anyhow::Result<String> {
    let summary = CitySummary::load(&ctx.db, city, &Utc::now())?;
    let weather = ctx.weather.reading(&summary.city, summary.spell_active);
    if ctx.json {
        return json(&Status { summary, weather });
    }

    let mut lines = vec![summary.city.clone()];
    match summary.spell_started.as_ref() {
        Some(started) => lines.push(format!("  Spell:          active since {}", when(Some(started)))),
        None => lines.push("  Spell:          none".to_string()),
    }
    if let Some(w) = &weather {
        lines.push(format!("  Weather:        {}, {} °C", w.condition, w.temperature));
    }
    lines.push(format!(
        "  Points:         {} ({} with rainfall)",
        summary.point_count, summary.raining_points
    ));
    lines.push(format!("  Spell rainfall: {} mm max", amount(summary.max_current_spell)));
    lines.push(format!("  Today:          {} mm max", amount(summary.max_spell_today)));
    lines.push(format!("  Ponding:        {} in max", amount(summary.max_ponding)));
    Ok(lines.join("\n"))
}

/// One row per registered city: spell state, weather and ponding maxima.
pub fn dashboard(ctx: &Context) -> anyhow::Result<String> {
    let now = Utc::now();
    let mut statuses = Vec::new();
    for city in CityRegistry::new(&ctx.db).list_cities()? {
        let summary = CitySummary::load(&ctx.db, &city.name, &now)?;
        let weather = ctx.weather.reading(&summary.city, summary.spell_active);
        statuses.push(Status { summary, weather });
    }
    if ctx.json {
        return json(&statuses);
    }

    let rows: Vec<Vec<String>> = statuses
        .iter()
        .map(|s| {
            vec![
                s.summary.city.clone(),
                if s.summary.spell_active { "active" } else { "-" }.to_string(),
                s.weather
                    .as_ref()
                    .map(|w| format!("{}, {} °C", w.condition, w.temperature))
                    .unwrap_or_else(|| "-".to_string()),
                s.summary.point_count.to_string(),
                s.summary.raining_points.to_string(),
                amount(s.summary.max_current_spell),
                amount(s.summary.max_spell_today),
                amount(s.summary.max_ponding),
            ]
        })
        .collect();
    Ok(table(
        &[
            "City",
            "Spell",
            "Weather",
            "Points",
            "Raining",
            "Spell mm",
            "Today mm",
            "Ponding in",
        ],
        &rows,
    ))
}
