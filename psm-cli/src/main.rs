//! PSM CLI - record rainfall spells and street ponding for Punjab cities.

use clap::Parser;
use psm_core::WeatherSource;
use psm_db::Database;

#[derive(Parser)]
#[command(
    name = "psm",
    version,
    about = "Punjab rainfall spell and ponding monitor"
)]
struct Cli {
    /// SQLite database file (":memory:" for a throwaway store)
    #[arg(long, global = true, env = "PSM_DATABASE", default_value = "psm.sqlite3")]
    database: String,

    /// Weather shown on the dashboard: none or demo
    #[arg(long, global = true, env = "PSM_WEATHER", default_value = "none")]
    weather: WeatherSource,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: psm_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let db = Database::open(&cli.database).inspect_err(|e| {
        log::error!("Failed to open database {}: {:#}", cli.database, e);
    })?;
    let ctx = psm_cmd::Context {
        db,
        database: cli.database,
        weather: cli.weather,
        json: cli.json,
    };

    psm_cmd::run(&ctx, cli.command).inspect_err(|e| match e.downcast_ref::<psm_core::Error>() {
        Some(err) if err.is_rejection() => log::warn!("{}", err),
        _ => log::error!("{:#}", e),
    })
}
