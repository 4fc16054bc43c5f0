//! Command implementations for the PSM CLI.
//!
//! Each subcommand runs as one request against the [`Database`] opened by
//! the binary. Commands build their output as a string so the binary only
//! prints; `--json` switches every listing to `serde_json` output.

use clap::Subcommand;
use psm_core::{Role, WeatherSource};
use psm_db::Database;
use std::path::PathBuf;

pub mod admin;
pub mod output;
pub mod points;
pub mod report;
pub mod spells;

pub use report::ReportFormat;

/// Per-invocation state shared by all commands.
pub struct Context {
    pub db: Database,
    /// Path the database was opened from, for messages.
    pub database: String,
    pub weather: WeatherSource,
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database schema (no data)
    Init,

    /// Load cities and ponding points from CSV fixtures
    Seed {
        /// Cities CSV (NAME,LATITUDE,LONGITUDE); defaults to the bundled Punjab list
        #[arg(long)]
        cities: Option<PathBuf>,

        /// Ponding points CSV (CITY,NAME); defaults to the bundled list
        #[arg(long)]
        points: Option<PathBuf>,
    },

    /// Register a new city
    AddCity {
        name: String,

        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,

        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
    },

    /// List cities
    Cities,

    /// List the ponding points of a city
    Points { city: String },

    /// Create a ponding point, or record a reading for an existing one
    UpsertPoint {
        city: String,

        /// Existing point ID; omit to create a new point
        #[arg(long)]
        id: Option<String>,

        /// Point name (required when creating)
        #[arg(long)]
        name: Option<String>,

        /// Rainfall in the current spell (mm)
        #[arg(long, allow_hyphen_values = true)]
        spell: f64,

        /// Ponding depth (inches)
        #[arg(long, allow_hyphen_values = true)]
        ponding: f64,

        /// Time taken to clear ponding, e.g. "01:15"
        #[arg(long)]
        cleared_in: Option<String>,
    },

    /// Update several points of a city from a CSV file (ID,CURRENT_SPELL,PONDING,CLEARED_IN)
    BatchUpdate {
        city: String,

        #[arg(short = 'f', long)]
        file: PathBuf,
    },

    /// Delete a ponding point
    DeletePoint { id: String },

    /// Start a rainfall spell for a city
    StartSpell { city: String },

    /// Stop the active spell of a city and archive the final readings
    StopSpell { city: String },

    /// Dashboard summary of a city
    Status { city: String },

    /// Dashboard summary of every city
    Dashboard,

    /// Final readings of the most recently completed spell
    Report {
        city: String,

        #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,
    },

    /// Request city-user or viewer access
    RequestAccess {
        email: String,

        /// city-user or viewer
        #[arg(long)]
        role: Role,

        /// City a city-user may edit
        #[arg(long)]
        city: Option<String>,
    },

    /// List pending access requests
    PendingRequests,
}

/// Run `command` and return what should be printed.
pub fn execute(ctx: &Context, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Init => admin::init(ctx),
        Command::Seed { cities, points } => admin::seed(ctx, cities.as_deref(), points.as_deref()),
        Command::AddCity {
            name,
            latitude,
            longitude,
        } => admin::add_city(ctx, &name, latitude, longitude),
        Command::Cities => admin::cities(ctx),
        Command::Points { city } => points::list(ctx, &city),
        Command::UpsertPoint {
            city,
            id,
            name,
            spell,
            ponding,
            cleared_in,
        } => points::upsert(
            ctx,
            &city,
            psm_core::PointInput {
                id,
                name,
                current_spell: spell,
                ponding,
                cleared_in_time: cleared_in,
            },
        ),
        Command::BatchUpdate { city, file } => points::batch_update_file(ctx, &city, &file),
        Command::DeletePoint { id } => points::delete(ctx, &id),
        Command::StartSpell { city } => spells::start(ctx, &city),
        Command::StopSpell { city } => spells::stop(ctx, &city),
        Command::Status { city } => spells::status(ctx, &city),
        Command::Dashboard => spells::dashboard(ctx),
        Command::Report { city, format } => {
            let format = if ctx.json { ReportFormat::Json } else { format };
            report::run_report(ctx, &city, format)
        }
        Command::RequestAccess { email, role, city } => {
            admin::request_access(ctx, &email, role, city)
        }
        Command::PendingRequests => admin::pending_requests(ctx),
    }
}

/// Run `command` and print its output to stdout.
pub fn run(ctx: &Context, command: Command) -> anyhow::Result<()> {
    let out = execute(ctx, command)?;
    if !out.is_empty() {
        println!("{}", out.trim_end());
    }
    Ok(())
}
