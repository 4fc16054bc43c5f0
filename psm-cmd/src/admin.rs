//! Database setup, cities and access requests.

use chrono::Utc;
use log::info;
use psm_core::{AccessRequestInput, AccessRequests, CityInput, CityRegistry, Role};
use std::path::Path;

use crate::output::{json, or_dash, table, when};
use crate::Context;

/// Bundled Punjab cities.
pub const CITIES_CSV: &str = include_str!("../../fixtures/cities.csv");

/// Bundled ponding points.
pub const POINTS_CSV: &str = include_str!("../../fixtures/ponding_points.csv");

/// The schema is applied when the database is opened; this only reports it.
pub fn init(ctx: &Context) -> anyhow::Result<String> {
    info!("Schema ready in {}", ctx.database);
    Ok(format!("Initialized database at {}", ctx.database))
}

/// Load city and point fixtures, from files when given, else the bundled CSVs.
pub fn seed(ctx: &Context, cities: Option<&Path>, points: Option<&Path>) -> anyhow::Result<String> {
    let cities_data = match cities {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        None => CITIES_CSV.to_string(),
    };
    let points_data = match points {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        None => POINTS_CSV.to_string(),
    };

    let new_cities = ctx.db.load_cities(&cities_data)?;
    let new_points = ctx.db.load_points(&points_data)?;
    Ok(format!(
        "Seeded {} cities and {} ponding points",
        new_cities, new_points
    ))
}

pub fn add_city(ctx: &Context, name: &str, latitude: f64, longitude: f64) -> anyhow::Result<String> {
    let city = CityRegistry::new(&ctx.db).create_city(&CityInput {
        name: name.to_string(),
        latitude,
        longitude,
    })?;
    if ctx.json {
        return json(&city);
    }
    Ok(format!("Created city {} ({})", city.name, city.id))
}

pub fn cities(ctx: &Context) -> anyhow::Result<String> {
    let cities = CityRegistry::new(&ctx.db).list_cities()?;
    if ctx.json {
        return json(&cities);
    }
    let rows: Vec<Vec<String>> = cities
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                format!("{:.4}", c.latitude),
                format!("{:.4}", c.longitude),
            ]
        })
        .collect();
    Ok(table(&["City", "Latitude", "Longitude"], &rows))
}

pub fn request_access(ctx: &Context, email: &str, role: Role, city: Option<String>) -> anyhow::Result<String> {
    let request = AccessRequests::new(&ctx.db).request_access(
        &AccessRequestInput {
            email: email.to_string(),
            role,
            assigned_city: city,
        },
        Utc::now(),
    )?;
    if ctx.json {
        return json(&request);
    }
    Ok(format!(
        "Access request recorded for {} ({}); awaiting approval",
        request.email, request.role
    ))
}

pub fn pending_requests(ctx: &Context) -> anyhow::Result<String> {
    let pending = AccessRequests::new(&ctx.db).pending()?;
    if ctx.json {
        return json(&pending);
    }
    let rows: Vec<Vec<String>> = pending
        .iter()
        .map(|r| {
            vec![
                r.email.clone(),
                r.role.to_string(),
                or_dash(r.assigned_city.as_deref().unwrap_or("")),
                when(Some(&r.requested_at)),
            ]
        })
        .collect();
    Ok(table(&["Email", "Role", "City", "Requested"], &rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::context;

    #[test]
    fn bundled_fixtures_seed_every_city() {
        let ctx = context(false);
        let out = seed(&ctx, None, None).unwrap();
        assert!(out.starts_with("Seeded"));
        let names: Vec<String> = ctx.db.query_cities().unwrap().into_iter().map(|c| c.name).collect();
        for city in ["Lahore", "Multan", "Rawalpindi", "Faisalabad"] {
            assert!(names.iter().any(|n| n == city), "{city} missing");
        }
        assert!(!ctx.db.query_points("Lahore").unwrap().is_empty());

        // Seeding again adds nothing
        assert_eq!(
            seed(&ctx, None, None).unwrap(),
            "Seeded 0 cities and 0 ponding points"
        );
    }

    #[test]
    fn missing_fixture_file_is_an_error() {
        let ctx = context(false);
        let err = seed(&ctx, Some(Path::new("/nonexistent/cities.csv")), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cities.csv"));
    }

    #[test]
    fn add_city_and_list() {
        let ctx = context(false);
        add_city(&ctx, "Sialkot", 32.4945, 74.5229).unwrap();
        let listing = cities(&ctx).unwrap();
        assert!(listing.contains("Sialkot"));
        assert!(listing.contains("32.4945"));

        let err = add_city(&ctx, "Nowhere", 123.0, 0.0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid latitude.");
    }

    #[test]
    fn cities_as_json() {
        let ctx = context(true);
        let value: serde_json::Value = serde_json::from_str(&cities(&ctx).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["name"], "Lahore");
    }

    #[test]
    fn access_requests_round_trip() {
        let ctx = context(false);
        request_access(&ctx, "viewer@example.pk", Role::Viewer, None).unwrap();
        let listing = pending_requests(&ctx).unwrap();
        assert!(listing.contains("viewer@example.pk"));
        assert!(request_access(&ctx, "viewer@example.pk", Role::Viewer, None).is_err());
    }
}
