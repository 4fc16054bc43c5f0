//! End-to-end spell lifecycles against the SQLite store.

use chrono::{DateTime, Local, TimeZone, Utc};
use psm_core::{
    AccessRequestInput, AccessRequests, CityInput, CityRegistry, CitySummary, Error, MonitorStore,
    PointInput, PondingPointService, Role, SpellLifecycle, SpellStatus,
};
use psm_db::Database;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(2024, 7, day, hour, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn seeded() -> Database {
    let db = Database::new().unwrap();
    db.load_cities("NAME,LATITUDE,LONGITUDE\nLahore,31.5204,74.3587\nMultan,30.1575,71.5249\n")
        .unwrap();
    db
}

fn create(db: &Database, city: &str, name: &str, spell: f64, ponding: f64, now: DateTime<Utc>) -> String {
    PondingPointService::new(db)
        .add_or_update(
            city,
            &PointInput {
                name: Some(name.to_string()),
                current_spell: spell,
                ponding,
                ..PointInput::default()
            },
            now,
        )
        .unwrap()
        .id
}

fn reading(id: &str, spell: f64, ponding: f64, cleared: &str) -> PointInput {
    PointInput {
        id: Some(id.to_string()),
        name: None,
        current_spell: spell,
        ponding,
        cleared_in_time: Some(cleared.to_string()),
    }
}

#[test]
fn lahore_spell_from_start_to_report() {
    let db = seeded();
    let lifecycle = SpellLifecycle::new(&db);
    let points = PondingPointService::new(&db);

    lifecycle.start_spell("Lahore", at(15, 8)).unwrap();
    let a = create(&db, "Lahore", "A", 5.0, 2.0, at(15, 9));
    let b = create(&db, "Lahore", "B", 3.0, 0.0, at(15, 9));

    match lifecycle.stop_spell("Lahore", at(15, 10)).unwrap_err() {
        Error::RainfallStillActive { points, .. } => assert_eq!(points, ["A", "B"]),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(db.get_point(&a).unwrap().unwrap().current_spell, 5.0);
    assert!(db.find_active_spell("Lahore").unwrap().is_some());

    points
        .batch_update(
            "Lahore",
            &[reading(&a, 0.0, 2.0, ""), reading(&b, 0.0, 0.0, "")],
            at(15, 11),
        )
        .unwrap();

    let spell = lifecycle.stop_spell("Lahore", at(15, 12)).unwrap();
    assert_eq!(spell.status, SpellStatus::Completed);
    assert_eq!(spell.spell_data.len(), 2);

    let report = lifecycle.latest_report("Lahore").unwrap().unwrap();
    assert_eq!(report, spell);
    let totals: Vec<(&str, f64)> = report
        .spell_data
        .iter()
        .map(|e| (e.point_name.as_str(), e.total_rainfall))
        .collect();
    assert_eq!(totals, [("A", 5.0), ("B", 3.0)]);

    for p in db.list_points("Lahore").unwrap() {
        assert_eq!(p.current_spell, 0.0);
        assert_eq!(p.max_spell_rainfall, 0.0);
        assert!(!p.is_raining);
    }
    assert!(db.find_active_spell("Lahore").unwrap().is_none());
}

#[test]
fn second_start_keeps_one_active_spell() {
    let db = seeded();
    let lifecycle = SpellLifecycle::new(&db);
    let first = lifecycle.start_spell("Lahore", at(15, 8)).unwrap();
    assert!(matches!(
        lifecycle.start_spell("Lahore", at(15, 9)).unwrap_err(),
        Error::AlreadyActive { .. }
    ));
    assert_eq!(db.find_active_spell("Lahore").unwrap().unwrap().id, first.id);

    lifecycle.stop_spell("Lahore", at(15, 10)).unwrap();
    lifecycle.start_spell("Lahore", at(15, 11)).unwrap();
}

#[test]
fn daily_max_follows_the_calendar_day() {
    let db = seeded();
    let points = PondingPointService::new(&db);
    let id = create(&db, "Multan", "Chowk Kumharan", 8.0, 0.0, at(15, 8));

    let same_day = points
        .add_or_update("Multan", &reading(&id, 3.0, 0.0, ""), at(15, 20))
        .unwrap();
    assert_eq!(same_day.daily_max_spell, 8.0);

    let next_day = points
        .add_or_update("Multan", &reading(&id, 2.0, 0.0, ""), at(16, 7))
        .unwrap();
    assert_eq!(next_day.daily_max_spell, 2.0);
    assert_eq!(db.get_point(&id).unwrap().unwrap().daily_max_spell, 2.0);
}

#[test]
fn clearance_rejection_writes_nothing() {
    let db = seeded();
    let points = PondingPointService::new(&db);
    let p = create(&db, "Lahore", "P", 0.0, 4.0, at(15, 8));
    let q = create(&db, "Lahore", "Q", 1.0, 0.0, at(15, 8));

    let err = points
        .batch_update(
            "Lahore",
            &[reading(&q, 6.0, 0.0, ""), reading(&p, 0.0, 0.0, "")],
            at(15, 9),
        )
        .unwrap_err();
    assert!(err.to_string().contains("\"P\""));
    assert_eq!(db.get_point(&q).unwrap().unwrap().current_spell, 1.0);
    assert_eq!(db.get_point(&p).unwrap().unwrap().ponding, 4.0);

    let cleared = points
        .add_or_update("Lahore", &reading(&p, 0.0, 0.0, "01:15"), at(15, 10))
        .unwrap();
    assert_eq!(db.get_point(&p).unwrap().unwrap(), cleared);
}

#[test]
fn summary_reflects_stored_points() {
    let db = seeded();
    SpellLifecycle::new(&db).start_spell("Lahore", at(15, 8)).unwrap();
    create(&db, "Lahore", "A", 12.0, 3.5, at(15, 9));
    create(&db, "Lahore", "B", 0.0, 0.0, at(15, 9));

    let summary = CitySummary::load(&db, "Lahore", &at(15, 10)).unwrap();
    assert!(summary.spell_active);
    assert_eq!(summary.point_count, 2);
    assert_eq!(summary.raining_points, 1);
    assert_eq!(summary.max_spell_today, 12.0);
    assert_eq!(summary.max_ponding, 3.5);
}

#[test]
fn registry_and_access_requests() {
    let db = seeded();
    let registry = CityRegistry::new(&db);
    registry
        .create_city(&CityInput {
            name: "Sialkot".to_string(),
            latitude: 32.4945,
            longitude: 74.5229,
        })
        .unwrap();
    assert!(registry
        .create_city(&CityInput {
            name: "Sialkot".to_string(),
            latitude: 32.4945,
            longitude: 74.5229,
        })
        .is_err());
    let names: Vec<String> = registry.list_cities().unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["Lahore", "Multan", "Sialkot"]);

    let requests = AccessRequests::new(&db);
    let input = AccessRequestInput {
        email: "Operator@Lahore.gov.pk".to_string(),
        role: Role::CityUser,
        assigned_city: Some("Lahore".to_string()),
    };
    requests.request_access(&input, at(15, 8)).unwrap();
    assert!(matches!(
        requests.request_access(&input, at(15, 9)).unwrap_err(),
        Error::DuplicateRequest { .. }
    ));
    let pending = requests.pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].email, "operator@lahore.gov.pk");
}

#[test]
fn padded_city_names_cannot_skip_the_stop_guard() {
    let db = seeded();
    let lifecycle = SpellLifecycle::new(&db);
    lifecycle.start_spell("Lahore ", at(15, 8)).unwrap();
    let id = create(&db, " Lahore", "A", 5.0, 0.0, at(15, 9));
    assert_eq!(db.query_point(&id).unwrap().unwrap().city_name, "Lahore");

    let err = lifecycle.stop_spell(" Lahore ", at(15, 10)).unwrap_err();
    assert!(matches!(err, Error::RainfallStillActive { .. }));
    assert!(matches!(
        PondingPointService::new(&db).list(" "),
        Err(Error::Validation { .. })
    ));
}
