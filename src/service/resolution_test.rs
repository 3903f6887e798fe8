use chrono::{NaiveDate, TimeZone, Utc};

use super::resolution::{resolve_bus_state, BoundingBox, DEFAULT_RADIUS_KM};
use crate::models::{Bus, BusStatus, DailyLocation, GeoPoint};

fn test_bus() -> Bus {
    Bus {
        bus_id: 1001,
        route_id: 1,
        status: BusStatus::OnTime,
        current_location: GeoPoint {
            latitude: 6.9,
            longitude: 79.8,
        },
        last_updated: Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap(),
        daily_locations: vec![DailyLocation {
            date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            location: GeoPoint {
                latitude: 7.0,
                longitude: 80.0,
            },
            status: BusStatus::Delayed,
        }],
    }
}

#[test]
fn no_date_returns_live_view() {
    let bus = test_bus();
    let view = resolve_bus_state(&bus, None);

    assert_eq!(view.status, BusStatus::OnTime);
    assert_eq!(view.current_location.latitude, 6.9);
    assert_eq!(view.current_location.longitude, 79.8);
    assert_eq!(view.last_updated, bus.last_updated);
}

#[test]
fn matching_day_returns_stored_entry() {
    let bus = test_bus();
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let view = resolve_bus_state(&bus, Some(day));

    assert_eq!(view.status, BusStatus::Delayed);
    assert_eq!(view.current_location.latitude, 7.0);
    assert_eq!(view.current_location.longitude, 80.0);
}

#[test]
fn missing_day_falls_back_to_live_view() {
    let bus = test_bus();
    let day = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
    let with_date = resolve_bus_state(&bus, Some(day));
    let live = resolve_bus_state(&bus, None);

    assert_eq!(with_date.status, live.status);
    assert_eq!(with_date.current_location.latitude, live.current_location.latitude);
    assert_eq!(with_date.current_location.longitude, live.current_location.longitude);
    assert_eq!(with_date.last_updated, live.last_updated);
}

#[test]
fn day_matching_ignores_time_of_day() {
    let mut bus = test_bus();
    bus.daily_locations[0].date = Utc.with_ymd_and_hms(2024, 6, 1, 17, 45, 30).unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let view = resolve_bus_state(&bus, Some(day));

    assert_eq!(view.status, BusStatus::Delayed);
}

#[test]
fn duplicate_days_resolve_to_first_inserted_entry() {
    let mut bus = test_bus();
    bus.daily_locations.push(DailyLocation {
        date: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        location: GeoPoint {
            latitude: 8.5,
            longitude: 81.2,
        },
        status: BusStatus::OnTime,
    });

    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let view = resolve_bus_state(&bus, Some(day));

    // earliest-inserted wins, not the most recent write
    assert_eq!(view.status, BusStatus::Delayed);
    assert_eq!(view.current_location.latitude, 7.0);
}

#[test]
fn empty_history_always_falls_back() {
    let mut bus = test_bus();
    bus.daily_locations.clear();

    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let view = resolve_bus_state(&bus, Some(day));

    assert_eq!(view.status, BusStatus::OnTime);
    assert_eq!(view.current_location.latitude, 6.9);
}

#[test]
fn bounding_box_uses_km_per_degree_approximation() {
    let center = GeoPoint {
        latitude: 6.9,
        longitude: 79.8,
    };
    let bounds = BoundingBox::around(center, 111.0);

    assert!((bounds.min_lat - 5.9).abs() < 1e-9);
    assert!((bounds.max_lat - 7.9).abs() < 1e-9);
    assert!((bounds.min_lng - 78.8).abs() < 1e-9);
    assert!((bounds.max_lng - 80.8).abs() < 1e-9);
}

#[test]
fn bounding_box_contains_is_inclusive_at_edges() {
    let center = GeoPoint {
        latitude: 0.0,
        longitude: 0.0,
    };
    let bounds = BoundingBox::around(center, DEFAULT_RADIUS_KM);
    let delta = 1.0 / 111.0;

    assert!(bounds.contains(center));
    assert!(bounds.contains(GeoPoint {
        latitude: delta,
        longitude: delta,
    }));
    assert!(!bounds.contains(GeoPoint {
        latitude: delta * 1.01,
        longitude: 0.0,
    }));
}
