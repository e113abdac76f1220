use chrono::{Duration, TimeZone, Utc};

use trips_admin::firestore::collection;
use trips_admin::firestore::value::Fields;
use trips_admin::models::collections::LEGACY_DRIVERS;
use trips_admin::models::GeoPoint;
use trips_admin::ops::seed::{sample_drivers, sample_rides, seed_drivers, seed_ride_history};
use trips_admin::store::DocumentStore;
use trips_admin::testing::MemoryStore;

#[tokio::test]
async fn seeding_twice_updates_instead_of_duplicating() {
    let mut store = MemoryStore::new();

    let first = seed_drivers(&mut store).await.unwrap();
    assert_eq!(first.added, 4);
    assert_eq!(first.updated, 0);

    let second = seed_drivers(&mut store).await.unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 4);

    // Still exactly one document per sample driver.
    assert_eq!(
        store.count(&collection(LEGACY_DRIVERS)).await.unwrap(),
        sample_drivers().len() as u64
    );
}

#[tokio::test]
async fn seeded_drivers_carry_the_legacy_field_layout() {
    let mut store = MemoryStore::new();

    seed_drivers(&mut store).await.unwrap();

    let ahmed = store
        .document(LEGACY_DRIVERS, "ahmed.khan@driver.com")
        .unwrap();
    assert_eq!(ahmed.str("Car Name"), Some("Toyota Camry"));
    assert_eq!(ahmed.str("Car Plate Num"), Some("ABC-1234"));
    assert_eq!(ahmed.str("Car Type"), Some("Car"));
    assert_eq!(ahmed.str("name"), Some("Ahmed Khan"));
    assert_eq!(ahmed.str("driverStatus"), Some("Idle"));
    assert_eq!(ahmed.double("rate"), Some(3.0));

    let loc = ahmed.map("driverLoc").unwrap();
    let point = GeoPoint::from_value(loc.get("geopoint").unwrap()).unwrap();
    assert_eq!(point.latitude, 40.6895);
    assert_eq!(point.longitude, -74.1745);
}

#[tokio::test]
async fn reseeding_ride_history_replaces_prior_entries() {
    let user_email = "test.user@example.com";
    let mut store = MemoryStore::new();

    // Two stale rides from an earlier run.
    store.insert(user_email, "stale-1", Fields::new().with("OriginAddress", "Old A"));
    store.insert(user_email, "stale-2", Fields::new().with("OriginAddress", "Old B"));

    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let rides = sample_rides(user_email, now);

    let added = seed_ride_history(&mut store, user_email, &rides)
        .await
        .unwrap();
    assert_eq!(added, 4);

    // The post-condition count equals the new set's size, regardless of how
    // many rides existed before.
    let history = store.list(&collection(user_email)).await.unwrap();
    assert_eq!(history.len(), 4);
    assert!(history.iter().all(|doc| !doc.id.starts_with("stale-")));

    let origins: Vec<_> = history
        .iter()
        .filter_map(|doc| doc.fields.str("OriginAddress"))
        .collect();
    assert!(origins.contains(&"Newark Liberty International Airport"));
    assert!(origins.contains(&"Philadelphia International Airport"));

    // Ride times are relative to the supplied reference time.
    let times: Vec<_> = history
        .iter()
        .filter_map(|doc| doc.fields.timestamp("time"))
        .collect();
    assert!(times.contains(&(now - Duration::days(3))));
    assert!(times.contains(&(now - Duration::hours(12))));

    for doc in &history {
        assert_eq!(doc.fields.str("userEmail"), Some(user_email));
    }
}

#[tokio::test]
async fn reseeding_into_an_empty_collection_just_inserts() {
    let user_email = "fresh.user@example.com";
    let mut store = MemoryStore::new();

    let rides = sample_rides(user_email, Utc::now());
    let added = seed_ride_history(&mut store, user_email, &rides)
        .await
        .unwrap();

    assert_eq!(added, 4);
    assert_eq!(store.count(&collection(user_email)).await.unwrap(), 4);
}
