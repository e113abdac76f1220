use trips_admin::firestore::value::Fields;
use trips_admin::models::collections::{DRIVERS, LEGACY_DRIVERS, USERS};
use trips_admin::ops::schema::{
    check_schema_readiness, inventory_collections, migration_plan, UNIFIED_COLLECTIONS,
};
use trips_admin::testing::MemoryStore;

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert(
        LEGACY_DRIVERS,
        "ahmed.khan@driver.com",
        Fields::new()
            .with("name", "Ahmed Khan")
            .with("Car Name", "Toyota Camry")
            .with("Car Type", "Car"),
    );
    store.insert(
        "test.user@example.com",
        "ride-1",
        Fields::new().with("OriginAddress", "Newark"),
    );
    store.insert(USERS, "uid-1", Fields::new().with("userType", "user"));
    store
}

#[tokio::test]
async fn inventory_counts_every_root_collection() {
    let mut store = seeded_store();

    let inventory = inventory_collections(&mut store).await.unwrap();

    let count_of = |name: &str| {
        inventory
            .iter()
            .find(|status| status.name == name)
            .map(|status| status.count)
    };
    assert_eq!(count_of(LEGACY_DRIVERS), Some(1));
    assert_eq!(count_of("test.user@example.com"), Some(1));
    assert_eq!(count_of(USERS), Some(1));
}

#[tokio::test]
async fn readiness_reports_missing_collections_as_empty() {
    let mut store = seeded_store();

    let statuses = check_schema_readiness(&mut store).await.unwrap();

    assert_eq!(statuses.len(), UNIFIED_COLLECTIONS.len());
    let status_of = |name: &str| statuses.iter().find(|s| s.name == name).unwrap();
    assert_eq!(status_of(USERS).count, 1);
    assert_eq!(status_of(DRIVERS).count, 0);
}

#[tokio::test]
async fn plan_lists_legacy_drivers_and_ride_history() {
    let mut store = seeded_store();

    let plan = migration_plan(&mut store).await.unwrap();

    assert_eq!(plan.legacy_drivers.len(), 1);
    assert_eq!(plan.legacy_drivers[0].email, "ahmed.khan@driver.com");
    assert_eq!(plan.legacy_drivers[0].car_name, "Toyota Camry");

    // Only the email-named collection counts as ride history.
    assert_eq!(plan.ride_history.len(), 1);
    assert_eq!(plan.ride_history[0].name, "test.user@example.com");
    assert_eq!(plan.ride_history[0].count, 1);
}
