use chrono::{TimeZone, Utc};

use trips_admin::firestore::value::{FieldValue, Fields};
use trips_admin::models::collections::{DRIVERS, LEGACY_DRIVERS, USERS, USER_PROFILES};
use trips_admin::models::{GeoPoint, LegacyDriver, UserProfile};
use trips_admin::ops::migrate::{create_user_profiles, migrate_drivers, verify_migration};
use trips_admin::store::DocumentStore;
use trips_admin::testing::{MemoryDirectory, MemoryStore};

fn legacy_driver(email: &str, location: Option<GeoPoint>) -> LegacyDriver {
    LegacyDriver {
        email: email.to_string(),
        name: "Ahmed Khan".to_string(),
        car_name: "Toyota Camry".to_string(),
        car_plate_num: "ABC-1234".to_string(),
        car_type: "Car".to_string(),
        driver_status: "Idle".to_string(),
        rate: 3.0,
        driver_loc: location
            .map(|point| FieldValue::Map(Fields::new().with("geopoint", point))),
    }
}

#[tokio::test]
async fn migrates_a_driver_into_users_and_drivers() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let mut store = MemoryStore::with_now(now);
    let mut directory = MemoryDirectory::new();

    let driver = legacy_driver("ahmed.khan@driver.com", None);
    store.insert(LEGACY_DRIVERS, &driver.email, driver.to_fields());
    directory.add_account(&driver.email, "uid-ahmed");

    let summary = migrate_drivers(&mut store, &mut directory).await.unwrap();

    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.skipped, 0);

    let user = store.document(USERS, "uid-ahmed").unwrap();
    assert_eq!(user.str("userType"), Some("driver"));
    assert_eq!(user.str("email"), Some("ahmed.khan@driver.com"));
    assert_eq!(user.str("name"), Some("Ahmed Khan"));
    assert_eq!(user.boolean("isActive"), Some(true));
    // Timestamps are server-assigned at write time.
    assert_eq!(user.timestamp("createdAt"), Some(now));
    assert_eq!(user.timestamp("lastLogin"), Some(now));

    let migrated = store.document(DRIVERS, "uid-ahmed").unwrap();
    assert_eq!(migrated.str("carName"), Some("Toyota Camry"));
    assert_eq!(migrated.str("carPlateNum"), Some("ABC-1234"));
    assert_eq!(migrated.str("carType"), Some("Car"));
    assert_eq!(migrated.double("rate"), Some(3.0));
    assert_eq!(migrated.str("driverStatus"), Some("Idle"));
    assert_eq!(migrated.double("rating"), Some(5.0));
    assert_eq!(migrated.integer("totalRides"), Some(0));
    assert_eq!(migrated.double("earnings"), Some(0.0));
    assert_eq!(migrated.str("licenseNumber"), Some(""));
    assert_eq!(migrated.boolean("isVerified"), Some(false));
}

#[tokio::test]
async fn skips_records_without_an_auth_account() {
    let mut store = MemoryStore::new();
    let mut directory = MemoryDirectory::new();

    let driver = legacy_driver("nobody@driver.com", None);
    store.insert(LEGACY_DRIVERS, &driver.email, driver.to_fields());

    let summary = migrate_drivers(&mut store, &mut directory).await.unwrap();

    assert_eq!(summary.migrated, 0);
    assert_eq!(summary.skipped, 1);

    // Nothing was written for the unresolvable record.
    assert!(store.document(USERS, "nobody@driver.com").is_none());
    assert_eq!(store.count(&trips_admin::firestore::collection(USERS)).await.unwrap(), 0);
    assert_eq!(
        store
            .count(&trips_admin::firestore::collection(DRIVERS))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn patches_user_type_without_touching_other_fields() {
    let mut store = MemoryStore::new();
    let mut directory = MemoryDirectory::new();

    let driver = legacy_driver("sara.ali@driver.com", None);
    store.insert(LEGACY_DRIVERS, &driver.email, driver.to_fields());
    directory.add_account(&driver.email, "uid-sara");

    // The account already has an app-managed user document.
    store.insert(
        USERS,
        "uid-sara",
        Fields::new()
            .with("userType", "user")
            .with("profileImageUrl", "x.png")
            .with("phoneNumber", "+15550100"),
    );

    migrate_drivers(&mut store, &mut directory).await.unwrap();

    let user = store.document(USERS, "uid-sara").unwrap();
    assert_eq!(user.str("userType"), Some("driver"));
    // Independently managed profile data survives the migration.
    assert_eq!(user.str("profileImageUrl"), Some("x.png"));
    assert_eq!(user.str("phoneNumber"), Some("+15550100"));
    // The patch did not sneak in creation timestamps either.
    assert!(!user.contains("createdAt"));
}

#[tokio::test]
async fn copies_the_location_only_when_present() {
    let mut store = MemoryStore::new();
    let mut directory = MemoryDirectory::new();

    let located = legacy_driver(
        "ahmed.khan@driver.com",
        Some(GeoPoint {
            latitude: 40.69,
            longitude: -74.17,
        }),
    );
    let unlocated = legacy_driver("sara.ali@driver.com", None);

    store.insert(LEGACY_DRIVERS, &located.email, located.to_fields());
    store.insert(LEGACY_DRIVERS, &unlocated.email, unlocated.to_fields());
    directory.add_account(&located.email, "uid-located");
    directory.add_account(&unlocated.email, "uid-unlocated");

    migrate_drivers(&mut store, &mut directory).await.unwrap();

    let with_loc = store.document(DRIVERS, "uid-located").unwrap();
    let loc = with_loc.map("driverLoc").expect("location should be copied");
    let point = GeoPoint::from_value(loc.get("geopoint").unwrap()).unwrap();
    assert_eq!(point.latitude, 40.69);
    assert_eq!(point.longitude, -74.17);

    let without_loc = store.document(DRIVERS, "uid-unlocated").unwrap();
    assert!(!without_loc.contains("driverLoc"));
}

#[tokio::test]
async fn rerunning_resets_accrued_activity_to_defaults() {
    // Preserved-as-observed behavior: the driver document is overwritten
    // wholesale on every run, so activity accrued since the last run is lost.
    let mut store = MemoryStore::new();
    let mut directory = MemoryDirectory::new();

    let driver = legacy_driver("ahmed.khan@driver.com", None);
    store.insert(LEGACY_DRIVERS, &driver.email, driver.to_fields());
    directory.add_account(&driver.email, "uid-ahmed");

    migrate_drivers(&mut store, &mut directory).await.unwrap();

    // The driver accrues some activity through the app.
    store
        .update(
            &trips_admin::firestore::collection(DRIVERS).doc("uid-ahmed"),
            &Fields::new()
                .with("totalRides", 7)
                .with("earnings", 123.5)
                .with("rating", 4.4),
        )
        .await
        .unwrap();

    let summary = migrate_drivers(&mut store, &mut directory).await.unwrap();
    assert_eq!(summary.migrated, 1);

    let migrated = store.document(DRIVERS, "uid-ahmed").unwrap();
    assert_eq!(migrated.integer("totalRides"), Some(0));
    assert_eq!(migrated.double("earnings"), Some(0.0));
    assert_eq!(migrated.double("rating"), Some(5.0));
}

#[tokio::test]
async fn profiles_are_created_for_regular_users_only() {
    let mut store = MemoryStore::new();

    store.insert(USERS, "uid-rider", Fields::new().with("userType", "user"));
    store.insert(USERS, "uid-driver", Fields::new().with("userType", "driver"));
    // A rider that already has a profile keeps it untouched.
    store.insert(USERS, "uid-settled", Fields::new().with("userType", "user"));
    store.insert(
        USER_PROFILES,
        "uid-settled",
        Fields::new().with("homeAddress", "1 Main St"),
    );

    let created = create_user_profiles(&mut store).await.unwrap();
    assert_eq!(created, 1);

    let profile = store.document(USER_PROFILES, "uid-rider").unwrap();
    assert_eq!(profile, &UserProfile::default().to_fields());
    assert!(store.document(USER_PROFILES, "uid-driver").is_none());

    let settled = store.document(USER_PROFILES, "uid-settled").unwrap();
    assert_eq!(settled.str("homeAddress"), Some("1 Main St"));

    // A second pass finds nothing left to create.
    let created_again = create_user_profiles(&mut store).await.unwrap();
    assert_eq!(created_again, 0);
}

#[tokio::test]
async fn verification_reports_counts_and_samples() {
    let mut store = MemoryStore::new();
    let mut directory = MemoryDirectory::new();

    for (email, uid) in [
        ("ahmed.khan@driver.com", "uid-1"),
        ("sara.ali@driver.com", "uid-2"),
    ] {
        let driver = legacy_driver(email, None);
        store.insert(LEGACY_DRIVERS, email, driver.to_fields());
        directory.add_account(email, uid);
    }

    migrate_drivers(&mut store, &mut directory).await.unwrap();

    let report = verify_migration(&mut store).await.unwrap();

    let count_of = |name: &str| {
        report
            .counts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    };
    assert_eq!(count_of(USERS), Some(2));
    assert_eq!(count_of(DRIVERS), Some(2));
    assert_eq!(count_of(USER_PROFILES), Some(0));
    assert_eq!(count_of(LEGACY_DRIVERS), Some(2));

    assert!(report.sample_user.is_some());
    let sample_driver = report.sample_driver.unwrap();
    assert_eq!(sample_driver.fields.str("carName"), Some("Toyota Camry"));
}
