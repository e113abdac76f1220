//! Seeding of test data: the fixture drivers in the legacy collection and a
//! test user's ride history.

use chrono::{DateTime, Duration, Utc};

use crate::error::FirebaseError;
use crate::firestore::value::Fields;
use crate::firestore::{collection, DocRef};
use crate::models::{collections::LEGACY_DRIVERS, GeoPoint, LegacyDriver, RideRecord};
use crate::store::DocumentStore;

use super::banner;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub added: usize,
    pub updated: usize,
}

/// The four sample drivers, parked near the major airports of the test area.
pub fn sample_drivers() -> Vec<LegacyDriver> {
    let driver = |name: &str,
                  email: &str,
                  car_name: &str,
                  car_plate_num: &str,
                  car_type: &str,
                  latitude: f64,
                  longitude: f64| LegacyDriver {
        email: email.to_string(),
        name: name.to_string(),
        car_name: car_name.to_string(),
        car_plate_num: car_plate_num.to_string(),
        car_type: car_type.to_string(),
        driver_status: "Idle".to_string(),
        rate: 3.0,
        driver_loc: Some(
            Fields::new()
                .with(
                    "geopoint",
                    GeoPoint {
                        latitude,
                        longitude,
                    },
                )
                .into(),
        ),
    };

    vec![
        // Near Newark Airport
        driver(
            "Ahmed Khan",
            "ahmed.khan@driver.com",
            "Toyota Camry",
            "ABC-1234",
            "Car",
            40.6895,
            -74.1745,
        ),
        // Near JFK Airport
        driver(
            "Sara Ali",
            "sara.ali@driver.com",
            "Honda Civic",
            "XYZ-5678",
            "Car",
            40.6413,
            -73.7781,
        ),
        // Near La Guardia Airport
        driver(
            "Mohammed Hassan",
            "mohammed.hassan@driver.com",
            "Toyota RAV4",
            "SUV-9012",
            "SUV",
            40.7769,
            -73.8740,
        ),
        // Near Philadelphia Airport
        driver(
            "Fatima Ahmed",
            "fatima.ahmed@driver.com",
            "Yamaha R15",
            "MOT-3456",
            "MotorCycle",
            39.8719,
            -75.2411,
        ),
    ]
}

/// Upserts the sample drivers into the legacy collection, keyed by email.
/// Existing documents are field-patched instead of recreated, so running this
/// twice leaves exactly as many documents as running it once.
pub async fn seed_drivers(store: &mut impl DocumentStore) -> Result<SeedSummary, FirebaseError> {
    banner("SEEDING DRIVERS COLLECTION");

    let mut summary = SeedSummary::default();

    for driver in sample_drivers() {
        let doc_ref = collection(LEGACY_DRIVERS).doc(driver.email.as_str());

        let status = match upsert_driver(store, &doc_ref, &driver).await {
            Ok(status) => status,
            Err(e) => {
                println!("! error for driver {}: {e:#}", driver.email);
                continue;
            }
        };

        match status {
            UpsertOutcome::Added => summary.added += 1,
            UpsertOutcome::Updated => summary.updated += 1,
        }

        println!("{}: {} ({})", status.as_str(), driver.name, driver.car_name);
        println!("   email:  {}", driver.email);
        println!("   type:   {}", driver.car_type);
        if let Some(location) = driver.location() {
            println!("   loc:    {}, {}", location.latitude, location.longitude);
        }
        println!("   status: {}", driver.driver_status);
    }

    println!(
        "\nDrivers: {} added, {} updated",
        summary.added, summary.updated
    );

    Ok(summary)
}

#[derive(Clone, Copy)]
enum UpsertOutcome {
    Added,
    Updated,
}

impl UpsertOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Updated => "Updated",
        }
    }
}

async fn upsert_driver(
    store: &mut impl DocumentStore,
    doc_ref: &DocRef,
    driver: &LegacyDriver,
) -> Result<UpsertOutcome, FirebaseError> {
    let fields = driver.to_fields();

    if store.get(doc_ref).await?.is_some() {
        store.update(doc_ref, &fields).await?;
        Ok(UpsertOutcome::Updated)
    } else {
        store.set(doc_ref, &fields).await?;
        Ok(UpsertOutcome::Added)
    }
}

/// The four sample rides of the test user, with times relative to `now`.
pub fn sample_rides(user_email: &str, now: DateTime<Utc>) -> Vec<RideRecord> {
    vec![
        RideRecord {
            origin_lat: 40.6895,
            origin_lng: -74.1745,
            origin_address: "Newark Liberty International Airport".to_string(),
            destination_lat: 40.7589,
            destination_lng: -73.9851,
            destination_address: "Times Square, New York, NY".to_string(),
            time: now - Duration::days(3),
            user_email: user_email.to_string(),
            driver_email: "ahmed.khan@driver.com".to_string(),
        },
        RideRecord {
            origin_lat: 40.6413,
            origin_lng: -73.7781,
            origin_address: "John F. Kennedy International Airport".to_string(),
            destination_lat: 40.7128,
            destination_lng: -74.0060,
            destination_address: "Central Park, New York, NY".to_string(),
            time: now - Duration::days(2),
            user_email: user_email.to_string(),
            driver_email: "sara.ali@driver.com".to_string(),
        },
        RideRecord {
            origin_lat: 40.7769,
            origin_lng: -73.8740,
            origin_address: "LaGuardia Airport".to_string(),
            destination_lat: 40.7484,
            destination_lng: -73.9857,
            destination_address: "Empire State Building, New York, NY".to_string(),
            time: now - Duration::days(1),
            user_email: user_email.to_string(),
            driver_email: "mohammed.hassan@driver.com".to_string(),
        },
        RideRecord {
            origin_lat: 39.8719,
            origin_lng: -75.2411,
            origin_address: "Philadelphia International Airport".to_string(),
            destination_lat: 40.7488,
            destination_lng: -73.9680,
            destination_address: "Brooklyn Bridge, New York, NY".to_string(),
            time: now - Duration::hours(12),
            user_email: user_email.to_string(),
            driver_email: "fatima.ahmed@driver.com".to_string(),
        },
    ]
}

/// Replaces the test user's ride history with the given rides. The per-user
/// collection is named by the user's email address; everything in it is
/// deleted first, so the collection ends up containing exactly `rides`.
pub async fn seed_ride_history(
    store: &mut impl DocumentStore,
    user_email: &str,
    rides: &[RideRecord],
) -> Result<usize, FirebaseError> {
    banner(&format!("SEEDING USER RIDE HISTORY ({user_email})"));

    let history = collection(user_email);

    let existing = store.list(&history).await?;
    for ride in &existing {
        store.delete(&history.doc(ride.id.as_str())).await?;
    }
    if !existing.is_empty() {
        println!("Cleared {} existing ride(s)", existing.len());
    }

    let mut added = 0;
    for ride in rides {
        match store.add(&history, &ride.to_fields()).await {
            Ok(_) => {
                added += 1;
                println!(
                    "Added ride: {} -> {}",
                    ride.origin_address, ride.destination_address
                );
                println!("   time:   {}", ride.time.format("%Y-%m-%d %H:%M:%S"));
                println!("   driver: {}", ride.driver_email);
            }
            Err(e) => println!("! error adding ride: {e:#}"),
        }
    }

    println!("\nRide requests: {added} added");

    Ok(added)
}
