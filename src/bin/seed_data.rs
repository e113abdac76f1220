//! Seeds everything needed for testing the app views: the sample drivers,
//! plus a ride history for the test user named by `TEST_USER_EMAIL`. The ride
//! history is cleared before reseeding so the collection ends up containing
//! exactly the sample set.

use std::{env, process};

use chrono::Utc;

use trips_admin::credentials::{self, ServiceAccount};
use trips_admin::error::FirebaseError;
use trips_admin::firestore::client::{FirestoreClient, FirestoreClientOptions};
use trips_admin::ops::seed;

const DEFAULT_TEST_USER_EMAIL: &str = "test.user@example.com";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let service_account = resolve_credentials_or_exit();

    if let Err(e) = run(service_account).await {
        eprintln!("error: {e:?}");
        process::exit(1);
    }
}

async fn run(service_account: ServiceAccount) -> Result<(), FirebaseError> {
    let mut store =
        FirestoreClient::initialise(service_account, FirestoreClientOptions::default()).await?;

    let drivers = seed::seed_drivers(&mut store).await?;

    let test_user_email =
        env::var("TEST_USER_EMAIL").unwrap_or_else(|_| DEFAULT_TEST_USER_EMAIL.to_string());

    let rides = if test_user_email.is_empty() {
        println!("\nSkipping user rides (set TEST_USER_EMAIL to seed them)");
        0
    } else {
        let samples = seed::sample_rides(&test_user_email, Utc::now());
        seed::seed_ride_history(&mut store, &test_user_email, &samples).await?
    };

    println!("\nSeeding complete:");
    println!(
        "   drivers: {} processed",
        drivers.added + drivers.updated
    );
    if rides > 0 {
        println!("   rides:   {rides} added");
        println!("\nFor ride history testing, sign in as {test_user_email}");
        println!("or change TEST_USER_EMAIL to match your test user.");
    }

    Ok(())
}

fn resolve_credentials_or_exit() -> ServiceAccount {
    match credentials::resolve_service_account() {
        Ok((account, source)) => {
            println!("Using service account credential at {source}");
            account
        }
        Err(e) => {
            eprintln!("error: {e:?}");
            eprintln!("{}", credentials::REMEDIATION);
            process::exit(1);
        }
    }
}
