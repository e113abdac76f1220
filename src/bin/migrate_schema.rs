//! Migrates the database to the unified schema: legacy `Drivers` records
//! become `users` + `drivers` documents (linked through Firebase Auth by
//! email), and regular users get a `userProfiles` document. Asks for an
//! explicit "yes" before touching anything.

use std::io;
use std::process;

use trips_admin::credentials::{self, ServiceAccount};
use trips_admin::error::FirebaseError;
use trips_admin::auth::FirebaseAuthClient;
use trips_admin::firestore::client::{FirestoreClient, FirestoreClientOptions};
use trips_admin::ops::{banner, confirm, migrate};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    banner("TRIPS UNIFIED APP - FIREBASE MIGRATION");
    println!("\nThis migrates from the old schema to the new unified schema:");
    println!("   - 'Drivers' collection -> 'drivers' + 'users'");
    println!("   - creates the 'users' collection with a userType field");
    println!("   - creates 'userProfiles' for regular users");
    println!("\nWARNING: this will modify the Firebase database.");

    let proceed = confirm::confirm(
        "\nProceed with migration? (yes/no): ",
        &mut io::stdin().lock(),
    )
    .unwrap_or(false);

    if !proceed {
        println!("Migration cancelled");
        return;
    }

    let service_account = resolve_credentials_or_exit();
    let project_id = service_account.project_id.clone();

    if let Err(e) = run(service_account, &project_id).await {
        eprintln!("error: {e:?}");
        process::exit(1);
    }
}

async fn run(service_account: ServiceAccount, project_id: &str) -> Result<(), FirebaseError> {
    let mut directory = FirebaseAuthClient::new(service_account.clone())?;
    let mut store =
        FirestoreClient::initialise(service_account, FirestoreClientOptions::default()).await?;

    println!("\nStep 1: migrating drivers...");
    let summary = migrate::migrate_drivers(&mut store, &mut directory).await?;

    println!("\nStep 2: creating user profiles...");
    let profiles_created = migrate::create_user_profiles(&mut store).await?;

    println!("\nStep 3: verifying migration...");
    migrate::verify_migration(&mut store).await?;

    banner("MIGRATION COMPLETE");
    println!("\nSummary:");
    println!("   drivers migrated:      {}", summary.migrated);
    println!("   drivers skipped:       {}", summary.skipped);
    println!("   user profiles created: {profiles_created}");
    println!("\nNext steps:");
    println!("   1. Verify the data in the Firebase console");
    println!("   2. Test the app with existing accounts");
    println!("   3. Register new test users and drivers");
    println!("\nFirebase console:");
    println!("   https://console.firebase.google.com/project/{project_id}/firestore");

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
