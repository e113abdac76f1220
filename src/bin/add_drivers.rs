//! Adds the four sample drivers to the legacy `Drivers` collection. Safe to
//! run repeatedly: existing drivers are updated, not duplicated.

use std::process;

use trips_admin::credentials::{self, ServiceAccount};
use trips_admin::error::FirebaseError;
use trips_admin::firestore::client::{FirestoreClient, FirestoreClientOptions};
use trips_admin::ops::seed;

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

    let summary = seed::seed_drivers(&mut store).await?;

    println!(
        "\nDone. {} driver(s) processed.",
        summary.added + summary.updated
    );
    println!("Tip: check the Firebase console to verify the documents.");

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
