//! Read-only pre-migration report: which collections exist, whether the
//! unified schema is in place, and what `migrate_schema` would do. Performs
//! no writes.

use std::process;

use trips_admin::credentials::{self, ServiceAccount};
use trips_admin::error::FirebaseError;
use trips_admin::firestore::client::{FirestoreClient, FirestoreClientOptions};
use trips_admin::ops::{banner, schema};

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

    schema::inventory_collections(&mut store).await?;
    schema::check_schema_readiness(&mut store).await?;
    schema::migration_plan(&mut store).await?;

    banner("SCHEMA VERIFICATION COMPLETE");
    println!("\nTo run the actual migration:");
    println!("   cargo run --bin migrate_schema");
    println!("\nNotes:");
    println!("   - New accounts create their documents automatically");
    println!("   - The migration is only needed for existing users and drivers");

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
