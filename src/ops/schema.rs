//! Read-only schema inspection: what exists in the database today, whether
//! the unified collections are in place, and what a migration run would do.
//! Nothing in this module writes.

use crate::error::FirebaseError;
use crate::firestore::collection;
use crate::models::collections::{
    DRIVERS, LEGACY_DRIVERS, RIDE_HISTORY, RIDE_REQUESTS, USERS, USER_PROFILES,
};
use crate::models::LegacyDriver;
use crate::store::DocumentStore;

use super::banner;

/// The collections of the unified schema with their purpose.
pub const UNIFIED_COLLECTIONS: &[(&str, &str)] = &[
    (USERS, "Central user registry"),
    (DRIVERS, "Driver-specific data"),
    (USER_PROFILES, "User-specific data"),
    (RIDE_REQUESTS, "Active ride requests"),
    (RIDE_HISTORY, "Completed rides"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStatus {
    pub name: String,
    pub count: u64,
}

/// Every root collection in the database with its document count.
pub async fn inventory_collections(
    store: &mut impl DocumentStore,
) -> Result<Vec<CollectionStatus>, FirebaseError> {
    banner("CURRENT FIRESTORE COLLECTIONS");

    let names = store.root_collections().await?;
    println!("\nFound {} collection(s):", names.len());

    let mut inventory = Vec::new();
    for name in names {
        let count = store.count(&collection(name.as_str())).await?;
        println!("   - {name}: {count} document(s)");
        inventory.push(CollectionStatus { name, count });
    }

    Ok(inventory)
}

/// Checks whether the unified-schema collections exist yet. Firestore
/// collections spring into existence on first write, so an empty one is
/// reported as pending rather than as an error.
pub async fn check_schema_readiness(
    store: &mut impl DocumentStore,
) -> Result<Vec<CollectionStatus>, FirebaseError> {
    banner("CHECKING UNIFIED SCHEMA READINESS");

    let mut statuses = Vec::new();

    for (name, description) in UNIFIED_COLLECTIONS {
        let count = store.count(&collection(*name)).await?;
        if count > 0 {
            println!("   ok      {name}: {count} document(s) - {description}");
        } else {
            println!("   pending {name}: empty (created on first use) - {description}");
        }
        statuses.push(CollectionStatus {
            name: name.to_string(),
            count,
        });
    }

    Ok(statuses)
}

#[derive(Debug, Default)]
pub struct MigrationPlan {
    /// The legacy drivers a migration run would process.
    pub legacy_drivers: Vec<LegacyDriver>,
    /// Per-user ride history collections (named by email) that stay in place.
    pub ride_history: Vec<CollectionStatus>,
}

/// What a migration run would do, without doing any of it.
pub async fn migration_plan(
    store: &mut impl DocumentStore,
) -> Result<MigrationPlan, FirebaseError> {
    banner("MIGRATION PLAN");

    let mut plan = MigrationPlan::default();

    for record in store.list(&collection(LEGACY_DRIVERS)).await? {
        plan.legacy_drivers
            .push(LegacyDriver::from_fields(record.id, &record.fields));
    }

    println!("\nDrivers to migrate: {}", plan.legacy_drivers.len());
    for driver in &plan.legacy_drivers {
        println!("   - {}", driver.email);
        println!("     name: {}", driver.name);
        println!("     car:  {} ({})", driver.car_name, driver.car_type);
    }

    // Per-user ride history collections are the root collections named by an
    // email address.
    let user_collections: Vec<String> = store
        .root_collections()
        .await?
        .into_iter()
        .filter(|name| name.contains('@'))
        .collect();

    println!(
        "\nUser ride history collections: {}",
        user_collections.len()
    );
    for name in user_collections {
        let count = store.count(&collection(name.as_str())).await?;
        println!("   - {name}: {count} ride(s)");
        plan.ride_history.push(CollectionStatus { name, count });
    }

    println!("\nA migration run will:");
    println!("   1. Create the 'users' collection with a userType field");
    println!(
        "   2. Migrate {} driver(s) to the new 'drivers' collection",
        plan.legacy_drivers.len()
    );
    println!("   3. Keep the old 'Drivers' collection (backward compatibility)");
    println!("   4. Create 'userProfiles' for regular users");
    println!("   5. Preserve all ride history data");

    Ok(plan)
}
