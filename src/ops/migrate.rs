//! One-time migration from the legacy `Drivers` collection to the unified
//! `users` + `drivers` schema, cross-referencing the identity directory by
//! email.

use crate::error::FirebaseError;
use crate::firestore::collection;
use crate::firestore::value::Fields;
use crate::models::collections::{DRIVERS, LEGACY_DRIVERS, USERS, USER_PROFILES};
use crate::models::{DriverDoc, LegacyDriver, UserDoc, UserProfile, UserType};
use crate::store::{DocumentStore, IdentityDirectory, StoredDocument};

use super::banner;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    pub migrated: usize,
    pub skipped: usize,
}

/// Migrates every legacy driver record into the unified schema.
///
/// For each record the driver's email (the legacy document ID) is resolved
/// against the identity directory. Records without an account are skipped
/// entirely: they cannot be linked to a login, and the driver has to register
/// through the app instead. For resolved records:
///
/// - `users/{uid}` is created with `userType: "driver"` if absent; an
///   existing document only gets its `userType` patched, so profile data
///   managed by the app is never overwritten.
/// - `drivers/{uid}` is overwritten with the mapped legacy fields and
///   defaulted activity fields. Note that this resets `rating`, `totalRides`
///   and `earnings` on every run, including re-runs over already-migrated
///   drivers.
///
/// A failure while migrating one record is printed and counted as skipped;
/// the rest of the batch still runs.
pub async fn migrate_drivers(
    store: &mut impl DocumentStore,
    directory: &mut impl IdentityDirectory,
) -> Result<MigrationSummary, FirebaseError> {
    banner("MIGRATING DRIVERS TO THE UNIFIED SCHEMA");

    let legacy_records = store.list(&collection(LEGACY_DRIVERS)).await?;

    let mut summary = MigrationSummary::default();

    for record in legacy_records {
        // The legacy collection is keyed by the driver's email.
        let email = record.id;
        println!("\nProcessing: {email}");

        match migrate_record(store, directory, &email, &record.fields).await {
            Ok(true) => summary.migrated += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                println!("   ! failed: {e:#}");
                summary.skipped += 1;
            }
        }
    }

    println!("\nMigration summary:");
    println!("   migrated: {}", summary.migrated);
    println!("   skipped:  {} (no auth account or error)", summary.skipped);

    Ok(summary)
}

async fn migrate_record(
    store: &mut impl DocumentStore,
    directory: &mut impl IdentityDirectory,
    email: &str,
    fields: &Fields,
) -> Result<bool, FirebaseError> {
    let Some(account) = directory.lookup_by_email(email).await? else {
        println!("   no auth account found for {email}");
        println!("   -> skipping (driver needs to register via app)");
        return Ok(false);
    };

    let uid = account.uid;
    println!("   found auth account: {uid}");

    let legacy = LegacyDriver::from_fields(email, fields);

    let user_ref = collection(USERS).doc(uid.as_str());
    if store.get(&user_ref).await?.is_none() {
        let user = UserDoc::driver(email, legacy.name.as_str());
        store.set(&user_ref, &user.to_fields()).await?;
        println!("   created users/{uid}");
    } else {
        // Only the discriminant changes; the app owns the rest.
        store
            .update(&user_ref, &Fields::new().with("userType", UserType::Driver))
            .await?;
        println!("   updated users/{uid} with userType: \"driver\"");
    }

    let driver = DriverDoc::from_legacy(&legacy);
    store
        .set(&collection(DRIVERS).doc(uid.as_str()), &driver.to_fields())
        .await?;
    println!("   created drivers/{uid}");
    println!("   -> car: {} ({})", driver.car_name, driver.car_type);

    Ok(true)
}

/// Creates a default `userProfiles` document for every regular (non-driver)
/// user that does not have one yet. Returns how many were created.
pub async fn create_user_profiles(
    store: &mut impl DocumentStore,
) -> Result<usize, FirebaseError> {
    banner("CREATING USER PROFILES FOR EXISTING USERS");

    let users = store.list(&collection(USERS)).await?;

    let mut created = 0;

    for user in users {
        if UserType::parse(user.fields.str("userType")) != UserType::User {
            continue;
        }

        let profile_ref = collection(USER_PROFILES).doc(user.id.as_str());
        if store.get(&profile_ref).await?.is_some() {
            continue;
        }

        store
            .set(&profile_ref, &UserProfile::default().to_fields())
            .await?;
        println!("   created userProfiles/{}", user.id);
        created += 1;
    }

    println!("\nCreated {created} user profile(s)");

    Ok(created)
}

/// Read-only post-migration check: document counts for every affected
/// collection plus one sample from the new ones.
#[derive(Debug, Default)]
pub struct VerificationReport {
    pub counts: Vec<(String, u64)>,
    pub sample_user: Option<StoredDocument>,
    pub sample_driver: Option<StoredDocument>,
}

pub async fn verify_migration(
    store: &mut impl DocumentStore,
) -> Result<VerificationReport, FirebaseError> {
    banner("VERIFYING MIGRATION");

    let mut report = VerificationReport::default();

    println!("\nCollection counts:");
    for name in [USERS, DRIVERS, USER_PROFILES, LEGACY_DRIVERS] {
        let count = store.count(&collection(name)).await?;
        println!("   {name}: {count}");
        report.counts.push((name.to_string(), count));
    }

    report.sample_user = store.list(&collection(USERS)).await?.into_iter().next();
    if let Some(user) = &report.sample_user {
        println!("\nSample users/{}:", user.id);
        println!("   userType: {}", user.fields.str("userType").unwrap_or("-"));
        println!("   email:    {}", user.fields.str("email").unwrap_or("-"));
    }

    report.sample_driver = store.list(&collection(DRIVERS)).await?.into_iter().next();
    if let Some(driver) = &report.sample_driver {
        println!("\nSample drivers/{}:", driver.id);
        println!(
            "   carName:      {}",
            driver.fields.str("carName").unwrap_or("-")
        );
        println!(
            "   driverStatus: {}",
            driver.fields.str("driverStatus").unwrap_or("-")
        );
    }

    println!("\nMigration verification complete");

    Ok(report)
}
