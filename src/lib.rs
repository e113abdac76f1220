//! # trips-admin
//!
//! Administrative tooling for the Trips ride-hailing backend: four small
//! binaries that seed and migrate the Firestore database behind the app.
//!
//! - `add_drivers` seeds the sample drivers into the legacy collection
//! - `seed_data` seeds the drivers plus a test user's ride history
//! - `check_schema` reports (read-only) on the state of the unified schema
//! - `migrate_schema` migrates the legacy driver records into the unified
//!   `users` + `drivers` schema, after an explicit confirmation
//!
//! The library half is the plumbing those binaries share: a [`firestore`]
//! client speaking the Firestore v1 gRPC API, an [`auth`] client for looking
//! up accounts in Firebase Auth, [`credentials`] resolution for the service
//! account, the document [`models`], and the [`ops`] procedures themselves.
//! The procedures run against the [`store`] traits, so the [`testing`]
//! stand-ins can drive them in tests without a network.

pub mod auth;
pub mod credentials;
pub mod error;
pub mod firestore;
pub mod models;
pub mod ops;
pub mod store;
pub mod testing;

pub use credentials::ServiceAccount;
pub use error::FirebaseError;
