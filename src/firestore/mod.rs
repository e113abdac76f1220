//! # Firestore
//!
//! A thin client for the Firestore v1 gRPC API, carrying the handful of
//! operations the admin tools need: point reads and writes, field patches,
//! collection listing and server-side counts.
//!
//! ## Initializing the client
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() {
//! use trips_admin::{
//!     credentials::ServiceAccount,
//!     firestore::client::{FirestoreClient, FirestoreClientOptions},
//! };
//!
//! // Load the service account, which specifies which project we will connect
//! // to and the secret keys used for authentication.
//! let service_account = ServiceAccount::from_file("./serviceAccountKey.json").unwrap();
//!
//! // Configure the client - we just want the default.
//! let client_options = FirestoreClientOptions::default();
//!
//! // Finally, create a client for Firestore.
//! let mut client = FirestoreClient::initialise(service_account, client_options)
//!     .await
//!     .unwrap();
//! # }
//! ```
//!
//! ## Reading and writing documents
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # use trips_admin::credentials::ServiceAccount;
//! # use trips_admin::firestore::client::{FirestoreClient, FirestoreClientOptions};
//! # let service_account = ServiceAccount::from_file("./serviceAccountKey.json")?;
//! # let mut client =
//! #     FirestoreClient::initialise(service_account, FirestoreClientOptions::default()).await?;
//! use trips_admin::firestore::{collection, value::Fields};
//!
//! let doc_ref = collection("users").doc("some-user-id");
//!
//! client
//!     .set_document(&doc_ref, &Fields::new().with("name", "Ada").with("isActive", true))
//!     .await?;
//!
//! let doc = client.get_document(&doc_ref).await?;
//! assert_eq!(doc.unwrap().str("name"), Some("Ada"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod reference;
mod token_provider;
pub mod value;

pub use reference::{collection, CollectionRef, DocRef};
