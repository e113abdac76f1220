//! The seams between the administrative procedures and the external services
//! they drive. The procedures only see these traits, so everything in
//! [`crate::ops`] runs against the in-memory stand-ins from
//! [`crate::testing`] as well as against the real clients.

use async_trait::async_trait;

use crate::auth::{AuthUser, FirebaseAuthClient};
use crate::error::FirebaseError;
use crate::firestore::client::FirestoreClient;
use crate::firestore::{CollectionRef, DocRef};
use crate::firestore::value::Fields;

/// A document together with its ID within its collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

/// The document database: named collections of keyed field maps.
#[async_trait]
pub trait DocumentStore {
    /// Point read. `None` when the document does not exist.
    async fn get(&mut self, doc_ref: &DocRef) -> Result<Option<Fields>, FirebaseError>;

    /// Create-or-overwrite upsert of a whole document.
    async fn set(&mut self, doc_ref: &DocRef, fields: &Fields) -> Result<(), FirebaseError>;

    /// Patches exactly the supplied fields of an existing document; fails
    /// with [`FirebaseError::DocumentNotfound`] when it does not exist.
    async fn update(&mut self, doc_ref: &DocRef, fields: &Fields) -> Result<(), FirebaseError>;

    /// Creates a document with a store-generated ID, returning the ID.
    async fn add(
        &mut self,
        collection_ref: &CollectionRef,
        fields: &Fields,
    ) -> Result<String, FirebaseError>;

    /// Deletes a document; deleting a missing document is not an error.
    async fn delete(&mut self, doc_ref: &DocRef) -> Result<(), FirebaseError>;

    /// Every document in the collection.
    async fn list(
        &mut self,
        collection_ref: &CollectionRef,
    ) -> Result<Vec<StoredDocument>, FirebaseError>;

    /// Number of documents in the collection.
    async fn count(&mut self, collection_ref: &CollectionRef) -> Result<u64, FirebaseError>;

    /// The names of every root-level collection.
    async fn root_collections(&mut self) -> Result<Vec<String>, FirebaseError>;
}

/// The authentication directory mapping login emails to account IDs.
#[async_trait]
pub trait IdentityDirectory {
    /// `None` when no account is registered for the email address.
    async fn lookup_by_email(&mut self, email: &str) -> Result<Option<AuthUser>, FirebaseError>;
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get(&mut self, doc_ref: &DocRef) -> Result<Option<Fields>, FirebaseError> {
        self.get_document(doc_ref).await
    }

    async fn set(&mut self, doc_ref: &DocRef, fields: &Fields) -> Result<(), FirebaseError> {
        self.set_document(doc_ref, fields).await
    }

    async fn update(&mut self, doc_ref: &DocRef, fields: &Fields) -> Result<(), FirebaseError> {
        self.update_document(doc_ref, fields).await
    }

    async fn add(
        &mut self,
        collection_ref: &CollectionRef,
        fields: &Fields,
    ) -> Result<String, FirebaseError> {
        self.create_document(collection_ref, fields).await
    }

    async fn delete(&mut self, doc_ref: &DocRef) -> Result<(), FirebaseError> {
        self.delete_document(doc_ref).await
    }

    async fn list(
        &mut self,
        collection_ref: &CollectionRef,
    ) -> Result<Vec<StoredDocument>, FirebaseError> {
        self.list_documents(collection_ref).await
    }

    async fn count(&mut self, collection_ref: &CollectionRef) -> Result<u64, FirebaseError> {
        self.count_documents(collection_ref).await
    }

    async fn root_collections(&mut self) -> Result<Vec<String>, FirebaseError> {
        self.list_root_collections().await
    }
}

#[async_trait]
impl IdentityDirectory for FirebaseAuthClient {
    async fn lookup_by_email(&mut self, email: &str) -> Result<Option<AuthUser>, FirebaseError> {
        self.lookup_user_by_email(email).await
    }
}
