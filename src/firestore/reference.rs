/// Shorthand for [`CollectionRef::new`].
pub fn collection(name: impl Into<String>) -> CollectionRef {
    CollectionRef::new(name)
}

/// A root-level Firestore collection. Every collection the admin tools touch
/// lives at the root of the database, including the per-user ride history
/// collections that are named by an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef(String);

/// A document within a root-level collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    collection: CollectionRef,
    id: String,
}

impl CollectionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn doc(&self, id: impl Into<String>) -> DocRef {
        DocRef {
            collection: self.clone(),
            id: id.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl DocRef {
    pub fn collection(&self) -> &CollectionRef {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for DocRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
