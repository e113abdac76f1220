use std::fmt::Display;

use anyhow::{anyhow, Context};
use firestore_grpc::tonic;
use firestore_grpc::tonic::{
    codegen::InterceptedService, metadata::MetadataValue, transport::Channel, Request, Status,
};
use firestore_grpc::v1::document_transform::field_transform::{ServerValue, TransformType};
use firestore_grpc::v1::document_transform::FieldTransform;
use firestore_grpc::v1::firestore_client::FirestoreClient as GrpcFirestoreClient;
use firestore_grpc::v1::precondition::ConditionType;
use firestore_grpc::v1::run_query_request::QueryType;
use firestore_grpc::v1::structured_aggregation_query::aggregation;
use firestore_grpc::v1::structured_query::CollectionSelector;
use firestore_grpc::v1::value::ValueType;
use firestore_grpc::v1::write::Operation;
use firestore_grpc::v1::{
    run_aggregation_query_request, structured_aggregation_query, CommitRequest,
    CreateDocumentRequest, DeleteDocumentRequest, Document, DocumentMask, GetDocumentRequest,
    ListCollectionIdsRequest, Precondition, RunAggregationQueryRequest, RunQueryRequest,
    StructuredAggregationQuery, StructuredQuery, Write,
};
use futures::StreamExt;

use crate::credentials::ServiceAccount;
use crate::error::FirebaseError;
use crate::store::StoredDocument;

use super::reference::{CollectionRef, DocRef};
use super::token_provider::FirestoreTokenProvider;
use super::value::{from_grpc_fields, split_for_write, Fields};

#[derive(Clone)]
pub struct FirestoreClientOptions {
    pub host_url: String,
}

impl Default for FirestoreClientOptions {
    fn default() -> Self {
        Self {
            host_url: "https://firestore.googleapis.com".to_string(),
        }
    }
}

impl FirestoreClientOptions {
    /// Point the client somewhere else, e.g. a local emulator.
    pub fn host_url(mut self, host_url: impl Into<String>) -> Self {
        self.host_url = host_url.into();
        self
    }
}

type InterceptorFunction = Box<dyn FnMut(Request<()>) -> Result<Request<()>, Status> + Send>;

/// Client for the document store backing the application: a thin wrapper
/// around the Firestore v1 gRPC API carrying exactly the operations the admin
/// tools need.
pub struct FirestoreClient {
    client: GrpcFirestoreClient<InterceptedService<Channel, InterceptorFunction>>,
    root_resource_path: String,
    database_path: String,
}

fn create_auth_interceptor(mut token_provider: FirestoreTokenProvider) -> InterceptorFunction {
    Box::new(move |mut req: Request<()>| {
        let token = token_provider
            .get_token()
            .map_err(|_| Status::unauthenticated("Could not get token from token provider"))?;

        let bearer_token = format!("Bearer {token}");
        let mut header_value = MetadataValue::from_str(&bearer_token).map_err(|_| {
            Status::unauthenticated("Failed to construct metadata value for authorization token")
        })?;
        header_value.set_sensitive(true);

        req.metadata_mut().insert("authorization", header_value);

        Ok(req)
    })
}

impl FirestoreClient {
    /// Initialise a new client that can be used to interact with the
    /// project's Firestore database.
    pub async fn initialise(
        service_account: ServiceAccount,
        options: FirestoreClientOptions,
    ) -> Result<Self, FirebaseError> {
        let channel = Channel::from_shared(options.host_url.clone())
            .context("Failed to create gRPC channel")?
            .connect()
            .await
            .context("Failed to create channel to endpoint")?;

        let project_id = service_account.project_id.clone();
        let token_provider = FirestoreTokenProvider::new(service_account);

        let client = GrpcFirestoreClient::with_interceptor(
            channel,
            create_auth_interceptor(token_provider),
        );

        let database_path = format!("projects/{project_id}/databases/(default)");
        let root_resource_path = format!("{database_path}/documents");

        Ok(Self {
            client,
            root_resource_path,
            database_path,
        })
    }

    /// Retrieve the fields of the document at the given reference, or `None`
    /// if it does not exist.
    pub async fn get_document(
        &mut self,
        doc_ref: &DocRef,
    ) -> Result<Option<Fields>, FirebaseError> {
        let request = GetDocumentRequest {
            name: self.resource_name(doc_ref),
            ..Default::default()
        };

        let res = self.client.get_document(request).await;

        match res {
            Ok(res) => Ok(Some(from_grpc_fields(res.into_inner().fields))),
            Err(err) if err.code() == tonic::Code::NotFound => Ok(None),
            Err(err) => Err(anyhow!(err).into()),
        }
    }

    /// Sets the document at the given reference, creating it if necessary and
    /// overwriting it completely if it already exists. Server-timestamp
    /// sentinel fields are applied as transforms on the same write.
    pub async fn set_document(
        &mut self,
        doc_ref: &DocRef,
        fields: &Fields,
    ) -> Result<(), FirebaseError> {
        self.commit_write(doc_ref, fields, false).await
    }

    /// Patches exactly the supplied fields of an existing document, leaving
    /// every other field untouched. Returns a
    /// [`DocumentNotfound`](FirebaseError::DocumentNotfound) error when the
    /// document does not exist.
    pub async fn update_document(
        &mut self,
        doc_ref: &DocRef,
        fields: &Fields,
    ) -> Result<(), FirebaseError> {
        self.commit_write(doc_ref, fields, true).await
    }

    async fn commit_write(
        &mut self,
        doc_ref: &DocRef,
        fields: &Fields,
        patch_only: bool,
    ) -> Result<(), FirebaseError> {
        let (values, server_timestamp_fields) = split_for_write(fields)?;

        // With an update mask, only the masked fields are written and the
        // rest of an existing document is left alone; without one, the
        // document is replaced wholesale. Transform fields must not appear in
        // the mask, which is why it is derived after the sentinel split.
        let update_mask = patch_only.then(|| DocumentMask {
            field_paths: values.keys().map(|key| mask_field_path(key)).collect(),
        });

        let update_transforms = server_timestamp_fields
            .into_iter()
            .map(|field_path| FieldTransform {
                field_path,
                transform_type: Some(TransformType::SetToServerValue(
                    ServerValue::RequestTime as i32,
                )),
            })
            .collect();

        let write = Write {
            update_mask,
            update_transforms,
            current_document: patch_only.then(document_exists_precondition).flatten(),
            operation: Some(Operation::Update(Document {
                name: self.resource_name(doc_ref),
                fields: values,
                ..Default::default()
            })),
            ..Default::default()
        };

        let request = CommitRequest {
            database: self.database_path.clone(),
            writes: vec![write],
            ..Default::default()
        };

        self.client
            .commit(request)
            .await
            .map_err(not_found_err())?;

        Ok(())
    }

    /// Creates a document in the given collection, letting Firestore generate
    /// the document ID. Returns the generated ID.
    pub async fn create_document(
        &mut self,
        collection_ref: &CollectionRef,
        fields: &Fields,
    ) -> Result<String, FirebaseError> {
        let (values, server_timestamp_fields) = split_for_write(fields)?;
        if !server_timestamp_fields.is_empty() {
            return Err(anyhow!(
                "server timestamps are not supported when creating documents with generated IDs"
            )
            .into());
        }

        let request = CreateDocumentRequest {
            parent: self.root_resource_path.clone(),
            collection_id: collection_ref.name().to_string(),
            // An empty document ID makes Firestore generate one.
            document_id: String::new(),
            document: Some(Document {
                fields: values,
                ..Default::default()
            }),
            mask: Some(DocumentMask {
                field_paths: vec![],
            }),
        };

        let res = self
            .client
            .create_document(request)
            .await
            .map_err(|err| anyhow!(err))?;

        let created_doc = res.into_inner();
        let created_doc_id = document_id_from_resource_name(&created_doc.name)
            .context("Could not get document ID from resource path")?;

        Ok(created_doc_id)
    }

    /// Deletes the document at the given reference. Whether the document
    /// exists or not makes no difference.
    pub async fn delete_document(&mut self, doc_ref: &DocRef) -> Result<(), FirebaseError> {
        let request = DeleteDocumentRequest {
            name: self.resource_name(doc_ref),
            ..Default::default()
        };

        self.client
            .delete_document(request)
            .await
            .context("Failed to delete document")?;

        Ok(())
    }

    /// Fetches every document in the given collection. Documents without
    /// fields ("missing documents" in Firestore terms) are skipped.
    pub async fn list_documents(
        &mut self,
        collection_ref: &CollectionRef,
    ) -> Result<Vec<StoredDocument>, FirebaseError> {
        let request = RunQueryRequest {
            parent: self.root_resource_path.clone(),
            query_type: Some(QueryType::StructuredQuery(structured_query_for(
                collection_ref,
            ))),
            ..Default::default()
        };

        let res = self
            .client
            .run_query(request)
            .await
            .context("Failed to run query")?;

        let mut stream = res.into_inner();
        let mut documents = Vec::new();

        while let Some(message) = stream.next().await {
            let message = message.map_err(|e| anyhow!(e))?;

            // Some stream items only report query progress and carry no
            // document.
            let Some(doc) = message.document else {
                continue;
            };

            let id = document_id_from_resource_name(&doc.name)
                .context("Could not get document ID from resource path")?;
            documents.push(StoredDocument {
                id,
                fields: from_grpc_fields(doc.fields),
            });
        }

        Ok(documents)
    }

    /// Counts the documents in the given collection. The counting is done
    /// server-side by Firestore, so this is far cheaper than fetching the
    /// collection and counting locally.
    pub async fn count_documents(
        &mut self,
        collection_ref: &CollectionRef,
    ) -> Result<u64, FirebaseError> {
        let request = RunAggregationQueryRequest {
            parent: self.root_resource_path.clone(),
            query_type: Some(
                run_aggregation_query_request::QueryType::StructuredAggregationQuery(
                    StructuredAggregationQuery {
                        query_type: Some(structured_aggregation_query::QueryType::StructuredQuery(
                            structured_query_for(collection_ref),
                        )),
                        aggregations: vec![structured_aggregation_query::Aggregation {
                            alias: "doc_count".to_string(),
                            operator: Some(aggregation::Operator::Count(aggregation::Count {
                                up_to: None,
                            })),
                        }],
                    },
                ),
            ),
            ..Default::default()
        };

        let res = self
            .client
            .run_aggregation_query(request)
            .await
            .context("Failed to run count aggregation query")?;

        let mut stream = res.into_inner();

        while let Some(message) = stream.next().await {
            let message = message.map_err(|e| anyhow!(e))?;

            let Some(result) = message.result else {
                continue;
            };

            let doc_count_value = result
                .aggregate_fields
                .get("doc_count")
                .context("Failed to get count from response")?;

            return match doc_count_value.value_type {
                Some(ValueType::IntegerValue(doc_count)) if doc_count >= 0 => Ok(doc_count as u64),
                ref v => Err(anyhow!("Unexpected value type for count: {v:?}").into()),
            };
        }

        Err(anyhow!("No count returned from aggregation query").into())
    }

    /// Lists the IDs of every root-level collection in the database.
    pub async fn list_root_collections(&mut self) -> Result<Vec<String>, FirebaseError> {
        let mut collection_ids = Vec::new();
        let mut page_token = String::new();

        loop {
            let request = ListCollectionIdsRequest {
                parent: self.root_resource_path.clone(),
                page_token: page_token.clone(),
                ..Default::default()
            };

            let res = self
                .client
                .list_collection_ids(request)
                .await
                .context("Failed to list collection IDs")?
                .into_inner();

            collection_ids.extend(res.collection_ids);

            if res.next_page_token.is_empty() {
                break;
            }
            page_token = res.next_page_token;
        }

        Ok(collection_ids)
    }

    fn resource_name(&self, item: impl Display) -> String {
        format!("{}/{}", self.root_resource_path, item)
    }
}

fn structured_query_for(collection_ref: &CollectionRef) -> StructuredQuery {
    StructuredQuery {
        from: vec![CollectionSelector {
            collection_id: collection_ref.name().to_string(),
            all_descendants: false,
        }],
        ..Default::default()
    }
}

/// Field paths in an update mask must be backtick-quoted unless they are
/// simple identifiers. The legacy collection has field names with spaces
/// ("Car Name"), so patches against it need the quoting.
fn mask_field_path(field: &str) -> String {
    let is_simple = !field.is_empty()
        && !field.starts_with(|c: char| c.is_ascii_digit())
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if is_simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn document_id_from_resource_name(name: &str) -> Option<String> {
    name.rsplit_once('/').map(|(_, id)| id.to_string())
}

fn document_exists_precondition() -> Option<Precondition> {
    Some(Precondition {
        condition_type: Some(ConditionType::Exists(true)),
    })
}

fn not_found_err() -> fn(Status) -> FirebaseError {
    |err| {
        if err.code() == tonic::Code::NotFound {
            FirebaseError::DocumentNotfound(err.message().to_string())
        } else {
            anyhow!(err).into()
        }
    }
}
