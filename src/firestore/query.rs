use super::models::{
    CollectionSelector, CompositeFilter, CompositeOperator, FieldFilter, FieldOperator,
    FieldReference, QueryFilter, RunQueryRequest, RunQueryResponse, StructuredQuery,
};
use super::reference::convert_serde_value_to_firestore_value;
use super::snapshot::{DocumentSnapshot, QuerySnapshot};
use super::FirestoreError;
use crate::core::parse_error_response;
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;

/// A query over a single collection, built independently of any client.
#[derive(Clone, Debug)]
pub struct Query {
    pub(crate) query: StructuredQuery,
}

impl Query {
    /// Creates a new `Query` targeting the specified collection.
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: collection_id.into(),
                }],
                where_clause: None,
                limit: None,
            },
        }
    }

    /// Adds a field filter. Multiple filters are combined with AND.
    pub fn where_filter<T: Serialize>(
        mut self,
        field: &str,
        op: FieldOperator,
        value: T,
    ) -> Result<Self, FirestoreError> {
        let serde_value = serde_json::to_value(value)?;
        let filter = QueryFilter::FieldFilter(FieldFilter {
            field: FieldReference {
                field_path: field.to_string(),
            },
            op,
            value: convert_serde_value_to_firestore_value(serde_value)?,
        });

        self.query.where_clause = Some(match self.query.where_clause.take() {
            None => filter,
            Some(QueryFilter::CompositeFilter(mut composite)) => {
                composite.filters.push(filter);
                QueryFilter::CompositeFilter(composite)
            }
            Some(existing) => QueryFilter::CompositeFilter(CompositeFilter {
                op: CompositeOperator::And,
                filters: vec![existing, filter],
            }),
        });

        Ok(self)
    }

    /// Limits the number of documents returned.
    pub fn limit(mut self, limit: i32) -> Self {
        self.query.limit = Some(limit);
        self
    }
}

/// A `Query` attached to a Firestore client, ready for execution.
#[derive(Clone)]
pub struct ExecutableQuery<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) parent_path: String,
    pub(crate) query: Query,
}

impl<'a> ExecutableQuery<'a> {
    pub(crate) fn new(client: &'a ClientWithMiddleware, parent_path: String, query: Query) -> Self {
        Self {
            client,
            parent_path,
            query,
        }
    }

    /// Executes the query and returns the results as a `QuerySnapshot`.
    pub async fn get(&self) -> Result<QuerySnapshot, FirestoreError> {
        let url = format!("{}:runQuery", self.parent_path);

        let request = RunQueryRequest {
            structured_query: self.query.query.clone(),
        };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Run query failed").await,
            ));
        }

        let responses: Vec<RunQueryResponse> = response.json().await?;

        let mut documents = Vec::new();
        let mut read_time = None;

        for res in responses {
            if let Some(rt) = res.read_time {
                read_time = Some(rt);
            }

            if let Some(doc) = res.document {
                documents.push(DocumentSnapshot::from(doc));
            }
        }

        Ok(QuerySnapshot {
            documents,
            read_time,
        })
    }
}
