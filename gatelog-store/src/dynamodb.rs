use crate::driver::{LogStore, QueryPage, QueryPattern, StartKey};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use gatelog_core::config::StoreConfig;
use gatelog_core::error::GatelogError;
use gatelog_core::record::LogRecord;
use serde_dynamo::aws_sdk_dynamodb_1::{from_items, to_item};
use std::collections::HashMap;
use tracing::{debug, info};

/// BatchWriteItem accepts at most 25 items per call.
const WRITE_CHUNK: usize = 25;

/// DynamoDB driver for the log table.
///
/// Table key: partition `service_id`, sort `started_at`. The consumer access
/// pattern queries the secondary index named in [`StoreConfig`].
pub struct DynamoStore {
    client: Client,
    table: String,
    consumer_index: String,
}

impl DynamoStore {
    /// Connect using the shared AWS config, honoring an endpoint override
    /// for local stores.
    pub async fn connect(config: &StoreConfig) -> Result<Self, GatelogError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        info!(table = %config.table, region = %config.region, "Connected to DynamoDB");

        Ok(Self {
            client: Client::new(&shared),
            table: config.table.clone(),
            consumer_index: config.consumer_index.clone(),
        })
    }
}

#[async_trait]
impl LogStore for DynamoStore {
    async fn add_batch(&self, records: &[LogRecord]) -> Result<(), GatelogError> {
        for chunk in records.chunks(WRITE_CHUNK) {
            let mut requests = Vec::with_capacity(chunk.len());
            for record in chunk {
                let item: HashMap<String, AttributeValue> =
                    to_item(record).map_err(|e| GatelogError::StoreWrite(e.to_string()))?;
                let put = PutRequest::builder()
                    .set_item(Some(item))
                    .build()
                    .map_err(|e| GatelogError::StoreWrite(e.to_string()))?;
                requests.push(WriteRequest::builder().put_request(put).build());
            }

            self.client
                .batch_write_item()
                .request_items(self.table.clone(), requests)
                .send()
                .await
                .map_err(|e| GatelogError::StoreWrite(e.to_string()))?;

            debug!(count = chunk.len(), "Batch chunk written");
        }
        Ok(())
    }

    async fn query_page(
        &self,
        pattern: &QueryPattern,
        limit: usize,
        start_key: Option<&StartKey>,
    ) -> Result<QueryPage, GatelogError> {
        let mut query = self
            .client
            .query()
            .table_name(self.table.clone())
            .limit(page_limit(limit))
            .key_condition_expression("#k = :v")
            .expression_attribute_names("#k", pattern.key_field())
            .expression_attribute_values(":v", AttributeValue::S(pattern.key_value().to_string()));

        if pattern.uses_consumer_index() {
            query = query.index_name(self.consumer_index.clone());
        }
        if let Some(key) = start_key {
            query = query.set_exclusive_start_key(Some(start_key_attributes(key)));
        }

        let output = query
            .send()
            .await
            .map_err(|e| GatelogError::StoreQuery(e.to_string()))?;

        let has_more = output.last_evaluated_key().is_some();
        let records: Vec<LogRecord> = from_items(output.items.unwrap_or_default())
            .map_err(|e| GatelogError::StoreQuery(e.to_string()))?;

        Ok(QueryPage { records, has_more })
    }
}

/// The Query Limit parameter is an i32; clamp oversized page sizes instead
/// of letting the cast wrap.
fn page_limit(limit: usize) -> i32 {
    i32::try_from(limit).unwrap_or(i32::MAX)
}

/// Translate a resume key into DynamoDB's ExclusiveStartKey shape. Queries
/// against the secondary index must also carry the table key, which is why
/// the consumer-pattern cursor includes `service_id`.
fn start_key_attributes(key: &StartKey) -> HashMap<String, AttributeValue> {
    let mut attributes = HashMap::from([
        (
            "service_id".to_string(),
            AttributeValue::S(key.service_id.clone()),
        ),
        (
            "started_at".to_string(),
            AttributeValue::N(key.started_at.to_string()),
        ),
    ]);
    if let Some(consumer_id) = &key.consumer_id {
        attributes.insert(
            "consumer_id".to_string(),
            AttributeValue::S(consumer_id.clone()),
        );
    }
    attributes
}
