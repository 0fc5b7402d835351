use crate::error::GatelogError;
use serde::{Deserialize, Serialize};

/// Column order for record exports. Kept as an explicit list (paired with
/// [`LogRecord::to_row`]) rather than derived from serde metadata at runtime.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "request",
    "upstream_uri",
    "response",
    "authenticated_entity",
    "route",
    "service",
    "latencies",
    "client_ip",
    "started_at",
    "service_id",
    "consumer_id",
];

/// One normalized API-gateway access-log record.
///
/// `service_id` and `consumer_id` are denormalized copies of the nested
/// descriptors, populated by [`decode_line`] so the record can be keyed by
/// the store (partition: `service_id`, sort: `started_at`; secondary index:
/// `consumer_id`). A record with an empty `service_id` is storable but not
/// reachable through the by-service access pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRecord {
    pub request: Request,
    pub upstream_uri: String,
    pub response: Response,
    pub authenticated_entity: AuthenticatedEntity,
    pub route: Route,
    pub service: Service,
    pub latencies: Latencies,
    pub client_ip: String,
    pub started_at: i64,
    pub service_id: String,
    pub consumer_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub method: String,
    pub uri: String,
    pub url: String,
    pub size: u64,
    pub headers: RequestHeaders,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestHeaders {
    pub accept: String,
    pub host: String,
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub status: u16,
    pub size: u64,
    pub headers: ResponseHeaders,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseHeaders {
    #[serde(rename = "Content-Length")]
    pub content_length: String,
    pub via: String,
    #[serde(rename = "Connection")]
    pub connection: String,
    #[serde(rename = "access-control-allow-credentials")]
    pub access_control_allow_credentials: String,
    #[serde(rename = "Content-Type")]
    pub content_type: String,
    pub server: String,
    #[serde(rename = "access-control-allow-origin")]
    pub access_control_allow_origin: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticatedEntity {
    pub consumer_id: ConsumerRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerRef {
    pub uuid: String,
}

/// Gateway route descriptor. `hosts` is schemaless upstream — gateways emit
/// either a string, a list, or null here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub created_at: i64,
    pub hosts: serde_json::Value,
    pub id: String,
    pub methods: Vec<String>,
    pub paths: Vec<String>,
    pub preserve_host: bool,
    pub protocols: Vec<String>,
    pub regex_priority: i64,
    pub service: ServiceRef,
    pub strip_path: bool,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub connect_timeout: i64,
    pub created_at: i64,
    pub host: String,
    pub id: String,
    pub name: String,
    pub path: String,
    pub port: u32,
    pub protocol: String,
    pub read_timeout: i64,
    pub retries: i64,
    pub updated_at: i64,
    pub write_timeout: i64,
}

/// Latency triple in milliseconds, all non-negative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Latencies {
    pub proxy: u64,
    pub gateway: u64,
    pub request: u64,
}

/// Decode one raw JSON log line into a normalized record.
///
/// Unknown fields are ignored; missing fields take zero values, so partially
/// populated nested objects never error. Pure — no side effects.
pub fn decode_line(line: &str) -> Result<LogRecord, GatelogError> {
    let mut record: LogRecord = serde_json::from_str(line)?;
    record.service_id = record.service.id.clone();
    record.consumer_id = record.authenticated_entity.consumer_id.uuid.clone();
    Ok(record)
}

impl LogRecord {
    /// Render this record as one CSV row matching [`EXPORT_COLUMNS`].
    ///
    /// Structured sub-objects become compact JSON text in a single field;
    /// scalars are rendered as plain text.
    pub fn to_row(&self) -> Result<Vec<String>, GatelogError> {
        let mut started_at = itoa::Buffer::new();
        Ok(vec![
            to_json_field(&self.request)?,
            self.upstream_uri.clone(),
            to_json_field(&self.response)?,
            to_json_field(&self.authenticated_entity)?,
            to_json_field(&self.route)?,
            to_json_field(&self.service)?,
            to_json_field(&self.latencies)?,
            self.client_ip.clone(),
            started_at.format(self.started_at).to_string(),
            self.service_id.clone(),
            self.consumer_id.clone(),
        ])
    }
}

fn to_json_field<T: Serialize>(value: &T) -> Result<String, GatelogError> {
    serde_json::to_string(value).map_err(|e| GatelogError::Output(e.to_string()))
}
