use gatelog_core::record::{EXPORT_COLUMNS, LogRecord, decode_line};

/// A full gateway access-log line, shaped like what Kong's file-log plugin
/// emits.
const FULL_LINE: &str = r#"{
  "request": {
    "method": "GET",
    "uri": "/get",
    "url": "http://httpbin.org:8000/get",
    "size": 75,
    "headers": {
      "accept": "*/*",
      "host": "httpbin.org",
      "user-agent": "curl/7.37.1"
    }
  },
  "upstream_uri": "/",
  "response": {
    "status": 200,
    "size": 434,
    "headers": {
      "Content-Length": "197",
      "via": "kong/0.3.0",
      "Connection": "close",
      "access-control-allow-credentials": "true",
      "Content-Type": "application/json",
      "server": "nginx",
      "access-control-allow-origin": "*"
    }
  },
  "authenticated_entity": {
    "consumer_id": {
      "uuid": "80f74eef-31b8-45d5-c525-ae532297ea8e"
    }
  },
  "route": {
    "created_at": 1521555129,
    "hosts": "ahost.example.com",
    "id": "75818c5f-202d-4b82-a553-6a46e7c9a19e",
    "methods": ["GET"],
    "paths": ["/example-path"],
    "preserve_host": false,
    "protocols": ["http", "https"],
    "regex_priority": 0,
    "service": {
      "id": "0590139e-7481-466c-bcdf-929adcaaf804"
    },
    "strip_path": true,
    "updated_at": 1521555129
  },
  "service": {
    "connect_timeout": 60000,
    "created_at": 1521554518,
    "host": "example.com",
    "id": "0590139e-7481-466c-bcdf-929adcaaf804",
    "name": "myservice",
    "path": "/",
    "port": 80,
    "protocol": "http",
    "read_timeout": 60000,
    "retries": 5,
    "updated_at": 1521554518,
    "write_timeout": 60000
  },
  "latencies": {
    "proxy": 1430,
    "gateway": 9,
    "request": 1921
  },
  "client_ip": "127.0.0.1",
  "started_at": 1433209822425
}"#;

#[test]
fn full_line_decodes_and_derives_keys() {
    let record = decode_line(FULL_LINE).unwrap();
    assert_eq!(record.service_id, "0590139e-7481-466c-bcdf-929adcaaf804");
    assert_eq!(record.consumer_id, "80f74eef-31b8-45d5-c525-ae532297ea8e");
    assert_eq!(record.request.method, "GET");
    assert_eq!(record.response.status, 200);
    assert_eq!(record.response.headers.via, "kong/0.3.0");
    assert_eq!(record.route.paths, vec!["/example-path"]);
    assert_eq!(record.service.name, "myservice");
    assert_eq!(record.latencies.request, 1921);
    assert_eq!(record.started_at, 1433209822425);
}

#[test]
fn record_roundtrips_through_json() {
    let record = decode_line(FULL_LINE).unwrap();
    let json = serde_json::to_string(&record).unwrap();
    let back: LogRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.service_id, record.service_id);
    assert_eq!(back.consumer_id, record.consumer_id);
    assert_eq!(back.started_at, record.started_at);
    assert_eq!(back.request.headers.user_agent, "curl/7.37.1");
    assert_eq!(back.response.headers.content_length, "197");
}

#[test]
fn row_json_columns_parse_back_structurally_equal() {
    let record = decode_line(FULL_LINE).unwrap();
    let row = record.to_row().unwrap();
    assert_eq!(row.len(), EXPORT_COLUMNS.len());

    // Each JSON-valued column must parse back to the same sub-object
    let request: serde_json::Value = serde_json::from_str(&row[0]).unwrap();
    assert_eq!(request["method"], "GET");
    assert_eq!(request["headers"]["user-agent"], "curl/7.37.1");

    let route: serde_json::Value = serde_json::from_str(&row[4]).unwrap();
    assert_eq!(route["service"]["id"], "0590139e-7481-466c-bcdf-929adcaaf804");

    let latencies: serde_json::Value = serde_json::from_str(&row[6]).unwrap();
    assert_eq!(latencies["proxy"], 1430);

    // Scalar columns are plain text
    assert_eq!(row[8], "1433209822425");
}
