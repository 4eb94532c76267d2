use gantry_core::model::span::Trace;
use gantry_wire::model::TraceResponse;

/// Nanosecond timestamp the sample trace starts at.
pub const BASE_NANOS: u64 = 1_717_777_733_000_000_000;

/// A small three-service payload in the shape the tracing backend returns.
/// Spans arrive out of start-time order on purpose:
///
/// ```text
/// root (shop-backend)        [0ms, 1000ms]
/// ├── auth (auth-service)    [100ms, 250ms]
/// └── cart (shop-backend)    [300ms, 900ms]
///     ├── persist (shop-backend)  [320ms, 600ms]
///     └── db (postgres)           [620ms, 850ms]
/// ```
pub fn sample_payload() -> TraceResponse {
    let span = |id: &str, parent: Option<&str>, name: &str, start_ms: u64, end_ms: u64| {
        serde_json::json!({
            "spanId": id,
            "parentSpanId": parent,
            "name": name,
            "startTimeUnixNano": (BASE_NANOS + start_ms * 1_000_000).to_string(),
            "endTimeUnixNano": (BASE_NANOS + end_ms * 1_000_000).to_string(),
        })
    };

    let payload = serde_json::json!({
        "batches": [
            {
                "resource": {
                    "attributes": [
                        {"key": "k6", "value": {"boolValue": true}},
                        {"key": "service.name", "value": {"stringValue": "shop-backend"}}
                    ]
                },
                "scopeSpans": [{
                    "spans": [
                        span("cart", Some("root"), "place-articles", 300, 900),
                        span("root", None, "GET /checkout", 0, 1000),
                        span("persist", Some("cart"), "persist-cart", 320, 600),
                    ]
                }]
            },
            {
                "resource": {
                    "attributes": [
                        {"key": "service.name", "value": {"stringValue": "auth-service"}}
                    ]
                },
                "scopeSpans": [{
                    "spans": [span("auth", Some("root"), "authenticate", 100, 250)]
                }]
            },
            {
                "resource": {
                    "attributes": [
                        {"key": "service.name", "value": {"stringValue": "postgres"}}
                    ]
                },
                "scopeSpans": [{
                    "spans": [span("db", Some("cart"), "query-articles", 620, 850)]
                }]
            }
        ]
    });

    serde_json::from_value(payload).expect("sample payload is well formed")
}

/// Palette the sample trace is built with.
pub fn sample_palette() -> Vec<String> {
    vec![
        "#7eb26d".to_string(),
        "#eab839".to_string(),
        "#6ed0e0".to_string(),
    ]
}

/// The sample payload, built into a span tree.
pub fn sample_trace() -> Trace {
    gantry_wire::build_trace(&sample_payload(), &sample_palette())
        .expect("sample payload builds")
}
