mod support;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use catalog::cache::{CacheError, CacheStore};
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;

use support::TestApp;

struct BrokenCache;

#[async_trait]
impl CacheStore for BrokenCache {
    fn is_available(&self) -> bool {
        true
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Timeout {
            operation: "delete",
        })
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
        Err(CacheError::backend("connection refused"))
    }
}

async fn seed(app: &TestApp) -> i64 {
    let (_, body) = app
        .post(
            "/api/v1/categories",
            json!({"name": "Tools", "description": "Hand tools"}),
        )
        .await;
    let category_id = body["data"]["id"].as_i64().expect("category id");

    let (status, body) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "Hammer",
                "description": "Claw hammer",
                "price": 10,
                "stock_quantity": 5,
                "category_id": category_id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().expect("product id")
}

#[tokio::test]
async fn report_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Healthy cache: miss, hit, invalidation.
    let app = TestApp::new();
    let hammer = seed(&app).await;
    app.get("/api/v1/products/report").await;
    app.get("/api/v1/products/report").await;
    app.put(&format!("/api/v1/products/{hammer}"), json!({"stock_quantity": 7}))
        .await;

    // Failing cache: every operation degrades and is counted, responses stay 200.
    let broken = TestApp::with_cache(Arc::new(BrokenCache));
    let hammer = seed(&broken).await;
    let (status, body) = broken.get("/api/v1/products/report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_products"], 1);
    let (status, _) = broken
        .put(&format!("/api/v1/products/{hammer}"), json!({"price": 12}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let mut counters: HashMap<String, u64> = HashMap::new();
    let mut error_ops = Vec::new();
    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let key = composite_key.key();
        if let DebugValue::Counter(count) = value {
            if key.name() == "catalog_cache_error_total" {
                error_ops.extend(
                    key.labels()
                        .filter(|label| label.key() == "op")
                        .map(|label| label.value().to_string()),
                );
            }
            *counters.entry(key.name().to_string()).or_default() += count;
        }
    }

    for metric in [
        "catalog_report_cache_hit_total",
        "catalog_report_cache_miss_total",
        "catalog_report_cache_invalidation_total",
        "catalog_cache_error_total",
    ] {
        assert!(counters.contains_key(metric), "missing metric: {metric}");
    }
    assert_eq!(counters["catalog_report_cache_hit_total"], 1);
    assert_eq!(counters["catalog_report_cache_miss_total"], 2);

    for op in ["get", "set", "delete"] {
        assert!(
            error_ops.iter().any(|label| label == op),
            "missing cache error op: {op}"
        );
    }
}
