use house_price_serving::{
    features::SchemaAligner,
    ledger::{LibsqlLedger, TaskLedger},
    model::ModelInvoker,
    pipeline::PredictionService,
};
use serde_json::{Map, Value, json};
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;

/// Golden output of the fixture model for `semi_furnished_request`.
pub const GOLDEN_SEMI_FURNISHED: f64 = 4_354_000.0;

/// Fixture model output for `furnished_request`.
pub const EXPECTED_FURNISHED: f64 = 5_231_500.0;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn reference_path() -> PathBuf {
    fixture_path("housing_head.csv")
}

pub fn model_path() -> PathBuf {
    fixture_path("house_price_linear.json")
}

pub fn as_map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("request must be a JSON object")
}

/// The load-test request.
pub fn furnished_request() -> Map<String, Value> {
    as_map(json!({
        "area": 1110,
        "bedrooms": 3,
        "bathrooms": 2,
        "stories": 2,
        "mainroad": "yes",
        "guestroom": "no",
        "basement": "yes",
        "hotwaterheating": "yes",
        "airconditioning": "yes",
        "parking": 1,
        "prefarea": "yes",
        "furnishingstatus": "furnished"
    }))
}

pub fn semi_furnished_request() -> Map<String, Value> {
    as_map(json!({
        "area": 1000,
        "bedrooms": 2,
        "bathrooms": 2,
        "stories": 2,
        "mainroad": "yes",
        "guestroom": "no",
        "basement": "yes",
        "hotwaterheating": "no",
        "airconditioning": "yes",
        "parking": 1,
        "prefarea": "yes",
        "furnishingstatus": "semi-furnished"
    }))
}

pub fn fixture_aligner() -> SchemaAligner {
    SchemaAligner::load(reference_path(), "price", 5).expect("fixture reference must load")
}

pub async fn fixture_model() -> ModelInvoker {
    ModelInvoker::load(model_path())
        .await
        .expect("fixture model must load")
}

pub fn fixture_feature_names() -> Vec<String> {
    [
        "area",
        "bedrooms",
        "bathrooms",
        "stories",
        "mainroad",
        "guestroom",
        "basement",
        "hotwaterheating",
        "airconditioning",
        "parking",
        "prefarea",
        "furnishingstatus_semi-furnished",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

/// Service over the fixture schema and model, auditing into an in-memory ledger.
pub async fn create_test_service() -> (PredictionService, Arc<LibsqlLedger>) {
    let ledger = Arc::new(LibsqlLedger::open(":memory:").await.unwrap());
    let service = PredictionService::new(
        Arc::new(fixture_aligner()),
        Arc::new(fixture_model().await),
        Arc::clone(&ledger) as Arc<dyn TaskLedger>,
    );
    (service, ledger)
}

/// Same as `create_test_service`, with the ledger on disk.
pub async fn create_test_service_on_disk() -> (TempDir, PredictionService, Arc<LibsqlLedger>) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("sqlitedb").join("tasks.sqlite3");
    let ledger = Arc::new(LibsqlLedger::open(&db_path.to_string_lossy()).await.unwrap());
    let service = PredictionService::new(
        Arc::new(fixture_aligner()),
        Arc::new(fixture_model().await),
        Arc::clone(&ledger) as Arc<dyn TaskLedger>,
    );
    (temp_dir, service, ledger)
}

pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9000
  logs:
    level: "debug"

model:
  path: "models/house_price.json"
  reference_path: "data/train.csv"
  reference_rows: 10
  max_processing_ms: 250

ledger:
  path: ":memory:"
  utc_offset_hours: 0
"#;
