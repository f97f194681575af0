//! Loading documents, metadata and configuration from disk

use pretty_assertions::assert_eq;
use scenario_engine::{load_document, EngineConfig, EngineContext, EngineError, StaticMetadataSource};
use scenario_model::NodeKey;
use scenario_test_utils::{valid_document, AVOID_IMPL};
use std::io::Write;
use std::sync::Arc;
use tempfile::Builder;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn json_and_yaml_documents_load_identically() {
    let doc = valid_document();
    let json = write_temp(".json", &serde_json::to_string_pretty(&doc).unwrap());
    let yaml = write_temp(".yaml", &serde_yaml::to_string(&doc).unwrap());

    assert_eq!(load_document(json.path()).unwrap(), doc);
    assert_eq!(load_document(yaml.path()).unwrap(), doc);
}

#[test]
fn malformed_document_reports_its_format() {
    let json = write_temp(".json", "{ \"tasks\": 7 }");
    assert!(matches!(load_document(json.path()).unwrap_err(), EngineError::Json(_)));

    let missing = load_document("/nonexistent/scenario.json").unwrap_err();
    assert!(matches!(missing, EngineError::Io { .. }));
}

#[tokio::test]
async fn metadata_file_drives_self_completion() {
    let metadata = write_temp(
        ".yml",
        &format!("self_completing:\n  - {AVOID_IMPL}\n"),
    );
    let source = StaticMetadataSource::load(metadata.path()).unwrap();
    assert!(source.self_completing.contains(AVOID_IMPL));

    let config = write_temp(".toml", "weight_tolerance = 0.05\nrebuild_references_on_load = false\n");
    let config = EngineConfig::load(config.path()).unwrap();

    let mut ctx = EngineContext::with_config(valid_document(), Arc::new(source), config);
    assert!((ctx.config().weight_tolerance - 0.05).abs() < f64::EPSILON);
    ctx.prefetch_metadata().await.unwrap();

    // the corridor condition is not in the set, so concept 2 never ends
    let report = ctx.validate_document();
    assert!(report
        .failures
        .iter()
        .any(|entry| entry.node == NodeKey::Task(scenario_model::NodeId(1)).to_string()));
}
