use ied_domain::config::{AppConfig, BridgeConfig, InferenceMode, LoggingConfig, ServerConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8102);
    assert!(server.address.is_unspecified());

    let bridge = BridgeConfig::default();
    assert!(bridge.enabled);
    assert_eq!(bridge.status_suffix, ".stVal");
    assert_eq!(bridge.timestamp_attribute, "t");
    assert_eq!(bridge.inference, InferenceMode::Heuristic);

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.directory.is_none());
    assert!(!logging.json);
}

#[test]
fn app_config_deserializes_partial_documents() {
    let raw = json!({
        "server": { "port": 10102 },
        "bridge": { "inference": "schema", "enabled": false },
        "model": { "path": "/etc/ied/model.json" }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 10102);
    assert!(cfg.server.address.is_unspecified());
    assert_eq!(cfg.bridge.inference, InferenceMode::Schema);
    assert!(!cfg.bridge.enabled);
    assert_eq!(cfg.bridge.status_suffix, ".stVal");
    assert_eq!(cfg.model.path, Some(std::path::PathBuf::from("/etc/ied/model.json")));
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn unknown_inference_modes_are_rejected() {
    let raw = json!({ "bridge": { "inference": "guess" } });
    assert!(serde_json::from_value::<AppConfig>(raw).is_err());
}

#[test]
fn mutation_copies_on_write() {
    let original = AppConfig::default();
    let mut changed = original.clone();
    changed.server.port = 1;

    assert_eq!(original.server.port, 8102);
    assert_eq!(changed.server.port, 1);
}
