use ied_bridge::{Bridge, BridgeStats, LineOutcome, SchemaInference};
use ied_domain::config::{BridgeConfig, InferenceMode};
use ied_kernel::Shutdown;
use ied_kernel::diagnostics::MemorySink;
use ied_model::{IedModel, IedServer, MmsValue};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};

const MODEL: &str = r#"{
    "name": "fixture",
    "logical_devices": [{
        "name": "Device",
        "logical_nodes": [
            {
                "name": "LLN0",
                "data_objects": [
                    { "name": "Mod", "data_attributes": [
                        { "name": "stVal", "fc": "ST", "type": "INT32", "value": 1 },
                        { "name": "t", "fc": "ST", "type": "UTC_TIME" },
                        { "name": "Oper", "fc": "CO", "type": "CONSTRUCTED" }
                    ]}
                ]
            },
            {
                "name": "MMXU1",
                "data_objects": [
                    { "name": "TotW", "data_attributes": [
                        { "name": "mag", "fc": "MX", "type": "FLOAT32" }
                    ]}
                ]
            }
        ]
    }]
}"#;

struct Fixture {
    server: IedServer,
    sink: Arc<MemorySink>,
    shutdown: Shutdown,
    bridge: Bridge,
}

fn fixture() -> Fixture {
    let model = IedModel::from_json_str(MODEL).expect("fixture model is valid");
    let server = IedServer::new(Arc::new(model)).expect("server");
    let sink = Arc::new(MemorySink::new());
    let shutdown = Shutdown::new();
    let bridge = Bridge::new(server.updater(), sink.clone(), shutdown.clone());
    Fixture { server, sink, shutdown, bridge }
}

fn value_of(f: &Fixture, reference: &str) -> Option<MmsValue> {
    let model = f.server.model();
    model.value(model.resolve_attribute(reference)?)
}

#[test]
fn direct_attribute_path_is_updated() {
    let f = fixture();

    let outcome = f.bridge.handle_line("Device/LLN0.Mod.stVal=true\n");

    assert_eq!(outcome, LineOutcome::Updated);
    assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Boolean(true)));
    assert_eq!(f.sink.lines(), ["BRIDGE_OK: Updated Device/LLN0.Mod.stVal = true"]);
}

#[test]
fn data_object_path_falls_back_to_status_value() {
    let f = fixture();

    let before = chrono::Utc::now();

    let outcome = f.bridge.handle_line("Device/LLN0.Mod=5\n");

    assert_eq!(outcome, LineOutcome::Updated);
    assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Int32(5)));
    let stamped = value_of(&f, "Device/LLN0.Mod.t").and_then(|v| v.as_utc_time()).expect("t");
    assert!(stamped >= before);
    assert_eq!(f.sink.lines(), ["BRIDGE_OK: Updated Device/LLN0.Mod = 5"]);
}

#[test]
fn unknown_paths_report_an_error_and_change_nothing() {
    let f = fixture();

    let outcome = f.bridge.handle_line("Unknown/Path=5\n");

    assert_eq!(outcome, LineOutcome::Unresolved);
    assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Int32(1)));
    assert_eq!(f.sink.lines(), ["BRIDGE_ERR: Node not found or not attribute: Unknown/Path"]);
}

#[test]
fn constructed_attributes_resolve_but_are_not_written() {
    let f = fixture();

    assert_eq!(f.bridge.handle_line("Device/LLN0.Mod.Oper=1"), LineOutcome::Failed);
    assert!(f.sink.is_empty());
    let untouched = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
    assert_eq!(value_of(&f, "Device/LLN0.Mod.t"), Some(MmsValue::UtcTime(untouched)));
}

#[test]
fn malformed_lines_are_silent() {
    let f = fixture();

    assert_eq!(f.bridge.handle_line("\n"), LineOutcome::Ignored);
    assert_eq!(f.bridge.handle_line(""), LineOutcome::Ignored);
    assert_eq!(f.bridge.handle_line("Device/LLN0.Mod.stVal true\n"), LineOutcome::Ignored);

    assert!(f.sink.is_empty());
    assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Int32(1)));
}

#[test]
fn updates_stamp_the_sibling_timestamp() {
    let f = fixture();
    let before = chrono::Utc::now();

    f.bridge.handle_line("Device/LLN0.Mod=3");

    let stamped = value_of(&f, "Device/LLN0.Mod.t").and_then(|v| v.as_utc_time()).expect("t");
    assert!(stamped >= before);
}

#[test]
fn float_text_becomes_float32() {
    let f = fixture();

    f.bridge.handle_line("Device/MMXU1.TotW.mag=12.5");

    assert_eq!(value_of(&f, "Device/MMXU1.TotW.mag"), Some(MmsValue::Float32(12.5)));
}

#[test]
fn schema_mode_follows_the_declared_type() {
    let f = fixture();
    let config = BridgeConfig { inference: InferenceMode::Schema, ..BridgeConfig::default() };
    let bridge = Bridge::new(f.server.updater(), f.sink.clone(), f.shutdown.clone()).with_config(&config);

    bridge.handle_line("Device/MMXU1.TotW.mag=12");
    assert_eq!(value_of(&f, "Device/MMXU1.TotW.mag"), Some(MmsValue::Float32(12.0)));

    let explicit = Bridge::new(f.server.updater(), f.sink.clone(), f.shutdown.clone())
        .with_inference(SchemaInference);
    explicit.handle_line("Device/LLN0.Mod=7");
    assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Int32(7)));
}

#[test]
fn errors_are_suppressed_during_shutdown() {
    let f = fixture();
    f.shutdown.trigger();

    assert_eq!(f.bridge.handle_line("Unknown/Path=5"), LineOutcome::Unresolved);
    assert!(f.sink.is_empty());
}

#[tokio::test]
async fn run_consumes_input_until_eof() {
    let f = fixture();
    let input = "Device/LLN0.Mod.stVal=true\n\nno separator\nUnknown/Path=5\nDevice/LLN0.Mod=2";

    let stats = f.bridge.run(BufReader::new(input.as_bytes())).await.expect("run");

    assert_eq!(
        stats,
        BridgeStats { lines: 5, updated: 2, unresolved: 1, ignored: 2, declined: 0, failed: 0 }
    );
    assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Int32(2)));
    assert_eq!(f.sink.lines().len(), 3);
}

#[tokio::test]
async fn shutdown_cancels_a_blocked_read() {
    let f = fixture();
    let (mut writer, reader) = tokio::io::duplex(64);
    writer.write_all(b"Device/LLN0.Mod=4\n").await.expect("write");

    let shutdown = f.shutdown.clone();
    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.trigger();
    });

    let stats = tokio::time::timeout(Duration::from_secs(2), f.bridge.run(BufReader::new(reader)))
        .await
        .expect("run returns once shutdown fires")
        .expect("run");

    trigger.await.expect("trigger task");
    assert_eq!(stats.updated, 1);
    assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Int32(4)));
    drop(writer);
}
