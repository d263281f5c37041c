use chrono::{DateTime, Utc};
use ied_control::{BindingRegistry, ControlAdapter};
use ied_kernel::diagnostics::MemorySink;
use ied_model::{
    ControlAction, ControlHandlerResult, ControlOutcome, IedModel, IedServer, MmsValue,
    ServerError,
};
use proptest::prelude::*;
use std::sync::Arc;

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
                        { "name": "Oper", "fc": "CO", "type": "CONSTRUCTED", "data_attributes": [
                            { "name": "ctlVal", "fc": "CO", "type": "INT32" }
                        ]}
                    ]},
                    { "name": "Beh", "data_attributes": [
                        { "name": "stVal", "fc": "ST", "type": "INT32", "value": 1 }
                    ]}
                ]
            },
            {
                "name": "GGIO1",
                "data_objects": [
                    { "name": "SPCSO1", "data_attributes": [
                        { "name": "stVal", "fc": "ST", "type": "BOOLEAN" },
                        { "name": "t", "fc": "ST", "type": "UTC_TIME" },
                        { "name": "Oper", "fc": "CO", "type": "CONSTRUCTED" }
                    ]},
                    { "name": "SPCSO2", "data_attributes": [
                        { "name": "Oper", "fc": "CO", "type": "CONSTRUCTED" },
                        { "name": "stVal", "fc": "ST", "type": "BOOLEAN" }
                    ]},
                    { "name": "SPCSO3", "data_attributes": [
                        { "name": "stVal", "fc": "ST", "type": "BOOLEAN" },
                        { "name": "Oper", "fc": "SP", "type": "CONSTRUCTED" }
                    ]},
                    { "name": "AnIn1", "data_attributes": [
                        { "name": "mag", "fc": "MX", "type": "FLOAT32" }
                    ]},
                    { "name": "Ind1", "data_attributes": [
                        { "name": "stVal", "fc": "ST", "type": "BOOLEAN" },
                        { "name": "t", "fc": "ST", "type": "UTC_TIME" }
                    ]}
                ]
            }
        ]
    }]
}"#;

struct Fixture {
    server: IedServer,
    registry: BindingRegistry,
    sink: Arc<MemorySink>,
}

fn fixture() -> Fixture {
    let model = IedModel::from_json_str(MODEL).expect("fixture model is valid");
    let server = IedServer::new(Arc::new(model)).expect("server");
    let sink = Arc::new(MemorySink::new());
    let registry = BindingRegistry::build(&server, sink.clone()).expect("registry builds");
    Fixture { server, registry, sink }
}

fn count_with_oper_and_st_val(model: &IedModel) -> usize {
    let mut count = 0;
    let mut stack: Vec<_> = model.logical_devices().to_vec();
    while let Some(id) = stack.pop() {
        let node = model.node(id).expect("walkable");
        if node.is_data_object()
            && model.child(id, "Oper").is_some()
            && model.child(id, "stVal").is_some()
        {
            count += 1;
        }
        stack.extend_from_slice(node.children());
    }
    count
}

fn operate(f: &Fixture, reference: &str, action: &ControlAction, value: MmsValue, test: bool) -> ControlOutcome {
    f.server.dispatch_control(reference, action, &value, test).expect("controllable")
}

fn value_of(f: &Fixture, reference: &str) -> Option<MmsValue> {
    let model = f.server.model();
    model.value(model.resolve_attribute(reference)?)
}

#[test]
fn registers_exactly_the_objects_with_oper_and_st_val() {
    let f = fixture();

    assert_eq!(f.registry.len(), 4);
    assert_eq!(f.registry.len(), count_with_oper_and_st_val(f.server.model()));
    assert_eq!(f.server.controllable_objects().len(), 4);

    let paths: Vec<&str> = f.registry.iter().map(|b| b.path()).collect();
    assert_eq!(
        paths,
        ["Device/LLN0.Mod", "Device/GGIO1.SPCSO1", "Device/GGIO1.SPCSO2", "Device/GGIO1.SPCSO3"]
    );

    assert_eq!(
        f.sink.lines(),
        [
            "Registered control handler for Device/LLN0.Mod",
            "Registered control handler for Device/GGIO1.SPCSO1",
            "Registered control handler for Device/GGIO1.SPCSO2",
            "Registered control handler for Device/GGIO1.SPCSO3",
            "Registered 4 controllable data object handlers",
        ]
    );
}

#[test]
fn timestamps_are_optional() {
    let f = fixture();

    let with_t = f.registry.find_by_path("Device/GGIO1.SPCSO1").expect("SPCSO1 bound");
    let without_t = f.registry.find_by_path("Device/GGIO1.SPCSO2").expect("SPCSO2 bound");

    assert!(with_t.timestamp().is_some());
    assert!(without_t.timestamp().is_none());
    assert_eq!(f.registry.get(with_t.control_point()), Some(with_t));
}

#[test]
fn operate_updates_status_and_timestamp_once() {
    let f = fixture();
    f.sink.take();
    let before = Utc::now();

    let outcome = operate(&f, "Device/GGIO1.SPCSO1", &ControlAction::operate(), MmsValue::Boolean(true), false);

    assert_eq!(outcome, ControlOutcome::Completed(ControlHandlerResult::Ok));
    assert_eq!(value_of(&f, "Device/GGIO1.SPCSO1.stVal"), Some(MmsValue::Boolean(true)));

    let stamped: DateTime<Utc> = value_of(&f, "Device/GGIO1.SPCSO1.t")
        .and_then(|v| v.as_utc_time())
        .expect("t is a timestamp");
    assert!(stamped >= before && stamped <= Utc::now());

    assert_eq!(f.sink.lines(), ["CONTROL_UPDATE Device/GGIO1.SPCSO1"]);
}

#[test]
fn operate_without_timestamp_attribute_still_succeeds() {
    let f = fixture();
    f.sink.take();

    let outcome = operate(&f, "Device/GGIO1.SPCSO2", &ControlAction::operate(), MmsValue::Boolean(true), false);

    assert_eq!(outcome, ControlOutcome::Completed(ControlHandlerResult::Ok));
    assert_eq!(value_of(&f, "Device/GGIO1.SPCSO2.stVal"), Some(MmsValue::Boolean(true)));
    assert_eq!(f.sink.lines(), ["CONTROL_UPDATE Device/GGIO1.SPCSO2"]);
}

#[test]
fn select_is_accepted_without_mutation() {
    let f = fixture();
    f.sink.take();

    let outcome = operate(&f, "Device/LLN0.Mod", &ControlAction::select(), MmsValue::Int32(5), false);

    assert_eq!(outcome, ControlOutcome::Completed(ControlHandlerResult::Ok));
    assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Int32(1)));
    assert!(f.sink.is_empty());
}

#[test]
fn objects_without_oper_are_not_controllable() {
    let f = fixture();

    for reference in ["Device/LLN0.Beh", "Device/GGIO1.Ind1", "Device/GGIO1.AnIn1"] {
        let result = f.server.dispatch_control(
            reference,
            &ControlAction::operate(),
            &MmsValue::Int32(1),
            false,
        );
        assert!(matches!(result, Err(ServerError::NotControllable { .. })), "{reference}");
    }
}

#[test]
fn released_registry_fails_late_requests() {
    let f = fixture();
    let Fixture { server, registry, sink } = f;
    registry.release();
    sink.take();

    let outcome = server
        .dispatch_control("Device/GGIO1.SPCSO1", &ControlAction::operate(), &MmsValue::Boolean(true), false)
        .expect("handler is still installed");

    assert_eq!(outcome, ControlOutcome::Completed(ControlHandlerResult::Failed));
    let st = server.model().resolve_attribute("Device/GGIO1.SPCSO1.stVal").expect("stVal");
    assert_eq!(server.model().value(st), Some(MmsValue::Boolean(false)));
    assert!(sink.is_empty());
}

#[test]
fn adapter_fails_without_a_binding() {
    let f = fixture();
    let adapter = ControlAdapter::new(f.server.updater(), f.sink.clone());

    let result = adapter.control(&ControlAction::operate(), None, &MmsValue::Boolean(true), false);
    assert_eq!(result, ControlHandlerResult::Failed);
}

#[test]
fn refused_status_write_still_completes_the_operate() {
    let model = IedModel::from_json_str(
        r#"{
            "name": "structured",
            "logical_devices": [{
                "name": "D",
                "logical_nodes": [{
                    "name": "GGIO1",
                    "data_objects": [
                        { "name": "SPC", "data_attributes": [
                            { "name": "stVal", "fc": "ST", "type": "CONSTRUCTED" },
                            { "name": "t", "fc": "ST", "type": "UTC_TIME" },
                            { "name": "Oper", "fc": "CO", "type": "CONSTRUCTED" }
                        ]}
                    ]
                }]
            }]
        }"#,
    )
    .expect("model is valid");
    let server = IedServer::new(Arc::new(model)).expect("server");
    let sink = Arc::new(MemorySink::new());
    let registry = BindingRegistry::build(&server, sink.clone()).expect("registry builds");
    assert_eq!(registry.len(), 1);
    sink.take();
    let before = Utc::now();

    let outcome = server
        .dispatch_control("D/GGIO1.SPC", &ControlAction::operate(), &MmsValue::Boolean(true), false)
        .expect("SPC is controllable");

    assert_eq!(outcome, ControlOutcome::Completed(ControlHandlerResult::Ok));
    let t = server.model().resolve_attribute("D/GGIO1.SPC.t").expect("t");
    let stamped = server.model().value(t).and_then(|v| v.as_utc_time()).expect("timestamp");
    assert!(stamped >= before);
    assert_eq!(sink.lines(), ["CONTROL_UPDATE D/GGIO1.SPC"]);
}

proptest! {
    #[test]
    fn test_mode_never_mutates_status(value in any::<i32>(), select in any::<bool>()) {
        let f = fixture();
        f.sink.take();
        let action = if select { ControlAction::select() } else { ControlAction::operate() };

        let outcome = operate(&f, "Device/LLN0.Mod", &action, MmsValue::Int32(value), true);

        prop_assert_eq!(outcome, ControlOutcome::Completed(ControlHandlerResult::Ok));
        prop_assert_eq!(value_of(&f, "Device/LLN0.Mod.stVal"), Some(MmsValue::Int32(1)));
        prop_assert_eq!(
            value_of(&f, "Device/LLN0.Mod.t").and_then(|v| v.as_utc_time()),
            Some(DateTime::<Utc>::UNIX_EPOCH)
        );
        prop_assert!(f.sink.is_empty());
    }
}
