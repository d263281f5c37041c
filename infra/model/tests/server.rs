use ied_model::{
    ControlAction, ControlHandlerResult, ControlOutcome, IedModel, IedServer, MmsValue,
    ServerError,
};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

const MODEL: &str = r#"{
    "name": "fixture",
    "logical_devices": [{
        "name": "Device",
        "logical_nodes": [{
            "name": "GGIO1",
            "data_objects": [{
                "name": "SPCSO1",
                "data_attributes": [
                    { "name": "stVal", "fc": "ST", "type": "BOOLEAN" },
                    { "name": "Oper", "fc": "CO", "type": "CONSTRUCTED" }
                ]
            }]
        }]
    }]
}"#;

fn server() -> IedServer {
    let model = IedModel::from_json_str(MODEL).expect("fixture model is valid");
    IedServer::new(Arc::new(model)).expect("fixture model has a device")
}

#[tokio::test]
async fn start_binds_and_stop_releases_the_port() {
    let server = server();
    assert!(!server.is_running());

    let addr = server.start("127.0.0.1", 0).await.expect("ephemeral port binds");
    assert!(server.is_running());
    assert_eq!(server.local_addr(), Some(addr));

    let mut client = TcpStream::connect(addr).await.expect("association accepted");
    let mut buf = [0_u8; 1];
    // The server closes associations immediately.
    let read = client.read(&mut buf).await.unwrap_or(0);
    assert_eq!(read, 0);

    server.stop().await;
    assert!(!server.is_running());
    assert!(server.local_addr().is_none());

    let rebound = TcpListener::bind(addr).await;
    assert!(rebound.is_ok(), "port should be free after stop");
}

#[tokio::test]
async fn start_fails_when_the_port_is_taken() {
    let squatter = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = squatter.local_addr().expect("addr").port();

    let server = server();
    let err = server.start("127.0.0.1", port).await;

    assert!(matches!(err, Err(ServerError::Listen { .. })));
    assert!(!server.is_running());
}

#[tokio::test]
async fn second_start_is_refused() {
    let server = server();
    server.start("127.0.0.1", 0).await.expect("first start");

    assert!(matches!(
        server.start("127.0.0.1", 0).await,
        Err(ServerError::AlreadyRunning { .. })
    ));
    server.stop().await;
}

#[test]
fn dispatch_reaches_installed_handlers_with_request_data() {
    let server = server();
    let spc = server.model().resolve("Device/GGIO1.SPCSO1").expect("data object");
    let updater = server.updater();
    let st = server.model().resolve_attribute("Device/GGIO1.SPCSO1.stVal").expect("stVal");

    server
        .set_control_handler(spc, move |action, value, test| {
            if test || action.is_select() {
                return ControlHandlerResult::Ok;
            }
            match updater.update_attribute_value(st, value.clone()) {
                Ok(()) => ControlHandlerResult::Ok,
                Err(_) => ControlHandlerResult::Failed,
            }
        })
        .expect("handler installs on data object");

    let outcome = server
        .dispatch_control(
            "Device/GGIO1.SPCSO1",
            &ControlAction::operate().with_ctl_num(3),
            &MmsValue::Boolean(true),
            false,
        )
        .expect("dispatch");

    assert_eq!(outcome, ControlOutcome::Completed(ControlHandlerResult::Ok));
    assert_eq!(server.model().value(st), Some(MmsValue::Boolean(true)));
    assert_eq!(server.controllable_objects(), vec![spc]);
}
