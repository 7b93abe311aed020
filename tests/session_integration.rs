//! End-to-end scenarios driving a `NetconfSession` over an in-memory
//! `tokio::io::duplex` pair standing in for the SSH subsystem channel.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;

use netconf_client::capability::{CapabilityUri, BASE_1_0};
use netconf_client::error::Error;
use netconf_client::framing;
use netconf_client::message::Hello;
use netconf_client::session::{LoadType, NetconfSession, SessionState};
use netconf_client::xmldom::Xml;

const SERVER_HELLO: &str = r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
<capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities>
<session-id>101</session-id>
</hello>"#;

/// Runs a scripted server on `server_half`: sends the server hello, then for
/// each subsequent inbound message reports it through `captured` and
/// replies with the matching entry of `replies` (cycling the last one if
/// the client sends more requests than scripted).
async fn run_scripted_server(
    mut server_half: DuplexStream,
    replies: Vec<&'static str>,
    captured: mpsc::UnboundedSender<String>,
) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    // Drain the client hello before sending our own.
    let _client_hello = framing::read_message(&mut server_half, deadline).await.unwrap();
    framing::write_message(&mut server_half, SERVER_HELLO).await.unwrap();

    for reply in replies {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        match framing::read_message(&mut server_half, deadline).await {
            Ok(bytes) => {
                let _ = captured.send(String::from_utf8(bytes).unwrap());
            }
            Err(_) => return,
        }
        if framing::write_message(&mut server_half, reply).await.is_err() {
            return;
        }
    }
}

/// A server that sends its hello and then goes silent forever, to exercise
/// the timeout path.
async fn run_unresponsive_server(mut server_half: DuplexStream) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let _client_hello = framing::read_message(&mut server_half, deadline).await.unwrap();
    framing::write_message(&mut server_half, SERVER_HELLO).await.unwrap();
    // Read (and discard) anything the client sends, but never reply.
    let mut sink = [0u8; 1024];
    loop {
        if server_half.read(&mut sink).await.unwrap_or(0) == 0 {
            break;
        }
    }
}

#[tokio::test]
async fn s1_happy_rpc() {
    let (client_half, server_half) = tokio::io::duplex(16 * 1024);
    let (tx, _rx) = mpsc::unbounded_channel();
    tokio::spawn(run_scripted_server(
        server_half,
        vec![r#"<rpc-reply message-id="1"><chassis-inventory/></rpc-reply>"#],
        tx,
    ));

    let mut session = NetconfSession::connect(
        client_half,
        Duration::from_secs(2),
        Duration::from_secs(2),
        vec![],
    )
    .await
    .unwrap();

    let xml = session.execute_rpc("get-chassis-inventory").await.unwrap();
    assert_eq!(xml.tag().as_deref(), Some("rpc-reply"));

    let reply = session.last_rpc_reply().unwrap();
    assert_eq!(reply.message_id(), Some("1"));
    assert!(!reply.is_ok());
    assert!(!reply.has_errors());
}

#[tokio::test]
async fn s2_load_xml_merge_path() {
    let (client_half, server_half) = tokio::io::duplex(16 * 1024);
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(run_scripted_server(
        server_half,
        vec![
            "<rpc-reply><ok/></rpc-reply>", // lock
            "<rpc-reply><ok/></rpc-reply>", // edit-config
            "<rpc-reply><ok/></rpc-reply>", // commit
            "<rpc-reply><ok/></rpc-reply>", // unlock
        ],
        tx,
    ));

    let mut session = NetconfSession::connect(
        client_half,
        Duration::from_secs(2),
        Duration::from_secs(2),
        vec![],
    )
    .await
    .unwrap();

    assert!(session.lock_config().await.unwrap());
    session
        .load_xml_configuration("<system><services><ftp/></services></system>", LoadType::Merge)
        .await
        .unwrap();
    session.commit().await.unwrap();
    assert!(session.unlock_config().await.unwrap());

    let _lock_request = rx.recv().await.unwrap();
    let edit_config_request = rx.recv().await.unwrap();
    assert!(edit_config_request.contains(
        "<config><configuration><system><services><ftp/></services></system></configuration></config>"
    ));
    assert!(edit_config_request.contains("<default-operation>merge</default-operation>"));
    assert!(edit_config_request.contains("<target><candidate/></target>"));
}

#[tokio::test]
async fn s3_load_rejected_session_remains_ready() {
    let (client_half, server_half) = tokio::io::duplex(16 * 1024);
    let (tx, _rx) = mpsc::unbounded_channel();
    tokio::spawn(run_scripted_server(
        server_half,
        vec![
            r#"<rpc-reply><rpc-error>
                <error-type>application</error-type>
                <error-tag>data-exists</error-tag>
                <error-severity>error</error-severity>
            </rpc-error></rpc-reply>"#,
            "<rpc-reply><ok/></rpc-reply>", // lock, after the rejection
        ],
        tx,
    ));

    let mut session = NetconfSession::connect(
        client_half,
        Duration::from_secs(2),
        Duration::from_secs(2),
        vec![],
    )
    .await
    .unwrap();

    let err = session
        .load_xml_configuration("<system/>", LoadType::Merge)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Load { .. }));
    assert_eq!(session.state(), SessionState::Ready);

    assert!(session.lock_config().await.unwrap());
}

#[tokio::test]
async fn s4_timeout_marks_session_failed() {
    let (client_half, server_half) = tokio::io::duplex(16 * 1024);
    tokio::spawn(run_unresponsive_server(server_half));

    let mut session = NetconfSession::connect(
        client_half,
        Duration::from_secs(2),
        Duration::from_millis(150),
        vec![],
    )
    .await
    .unwrap();

    let start = tokio::time::Instant::now();
    let err = session.execute_rpc("get").await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
    assert!(start.elapsed() >= Duration::from_millis(140));
    assert_eq!(session.state(), SessionState::Failed);

    let err = session.execute_rpc("get").await.unwrap_err();
    assert!(matches!(err, Error::NotConnected(_)));
}

#[test]
fn s5_capability_echo() {
    let cap = CapabilityUri::new(BASE_1_0).unwrap();
    let hello = Hello::new(vec![cap.clone()]);
    let parsed = Hello::parse(&hello.to_xml_string()).unwrap();
    assert_eq!(parsed.capabilities(), &[cap]);

    let empty_hello = Hello::new(vec![]);
    let parsed_empty = Hello::parse(&empty_hello.to_xml_string()).unwrap();
    assert_eq!(parsed_empty.capabilities().len(), 1);
}

#[test]
fn s6_find_value_with_filter() {
    // `find_value`/`find_nodes` walk descendants of the cursor's own
    // element, so the root named in the path ("env") sits one level above
    // the parsed cursor.
    let doc = Xml::parse(
        "<doc><env><item><name>FPC 0</name><t>41</t></item><item><name>RE 0</name><t>55</t></item></env></doc>",
    )
    .unwrap();

    assert_eq!(
        doc.find_value(&["env", "item", "name~RE 0", "t"]),
        Some("55".to_string())
    );
    assert_eq!(doc.find_value(&["env", "item", "name~ABSENT", "t"]), None);
}
