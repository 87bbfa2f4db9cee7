//! Tests for the socket listener.

use std::io::Read;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use super::listener::SocketListener;
use super::{ConnectionHandler, ListenerError, PeerRecorder};

#[fixture]
fn recorder() -> Arc<PeerRecorder> {
    Arc::new(PeerRecorder::default())
}

fn wait_for_peers(recorder: &PeerRecorder, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if recorder.peers().len() >= expected {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

fn greeting(mut stream: TcpStream) -> String {
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("set read timeout");
    let mut text = String::new();
    stream.read_to_string(&mut text).expect("read greeting");
    text
}

#[rstest]
fn each_connection_reaches_the_handler_with_its_peer(recorder: Arc<PeerRecorder>) {
    let listener = SocketListener::bind("127.0.0.1", 0).expect("bind tcp listener");
    let addr = listener.local_addr();
    assert_ne!(addr.port(), 0, "ephemeral port should be resolved");
    let handler: Arc<dyn ConnectionHandler> = Arc::clone(&recorder) as Arc<dyn ConnectionHandler>;
    let handle = listener.start(handler).expect("start listener");

    let first = TcpStream::connect(addr).expect("connect first client");
    let second = TcpStream::connect(addr).expect("connect second client");
    let first_local: SocketAddr = first.local_addr().expect("first local addr");
    let second_local: SocketAddr = second.local_addr().expect("second local addr");

    assert_eq!(greeting(first), first_local.to_string());
    assert_eq!(greeting(second), second_local.to_string());
    assert!(wait_for_peers(&recorder, 2), "expected two connections");
    let peers = recorder.peers();
    assert!(peers.contains(&first_local) && peers.contains(&second_local));

    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn stopped_listener_accepts_no_new_work(recorder: Arc<PeerRecorder>) {
    let listener = SocketListener::bind("127.0.0.1", 0).expect("bind tcp listener");
    let addr = listener.local_addr();
    let handle = listener
        .start(Arc::clone(&recorder) as Arc<dyn ConnectionHandler>)
        .expect("start listener");
    handle.shutdown();
    handle.join().expect("join listener");

    let _ = TcpStream::connect_timeout(&addr, Duration::from_millis(200));
    std::thread::sleep(Duration::from_millis(100));
    assert!(recorder.peers().is_empty());
}

#[rstest]
fn binding_an_occupied_port_fails() {
    let occupied = TcpListener::bind("127.0.0.1:0").expect("bind occupant");
    let port = occupied.local_addr().expect("occupant address").port();
    let error = SocketListener::bind("127.0.0.1", port).expect_err("port is taken");
    assert!(matches!(error, ListenerError::BindTcp { .. }));
}

#[rstest]
fn unresolvable_hosts_are_reported() {
    let error = SocketListener::bind("host.invalid", 7345).expect_err("should not resolve");
    assert!(matches!(
        error,
        ListenerError::Resolve { .. } | ListenerError::ResolveEmpty { .. }
    ));
}
