//! Integration tests for the TCP line transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a plain `TcpStream`, so framing is checked against actual bytes
//! on the wire.

use scramble_transport::{Connection, TcpLineTransport, Transport, TransportError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Binds on port 0, connects one client, and returns both ends.
async fn connected_pair(
    max_line_len: Option<usize>,
) -> (scramble_transport::TcpLineConnection, TcpStream) {
    let mut transport = TcpLineTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    if let Some(max) = max_line_len {
        transport = transport.with_max_line_len(max);
    }
    let addr = transport.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let client = TcpStream::connect(addr).await.expect("should connect");
    let conn = server.await.expect("accept task");
    (conn, client)
}

#[tokio::test]
async fn test_send_and_receive_lines() {
    let (conn, client) = connected_pair(None).await;
    let (read, mut write) = client.into_split();
    let mut lines = BufReader::new(read).lines();

    assert!(conn.id().into_inner() > 0);

    conn.send_line(b"Word to unscramble: \"nohtyp\"")
        .await
        .expect("send");
    let got = lines.next_line().await.expect("read").expect("a line");
    assert_eq!(got, "Word to unscramble: \"nohtyp\"");

    write.write_all(b"python\r\nsleep\n").await.unwrap();
    assert_eq!(conn.recv_line().await.unwrap(), Some(b"python".to_vec()));
    assert_eq!(conn.recv_line().await.unwrap(), Some(b"sleep".to_vec()));
}

#[tokio::test]
async fn test_recv_returns_none_on_client_close() {
    let (conn, client) = connected_pair(None).await;
    drop(client);

    let result = conn.recv_line().await.expect("recv should not error");
    assert!(result.is_none(), "should return None on clean close");
}

#[tokio::test]
async fn test_recv_returns_partial_line_before_eof() {
    let (conn, mut client) = connected_pair(None).await;
    client.write_all(b"posix").await.unwrap();
    client.shutdown().await.unwrap();

    assert_eq!(conn.recv_line().await.unwrap(), Some(b"posix".to_vec()));
    assert_eq!(conn.recv_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_recv_rejects_overlong_line() {
    let (conn, mut client) = connected_pair(Some(4)).await;
    client.write_all(b"abcdefgh\n").await.unwrap();

    let result = conn.recv_line().await;
    assert!(matches!(result, Err(TransportError::LineTooLong(4))));
}

#[tokio::test]
async fn test_recv_accepts_line_at_exact_limit() {
    let (conn, mut client) = connected_pair(Some(4)).await;
    client.write_all(b"abcd\n").await.unwrap();

    assert_eq!(conn.recv_line().await.unwrap(), Some(b"abcd".to_vec()));
}

#[tokio::test]
async fn test_close_signals_eof_to_client() {
    let (conn, client) = connected_pair(None).await;
    let mut lines = BufReader::new(client).lines();

    conn.send_line(b"bye").await.unwrap();
    conn.close().await.expect("close");

    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("bye"));
    assert_eq!(lines.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_peer_label_is_client_address() {
    let (conn, client) = connected_pair(None).await;
    let local = client.local_addr().unwrap();
    assert_eq!(conn.peer_label(), local.to_string());
    assert_eq!(conn.peer_addr(), local);
}
