//! Integration tests for the Scramble server, handler, and full connection flow.

use std::net::SocketAddr;
use std::time::Duration;

use scramble::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::task::JoinHandle;

// =========================================================================
// Mock word provider
// =========================================================================

struct FixedWord;

impl WordProvider for FixedWord {
    fn next_pair(&self) -> WordPair {
        WordPair {
            plain: "python".into(),
            scrambled: "nohtyp".into(),
        }
    }
}

const CONNECTED: &str = "You're now connected to the server";
const DISCONNECTED: &str = "You're now disconnected to the server! Press Ctrl-D to exit...";
const WORD: &str = "Word to unscramble: \"nohtyp\"";

// =========================================================================
// Helpers
// =========================================================================

struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    task: JoinHandle<Result<(), ScrambleError>>,
}

/// Starts a server on a random port.
async fn start_server(room_config: RoomConfig) -> TestServer {
    let server = ScrambleServer::builder()
        .bind("127.0.0.1:0")
        .room_config(room_config)
        .words(FixedWord)
        .build()
        .await
        .expect("server should build");

    let addr = server.local_addr().expect("should have local addr");
    let shutdown = server.shutdown_handle();
    let task = tokio::spawn(server.run());

    TestServer {
        addr,
        shutdown,
        task,
    }
}

struct Client {
    /// The label the server uses for this player.
    label: String,
    lines: Lines<BufReader<OwnedReadHalf>>,
    write: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("should connect");
        let label = stream.local_addr().expect("local addr").to_string();
        let (read, write) = stream.into_split();
        Self {
            label,
            lines: BufReader::new(read).lines(),
            write,
        }
    }

    /// Connects and waits until the player is seated in a room.
    async fn join(addr: SocketAddr) -> Self {
        let mut client = Self::connect(addr).await;
        client.expect(CONNECTED).await;
        let joined = format!("New user connected! {}", client.label);
        client.expect(&joined).await;
        client
    }

    async fn send(&mut self, line: &str) {
        self.write
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("send");
    }

    async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read failed")
    }

    async fn expect(&mut self, line: &str) {
        assert_eq!(self.recv().await.as_deref(), Some(line));
    }

    async fn expect_eof(&mut self) {
        assert_eq!(self.recv().await, None);
    }

    /// Asserts nothing arrives for a short while.
    async fn expect_silence(&mut self) {
        let result =
            tokio::time::timeout(Duration::from_millis(150), self.lines.next_line()).await;
        assert!(result.is_err(), "unexpected line: {result:?}");
    }
}

/// Seats two players in a fresh room and consumes the round-start lines.
async fn start_pair(addr: SocketAddr) -> (Client, Client) {
    let mut a = Client::join(addr).await;
    let mut b = Client::join(addr).await;
    a.expect(&format!("New user connected! {}", b.label)).await;
    a.expect(WORD).await;
    b.expect(WORD).await;
    (a, b)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_pair_plays_and_first_correct_guess_wins() {
    let server = start_server(RoomConfig::default()).await;
    let (mut a, mut b) = start_pair(server.addr).await;

    a.send("python").await;

    let win = format!("Player {} wins: python", a.label);
    for client in [&mut a, &mut b] {
        client.expect(&win).await;
        client.expect(DISCONNECTED).await;
        client.expect_eof().await;
    }
}

#[tokio::test]
async fn test_wrong_guesses_exhaust_budget_and_disconnect_only_the_guesser() {
    let server = start_server(RoomConfig::default()).await;
    let (mut a, mut b) = start_pair(server.addr).await;

    for _ in 0..5 {
        a.send("pyhton").await;
    }

    for remaining in (0..5).rev() {
        a.expect("Wrong! Try again...").await;
        a.expect(&format!("Remaining guesses: {remaining}")).await;
    }
    a.expect("Your attempts have ended!").await;
    a.expect(DISCONNECTED).await;
    a.expect_eof().await;

    let miss = format!("Client {} missed the guess: pyhton", a.label);
    for _ in 0..5 {
        b.expect(&miss).await;
    }
    b.expect(&format!("Client disconnected! {}", a.label)).await;

    // B is still playing and can still win.
    b.send("python").await;
    b.expect(&format!("Player {} wins: python", b.label)).await;
    b.expect(DISCONNECTED).await;
    b.expect_eof().await;
}

#[tokio::test]
async fn test_third_player_gets_a_new_room() {
    let server = start_server(RoomConfig::default()).await;
    let (mut a, _b) = start_pair(server.addr).await;

    let mut c = Client::join(server.addr).await;
    c.expect_silence().await;
    a.expect_silence().await;

    let d = Client::join(server.addr).await;
    c.expect(&format!("New user connected! {}", d.label)).await;
    c.expect(WORD).await;
}

#[tokio::test]
async fn test_guess_before_round_starts_is_ignored() {
    let server = start_server(RoomConfig::default()).await;
    let mut a = Client::join(server.addr).await;

    a.send("python").await;
    a.expect_silence().await;

    let b = Client::join(server.addr).await;
    a.expect(&format!("New user connected! {}", b.label)).await;
    a.expect(WORD).await;
}

#[tokio::test]
async fn test_server_full_rejects_connection() {
    let server = start_server(RoomConfig {
        max_rooms: 1,
        ..RoomConfig::default()
    })
    .await;
    let (_a, _b) = start_pair(server.addr).await;

    let mut c = Client::connect(server.addr).await;
    c.expect(CONNECTED).await;
    c.expect("The server is full!").await;
    c.expect_eof().await;
}

#[tokio::test]
async fn test_client_hangup_is_announced_to_room() {
    let server = start_server(RoomConfig::default()).await;
    let (mut a, b) = start_pair(server.addr).await;

    let label = b.label.clone();
    drop(b);

    a.expect(&format!("Client disconnected! {label}")).await;
}

#[tokio::test]
async fn test_overlong_line_drops_only_that_client() {
    let server = ScrambleServer::builder()
        .bind("127.0.0.1:0")
        .max_line_len(16)
        .words(FixedWord)
        .build()
        .await
        .expect("server should build");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(server.run());

    let (mut a, mut b) = start_pair(addr).await;
    a.send(&"x".repeat(64)).await;

    a.expect(DISCONNECTED).await;
    a.expect_eof().await;
    b.expect(&format!("Client disconnected! {}", a.label)).await;
}

#[tokio::test]
async fn test_shutdown_disconnects_everyone_and_stops_server() {
    let server = start_server(RoomConfig::default()).await;
    let (mut a, mut b) = start_pair(server.addr).await;
    let mut c = Client::join(server.addr).await;

    server.shutdown.trigger();

    for client in [&mut a, &mut b, &mut c] {
        client.expect(DISCONNECTED).await;
        client.expect_eof().await;
    }
    let result = tokio::time::timeout(Duration::from_secs(2), server.task)
        .await
        .expect("server should stop")
        .expect("server task should not panic");
    assert!(result.is_ok());
}
