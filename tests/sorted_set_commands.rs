//! End-to-end tests against a scripted RESP server
//!
//! Each test spawns a single-connection TCP server that parses incoming
//! request frames and answers each one with the next canned reply, so the
//! full marshalling path (command builder, serializer, socket, reply parser,
//! demarshalling) is exercised without a real Redis instance.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use zedis::protocol::{RespFrame, RespParser};
use zedis::{Connection, ConnectionConfig, SortedSetCommands, ZedisError};

/// Spawn a server that answers each parsed request with the next scripted
/// reply and reports every request frame it saw.
fn scripted_server(replies: Vec<Vec<u8>>) -> (u16, mpsc::Receiver<RespFrame>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut parser = RespParser::new();
        let mut replies = replies.into_iter();
        let mut buf = [0u8; 4096];

        'outer: loop {
            let n = match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            parser.feed(&buf[..n]);
            while let Some(frame) = parser.parse().unwrap() {
                tx.send(frame).unwrap();
                match replies.next() {
                    Some(reply) => stream.write_all(&reply).unwrap(),
                    None => break 'outer,
                }
            }
        }
    });

    (port, rx)
}

/// Flatten a request frame (array of bulk strings) into its arguments
fn request_args(frame: &RespFrame) -> Vec<String> {
    match frame {
        RespFrame::Array(Some(elements)) => elements
            .iter()
            .map(|element| match element {
                RespFrame::BulkString(Some(bytes)) => {
                    String::from_utf8(bytes.clone()).unwrap()
                }
                other => panic!("unexpected request element: {:?}", other),
            })
            .collect(),
        other => panic!("request was not an array: {:?}", other),
    }
}

fn connect(port: u16) -> Connection {
    Connection::connect(&ConnectionConfig::new("127.0.0.1", port)).unwrap()
}

#[test]
fn add_then_score_then_pop_over_the_wire() {
    let (port, rx) = scripted_server(vec![
        b":1\r\n".to_vec(),                   // ZADD
        b"$3\r\n1.5\r\n".to_vec(),            // ZSCORE
        b"*1\r\n$5\r\nalice\r\n".to_vec(),    // ZRANGE 0 0
        b":1\r\n".to_vec(),                   // ZREM
    ]);
    let mut conn = connect(port);

    assert!(conn.add_item("zs", "alice", 1.5).unwrap());
    assert_eq!(conn.item_score("zs", "alice").unwrap(), Some(1.5));
    assert_eq!(
        conn.pop_item_with_lowest_score("zs").unwrap(),
        Some("alice".to_string())
    );

    assert_eq!(request_args(&rx.recv().unwrap()), ["ZADD", "zs", "1.5", "alice"]);
    assert_eq!(request_args(&rx.recv().unwrap()), ["ZSCORE", "zs", "alice"]);
    assert_eq!(request_args(&rx.recv().unwrap()), ["ZRANGE", "zs", "0", "0"]);
    assert_eq!(request_args(&rx.recv().unwrap()), ["ZREM", "zs", "alice"]);
}

#[test]
fn auth_and_select_are_sent_on_connect() {
    let (port, rx) = scripted_server(vec![
        b"+OK\r\n".to_vec(),   // AUTH
        b"+OK\r\n".to_vec(),   // SELECT
        b"+PONG\r\n".to_vec(), // PING
    ]);

    let mut config = ConnectionConfig::new("127.0.0.1", port);
    config.password = Some("sekret".to_string());
    config.db = 2;

    let mut conn = Connection::connect(&config).unwrap();
    conn.ping().unwrap();

    assert_eq!(request_args(&rx.recv().unwrap()), ["AUTH", "sekret"]);
    assert_eq!(request_args(&rx.recv().unwrap()), ["SELECT", "2"]);
    assert_eq!(request_args(&rx.recv().unwrap()), ["PING"]);
}

#[test]
fn add_range_pipelines_in_one_round_trip() {
    let (port, rx) = scripted_server(vec![
        b":1\r\n".to_vec(),
        b":1\r\n".to_vec(),
        b":0\r\n".to_vec(),
    ]);
    let mut conn = connect(port);

    assert!(conn.add_range("zs", &["a", "b", "c"], 2.0).unwrap());

    assert_eq!(request_args(&rx.recv().unwrap()), ["ZADD", "zs", "2", "a"]);
    assert_eq!(request_args(&rx.recv().unwrap()), ["ZADD", "zs", "2", "b"]);
    assert_eq!(request_args(&rx.recv().unwrap()), ["ZADD", "zs", "2", "c"]);
}

#[test]
fn range_with_scores_round_trip() {
    let (port, rx) = scripted_server(vec![
        b"*4\r\n$1\r\na\r\n$1\r\n1\r\n$1\r\nb\r\n$3\r\n2.5\r\n".to_vec(),
    ]);
    let mut conn = connect(port);

    let pairs = conn.all_with_scores("zs").unwrap();
    assert_eq!(
        pairs,
        vec![("a".to_string(), 1.0), ("b".to_string(), 2.5)]
    );
    assert_eq!(
        request_args(&rx.recv().unwrap()),
        ["ZRANGE", "zs", "0", "-1", "WITHSCORES"]
    );
}

#[test]
fn server_error_reply_becomes_server_error() {
    let (port, _rx) = scripted_server(vec![
        b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec(),
    ]);
    let mut conn = connect(port);

    let err = conn.set_len("not-a-zset").unwrap_err();
    assert!(matches!(err, ZedisError::Server(msg) if msg.starts_with("WRONGTYPE")));
}
