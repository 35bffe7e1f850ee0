//! Loopback HTTP stand-in for the classifier service, shared by tests.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;

/// Spawn a listener that answers exactly one request with `response` and
/// then exits. Returns the endpoint URL and a channel carrying the raw
/// request bytes for inspection.
pub fn serve_once(response: String) -> (String, mpsc::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let (request_tx, request_rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let request = read_request(&mut stream);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
            let _ = request_tx.send(request);
        }
    });

    (format!("http://{addr}/predict"), request_rx)
}

/// Build a canned HTTP/1.1 response with a JSON body.
pub fn json_response(status: u16, body: &str) -> String {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        _ => "Status",
    };
    format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Read the request head plus a Content-Length-delimited body.
fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut buf = [0u8; 4096];

    let head_end = loop {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return bytes,
            Ok(read) => bytes.extend_from_slice(&buf[..read]),
        }
        if let Some(pos) = find_head_end(&bytes) {
            break pos;
        }
    };

    let body_len = content_length(&bytes[..head_end]).unwrap_or(0);
    while bytes.len() < head_end + body_len {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(read) => bytes.extend_from_slice(&buf[..read]),
        }
    }
    bytes
}

fn find_head_end(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

fn content_length(head: &[u8]) -> Option<usize> {
    let text = String::from_utf8_lossy(head);
    for line in text.lines() {
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                return value.trim().parse().ok();
            }
        }
    }
    None
}
