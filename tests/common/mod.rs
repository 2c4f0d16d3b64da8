//! Shared fixtures for the integration tests.
//!
//! `PriceServer` is a minimal HTTP/1.1 responder on a loopback port that
//! answers every request with one canned status and body, and records the
//! request targets so tests can assert on what was asked for.

#![allow(dead_code)]

use coinfolio::{AliasResolver, Coinfolio, NewHolding, QuoteClient};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct PriceServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl PriceServer {
    /// Answer every request with `status` and `body`.
    pub fn start(status: u16, body: &str) -> Self {
        Self::spawn(Some((status, body.to_string())))
    }

    /// Accept connections but never answer, to exercise client timeouts.
    pub fn silent() -> Self {
        Self::spawn(None)
    }

    fn spawn(reply: Option<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) if line == "\r\n" => break,
                        Ok(_) => continue,
                        Err(_) => break,
                    }
                }
                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_string();
                log.lock().unwrap().push(target);

                match &reply {
                    Some((status, body)) => {
                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\n\
                             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason_phrase(*status),
                            body.len(),
                            body
                        );
                        let _ = stream.write_all(response.as_bytes());
                        let _ = stream.flush();
                    }
                    // keep the socket open so the client waits
                    None => held.push(stream),
                }
            }
        });

        Self {
            base_url: format!("http://{}/api/v3", addr),
            requests,
        }
    }

    /// Request targets (path + query) received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// The decoded `ids` query values of every request received so far.
    pub fn requested_ids(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|target| {
                let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");
                query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("ids="))
                    .unwrap_or("")
                    .replace("%2C", ",")
                    .replace("%2c", ",")
            })
            .collect()
    }

    pub fn client(&self) -> QuoteClient {
        QuoteClient::new(&self.base_url, Duration::from_secs(5), AliasResolver::default()).unwrap()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// A base URL on a loopback port nothing is listening on.
pub fn unreachable_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v3", addr)
}

/// In-memory app whose price requests go to `base_url`.
pub fn app_with_prices(base_url: &str) -> Coinfolio {
    Coinfolio::builder()
        .in_memory()
        .price_api_base(base_url)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

pub fn lot(coin: &str, amount: f64, buy_price: f64) -> NewHolding {
    NewHolding {
        coin: coin.to_string(),
        amount,
        buy_price,
    }
}
