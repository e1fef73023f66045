//! Reference data generator: emits the same CSV wire framing the core
//! accepts, at a configurable rate, to `stdout`.
//!
//! Exists only to fix the wire format precisely for manual testing
//! ; it is not a consumer of the core pipeline.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use tradefeed_codec::{format_message, DataMessage, Op, Payload, TableId};

fn order_payload(seq: u64, price_cents: i64) -> String {
    let fields = [
        format!("ORD{seq}"),
        "AAPL".to_string(),
        if seq % 2 == 0 { "Buy" } else { "Sell" }.to_string(),
        format!("{}.{:02}", price_cents / 100, price_cents % 100),
        "100".to_string(),
        "1705312205123".to_string(),
        "Active".to_string(),
        "Limit".to_string(),
        "Day".to_string(),
        "0".to_string(),
        "0".to_string(),
        "0".to_string(),
        "100".to_string(),
        "0".to_string(),
        "NASDAQ".to_string(),
        "CLIENT1".to_string(),
        "ACC1".to_string(),
        "TRADER1".to_string(),
        "STRAT1".to_string(),
        "PORT1".to_string(),
        "0".to_string(),
        "0".to_string(),
        "LOW".to_string(),
        "0".to_string(),
        "USD".to_string(),
        "150.20".to_string(),
        "150.30".to_string(),
        "150.25".to_string(),
        "5".to_string(),
        "500".to_string(),
        "500".to_string(),
        "150.25".to_string(),
        "1000".to_string(),
        "150.22".to_string(),
    ];
    let mut all: Vec<String> = fields.to_vec();
    for i in 1..=10 {
        all.push(format!("tag{i}"));
    }
    for i in 1..=5 {
        all.push(format!("{i}.0"));
    }
    all.push("0".to_string());
    all.join(",")
}

fn main() {
    let mut args = std::env::args().skip(1);
    let count: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    let interval_ms: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(100);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for seq in 0..count {
        let msg = DataMessage::new(
            TableId::OrderBook,
            Op::Insert,
            1_700_000_000_000 + seq as i64,
            Payload::Row(order_payload(seq, 15025 + seq as i64)),
        );
        out.write_all(format_message(&msg).as_bytes()).unwrap();
        out.flush().unwrap();
        if interval_ms > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }
    }
}
