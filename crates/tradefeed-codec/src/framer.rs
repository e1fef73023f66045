//! Newline-delimited framing over a byte stream .
//!
//! A partial trailing fragment is preserved across reads until the
//! next `\n` arrives. One `Framer` is created per connection; it
//! shares a process-wide `ParseErrorCounter` with every other
//! connection and the applier.

use crate::error::ParseErrorCounter;
use crate::message::{DataMessage, Op, Payload};
use crate::schema::TableId;

pub struct Framer {
    carry: Vec<u8>,
    errors: ParseErrorCounter,
}

impl Framer {
    pub fn new(errors: ParseErrorCounter) -> Self {
        Self {
            carry: Vec::new(),
            errors,
        }
    }

    /// Feeds newly-read bytes in, returning every fully-framed
    /// `DataMessage` decoded from this call plus whatever was carried
    /// over from a previous call. A trailing partial frame (no `\n`
    /// yet) is retained in `self.carry`.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<DataMessage> {
        self.carry.extend_from_slice(bytes);

        let mut messages = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.carry[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            let line = String::from_utf8_lossy(&self.carry[start..end]).into_owned();
            start = end + 1;
            if let Some(msg) = self.decode_line(&line) {
                messages.push(msg);
            }
        }
        self.carry.drain(..start);
        messages
    }

    fn decode_line(&self, line: &str) -> Option<DataMessage> {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            return None;
        }
        // JSON frames are reserved (§4.1) but not required; this
        // implementation only accepts CSV, which is mandatory.
        if line.starts_with('{') {
            self.errors.increment();
            return None;
        }

        let parts: Vec<&str> = line.splitn(4, ',').collect();
        if parts.len() != 4 {
            self.errors.increment();
            return None;
        }
        let table = TableId::parse(parts[0]);
        let op = Op::parse(parts[1]);
        let send_ts_ms: i64 = match parts[2].trim().parse() {
            Ok(v) => v,
            Err(_) => {
                self.errors.increment();
                return None;
            }
        };
        let payload = match op {
            Op::Delete => Payload::Key(parts[3].to_string()),
            Op::Insert | Op::Update => Payload::Row(parts[3].to_string()),
        };

        Some(DataMessage::new(table, op, send_ts_ms, payload))
    }
}
