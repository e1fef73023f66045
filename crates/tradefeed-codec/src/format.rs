//! Encodes a `DataMessage` back to wire framing, for round-trip tests
//! and the reference data generator .

use crate::message::{DataMessage, Payload};

pub fn format_message(msg: &DataMessage) -> String {
    let rest = match &msg.payload {
        Payload::Row(raw) => raw.as_str(),
        Payload::Key(key) => key.as_str(),
    };
    format!(
        "{},{},{},{}\n",
        msg.table.as_str(),
        msg.op.as_str(),
        msg.send_ts_ms,
        rest
    )
}
