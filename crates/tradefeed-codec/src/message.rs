//! `DataMessage`: the decoded unit of work that flows from transport to
//! applier, decorated with its six lifecycle timestamps .

use crate::schema::TableId;

/// The mutating operation a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Insert,
    Update,
    Delete,
}

impl Op {
    /// Parses the wire token, defaulting unknown values to `Insert`
    /// .
    pub fn parse(s: &str) -> Op {
        match s {
            "Update" => Op::Update,
            "Delete" => Op::Delete,
            _ => Op::Insert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Insert => "Insert",
            Op::Update => "Update",
            Op::Delete => "Delete",
        }
    }
}

/// The message payload: a full row for insert/update, or just the
/// business key for delete.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw, unparsed 50-field CSV text (row parsing happens at apply
    /// time in `tradefeed-table`/`tradefeed-applier`, per spec §4.1
    /// "rest is passed unsplit to the row parser").
    Row(String),
    Key(String),
}

/// A single decoded wire event, decorated with its lifecycle
/// timestamps as it moves through the pipeline .
#[derive(Debug, Clone, PartialEq)]
pub struct DataMessage {
    pub table: TableId,
    pub op: Op,
    pub send_ts_ms: i64,
    pub payload: Payload,

    pub receive_ts_ms: Option<i64>,
    pub queue_ts_ms: Option<i64>,
    pub apply_ts_ms: Option<i64>,
    pub render_start_ts_ms: Option<i64>,
    pub render_end_ts_ms: Option<i64>,
}

impl DataMessage {
    pub fn new(table: TableId, op: Op, send_ts_ms: i64, payload: Payload) -> Self {
        Self {
            table,
            op,
            send_ts_ms,
            payload,
            receive_ts_ms: None,
            queue_ts_ms: None,
            apply_ts_ms: None,
            render_start_ts_ms: None,
            render_end_ts_ms: None,
        }
    }

    /// Business key for a delete; for insert/update this requires
    /// parsing the row first (column 0), so it is not derivable here.
    pub fn delete_key(&self) -> Option<&str> {
        match (&self.op, &self.payload) {
            (Op::Delete, Payload::Key(k)) => Some(k.as_str()),
            _ => None,
        }
    }
}
