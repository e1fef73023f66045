//! Transport-agnostic wire codec for the trading-data feed.
//!
//! Parses newline-delimited CSV frames into typed [`DataMessage`]s and
//! formats them back for round-trip testing and the reference data
//! generator. Framing, permissive table/op defaulting, and the 50-field
//! row parser all live here .

mod cell;
mod error;
mod format;
mod framer;
mod message;
mod row;
mod schema;
mod time;

pub use cell::{Cell, Decimal};
pub use error::{CodecError, ParseErrorCounter};
pub use format::format_message;
pub use framer::Framer;
pub use message::{DataMessage, Op, Payload};
pub use row::{format_row, parse_row, Row};
pub use schema::{ColumnType, TableId, ORDER_BOOK_SCHEMA, ROW_WIDTH, TRADE_BOOK_SCHEMA};
pub use time::now_ms;
