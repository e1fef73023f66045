use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tradefeed_applier::{Applier, BatchConfig};
use tradefeed_codec::{now_ms, DataMessage, Op, ParseErrorCounter, Payload, TableId};
use tradefeed_ring::Config;
use tradefeed_ring_stream::channel;
use tradefeed_table::Table;

fn order_payload(id: &str, symbol: &str) -> String {
    let mut fields = vec![id.to_string(), symbol.to_string(), "Buy".to_string()];
    fields.resize(50, String::new());
    fields.join(",")
}

#[tokio::test]
async fn applies_inserts_and_emits_batch_applied_on_timeout() {
    let order_table = Arc::new(Table::new());
    let trade_table = Arc::new(Table::new());
    let applier = Applier::new(
        order_table.clone(),
        trade_table.clone(),
        BatchConfig {
            batch_size: 1_000,
            batch_timeout: Duration::from_millis(30),
        },
        None,
        ParseErrorCounter::new(),
    );
    let mut events = applier.subscribe();

    let (factory, receiver) = channel::<DataMessage>(Config::new(14, 2, false));
    let sender = factory.register().unwrap();

    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let run_handle = tokio::spawn(async move { applier.run(receiver, run_cancel).await });

    let mut msg = DataMessage::new(
        TableId::OrderBook,
        Op::Insert,
        now_ms(),
        Payload::Row(order_payload("ORD1", "AAPL")),
    );
    msg.receive_ts_ms = Some(now_ms());
    msg.queue_ts_ms = Some(now_ms());
    sender.send(msg).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.order_inserted, 1);
    assert_eq!(event.total, 1);
    assert!(order_table.row_by_key("ORD1").is_some());

    cancel.cancel();
    let _ = run_handle.await;
}

#[tokio::test]
async fn later_message_in_a_batch_wins_over_earlier_same_key_message() {
    let order_table = Arc::new(Table::new());
    let trade_table = Arc::new(Table::new());
    let applier = Applier::new(
        order_table.clone(),
        trade_table.clone(),
        BatchConfig {
            batch_size: 2,
            batch_timeout: Duration::from_secs(5),
        },
        None,
        ParseErrorCounter::new(),
    );
    let mut events = applier.subscribe();

    let (factory, receiver) = channel::<DataMessage>(Config::new(14, 2, false));
    let sender = factory.register().unwrap();

    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let run_handle = tokio::spawn(async move { applier.run(receiver, run_cancel).await });

    for symbol in ["AAPL", "MSFT"] {
        let mut msg = DataMessage::new(
            TableId::OrderBook,
            Op::Insert,
            now_ms(),
            Payload::Row(order_payload("ORD1", symbol)),
        );
        msg.receive_ts_ms = Some(now_ms());
        msg.queue_ts_ms = Some(now_ms());
        sender.send(msg).await.unwrap();
    }

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();
    // Last-writer-wins on the *final table state*, but each message still
    // attributes to its own counter: the first Insert for ORD1 lands as an
    // insert, the second (same key) lands as an update, so the six counters
    // still sum to `total` per spec §8's batching law.
    assert_eq!(event.order_inserted, 1);
    assert_eq!(event.order_updated, 1);
    assert_eq!(event.total, 2);
    assert_eq!(
        event.order_inserted + event.order_updated + event.order_deleted,
        event.total
    );
    let row = order_table.row_by_key("ORD1").unwrap();
    assert_eq!(row[1].to_string(), "MSFT");

    cancel.cancel();
    let _ = run_handle.await;
}

#[tokio::test]
async fn later_delete_in_a_batch_cancels_an_earlier_staged_insert_for_the_same_key() {
    let order_table = Arc::new(Table::new());
    let trade_table = Arc::new(Table::new());
    let applier = Applier::new(
        order_table.clone(),
        trade_table.clone(),
        BatchConfig {
            batch_size: 2,
            batch_timeout: Duration::from_secs(5),
        },
        None,
        ParseErrorCounter::new(),
    );
    let mut events = applier.subscribe();

    let (factory, receiver) = channel::<DataMessage>(Config::new(14, 2, false));
    let sender = factory.register().unwrap();

    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let run_handle = tokio::spawn(async move { applier.run(receiver, run_cancel).await });

    let mut insert = DataMessage::new(
        TableId::OrderBook,
        Op::Insert,
        now_ms(),
        Payload::Row(order_payload("ORD1", "AAPL")),
    );
    insert.receive_ts_ms = Some(now_ms());
    insert.queue_ts_ms = Some(now_ms());
    sender.send(insert).await.unwrap();

    let mut delete = DataMessage::new(
        TableId::OrderBook,
        Op::Delete,
        now_ms(),
        Payload::Key("ORD1".to_string()),
    );
    delete.receive_ts_ms = Some(now_ms());
    delete.queue_ts_ms = Some(now_ms());
    sender.send(delete).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.total, 2);
    // The batch's last operation on ORD1 is a Delete: the table must end
    // with no row for it, not a resurrected Insert from earlier staging.
    assert!(order_table.row_by_key("ORD1").is_none());
    assert!(order_table.alive_rows().is_empty());

    cancel.cancel();
    let _ = run_handle.await;
}

#[tokio::test]
async fn shutdown_drains_and_applies_a_final_batch() {
    let order_table = Arc::new(Table::new());
    let trade_table = Arc::new(Table::new());
    let applier = Applier::new(
        order_table.clone(),
        trade_table.clone(),
        BatchConfig {
            batch_size: 1_000,
            batch_timeout: Duration::from_secs(5),
        },
        None,
        ParseErrorCounter::new(),
    );
    let mut events = applier.subscribe();

    let (factory, receiver) = channel::<DataMessage>(Config::new(14, 2, false));
    let sender = factory.register().unwrap();

    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let run_handle = tokio::spawn(async move { applier.run(receiver, run_cancel).await });

    let mut msg = DataMessage::new(
        TableId::OrderBook,
        Op::Insert,
        now_ms(),
        Payload::Row(order_payload("ORD1", "AAPL")),
    );
    msg.receive_ts_ms = Some(now_ms());
    msg.queue_ts_ms = Some(now_ms());
    sender.send(msg).await.unwrap();

    // Give the message a moment to land in the ring before shutdown.
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.order_inserted, 1);

    let _ = tokio::time::timeout(Duration::from_secs(1), run_handle)
        .await
        .unwrap();
}
