//! Integration tests for agents running under the two-task runtime.
//!
//! Each test wires an agent to in-memory inbound/outbound channels and
//! drives it through `spawn_agent`, the same way the binary does with
//! stdin/stdout.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::timeout;

use agent_relay::agents::{Agent, AnswerAgent, QuestionAgent, ReporterAgent};
use agent_relay::config::{AggregatorConfig, CycleConfig};
use agent_relay::message::Payload;
use agent_relay::qa::QaTable;
use agent_relay::runtime::{AgentHandle, spawn_agent};
use agent_relay::sink::ChannelSink;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(30);

const QA_JSON: &str = r#"{
    "What is 2+2?": "4",
    "What is the capital of France?": "Paris",
    "What color is the sky?": "Blue"
}"#;

fn qa() -> Arc<QaTable> {
    Arc::new(QaTable::from_json_str(QA_JSON).unwrap())
}

/// Start `agent`, return (handle, inbound sender, outbound receiver).
fn start(
    agent: Arc<dyn Agent>,
) -> (
    AgentHandle,
    mpsc::UnboundedSender<Value>,
    mpsc::UnboundedReceiver<Payload>,
) {
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let handle = spawn_agent(agent, in_rx, Arc::new(ChannelSink::new("test", out_tx)));
    (handle, in_tx, out_rx)
}

async fn next_payload(rx: &mut mpsc::UnboundedReceiver<Payload>) -> Payload {
    timeout(TEST_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for outbound payload")
        .expect("outbound channel closed")
}

#[tokio::test]
async fn answer_bot_replies_in_one_batch() {
    let agent = Arc::new(AnswerAgent::new(qa(), AggregatorConfig::interactive()));
    let (handle, in_tx, mut out_rx) = start(agent);

    in_tx
        .send(json!({"content": "What is 2+2?", "addr": "127.0.0.1:4001"}))
        .unwrap();
    in_tx
        .send(json!({"content": "What color is the sky?", "addr": "127.0.0.1:4002"}))
        .unwrap();

    let out = next_payload(&mut out_rx).await;
    assert_eq!(
        out,
        Payload::Text(
            "[Response to 127.0.0.1:4001] 4\n[Response to 127.0.0.1:4002] Blue".into()
        )
    );

    handle.shutdown();
    timeout(TEST_TIMEOUT, handle.join()).await.unwrap();
}

#[tokio::test]
async fn answer_bot_stays_silent_on_misses() {
    let agent = Arc::new(AnswerAgent::new(qa(), AggregatorConfig::interactive()));
    let (handle, in_tx, mut out_rx) = start(agent);

    in_tx.send(json!("WHAT IS 2+2?")).unwrap();
    in_tx.send(json!(42)).unwrap();

    let nothing = timeout(Duration::from_millis(200), out_rx.recv()).await;
    assert!(nothing.is_err(), "no reply expected for unknown questions");

    handle.shutdown();
    timeout(TEST_TIMEOUT, handle.join()).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn question_bot_feeds_answer_bot() {
    let asker = Arc::new(
        QuestionAgent::new(
            &qa(),
            CycleConfig {
                pace: Duration::from_secs(1),
            },
        )
        .unwrap(),
    );
    let answerer = Arc::new(AnswerAgent::new(qa(), AggregatorConfig::interactive()));

    let (ask_handle, _ask_in, mut questions) = start(asker);
    let (answer_handle, answer_in, mut answers) = start(answerer);

    let mut replies = Vec::new();
    for _ in 0..4 {
        let Payload::Text(question) = next_payload(&mut questions).await else {
            panic!("question bot sends single text values");
        };
        answer_in.send(Value::String(question)).unwrap();
        replies.push(next_payload(&mut answers).await);
    }

    assert_eq!(
        replies,
        vec![
            Payload::from("4"),
            Payload::from("Paris"),
            Payload::from("Blue"),
            Payload::from("4"),
        ]
    );

    ask_handle.shutdown();
    answer_handle.shutdown();
    ask_handle.join().await;
    answer_handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn reporter_splits_bursts_by_grace_window() {
    let agent = Arc::new(ReporterAgent::new(AggregatorConfig::reporting()));
    let (handle, in_tx, mut out_rx) = start(agent);

    in_tx.send(json!("status ok")).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    in_tx.send(json!(["Warning: disk full", "retrying"])).unwrap();

    let first = next_payload(&mut out_rx).await;
    assert_eq!(
        first,
        Payload::List(vec![
            "status ok".into(),
            "Warning: disk full".into(),
            "retrying".into()
        ])
    );

    tokio::time::sleep(Duration::from_secs(10)).await;
    in_tx.send(json!("late")).unwrap();
    assert_eq!(
        next_payload(&mut out_rx).await,
        Payload::List(vec!["late".into()])
    );

    handle.shutdown();
    handle.join().await;
}
