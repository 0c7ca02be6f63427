use std::sync::Arc;

use agent_relay::agents::{Agent, AnswerAgent, ChatAgent, QuestionAgent, ReporterAgent};
use agent_relay::config::{AgentKind, RelayConfig};
use agent_relay::qa::QaTable;
use agent_relay::runtime::spawn_agent;
use agent_relay::sink::StdoutSink;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env()?;

    eprintln!("Agent Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Agent: {}", config.agent.name());
    eprintln!("   Grace period: {:?}", config.aggregator.grace_period);
    eprintln!("   Each stdin line is one inbound message (JSON or plain text).\n");

    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (chat_tx, chat_rx) = mpsc::unbounded_channel();

    let agent: Arc<dyn Agent> = match config.agent {
        AgentKind::Answer => {
            let qa = Arc::new(QaTable::load(&config.qa_path)?);
            Arc::new(AnswerAgent::new(qa, config.aggregator))
        }
        AgentKind::Question => {
            let qa = QaTable::load(&config.qa_path)?;
            Arc::new(QuestionAgent::new(&qa, config.cycle)?)
        }
        AgentKind::Reporter => Arc::new(ReporterAgent::new(config.aggregator)),
        AgentKind::Chat => Arc::new(ChatAgent::new(chat_rx)),
    };

    // Chat lines are what the operator sends; for every other agent stdin
    // stands in for the transport's inbound side.
    let is_chat = config.agent == AgentKind::Chat;
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            if is_chat {
                eprint!("s> ");
            }
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let sent = if is_chat {
                        chat_tx.send(line).is_ok()
                    } else {
                        let raw = serde_json::from_str(&line)
                            .unwrap_or(serde_json::Value::String(line));
                        inbound_tx.send(raw).is_ok()
                    };
                    if !sent {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    let handle = spawn_agent(agent, inbound_rx, Arc::new(StdoutSink));
    let stopper = handle.stopper();

    // Exit on ctrl-c, or as soon as the agent has nothing more to send
    // (the chat agent after stdin EOF).
    let finished = handle.join_send();
    tokio::pin!(finished);
    let interrupted = tokio::select! {
        _ = &mut finished => false,
        result = tokio::signal::ctrl_c() => {
            result?;
            true
        }
    };
    if interrupted {
        stopper.shutdown();
        finished.await;
    }

    Ok(())
}
