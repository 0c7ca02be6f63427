//! Agent runtime: one receive task and one send task per agent.
//!
//! The tasks never share anything but the agent itself; queued traffic
//! moves between them through the agent's mailbox.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::agents::Agent;
use crate::error::Error;
use crate::sink::OutboundSink;

/// Stops a running agent; can be held apart from its [`AgentHandle`].
#[derive(Clone)]
pub struct AgentStopper {
    agent: Arc<dyn Agent>,
    stop: Arc<watch::Sender<bool>>,
}

impl AgentStopper {
    /// Stop both tasks. An aggregation cycle in flight is abandoned.
    pub fn shutdown(&self) {
        info!(agent = self.agent.name(), "Agent shutting down");
        let _ = self.stop.send(true);
        self.agent.shutdown();
    }
}

/// Handles for a running agent. Dropping it, together with every
/// [`AgentStopper`] taken from it, stops both tasks.
pub struct AgentHandle {
    stopper: AgentStopper,
    receive: JoinHandle<()>,
    send: JoinHandle<()>,
}

impl AgentHandle {
    pub fn stopper(&self) -> AgentStopper {
        self.stopper.clone()
    }

    /// Stop both tasks. An aggregation cycle in flight is abandoned.
    pub fn shutdown(&self) {
        self.stopper.shutdown();
    }

    /// Wait for both tasks to finish.
    pub async fn join(self) {
        let _ = self.receive.await;
        let _ = self.send.await;
    }

    /// Wait for the send task only; the receive task is stopped afterwards.
    pub async fn join_send(self) {
        let _ = self.send.await;
        let _ = self.stopper.stop.send(true);
        let _ = self.receive.await;
    }
}

/// Start the receive and send tasks for `agent`.
///
/// `inbound` carries raw transport messages; outbound payloads go to `sink`.
pub fn spawn_agent(
    agent: Arc<dyn Agent>,
    inbound: mpsc::UnboundedReceiver<serde_json::Value>,
    sink: Arc<dyn OutboundSink>,
) -> AgentHandle {
    let (stop, stop_rx) = watch::channel(false);

    let receive = tokio::spawn(receive_loop(Arc::clone(&agent), inbound, stop_rx.clone()));
    let send = tokio::spawn(send_loop(Arc::clone(&agent), sink, stop_rx));

    info!(agent = agent.name(), "Agent started");

    AgentHandle {
        stopper: AgentStopper {
            agent,
            stop: Arc::new(stop),
        },
        receive,
        send,
    }
}

async fn receive_loop(
    agent: Arc<dyn Agent>,
    mut inbound: mpsc::UnboundedReceiver<serde_json::Value>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        let raw = tokio::select! {
            raw = inbound.recv() => raw,
            _ = stop.changed() => break,
        };

        let Some(raw) = raw else {
            info!(agent = agent.name(), "Inbound stream ended");
            break;
        };

        match agent.on_receive(raw).await {
            Ok(()) => {}
            Err(Error::Mailbox(e)) => {
                info!(agent = agent.name(), "Receive path stopping: {e}");
                break;
            }
            Err(e) => warn!(agent = agent.name(), "Failed to handle inbound message: {e}"),
        }
    }
}

async fn send_loop(
    agent: Arc<dyn Agent>,
    sink: Arc<dyn OutboundSink>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        let next = tokio::select! {
            next = agent.next_outbound() => next,
            _ = stop.changed() => break,
        };

        match next {
            Ok(Some(payload)) => {
                if let Err(e) = sink.deliver(payload).await {
                    error!(agent = agent.name(), sink = sink.name(), "Delivery failed: {e}");
                    break;
                }
            }
            Ok(None) => {
                info!(agent = agent.name(), "Nothing more to send");
                break;
            }
            Err(Error::Mailbox(e)) => {
                info!(agent = agent.name(), "Send path stopping: {e}");
                break;
            }
            Err(e) => {
                error!(agent = agent.name(), "Send path failed: {e}");
                break;
            }
        }
    }
}
