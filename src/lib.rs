//! Agent Relay: bounded-latency batching core for message agents.

pub mod agents;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod message;
pub mod qa;
pub mod questions;
pub mod runtime;
pub mod sink;
