//! Beacon Nodes - command surface for Beacon nodes
//!
//! This library provides the pieces behind the `beacon-nodes` CLI:
//! - Node directory snapshots from the gateway (live list or pairing list)
//! - Node resolution from ids, addresses, names and id prefixes
//! - A2UI JSONL stream validation
//! - Canvas command dispatch through the gateway
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  beacon-nodes CLI                    │
//! │   nodes list │ canvas present/eval/snapshot │ a2ui   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Dispatcher                        │
//! │   Directory  │  Resolver  │  A2UI validator          │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Beacon Gateway                       │
//! │   node.list  │  node.pair.list  │  node.invoke       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod canvas;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod nodes;

pub use canvas::a2ui::{StreamErrors, StreamSummary, UiMessage, UiVersion, Violation, validate_jsonl};
pub use canvas::{CanvasCommand, Placement, SnapshotFormat, SnapshotPayload};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use gateway::{GatewayClient, HttpGatewayClient};
pub use nodes::{NodeRecord, fetch_directory, normalize_node_key, resolve_node};
