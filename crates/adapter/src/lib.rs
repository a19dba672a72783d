//! Adapter module - external control via TCP socket with JSON protocol
//!
//! This module lets an external agent (a bot, a test harness, a remote UI)
//! drive a [`GameSession`](crate::core::GameSession) over a TCP socket. The
//! server never touches the session itself: it parses and validates lines,
//! then queues commands for whichever thread owns the session.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Commanding**: Client sends `command` lines, each answered by an `ack`
//! 4. **Observation Streaming**: Clients that asked for it receive an
//!    `observation` whenever the session changes
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: One session action: `start`, `toggle`, `tick`, `pause`, `resume`, `reset`
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with server capabilities
//! - **ack**: Command acknowledgment (`ok` or `ignored`, plus the selection outcome for `toggle`)
//! - **observation**: Full session snapshot (tiles, target, selection, countdown, events)
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `SUMFALL_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `SUMFALL_AI_PORT`: Port number (default: 7878)
//! - `SUMFALL_AI_MAX_PENDING`: Command queue depth before `backpressure` errors (default: 10)
//! - `SUMFALL_AI_LOG_PATH`: Append every wire line to this file
//! - `SUMFALL_AI_DISABLED`: Set to "1" or "true" to disable adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","client_id":1,...}
//! Client -> Server: {"type":"command","seq":2,"ts":1234567891,"action":"start","mode":"turnBased"}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567891,"status":"ok"}
//! Server -> Client: {"type":"observation","seq":2,"ts":1234567891,"target":17,"tiles":[...],...}
//! Client -> Server: {"type":"command","seq":3,"ts":1234567892,"action":"toggle","tile_id":4}
//! Server -> Client: {"type":"ack","seq":3,"ts":1234567892,"status":"ok","outcome":{"kind":"under","sum":6}}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use sumfall_core as core;
pub use sumfall_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{apply_inbound, Adapter, ClientCommand, InboundCommand, OutboundMessage};
pub use server::*;
