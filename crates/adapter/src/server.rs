//! TCP server for the control adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, OutboundMessage};
use crate::types::{SessionCommand, TileId};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Append every wire line (both directions) to this file
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("SUMFALL_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("SUMFALL_AI_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let max_pending_commands = env::var("SUMFALL_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        let log_path = env::var("SUMFALL_AI_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: Arc<RwLock<Vec<ClientHandle>>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("SUMFALL_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    /// Channel to send lines to the client
    pub tx: mpsc::UnboundedSender<String>,
}

async fn is_handshaken(state: &ServerState, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

/// Enforce strictly increasing seq per client; records `seq` when accepted.
async fn check_and_update_seq(state: &ServerState, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = match config.log_path.clone() {
        Some(path) => Some(spawn_wire_log(path).await?),
        None => None,
    };

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(line);
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(line.clone());
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, addr = %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, &state, command_tx, wire_log_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            state.clients.write().await.retain(|c| c.id != client_id);
            info!(client_id, "client disconnected");
        });
    }
}

/// Open the wire log and return a channel feeding it
async fn spawn_wire_log(path: String) -> anyhow::Result<mpsc::UnboundedSender<String>> {
    use tokio::fs::OpenOptions;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .with_context(|| format!("failed to open wire log {}", path))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if file.write_all(line.as_bytes()).await.is_err() || file.write_all(b"\n").await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    Ok(tx)
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<String>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    // Spawn task to write lines to client
    let wire_log_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
            if let Some(log) = wire_log_out.as_ref() {
                let _ = log.send(line);
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            // Client disconnected
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(log) = wire_log_tx.as_ref() {
            let _ = log.send(trimmed.to_string());
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if is_handshaken(state, client_id).await
                    && !check_and_update_seq(state, client_id, hello.seq).await
                {
                    send_json(&tx, &create_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    ));
                    continue;
                }

                if major_version(&hello.protocol_version) != major_version(&state.config.protocol_version) {
                    send_json(&tx, &create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    ));
                    break;
                }

                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                }

                debug!(client_id, name = %hello.client.name, "handshake complete");
                send_json(&tx, &create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                ));

                // Request an immediate snapshot for this client if desired.
                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        command: ClientCommand::Observe,
                    });
                }
            }
            Ok(ParsedMessage::Command(cmd)) => {
                if !is_handshaken(state, client_id).await {
                    send_json(&tx, &create_error(
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "hello required before commands",
                    ));
                    continue;
                }
                if !check_and_update_seq(state, client_id, cmd.seq).await {
                    send_json(&tx, &create_error(
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    ));
                    continue;
                }

                let command = match to_client_command(&cmd) {
                    Ok(c) => c,
                    Err(msg) => {
                        send_json(&tx, &create_error(cmd.seq, ErrorCode::InvalidCommand, msg));
                        continue;
                    }
                };

                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    command,
                };
                if command_tx.try_send(inbound).is_err() {
                    send_json(&tx, &create_error(
                        cmd.seq,
                        ErrorCode::Backpressure,
                        "command queue full",
                    ));
                }
            }
            Ok(ParsedMessage::Unknown(unknown)) => {
                send_json(&tx, &create_error(
                    unknown.seq,
                    ErrorCode::InvalidCommand,
                    "unknown message type",
                ));
            }
            Err(e) => {
                send_json(&tx, &create_error(
                    0,
                    ErrorCode::InvalidCommand,
                    &format!("parse error: {}", e),
                ));
            }
        }
    }

    drop(tx);
    state.clients.write().await.retain(|c| c.id != client_id);
    let _ = write_task.await;
    Ok(())
}

/// Validate a command message and map it to the game-loop payload
pub fn to_client_command(cmd: &CommandMessage) -> Result<ClientCommand, &'static str> {
    match cmd.action {
        ActionName::Start => cmd
            .mode
            .map(|m| ClientCommand::Start(m.into()))
            .ok_or("start requires a mode"),
        ActionName::Toggle => cmd
            .tile_id
            .map(|id| ClientCommand::Toggle(TileId(id)))
            .ok_or("toggle requires a tile_id"),
        ActionName::Tick => Ok(ClientCommand::Control(SessionCommand::Tick)),
        ActionName::Pause => Ok(ClientCommand::Control(SessionCommand::Pause)),
        ActionName::Resume => Ok(ClientCommand::Control(SessionCommand::Resume)),
        ActionName::Reset => Ok(ClientCommand::Control(SessionCommand::Reset)),
    }
}

fn send_json<T: Serialize>(tx: &mpsc::UnboundedSender<String>, value: &T) {
    if let Ok(line) = serde_json::to_string(value) {
        let _ = tx.send(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionMode;

    fn command(action: ActionName, mode: Option<ModeName>, tile_id: Option<u32>) -> CommandMessage {
        CommandMessage {
            msg_type: CommandType::Command,
            seq: 1,
            ts: 0,
            action,
            mode,
            tile_id,
        }
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.protocol_version, PROTOCOL_VERSION);
        assert!(config.socket_addr().is_ok());
    }

    #[test]
    fn test_bad_host_is_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_to_client_command_requires_arguments() {
        assert_eq!(
            to_client_command(&command(ActionName::Start, Some(ModeName::Timed), None)),
            Ok(ClientCommand::Start(SessionMode::Timed))
        );
        assert!(to_client_command(&command(ActionName::Start, None, None)).is_err());
        assert_eq!(
            to_client_command(&command(ActionName::Toggle, None, Some(3))),
            Ok(ClientCommand::Toggle(TileId(3)))
        );
        assert!(to_client_command(&command(ActionName::Toggle, None, None)).is_err());
        assert_eq!(
            to_client_command(&command(ActionName::Pause, None, None)),
            Ok(ClientCommand::Control(SessionCommand::Pause))
        );
    }
}
