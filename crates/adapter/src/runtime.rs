//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server. The server only parses
//! and queues; every session mutation happens on the thread that owns the
//! [`GameSession`], via [`apply_inbound`].

use anyhow::Result;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::warn;

use crate::core::{GameSession, RandomSource};
use crate::protocol::{create_ack, AckMessage, AckStatus, OutcomeReport};
use crate::server::{run_server, ServerConfig, ServerState};
use crate::types::{SessionCommand, SessionMode, TileId};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub command: ClientCommand,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Start(SessionMode),
    Toggle(TileId),
    Control(SessionCommand),
    /// Request an immediate observation for this client (sent after hello).
    Observe,
}

impl ClientCommand {
    /// True when an accepted command restarts the timed countdown from full,
    /// so the host's wall clock must restart its time unit too.
    pub fn rearms_countdown(&self) -> bool {
        matches!(
            self,
            ClientCommand::Start(_) | ClientCommand::Control(SessionCommand::Resume)
        )
    }
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    Broadcast { line: String },
}

/// Apply one inbound command to the session and build its acknowledgment.
///
/// Commands the session ignores (paused, game over, stale tile id) are still
/// acknowledged, with status `ignored`.
pub fn apply_inbound<R: RandomSource>(session: &mut GameSession<R>, cmd: &InboundCommand) -> AckMessage {
    match cmd.command {
        ClientCommand::Start(mode) => {
            session.start(mode);
            create_ack(cmd.seq, AckStatus::Ok, None)
        }
        ClientCommand::Toggle(id) => match session.toggle_tile(id) {
            Some(outcome) => create_ack(cmd.seq, AckStatus::Ok, Some(OutcomeReport::from(&outcome))),
            None => create_ack(cmd.seq, AckStatus::Ignored, None),
        },
        ClientCommand::Control(control) => {
            let status = if session.apply_command(control) {
                AckStatus::Ok
            } else {
                AckStatus::Ignored
            };
            create_ack(cmd.seq, status, None)
        }
        ClientCommand::Observe => create_ack(cmd.seq, AckStatus::Ok, None),
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter with an explicit configuration.
    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new()?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None).await {
                warn!(error = %e, "adapter server stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
        })
    }

    /// Start the adapter from environment variables.
    ///
    /// Returns None if `SUMFALL_AI_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        if ServerState::is_disabled() {
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::OutcomeKind;

    fn inbound(seq: u64, command: ClientCommand) -> InboundCommand {
        InboundCommand {
            client_id: 1,
            seq,
            command,
        }
    }

    #[test]
    fn test_apply_start_and_toggle() {
        let mut session = GameSession::new(11);
        let ack = apply_inbound(&mut session, &inbound(1, ClientCommand::Start(SessionMode::TurnBased)));
        assert_eq!(ack.status, AckStatus::Ok);
        assert_eq!(ack.seq, 1);

        let tile = session.current_grid()[0];
        session.force_target(tile.value as u32 + 100);
        let ack = apply_inbound(&mut session, &inbound(2, ClientCommand::Toggle(tile.id)));
        let outcome = ack.outcome.expect("toggle should report an outcome");
        assert_eq!(outcome.kind, OutcomeKind::Under);
        assert_eq!(outcome.sum, tile.value as u32);
    }

    #[test]
    fn test_apply_ignored_commands() {
        let mut session = GameSession::new(11);
        let ack = apply_inbound(&mut session, &inbound(1, ClientCommand::Toggle(TileId(1))));
        assert_eq!(ack.status, AckStatus::Ignored);

        let ack = apply_inbound(&mut session, &inbound(2, ClientCommand::Control(SessionCommand::Resume)));
        assert_eq!(ack.status, AckStatus::Ignored);
        assert!(ack.outcome.is_none());
    }

    #[test]
    fn test_rearms_countdown_only_for_start_and_resume() {
        assert!(ClientCommand::Start(SessionMode::Timed).rearms_countdown());
        assert!(ClientCommand::Start(SessionMode::TurnBased).rearms_countdown());
        assert!(ClientCommand::Control(SessionCommand::Resume).rearms_countdown());
        assert!(!ClientCommand::Control(SessionCommand::Tick).rearms_countdown());
        assert!(!ClientCommand::Control(SessionCommand::Pause).rearms_countdown());
        assert!(!ClientCommand::Toggle(TileId(1)).rearms_countdown());
        assert!(!ClientCommand::Observe.rearms_countdown());

        // Resume on a running session is ignored and must not move the clock.
        let mut session = GameSession::new(11);
        session.start(SessionMode::Timed);
        let resume = inbound(2, ClientCommand::Control(SessionCommand::Resume));
        let ack = apply_inbound(&mut session, &resume);
        assert_eq!(ack.status, AckStatus::Ignored);
        assert_eq!(session.countdown(), Some(10));
    }
}
