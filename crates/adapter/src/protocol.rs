//! Protocol module - JSON message types for the control adapter
//!
//! Line-delimited JSON. All messages have: type, seq (sequence number), ts
//! (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::SessionSnapshot;
use crate::types::{SelectionOutcome, SessionEvent, SessionMode, SessionPhase, Tile};

/// Protocol version spoken by this adapter; clients must share the major part.
pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommandType {
    #[serde(rename = "command")]
    #[default]
    Command,
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default)]
    pub stream_observations: bool,
}

/// Session command from the controlling client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub action: ActionName,
    /// Required for `start`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeName>,
    /// Required for `toggle`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionName {
    Start,
    Toggle,
    Tick,
    Pause,
    Resume,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeName {
    #[serde(rename = "turnBased", alias = "turn_based", alias = "classic")]
    TurnBased,
    #[serde(rename = "timed")]
    Timed,
}

impl From<ModeName> for SessionMode {
    fn from(value: ModeName) -> Self {
        match value {
            ModeName::TurnBased => SessionMode::TurnBased,
            ModeName::Timed => SessionMode::Timed,
        }
    }
}

impl From<SessionMode> for ModeName {
    fn from(value: SessionMode) -> Self {
        match value {
            SessionMode::TurnBased => ModeName::TurnBased,
            SessionMode::Timed => ModeName::Timed,
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
    /// Command was valid but had no effect (paused, game over, stale tile id)
    #[serde(rename = "ignored")]
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "backpressure")]
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub actions: Vec<ActionName>,
    pub modes: Vec<ModeName>,
}

/// Acknowledgment for an applied command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeReport>,
}

/// Selection classification returned for a `toggle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub kind: OutcomeKind,
    pub sum: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Exact,
    Over,
    Under,
}

impl From<&SelectionOutcome> for OutcomeReport {
    fn from(value: &SelectionOutcome) -> Self {
        match value {
            SelectionOutcome::Exact { ids, sum } => Self {
                kind: OutcomeKind::Exact,
                sum: *sum,
                matched: ids.iter().map(|id| id.0).collect(),
            },
            SelectionOutcome::Over { sum } => Self {
                kind: OutcomeKind::Over,
                sum: *sum,
                matched: Vec::new(),
            },
            SelectionOutcome::Under { sum } => Self {
                kind: OutcomeKind::Under,
                sum: *sum,
                matched: Vec::new(),
            },
        }
    }
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Session observation (sent to streaming clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub paused: bool,
    pub game_over: bool,
    pub phase: PhaseLower,
    pub mode: ModeName,
    pub episode_id: u32,
    pub board: BoardSnapshot,
    pub tiles: Vec<TileSnapshot>,
    pub target: u32,
    pub selection: Vec<u32>,
    pub selection_sum: u32,
    pub score: u32,
    pub matches: u32,
    pub rows_injected: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventReport>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: u8,
    pub cols: u8,
    /// Row-major tile values, 0 = empty
    pub cells: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub id: u32,
    pub value: u8,
    pub row: u8,
    pub col: u8,
}

impl From<&Tile> for TileSnapshot {
    fn from(value: &Tile) -> Self {
        Self {
            id: value.id.0,
            value: value.value,
            row: value.row,
            col: value.col,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseLower {
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "paused")]
    Paused,
    #[serde(rename = "game_over")]
    GameOver,
}

impl From<SessionPhase> for PhaseLower {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::Ready => PhaseLower::Ready,
            SessionPhase::Playing => PhaseLower::Playing,
            SessionPhase::Paused => PhaseLower::Paused,
            SessionPhase::GameOver => PhaseLower::GameOver,
        }
    }
}

/// Session event as reported on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventReport {
    Started { mode: ModeName, target: u32 },
    Matched { sum: u32, cleared: u32, target: u32 },
    RowInjected { row: u8 },
    Overflow,
    Paused,
    Resumed,
    Reset,
}

impl From<SessionEvent> for EventReport {
    fn from(value: SessionEvent) -> Self {
        match value {
            SessionEvent::Started { mode, target } => EventReport::Started {
                mode: mode.into(),
                target,
            },
            SessionEvent::Matched {
                sum,
                cleared,
                target,
            } => EventReport::Matched {
                sum,
                cleared,
                target,
            },
            SessionEvent::RowInjected { row } => EventReport::RowInjected { row },
            SessionEvent::Overflow => EventReport::Overflow,
            SessionEvent::Paused => EventReport::Paused,
            SessionEvent::Resumed => EventReport::Resumed,
            SessionEvent::Reset => EventReport::Reset,
        }
    }
}

/// Deterministic state hash serialized as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Hash everything an observer can see in a snapshot
pub fn state_hash(snap: &SessionSnapshot) -> StateHash {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    snap.hash(&mut hasher);
    StateHash(hasher.finish())
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            // Unknown message type is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct Probe {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let probe = serde_json::from_str::<Probe>(json)?;
            match probe.msg_type.as_deref() {
                Some("hello") | Some("command") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: probe.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities {
            stream_observations: true,
        },
    }
}

/// Create a welcome message
pub fn create_welcome(seq: u64, protocol_version: &str, client_id: u64) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        game_id: "sumfall".to_string(),
        capabilities: ServerCapabilities {
            actions: vec![
                ActionName::Start,
                ActionName::Toggle,
                ActionName::Tick,
                ActionName::Pause,
                ActionName::Resume,
                ActionName::Reset,
            ],
            modes: vec![ModeName::TurnBased, ModeName::Timed],
        },
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64, status: AckStatus, outcome: Option<OutcomeReport>) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status,
        outcome,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation from a session snapshot and the events drained with it
pub fn build_observation(
    snap: &SessionSnapshot,
    seq: u64,
    events: impl IntoIterator<Item = SessionEvent>,
) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        paused: snap.phase == SessionPhase::Paused,
        game_over: snap.game_over(),
        phase: snap.phase.into(),
        mode: snap.mode.into(),
        episode_id: snap.episode_id,
        board: BoardSnapshot {
            rows: snap.rows,
            cols: snap.cols,
            cells: snap.cell_values(),
        },
        tiles: snap.tiles.iter().map(TileSnapshot::from).collect(),
        target: snap.target,
        selection: snap.selection.iter().map(|id| id.0).collect(),
        selection_sum: snap.selection_sum,
        score: snap.score,
        matches: snap.matches,
        rows_injected: snap.rows_injected,
        countdown: snap.countdown,
        events: events.into_iter().map(EventReport::from).collect(),
        state_hash: state_hash(snap),
    }
}

/// Major version component of a `major.minor.patch` string
pub fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameSession;
    use crate::types::TileId;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test-bot","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.msg_type, HelloType::Hello);
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "test-bot");
                assert!(msg.requested.stream_observations);
            }
            _ => panic!("Expected Hello message"),
        }
    }

    #[test]
    fn test_parse_command_start_and_toggle() {
        let json = r#"{"type":"command","seq":2,"ts":1,"action":"start","mode":"timed"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Command(msg) => {
                assert_eq!(msg.action, ActionName::Start);
                assert_eq!(msg.mode, Some(ModeName::Timed));
                assert_eq!(msg.tile_id, None);
            }
            _ => panic!("Expected Command message"),
        }

        let json = r#"{"type":"command","seq":3,"ts":1,"action":"toggle","tile_id":17}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Command(msg) => {
                assert_eq!(msg.action, ActionName::Toggle);
                assert_eq!(msg.tile_id, Some(17));
            }
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_parse_mode_aliases() {
        let json = r#"{"type":"command","seq":2,"ts":1,"action":"start","mode":"classic"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Command(msg) => assert_eq!(msg.mode, Some(ModeName::TurnBased)),
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let json = r#"{"type":"emote","seq":9,"ts":1}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 9),
            _ => panic!("Expected Unknown message"),
        }
    }

    #[test]
    fn test_parse_bad_command_is_error() {
        let json = r#"{"type":"command","seq":2,"ts":1,"action":"explode"}"#;
        assert!(parse_message(json).is_err());
        assert!(parse_message("not json").is_err());
    }

    #[test]
    fn test_outcome_report_from_exact() {
        let outcome = SelectionOutcome::Exact {
            ids: vec![TileId(4), TileId(9)],
            sum: 11,
        };
        let report = OutcomeReport::from(&outcome);
        assert_eq!(report.kind, OutcomeKind::Exact);
        assert_eq!(report.matched, vec![4, 9]);

        let json = serde_json::to_value(OutcomeReport::from(&SelectionOutcome::Over { sum: 12 })).unwrap();
        assert_eq!(json["kind"], "over");
        assert!(json.get("matched").is_none());
    }

    #[test]
    fn test_build_observation_reflects_session() {
        let mut session = GameSession::new(7);
        session.start(SessionMode::Timed);
        let events = session.take_events();
        let obs = build_observation(&session.snapshot(), 5, events);

        assert_eq!(obs.seq, 5);
        assert!(obs.playable);
        assert_eq!(obs.mode, ModeName::Timed);
        assert_eq!(obs.tiles.len(), 7);
        assert_eq!(obs.board.cells.len(), 10);
        assert_eq!(obs.countdown, Some(10));
        assert!(matches!(obs.events[0], EventReport::Started { .. }));

        let v = serde_json::to_value(&obs).unwrap();
        assert_eq!(v["type"], "observation");
        assert_eq!(v["phase"], "playing");
        assert_eq!(v["events"][0]["kind"], "started");
        assert_eq!(v["state_hash"].as_str().map(str::len), Some(16));
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let mut session = GameSession::new(7);
        session.start(SessionMode::Timed);
        let a = state_hash(&session.snapshot());
        assert_eq!(a, state_hash(&session.snapshot()));
        session.tick();
        assert_ne!(a, state_hash(&session.snapshot()));
    }

    #[test]
    fn test_state_hash_serde_roundtrip() {
        let json = serde_json::to_string(&StateHash(0xdead_beef)).unwrap();
        assert_eq!(json, "\"00000000deadbeef\"");
        let back: StateHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StateHash(0xdead_beef));
    }

    #[test]
    fn test_major_version() {
        assert_eq!(major_version("1.0.0"), "1");
        assert_eq!(major_version("2"), "2");
    }
}
