//! Headless sumfall runner (default binary).
//!
//! Hosts one session behind the TCP adapter. Commands from clients are applied
//! on this thread only; the clock advances the session once per time unit.
//! Observations go out whenever the session changed.

use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sumfall::adapter::protocol::{build_observation, state_hash, AckStatus, StateHash};
use sumfall::adapter::runtime::{apply_inbound, Adapter, ClientCommand, OutboundMessage};
use sumfall::core::{GameSession, SessionConfig, SessionSnapshot, SimpleRng};
use sumfall::types::SessionMode;

/// Wall-clock length of one time unit.
const TIME_UNIT: Duration = Duration::from_millis(1000);

/// How long the loop sleeps when there is nothing to do.
const IDLE_POLL: Duration = Duration::from_millis(5);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SessionConfig::from_env();
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u32)
        .unwrap_or(1);
    let session = GameSession::with_config(config, SimpleRng::new(seed))?;
    info!(seed, ?config, "session ready");

    let Some(adapter) = Adapter::start_from_env()? else {
        warn!("adapter disabled via SUMFALL_AI_DISABLED; nothing to host");
        return Ok(());
    };

    run(session, adapter)
}

fn run(mut session: GameSession, mut adapter: Adapter) -> Result<()> {
    let mut snap = SessionSnapshot::default();
    session.snapshot_into(&mut snap);
    let mut last_hash: StateHash = state_hash(&snap);
    let mut obs_seq: u64 = 0;
    let mut last_tick = Instant::now();

    loop {
        let mut busy = false;

        while let Some(cmd) = adapter.try_recv() {
            busy = true;
            let ack = apply_inbound(&mut session, &cmd);
            if ack.status == AckStatus::Ok && cmd.command.rearms_countdown() {
                // The countdown restarted at full; the time unit restarts with it.
                last_tick = Instant::now();
            }
            adapter.send(OutboundMessage::ToClient {
                client_id: cmd.client_id,
                line: serde_json::to_string(&ack)?,
            });

            if cmd.command == ClientCommand::Observe {
                session.snapshot_into(&mut snap);
                obs_seq += 1;
                let obs = build_observation(&snap, obs_seq, std::iter::empty());
                adapter.send(OutboundMessage::ToClient {
                    client_id: cmd.client_id,
                    line: serde_json::to_string(&obs)?,
                });
            }
        }

        if last_tick.elapsed() >= TIME_UNIT {
            last_tick = Instant::now();
            if session.mode() == SessionMode::Timed {
                session.tick();
            }
        }

        let events = session.take_events();
        session.snapshot_into(&mut snap);
        let hash = state_hash(&snap);
        if !events.is_empty() || hash != last_hash {
            last_hash = hash;
            obs_seq += 1;
            let obs = build_observation(&snap, obs_seq, events);
            adapter.send(OutboundMessage::Broadcast {
                line: serde_json::to_string(&obs)?,
            });
        }

        if !busy {
            thread::sleep(IDLE_POLL);
        }
    }
}
