//! Battle client binary.
//!
//! Composition root: reads configuration from the environment, loads content,
//! and plays one battle between two scripted parties while printing the
//! battle log to stdout. Diagnostics go to stderr through `tracing`.
//!
//! ```bash
//! BATTLE_MODE=loopback BATTLE_SEED=42 RUST_LOG=battle=debug cargo run -p battle-client
//! ```

mod config;
mod display;

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::{ContentFactory, Roster, RosterLoader};
use battle_core::CharacterTemplate;
use battle_runtime::{
    BattleRunner, BattleSummary, EventBus, FollowerSession, LoopbackTransport, RuntimeConfig,
    ScriptedProvider,
};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use config::{ClientConfig, Mode};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env()?;
    let mut runtime = RuntimeConfig::from_env();
    let roster = load_content(&config, &mut runtime)?;
    let own = party(&roster, &config.own_party).context("own party")?;
    let opponent = party(&roster, &config.opponent_party).context("opponent party")?;

    tracing::info!(mode = ?config.mode, seed = ?runtime.rng_seed, "starting battle");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let events = EventBus::with_capacity(runtime.event_buffer_size);
    let printer = tokio::spawn(display::print_events(events.subscribe_all()));

    let summary = match config.mode {
        Mode::Local => play_local(runtime, own, opponent, events, cancel).await?,
        Mode::Loopback => play_loopback(runtime, own, opponent, events, cancel).await?,
    };
    printer.await.context("display task failed")?;

    tracing::info!(
        outcome = %summary.resolution.outcome,
        reason = ?summary.resolution.reason,
        rounds = summary.rounds,
        "battle finished"
    );
    Ok(())
}

/// Roster plus battle tunables. A content directory overrides the embedded
/// data; an explicit variance in the environment wins over the file.
fn load_content(config: &ClientConfig, runtime: &mut RuntimeConfig) -> Result<Roster> {
    let Some(dir) = &config.data_dir else {
        return RosterLoader::load_embedded();
    };
    let factory = ContentFactory::new(dir);
    let battle = factory.load_config()?;
    runtime.battle = if env::var_os("BATTLE_DAMAGE_VARIANCE_PCT").is_some() {
        battle.with_damage_variance(runtime.battle.damage_variance_pct)
    } else {
        battle
    };
    tracing::debug!(dir = %factory.data_dir().display(), "loaded content directory");
    factory.load_roster()
}

fn party(roster: &Roster, ids: &[String]) -> Result<Vec<CharacterTemplate>> {
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    roster.party(&ids)
}

async fn play_local(
    runtime: RuntimeConfig,
    own: Vec<CharacterTemplate>,
    opponent: Vec<CharacterTemplate>,
    events: EventBus,
    cancel: CancellationToken,
) -> Result<BattleSummary> {
    let seed = runtime.rng_seed;
    let runner = BattleRunner::builder()
        .config(runtime)
        .own_party(own)
        .own_provider(ScriptedProvider::from_seed(seed))
        .opponent_party(opponent)
        .events(events)
        .cancel_token(cancel)
        .build()
        .await?;
    Ok(runner.run().await?)
}

/// Host and follower in one process, joined by an in-memory link. Only the
/// host's events are printed.
async fn play_loopback(
    runtime: RuntimeConfig,
    own: Vec<CharacterTemplate>,
    opponent: Vec<CharacterTemplate>,
    events: EventBus,
    cancel: CancellationToken,
) -> Result<BattleSummary> {
    let seed = runtime.rng_seed;
    let (host_end, follower_end) = LoopbackTransport::pair();

    let follower_events = EventBus::with_capacity(runtime.event_buffer_size);
    let follower = FollowerSession::new(
        Box::new(follower_end),
        opponent,
        Arc::new(ScriptedProvider::from_seed(seed.map(|s| s.wrapping_add(2)))),
    )
    .with_events(follower_events.clone())
    .with_cancel_token(cancel.child_token());
    let follower_log = tokio::spawn(trace_follower(follower_events.subscribe_all()));
    drop(follower_events);
    let follower = tokio::spawn(follower.run());

    let runner = BattleRunner::builder()
        .config(runtime)
        .own_party(own)
        .own_provider(ScriptedProvider::from_seed(seed))
        .remote(Box::new(host_end))
        .events(events)
        .cancel_token(cancel)
        .build()
        .await?;
    let summary = runner.run().await?;

    let mirrored = follower.await.context("follower task failed")??;
    follower_log.await.context("follower trace task failed")?;
    let host_root = summary.session.state_root()?;
    let follower_root = mirrored.session.state_root()?;
    if host_root == follower_root {
        tracing::info!(root = %host_root.short(), "follower state matches the host");
    } else {
        tracing::error!(host = %host_root, follower = %follower_root, "follower state diverged");
    }
    Ok(summary)
}

async fn trace_follower(mut rx: broadcast::Receiver<battle_runtime::BattleEvent>) {
    while let Ok(event) = rx.recv().await {
        tracing::debug!(target: "battle::follower", ?event, "follower event");
    }
}
