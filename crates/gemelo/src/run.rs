use std::fs;
use std::path::Path;
use std::thread;

use anyhow::{Context, Result};
use hostconfig::HostConfig;
use surface::{
    resolve, BridgeSettings, CreateParams, InviteRef, RenderSignal, SurfaceBridge, TouchPhase,
};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::engine::HeadlessEngine;
use crate::paths::AppPaths;
use crate::script::{load_script, TouchEvent};
use crate::state::HostState;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config = load_config(args.config.as_deref(), &paths)?;
    let state_file = paths.state_file();
    let mut state = HostState::load_or_default(&state_file)?;
    tracing::debug!(
        config = %paths.config_dir().display(),
        data = %paths.data_dir().display(),
        state = %state_file.display(),
        has_snapshot = state.snapshot.is_some(),
        last_invite = ?state.last_invite,
        "resolved gemelo paths"
    );

    let events = match &args.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let invite = args.invite.clone().map(InviteRef::new);
    if let Some(invite) = &invite {
        if invite.conversation_id().is_none() {
            tracing::warn!(invite = invite.as_str(), "invite does not look like a gemelo link");
        }
    }
    let decision = resolve(state.snapshot.clone(), invite.clone(), state.last_invite.as_ref());

    let asset_root = if config.surface.asset_root.is_relative() {
        paths.asset_dir().join(&config.surface.asset_root)
    } else {
        config.surface.asset_root.clone()
    };
    let player_name = args
        .name
        .clone()
        .or_else(|| config.player.name.clone())
        .or_else(|| state.player_name.clone());
    let settings = BridgeSettings {
        create: CreateParams {
            asset_root,
            density_dpi: config.surface.density_dpi,
        },
        language: Some(args.language.clone().unwrap_or(config.player.language.clone())),
        player_name: player_name.clone(),
        first_run: state.is_first_run(),
    };
    let (width, height) = args
        .size
        .unwrap_or((config.surface.width, config.surface.height));

    let mut bridge = SurfaceBridge::new(settings);
    bridge.on_surface_acquired(HeadlessEngine, decision)?;
    bridge.on_surface_resized(width, height)?;
    tracing::info!(width, height, events = events.len(), "replaying touch script");

    replay(&mut bridge, &events, &config);
    bridge.flush_idle()?;

    let snapshot = bridge.save_session()?;
    if let Some(invite) = invite {
        state.last_invite = Some(invite);
    }
    if snapshot.is_some() {
        state.snapshot = snapshot;
    }
    state.player_name = player_name;

    bridge.on_surface_lost()?;
    for signal in bridge.take_signals() {
        if let RenderSignal::ContextInitFailed(reason) = signal {
            tracing::warn!(%reason, "engine ran without graphics");
        }
    }

    state.persist(&state_file)?;
    match &state.snapshot {
        Some(snapshot) => println!("Saved session: {}", snapshot.as_str()),
        None => println!("Saved session: (none)"),
    }
    Ok(())
}

fn replay(bridge: &mut SurfaceBridge, events: &[TouchEvent], config: &HostConfig) {
    let interval = config.replay.event_interval;
    for (index, event) in events.iter().enumerate() {
        if index > 0 && !interval.is_zero() {
            thread::sleep(interval);
        }
        let phase = TouchPhase::from(event.phase);
        tracing::trace!(?phase, id = event.id, x = event.x, y = event.y, "touch");
        bridge.on_touch(event.id, phase, event.x, event.y);
    }
}

fn load_config(explicit: Option<&Path>, paths: &AppPaths) -> Result<HostConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = paths.config_file();
            if !default.exists() {
                tracing::debug!(path = %default.display(), "no config file; using defaults");
                return Ok(HostConfig::default());
            }
            default
        }
    };
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    HostConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config file at {}", path.display()))
}
