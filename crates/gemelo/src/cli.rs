use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "gemelo",
    author,
    version,
    about = "Headless gemelo host that drives the game bridge from scripted touches"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a session, replay a touch script, then save and persist it.
    Run(RunArgs),
    /// Inspect or reset the persisted host state.
    State(StateCommand),
    /// Print resolved directories for config, data, and state.
    Where,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Host configuration file; defaults to `gemelo.toml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Invitation link (e.g. `https://gemelo.org/j/yv7K_sr-yvO`).
    #[arg(long, value_name = "URL")]
    pub invite: Option<String>,

    /// JSON-lines touch script to replay, one event per line.
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Override the surface size (e.g. `720x1280`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_dimensions)]
    pub size: Option<(u32, u32)>,

    /// Player name handed to the engine.
    #[arg(long, value_name = "NAME", env = "GEMELO_PLAYER_NAME")]
    pub name: Option<String>,

    /// Language code handed to the engine.
    #[arg(long, value_name = "CODE")]
    pub language: Option<String>,
}

#[derive(Parser, Debug)]
pub struct StateCommand {
    #[command(subcommand)]
    pub action: StateAction,
}

#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Print the stored session snapshot, last invite, and player name.
    Show,
    /// Forget the stored state.
    Clear,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in surface size".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in surface size".to_string())?;
    if width == 0 || height == 0 {
        return Err("surface size must be greater than zero".into());
    }
    Ok((width, height))
}
