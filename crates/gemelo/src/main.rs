mod cli;
mod engine;
mod paths;
mod run;
mod script;
mod state;

use anyhow::Result;
use cli::{Command, StateAction};
use paths::AppPaths;
use state::HostState;
use surface::InstanceState;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::Run(args) => run::run(args),
        Command::State(state_cmd) => handle_state_command(state_cmd.action),
        Command::Where => run_where(),
    }
}

fn handle_state_command(action: StateAction) -> Result<()> {
    let paths = AppPaths::discover()?;
    let state_file = paths.state_file();

    match action {
        StateAction::Show => {
            let state = HostState::load_or_default(&state_file)?;
            match &state.snapshot {
                Some(snapshot) => {
                    let decoded = InstanceState::from_snapshot(snapshot);
                    println!("Session snapshot: {}", snapshot.as_str());
                    match decoded.person_id {
                        Some(id) => println!("  person id:      {id:016x}"),
                        None => println!("  person id:      (none)"),
                    }
                    println!("  invite visible: {}", decoded.invite_visible);
                }
                None => println!("Session snapshot: (none)"),
            }
            match &state.last_invite {
                Some(invite) => println!("Last invite: {}", invite.as_str()),
                None => println!("Last invite: (none)"),
            }
            match &state.player_name {
                Some(name) => println!("Player name: {name}"),
                None => println!("Player name: (none)"),
            }
            Ok(())
        }
        StateAction::Clear => {
            if HostState::clear(&state_file)? {
                println!("Removed {}", state_file.display());
            } else {
                println!("No state stored at {}", state_file.display());
            }
            Ok(())
        }
    }
}

fn run_where() -> Result<()> {
    let paths = AppPaths::discover()?;
    println!("Configuration directories:");
    println!("  config:     {}", paths.config_dir().display());
    println!("  data:       {}", paths.data_dir().display());
    println!("  config file: {}", paths.config_file().display());
    println!("  state:      {}", paths.state_file().display());
    Ok(())
}
