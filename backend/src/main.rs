use anyhow::Result;

use dart_stats::cli::Command;
use dart_stats::{
    handle_add_player, handle_completions, handle_player, handle_rankings, handle_recent,
    handle_reconcile, handle_replay, handle_serve, handle_submit, handle_week, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::AddPlayer { name } => handle_add_player(name),
        Command::Submit(args) => handle_submit(args),
        Command::Rankings => handle_rankings(),
        Command::Week => handle_week(),
        Command::Player { name } => handle_player(name),
        Command::Recent { limit } => handle_recent(*limit),
        Command::Replay => handle_replay(),
        Command::Reconcile { tolerance_hours } => handle_reconcile(*tolerance_hours),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
