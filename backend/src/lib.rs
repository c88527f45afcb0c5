pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod ranking;
pub mod rating;
pub mod services;
pub mod store;
pub mod weekly;

#[cfg(test)]
pub(crate) mod test_utils;

use std::sync::Arc;

use anyhow::Result;
use chrono::TimeDelta;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;

use crate::cli::{Command, SubmitArgs};
use crate::config::settings::{AppConfig, database_path};
use crate::database::SqliteStore;
use crate::domain::time::{format_iso, now};
use crate::services::reconciliation::ReconciliationService;
use crate::services::replay::ReplayService;
use crate::services::reports::ReportService;
use crate::services::server::ServerService;
use crate::services::submission::{Movement, SubmissionService};
use crate::store::RecordStore;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open_store() -> Result<Arc<dyn RecordStore>> {
    Ok(Arc::new(SqliteStore::open(&database_path())?))
}

fn signed(value: i64) -> String {
    let text = format!("{:+}", value);
    match value {
        v if v > 0 => text.green().to_string(),
        v if v < 0 => text.red().to_string(),
        _ => "±0".dimmed().to_string(),
    }
}

fn print_movement(movement: &Movement) {
    println!(
        "  {}: {} → {} Elo ({}), rank {} → {} ({})",
        movement.name.bold(),
        movement.rating_before,
        movement.rating_after,
        signed(i64::from(movement.rating_after - movement.rating_before)),
        movement.rank_before,
        movement.rank_after,
        signed(movement.rank_change()),
    );
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_add_player(name: &str) -> Result<()> {
    let service = SubmissionService::new(open_store()?, AppConfig::new());
    let player = service.register_player(name)?;
    println!("Registered {} at {} Elo", player.name.bold(), player.current_rating);
    Ok(())
}

pub fn handle_submit(args: &SubmitArgs) -> Result<()> {
    let service = SubmissionService::new(open_store()?, AppConfig::new());
    let outcome = service.submit_game(args.to_request())?;

    println!(
        "Game {} recorded at {}",
        outcome.game.id.to_string().bold(),
        format_iso(&outcome.game.timestamp)
    );
    for movement in &outcome.movements {
        print_movement(movement);
    }
    Ok(())
}

pub fn handle_rankings() -> Result<()> {
    let standings = ReportService::new(open_store()?, AppConfig::new()).standings()?;

    println!("{}", format!("{:>4}  {:<20} {:>6} {:>5} {:>5} {:>6}", "#", "Player", "Elo", "W", "L", "Win%").bold());
    for entry in &standings {
        let line = format!(
            "{:>4}  {:<20} {:>6} {:>5} {:>5} {:>5.1}%",
            entry.rank,
            entry.name,
            entry.rating,
            entry.wins,
            entry.losses,
            entry.win_rate * 100.0
        );
        if entry.qualified {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }
    Ok(())
}

pub fn handle_week() -> Result<()> {
    let report = ReportService::new(open_store()?, AppConfig::new()).weekly(now())?;

    println!(
        "Week {} .. {}",
        format_iso(&report.window.start),
        format_iso(&report.window.end)
    );
    match &report.player_of_the_week {
        Some(best) => println!("Player of the week: {} ({})", best.name.bold().yellow(), signed(i64::from(best.delta))),
        None => println!("No games this week"),
    }
    for delta in &report.leaderboard {
        println!(
            "  {:<20} {} → {} ({}), {} games",
            delta.name,
            delta.start_rating,
            delta.current_rating,
            signed(i64::from(delta.delta)),
            delta.games
        );
    }
    Ok(())
}

pub fn handle_player(name: &str) -> Result<()> {
    let detail = ReportService::new(open_store()?, AppConfig::new()).player_detail(name, now())?;

    println!("{}", detail.name.bold());
    println!("  Elo:        {}", detail.rating);
    println!("  Rank:       {}", detail.rank);
    println!("  Games:      {}", detail.games_played);
    println!("  This week:  {}", signed(i64::from(detail.weekly_delta)));
    for game in &detail.recent_games {
        println!(
            "  {}  {}",
            format_iso(&game.timestamp),
            game.kind.participants().join(" vs ")
        );
    }
    Ok(())
}

pub fn handle_recent(limit: usize) -> Result<()> {
    let results = ReportService::new(open_store()?, AppConfig::new()).recent_results(limit)?;

    for result in &results {
        println!(
            "{} beat {} ({})",
            result.winner.name.bold(),
            result.loser.name,
            format_iso(&result.game.timestamp)
        );
        print_movement(&result.winner);
        print_movement(&result.loser);
    }
    Ok(())
}

pub fn handle_replay() -> Result<()> {
    let report = ReplayService::new(open_store()?, AppConfig::new()).run()?;
    println!(
        "Replayed {} games for {} players ({} skipped)",
        report.applied, report.players, report.skipped
    );
    Ok(())
}

pub fn handle_reconcile(tolerance_hours: i64) -> Result<()> {
    let service = ReconciliationService::new(open_store()?, AppConfig::new())
        .with_tolerance(TimeDelta::hours(tolerance_hours.clamp(0, 24 * 7)));
    let report = service.run()?;
    println!(
        "Linked {} entries, adjusted {} dates",
        report.linked, report.date_adjustments
    );
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
