use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::domain::{GameFormat, GameRequest, X01};

#[derive(Parser, Debug)]
#[command(author, version, about = "dart-stats rating backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Register a new player
    AddPlayer {
        name: String,
    },
    /// Record a finished game
    Submit(SubmitArgs),
    /// Print the current leaderboard
    Rankings,
    /// Print the weekly leaderboard and the player of the week
    Week,
    /// Print one player's rating, weekly delta, rank and last games
    Player {
        name: String,
    },
    /// Print the latest games with rating and rank movement
    Recent {
        #[arg(short = 'n', long, default_value_t = 3)]
        limit: usize,
    },
    /// Rebuild all ratings from the recorded games
    Replay,
    /// Link unlinked history entries to their games
    Reconcile {
        /// Maximum distance between an entry and its game
        #[arg(long, default_value_t = 3)]
        tolerance_hours: i64,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SubmitArgs {
    #[arg(short, long, requires = "loser", conflicts_with = "players")]
    pub winner: Option<String>,
    #[arg(short, long, requires = "winner")]
    pub loser: Option<String>,
    /// Participants of a multi-party game (2-4, no rating change)
    #[arg(long, value_delimiter = ',')]
    pub players: Vec<String>,
    /// 501 or 301
    #[arg(short, long, default_value_t = X01::FiveOhOne)]
    pub format: X01,
    #[arg(long, default_value_t = 3)]
    pub legs: u32,
    /// Highest checkout of the game
    #[arg(long)]
    pub checkout: Option<u32>,
}

impl SubmitArgs {
    pub fn to_request(&self) -> GameRequest {
        let request = match (&self.winner, &self.loser) {
            (Some(winner), Some(loser)) => GameRequest::decisive(winner, loser),
            _ => {
                let names: Vec<&str> = self.players.iter().map(String::as_str).collect();
                GameRequest::multi_party(&names)
            }
        };
        request
            .with_format(GameFormat {
                variant: self.format,
                legs: self.legs,
            })
            .with_checkout(self.checkout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GameKind;
    use crate::errors::RatingError;

    #[test]
    fn test_submit_decisive() {
        let cli =
            Cli::try_parse_from(["dart_stats", "submit", "--winner", "A", "--loser", "B", "--format", "301"]).unwrap();
        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        let request = args.to_request();

        assert!(matches!(request.kind, GameKind::Decisive { .. }));
        assert_eq!(request.format.variant, X01::ThreeOhOne);
        assert_eq!(request.format.legs, 3);
    }

    #[test]
    fn test_submit_multi_party() {
        let cli = Cli::try_parse_from(["dart_stats", "submit", "--players", "A,B,C"]).unwrap();
        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.to_request().kind.participants(), vec!["A", "B", "C"]);

        let cli = Cli::try_parse_from(["dart_stats", "submit", "--players", "A", "--players", "B"]).unwrap();
        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.players, vec!["A", "B"]);
    }

    #[test]
    fn test_participant_count_is_checked_by_request_validation() {
        let cli = Cli::try_parse_from(["dart_stats", "submit", "--players", "A,B,C,D,E"]).unwrap();
        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert!(matches!(args.to_request().validate(), Err(RatingError::Validation(_))));
    }

    #[test]
    fn test_kebab_case_subcommands() {
        let cli = Cli::try_parse_from(["dart_stats", "add-player", "Dana"]).unwrap();
        assert_eq!(cli.command, Command::AddPlayer { name: "Dana".to_string() });

        let cli = Cli::try_parse_from(["dart_stats", "reconcile", "--tolerance-hours", "5"]).unwrap();
        assert_eq!(cli.command, Command::Reconcile { tolerance_hours: 5 });
    }
}
