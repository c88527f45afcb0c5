use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::Serialize;

use crate::domain::time::iso_millis;
use crate::domain::{Game, INITIAL_RATING, Player};

/// Monday 00:00:00.000 through Sunday 23:59:59.999 of one calendar week,
/// stored as UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    #[serde(with = "iso_millis")]
    pub start: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub end: DateTime<Utc>,
}

// Midnight opening `date` in `calendar`; a midnight skipped by a DST jump
// is read as UTC.
fn local_midnight<Tz: TimeZone>(calendar: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    calendar
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

impl WeekWindow {
    /// Week containing `reference` as seen from `calendar`.
    pub fn containing<Tz: TimeZone>(reference: DateTime<Utc>, calendar: &Tz) -> Self {
        let local_date = reference.with_timezone(calendar).date_naive();
        let monday = local_date - TimeDelta::days(i64::from(local_date.weekday().num_days_from_monday()));
        let next_monday = monday + TimeDelta::days(7);

        Self {
            start: local_midnight(calendar, monday),
            end: local_midnight(calendar, next_monday) - TimeDelta::milliseconds(1),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Rating a player carried into the week; 1000 without earlier history.
pub fn start_rating(player: &Player, window: &WeekWindow) -> i32 {
    player.ledger.rating_before(window.start).unwrap_or(INITIAL_RATING)
}

pub fn weekly_delta(player: &Player, window: &WeekWindow) -> i32 {
    player.trusted_rating() - start_rating(player, window)
}

pub fn weekly_delta_at<Tz: TimeZone>(player: &Player, reference: DateTime<Utc>, calendar: &Tz) -> i32 {
    weekly_delta(player, &WeekWindow::containing(reference, calendar))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyDelta {
    pub name: String,
    pub start_rating: i32,
    pub current_rating: i32,
    pub delta: i32,
    pub games: usize,
}

/// Players with at least one game in `window`, biggest gain first. Equal
/// deltas keep player order.
pub fn weekly_leaderboard(players: &[Player], games: &[Game], window: &WeekWindow) -> Vec<WeeklyDelta> {
    let week_games: Vec<&Game> = games.iter().filter(|g| window.contains(g.timestamp)).collect();

    let mut board: Vec<WeeklyDelta> = players
        .iter()
        .filter_map(|player| {
            let played = week_games.iter().filter(|g| g.involves(&player.name)).count();
            if played == 0 {
                return None;
            }
            let start = start_rating(player, window);
            let current = player.trusted_rating();
            Some(WeeklyDelta {
                name: player.name.clone(),
                start_rating: start,
                current_rating: current,
                delta: current - start,
                games: played,
            })
        })
        .collect();

    board.sort_by(|a, b| b.delta.cmp(&a.delta));
    board
}

pub fn player_of_the_week(players: &[Player], games: &[Game], window: &WeekWindow) -> Option<WeeklyDelta> {
    weekly_leaderboard(players, games, window).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::WeekSettings;
    use crate::domain::time::{format_iso, parse_iso};
    use crate::domain::{GameRequest, LedgerEntry};

    fn at(raw: &str) -> DateTime<Utc> {
        parse_iso(raw).unwrap()
    }

    fn cet() -> chrono::FixedOffset {
        WeekSettings::default().calendar()
    }

    #[test]
    fn test_window_follows_configured_calendar() {
        let window = WeekWindow::containing(at("2024-01-03T12:00:00Z"), &cet());
        assert_eq!(format_iso(&window.start), "2023-12-31T23:00:00.000Z");
        assert_eq!(format_iso(&window.end), "2024-01-07T22:59:59.999Z");

        // Sunday evening in UTC is already Monday in the calendar.
        let next = WeekWindow::containing(at("2024-01-07T23:30:00Z"), &cet());
        assert_eq!(format_iso(&next.start), "2024-01-07T23:00:00.000Z");
        assert!(!window.contains(at("2024-01-07T23:30:00Z")));
        assert!(window.contains(at("2024-01-07T22:59:59.999Z")));
    }

    #[test]
    fn test_window_in_utc() {
        let window = WeekWindow::containing(at("2024-01-01T00:00:00Z"), &Utc);
        assert_eq!(format_iso(&window.start), "2024-01-01T00:00:00.000Z");
        assert_eq!(format_iso(&window.end), "2024-01-07T23:59:59.999Z");
    }

    #[test]
    fn test_delta_without_prior_history_starts_from_initial() {
        let mut player = Player::new("A");
        player.current_rating = 1016;
        player.ledger.push(LedgerEntry::new(1016, at("2024-01-02T10:00:00Z")));

        assert_eq!(weekly_delta_at(&player, at("2024-01-03T12:00:00Z"), &cet()), 16);
    }

    #[test]
    fn test_delta_uses_last_entry_before_week() {
        let mut player = Player::new("A");
        player.ledger = crate::domain::Ledger::with_sentinel();
        player.ledger.push(LedgerEntry::new(1040, at("2023-12-28T10:00:00Z")));
        player.ledger.push(LedgerEntry::new(1025, at("2024-01-02T10:00:00Z")));
        player.current_rating = 1025;

        let window = WeekWindow::containing(at("2024-01-03T12:00:00Z"), &cet());
        assert_eq!(start_rating(&player, &window), 1040);
        assert_eq!(weekly_delta(&player, &window), -15);
    }

    #[test]
    fn test_player_of_the_week_needs_a_game_in_window() {
        let mut idle = Player::new("Idle");
        idle.current_rating = 1100;
        let mut a = Player::new("A");
        a.current_rating = 1016;
        let mut b = Player::new("B");
        b.current_rating = 1016;
        let mut c = Player::new("C");
        c.current_rating = 984;

        let games = vec![
            GameRequest::decisive("A", "C").at(at("2024-01-02T10:00:00Z")).into_game(1),
            GameRequest::multi_party(&["B", "C"]).at(at("2024-01-02T11:00:00Z")).into_game(2),
            GameRequest::decisive("Idle", "C").at(at("2023-12-20T11:00:00Z")).into_game(3),
        ];
        let players = vec![idle, a, b, c];
        let window = WeekWindow::containing(at("2024-01-03T12:00:00Z"), &cet());

        let board = weekly_leaderboard(&players, &games, &window);
        let names: Vec<_> = board.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(board[2].games, 2);

        let best = player_of_the_week(&players, &games, &window).unwrap();
        assert_eq!(best.name, "A");
        assert_eq!(best.delta, 16);
    }

    #[test]
    fn test_no_games_no_player_of_the_week() {
        let window = WeekWindow::containing(at("2024-01-03T12:00:00Z"), &cet());
        assert!(player_of_the_week(&[Player::new("A")], &[], &window).is_none());
    }
}
