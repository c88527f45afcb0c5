use std::path::PathBuf;
use std::sync::Arc;

use dart_stats::config::settings::AppConfig;
use dart_stats::database::SqliteStore;
use dart_stats::domain::time::parse_iso;
use dart_stats::domain::{GameRequest, LedgerEntry, Outcome};
use dart_stats::services::reconciliation::ReconciliationService;
use dart_stats::services::replay::ReplayService;
use dart_stats::services::submission::SubmissionService;
use dart_stats::store::{GameOrder, RecordStore};

struct TempDb(PathBuf);

impl TempDb {
    fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!("dart_stats_{}_{}.db", label, std::process::id()));
        let _ = std::fs::remove_file(&path);
        TempDb(path)
    }

    fn path(&self) -> &str {
        self.0.to_str().unwrap()
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[test]
fn test_history_survives_reopen() {
    let db = TempDb::new("reopen");
    let played_at = parse_iso("2024-01-01T10:00:00Z").unwrap();

    {
        let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(db.path()).unwrap());
        let service = SubmissionService::new(store, AppConfig::default());
        service.register_player("A").unwrap();
        service.register_player("B").unwrap();
        service.submit_at(GameRequest::decisive("A", "B"), played_at).unwrap();
    }

    let store = SqliteStore::open(db.path()).unwrap();
    let a = store.find_player("A").unwrap().unwrap();
    assert_eq!(a.current_rating, 1016);
    assert_eq!(a.games_played, 1);
    assert_eq!(a.ledger.last().unwrap().timestamp, played_at);
    assert_eq!(a.ledger.last().unwrap().game_ref, Some(1));

    let games = store.find_all_games(GameOrder::Chronological).unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].decisive_pair(), Some(("A", "B")));
}

#[test]
fn test_replay_then_reconcile_on_file() {
    let db = TempDb::new("batch");
    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(db.path()).unwrap());
    let service = SubmissionService::new(store.clone(), AppConfig::default());
    service.register_player("A").unwrap();
    service.register_player("B").unwrap();
    service
        .submit_at(GameRequest::decisive("A", "B"), parse_iso("2024-01-01T10:02:00Z").unwrap())
        .unwrap();

    // A legacy entry: written before games carried ids, clock off by two hours.
    let mut b = store.find_player("B").unwrap().unwrap();
    let legacy = LedgerEntry::new(984, parse_iso("2024-01-01T12:00:00Z").unwrap()).with_hint(Outcome::Loss, "A");
    b.ledger = dart_stats::domain::Ledger::from_entries(vec![legacy]);
    store.save_player(&mut b).unwrap();

    let report = ReconciliationService::new(store.clone(), AppConfig::default()).run().unwrap();
    assert_eq!((report.linked, report.date_adjustments), (1, 1));

    let b = store.find_player("B").unwrap().unwrap();
    assert_eq!(b.ledger.last().unwrap().timestamp, parse_iso("2024-01-01T10:02:00Z").unwrap());

    let replay = ReplayService::new(store.clone(), AppConfig::default()).run().unwrap();
    assert_eq!(replay.applied, 1);

    let b = store.find_player("B").unwrap().unwrap();
    assert_eq!(b.ledger.len(), 2);
    assert!(b.ledger.entries()[0].is_sentinel());
    assert_eq!(b.current_rating, 984);
}
