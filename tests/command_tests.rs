use cohortstat::commands::{
    check_summary, execute_aggregate, execute_aggregate_until, install_interrupt_handler,
    lookup_cohort, validate_args, AggregateArgs, LookupArgs,
};
use cohortstat::ingest::ParseCache;
use cohortstat::output::read_summary;
use cohortstat::utils::config::AggregationConfig;
use serde_json::json;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn game(witches_vp: i64, nomads_vp: i64) -> serde_json::Value {
    let events = json!({
        "build:D": { "round": { "0": 2, "1": 1, "all": 3 } },
        "upgrade:TP": { "round": { "1": 1, "all": 1 } },
        "favor:FAV4": { "round": { "1": 1, "all": 1 } }
    });
    json!({
        "aborted": false,
        "factions": {
            "witches": { "username": "ann", "VP": witches_vp, "vp_source": { "faction": 15 } },
            "nomads": { "username": "ben", "VP": nomads_vp, "vp_source": { "faction": 9 } }
        },
        "events": { "faction": { "witches": events, "nomads": events } }
    })
}

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("games")).unwrap();
        Self { _dir: dir, root }
    }

    fn add_game(&self, id: &str, doc: &serde_json::Value) {
        fs::write(self.root.join("games").join(format!("{}.json", id)), doc.to_string()).unwrap();
    }

    fn list(&self, ids: &[&str]) {
        fs::write(self.root.join("gamelist.json"), json!(ids).to_string()).unwrap();
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn args(&self) -> AggregateArgs {
        AggregateArgs {
            config: AggregationConfig {
                games_dir: self.path("games"),
                game_list: self.path("gamelist.json"),
                ratings: Some(self.path("ratings.json")),
                cache: Some(self.path("games.cache.json")),
                ..Default::default()
            },
            output: self.path("out/stats.json"),
            report: Some(self.path("out/report.json")),
            ..Default::default()
        }
    }
}

fn lookup(summary: &Path, key: &str) -> LookupArgs {
    LookupArgs {
        file: summary.to_path_buf(),
        key: key.to_string(),
        metric: None,
        value: None,
    }
}

#[test]
fn test_aggregate_end_to_end() {
    let ws = Workspace::new();
    ws.add_game("g1", &game(120, 100));
    ws.add_game("g2", &game(110, 90));
    ws.add_game("g3", &json!({ "aborted": true, "factions": {}, "events": {} }));
    ws.list(&["g1", "g2", "g3", "g4"]);

    let args = ws.args();
    validate_args(&args).unwrap();
    let report = execute_aggregate(args).unwrap();

    assert_eq!(report.cohorts, 2);
    assert_eq!(report.diagnostics.matches_seen, 4);
    assert_eq!(report.diagnostics.matches_parsed, 2);
    assert_eq!(report.diagnostics.matches_skipped["aborted"], 1);
    assert_eq!(report.diagnostics.matches_skipped["missing"], 1);
    assert_eq!(report.diagnostics.records_absorbed, 4);

    let summary = read_summary(ws.path("out/stats.json")).unwrap();
    assert!(check_summary(&summary).is_empty());

    // witches: token s, 2 players, no ratings file, TP in round 1, FAV4
    let witches = lookup_cohort(&lookup(&ws.path("out/stats.json"), "s2020004")).unwrap();
    assert_eq!(witches["score"].count(), 2);
    assert!((witches["score"].mean() - 115.0).abs() < 1e-9);
    assert!((witches["margin"].mean() - 10.0).abs() < 1e-9);

    assert!(ws.path("out/report.json").exists());
    assert!(ws.path("games.cache.json").exists());
}

#[test]
fn test_cache_only_parses_new_matches() {
    let ws = Workspace::new();
    ws.add_game("g1", &game(120, 100));
    ws.list(&["g1"]);
    let first = execute_aggregate(ws.args()).unwrap();
    assert_eq!(first.diagnostics.matches_parsed, 1);

    // A changed document for a cached id is not re-read
    ws.add_game("g1", &game(10, 10));
    ws.add_game("g2", &game(130, 80));
    ws.list(&["g1", "g2"]);
    let second = execute_aggregate(ws.args()).unwrap();

    assert_eq!(second.diagnostics.matches_cached, 1);
    assert_eq!(second.diagnostics.matches_parsed, 1);

    let witches = lookup_cohort(&lookup(&ws.path("out/stats.json"), "s2020004")).unwrap();
    assert!((witches["score"].mean() - 125.0).abs() < 1e-9);

    let cache = ParseCache::open(ws.path("games.cache.json")).unwrap();
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_ratings_change_tier() {
    let ws = Workspace::new();
    ws.add_game("g1", &game(120, 100));
    ws.list(&["g1"]);
    fs::write(
        ws.path("ratings.json"),
        json!({ "players": { "ann": { "faction_breakdown": { "witches": { "score": 40.0 } } } } })
            .to_string(),
    )
    .unwrap();

    execute_aggregate(ws.args()).unwrap();
    let summary = read_summary(ws.path("out/stats.json")).unwrap();

    assert!(summary.contains_key("s2420004"));
    assert!(summary.contains_key("o2020004"));
}

#[test]
fn test_invalid_json_match_is_skipped() {
    let ws = Workspace::new();
    ws.add_game("g1", &game(120, 100));
    fs::write(ws.path("games/g2.json"), "{ \"aborted\": ").unwrap();
    ws.list(&["g1", "g2"]);

    let report = execute_aggregate(ws.args()).unwrap();
    assert_eq!(report.diagnostics.matches_skipped["invalid_json"], 1);
    assert_eq!(report.cohorts, 2);
}

#[test]
fn test_out_of_range_count_does_not_stop_batch() {
    let ws = Workspace::new();
    let mut corrupt = game(120, 100);
    corrupt["events"]["faction"]["nomads"]["build:D"] =
        json!({ "round": { "0": 2147483647, "1": 1, "all": 2147483648i64 } });
    ws.add_game("g1", &corrupt);
    ws.add_game("g2", &game(110, 90));
    ws.list(&["g1", "g2"]);

    let report = execute_aggregate(ws.args()).unwrap();
    assert_eq!(report.diagnostics.matches_parsed, 2);
    assert_eq!(report.diagnostics.participants_skipped["malformed_record"], 1);
    assert_eq!(report.diagnostics.records_absorbed, 3);
    assert_eq!(ParseCache::open(ws.path("games.cache.json")).unwrap().len(), 2);
}

#[test]
fn test_missing_game_list_fails() {
    let ws = Workspace::new();
    assert!(execute_aggregate(ws.args()).is_err());
}

#[test]
fn test_cancelled_run_keeps_cache_and_writes_no_summary() {
    let ws = Workspace::new();
    ws.add_game("g1", &game(120, 100));
    ws.list(&["g1"]);

    let stop = Arc::new(AtomicBool::new(true));
    assert!(execute_aggregate_until(ws.args(), stop).is_err());
    assert!(!ws.path("out/stats.json").exists());
    assert!(ws.path("games.cache.json").exists());
}

#[test]
fn test_vp_breakdown_written() {
    let ws = Workspace::new();
    ws.add_game("g1", &game(120, 100));
    ws.list(&["g1"]);

    let mut args = ws.args();
    args.vp_output = Some(ws.path("out/vp.json"));
    execute_aggregate(args).unwrap();

    let vp: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ws.path("out/vp.json")).unwrap()).unwrap();
    assert_eq!(vp["all"]["faction"][0], json!(2));
    assert_eq!(vp["factions"]["witches"]["faction"], json!(150));
}

#[test]
fn test_validate_args_rejects_zero_shards() {
    let ws = Workspace::new();
    let mut args = ws.args();
    args.config.shards = 0;
    assert!(validate_args(&args).is_err());
}

#[test]
fn test_validate_args_rejects_repeated_metric() {
    let ws = Workspace::new();
    let mut args = ws.args();
    args.config.metrics = vec!["score".to_string(), "margin".to_string(), "score".to_string()];
    assert!(validate_args(&args).is_err());
}

// The only test in this binary that installs a process-wide Ctrl-C handler
#[test]
fn test_interrupt_flag_drives_cancellation() {
    let ws = Workspace::new();
    ws.add_game("g1", &game(120, 100));
    ws.list(&["g1"]);

    let stop = install_interrupt_handler().unwrap();
    assert!(!stop.load(Ordering::SeqCst));
    assert!(install_interrupt_handler().is_err());

    stop.store(true, Ordering::SeqCst);
    assert!(execute_aggregate_until(ws.args(), stop).is_err());
    assert!(ws.path("games.cache.json").exists());
    assert!(!ws.path("out/stats.json").exists());
}
