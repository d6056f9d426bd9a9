#![forbid(unsafe_code)]
use chrono::NaiveDate;
use std::fs;
use support_rota::model::{DateRange, MemberId, NewMember, Region};
use support_rota::scheduler::{ConflictQuery, ConflictSource, FairnessStrategy, PlanMode, RotaError};
use support_rota::{MemoryStore, RecordStore, Rota, RotaConfig};
use tempfile::tempdir;

#[test]
fn partial_config_file_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rota-config.json");
    fs::write(&path, r#"{"next_week_strategy":"load-balancing","horizon_weeks":4}"#).unwrap();

    let config = RotaConfig::load(&path).unwrap();
    assert_eq!(config.next_week_strategy, FairnessStrategy::LoadBalancing);
    assert_eq!(config.horizon_weeks, 4);
    assert_eq!(config.period_strategy, FairnessStrategy::LoadBalancing);
    assert!(config.honor_legacy_unavailability);

    let none: Option<&std::path::Path> = None;
    assert_eq!(RotaConfig::load_or_default(none).unwrap(), RotaConfig::default());
}

#[test]
fn invalid_config_files_are_rejected() {
    let dir = tempdir().unwrap();
    let cases = [
        ("zero.json", r#"{"horizon_weeks":0}"#),
        ("huge.json", r#"{"horizon_weeks":100000}"#),
        ("strategy.json", r#"{"period_strategy":"round-robin"}"#),
        ("broken.json", "{"),
    ];
    for (name, body) in cases {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        assert!(RotaConfig::load(&path).is_err(), "{name} should be rejected");
    }
    assert!(RotaConfig::load(dir.path().join("missing.json")).is_err());
}

#[test]
fn legacy_range_blocks_by_default() {
    let (rota, alice) = legacy_team(RotaConfig::default());

    let err = rota
        .plan_period(week(), FairnessStrategy::LoadBalancing)
        .unwrap_err();
    assert!(matches!(err, RotaError::NoCandidate { .. }));

    let report = rota.check_conflicts(&alice_query(alice)).unwrap();
    assert!(report.has_conflict);
    assert_eq!(report.conflicting_members[0].source, ConflictSource::Legacy);
}

#[test]
fn legacy_range_ignored_when_disabled() {
    let config = RotaConfig {
        honor_legacy_unavailability: false,
        ..RotaConfig::default()
    };
    let (rota, alice) = legacy_team(config);

    let plan = rota
        .plan_period(week(), FairnessStrategy::LoadBalancing)
        .unwrap();
    assert_eq!(plan.mode, PlanMode::FullPeriod);
    assert!(plan.assignments.iter().all(|p| p.us_member == alice));

    let report = rota.check_conflicts(&alice_query(alice)).unwrap();
    assert!(!report.has_conflict);
    assert!(rota.scan_conflicts().unwrap().is_empty());
}

fn legacy_team(config: RotaConfig) -> (Rota<MemoryStore>, MemberId) {
    let mut store = MemoryStore::new();
    let mut alice = NewMember::new("alice", "alice@example.com", Region::Us);
    alice.unavailable = Some(week());
    let alice = store.create_member(alice).unwrap().id;
    store
        .create_member(NewMember::new("bob", "bob@example.com", Region::Uk))
        .unwrap();
    (Rota::with_config(store, config), alice)
}

fn alice_query(alice: MemberId) -> ConflictQuery {
    ConflictQuery {
        period: week(),
        us_member: Some(alice),
        uk_member: None,
    }
}

fn week() -> DateRange {
    DateRange::new(d(2024, 12, 9), d(2024, 12, 13)).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}
