#![forbid(unsafe_code)]
use chrono::NaiveDate;
use support_rota::model::{DateRange, MemberId, NewAssignment, NewMember, Region};
use support_rota::scheduler::{ConflictQuery, ConflictSource, RotaError};
use support_rota::{MemoryStore, RecordStore, Rota};

#[test]
fn overlapping_holiday_reported_once() {
    let mut rota = Rota::new(MemoryStore::new());
    let alice = add(&mut rota, "alice", Region::Us, None);
    let bob = add(&mut rota, "bob", Region::Uk, None);
    off(&mut rota, alice, range(d(2024, 12, 10), d(2024, 12, 20)));
    off(&mut rota, alice, range(d(2024, 12, 14), d(2024, 12, 18)));

    let query = ConflictQuery {
        period: range(d(2024, 12, 15), d(2024, 12, 16)),
        us_member: Some(alice),
        uk_member: Some(bob),
    };
    let report = rota.check_conflicts(&query).unwrap();

    assert!(report.has_conflict);
    assert_eq!(report.conflicting_members.len(), 1);
    let conflict = &report.conflicting_members[0];
    assert_eq!(conflict.member.id, alice);
    assert_eq!(conflict.region, Region::Us);
    // dates du congé recopiées sur le membre renvoyé
    assert_eq!(
        conflict.member.unavailable,
        Some(range(d(2024, 12, 10), d(2024, 12, 20)))
    );

    // le store n'est pas modifié
    let stored = rota.store().get_member(alice).unwrap().unwrap();
    assert_eq!(stored.unavailable, None);
}

#[test]
fn adjacent_holiday_is_not_a_conflict() {
    let mut rota = Rota::new(MemoryStore::new());
    let alice = add(&mut rota, "alice", Region::Us, None);
    off(&mut rota, alice, range(d(2024, 12, 2), d(2024, 12, 8)));

    let query = ConflictQuery {
        period: range(d(2024, 12, 9), d(2024, 12, 13)),
        us_member: Some(alice),
        uk_member: None,
    };
    let report = rota.check_conflicts(&query).unwrap();
    assert!(!report.has_conflict);
    assert!(report.conflicting_members.is_empty());
}

#[test]
fn legacy_and_holiday_both_reported() {
    let mut rota = Rota::new(MemoryStore::new());
    let legacy = range(d(2024, 12, 9), d(2024, 12, 10));
    let bob = add(&mut rota, "bob", Region::Uk, Some(legacy));
    off(&mut rota, bob, range(d(2024, 12, 10), d(2024, 12, 12)));

    let query = ConflictQuery {
        period: range(d(2024, 12, 10), d(2024, 12, 10)),
        us_member: None,
        uk_member: Some(bob),
    };
    let report = rota.check_conflicts(&query).unwrap();
    let sources: Vec<ConflictSource> = report.conflicting_members.iter().map(|c| c.source).collect();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0], ConflictSource::Legacy);
    assert!(matches!(sources[1], ConflictSource::Holiday(_)));
}

#[test]
fn unknown_member_is_a_validation_error() {
    let rota = Rota::new(MemoryStore::new());
    let query = ConflictQuery {
        period: range(d(2024, 12, 9), d(2024, 12, 9)),
        us_member: Some(MemberId::new(42)),
        uk_member: None,
    };
    let err = rota.check_conflicts(&query).unwrap_err();
    assert!(matches!(err, RotaError::UnknownMember(id) if id == MemberId::new(42)));
    assert!(err.is_validation());
}

#[test]
fn member_in_the_wrong_slot_is_rejected() {
    let mut rota = Rota::new(MemoryStore::new());
    let bob = add(&mut rota, "bob", Region::Uk, None);
    off(&mut rota, bob, range(d(2024, 12, 9), d(2024, 12, 13)));

    let query = ConflictQuery {
        period: range(d(2024, 12, 9), d(2024, 12, 13)),
        us_member: Some(bob),
        uk_member: None,
    };
    let err = rota.check_conflicts(&query).unwrap_err();
    assert!(matches!(err, RotaError::RegionMismatch { member, region: Region::Us } if member == bob));
    assert!(err.is_validation());
}

#[test]
fn manual_assignment_blocked_unless_forced() {
    let mut rota = Rota::new(MemoryStore::new());
    let alice = add(&mut rota, "alice", Region::Us, None);
    let bob = add(&mut rota, "bob", Region::Uk, None);
    off(&mut rota, bob, range(d(2024, 12, 11), d(2024, 12, 11)));

    let draft = NewAssignment::manual(range(d(2024, 12, 9), d(2024, 12, 13)), Some(alice), Some(bob));
    let err = rota.create_assignment(draft.clone(), false).unwrap_err();
    match err {
        RotaError::Conflicting(report) => {
            assert_eq!(report.conflicting_members.len(), 1);
            assert_eq!(report.conflicting_members[0].member.id, bob);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(rota.store().list_assignments().unwrap().is_empty());

    let created = rota.create_assignment(draft, true).unwrap();
    assert!(created.manual);
    assert_eq!(rota.scan_conflicts().unwrap().len(), 1);
}

#[test]
fn manual_assignment_checks_regions() {
    let mut rota = Rota::new(MemoryStore::new());
    let alice = add(&mut rota, "alice", Region::Us, None);

    let swapped = NewAssignment::manual(range(d(2024, 12, 9), d(2024, 12, 9)), None, Some(alice));
    let err = rota.create_assignment(swapped, false).unwrap_err();
    assert!(matches!(err, RotaError::RegionMismatch { region: Region::Uk, .. }));

    let empty = NewAssignment::manual(range(d(2024, 12, 9), d(2024, 12, 9)), None, None);
    assert!(matches!(
        rota.create_assignment(empty, false).unwrap_err(),
        RotaError::EmptyAssignment
    ));
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

fn add(
    rota: &mut Rota<MemoryStore>,
    name: &str,
    region: Region,
    unavailable: Option<DateRange>,
) -> MemberId {
    let mut member = NewMember::new(name, format!("{name}@example.com"), region);
    member.unavailable = unavailable;
    rota.store_mut().create_member(member).unwrap().id
}

fn off(rota: &mut Rota<MemoryStore>, id: MemberId, period: DateRange) {
    rota.store_mut().create_holiday(id, period, None).unwrap();
}
