#![forbid(unsafe_code)]

use wedlock_kernel_contracts::record::{MarriageRecord, PrincipalId, RecordKey};
use wedlock_kernel_contracts::UnixTimeSec;
use wedlock_storage::{RecordStore, StorageError};

fn principal(id: &str) -> PrincipalId {
    PrincipalId::new(id).unwrap()
}

fn key(seed: u8) -> RecordKey {
    RecordKey::new(format!("{:02x}", seed).repeat(32)).unwrap()
}

fn record(p1: &str, p2: &str) -> MarriageRecord {
    MarriageRecord::v1(principal(p1), principal(p2), UnixTimeSec(1_000_000)).unwrap()
}

#[test]
fn at_record_store_db_01_materialize_binds_both_partners() {
    let mut s = RecordStore::new_in_memory();
    s.materialize_record(key(1), record("alice", "bob")).unwrap();

    assert!(s.has_active_record(&principal("alice")));
    assert!(s.has_active_record(&principal("bob")));
    assert_eq!(s.key_for_principal(&principal("alice")), Some(&key(1)));
    assert_eq!(s.key_for_principal(&principal("bob")), Some(&key(1)));
    assert_eq!(s.active_record_count(), 1);

    // One shared record, not one copy per partner.
    let via_alice = s.record_for_principal(&principal("alice")).unwrap();
    let via_bob = s.record_for_principal(&principal("bob")).unwrap();
    assert_eq!(via_alice, via_bob);
}

#[test]
fn at_record_store_db_02_duplicate_key_rejected() {
    let mut s = RecordStore::new_in_memory();
    s.materialize_record(key(1), record("alice", "bob")).unwrap();
    let out = s.materialize_record(key(1), record("carol", "dave"));
    assert!(matches!(
        out,
        Err(StorageError::DuplicateKey { table: "records", .. })
    ));
    // Failed materialization must leave no index entries behind.
    assert!(!s.has_active_record(&principal("carol")));
    assert!(!s.has_active_record(&principal("dave")));
}

#[test]
fn at_record_store_db_03_already_indexed_principal_rejected() {
    let mut s = RecordStore::new_in_memory();
    s.materialize_record(key(1), record("alice", "bob")).unwrap();
    let out = s.materialize_record(key(2), record("alice", "carol"));
    assert!(matches!(
        out,
        Err(StorageError::DuplicateKey {
            table: "principal_index",
            ..
        })
    ));
    assert_eq!(s.active_record_count(), 1);
}

#[test]
fn at_record_store_db_04_destroy_clears_arena_and_index() {
    let mut s = RecordStore::new_in_memory();
    s.materialize_record(key(1), record("alice", "bob")).unwrap();
    let destroyed = s.destroy_record(&key(1)).unwrap();
    assert_eq!(destroyed.partner1, principal("alice"));
    assert_eq!(s.active_record_count(), 0);
    assert!(!s.has_active_record(&principal("alice")));
    assert!(!s.has_active_record(&principal("bob")));
}

#[test]
fn at_record_store_db_05_destroy_unknown_key_is_foreign_key_violation() {
    let mut s = RecordStore::new_in_memory();
    assert!(matches!(
        s.destroy_record(&key(9)),
        Err(StorageError::ForeignKeyViolation { table: "records", .. })
    ));
}

#[test]
fn at_record_store_db_06_record_mut_edits_the_shared_slot() {
    let mut s = RecordStore::new_in_memory();
    s.materialize_record(key(1), record("alice", "bob")).unwrap();
    s.record_mut(&key(1)).unwrap().wedding_date = UnixTimeSec(2_000_000);
    let seen = s.record_for_principal(&principal("bob")).unwrap();
    assert_eq!(seen.wedding_date, UnixTimeSec(2_000_000));
}
