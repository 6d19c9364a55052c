#![forbid(unsafe_code)]

use wedlock_kernel_contracts::audit::{
    AuditEventId, AuditEventInput, AuditOperation, AuditOutcome,
};
use wedlock_kernel_contracts::record::PrincipalId;
use wedlock_kernel_contracts::{ReasonCodeId, UnixTimeSec};
use wedlock_storage::{RecordStore, StorageError};

fn ev(t: u64, operation: AuditOperation, outcome: AuditOutcome) -> AuditEventInput {
    AuditEventInput::v1(
        UnixTimeSec(t),
        operation,
        PrincipalId::new("alice").unwrap(),
        Some(PrincipalId::new("bob").unwrap()),
        None,
        ReasonCodeId(0x4D52_0001),
        outcome,
    )
    .unwrap()
}

#[test]
fn at_audit_db_01_append_assigns_sequential_ids() {
    let mut s = RecordStore::new_in_memory();
    let id1 = s
        .append_audit_event(ev(10, AuditOperation::Engage, AuditOutcome::NoOp))
        .unwrap();
    let id2 = s
        .append_audit_event(ev(11, AuditOperation::Engage, AuditOutcome::Committed))
        .unwrap();
    assert_eq!(id1, AuditEventId(1));
    assert_eq!(id2, AuditEventId(2));
    assert_eq!(s.audit_events().len(), 2);
    assert_eq!(s.audit_events()[1].outcome, AuditOutcome::Committed);
}

#[test]
fn at_audit_db_02_append_only_enforced() {
    let mut s = RecordStore::new_in_memory();
    let id = s
        .append_audit_event(ev(20, AuditOperation::Marry, AuditOutcome::Committed))
        .unwrap();
    assert!(matches!(
        s.attempt_overwrite_audit_event(id),
        Err(StorageError::AppendOnlyViolation { .. })
    ));
}

#[test]
fn at_audit_db_03_rejected_transactions_are_audited_rows_too() {
    let mut s = RecordStore::new_in_memory();
    s.append_audit_event(ev(30, AuditOperation::Divorce, AuditOutcome::Rejected))
        .unwrap();
    assert_eq!(s.audit_events()[0].outcome, AuditOutcome::Rejected);
}
