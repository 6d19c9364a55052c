#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use wedlock_kernel_contracts::audit::{AuditEvent, AuditEventId, AuditEventInput};
use wedlock_kernel_contracts::record::{MarriageRecord, PrincipalId, RecordKey};
use wedlock_kernel_contracts::{ContractViolation, Validate};

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    ForeignKeyViolation { table: &'static str, key: String },
    DuplicateKey { table: &'static str, key: String },
    AppendOnlyViolation { table: &'static str },
    ContractViolation(ContractViolation),
}

impl From<ContractViolation> for StorageError {
    fn from(v: ContractViolation) -> Self {
        StorageError::ContractViolation(v)
    }
}

/// In-memory tables for the registry: one record per principal pair in
/// the arena, a secondary index from each principal to its record key,
/// and an append-only audit ledger. Every mutation validates first and
/// commits whole or not at all.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: BTreeMap<RecordKey, MarriageRecord>,
    principal_index: BTreeMap<PrincipalId, RecordKey>,
    audit_events: Vec<AuditEvent>,
}

impl RecordStore {
    pub fn new_in_memory() -> Self {
        Self::default()
    }

    /// True when the principal is bound to an active record, i.e. is
    /// engaged or married.
    pub fn has_active_record(&self, principal: &PrincipalId) -> bool {
        self.principal_index.contains_key(principal)
    }

    pub fn key_for_principal(&self, principal: &PrincipalId) -> Option<&RecordKey> {
        self.principal_index.get(principal)
    }

    pub fn record(&self, key: &RecordKey) -> Option<&MarriageRecord> {
        self.records.get(key)
    }

    pub fn record_mut(&mut self, key: &RecordKey) -> Option<&mut MarriageRecord> {
        self.records.get_mut(key)
    }

    pub fn record_for_principal(&self, principal: &PrincipalId) -> Option<&MarriageRecord> {
        self.principal_index
            .get(principal)
            .and_then(|key| self.records.get(key))
    }

    pub fn active_record_count(&self) -> usize {
        self.records.len()
    }

    /// Creates the shared record at the moment mutual consent is
    /// reached and binds both partners to it. Fails whole if the key is
    /// already occupied or either partner is already indexed.
    pub fn materialize_record(
        &mut self,
        key: RecordKey,
        record: MarriageRecord,
    ) -> Result<(), StorageError> {
        record.validate()?;
        if self.records.contains_key(&key) {
            return Err(StorageError::DuplicateKey {
                table: "records",
                key: key.as_str().to_string(),
            });
        }
        for partner in [&record.partner1, &record.partner2] {
            if self.principal_index.contains_key(partner) {
                return Err(StorageError::DuplicateKey {
                    table: "principal_index",
                    key: partner.as_str().to_string(),
                });
            }
        }
        self.principal_index
            .insert(record.partner1.clone(), key.clone());
        self.principal_index
            .insert(record.partner2.clone(), key.clone());
        self.records.insert(key, record);
        Ok(())
    }

    /// Full reset on dissolution: the record leaves the arena and both
    /// index entries are removed. Returns the destroyed record.
    pub fn destroy_record(&mut self, key: &RecordKey) -> Result<MarriageRecord, StorageError> {
        let record = self
            .records
            .remove(key)
            .ok_or_else(|| StorageError::ForeignKeyViolation {
                table: "records",
                key: key.as_str().to_string(),
            })?;
        self.principal_index.remove(&record.partner1);
        self.principal_index.remove(&record.partner2);
        Ok(record)
    }

    pub fn append_audit_event(
        &mut self,
        input: AuditEventInput,
    ) -> Result<AuditEventId, StorageError> {
        input.validate()?;
        let event_id = AuditEventId(self.audit_events.len() as u64 + 1);
        self.audit_events.push(AuditEvent::from_input(event_id, input));
        Ok(event_id)
    }

    pub fn audit_events(&self) -> &[AuditEvent] {
        &self.audit_events
    }

    /// The ledger is append-only; any path that would rewrite a
    /// committed row must fail. Kept as an explicit probe so the
    /// invariant stays testable.
    pub fn attempt_overwrite_audit_event(
        &mut self,
        _event_id: AuditEventId,
    ) -> Result<(), StorageError> {
        Err(StorageError::AppendOnlyViolation {
            table: "audit_events",
        })
    }
}
