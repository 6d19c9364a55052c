#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::record::{PrincipalId, RecordKey};
use crate::{ContractViolation, ReasonCodeId, SchemaVersion, UnixTimeSec, Validate};

pub const WEDLOCK_AUDIT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuditEventId(pub u64);

impl Validate for AuditEventId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "audit_event_id",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

/// One public kernel operation per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditOperation {
    Engage,
    ChangeWeddingDate,
    RevokeEngagement,
    Marry,
    ProposeGuestList,
    ConfirmGuestList,
    VoteAgainstWedding,
    Divorce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditOutcome {
    /// State changed and the transaction committed.
    Committed,
    /// A precondition failed; nothing was persisted.
    Rejected,
    /// The call succeeded without changing state (e.g. one-sided
    /// proposal, non-partner confirm, stranger divorce vote).
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInput {
    pub schema_version: SchemaVersion,
    pub occurred_at: UnixTimeSec,
    pub operation: AuditOperation,
    pub principal: PrincipalId,
    pub counterparty: Option<PrincipalId>,
    pub record_key: Option<RecordKey>,
    pub reason_code: ReasonCodeId,
    pub outcome: AuditOutcome,
}

impl AuditEventInput {
    pub fn v1(
        occurred_at: UnixTimeSec,
        operation: AuditOperation,
        principal: PrincipalId,
        counterparty: Option<PrincipalId>,
        record_key: Option<RecordKey>,
        reason_code: ReasonCodeId,
        outcome: AuditOutcome,
    ) -> Result<Self, ContractViolation> {
        let input = Self {
            schema_version: WEDLOCK_AUDIT_CONTRACT_VERSION,
            occurred_at,
            operation,
            principal,
            counterparty,
            record_key,
            reason_code,
            outcome,
        };
        input.validate()?;
        Ok(input)
    }
}

impl Validate for AuditEventInput {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != WEDLOCK_AUDIT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "audit_event_input.schema_version",
                reason: "must match WEDLOCK_AUDIT_CONTRACT_VERSION",
            });
        }
        self.principal.validate()?;
        if let Some(counterparty) = &self.counterparty {
            counterparty.validate()?;
        }
        if let Some(record_key) = &self.record_key {
            record_key.validate()?;
        }
        Ok(())
    }
}

/// A committed ledger row: the input plus its assigned event id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub schema_version: SchemaVersion,
    pub event_id: AuditEventId,
    pub occurred_at: UnixTimeSec,
    pub operation: AuditOperation,
    pub principal: PrincipalId,
    pub counterparty: Option<PrincipalId>,
    pub record_key: Option<RecordKey>,
    pub reason_code: ReasonCodeId,
    pub outcome: AuditOutcome,
}

impl AuditEvent {
    pub fn from_input(event_id: AuditEventId, input: AuditEventInput) -> Self {
        Self {
            schema_version: input.schema_version,
            event_id,
            occurred_at: input.occurred_at,
            operation: input.operation,
            principal: input.principal,
            counterparty: input.counterparty,
            record_key: input.record_key,
            reason_code: input.reason_code,
            outcome: input.outcome,
        }
    }
}
