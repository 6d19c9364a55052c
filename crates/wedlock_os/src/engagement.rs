#![forbid(unsafe_code)]

use wedlock_engines::certificate::CertificateRegistry;
use wedlock_engines::clock::Clock;
use wedlock_engines::consent::{ConsentOutcome, ConsentPhase};
use wedlock_engines::record_key::derive_record_key;
use wedlock_kernel_contracts::audit::{AuditOperation, AuditOutcome};
use wedlock_kernel_contracts::record::{MarriageRecord, PrincipalId, RecordKey};
use wedlock_kernel_contracts::UnixTimeSec;
use wedlock_storage::StorageError;

use crate::error::{reason_codes, RegistryError};
use crate::kernel::{Tx, WedlockKernel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngageOutcome {
    /// One-sided proposal, silently recorded; no record exists yet.
    ProposalRecorded,
    /// Both sides proposed each other; the shared record is live.
    Engaged { record_key: RecordKey },
}

impl<C, R> WedlockKernel<C, R>
where
    C: Clock,
    R: CertificateRegistry,
{
    /// Engagement proposal. The first caller's proposal always succeeds
    /// without error even though no record exists yet; the record
    /// materializes the moment the partner's reciprocal call lands,
    /// carrying that completing call's wedding date.
    pub fn engage(
        &mut self,
        caller: PrincipalId,
        partner: PrincipalId,
        wedding_date: UnixTimeSec,
    ) -> Result<EngageOutcome, RegistryError> {
        let now = self.now();
        let tx = self.engage_tx(&caller, &partner, wedding_date, now);
        self.commit_audited(now, AuditOperation::Engage, &caller, Some(&partner), tx)
    }

    fn engage_tx(
        &mut self,
        caller: &PrincipalId,
        partner: &PrincipalId,
        wedding_date: UnixTimeSec,
        now: UnixTimeSec,
    ) -> Result<Tx<EngageOutcome>, RegistryError> {
        if caller == partner {
            return Err(RegistryError::Invariant {
                reason_code: reason_codes::MR_SELF_ENGAGEMENT,
                message: "cannot engage to oneself",
            });
        }
        if self.store().has_active_record(caller) {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_ALREADY_ENGAGED,
                message: "caller is already engaged or married",
            });
        }
        if self.store().has_active_record(partner) {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_PARTNER_ALREADY_ENGAGED,
                message: "partner is already engaged or married",
            });
        }
        if wedding_date <= now {
            return Err(RegistryError::Temporal {
                reason_code: reason_codes::MR_DATE_NOT_FUTURE,
                message: "wedding date must be strictly in the future",
            });
        }

        match self
            .matcher_mut()
            .propose(ConsentPhase::Engagement, caller, partner)
        {
            ConsentOutcome::ProposalRecorded => Ok(Tx {
                value: EngageOutcome::ProposalRecorded,
                reason_code: reason_codes::MR_OK_ENGAGE_PROPOSED,
                outcome: AuditOutcome::NoOp,
                record_key: None,
            }),
            ConsentOutcome::MutualMatch => {
                let key = derive_record_key(caller, partner);
                // Slot order is incidental; the first proposer lands in
                // partner1, the completing caller in partner2.
                let record = MarriageRecord::v1(partner.clone(), caller.clone(), wedding_date)?;
                self.store_mut().materialize_record(key.clone(), record)?;
                Ok(Tx {
                    value: EngageOutcome::Engaged {
                        record_key: key.clone(),
                    },
                    reason_code: reason_codes::MR_OK_ENGAGED,
                    outcome: AuditOutcome::Committed,
                    record_key: Some(key),
                })
            }
        }
    }

    /// Overwrites the shared record's date for both partners. The
    /// source did not re-validate the new date against the clock;
    /// behavior kept as observed.
    pub fn change_wedding_date(
        &mut self,
        caller: PrincipalId,
        new_date: UnixTimeSec,
    ) -> Result<(), RegistryError> {
        let now = self.now();
        let tx = self.change_wedding_date_tx(&caller, new_date);
        self.commit_audited(now, AuditOperation::ChangeWeddingDate, &caller, None, tx)
    }

    fn change_wedding_date_tx(
        &mut self,
        caller: &PrincipalId,
        new_date: UnixTimeSec,
    ) -> Result<Tx<()>, RegistryError> {
        let (key, record) = self.active_record(caller)?;
        if record.is_married() {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_ALREADY_MARRIED,
                message: "caller is already married",
            });
        }
        self.store_mut()
            .record_mut(&key)
            .ok_or(RegistryError::Storage(StorageError::ForeignKeyViolation {
                table: "records",
                key: key.as_str().to_string(),
            }))?
            .wedding_date = new_date;
        Ok(Tx {
            value: (),
            reason_code: reason_codes::MR_OK_DATE_CHANGED,
            outcome: AuditOutcome::Committed,
            record_key: Some(key),
        })
    }

    /// Unilateral exit from an engagement, allowed only while the
    /// wedding day has not started (`now <= day_start`).
    pub fn revoke_engagement(&mut self, caller: PrincipalId) -> Result<(), RegistryError> {
        let now = self.now();
        let tx = self.revoke_engagement_tx(&caller, now);
        self.commit_audited(now, AuditOperation::RevokeEngagement, &caller, None, tx)
    }

    fn revoke_engagement_tx(
        &mut self,
        caller: &PrincipalId,
        now: UnixTimeSec,
    ) -> Result<Tx<()>, RegistryError> {
        let (key, record) = self.active_record(caller)?;
        if record.is_married() {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_ALREADY_MARRIED,
                message: "caller is already married",
            });
        }
        let wedding_day_start = self.clock_ref().day_start(record.wedding_date);
        if now > wedding_day_start {
            return Err(RegistryError::Temporal {
                reason_code: reason_codes::MR_WEDDING_DAY_STARTED,
                message: "wedding day has already started",
            });
        }
        self.dissolve_record(&key)?;
        Ok(Tx {
            value: (),
            reason_code: reason_codes::MR_OK_REVOKED,
            outcome: AuditOutcome::Committed,
            record_key: Some(key),
        })
    }
}
