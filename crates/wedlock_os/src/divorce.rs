#![forbid(unsafe_code)]

use wedlock_engines::certificate::CertificateRegistry;
use wedlock_engines::clock::Clock;
use wedlock_kernel_contracts::audit::{AuditOperation, AuditOutcome};
use wedlock_kernel_contracts::record::{CertificateId, PrincipalId};
use wedlock_storage::StorageError;

use crate::error::{reason_codes, RegistryError};
use crate::kernel::{Tx, WedlockKernel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivorceVoteSlot {
    Partner1,
    Partner2,
    /// One shared slot for every authorized arbiter; a second arbiter
    /// casting it changes nothing.
    Arbiter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DivorceOutcome {
    VoteRecorded { slot: DivorceVoteSlot },
    /// Caller is neither a party to the record nor an arbiter;
    /// deliberately a silent no-op, never an error.
    NoOp,
    /// The 2-of-3 quorum was reached: both certificates burned, record
    /// destroyed.
    Dissolved {
        burned_certificates: [CertificateId; 2],
    },
}

impl<C, R> WedlockKernel<C, R>
where
    C: Clock,
    R: CertificateRegistry,
{
    /// Divorce vote against `married_partner`'s record. Slot 1 and 2
    /// belong to the partners (each must name the other as the
    /// counterparty); any configured arbiter fills the shared slot 3.
    /// Two of three affirmative slots dissolve the marriage.
    pub fn divorce(
        &mut self,
        caller: PrincipalId,
        married_partner: PrincipalId,
    ) -> Result<DivorceOutcome, RegistryError> {
        let now = self.now();
        let tx = self.divorce_tx(&caller, &married_partner);
        self.commit_audited(
            now,
            AuditOperation::Divorce,
            &caller,
            Some(&married_partner),
            tx,
        )
    }

    fn divorce_tx(
        &mut self,
        caller: &PrincipalId,
        married_partner: &PrincipalId,
    ) -> Result<Tx<DivorceOutcome>, RegistryError> {
        let key = self
            .store()
            .key_for_principal(married_partner)
            .cloned()
            .ok_or(RegistryError::Precondition {
                reason_code: reason_codes::MR_NOT_MARRIED,
                message: "named partner is not married",
            })?;
        let record = self
            .store()
            .record(&key)
            .ok_or(RegistryError::Storage(StorageError::ForeignKeyViolation {
                table: "records",
                key: key.as_str().to_string(),
            }))?;
        if !record.is_married() {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_NOT_MARRIED,
                message: "named partner is not married",
            });
        }

        let slot = if *caller == record.partner1 {
            if married_partner != &record.partner2 {
                return Err(RegistryError::Authorization {
                    reason_code: reason_codes::MR_DIVORCE_WRONG_COUNTERPARTY,
                    message: "partner1 must name partner2 as the married partner",
                });
            }
            Some(DivorceVoteSlot::Partner1)
        } else if *caller == record.partner2 {
            if married_partner != &record.partner1 {
                return Err(RegistryError::Authorization {
                    reason_code: reason_codes::MR_DIVORCE_WRONG_COUNTERPARTY,
                    message: "partner2 must name partner1 as the married partner",
                });
            }
            Some(DivorceVoteSlot::Partner2)
        } else if self.config().is_authorized_arbiter(caller) {
            Some(DivorceVoteSlot::Arbiter)
        } else {
            None
        };

        let certificate_ids = (record.certificate_id_p1, record.certificate_id_p2);
        // Staged on a copy so a registry failure below leaves the
        // stored record byte-for-byte untouched.
        let mut prospective = record.divorce_votes;

        if let Some(slot) = slot {
            match slot {
                DivorceVoteSlot::Partner1 => prospective.partner1 = true,
                DivorceVoteSlot::Partner2 => prospective.partner2 = true,
                DivorceVoteSlot::Arbiter => prospective.arbiter = true,
            }
            if prospective.tally() >= 2 {
                let (Some(id1), Some(id2)) = certificate_ids else {
                    return Err(RegistryError::Storage(StorageError::ForeignKeyViolation {
                        table: "records",
                        key: key.as_str().to_string(),
                    }));
                };
                self.certificates_mut().burn(id1)?;
                self.certificates_mut().burn(id2)?;
                self.dissolve_record(&key)?;
                return Ok(Tx {
                    value: DivorceOutcome::Dissolved {
                        burned_certificates: [id1, id2],
                    },
                    reason_code: reason_codes::MR_OK_DIVORCED,
                    outcome: AuditOutcome::Committed,
                    record_key: Some(key),
                });
            }
            let record = self.store_mut().record_mut(&key).ok_or(RegistryError::Storage(
                StorageError::ForeignKeyViolation {
                    table: "records",
                    key: key.as_str().to_string(),
                },
            ))?;
            record.divorce_votes = prospective;
            return Ok(Tx {
                value: DivorceOutcome::VoteRecorded { slot },
                reason_code: reason_codes::MR_OK_DIVORCE_VOTE,
                outcome: AuditOutcome::Committed,
                record_key: Some(key),
            });
        }

        Ok(Tx {
            value: DivorceOutcome::NoOp,
            reason_code: reason_codes::MR_NOOP_DIVORCE_NOT_A_PARTY,
            outcome: AuditOutcome::NoOp,
            record_key: Some(key),
        })
    }
}
