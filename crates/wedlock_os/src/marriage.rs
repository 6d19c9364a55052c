#![forbid(unsafe_code)]

use wedlock_engines::certificate::CertificateRegistry;
use wedlock_engines::clock::Clock;
use wedlock_engines::consent::{ConsentOutcome, ConsentPhase};
use wedlock_kernel_contracts::audit::{AuditOperation, AuditOutcome};
use wedlock_kernel_contracts::record::{CertificateId, GuestList, PrincipalId, RecordState};
use wedlock_kernel_contracts::UnixTimeSec;
use wedlock_storage::StorageError;

use crate::error::{reason_codes, RegistryError};
use crate::kernel::{Tx, WedlockKernel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarryOutcome {
    /// The caller's marriage consent is on file; awaiting the partner.
    ProposalRecorded,
    /// Both consents landed inside the wedding-day window; the record
    /// is married and both certificates are live.
    Married {
        certificate_id_p1: CertificateId,
        certificate_id_p2: CertificateId,
    },
}

impl<C, R> WedlockKernel<C, R>
where
    C: Clock,
    R: CertificateRegistry,
{
    /// Marriage consent. Both partners must call within the wedding-day
    /// window `[day_start, day_end)`. The marriage-phase rendezvous
    /// reuses the preference slots the engagement match cleared. On the
    /// completing call: the record flips to `Married`, a guest list
    /// that was never doubly confirmed is discarded, and one
    /// certificate per partner is minted before the record is touched,
    /// so a registry failure leaves the record unmarried.
    pub fn marry(&mut self, caller: PrincipalId) -> Result<MarryOutcome, RegistryError> {
        let now = self.now();
        let tx = self.marry_tx(&caller, now);
        self.commit_audited(now, AuditOperation::Marry, &caller, None, tx)
    }

    fn marry_tx(
        &mut self,
        caller: &PrincipalId,
        now: UnixTimeSec,
    ) -> Result<Tx<MarryOutcome>, RegistryError> {
        let (key, record) = self.active_record(caller)?;
        if record.is_married() {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_ALREADY_MARRIED,
                message: "caller is already married",
            });
        }
        let window_start = self.clock_ref().day_start(record.wedding_date);
        let window_end = self.clock_ref().day_end(record.wedding_date);
        if now < window_start || now >= window_end {
            return Err(RegistryError::Temporal {
                reason_code: reason_codes::MR_OUTSIDE_WEDDING_WINDOW,
                message: "marriage is only possible during the wedding day",
            });
        }
        let partner = record.partner_of(caller).cloned().ok_or(RegistryError::Storage(
            StorageError::ForeignKeyViolation {
                table: "principal_index",
                key: caller.as_str().to_string(),
            },
        ))?;
        let partner1 = record.partner1.clone();
        let partner2 = record.partner2.clone();
        let wedding_date = record.wedding_date;

        match self
            .matcher_mut()
            .propose(ConsentPhase::Marriage, caller, &partner)
        {
            ConsentOutcome::ProposalRecorded => Ok(Tx {
                value: MarryOutcome::ProposalRecorded,
                reason_code: reason_codes::MR_OK_MARRY_PROPOSED,
                outcome: AuditOutcome::NoOp,
                record_key: Some(key),
            }),
            ConsentOutcome::MutualMatch => {
                let certificate_id_p1 = self.allocate_certificate_id();
                let certificate_id_p2 = self.allocate_certificate_id();
                self.certificates_mut().mint(
                    &partner1,
                    certificate_id_p1,
                    &partner1,
                    &partner2,
                    wedding_date,
                )?;
                if let Err(err) = self.certificates_mut().mint(
                    &partner2,
                    certificate_id_p2,
                    &partner1,
                    &partner2,
                    wedding_date,
                ) {
                    // The pair mints as a unit: revoke the first
                    // certificate so none stays live on failure.
                    let _ = self.certificates_mut().burn(certificate_id_p1);
                    return Err(RegistryError::CertificateRegistry(err));
                }

                let record = self.store_mut().record_mut(&key).ok_or(RegistryError::Storage(
                    StorageError::ForeignKeyViolation {
                        table: "records",
                        key: key.as_str().to_string(),
                    },
                ))?;
                record.state = RecordState::Married;
                if !record.guest_list.is_doubly_confirmed() {
                    record.guest_list = GuestList::default();
                }
                record.certificate_id_p1 = Some(certificate_id_p1);
                record.certificate_id_p2 = Some(certificate_id_p2);

                Ok(Tx {
                    value: MarryOutcome::Married {
                        certificate_id_p1,
                        certificate_id_p2,
                    },
                    reason_code: reason_codes::MR_OK_MARRIED,
                    outcome: AuditOutcome::Committed,
                    record_key: Some(key),
                })
            }
        }
    }
}
