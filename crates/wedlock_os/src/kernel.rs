#![forbid(unsafe_code)]

use wedlock_engines::certificate::CertificateRegistry;
use wedlock_engines::clock::Clock;
use wedlock_engines::consent::ConsentMatcher;
use wedlock_kernel_contracts::audit::{AuditEvent, AuditEventInput, AuditOperation, AuditOutcome};
use wedlock_kernel_contracts::record::{CertificateId, MarriageRecord, PrincipalId, RecordKey};
use wedlock_kernel_contracts::{ContractViolation, ReasonCodeId, UnixTimeSec, Validate};
use wedlock_storage::{RecordStore, StorageError};

use crate::config::WedlockConfig;
use crate::error::{reason_codes, RegistryError};

/// The registry kernel: one shared record per principal pair, mutual
/// consent at every transition, quorum-driven dissolution.
///
/// Execution is strictly serialized: every operation takes `&mut self`
/// and runs to completion, with all preconditions checked before any
/// mutation. Shared deployments wrap the kernel in a `Mutex`; one
/// global critical section is sufficient because no operation blocks.
#[derive(Debug, Clone)]
pub struct WedlockKernel<C, R>
where
    C: Clock,
    R: CertificateRegistry,
{
    config: WedlockConfig,
    store: RecordStore,
    matcher: ConsentMatcher,
    clock: C,
    certificates: R,
    next_certificate_id: u64,
}

/// Internal transaction receipt: the caller-visible value plus what
/// the audit row needs.
pub(crate) struct Tx<T> {
    pub value: T,
    pub reason_code: ReasonCodeId,
    pub outcome: AuditOutcome,
    pub record_key: Option<RecordKey>,
}

impl<C, R> WedlockKernel<C, R>
where
    C: Clock,
    R: CertificateRegistry,
{
    pub fn new(config: WedlockConfig, clock: C, certificates: R) -> Result<Self, ContractViolation> {
        config.validate()?;
        Ok(Self {
            config,
            store: RecordStore::new_in_memory(),
            matcher: ConsentMatcher::new(),
            clock,
            certificates,
            next_certificate_id: 1,
        })
    }

    pub fn config(&self) -> &WedlockConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn audit_events(&self) -> &[AuditEvent] {
        self.store.audit_events()
    }

    pub fn certificates(&self) -> &R {
        &self.certificates
    }

    /// The shared record the caller is bound to, or the canonical
    /// not-engaged rejection.
    pub fn get_engagement_details(
        &self,
        user: &PrincipalId,
    ) -> Result<MarriageRecord, RegistryError> {
        self.store
            .record_for_principal(user)
            .cloned()
            .ok_or(RegistryError::Precondition {
                reason_code: reason_codes::MR_NOT_ENGAGED,
                message: "principal holds no active record",
            })
    }

    /// JSON snapshot of the caller's record, for export surfaces.
    pub fn export_record_json(&self, user: &PrincipalId) -> Result<String, RegistryError> {
        let record = self.get_engagement_details(user)?;
        serde_json::to_string(&record).map_err(|_| {
            RegistryError::Contract(ContractViolation::InvalidValue {
                field: "marriage_record",
                reason: "snapshot failed to serialize",
            })
        })
    }

    pub(crate) fn now(&self) -> UnixTimeSec {
        self.clock.now()
    }

    pub(crate) fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    pub(crate) fn matcher_mut(&mut self) -> &mut ConsentMatcher {
        &mut self.matcher
    }

    pub(crate) fn certificates_mut(&mut self) -> &mut R {
        &mut self.certificates
    }

    pub(crate) fn clock_ref(&self) -> &C {
        &self.clock
    }

    /// Mutable handle to the injected clock; settable clocks use this
    /// in tests and deterministic replay.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub(crate) fn allocate_certificate_id(&mut self) -> CertificateId {
        let id = CertificateId(self.next_certificate_id);
        self.next_certificate_id += 1;
        id
    }

    /// Key and record for a principal with an active record.
    pub(crate) fn active_record(
        &self,
        principal: &PrincipalId,
    ) -> Result<(RecordKey, &MarriageRecord), RegistryError> {
        let key = self
            .store
            .key_for_principal(principal)
            .ok_or(RegistryError::Precondition {
                reason_code: reason_codes::MR_NOT_ENGAGED,
                message: "principal holds no active record",
            })?
            .clone();
        let record = self
            .store
            .record(&key)
            .ok_or(RegistryError::Storage(StorageError::ForeignKeyViolation {
                table: "records",
                key: key.as_str().to_string(),
            }))?;
        Ok((key, record))
    }

    /// Dissolution: the record leaves storage and both partners'
    /// outstanding consent preferences are dropped, so dissolved
    /// principals re-enter the protocol with clean slots.
    pub(crate) fn dissolve_record(&mut self, key: &RecordKey) -> Result<MarriageRecord, RegistryError> {
        let record = self.store.destroy_record(key)?;
        self.matcher.clear_principal(&record.partner1);
        self.matcher.clear_principal(&record.partner2);
        Ok(record)
    }

    /// Appends the audit row for a finished transaction and hands the
    /// caller-visible result back. Rejections are audited too.
    pub(crate) fn commit_audited<T>(
        &mut self,
        occurred_at: UnixTimeSec,
        operation: AuditOperation,
        principal: &PrincipalId,
        counterparty: Option<&PrincipalId>,
        tx: Result<Tx<T>, RegistryError>,
    ) -> Result<T, RegistryError> {
        match tx {
            Ok(tx) => {
                self.append_audit_row(
                    occurred_at,
                    operation,
                    principal,
                    counterparty,
                    tx.record_key.as_ref(),
                    tx.reason_code,
                    tx.outcome,
                )?;
                Ok(tx.value)
            }
            Err(err) => {
                self.append_audit_row(
                    occurred_at,
                    operation,
                    principal,
                    counterparty,
                    None,
                    err.reason_code(),
                    AuditOutcome::Rejected,
                )?;
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn append_audit_row(
        &mut self,
        occurred_at: UnixTimeSec,
        operation: AuditOperation,
        principal: &PrincipalId,
        counterparty: Option<&PrincipalId>,
        record_key: Option<&RecordKey>,
        reason_code: ReasonCodeId,
        outcome: AuditOutcome,
    ) -> Result<(), RegistryError> {
        let input = AuditEventInput::v1(
            occurred_at,
            operation,
            principal.clone(),
            counterparty.cloned(),
            record_key.cloned(),
            reason_code,
            outcome,
        )?;
        self.store.append_audit_event(input)?;
        Ok(())
    }
}
