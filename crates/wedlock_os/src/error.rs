#![forbid(unsafe_code)]

use wedlock_engines::certificate::CertificateRegistryError;
use wedlock_kernel_contracts::{ContractViolation, ReasonCodeId};
use wedlock_storage::StorageError;

/// Registry reason-code namespace (0x4D52 = "MR").
/// 0x4D52_00xx: committed / no-op outcomes.
/// 0x4D52_01xx: precondition violations (wrong lifecycle state).
/// 0x4D52_02xx: temporal violations.
/// 0x4D52_03xx: authorization violations.
/// 0x4D52_04xx: invariant violations.
/// 0x4D52_0Fxx: internal failures.
pub mod reason_codes {
    use wedlock_kernel_contracts::ReasonCodeId;

    pub const MR_OK_ENGAGE_PROPOSED: ReasonCodeId = ReasonCodeId(0x4D52_0001);
    pub const MR_OK_ENGAGED: ReasonCodeId = ReasonCodeId(0x4D52_0002);
    pub const MR_OK_DATE_CHANGED: ReasonCodeId = ReasonCodeId(0x4D52_0003);
    pub const MR_OK_REVOKED: ReasonCodeId = ReasonCodeId(0x4D52_0004);
    pub const MR_OK_MARRY_PROPOSED: ReasonCodeId = ReasonCodeId(0x4D52_0005);
    pub const MR_OK_MARRIED: ReasonCodeId = ReasonCodeId(0x4D52_0006);
    pub const MR_OK_GUEST_LIST_PROPOSED: ReasonCodeId = ReasonCodeId(0x4D52_0007);
    pub const MR_OK_GUEST_LIST_CONFIRMED: ReasonCodeId = ReasonCodeId(0x4D52_0008);
    pub const MR_OK_VETO_VOTE: ReasonCodeId = ReasonCodeId(0x4D52_0009);
    pub const MR_OK_VETO_DISSOLVED: ReasonCodeId = ReasonCodeId(0x4D52_000A);
    pub const MR_OK_DIVORCE_VOTE: ReasonCodeId = ReasonCodeId(0x4D52_000B);
    pub const MR_OK_DIVORCED: ReasonCodeId = ReasonCodeId(0x4D52_000C);
    pub const MR_NOOP_CONFIRM_NOT_A_PARTY: ReasonCodeId = ReasonCodeId(0x4D52_0010);
    pub const MR_NOOP_VETO_NOT_A_GUEST: ReasonCodeId = ReasonCodeId(0x4D52_0011);
    pub const MR_NOOP_DIVORCE_NOT_A_PARTY: ReasonCodeId = ReasonCodeId(0x4D52_0012);

    pub const MR_NOT_ENGAGED: ReasonCodeId = ReasonCodeId(0x4D52_0101);
    pub const MR_ALREADY_ENGAGED: ReasonCodeId = ReasonCodeId(0x4D52_0102);
    pub const MR_PARTNER_ALREADY_ENGAGED: ReasonCodeId = ReasonCodeId(0x4D52_0103);
    pub const MR_ALREADY_MARRIED: ReasonCodeId = ReasonCodeId(0x4D52_0104);
    pub const MR_NOT_MARRIED: ReasonCodeId = ReasonCodeId(0x4D52_0105);
    pub const MR_GUEST_LIST_ALREADY_CONFIRMED: ReasonCodeId = ReasonCodeId(0x4D52_0106);
    pub const MR_GUEST_LIST_NOT_CONFIRMED: ReasonCodeId = ReasonCodeId(0x4D52_0107);

    pub const MR_DATE_NOT_FUTURE: ReasonCodeId = ReasonCodeId(0x4D52_0201);
    pub const MR_WEDDING_DAY_STARTED: ReasonCodeId = ReasonCodeId(0x4D52_0202);
    pub const MR_OUTSIDE_WEDDING_WINDOW: ReasonCodeId = ReasonCodeId(0x4D52_0203);

    pub const MR_DIVORCE_WRONG_COUNTERPARTY: ReasonCodeId = ReasonCodeId(0x4D52_0301);

    pub const MR_SELF_ENGAGEMENT: ReasonCodeId = ReasonCodeId(0x4D52_0401);
    pub const MR_PARTNER_IN_GUEST_LIST: ReasonCodeId = ReasonCodeId(0x4D52_0402);
    pub const MR_DUPLICATE_GUEST: ReasonCodeId = ReasonCodeId(0x4D52_0403);
    pub const MR_GUEST_BUDGET_EXCEEDED: ReasonCodeId = ReasonCodeId(0x4D52_0404);

    pub const MR_CONTRACT_INVALID: ReasonCodeId = ReasonCodeId(0x4D52_0F01);
    pub const MR_STORAGE_FAILURE: ReasonCodeId = ReasonCodeId(0x4D52_0F02);
    pub const MR_CERTIFICATE_REGISTRY_FAILURE: ReasonCodeId = ReasonCodeId(0x4D52_0F03);
}

/// Every rejected transaction surfaces as one of these, carrying a
/// reason code for the audit row and a human-readable message. All
/// violations are detected before any mutation; no partial state is
/// ever persisted on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Wrong lifecycle state (not engaged, already engaged, already
    /// married, not married, guest list already/not confirmed).
    Precondition {
        reason_code: ReasonCodeId,
        message: &'static str,
    },
    /// Date not in the future, or the call fell outside the allowed
    /// day window.
    Temporal {
        reason_code: ReasonCodeId,
        message: &'static str,
    },
    /// Caller is a party to the record but named the wrong
    /// counterparty.
    Authorization {
        reason_code: ReasonCodeId,
        message: &'static str,
    },
    /// Structural rule broken (self-engagement, partner among guests,
    /// duplicate guest, guest budget exceeded).
    Invariant {
        reason_code: ReasonCodeId,
        message: &'static str,
    },
    Contract(ContractViolation),
    Storage(StorageError),
    CertificateRegistry(CertificateRegistryError),
}

impl RegistryError {
    pub fn reason_code(&self) -> ReasonCodeId {
        match self {
            RegistryError::Precondition { reason_code, .. }
            | RegistryError::Temporal { reason_code, .. }
            | RegistryError::Authorization { reason_code, .. }
            | RegistryError::Invariant { reason_code, .. } => *reason_code,
            RegistryError::Contract(_) => reason_codes::MR_CONTRACT_INVALID,
            RegistryError::Storage(_) => reason_codes::MR_STORAGE_FAILURE,
            RegistryError::CertificateRegistry(_) => {
                reason_codes::MR_CERTIFICATE_REGISTRY_FAILURE
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RegistryError::Precondition { message, .. }
            | RegistryError::Temporal { message, .. }
            | RegistryError::Authorization { message, .. }
            | RegistryError::Invariant { message, .. } => message,
            RegistryError::Contract(_) => "value failed contract validation",
            RegistryError::Storage(_) => "storage rejected the transition",
            RegistryError::CertificateRegistry(_) => "certificate registry call failed",
        }
    }
}

impl From<ContractViolation> for RegistryError {
    fn from(v: ContractViolation) -> Self {
        RegistryError::Contract(v)
    }
}

impl From<StorageError> for RegistryError {
    fn from(e: StorageError) -> Self {
        RegistryError::Storage(e)
    }
}

impl From<CertificateRegistryError> for RegistryError {
    fn from(e: CertificateRegistryError) -> Self {
        RegistryError::CertificateRegistry(e)
    }
}
