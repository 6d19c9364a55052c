#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::{ContractViolation, SchemaVersion, UnixTimeSec, Validate};

pub const WEDLOCK_RECORD_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// An already-authenticated caller identity. The outer transport layer
/// establishes it; inside the kernel it is opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let id = id.into();
        let v = Self(id);
        v.validate()?;
        Ok(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for PrincipalId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_id("principal_id", &self.0, 64)
    }
}

/// Canonical identifier of the shared record for an unordered principal
/// pair. Always 64 lowercase hex characters (SHA-256). Derivation lives
/// in the engines crate; the contract only enforces the shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ContractViolation> {
        let key = key.into();
        let v = Self(key);
        v.validate()?;
        Ok(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Infallible construction from a 32-byte digest; always yields a
    /// contract-valid key.
    pub fn from_digest_bytes(digest: &[u8; 32]) -> Self {
        let mut hex = String::with_capacity(64);
        for byte in digest {
            hex.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            hex.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
        Self(hex)
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

impl Validate for RecordKey {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0.len() != 64 {
            return Err(ContractViolation::InvalidValue {
                field: "record_key",
                reason: "must be 64 hex characters",
            });
        }
        if !self.0.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return Err(ContractViolation::InvalidValue {
                field: "record_key",
                reason: "must be lowercase hex",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CertificateId(pub u64);

impl Validate for CertificateId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "certificate_id",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

/// Lifecycle of a materialized record. The source tracked two booleans
/// and never cleared `isEngaged` on marriage; `Married` therefore
/// subsumes engaged, and dissolution removes the record outright rather
/// than adding a third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordState {
    Engaged,
    Married,
}

/// Divorce votes. Slots 1 and 2 belong to partner1 and partner2; slot 3
/// is shared by every authorized arbiter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivorceVotes {
    pub partner1: bool,
    pub partner2: bool,
    pub arbiter: bool,
}

impl DivorceVotes {
    pub fn tally(&self) -> u8 {
        self.partner1 as u8 + self.partner2 as u8 + self.arbiter as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestList {
    pub guests: Vec<PrincipalId>,
    /// Index-aligned with `guests`; a true vote is never retracted.
    pub votes: Vec<bool>,
    pub partner1_confirmed: bool,
    pub partner2_confirmed: bool,
}

impl GuestList {
    pub fn is_doubly_confirmed(&self) -> bool {
        self.partner1_confirmed && self.partner2_confirmed
    }

    pub fn affirmative_votes(&self) -> usize {
        self.votes.iter().filter(|v| **v).count()
    }

    /// Strict majority of guest slots: with 5 guests, 3 votes dissolve.
    pub fn veto_quorum_reached(&self) -> bool {
        !self.guests.is_empty() && self.affirmative_votes() > self.guests.len() / 2
    }
}

impl Validate for GuestList {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.guests.len() != self.votes.len() {
            return Err(ContractViolation::InvalidValue {
                field: "guest_list.votes",
                reason: "must be index-aligned with guests",
            });
        }
        for guest in &self.guests {
            guest.validate()?;
        }
        for (i, guest) in self.guests.iter().enumerate() {
            if self.guests[..i].contains(guest) {
                return Err(ContractViolation::InvalidValue {
                    field: "guest_list.guests",
                    reason: "must not contain duplicates",
                });
            }
        }
        Ok(())
    }
}

/// The shared engagement/marriage state for one principal pair. One
/// record per pair, reused in place across both phases, destroyed on
/// revocation, guest veto, or divorce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriageRecord {
    pub schema_version: SchemaVersion,
    pub partner1: PrincipalId,
    pub partner2: PrincipalId,
    pub wedding_date: UnixTimeSec,
    pub state: RecordState,
    pub guest_list: GuestList,
    pub certificate_id_p1: Option<CertificateId>,
    pub certificate_id_p2: Option<CertificateId>,
    pub divorce_votes: DivorceVotes,
}

impl MarriageRecord {
    /// Fresh record at the moment mutual engagement consent is reached.
    pub fn v1(
        partner1: PrincipalId,
        partner2: PrincipalId,
        wedding_date: UnixTimeSec,
    ) -> Result<Self, ContractViolation> {
        let record = Self {
            schema_version: WEDLOCK_RECORD_CONTRACT_VERSION,
            partner1,
            partner2,
            wedding_date,
            state: RecordState::Engaged,
            guest_list: GuestList::default(),
            certificate_id_p1: None,
            certificate_id_p2: None,
            divorce_votes: DivorceVotes::default(),
        };
        record.validate()?;
        Ok(record)
    }

    /// The source never cleared `isEngaged` on marriage, so a married
    /// record still answers engaged.
    pub fn is_engaged(&self) -> bool {
        matches!(self.state, RecordState::Engaged | RecordState::Married)
    }

    pub fn is_married(&self) -> bool {
        self.state == RecordState::Married
    }

    pub fn is_party(&self, principal: &PrincipalId) -> bool {
        self.partner1 == *principal || self.partner2 == *principal
    }

    /// The other half of the pair, if `principal` is a party at all.
    pub fn partner_of(&self, principal: &PrincipalId) -> Option<&PrincipalId> {
        if self.partner1 == *principal {
            Some(&self.partner2)
        } else if self.partner2 == *principal {
            Some(&self.partner1)
        } else {
            None
        }
    }
}

impl Validate for MarriageRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != WEDLOCK_RECORD_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "marriage_record.schema_version",
                reason: "must match WEDLOCK_RECORD_CONTRACT_VERSION",
            });
        }
        self.partner1.validate()?;
        self.partner2.validate()?;
        if self.partner1 == self.partner2 {
            return Err(ContractViolation::InvalidValue {
                field: "marriage_record.partner2",
                reason: "partners must be distinct",
            });
        }
        self.guest_list.validate()?;
        if self.guest_list.guests.contains(&self.partner1)
            || self.guest_list.guests.contains(&self.partner2)
        {
            return Err(ContractViolation::InvalidValue {
                field: "marriage_record.guest_list",
                reason: "partners must not appear as guests",
            });
        }
        if let Some(id) = self.certificate_id_p1 {
            id.validate()?;
        }
        if let Some(id) = self.certificate_id_p2 {
            id.validate()?;
        }
        let has_certificates = self.certificate_id_p1.is_some() || self.certificate_id_p2.is_some();
        if has_certificates && self.state != RecordState::Married {
            return Err(ContractViolation::InvalidValue {
                field: "marriage_record.certificate_id_p1",
                reason: "certificates exist only after marriage",
            });
        }
        Ok(())
    }
}

fn validate_id(field: &'static str, s: &str, max_len: usize) -> Result<(), ContractViolation> {
    if s.trim().is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must not be empty",
        });
    }
    if s.len() > max_len {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "too long",
        });
    }
    if !s.is_ascii() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be ASCII",
        });
    }
    Ok(())
}
