#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use wedlock_kernel_contracts::record::{CertificateId, PrincipalId};
use wedlock_kernel_contracts::UnixTimeSec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRegistryError {
    pub message: &'static str,
}

impl CertificateRegistryError {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Port to the external certificate service. Identifiers are assigned
/// by the caller (the kernel keeps the counter); the registry only
/// issues and revokes.
pub trait CertificateRegistry {
    fn mint(
        &mut self,
        owner: &PrincipalId,
        certificate_id: CertificateId,
        partner1: &PrincipalId,
        partner2: &PrincipalId,
        wedding_date: UnixTimeSec,
    ) -> Result<(), CertificateRegistryError>;

    fn burn(&mut self, certificate_id: CertificateId) -> Result<(), CertificateRegistryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedCertificate {
    pub owner: PrincipalId,
    pub partner1: PrincipalId,
    pub partner2: PrincipalId,
    pub wedding_date: UnixTimeSec,
}

/// Reference implementation backing tests and local runs. Tracks live
/// certificates, rejects duplicate mints and unknown burns.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCertificateRegistry {
    live: BTreeMap<CertificateId, MintedCertificate>,
    burned: Vec<CertificateId>,
}

impl InMemoryCertificateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_certificate(&self, id: CertificateId) -> Option<&MintedCertificate> {
        self.live.get(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn burned_ids(&self) -> &[CertificateId] {
        &self.burned
    }
}

impl CertificateRegistry for InMemoryCertificateRegistry {
    fn mint(
        &mut self,
        owner: &PrincipalId,
        certificate_id: CertificateId,
        partner1: &PrincipalId,
        partner2: &PrincipalId,
        wedding_date: UnixTimeSec,
    ) -> Result<(), CertificateRegistryError> {
        if self.live.contains_key(&certificate_id) {
            return Err(CertificateRegistryError::new(
                "certificate id already minted",
            ));
        }
        self.live.insert(
            certificate_id,
            MintedCertificate {
                owner: owner.clone(),
                partner1: partner1.clone(),
                partner2: partner2.clone(),
                wedding_date,
            },
        );
        Ok(())
    }

    fn burn(&mut self, certificate_id: CertificateId) -> Result<(), CertificateRegistryError> {
        if self.live.remove(&certificate_id).is_none() {
            return Err(CertificateRegistryError::new(
                "certificate id is not live",
            ));
        }
        self.burned.push(certificate_id);
        Ok(())
    }
}
