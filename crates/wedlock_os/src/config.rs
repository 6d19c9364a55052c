#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use wedlock_kernel_contracts::record::PrincipalId;
use wedlock_kernel_contracts::{ContractViolation, Validate};

/// Injected kernel configuration. The arbiter set is supplied by the
/// deployer, never compiled in; an empty set simply means divorce
/// requires both partners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WedlockConfig {
    pub authorized_arbiters: BTreeSet<PrincipalId>,
    pub max_guest_count: u8,
}

impl WedlockConfig {
    pub fn mvp_v1(authorized_arbiters: BTreeSet<PrincipalId>) -> Self {
        Self {
            authorized_arbiters,
            max_guest_count: 32,
        }
    }

    pub fn with_max_guest_count(mut self, max_guest_count: u8) -> Self {
        self.max_guest_count = max_guest_count;
        self
    }

    pub fn is_authorized_arbiter(&self, principal: &PrincipalId) -> bool {
        self.authorized_arbiters.contains(principal)
    }
}

impl Validate for WedlockConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.max_guest_count == 0 || self.max_guest_count > 64 {
            return Err(ContractViolation::InvalidRange {
                field: "wedlock_config.max_guest_count",
                min: 1,
                max: 64,
                got: self.max_guest_count as u64,
            });
        }
        for arbiter in &self.authorized_arbiters {
            arbiter.validate()?;
        }
        Ok(())
    }
}
