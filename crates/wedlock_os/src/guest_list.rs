#![forbid(unsafe_code)]

use wedlock_engines::certificate::CertificateRegistry;
use wedlock_engines::clock::Clock;
use wedlock_kernel_contracts::audit::{AuditOperation, AuditOutcome};
use wedlock_kernel_contracts::record::PrincipalId;
use wedlock_kernel_contracts::UnixTimeSec;
use wedlock_storage::StorageError;

use crate::error::{reason_codes, RegistryError};
use crate::kernel::{Tx, WedlockKernel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmGuestListOutcome {
    Confirmed,
    /// The caller is neither partner; deliberately a silent no-op,
    /// never an error.
    NotAParty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VetoOutcome {
    /// Whether the caller matched a guest slot and their vote was set.
    pub vote_recorded: bool,
    /// Affirmative votes after this call; already-true votes count
    /// even when the caller is not a guest.
    pub affirmative_votes: usize,
    /// True when the strict-majority quorum dissolved the engagement.
    pub dissolved: bool,
}

impl<C, R> WedlockKernel<C, R>
where
    C: Clock,
    R: CertificateRegistry,
{
    /// Replaces the guest list wholesale: votes reset to all-false,
    /// both confirmation flags reset, then the caller's own
    /// confirmation is applied, so only the partner's confirm remains
    /// outstanding.
    pub fn propose_guest_list(
        &mut self,
        caller: PrincipalId,
        guests: Vec<PrincipalId>,
    ) -> Result<(), RegistryError> {
        let now = self.now();
        let tx = self.propose_guest_list_tx(&caller, guests);
        self.commit_audited(now, AuditOperation::ProposeGuestList, &caller, None, tx)
    }

    fn propose_guest_list_tx(
        &mut self,
        caller: &PrincipalId,
        guests: Vec<PrincipalId>,
    ) -> Result<Tx<()>, RegistryError> {
        let (key, record) = self.active_record(caller)?;
        if record.guest_list.is_doubly_confirmed() {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_GUEST_LIST_ALREADY_CONFIRMED,
                message: "guest list is already confirmed by both partners",
            });
        }
        if guests.len() > self.config().max_guest_count as usize {
            return Err(RegistryError::Invariant {
                reason_code: reason_codes::MR_GUEST_BUDGET_EXCEEDED,
                message: "guest list exceeds the configured budget",
            });
        }
        if guests.contains(&record.partner1) || guests.contains(&record.partner2) {
            return Err(RegistryError::Invariant {
                reason_code: reason_codes::MR_PARTNER_IN_GUEST_LIST,
                message: "partners must not appear in the guest list",
            });
        }
        for (i, guest) in guests.iter().enumerate() {
            if guests[..i].contains(guest) {
                return Err(RegistryError::Invariant {
                    reason_code: reason_codes::MR_DUPLICATE_GUEST,
                    message: "guest list must not contain duplicates",
                });
            }
        }

        let caller_is_partner1 = record.partner1 == *caller;
        let record = self.store_mut().record_mut(&key).ok_or(RegistryError::Storage(
            StorageError::ForeignKeyViolation {
                table: "records",
                key: key.as_str().to_string(),
            },
        ))?;
        record.guest_list.votes = vec![false; guests.len()];
        record.guest_list.guests = guests;
        record.guest_list.partner1_confirmed = caller_is_partner1;
        record.guest_list.partner2_confirmed = !caller_is_partner1;
        Ok(Tx {
            value: (),
            reason_code: reason_codes::MR_OK_GUEST_LIST_PROPOSED,
            outcome: AuditOutcome::Committed,
            record_key: Some(key),
        })
    }

    pub fn confirm_guest_list(
        &mut self,
        caller: PrincipalId,
    ) -> Result<ConfirmGuestListOutcome, RegistryError> {
        let now = self.now();
        let tx = self.confirm_guest_list_tx(&caller);
        self.commit_audited(now, AuditOperation::ConfirmGuestList, &caller, None, tx)
    }

    fn confirm_guest_list_tx(
        &mut self,
        caller: &PrincipalId,
    ) -> Result<Tx<ConfirmGuestListOutcome>, RegistryError> {
        let (key, record) = self.active_record(caller)?;
        let slot = if record.partner1 == *caller {
            Some(true)
        } else if record.partner2 == *caller {
            Some(false)
        } else {
            None
        };
        match slot {
            Some(is_partner1) => {
                let record = self.store_mut().record_mut(&key).ok_or(RegistryError::Storage(
                    StorageError::ForeignKeyViolation {
                        table: "records",
                        key: key.as_str().to_string(),
                    },
                ))?;
                if is_partner1 {
                    record.guest_list.partner1_confirmed = true;
                } else {
                    record.guest_list.partner2_confirmed = true;
                }
                Ok(Tx {
                    value: ConfirmGuestListOutcome::Confirmed,
                    reason_code: reason_codes::MR_OK_GUEST_LIST_CONFIRMED,
                    outcome: AuditOutcome::Committed,
                    record_key: Some(key),
                })
            }
            None => Ok(Tx {
                value: ConfirmGuestListOutcome::NotAParty,
                reason_code: reason_codes::MR_NOOP_CONFIRM_NOT_A_PARTY,
                outcome: AuditOutcome::NoOp,
                record_key: Some(key),
            }),
        }
    }

    pub fn get_confirmed_guest_list(
        &self,
        user: &PrincipalId,
    ) -> Result<Vec<PrincipalId>, RegistryError> {
        let record = self.get_engagement_details(user)?;
        if !record.guest_list.is_doubly_confirmed() {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_GUEST_LIST_NOT_CONFIRMED,
                message: "guest list is not confirmed by both partners",
            });
        }
        Ok(record.guest_list.guests)
    }

    /// A confirmed guest's veto during the wedding-day window. Votes
    /// are never retracted; when true votes strictly exceed half the
    /// guest slots the engagement is disbanded (no certificates exist
    /// yet, so none are burned).
    pub fn vote_against_wedding(
        &mut self,
        partner_under_vote: PrincipalId,
        caller: PrincipalId,
    ) -> Result<VetoOutcome, RegistryError> {
        let now = self.now();
        let tx = self.vote_against_wedding_tx(&partner_under_vote, &caller, now);
        self.commit_audited(
            now,
            AuditOperation::VoteAgainstWedding,
            &caller,
            Some(&partner_under_vote),
            tx,
        )
    }

    fn vote_against_wedding_tx(
        &mut self,
        partner_under_vote: &PrincipalId,
        caller: &PrincipalId,
        now: UnixTimeSec,
    ) -> Result<Tx<VetoOutcome>, RegistryError> {
        let (key, record) = self.active_record(partner_under_vote)?;
        if record.is_married() {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_ALREADY_MARRIED,
                message: "partner under vote is already married",
            });
        }
        let window_start = self.clock_ref().day_start(record.wedding_date);
        let window_end = self.clock_ref().day_end(record.wedding_date);
        if now < window_start || now >= window_end {
            return Err(RegistryError::Temporal {
                reason_code: reason_codes::MR_OUTSIDE_WEDDING_WINDOW,
                message: "veto votes are only possible during the wedding day",
            });
        }
        if !record.guest_list.is_doubly_confirmed() {
            return Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_GUEST_LIST_NOT_CONFIRMED,
                message: "guest list is not confirmed by both partners",
            });
        }

        let guest_slot = record.guest_list.guests.iter().position(|g| g == caller);
        let record = self.store_mut().record_mut(&key).ok_or(RegistryError::Storage(
            StorageError::ForeignKeyViolation {
                table: "records",
                key: key.as_str().to_string(),
            },
        ))?;
        let vote_recorded = match guest_slot.and_then(|i| record.guest_list.votes.get_mut(i)) {
            Some(vote) => {
                *vote = true;
                true
            }
            None => false,
        };
        let affirmative_votes = record.guest_list.affirmative_votes();
        let dissolved = record.guest_list.veto_quorum_reached();
        if dissolved {
            self.dissolve_record(&key)?;
        }

        let (reason_code, outcome) = if dissolved {
            (reason_codes::MR_OK_VETO_DISSOLVED, AuditOutcome::Committed)
        } else if vote_recorded {
            (reason_codes::MR_OK_VETO_VOTE, AuditOutcome::Committed)
        } else {
            (reason_codes::MR_NOOP_VETO_NOT_A_GUEST, AuditOutcome::NoOp)
        };
        Ok(Tx {
            value: VetoOutcome {
                vote_recorded,
                affirmative_votes,
                dissolved,
            },
            reason_code,
            outcome,
            record_key: Some(key),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use wedlock_engines::certificate::InMemoryCertificateRegistry;
    use wedlock_engines::clock::FixedClock;
    use wedlock_kernel_contracts::common::SECONDS_PER_DAY;

    use super::*;
    use crate::config::WedlockConfig;

    fn principal(id: &str) -> PrincipalId {
        PrincipalId::new(id).unwrap()
    }

    fn guest(i: usize) -> PrincipalId {
        principal(&format!("guest_{i}"))
    }

    const WEDDING_DAY: u64 = 5 * SECONDS_PER_DAY;

    fn engaged_kernel() -> WedlockKernel<FixedClock, InMemoryCertificateRegistry> {
        let mut k = WedlockKernel::new(
            WedlockConfig::mvp_v1(BTreeSet::new()),
            FixedClock::at(UnixTimeSec(1_000)),
            InMemoryCertificateRegistry::new(),
        )
        .unwrap();
        k.engage(
            principal("alice"),
            principal("bob"),
            UnixTimeSec(WEDDING_DAY + 3_600),
        )
        .unwrap();
        k.engage(
            principal("bob"),
            principal("alice"),
            UnixTimeSec(WEDDING_DAY + 3_600),
        )
        .unwrap();
        k
    }

    fn five_guests() -> Vec<PrincipalId> {
        (0..5).map(guest).collect()
    }

    #[test]
    fn at_guest_01_round_trip_propose_confirm_read() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), vec![guest(1), guest(2)])
            .unwrap();
        // Alice auto-confirmed; the list is not readable yet.
        assert!(matches!(
            k.get_confirmed_guest_list(&principal("alice")),
            Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_GUEST_LIST_NOT_CONFIRMED,
                ..
            })
        ));
        let out = k.confirm_guest_list(principal("bob")).unwrap();
        assert_eq!(out, ConfirmGuestListOutcome::Confirmed);
        let list = k.get_confirmed_guest_list(&principal("bob")).unwrap();
        assert_eq!(list, vec![guest(1), guest(2)]);
    }

    #[test]
    fn at_guest_02_partner_in_list_rejected() {
        let mut k = engaged_kernel();
        let out = k.propose_guest_list(principal("alice"), vec![guest(1), principal("bob")]);
        assert!(matches!(
            out,
            Err(RegistryError::Invariant {
                reason_code: reason_codes::MR_PARTNER_IN_GUEST_LIST,
                ..
            })
        ));
    }

    #[test]
    fn at_guest_03_duplicate_guest_rejected() {
        let mut k = engaged_kernel();
        let out = k.propose_guest_list(principal("alice"), vec![guest(1), guest(1)]);
        assert!(matches!(
            out,
            Err(RegistryError::Invariant {
                reason_code: reason_codes::MR_DUPLICATE_GUEST,
                ..
            })
        ));
    }

    #[test]
    fn at_guest_04_budget_enforced() {
        let mut k = engaged_kernel();
        let too_many: Vec<PrincipalId> = (0..33).map(guest).collect();
        let out = k.propose_guest_list(principal("alice"), too_many);
        assert!(matches!(
            out,
            Err(RegistryError::Invariant {
                reason_code: reason_codes::MR_GUEST_BUDGET_EXCEEDED,
                ..
            })
        ));
    }

    #[test]
    fn at_guest_05_reproposal_resets_votes_and_partner_confirmation() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), vec![guest(1)]).unwrap();
        k.confirm_guest_list(principal("bob")).unwrap();
        // Doubly confirmed now; a re-proposal must be rejected.
        assert!(matches!(
            k.propose_guest_list(principal("alice"), vec![guest(2)]),
            Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_GUEST_LIST_ALREADY_CONFIRMED,
                ..
            })
        ));
    }

    #[test]
    fn at_guest_06_counter_proposal_before_double_confirmation() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), vec![guest(1)]).unwrap();
        // Bob counter-proposes instead of confirming.
        k.propose_guest_list(principal("bob"), vec![guest(2)]).unwrap();
        k.confirm_guest_list(principal("alice")).unwrap();
        let list = k.get_confirmed_guest_list(&principal("alice")).unwrap();
        assert_eq!(list, vec![guest(2)]);
    }

    #[test]
    fn at_guest_07_veto_quorum_three_of_five_dissolves() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), five_guests()).unwrap();
        k.confirm_guest_list(principal("bob")).unwrap();
        k.clock_mut().set(UnixTimeSec(WEDDING_DAY + 10));

        for i in 0..2 {
            let out = k
                .vote_against_wedding(principal("alice"), guest(i))
                .unwrap();
            assert!(out.vote_recorded);
            assert!(!out.dissolved);
        }
        assert_eq!(k.store().active_record_count(), 1);

        let out = k
            .vote_against_wedding(principal("alice"), guest(2))
            .unwrap();
        assert!(out.dissolved);
        assert_eq!(out.affirmative_votes, 3);
        assert_eq!(k.store().active_record_count(), 0);
        assert!(!k.store().has_active_record(&principal("bob")));
    }

    #[test]
    fn at_guest_08_two_of_five_votes_record_survives() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), five_guests()).unwrap();
        k.confirm_guest_list(principal("bob")).unwrap();
        k.clock_mut().set(UnixTimeSec(WEDDING_DAY + 10));

        k.vote_against_wedding(principal("alice"), guest(0)).unwrap();
        let out = k
            .vote_against_wedding(principal("alice"), guest(1))
            .unwrap();
        assert_eq!(out.affirmative_votes, 2);
        assert!(!out.dissolved);
        assert_eq!(k.store().active_record_count(), 1);
    }

    #[test]
    fn at_guest_09_repeat_vote_is_not_double_counted() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), five_guests()).unwrap();
        k.confirm_guest_list(principal("bob")).unwrap();
        k.clock_mut().set(UnixTimeSec(WEDDING_DAY + 10));

        k.vote_against_wedding(principal("alice"), guest(0)).unwrap();
        let out = k
            .vote_against_wedding(principal("alice"), guest(0))
            .unwrap();
        assert_eq!(out.affirmative_votes, 1);
        assert!(!out.dissolved);
    }

    #[test]
    fn at_guest_10_non_guest_vote_is_silent_noop() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), five_guests()).unwrap();
        k.confirm_guest_list(principal("bob")).unwrap();
        k.clock_mut().set(UnixTimeSec(WEDDING_DAY + 10));

        let out = k
            .vote_against_wedding(principal("alice"), principal("stranger"))
            .unwrap();
        assert!(!out.vote_recorded);
        assert_eq!(out.affirmative_votes, 0);
        assert!(!out.dissolved);
    }

    #[test]
    fn at_guest_11_veto_outside_window_rejected() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), five_guests()).unwrap();
        k.confirm_guest_list(principal("bob")).unwrap();
        let out = k.vote_against_wedding(principal("alice"), guest(0));
        assert!(matches!(
            out,
            Err(RegistryError::Temporal {
                reason_code: reason_codes::MR_OUTSIDE_WEDDING_WINDOW,
                ..
            })
        ));
    }

    #[test]
    fn at_guest_12_veto_requires_doubly_confirmed_list() {
        let mut k = engaged_kernel();
        k.propose_guest_list(principal("alice"), five_guests()).unwrap();
        k.clock_mut().set(UnixTimeSec(WEDDING_DAY + 10));
        let out = k.vote_against_wedding(principal("alice"), guest(0));
        assert!(matches!(
            out,
            Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_GUEST_LIST_NOT_CONFIRMED,
                ..
            })
        ));
    }

    #[test]
    fn at_guest_13_confirm_without_record_rejected() {
        let mut k = WedlockKernel::new(
            WedlockConfig::mvp_v1(BTreeSet::new()),
            FixedClock::at(UnixTimeSec(1_000)),
            InMemoryCertificateRegistry::new(),
        )
        .unwrap();
        let out = k.confirm_guest_list(principal("alice"));
        assert!(matches!(
            out,
            Err(RegistryError::Precondition {
                reason_code: reason_codes::MR_NOT_ENGAGED,
                ..
            })
        ));
    }
}
