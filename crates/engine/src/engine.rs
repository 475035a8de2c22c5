//! LoanEngine - validates operations, moves funds, applies events

use crate::clock::{Clock, SystemClock};
use crate::config::MarketConfig;
use crate::error::{EngineError, EngineResult};
use crate::event::LoanEvent;
use crate::request::LoanRequest;
use crate::state::LoanState;
use chrono::{DateTime, Utc};
use peerlend_core::{AccountId, Amount, MAX_UNIT_FIGURE};
use peerlend_ledger::{Ledger, TokenInfo};
use peerlend_registry::{Role, RoleRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// The loan marketplace state machine
///
/// Owns the role registry, the balance ledger and the per-borrower loan
/// records. Operations run guards in a fixed order (role, then record state,
/// then attached value), emit a [`LoanEvent`] describing the transition and
/// apply it through the same path replay uses. A failed guard changes
/// nothing.
pub struct LoanEngine {
    registry: RoleRegistry,
    ledger: Ledger,
    requests: HashMap<AccountId, LoanRequest>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LoanEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoanEngine")
            .field("registry", &self.registry)
            .field("ledger", &self.ledger)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

impl LoanEngine {
    /// Open a market on wall-clock time
    pub fn open(config: MarketConfig) -> EngineResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Open a market with an explicit time source
    pub fn with_clock(config: MarketConfig, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        let MarketConfig {
            registry,
            token,
            initial_supply,
        } = config;

        if initial_supply > MAX_UNIT_FIGURE {
            return Err(EngineError::InvalidLoanAmount(initial_supply));
        }

        let mut ledger = Ledger::new(token);
        if initial_supply > 0 {
            let admin = registry.admin().clone();
            ledger.mint(&admin, Amount::from_units(initial_supply))?;
        }

        Ok(Self {
            registry,
            ledger,
            requests: HashMap::new(),
            clock,
        })
    }

    // === Lifecycle operations ===

    /// File a loan request: `REQUESTED`
    ///
    /// `loan_amount` and `payback_interest` are whole settlement units. The
    /// borrower may hold only one live record; terminal records are replaced.
    pub fn request_loan(
        &mut self,
        caller: &AccountId,
        loan_amount: u64,
        payback_date: DateTime<Utc>,
        payback_interest: u64,
    ) -> EngineResult<LoanEvent> {
        self.require_role(caller, Role::Borrower)?;

        // Stored state decides: an overdue loan keeps blocking new requests
        // until the lender has claimed the collateral.
        if let Some(existing) = self.requests.get(caller) {
            if existing.state.is_active() {
                return Err(EngineError::DuplicateActiveRequest(caller.clone()));
            }
        }

        if loan_amount == 0 || loan_amount > MAX_UNIT_FIGURE {
            return Err(EngineError::InvalidLoanAmount(loan_amount));
        }
        if payback_interest > MAX_UNIT_FIGURE {
            return Err(EngineError::InvalidLoanAmount(payback_interest));
        }

        let event = LoanEvent::LoanRequested {
            borrower: caller.clone(),
            loan_amount,
            payback_date,
            payback_interest,
        };
        self.apply(&event)?;

        tracing::debug!(borrower = %caller, amount = loan_amount, "loan requested");
        Ok(event)
    }

    /// Post collateral backing a borrower's request: `REQUESTED -> GUARANTEED`
    ///
    /// The attached value must equal the principal exactly; it is held on the
    /// admin's escrow balance until rejection, default or settlement.
    pub fn place_guarantee(
        &mut self,
        caller: &AccountId,
        borrower: &AccountId,
        guarantor_interest: u64,
        attached: Amount,
    ) -> EngineResult<LoanEvent> {
        self.require_role(caller, Role::Guarantor)?;
        let record = self.record_in_state(borrower, LoanState::Requested)?;

        if guarantor_interest > MAX_UNIT_FIGURE {
            return Err(EngineError::InvalidLoanAmount(guarantor_interest));
        }
        let required = record.principal();
        if attached != required {
            return Err(EngineError::AmountMismatch { required, attached });
        }

        let event = LoanEvent::GuaranteePlaced {
            borrower: borrower.clone(),
            guarantor: caller.clone(),
            guarantor_interest,
            value: attached,
        };
        self.apply(&event)?;

        tracing::debug!(borrower = %borrower, guarantor = %caller, "guarantee placed");
        Ok(event)
    }

    /// Borrower consents to the pending guarantee: `GUARANTEED -> ACCEPTED`
    pub fn accept_guarantee(
        &mut self,
        caller: &AccountId,
        borrower: &AccountId,
    ) -> EngineResult<LoanEvent> {
        self.require_role(caller, Role::Borrower)?;
        self.owned_record(borrower, caller, LoanState::Guaranteed)?;

        let event = LoanEvent::GuaranteeAccepted {
            borrower: borrower.clone(),
        };
        self.apply(&event)?;
        Ok(event)
    }

    /// Borrower turns the guarantee down: `GUARANTEED -> REJECTED`
    ///
    /// The posted collateral goes straight back to the guarantor and the
    /// borrower is free to request again.
    pub fn reject_guarantee(
        &mut self,
        caller: &AccountId,
        borrower: &AccountId,
    ) -> EngineResult<LoanEvent> {
        self.require_role(caller, Role::Borrower)?;
        let record = self.owned_record(borrower, caller, LoanState::Guaranteed)?;

        let guarantor = record
            .guarantor
            .clone()
            .expect("GUARANTEED record always has a guarantor");
        let value = record.principal();

        let event = LoanEvent::GuaranteeRejected {
            borrower: borrower.clone(),
            guarantor,
            value,
        };
        self.apply(&event)?;
        Ok(event)
    }

    /// Lender funds an accepted request: `ACCEPTED -> GRANTED`
    ///
    /// The attached value must equal the principal exactly and is credited to
    /// the borrower.
    pub fn grant_loan(
        &mut self,
        caller: &AccountId,
        borrower: &AccountId,
        attached: Amount,
    ) -> EngineResult<LoanEvent> {
        self.require_role(caller, Role::Lender)?;
        let record = self.record_in_state(borrower, LoanState::Accepted)?;

        let required = record.principal();
        if attached != required {
            return Err(EngineError::AmountMismatch { required, attached });
        }

        let event = LoanEvent::LoanGranted {
            borrower: borrower.clone(),
            lender: caller.clone(),
            value: attached,
        };
        self.apply(&event)?;

        tracing::debug!(borrower = %borrower, lender = %caller, "loan granted");
        Ok(event)
    }

    /// Borrower repays principal plus interest: `GRANTED -> REPAID`
    ///
    /// Only possible while the payback date has not passed; afterwards the
    /// record reads as `DEFAULTED` and repayment is refused.
    pub fn payback_loan(
        &mut self,
        caller: &AccountId,
        borrower: &AccountId,
        attached: Amount,
    ) -> EngineResult<LoanEvent> {
        self.require_role(caller, Role::Borrower)?;
        let record = self.owned_record(borrower, caller, LoanState::Granted)?;

        let required = record.payback_total();
        if attached != required {
            return Err(EngineError::AmountMismatch { required, attached });
        }

        let event = LoanEvent::LoanRepaid {
            borrower: borrower.clone(),
            value: attached,
        };
        self.apply(&event)?;

        tracing::debug!(borrower = %borrower, "loan repaid");
        Ok(event)
    }

    /// Lender claims forfeited collateral after default: `GRANTED -> DEFAULTED`
    ///
    /// This is the only operation that stores the `DEFAULTED` state; until it
    /// runs, an overdue loan is merely reported as defaulted. Claimable once.
    pub fn withdraw_guarantee(
        &mut self,
        caller: &AccountId,
        borrower: &AccountId,
    ) -> EngineResult<LoanEvent> {
        self.require_role(caller, Role::Lender)?;

        let record = self
            .requests
            .get(borrower)
            .ok_or_else(|| EngineError::InvalidState {
                borrower: borrower.clone(),
                expected: LoanState::Defaulted,
                actual: LoanState::None,
            })?;

        if record.lender.as_ref() != Some(caller) {
            return Err(EngineError::Unauthorized {
                caller: caller.clone(),
                required: Role::Lender,
            });
        }

        let actual = Self::effective_state(record, self.clock.now());
        if actual != LoanState::Defaulted {
            return Err(EngineError::InvalidState {
                borrower: borrower.clone(),
                expected: LoanState::Defaulted,
                actual,
            });
        }

        if record.guarantor.is_none() {
            return Err(EngineError::CollateralAlreadyWithdrawn(borrower.clone()));
        }
        let value = record.principal();

        let event = LoanEvent::GuaranteeWithdrawn {
            borrower: borrower.clone(),
            lender: caller.clone(),
            value,
        };
        self.apply(&event)?;

        tracing::debug!(borrower = %borrower, lender = %caller, "forfeited collateral withdrawn");
        Ok(event)
    }

    // === Queries ===

    /// Snapshot of a borrower's record, with the overdue view applied
    ///
    /// An overdue `GRANTED` record is reported as `DEFAULTED` even though
    /// nothing is stored until the lender claims the collateral.
    pub fn loan_request_for_borrower(&self, borrower: &AccountId) -> Option<LoanRequest> {
        let record = self.requests.get(borrower)?;
        let mut snapshot = record.clone();
        snapshot.state = Self::effective_state(record, self.clock.now());
        Some(snapshot)
    }

    /// Ledger balance, zero for accounts that never held funds
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn token(&self) -> &TokenInfo {
        self.ledger.token()
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    // === Event application (shared by operations and replay) ===

    /// Apply one event to the market state
    ///
    /// No guards run here: live operations validate before calling this, and
    /// replay trusts the journal. Ledger failures (possible only with a
    /// tampered journal) abort before the record is touched.
    pub fn apply(&mut self, event: &LoanEvent) -> EngineResult<()> {
        match event {
            LoanEvent::MarketOpened(_) => Err(EngineError::AlreadyConfigured),

            LoanEvent::LoanRequested {
                borrower,
                loan_amount,
                payback_date,
                payback_interest,
            } => {
                let record = LoanRequest::new(
                    borrower.clone(),
                    *loan_amount,
                    *payback_date,
                    *payback_interest,
                );
                self.requests.insert(borrower.clone(), record);
                Ok(())
            }

            LoanEvent::GuaranteePlaced {
                borrower,
                guarantor,
                guarantor_interest,
                value,
            } => {
                let admin = self.registry.admin().clone();
                self.ledger.credit(&admin, *value)?;
                let record = self.stored_record(borrower)?;
                record.guarantor = Some(guarantor.clone());
                record.guarantor_interest = *guarantor_interest;
                record.state = LoanState::Guaranteed;
                Ok(())
            }

            LoanEvent::GuaranteeAccepted { borrower } => {
                let record = self.stored_record(borrower)?;
                record.state = LoanState::Accepted;
                Ok(())
            }

            LoanEvent::GuaranteeRejected {
                borrower,
                guarantor,
                value,
            } => {
                let admin = self.registry.admin().clone();
                self.ledger.transfer(&admin, guarantor, *value)?;
                let record = self.stored_record(borrower)?;
                record.guarantor = None;
                record.guarantor_interest = 0;
                record.state = LoanState::Rejected;
                Ok(())
            }

            LoanEvent::LoanGranted {
                borrower,
                lender,
                value,
            } => {
                self.ledger.credit(borrower, *value)?;
                let record = self.stored_record(borrower)?;
                record.lender = Some(lender.clone());
                record.state = LoanState::Granted;
                Ok(())
            }

            LoanEvent::LoanRepaid { borrower, value } => {
                let admin = self.registry.admin().clone();
                self.ledger.credit(&admin, *value)?;
                let record = self.stored_record(borrower)?;
                record.state = LoanState::Repaid;
                Ok(())
            }

            LoanEvent::GuaranteeWithdrawn {
                borrower,
                lender,
                value,
            } => {
                let admin = self.registry.admin().clone();
                self.ledger.transfer(&admin, lender, *value)?;
                let record = self.stored_record(borrower)?;
                record.guarantor = None;
                record.guarantor_interest = 0;
                record.state = LoanState::Defaulted;
                Ok(())
            }
        }
    }

    // === Guards ===

    fn require_role(&self, caller: &AccountId, role: Role) -> EngineResult<()> {
        if self.registry.has_role(caller, role) {
            Ok(())
        } else {
            Err(EngineError::Unauthorized {
                caller: caller.clone(),
                required: role,
            })
        }
    }

    /// Record in the expected effective state, owner not checked
    fn record_in_state(
        &self,
        borrower: &AccountId,
        expected: LoanState,
    ) -> EngineResult<&LoanRequest> {
        let record = self
            .requests
            .get(borrower)
            .ok_or_else(|| EngineError::InvalidState {
                borrower: borrower.clone(),
                expected,
                actual: LoanState::None,
            })?;
        let actual = Self::effective_state(record, self.clock.now());
        if actual != expected {
            return Err(EngineError::InvalidState {
                borrower: borrower.clone(),
                expected,
                actual,
            });
        }
        Ok(record)
    }

    /// Record owned by the caller, in the expected effective state
    ///
    /// Operations reserved to the record's own borrower (accept, reject,
    /// payback) check identity before state.
    fn owned_record(
        &self,
        borrower: &AccountId,
        caller: &AccountId,
        expected: LoanState,
    ) -> EngineResult<&LoanRequest> {
        let record = self
            .requests
            .get(borrower)
            .ok_or_else(|| EngineError::InvalidState {
                borrower: borrower.clone(),
                expected,
                actual: LoanState::None,
            })?;
        if record.borrower != *caller {
            return Err(EngineError::Unauthorized {
                caller: caller.clone(),
                required: Role::Borrower,
            });
        }
        let actual = Self::effective_state(record, self.clock.now());
        if actual != expected {
            return Err(EngineError::InvalidState {
                borrower: borrower.clone(),
                expected,
                actual,
            });
        }
        Ok(record)
    }

    /// Mutable stored record for event application
    fn stored_record(&mut self, borrower: &AccountId) -> EngineResult<&mut LoanRequest> {
        self.requests
            .get_mut(borrower)
            .ok_or_else(|| EngineError::InvalidState {
                borrower: borrower.clone(),
                expected: LoanState::Requested,
                actual: LoanState::None,
            })
    }

    /// How the record reads right now: overdue `GRANTED` counts as `DEFAULTED`
    fn effective_state(record: &LoanRequest, now: DateTime<Utc>) -> LoanState {
        if record.state == LoanState::Granted && record.is_overdue(now) {
            LoanState::Defaulted
        } else {
            record.state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    fn id(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn units(val: u64) -> Amount {
        Amount::from_units(val)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn due() -> DateTime<Utc> {
        t0() + Duration::days(30)
    }

    fn config() -> MarketConfig {
        let registry = RoleRegistry::builder()
            .admin(id("admin"))
            .unwrap()
            .borrowers([id("b1"), id("b2")])
            .unwrap()
            .guarantors([id("g1")])
            .unwrap()
            .lenders([id("l1"), id("l2")])
            .unwrap()
            .build()
            .unwrap();
        MarketConfig {
            registry,
            token: TokenInfo::loan_token(),
            initial_supply: 1_000_000,
        }
    }

    fn market() -> (LoanEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let engine = LoanEngine::with_clock(config(), clock.clone()).unwrap();
        (engine, clock)
    }

    /// Drive a market to GRANTED: b1 borrows 4 at 2 interest, g1 asks 1
    fn granted_market() -> (LoanEngine, Arc<ManualClock>) {
        let (mut engine, clock) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();
        engine.accept_guarantee(&id("b1"), &id("b1")).unwrap();
        engine.grant_loan(&id("l1"), &id("b1"), units(4)).unwrap();
        (engine, clock)
    }

    #[test]
    fn test_open_mints_supply_to_admin() {
        let (engine, _) = market();
        assert_eq!(engine.balance_of(&id("admin")), units(1_000_000));
        assert_eq!(engine.total_supply(), units(1_000_000));
        assert_eq!(engine.token().symbol, "DFI");
    }

    #[test]
    fn test_open_rejects_oversized_supply() {
        let mut cfg = config();
        cfg.initial_supply = MAX_UNIT_FIGURE + 1;
        let err = LoanEngine::open(cfg).unwrap_err();
        assert_eq!(err, EngineError::InvalidLoanAmount(MAX_UNIT_FIGURE + 1));
    }

    #[test]
    fn test_request_loan_creates_record() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();

        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Requested);
        assert_eq!(record.loan_amount, 4);
        assert_eq!(record.payback_interest, 2);
        assert_eq!(record.guarantor, None);
        assert_eq!(record.lender, None);
    }

    #[test]
    fn test_request_loan_requires_borrower_role() {
        let (mut engine, _) = market();
        let err = engine.request_loan(&id("g1"), 4, due(), 2).unwrap_err();
        assert_eq!(
            err,
            EngineError::Unauthorized {
                caller: id("g1"),
                required: Role::Borrower,
            }
        );
        assert!(engine.loan_request_for_borrower(&id("g1")).is_none());

        let err = engine.request_loan(&id("l1"), 4, due(), 2).unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized { .. }));
    }

    #[test]
    fn test_request_loan_rejects_bad_figures() {
        let (mut engine, _) = market();
        assert_eq!(
            engine.request_loan(&id("b1"), 0, due(), 2).unwrap_err(),
            EngineError::InvalidLoanAmount(0)
        );
        assert_eq!(
            engine
                .request_loan(&id("b1"), MAX_UNIT_FIGURE + 1, due(), 2)
                .unwrap_err(),
            EngineError::InvalidLoanAmount(MAX_UNIT_FIGURE + 1)
        );
        assert_eq!(
            engine
                .request_loan(&id("b1"), 4, due(), MAX_UNIT_FIGURE + 1)
                .unwrap_err(),
            EngineError::InvalidLoanAmount(MAX_UNIT_FIGURE + 1)
        );
        assert!(engine.loan_request_for_borrower(&id("b1")).is_none());
    }

    #[test]
    fn test_second_request_while_active_is_rejected() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();

        let err = engine.request_loan(&id("b1"), 8, due(), 3).unwrap_err();
        assert_eq!(err, EngineError::DuplicateActiveRequest(id("b1")));

        // unchanged original record
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.loan_amount, 4);
    }

    #[test]
    fn test_independent_borrowers_can_both_request() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine.request_loan(&id("b2"), 7, due(), 1).unwrap();
        assert_eq!(
            engine.loan_request_for_borrower(&id("b2")).unwrap().loan_amount,
            7
        );
    }

    #[test]
    fn test_request_again_after_terminal_state() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();
        engine.reject_guarantee(&id("b1"), &id("b1")).unwrap();

        engine.request_loan(&id("b1"), 5, due(), 2).unwrap();
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Requested);
        assert_eq!(record.loan_amount, 5);
        assert_eq!(record.guarantor, None);
    }

    #[test]
    fn test_place_guarantee_escrows_collateral() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();

        let before = engine.balance_of(&id("admin"));
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();

        assert_eq!(
            engine.balance_of(&id("admin")),
            before.checked_add(&units(4)).unwrap()
        );
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Guaranteed);
        assert_eq!(record.guarantor, Some(id("g1")));
        assert_eq!(record.guarantor_interest, 1);
    }

    #[test]
    fn test_place_guarantee_requires_guarantor_role() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();

        let err = engine
            .place_guarantee(&id("l1"), &id("b1"), 1, units(4))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Unauthorized {
                caller: id("l1"),
                required: Role::Guarantor,
            }
        );
    }

    #[test]
    fn test_place_guarantee_needs_exact_value() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 10, due(), 2).unwrap();

        let before = engine.balance_of(&id("admin"));
        let err = engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(9))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::AmountMismatch {
                required: units(10),
                attached: units(9),
            }
        );

        // over-payment is no better
        let err = engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(11))
            .unwrap_err();
        assert!(matches!(err, EngineError::AmountMismatch { .. }));

        assert_eq!(engine.balance_of(&id("admin")), before);
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Requested);
        assert_eq!(record.guarantor, None);
    }

    #[test]
    fn test_place_guarantee_wrong_state() {
        let (mut engine, _) = market();

        // no record at all
        let err = engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                borrower: id("b1"),
                expected: LoanState::Requested,
                actual: LoanState::None,
            }
        );

        // already guaranteed
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();
        let err = engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                borrower: id("b1"),
                expected: LoanState::Requested,
                actual: LoanState::Guaranteed,
            }
        );
    }

    #[test]
    fn test_accept_guarantee_marks_consent() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();

        engine.accept_guarantee(&id("b1"), &id("b1")).unwrap();
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Accepted);
        // consent moves no funds
        assert_eq!(engine.balance_of(&id("admin")), units(1_000_004));
    }

    #[test]
    fn test_accept_guarantee_is_owner_only() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();

        let err = engine.accept_guarantee(&id("b2"), &id("b1")).unwrap_err();
        assert_eq!(
            err,
            EngineError::Unauthorized {
                caller: id("b2"),
                required: Role::Borrower,
            }
        );
    }

    #[test]
    fn test_reject_guarantee_refunds_guarantor() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();

        engine.reject_guarantee(&id("b1"), &id("b1")).unwrap();

        assert_eq!(engine.balance_of(&id("admin")), units(1_000_000));
        assert_eq!(engine.balance_of(&id("g1")), units(4));
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Rejected);
        assert_eq!(record.guarantor, None);
        assert_eq!(record.guarantor_interest, 0);
    }

    #[test]
    fn test_grant_loan_credits_borrower() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();
        engine.accept_guarantee(&id("b1"), &id("b1")).unwrap();

        engine.grant_loan(&id("l1"), &id("b1"), units(4)).unwrap();

        assert_eq!(engine.balance_of(&id("b1")), units(4));
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Granted);
        assert_eq!(record.lender, Some(id("l1")));
    }

    #[test]
    fn test_grant_loan_only_after_acceptance() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();

        let err = engine
            .grant_loan(&id("l1"), &id("b1"), units(4))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                borrower: id("b1"),
                expected: LoanState::Accepted,
                actual: LoanState::Guaranteed,
            }
        );
        assert_eq!(engine.balance_of(&id("b1")), Amount::ZERO);
    }

    #[test]
    fn test_grant_loan_needs_exact_value() {
        let (mut engine, _) = market();
        engine.request_loan(&id("b1"), 4, due(), 2).unwrap();
        engine
            .place_guarantee(&id("g1"), &id("b1"), 1, units(4))
            .unwrap();
        engine.accept_guarantee(&id("b1"), &id("b1")).unwrap();

        let err = engine
            .grant_loan(&id("l1"), &id("b1"), units(3))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::AmountMismatch {
                required: units(4),
                attached: units(3),
            }
        );
    }

    #[test]
    fn test_payback_in_time_settles_loan() {
        let (mut engine, clock) = granted_market();
        clock.advance(Duration::days(10));

        let before = engine.balance_of(&id("admin"));
        engine
            .payback_loan(&id("b1"), &id("b1"), units(6))
            .unwrap();

        assert_eq!(
            engine.balance_of(&id("admin")),
            before.checked_add(&units(6)).unwrap()
        );
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Repaid);
    }

    #[test]
    fn test_payback_on_due_date_still_counts() {
        let (mut engine, clock) = granted_market();
        clock.set(due());
        assert!(engine.payback_loan(&id("b1"), &id("b1"), units(6)).is_ok());
    }

    #[test]
    fn test_payback_needs_principal_plus_interest() {
        let (mut engine, _) = granted_market();
        let err = engine
            .payback_loan(&id("b1"), &id("b1"), units(4))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::AmountMismatch {
                required: units(6),
                attached: units(4),
            }
        );
    }

    #[test]
    fn test_payback_is_owner_only() {
        let (mut engine, _) = granted_market();
        let err = engine
            .payback_loan(&id("b2"), &id("b1"), units(6))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Unauthorized {
                caller: id("b2"),
                required: Role::Borrower,
            }
        );
    }

    #[test]
    fn test_late_payback_is_refused() {
        let (mut engine, clock) = granted_market();
        clock.set(due() + Duration::seconds(1));

        let err = engine
            .payback_loan(&id("b1"), &id("b1"), units(6))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                borrower: id("b1"),
                expected: LoanState::Granted,
                actual: LoanState::Defaulted,
            }
        );
        // no funds moved
        assert_eq!(engine.balance_of(&id("admin")), units(1_000_004));
    }

    #[test]
    fn test_snapshot_reports_overdue_loan_as_defaulted() {
        let (engine, clock) = granted_market();

        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Granted);

        clock.set(due() + Duration::days(1));
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Defaulted);
    }

    #[test]
    fn test_withdraw_guarantee_pays_collateral_to_lender() {
        let (mut engine, clock) = granted_market();
        clock.set(due() + Duration::days(1));

        engine.withdraw_guarantee(&id("l1"), &id("b1")).unwrap();

        assert_eq!(engine.balance_of(&id("l1")), units(4));
        assert_eq!(engine.balance_of(&id("admin")), units(1_000_000));
        let record = engine.loan_request_for_borrower(&id("b1")).unwrap();
        assert_eq!(record.state, LoanState::Defaulted);
        assert_eq!(record.guarantor, None);
    }

    #[test]
    fn test_withdraw_guarantee_claimable_once() {
        let (mut engine, clock) = granted_market();
        clock.set(due() + Duration::days(1));
        engine.withdraw_guarantee(&id("l1"), &id("b1")).unwrap();

        let err = engine.withdraw_guarantee(&id("l1"), &id("b1")).unwrap_err();
        assert_eq!(err, EngineError::CollateralAlreadyWithdrawn(id("b1")));
        assert_eq!(engine.balance_of(&id("l1")), units(4));
    }

    #[test]
    fn test_withdraw_guarantee_reserved_to_the_loans_lender() {
        let (mut engine, clock) = granted_market();
        clock.set(due() + Duration::days(1));

        let err = engine.withdraw_guarantee(&id("l2"), &id("b1")).unwrap_err();
        assert_eq!(
            err,
            EngineError::Unauthorized {
                caller: id("l2"),
                required: Role::Lender,
            }
        );
    }

    #[test]
    fn test_withdraw_guarantee_before_due_date_is_refused() {
        let (mut engine, _) = granted_market();
        let err = engine.withdraw_guarantee(&id("l1"), &id("b1")).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                borrower: id("b1"),
                expected: LoanState::Defaulted,
                actual: LoanState::Granted,
            }
        );
    }

    #[test]
    fn test_unclaimed_default_blocks_new_request() {
        let (mut engine, clock) = granted_market();
        clock.set(due() + Duration::days(1));

        let err = engine.request_loan(&id("b1"), 2, due(), 1).unwrap_err();
        assert_eq!(err, EngineError::DuplicateActiveRequest(id("b1")));

        engine.withdraw_guarantee(&id("l1"), &id("b1")).unwrap();
        assert!(engine
            .request_loan(&id("b1"), 2, clock.now() + Duration::days(30), 1)
            .is_ok());
    }

    #[test]
    fn test_reapplying_market_opened_is_rejected() {
        let (mut engine, _) = market();
        let err = engine
            .apply(&LoanEvent::MarketOpened(config()))
            .unwrap_err();
        assert_eq!(err, EngineError::AlreadyConfigured);
    }

    #[test]
    fn test_replay_rebuilds_identical_state() {
        let (mut live, clock) = market();
        let mut events = Vec::new();

        events.push(live.request_loan(&id("b1"), 4, due(), 2).unwrap());
        events.push(
            live.place_guarantee(&id("g1"), &id("b1"), 1, units(4))
                .unwrap(),
        );
        events.push(live.accept_guarantee(&id("b1"), &id("b1")).unwrap());
        events.push(live.grant_loan(&id("l1"), &id("b1"), units(4)).unwrap());
        events.push(live.payback_loan(&id("b1"), &id("b1"), units(6)).unwrap());

        let mut replayed = LoanEngine::with_clock(config(), clock).unwrap();
        for event in &events {
            replayed.apply(event).unwrap();
        }

        for account in ["admin", "b1", "b2", "g1", "l1"] {
            assert_eq!(
                replayed.balance_of(&id(account)),
                live.balance_of(&id(account)),
                "balance diverged for {account}"
            );
        }
        assert_eq!(
            replayed.loan_request_for_borrower(&id("b1")),
            live.loan_request_for_borrower(&id("b1"))
        );
    }

    #[test]
    fn test_full_happy_path() {
        // request 4 due in 30 days at 2 interest, guarantor asks 1,
        // lender funds, borrower repays 6
        let (mut engine, _) = granted_market();
        engine
            .payback_loan(&id("b1"), &id("b1"), units(6))
            .unwrap();

        assert_eq!(engine.balance_of(&id("b1")), units(4));
        assert_eq!(engine.balance_of(&id("admin")), units(1_000_010));
        assert_eq!(
            engine.loan_request_for_borrower(&id("b1")).unwrap().state,
            LoanState::Repaid
        );
    }
}
