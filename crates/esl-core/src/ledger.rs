//! # Scaled Ledger
//!
//! The ledger context object. Every operation takes it by reference; there
//! is no ambient state.
//!
//! ## Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ScaledLedger                                                │
//! │  ┌──────────────────┐ ┌──────────────┐ ┌──────────────────┐  │
//! │  │ ConversionState  │ │ Balances     │ │ Allowances       │  │
//! │  │ total_scaled     │ │ addr→scaled  │ │ (owner,spender)  │  │
//! │  │ total_supply     │ │              │ │   →fragments     │  │
//! │  │ scaled/fragment  │ │              │ │                  │  │
//! │  └──────────────────┘ └──────────────┘ └──────────────────┘  │
//! │  ┌──────────────────┐ ┌──────────────────────────────────┐   │
//! │  │ ClaimRegistry    │ │ event journal (committed only)   │   │
//! │  └──────────────────┘ └──────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each mutating operation validates and computes every new value first and
//! writes only once nothing can fail, so a returned error means no state
//! change and no event.

use crate::address::Address;
use crate::allowances::AllowanceBook;
use crate::authority::RebaseCapability;
use crate::balances::ScaledBalances;
use crate::conversion::ConversionState;
use crate::error::{LedgerError, LedgerResult};
use crate::events::LedgerEvent;
use crate::reserve::ClaimRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledLedger {
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) decimals: u8,
    /// The ledger's own address; transfers to it are rejected.
    pub(crate) ledger_address: Address,
    /// Holds every scaled unit not yet distributed.
    pub(crate) reserve: Address,
    pub(crate) conversion: ConversionState,
    pub(crate) balances: ScaledBalances,
    pub(crate) allowances: AllowanceBook,
    pub(crate) claims: ClaimRegistry,
    pub(crate) claim_amount: u128,
    pub(crate) journal: Vec<LedgerEvent>,
}

impl ScaledLedger {
    /// Create a ledger whose whole scaled pool belongs to `reserve`.
    #[allow(clippy::too_many_arguments)]
    pub fn genesis(
        name: String,
        symbol: String,
        decimals: u8,
        initial_supply: u128,
        max_supply: u128,
        ledger_address: Address,
        reserve: Address,
        claim_amount: u128,
    ) -> LedgerResult<Self> {
        if reserve.is_zero() {
            return Err(LedgerError::InvalidConfig(
                "reserve address must not be zero".to_string(),
            ));
        }
        if reserve == ledger_address {
            return Err(LedgerError::InvalidConfig(
                "reserve address must differ from ledger address".to_string(),
            ));
        }

        let conversion = ConversionState::genesis(initial_supply, max_supply)?;
        let mut balances = ScaledBalances::new();
        balances.set(reserve, conversion.total_scaled());

        log::info!(
            "genesis {} ({}): {} fragments, pool {} scaled units held by {}",
            name,
            symbol,
            initial_supply,
            conversion.total_scaled(),
            reserve
        );

        Ok(Self {
            name,
            symbol,
            decimals,
            ledger_address,
            reserve,
            conversion,
            balances,
            allowances: AllowanceBook::new(),
            claims: ClaimRegistry::new(),
            claim_amount,
            journal: Vec::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────
    // QUERIES
    // ─────────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn ledger_address(&self) -> &Address {
        &self.ledger_address
    }

    pub fn reserve(&self) -> &Address {
        &self.reserve
    }

    pub fn conversion(&self) -> &ConversionState {
        &self.conversion
    }

    pub fn total_supply(&self) -> u128 {
        self.conversion.total_supply()
    }

    pub fn max_supply(&self) -> u128 {
        self.conversion.max_supply()
    }

    pub fn scaled_total_supply(&self) -> u128 {
        self.conversion.total_scaled()
    }

    pub fn scaled_per_fragment(&self) -> u128 {
        self.conversion.scaled_per_fragment()
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.conversion.to_public(self.balances.get(account))
    }

    /// Raw balance in the internal denomination.
    pub fn scaled_balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(owner, spender)
    }

    pub fn claim_amount(&self) -> u128 {
        self.claim_amount
    }

    /// Accounts with a non-zero scaled balance, in address order.
    pub fn accounts(&self) -> impl Iterator<Item = &Address> {
        self.balances.iter().map(|(addr, _)| addr)
    }

    pub fn scaled_balance_sum(&self) -> Option<u128> {
        self.balances.sum()
    }

    /// Take the events of every operation committed since the last drain.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.journal)
    }

    /// Verify supply cap, rate formula and conservation of the scaled pool.
    pub fn check_invariants(&self) -> LedgerResult<()> {
        self.conversion.check()?;
        let sum = self.balances.sum().ok_or_else(|| {
            LedgerError::CorruptSnapshot("scaled balances overflow u128".to_string())
        })?;
        if sum != self.conversion.total_scaled() {
            return Err(LedgerError::CorruptSnapshot(format!(
                "scaled balances sum to {} but pool is {}",
                sum,
                self.conversion.total_scaled()
            )));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // REBASE
    // ─────────────────────────────────────────────────────────────

    /// Multiply the public supply by `delta / 100` and recompute the rate.
    ///
    /// `delta` is a percentage multiplier, not an amount added to supply.
    /// `delta == 0` changes nothing but still emits a rebase event.
    pub fn rebase(&mut self, capability: &RebaseCapability, delta: u128) -> LedgerResult<u128> {
        let old_supply = self.conversion.total_supply();
        let new_supply = self.conversion.rebase(delta)?;

        if delta != 0 {
            log::info!(
                "rebase by {} x{}%: supply {} -> {}, rate {}",
                capability.holder(),
                delta,
                old_supply,
                new_supply,
                self.conversion.scaled_per_fragment()
            );
        }
        self.journal.push(LedgerEvent::Rebase {
            total_supply: new_supply,
        });
        Ok(new_supply)
    }

    // ─────────────────────────────────────────────────────────────
    // TRANSFERS
    // ─────────────────────────────────────────────────────────────

    fn ensure_valid_recipient(&self, to: &Address) -> LedgerResult<()> {
        if to.is_zero() || *to == self.ledger_address {
            return Err(LedgerError::InvalidRecipient { to: *to });
        }
        Ok(())
    }

    /// Move `amount` fragments from `caller` to `to`.
    ///
    /// The balance check runs against the scaled value. The event carries the
    /// requested fragment amount.
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> LedgerResult<bool> {
        self.ensure_valid_recipient(to)?;
        let scaled = self.conversion.to_scaled(amount)?;
        self.balances.transfer_scaled(caller, to, scaled)?;

        log::debug!("transfer {} -> {}: {} ({} scaled)", caller, to, amount, scaled);
        self.journal.push(LedgerEvent::Transfer {
            from: *caller,
            to: *to,
            amount,
        });
        Ok(true)
    }

    /// Spend `amount` of `from`'s allowance for `caller` and move the tokens.
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> LedgerResult<bool> {
        self.ensure_valid_recipient(to)?;
        let remaining = self.allowances.remaining_after(from, caller, amount)?;
        let scaled = self.conversion.to_scaled(amount)?;
        self.balances.transfer_scaled(from, to, scaled)?;
        self.allowances.set(*from, *caller, remaining);

        log::debug!(
            "transfer_from {} -> {} by {}: {} ({} scaled), allowance left {}",
            from,
            to,
            caller,
            amount,
            scaled,
            remaining
        );
        self.journal.push(LedgerEvent::Transfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────
    // ALLOWANCES
    // ─────────────────────────────────────────────────────────────

    /// Overwrite the limit. Subject to the usual approve/transfer_from race;
    /// prefer `increase_allowance` / `decrease_allowance`.
    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: u128) -> LedgerResult<bool> {
        self.allowances.set(*caller, *spender, amount);
        self.emit_approval(caller, spender, amount);
        Ok(true)
    }

    pub fn increase_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        added: u128,
    ) -> LedgerResult<bool> {
        let amount = self.allowances.increase(*caller, *spender, added)?;
        self.emit_approval(caller, spender, amount);
        Ok(true)
    }

    /// Never fails: a decrease past zero clamps to zero.
    pub fn decrease_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        subtracted: u128,
    ) -> LedgerResult<bool> {
        let amount = self.allowances.decrease(*caller, *spender, subtracted);
        self.emit_approval(caller, spender, amount);
        Ok(true)
    }

    fn emit_approval(&mut self, owner: &Address, spender: &Address, amount: u128) {
        log::debug!("approval {} -> {}: {}", owner, spender, amount);
        self.journal.push(LedgerEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::{RebaseAuthority, SingleOperator};
    use crate::{INITIAL_FRAGMENTS_SUPPLY, MAX_SUPPLY, RESERVE_CLAIM_FRAGMENTS};

    const LEDGER: Address = Address::new([0xee; 20]);
    const RESERVE: Address = Address::new([0xaa; 20]);
    const OPERATOR: Address = Address::new([0x0f; 20]);
    const ALICE: Address = Address::new([1u8; 20]);
    const BOB: Address = Address::new([2u8; 20]);
    const CHARLIE: Address = Address::new([3u8; 20]);

    fn make_ledger() -> ScaledLedger {
        ScaledLedger::genesis(
            "Elastic".to_string(),
            "ELX".to_string(),
            9,
            INITIAL_FRAGMENTS_SUPPLY,
            MAX_SUPPLY,
            LEDGER,
            RESERVE,
            RESERVE_CLAIM_FRAGMENTS,
        )
        .unwrap()
    }

    /// Ledger where ALICE holds `amount` fragments taken from the reserve.
    fn funded(amount: u128) -> ScaledLedger {
        let mut ledger = make_ledger();
        ledger.transfer(&RESERVE, &ALICE, amount).unwrap();
        ledger.drain_events();
        ledger
    }

    fn cap() -> RebaseCapability {
        SingleOperator::new(OPERATOR).authorize(&OPERATOR).unwrap()
    }

    #[test]
    fn test_genesis_reserve_holds_everything() {
        let ledger = make_ledger();
        assert_eq!(ledger.total_supply(), INITIAL_FRAGMENTS_SUPPLY);
        assert_eq!(ledger.balance_of(&RESERVE), INITIAL_FRAGMENTS_SUPPLY);
        assert_eq!(ledger.scaled_balance_of(&RESERVE), ledger.scaled_total_supply());
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn test_genesis_rejects_bad_addresses() {
        let zero_reserve = ScaledLedger::genesis(
            "X".into(), "X".into(), 0, 100, 1_000, LEDGER, Address::ZERO, 1,
        );
        assert!(matches!(zero_reserve, Err(LedgerError::InvalidConfig(_))));
        let same = ScaledLedger::genesis("X".into(), "X".into(), 0, 100, 1_000, LEDGER, LEDGER, 1);
        assert!(matches!(same, Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn test_transfer_whole_balance_then_fail() {
        let mut ledger = funded(500);
        assert_eq!(ledger.balance_of(&ALICE), 500);
        assert_eq!(ledger.transfer(&ALICE, &BOB, 500), Ok(true));
        assert_eq!(ledger.balance_of(&ALICE), 0);
        assert_eq!(ledger.balance_of(&BOB), 500);

        let err = ledger.transfer(&ALICE, &BOB, 1).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(
            ledger.drain_events(),
            vec![LedgerEvent::Transfer { from: ALICE, to: BOB, amount: 500 }]
        );
    }

    #[test]
    fn test_transfer_rejects_zero_and_self_contract() {
        let mut ledger = funded(10);
        assert_eq!(
            ledger.transfer(&ALICE, &Address::ZERO, 1),
            Err(LedgerError::InvalidRecipient { to: Address::ZERO })
        );
        assert_eq!(
            ledger.transfer(&ALICE, &LEDGER, 1),
            Err(LedgerError::InvalidRecipient { to: LEDGER })
        );
        assert_eq!(ledger.balance_of(&ALICE), 10);
        assert!(ledger.drain_events().is_empty());
    }

    #[test]
    fn test_transfer_overflowing_amount_fails() {
        let mut ledger = funded(10);
        assert!(matches!(
            ledger.transfer(&ALICE, &BOB, u128::MAX),
            Err(LedgerError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn test_transfer_conserves_pool() {
        let mut ledger = funded(1_000_000);
        ledger.transfer(&ALICE, &BOB, 333_333).unwrap();
        ledger.transfer(&BOB, &CHARLIE, 111).unwrap();
        assert_eq!(ledger.scaled_balance_sum(), Some(ledger.scaled_total_supply()));
    }

    #[test]
    fn test_approve_transfer_from_exhausts_allowance() {
        let mut ledger = funded(5_000);
        ledger.approve(&ALICE, &CHARLIE, 1_000).unwrap();
        assert_eq!(ledger.transfer_from(&CHARLIE, &ALICE, &BOB, 1_000), Ok(true));
        assert_eq!(ledger.allowance(&ALICE, &CHARLIE), 0);
        assert_eq!(ledger.balance_of(&BOB), 1_000);
        assert_eq!(ledger.balance_of(&ALICE), 4_000);

        assert_eq!(
            ledger.transfer_from(&CHARLIE, &ALICE, &BOB, 1),
            Err(LedgerError::InsufficientAllowance { have: 0, need: 1 })
        );
    }

    #[test]
    fn test_transfer_from_insufficient_balance_keeps_allowance() {
        let mut ledger = funded(10);
        ledger.approve(&ALICE, &CHARLIE, 100).unwrap();
        let err = ledger.transfer_from(&CHARLIE, &ALICE, &BOB, 50).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.allowance(&ALICE, &CHARLIE), 100);
    }

    #[test]
    fn test_transfer_from_invalid_recipient() {
        let mut ledger = funded(10);
        ledger.approve(&ALICE, &CHARLIE, 10).unwrap();
        assert!(matches!(
            ledger.transfer_from(&CHARLIE, &ALICE, &LEDGER, 5),
            Err(LedgerError::InvalidRecipient { .. })
        ));
        assert_eq!(ledger.allowance(&ALICE, &CHARLIE), 10);
    }

    #[test]
    fn test_allowance_family_events() {
        let mut ledger = make_ledger();
        ledger.approve(&ALICE, &BOB, 10).unwrap();
        ledger.increase_allowance(&ALICE, &BOB, 5).unwrap();
        ledger.decrease_allowance(&ALICE, &BOB, 100).unwrap();
        let amounts: Vec<u128> = ledger
            .drain_events()
            .into_iter()
            .map(|e| match e {
                LedgerEvent::Approval { amount, .. } => amount,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(amounts, vec![10, 15, 0]);
    }

    #[test]
    fn test_increase_allowance_overflow() {
        let mut ledger = make_ledger();
        ledger.approve(&ALICE, &BOB, u128::MAX).unwrap();
        ledger.drain_events();
        assert!(ledger.increase_allowance(&ALICE, &BOB, 1).is_err());
        assert_eq!(ledger.allowance(&ALICE, &BOB), u128::MAX);
        assert!(ledger.drain_events().is_empty());
    }

    #[test]
    fn test_rebase_scales_balances() {
        let mut ledger = funded(1_000_000);
        let scaled_before = ledger.scaled_balance_of(&ALICE);
        let new_supply = ledger.rebase(&cap(), 200).unwrap();
        assert_eq!(new_supply, INITIAL_FRAGMENTS_SUPPLY * 2);
        assert_eq!(ledger.scaled_balance_of(&ALICE), scaled_before);
        assert_eq!(ledger.balance_of(&ALICE), 2_000_000);
        assert_eq!(
            ledger.drain_events(),
            vec![LedgerEvent::Rebase { total_supply: new_supply }]
        );
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn test_rebase_zero_emits_unchanged_supply() {
        let mut ledger = make_ledger();
        let rate = ledger.scaled_per_fragment();
        assert_eq!(ledger.rebase(&cap(), 0), Ok(INITIAL_FRAGMENTS_SUPPLY));
        assert_eq!(ledger.scaled_per_fragment(), rate);
        assert_eq!(
            ledger.drain_events(),
            vec![LedgerEvent::Rebase { total_supply: INITIAL_FRAGMENTS_SUPPLY }]
        );
    }

    #[test]
    fn test_rebase_overflow_no_event() {
        let mut ledger = make_ledger();
        assert!(ledger.rebase(&cap(), u128::MAX).is_err());
        assert!(ledger.drain_events().is_empty());
        assert_eq!(ledger.total_supply(), INITIAL_FRAGMENTS_SUPPLY);
    }

    #[test]
    fn test_allowance_not_rescaled_by_rebase() {
        let mut ledger = funded(1_000);
        ledger.approve(&ALICE, &BOB, 400).unwrap();
        ledger.rebase(&cap(), 50).unwrap();
        assert_eq!(ledger.allowance(&ALICE, &BOB), 400);
        assert_eq!(ledger.balance_of(&ALICE), 500);
    }
}
