//! Fuzz target: random operation sequences
//!
//! Drives a small ledger through arbitrary transfers, allowance changes,
//! claims and rebases. After every step the scaled pool must be conserved,
//! and a failed step must leave the state untouched.
//!
//! Run: cargo +nightly fuzz run fuzz_ledger_ops

#![no_main]
use arbitrary::Arbitrary;
use esl_core::{Address, RebaseAuthority, ScaledLedger, SingleOperator, MAX_SUPPLY};
use libfuzzer_sys::fuzz_target;

const LEDGER: Address = Address::new([0xe5; 20]);
const RESERVE: Address = Address::new([0x5e; 20]);
const OPERATOR: Address = Address::new([0x01; 20]);

#[derive(Arbitrary, Debug)]
enum Op {
    Transfer { from: u8, to: u8, amount: u128 },
    TransferFrom { spender: u8, owner: u8, to: u8, amount: u128 },
    Approve { owner: u8, spender: u8, amount: u128 },
    IncreaseAllowance { owner: u8, spender: u8, added: u128 },
    DecreaseAllowance { owner: u8, spender: u8, subtracted: u128 },
    Claim { caller: u8 },
    Rebase { caller: u8, delta: u16 },
}

#[derive(Arbitrary, Debug)]
struct FuzzLedgerInput {
    initial_supply: u64,
    decimals: u8,
    ops: Vec<Op>,
}

/// Small address space so operations collide; 0 is the null address,
/// 1 the operator, 2 the reserve, 3 the ledger itself.
fn account(idx: u8) -> Address {
    match idx % 8 {
        0 => Address::ZERO,
        1 => OPERATOR,
        2 => RESERVE,
        3 => LEDGER,
        n => Address::new([n; 20]),
    }
}

fuzz_target!(|input: FuzzLedgerInput| {
    let initial = (input.initial_supply as u128).max(1);
    let decimals = input.decimals % 19;
    let claim = initial / 1_000;
    let Ok(mut ledger) = ScaledLedger::genesis(
        "Fuzz".to_string(),
        "FZ".to_string(),
        decimals,
        initial,
        MAX_SUPPLY,
        LEDGER,
        RESERVE,
        claim,
    ) else {
        return;
    };
    let authority = SingleOperator::new(OPERATOR);

    // Cap sequence length to keep each run fast
    for op in input.ops.iter().take(64) {
        let before = ledger.clone();
        let result = step(&mut ledger, &authority, op);

        if result.is_err() {
            assert_eq!(ledger, before, "failed {:?} mutated state", op);
        }
        assert_eq!(
            ledger.scaled_balance_sum(),
            Some(ledger.scaled_total_supply()),
            "pool not conserved after {:?}",
            op
        );
        assert!(ledger.total_supply() <= ledger.max_supply());
    }
    assert!(ledger.check_invariants().is_ok());
});

fn step(ledger: &mut ScaledLedger, authority: &SingleOperator, op: &Op) -> Result<(), ()> {
    let outcome = match op {
        Op::Transfer { from, to, amount } => {
            ledger.transfer(&account(*from), &account(*to), *amount).map(|_| ())
        }
        Op::TransferFrom { spender, owner, to, amount } => ledger
            .transfer_from(&account(*spender), &account(*owner), &account(*to), *amount)
            .map(|_| ()),
        Op::Approve { owner, spender, amount } => {
            ledger.approve(&account(*owner), &account(*spender), *amount).map(|_| ())
        }
        Op::IncreaseAllowance { owner, spender, added } => ledger
            .increase_allowance(&account(*owner), &account(*spender), *added)
            .map(|_| ()),
        Op::DecreaseAllowance { owner, spender, subtracted } => ledger
            .decrease_allowance(&account(*owner), &account(*spender), *subtracted)
            .map(|_| ()),
        Op::Claim { caller } => ledger.claim_reserve(&account(*caller)),
        Op::Rebase { caller, delta } => authority
            .authorize(&account(*caller))
            .and_then(|cap| ledger.rebase(&cap, *delta as u128))
            .map(|_| ()),
    };
    outcome.map_err(|_| ())
}
