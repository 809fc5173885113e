// ========================================
// CONCURRENT ACCESS TO A SHARED LEDGER
// ========================================
//
// Many tasks hammer one SharedLedger with transfers, claims and rebases.
// Every operation runs under the ledger's lock, so the accounting
// invariants must hold at the end no matter how tasks interleave.
//
// Usage:
//   cargo test --test concurrent_access
//
// ========================================

use esl_core::{LedgerAction, SharedLedger};
use esl_integration_tests::{operator, user, whole_token_ledger, OPERATOR, RESERVE};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_claims_and_transfers_conserve_pool() {
    let shared = SharedLedger::new(whole_token_ledger());
    let authority = Arc::new(operator());

    let mut tasks = Vec::new();
    for n in 1..=16u8 {
        let shared = shared.clone();
        let authority = Arc::clone(&authority);
        tasks.push(tokio::task::spawn_blocking(move || {
            let me = user(n);
            let next = user(n % 16 + 1);
            let claim = shared.execute(authority.as_ref(), &me, LedgerAction::ClaimReserve);
            assert!(claim.success, "{}", claim.message);

            let mut sent = 0u32;
            for _ in 0..50 {
                let resp = shared.execute(
                    authority.as_ref(),
                    &me,
                    LedgerAction::Transfer {
                        to: next,
                        amount: 7,
                    },
                );
                if resp.success {
                    sent += 1;
                }
            }
            sent
        }));
    }

    let rebaser = {
        let shared = shared.clone();
        let authority = Arc::clone(&authority);
        tokio::task::spawn_blocking(move || {
            for delta in [110u128, 90, 105, 95] {
                let resp = shared.execute(authority.as_ref(), &OPERATOR, LedgerAction::Rebase { delta });
                assert!(resp.success, "{}", resp.message);
            }
        })
    };

    for task in tasks {
        // Each holder starts with 10,000 and sends at most 350 in total
        assert_eq!(task.await.unwrap(), 50);
    }
    rebaser.await.unwrap();

    shared.with(|ledger| {
        assert!(ledger.check_invariants().is_ok());
        assert_eq!(ledger.scaled_balance_sum(), Some(ledger.scaled_total_supply()));
        for n in 1..=16u8 {
            assert!(ledger.has_claimed(&user(n)));
        }
        // 10M * 1.10 * 0.90 * 1.05 * 0.95 with truncation at each step
        assert_eq!(ledger.total_supply(), 9_875_250);
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_double_claim_race_has_one_winner() {
    let shared = SharedLedger::new(whole_token_ledger());
    let authority = Arc::new(operator());
    let contested = user(42);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let shared = shared.clone();
            let authority = Arc::clone(&authority);
            tokio::task::spawn_blocking(move || {
                shared
                    .execute(authority.as_ref(), &contested, LedgerAction::ClaimReserve)
                    .success
            })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    let snapshot = shared.snapshot();
    let restored = snapshot.restore().unwrap();
    assert_eq!(restored.balance_of(&contested), 10_000);
    assert_eq!(restored.balance_of(&RESERVE), 9_990_000);
}
