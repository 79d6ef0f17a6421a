//! Property tests over random operation sequences on a single ledger.

#![allow(clippy::panic)]

use chrono::{TimeZone, Utc};
use cpamm_gateway::amm::{AmmError, Amount, HolderId, PoolLedger, Shares, TokenSide, U256};
use proptest::prelude::*;
use tokio_test::{assert_err, assert_ok};

const HOLDERS: [&str; 3] = ["0xalice", "0xbob", "0xcarol"];

#[derive(Debug, Clone)]
enum Op {
    /// Deposit at the quoted ratio.
    Deposit { holder: usize, amount1: u128 },
    /// Deposit arbitrary amounts, usually off-ratio.
    RawDeposit {
        holder: usize,
        amount1: u128,
        amount2: u128,
    },
    /// Burn a fraction (per mille) of the holder's balance, plus `extra`.
    Withdraw {
        holder: usize,
        per_mille: u128,
        extra: u128,
    },
    Swap { side: TokenSide, amount_in: u128 },
}

fn op() -> impl Strategy<Value = Op> {
    let holder = 0..HOLDERS.len();
    let amount = 1u128..1_000_000_000_000u128;
    prop_oneof![
        (holder.clone(), amount.clone())
            .prop_map(|(holder, amount1)| Op::Deposit { holder, amount1 }),
        (holder.clone(), amount.clone(), amount.clone()).prop_map(
            |(holder, amount1, amount2)| Op::RawDeposit {
                holder,
                amount1,
                amount2
            }
        ),
        (holder, 0u128..=1000, 0u128..3).prop_map(|(holder, per_mille, extra)| Op::Withdraw {
            holder,
            per_mille,
            extra
        }),
        (any::<bool>(), amount).prop_map(|(first, amount_in)| Op::Swap {
            side: if first {
                TokenSide::Token1
            } else {
                TokenSide::Token2
            },
            amount_in
        }),
    ]
}

fn holder(index: usize) -> HolderId {
    HolderId::new(HOLDERS.get(index).copied().unwrap_or("0xalice"))
}

fn check_invariants(ledger: &PoolLedger) -> Result<(), TestCaseError> {
    let sum = ledger
        .holders()
        .try_fold(0u128, |acc, (_, s)| acc.checked_add(s.get()));
    prop_assert_eq!(sum, Some(ledger.total_shares().get()));

    let no_shares = ledger.total_shares().is_zero();
    prop_assert_eq!(no_shares, ledger.reserve1().is_zero());
    prop_assert_eq!(no_shares, ledger.reserve2().is_zero());
    Ok(())
}

fn apply(ledger: &mut PoolLedger, op: &Op, step: i64) -> Result<(), TestCaseError> {
    let ts = Utc.timestamp_opt(1_700_000_000 + step, 0).single().unwrap_or_default();
    let before = ledger.snapshot();
    let events_before = ledger.events().len();

    let outcome: Result<(), AmmError> = match *op {
        Op::Deposit { holder: h, amount1 } => {
            let amount1 = Amount::new(amount1);
            let amount2 = if ledger.is_empty() {
                Ok(amount1)
            } else {
                ledger.calculate_token2_deposit(amount1)
            };
            match amount2 {
                Ok(amount2) => ledger
                    .add_liquidity(&holder(h), amount1, amount2, ts)
                    .map(|_| ()),
                Err(e) => Err(e),
            }
        }
        Op::RawDeposit {
            holder: h,
            amount1,
            amount2,
        } => ledger
            .add_liquidity(&holder(h), Amount::new(amount1), Amount::new(amount2), ts)
            .map(|_| ()),
        Op::Withdraw {
            holder: h,
            per_mille,
            extra,
        } => {
            let id = holder(h);
            let balance = ledger.shares_of(&id).get();
            let shares = Shares::new((balance / 1000).saturating_mul(per_mille).saturating_add(extra));
            let quote = ledger.calculate_token_withdraw(shares);
            let result = ledger.remove_liquidity(&id, shares, ts);
            if let (Ok(quoted), Ok(event)) = (&quote, &result) {
                prop_assert_eq!(*quoted, (event.amount1, event.amount2));
            }
            result.map(|_| ())
        }
        Op::Swap { side, amount_in } => {
            let amount_in = Amount::new(amount_in);
            let k_before = ledger.invariant();
            let reserves = ledger.reserves();
            let quote = ledger.calculate_swap(side, amount_in);
            let result = ledger.swap(&holder(0), side, amount_in, ts);
            prop_assert_eq!(quote.is_ok(), result.is_ok());
            if let (Ok(quoted), Ok(event)) = (&quote, &result) {
                prop_assert_eq!(*quoted, event.amount_received);
                prop_assert_eq!(
                    ledger.reserves().of(side).get(),
                    reserves.of(side).get() + amount_in.get()
                );
                prop_assert_eq!(
                    ledger.reserves().of(side.other()).get(),
                    reserves.of(side.other()).get() - quoted.get()
                );
                let new_in = U256::from(ledger.reserves().of(side).get());
                prop_assert!(ledger.invariant() <= k_before);
                prop_assert!(k_before - ledger.invariant() < new_in);
            }
            result.map(|_| ())
        }
    };

    match outcome {
        Ok(()) => prop_assert_eq!(ledger.events().len(), events_before + 1),
        Err(_) => {
            prop_assert_eq!(ledger.snapshot(), before);
            prop_assert_eq!(ledger.events().len(), events_before);
        }
    }
    check_invariants(ledger)
}

proptest! {
    #[test]
    fn random_sequences_keep_invariants(ops in prop::collection::vec(op(), 1..60)) {
        let mut ledger = PoolLedger::new();
        for (step, op) in ops.iter().enumerate() {
            apply(&mut ledger, op, i64::try_from(step).unwrap_or_default())?;
        }
    }

    #[test]
    fn deposit_then_full_withdraw_returns_everything(
        amount1 in 1u128..1_000_000_000_000_000_000_000,
        amount2 in 1u128..1_000_000_000_000_000_000_000,
    ) {
        let mut ledger = PoolLedger::new();
        let lp = HolderId::new("0xlp");
        let Ok(deposit) = ledger.add_liquidity(&lp, Amount::new(amount1), Amount::new(amount2), Utc::now()) else {
            panic!("first deposit failed");
        };
        let Ok(withdraw) = ledger.remove_liquidity(&lp, deposit.shares, Utc::now()) else {
            panic!("full withdrawal failed");
        };
        prop_assert_eq!(withdraw.amount1.get(), amount1);
        prop_assert_eq!(withdraw.amount2.get(), amount2);
        prop_assert!(ledger.is_empty());
    }
}

#[test]
fn quote_and_swap_agree_on_rejection() {
    let mut ledger = PoolLedger::new();
    let lp = HolderId::new("0xlp");
    assert_ok!(ledger.add_liquidity(&lp, Amount::new(1_000), Amount::new(1_000), Utc::now()));

    assert_err!(ledger.calculate_token1_swap(Amount::ZERO));
    assert_err!(ledger.swap_token1(&lp, Amount::ZERO, Utc::now()));

    let huge = Amount::new(u128::MAX);
    assert_eq!(
        ledger.calculate_token1_swap(huge),
        Err(AmmError::Overflow)
    );
    assert_eq!(ledger.reserve1(), Amount::new(1_000));
}
