//! Single payment logic (no auth). Used by process_payment and process_payments.
//!
//! **PRs that only change how one subscription is paid out should edit this file only.**
//!
//! # Double-payment protection
//!
//! Each successful payment moves `next_payment` forward by exactly one
//! `duration` (cycle aligned, not `now + duration`), so one billing cycle can
//! be paid at most once. A late relayer can catch up on missed cycles with
//! repeated calls, each one bounded by the escrow.

use crate::admin::{extend_instance_ttl, token_client};
use crate::queries::get_subscription;
use crate::safe_math::{advance, debit};
use crate::state_machine::{validate_action, Action};
use crate::subscription::{release_funds, save_subscription};
use crate::types::{
    BatchPaymentResult, Error, PaymentProcessedEvent, PaymentReceipt, SubscriptionKey,
};
use soroban_sdk::{symbol_short, Env, Vec};

/// Pays one due cycle from escrow to the provider.
///
/// Checks run in this order and all of them happen before any write:
/// * record exists (`NoSuchSubscription`)
/// * record is active (`Inactive`)
/// * `now >= next_payment` (`NotDue`)
/// * `locked_balance >= amount` (`InsufficientFunds`)
pub fn pay_one(env: &Env, key: &SubscriptionKey) -> Result<PaymentReceipt, Error> {
    extend_instance_ttl(env);
    let mut sub = get_subscription(env, key)?;
    validate_action(sub.state(), Action::ProcessPayment)?;

    let now = env.ledger().timestamp();
    if now < sub.next_payment {
        return Err(Error::NotDue);
    }

    let remaining = debit(sub.locked_balance, sub.amount)?;
    let due_at = sub.next_payment;
    let next_payment = advance(due_at, sub.duration, 1)?;
    let token = token_client(env)?;

    sub.locked_balance = remaining;
    sub.next_payment = next_payment;
    sub.payments_made = sub.payments_made.saturating_add(1);
    release_funds(env, sub.amount)?;
    save_subscription(env, &sub);

    token.transfer(&env.current_contract_address(), &sub.provider, &sub.amount);

    env.events().publish(
        (
            symbol_short!("paid"),
            sub.subscriber.clone(),
            sub.provider.clone(),
        ),
        PaymentProcessedEvent {
            amount: sub.amount,
            due_at,
            next_payment,
        },
    );

    Ok(PaymentReceipt {
        subscriber: sub.subscriber,
        provider: sub.provider,
        amount: sub.amount,
        due_at,
        paid_at: now,
        next_payment,
        remaining_balance: remaining,
    })
}

/// Processes every key independently; a failing key does not affect the others.
pub fn pay_batch(env: &Env, keys: &Vec<SubscriptionKey>) -> Vec<BatchPaymentResult> {
    let mut results = Vec::new(env);
    for key in keys.iter() {
        let res = match pay_one(env, &key) {
            Ok(_) => BatchPaymentResult {
                success: true,
                error_code: 0,
            },
            Err(e) => BatchPaymentResult {
                success: false,
                error_code: e.to_code(),
            },
        };
        results.push_back(res);
    }
    results
}
