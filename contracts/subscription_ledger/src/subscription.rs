//! Subscription lifecycle: create, top up, cancel.
//!
//! **PRs that only change subscription lifecycle or escrow custody should edit this file only.**

use crate::admin::{extend_instance_ttl, get_config, token_client};
use crate::queries::{
    extend_persistent_ttl, get_subscription, get_total_locked, load_subscription,
    provider_subscribers,
};
use crate::safe_math::{advance, credit, cycles_covered, cycles_due, debit, total_for_cycles};
use crate::state_machine::{validate_action, Action};
use crate::types::{
    CancellationReceipt, DataKey, Error, FundsToppedUpEvent, Subscription,
    SubscriptionCancelledEvent, SubscriptionCreatedEvent, SubscriptionKey, SubscriptionState,
};
use soroban_sdk::{symbol_short, Address, Env};

pub(crate) fn save_subscription(env: &Env, sub: &Subscription) {
    let data_key = DataKey::Subscription(sub.key());
    env.storage().persistent().set(&data_key, sub);
    extend_persistent_ttl(env, &data_key);
}

/// Adds `amount` to the contract-wide escrow total.
pub(crate) fn lock_funds(env: &Env, amount: i128) -> Result<(), Error> {
    let total = credit(get_total_locked(env), amount)?;
    env.storage().instance().set(&DataKey::TotalLocked, &total);
    Ok(())
}

/// Removes `amount` from the contract-wide escrow total.
pub(crate) fn release_funds(env: &Env, amount: i128) -> Result<(), Error> {
    let total = debit(get_total_locked(env), amount)?;
    env.storage().instance().set(&DataKey::TotalLocked, &total);
    Ok(())
}

fn index_subscriber(env: &Env, provider: &Address, subscriber: &Address) {
    let mut subscribers = provider_subscribers(env, provider);
    subscribers.push_back(subscriber.clone());
    let data_key = DataKey::ProviderSubscribers(provider.clone());
    env.storage().persistent().set(&data_key, &subscribers);
    extend_persistent_ttl(env, &data_key);
}

pub fn do_create_subscription(
    env: &Env,
    subscriber: Address,
    provider: Address,
    amount: i128,
    duration: u64,
    deposit: i128,
) -> Result<Subscription, Error> {
    subscriber.require_auth();
    extend_instance_ttl(env);

    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    if subscriber == provider {
        return Err(Error::SelfSubscription);
    }
    if deposit != amount {
        return Err(Error::InvalidDeposit);
    }

    let key = SubscriptionKey::new(subscriber.clone(), provider.clone());
    let existing = load_subscription(env, &key);
    let state = existing
        .as_ref()
        .map(Subscription::state)
        .unwrap_or(SubscriptionState::Absent);
    validate_action(state, Action::Create)?;

    let now = env.ledger().timestamp();
    let next_payment = advance(now, duration, 1)?;

    let token = token_client(env)?;
    if token.balance(&subscriber) < deposit {
        return Err(Error::InsufficientFunds);
    }
    lock_funds(env, deposit)?;

    // A cancelled record is replaced wholesale; its escrow is already empty.
    let sub = Subscription {
        subscriber: subscriber.clone(),
        provider: provider.clone(),
        amount,
        duration,
        next_payment,
        active: true,
        locked_balance: deposit,
        created_at: now,
        payments_made: 0,
    };
    save_subscription(env, &sub);
    if existing.is_none() {
        index_subscriber(env, &provider, &subscriber);
    }

    token.transfer(&subscriber, &env.current_contract_address(), &deposit);

    env.events().publish(
        (symbol_short!("created"), subscriber, provider),
        SubscriptionCreatedEvent {
            amount,
            duration,
            next_payment,
        },
    );
    Ok(sub)
}

/// Subscriber adds funds to the escrow so later cycles can be paid.
///
/// # Minimum top-up enforcement
/// Rejects amounts below the configured minimum threshold. The minimum is set
/// at initialization and adjustable by the admin via `set_min_topup`.
pub fn do_top_up(
    env: &Env,
    subscriber: Address,
    provider: Address,
    amount: i128,
) -> Result<i128, Error> {
    subscriber.require_auth();
    extend_instance_ttl(env);

    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let config = get_config(env)?;
    if amount < config.min_topup {
        return Err(Error::BelowMinimumTopup);
    }

    let key = SubscriptionKey::new(subscriber.clone(), provider.clone());
    let mut sub = get_subscription(env, &key)?;
    validate_action(sub.state(), Action::TopUp)?;

    let token = token_client(env)?;
    if token.balance(&subscriber) < amount {
        return Err(Error::InsufficientFunds);
    }

    sub.locked_balance = credit(sub.locked_balance, amount)?;
    lock_funds(env, amount)?;
    save_subscription(env, &sub);

    token.transfer(&subscriber, &env.current_contract_address(), &amount);

    env.events().publish(
        (symbol_short!("topped_up"), subscriber, provider),
        FundsToppedUpEvent {
            amount,
            locked_balance: sub.locked_balance,
        },
    );
    Ok(sub.locked_balance)
}

/// Subscriber cancels. Cycles already due are settled to the provider (as
/// far as the escrow covers them); the rest of the escrow is refunded.
///
/// Cancelling an already cancelled subscription is a no-op.
pub fn do_cancel_subscription(
    env: &Env,
    subscriber: Address,
    provider: Address,
    authorizer: Address,
) -> Result<CancellationReceipt, Error> {
    authorizer.require_auth();
    if authorizer != subscriber {
        return Err(Error::Unauthorized);
    }
    extend_instance_ttl(env);

    let key = SubscriptionKey::new(subscriber.clone(), provider.clone());
    let mut sub = get_subscription(env, &key)?;
    if sub.state() == SubscriptionState::Cancelled {
        return Ok(CancellationReceipt {
            settled: 0,
            refunded: 0,
        });
    }
    validate_action(sub.state(), Action::Cancel)?;
    let token = token_client(env)?;

    let now = env.ledger().timestamp();
    let earned_cycles = cycles_due(now, sub.next_payment, sub.duration)
        .min(cycles_covered(sub.locked_balance, sub.amount));
    let settled = total_for_cycles(sub.amount, earned_cycles)?;
    let refunded = debit(sub.locked_balance, settled)?;

    // Saturate: an unrepresentable schedule must not block the refund.
    sub.next_payment =
        advance(sub.next_payment, sub.duration, earned_cycles).unwrap_or(u64::MAX);
    sub.payments_made = sub
        .payments_made
        .saturating_add(u32::try_from(earned_cycles).unwrap_or(u32::MAX));
    release_funds(env, sub.locked_balance)?;
    sub.locked_balance = 0;
    sub.active = false;
    save_subscription(env, &sub);

    let contract = env.current_contract_address();
    if settled > 0 {
        token.transfer(&contract, &provider, &settled);
    }
    if refunded > 0 {
        token.transfer(&contract, &subscriber, &refunded);
    }

    env.events().publish(
        (symbol_short!("cancelled"), subscriber, provider),
        SubscriptionCancelledEvent { settled, refunded },
    );
    Ok(CancellationReceipt { settled, refunded })
}
