//! Read-only entrypoints and helpers: get_subscription, next payment info,
//! top-up estimates, provider listings.
//!
//! **PRs that only add or change read-only/query behavior should edit this file only.**

use crate::admin::{PERSISTENT_BUMP_AMOUNT, PERSISTENT_LIFETIME_THRESHOLD};
use crate::safe_math::{cycles_covered, total_for_cycles};
use crate::state_machine::{can_apply, Action};
use crate::types::{
    DataKey, Error, NextPaymentInfo, Subscription, SubscriptionKey, SubscriptionState,
};
use soroban_sdk::{Address, Env, Vec};

/// Bumps a persistent entry. The entry must exist.
pub(crate) fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage().persistent().extend_ttl(
        key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
}

pub fn load_subscription(env: &Env, key: &SubscriptionKey) -> Option<Subscription> {
    let data_key = DataKey::Subscription(key.clone());
    let sub: Option<Subscription> = env.storage().persistent().get(&data_key);
    if sub.is_some() {
        extend_persistent_ttl(env, &data_key);
    }
    sub
}

pub fn get_subscription(env: &Env, key: &SubscriptionKey) -> Result<Subscription, Error> {
    load_subscription(env, key).ok_or(Error::NoSuchSubscription)
}

pub fn get_subscription_state(env: &Env, key: &SubscriptionKey) -> SubscriptionState {
    load_subscription(env, key)
        .map(|sub| sub.state())
        .unwrap_or(SubscriptionState::Absent)
}

/// Computes the schedule summary for a subscription at the current ledger time.
///
/// Does not mutate state. `is_due` mirrors the time and lifecycle gates of
/// `process_payment`; it does not look at the escrow, so a due but
/// underfunded subscription reports `is_due == true` and `cycles_funded == 0`.
pub fn compute_next_payment_info(env: &Env, subscription: &Subscription) -> NextPaymentInfo {
    let is_payment_expected = can_apply(subscription.state(), Action::ProcessPayment);
    let is_due = is_payment_expected && env.ledger().timestamp() >= subscription.next_payment;
    let cycles_funded = u32::try_from(cycles_covered(
        subscription.locked_balance,
        subscription.amount,
    ))
    .unwrap_or(u32::MAX);

    NextPaymentInfo {
        next_payment: subscription.next_payment,
        is_due,
        is_payment_expected,
        cycles_funded,
    }
}

/// Amount the subscriber must top up so the escrow covers `num_cycles`
/// payments. Never negative.
pub fn estimate_topup_for_cycles(
    env: &Env,
    key: &SubscriptionKey,
    num_cycles: u32,
) -> Result<i128, Error> {
    let sub = get_subscription(env, key)?;
    if num_cycles == 0 {
        return Ok(0);
    }

    let required = total_for_cycles(sub.amount, u64::from(num_cycles))?;
    Ok(required.saturating_sub(sub.locked_balance).max(0))
}

pub(crate) fn provider_subscribers(env: &Env, provider: &Address) -> Vec<Address> {
    let data_key = DataKey::ProviderSubscribers(provider.clone());
    match env.storage().persistent().get(&data_key) {
        Some(subscribers) => {
            extend_persistent_ttl(env, &data_key);
            subscribers
        }
        None => Vec::new(env),
    }
}

/// Returns subscriptions for a provider, paginated by offset.
///
/// * `provider` – the provider address to query.
/// * `start`    – 0-based offset into the provider's subscriber list.
/// * `limit`    – maximum number of subscriptions to return.
///
/// Results are ordered by first creation. Cancelled subscriptions are
/// included. Returns an empty `Vec` when the provider has no subscriptions or
/// `start` is beyond the end of the list.
pub fn get_subscriptions_by_provider(
    env: &Env,
    provider: Address,
    start: u32,
    limit: u32,
) -> Vec<Subscription> {
    let subscribers = provider_subscribers(env, &provider);
    let len = subscribers.len();
    let mut result = Vec::new(env);
    if start >= len || limit == 0 {
        return result;
    }

    let end = start.saturating_add(limit).min(len);
    for subscriber in subscribers.slice(start..end).iter() {
        let key = SubscriptionKey::new(subscriber, provider.clone());
        if let Some(sub) = load_subscription(env, &key) {
            result.push_back(sub);
        }
    }
    result
}

/// Returns the number of subscribers that ever subscribed to `provider`.
pub fn get_provider_subscription_count(env: &Env, provider: Address) -> u32 {
    provider_subscribers(env, &provider).len()
}

/// Sum of every escrowed balance held by the contract.
pub fn get_total_locked(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalLocked)
        .unwrap_or(0)
}
