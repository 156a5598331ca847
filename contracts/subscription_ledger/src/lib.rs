#![no_std]

mod admin;
mod payment_core;
mod queries;
pub mod safe_math;
mod state_machine;
mod subscription;
mod types;

pub use state_machine::{can_apply, validate_action, Action};
pub use types::{
    BatchPaymentResult, CancellationReceipt, Error, FundsToppedUpEvent, LedgerConfig,
    NextPaymentInfo, PaymentProcessedEvent, PaymentReceipt, Subscription,
    SubscriptionCancelledEvent, SubscriptionCreatedEvent, SubscriptionKey, SubscriptionState,
};

use soroban_sdk::{contract, contractimpl, Address, Env, Vec};

#[contract]
pub struct SubscriptionLedger;

#[contractimpl]
impl SubscriptionLedger {
    /// Initialize the ledger: admin, payment token and minimum top-up.
    ///
    /// Can only be called once; a second call fails with
    /// [`Error::AlreadyInitialized`].
    pub fn init(env: Env, admin: Address, token: Address, min_topup: i128) -> Result<(), Error> {
        admin::do_init(&env, admin, token, min_topup)
    }

    pub fn get_config(env: Env) -> Result<LedgerConfig, Error> {
        admin::get_config(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        Ok(admin::get_config(&env)?.admin)
    }

    pub fn get_token(env: Env) -> Result<Address, Error> {
        Ok(admin::get_config(&env)?.token)
    }

    /// Get the current minimum top-up threshold.
    pub fn get_min_topup(env: Env) -> Result<i128, Error> {
        Ok(admin::get_config(&env)?.min_topup)
    }

    /// Update the minimum top-up threshold. Only callable by admin.
    ///
    /// # Arguments
    /// * `min_topup` - Minimum amount (in token base units) accepted by `top_up`.
    ///   Must be non-negative.
    pub fn set_min_topup(env: Env, admin: Address, min_topup: i128) -> Result<(), Error> {
        admin::do_set_min_topup(&env, admin, min_topup)
    }

    /// Rotate admin to a new address. Only callable by current admin.
    ///
    /// The admin controls configuration only; it has no access to escrowed
    /// funds. Emits `admin_rotated` with the old admin, new admin and ledger
    /// timestamp.
    ///
    /// # Errors
    /// * [`Error::Unauthorized`] - caller is not the current admin
    /// * [`Error::NotInitialized`] - `init` has not run
    pub fn rotate_admin(env: Env, current_admin: Address, new_admin: Address) -> Result<(), Error> {
        admin::do_rotate_admin(&env, current_admin, new_admin)
    }

    /// Open a subscription from `subscriber` to `provider`.
    ///
    /// The subscriber must attach exactly one cycle's worth of funds:
    /// `deposit` has to equal `amount`, otherwise [`Error::InvalidDeposit`].
    /// The deposit is moved into escrow and the first payment becomes due at
    /// `now + duration`.
    ///
    /// # State Transitions
    /// Allowed from: absent, `Cancelled` (the old record is replaced).
    /// An active pair is rejected with [`Error::AlreadyActive`].
    pub fn create_subscription(
        env: Env,
        subscriber: Address,
        provider: Address,
        amount: i128,
        duration: u64,
        deposit: i128,
    ) -> Result<Subscription, Error> {
        subscription::do_create_subscription(&env, subscriber, provider, amount, duration, deposit)
    }

    /// Subscriber adds funds to the escrow for future cycles. Returns the new
    /// locked balance.
    pub fn top_up(
        env: Env,
        subscriber: Address,
        provider: Address,
        amount: i128,
    ) -> Result<i128, Error> {
        subscription::do_top_up(&env, subscriber, provider, amount)
    }

    /// Subscriber cancels the subscription.
    ///
    /// Cycles that were already due are paid to the provider, as far as the
    /// escrow covers them; everything else is refunded to the subscriber in
    /// the same call.
    ///
    /// # State Transitions
    /// Allowed from: `Active` (transitions to `Cancelled`), `Cancelled` (no-op).
    ///
    /// # Errors
    /// * [`Error::Unauthorized`] - `authorizer` is not the subscriber
    /// * [`Error::NoSuchSubscription`] - no record for the pair
    pub fn cancel_subscription(
        env: Env,
        subscriber: Address,
        provider: Address,
        authorizer: Address,
    ) -> Result<CancellationReceipt, Error> {
        subscription::do_cancel_subscription(&env, subscriber, provider, authorizer)
    }

    /// Pay one due cycle to the provider. Callable by anyone (typically a
    /// relayer); gated only by time and subscription state.
    ///
    /// # State Transitions
    /// - On success: `Active` -> `Active`, `next_payment` advances by `duration`
    /// - On any error: no change
    pub fn process_payment(
        env: Env,
        subscriber: Address,
        provider: Address,
    ) -> Result<PaymentReceipt, Error> {
        payment_core::pay_one(&env, &SubscriptionKey::new(subscriber, provider))
    }

    /// Batch form of [`SubscriptionLedger::process_payment`]. One result per
    /// key, in input order.
    pub fn process_payments(env: Env, keys: Vec<SubscriptionKey>) -> Vec<BatchPaymentResult> {
        payment_core::pay_batch(&env, &keys)
    }

    /// Read subscription by (subscriber, provider) (for indexing and UI).
    pub fn get_subscription(
        env: Env,
        subscriber: Address,
        provider: Address,
    ) -> Result<Subscription, Error> {
        queries::get_subscription(&env, &SubscriptionKey::new(subscriber, provider))
    }

    pub fn get_subscription_state(
        env: Env,
        subscriber: Address,
        provider: Address,
    ) -> SubscriptionState {
        queries::get_subscription_state(&env, &SubscriptionKey::new(subscriber, provider))
    }

    /// Get the next payment schedule for a subscription.
    ///
    /// Readonly. Useful for relayers deciding when to call `process_payment`
    /// and for showing the next billing date.
    pub fn get_next_payment_info(
        env: Env,
        subscriber: Address,
        provider: Address,
    ) -> Result<NextPaymentInfo, Error> {
        let sub = queries::get_subscription(&env, &SubscriptionKey::new(subscriber, provider))?;
        Ok(queries::compute_next_payment_info(&env, &sub))
    }

    /// Top-up needed so the escrow covers `num_cycles` payments.
    pub fn estimate_topup_for_cycles(
        env: Env,
        subscriber: Address,
        provider: Address,
        num_cycles: u32,
    ) -> Result<i128, Error> {
        queries::estimate_topup_for_cycles(
            &env,
            &SubscriptionKey::new(subscriber, provider),
            num_cycles,
        )
    }

    pub fn get_subscriptions_by_provider(
        env: Env,
        provider: Address,
        start: u32,
        limit: u32,
    ) -> Vec<Subscription> {
        queries::get_subscriptions_by_provider(&env, provider, start, limit)
    }

    pub fn get_provider_subscription_count(env: Env, provider: Address) -> u32 {
        queries::get_provider_subscription_count(&env, provider)
    }

    /// Total value held in escrow across all subscriptions.
    pub fn get_total_locked(env: Env) -> i128 {
        queries::get_total_locked(&env)
    }
}
