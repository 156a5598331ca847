//! Contract types: errors, storage keys, records, receipts and event payloads.
//!
//! Kept in a separate module to reduce merge conflicts when editing the state
//! machine or contract entrypoints.

use soroban_sdk::{contracterror, contracttype, Address};

/// Identifies one subscription: the ordered (subscriber, provider) pair.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionKey {
    pub subscriber: Address,
    pub provider: Address,
}

impl SubscriptionKey {
    pub fn new(subscriber: Address, provider: Address) -> Self {
        Self {
            subscriber,
            provider,
        }
    }
}

/// Storage keys.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Ledger configuration (instance storage).
    Config,
    /// Sum of every `locked_balance` currently held (instance storage).
    TotalLocked,
    /// One subscription record per pair (persistent storage).
    Subscription(SubscriptionKey),
    /// Provider -> subscribers that ever opened a subscription with it.
    ProviderSubscribers(Address),
}

#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    /// Deposit attached to `create_subscription` differs from `amount`.
    InvalidDeposit = 400,
    Unauthorized = 401,
    BelowMinimumTopup = 402,
    /// Checked arithmetic wrapped (balances or timestamps).
    Overflow = 403,
    NoSuchSubscription = 404,
    /// Pair already has an active subscription; cancel it first.
    AlreadyActive = 409,
    /// Payment requested before `next_payment`.
    NotDue = 1001,
    /// Subscription was cancelled.
    Inactive = 1002,
    /// Escrow or subscriber wallet cannot cover the transfer.
    InsufficientFunds = 1003,
    /// The provided amount is zero or negative.
    InvalidAmount = 1006,
    SelfSubscription = 1007,
    NotInitialized = 1100,
    AlreadyInitialized = 1101,
}

impl Error {
    /// Returns the numeric code for this error (for batch result reporting).
    pub const fn to_code(self) -> u32 {
        self as u32
    }
}

/// Lifecycle state of a (subscriber, provider) pair.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubscriptionState {
    /// No record has ever been created for the pair.
    Absent = 0,
    /// Funds are escrowed and payments can be processed.
    Active = 1,
    /// Cancelled; escrow has been settled and refunded.
    Cancelled = 2,
}

/// Stores subscription terms, escrow and schedule.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscription {
    pub subscriber: Address,
    pub provider: Address,
    /// Charged per billing cycle, always positive.
    pub amount: i128,
    /// Billing cycle length in seconds.
    pub duration: u64,
    /// Timestamp at or after which the next payment may be processed.
    pub next_payment: u64,
    pub active: bool,
    /// Value escrowed by the contract for this pair.
    pub locked_balance: i128,
    pub created_at: u64,
    pub payments_made: u32,
}

impl Subscription {
    pub fn state(&self) -> SubscriptionState {
        if self.active {
            SubscriptionState::Active
        } else {
            SubscriptionState::Cancelled
        }
    }

    pub fn key(&self) -> SubscriptionKey {
        SubscriptionKey::new(self.subscriber.clone(), self.provider.clone())
    }
}

/// Configuration written once by `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    pub admin: Address,
    /// SEP-41 token used for every deposit and payout.
    pub token: Address,
    /// Smallest accepted `top_up` amount.
    pub min_topup: i128,
}

/// Returned by a successful `process_payment`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentReceipt {
    pub subscriber: Address,
    pub provider: Address,
    pub amount: i128,
    /// The `next_payment` value this payment settled.
    pub due_at: u64,
    pub paid_at: u64,
    pub next_payment: u64,
    pub remaining_balance: i128,
}

/// Funds moved out of escrow by `cancel_subscription`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CancellationReceipt {
    /// Paid to the provider for cycles that were already due.
    pub settled: i128,
    /// Returned to the subscriber.
    pub refunded: i128,
}

/// Result of processing one key in a batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchPaymentResult {
    pub success: bool,
    /// If success is false, the error code (see [`Error::to_code`]); otherwise 0.
    pub error_code: u32,
}

/// Schedule summary for off-chain relayers and dashboards.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NextPaymentInfo {
    pub next_payment: u64,
    /// Active and `now >= next_payment`.
    pub is_due: bool,
    /// False once cancelled.
    pub is_payment_expected: bool,
    /// Whole cycles the current escrow can pay for.
    pub cycles_funded: u32,
}

// Event types
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionCreatedEvent {
    pub amount: i128,
    pub duration: u64,
    pub next_payment: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsToppedUpEvent {
    pub amount: i128,
    pub locked_balance: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentProcessedEvent {
    pub amount: i128,
    pub due_at: u64,
    pub next_payment: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionCancelledEvent {
    pub settled: i128,
    pub refunded: i128,
}
