//! Subscription lifecycle state machine and action validation.
//!
//! Kept in a separate module so PRs touching lifecycle rules do not conflict
//! with PRs touching payment processing or escrow accounting.

use crate::types::{Error, SubscriptionState};

/// Operations that act on a (subscriber, provider) pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Create,
    TopUp,
    ProcessPayment,
    Cancel,
}

/// Validates `action` against the pair's current `state` and returns the
/// state the pair ends up in.
///
/// # Transition Rules
///
/// | From      | Action         | To        | Error                |
/// |-----------|----------------|-----------|----------------------|
/// | Absent    | Create         | Active    |                      |
/// | Cancelled | Create         | Active    |                      |
/// | Active    | Create         |           | `AlreadyActive`      |
/// | Active    | TopUp          | Active    |                      |
/// | Active    | ProcessPayment | Active    |                      |
/// | Active    | Cancel         | Cancelled |                      |
/// | Cancelled | Cancel         | Cancelled | (idempotent)         |
/// | Cancelled | TopUp, ProcessPayment |    | `Inactive`           |
/// | Absent    | anything else  |           | `NoSuchSubscription` |
///
/// Time gating and balance checks are applied by the callers after this
/// passes.
pub fn validate_action(
    state: SubscriptionState,
    action: Action,
) -> Result<SubscriptionState, Error> {
    match (state, action) {
        (SubscriptionState::Absent | SubscriptionState::Cancelled, Action::Create) => {
            Ok(SubscriptionState::Active)
        }
        (SubscriptionState::Active, Action::Create) => Err(Error::AlreadyActive),
        (SubscriptionState::Active, Action::TopUp | Action::ProcessPayment) => {
            Ok(SubscriptionState::Active)
        }
        (SubscriptionState::Active | SubscriptionState::Cancelled, Action::Cancel) => {
            Ok(SubscriptionState::Cancelled)
        }
        (SubscriptionState::Cancelled, Action::TopUp | Action::ProcessPayment) => {
            Err(Error::Inactive)
        }
        (SubscriptionState::Absent, _) => Err(Error::NoSuchSubscription),
    }
}

/// Boolean form of [`validate_action`].
pub fn can_apply(state: SubscriptionState, action: Action) -> bool {
    validate_action(state, action).is_ok()
}
