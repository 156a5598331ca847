//! Checked arithmetic for escrow balances and billing timestamps.
//!
//! Every function returns an [`Error`] instead of panicking so a bad value
//! aborts the invocation before any state is written.

use crate::types::Error;

/// Adds a non-negative `amount` to `balance`.
///
/// * `Err(Error::InvalidAmount)` if `amount` is negative
/// * `Err(Error::Overflow)` if the sum exceeds `i128::MAX`
pub fn credit(balance: i128, amount: i128) -> Result<i128, Error> {
    if amount < 0 {
        return Err(Error::InvalidAmount);
    }
    balance.checked_add(amount).ok_or(Error::Overflow)
}

/// Removes a non-negative `amount` from `balance`.
///
/// The result is never negative: a shortfall is reported as
/// `Error::InsufficientFunds`.
pub fn debit(balance: i128, amount: i128) -> Result<i128, Error> {
    if amount < 0 {
        return Err(Error::InvalidAmount);
    }
    if balance < amount {
        return Err(Error::InsufficientFunds);
    }
    balance.checked_sub(amount).ok_or(Error::Overflow)
}

/// Moves `timestamp` forward by `cycles` billing cycles of `duration` seconds.
pub fn advance(timestamp: u64, duration: u64, cycles: u64) -> Result<u64, Error> {
    let delta = duration.checked_mul(cycles).ok_or(Error::Overflow)?;
    timestamp.checked_add(delta).ok_or(Error::Overflow)
}

/// Whole cycles of `amount` that `balance` can pay for.
pub fn cycles_covered(balance: i128, amount: i128) -> u64 {
    if amount <= 0 || balance <= 0 {
        return 0;
    }
    u64::try_from(balance / amount).unwrap_or(u64::MAX)
}

/// Number of cycles already due at `now` for a schedule whose next payment
/// is `next_payment`.
///
/// A zero `duration` makes every cycle due at once, so the result is
/// `u64::MAX` and callers bound it by [`cycles_covered`].
pub fn cycles_due(now: u64, next_payment: u64, duration: u64) -> u64 {
    if now < next_payment {
        return 0;
    }
    if duration == 0 {
        return u64::MAX;
    }
    (now - next_payment) / duration + 1
}

/// `amount * cycles`, checked.
pub fn total_for_cycles(amount: i128, cycles: u64) -> Result<i128, Error> {
    amount
        .checked_mul(i128::from(cycles))
        .ok_or(Error::Overflow)
}
