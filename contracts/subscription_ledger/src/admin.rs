//! Admin and config: init, min_topup, admin rotation, token access.
//!
//! **PRs that only change admin or configuration behavior should edit this file only.**

use crate::types::{DataKey, Error, LedgerConfig};
use soroban_sdk::{symbol_short, token, Address, Env, Symbol};

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Keeps the contract instance (config and escrow total) live.
pub(crate) fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn do_init(env: &Env, admin: Address, token: Address, min_topup: i128) -> Result<(), Error> {
    admin.require_auth();
    extend_instance_ttl(env);
    if env.storage().instance().has(&DataKey::Config) {
        return Err(Error::AlreadyInitialized);
    }
    if min_topup < 0 {
        return Err(Error::InvalidAmount);
    }

    let config = LedgerConfig {
        admin: admin.clone(),
        token,
        min_topup,
    };
    env.storage().instance().set(&DataKey::Config, &config);
    env.storage().instance().set(&DataKey::TotalLocked, &0i128);

    env.events().publish((symbol_short!("init"), admin), config);
    Ok(())
}

pub fn get_config(env: &Env) -> Result<LedgerConfig, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

/// Authenticates `admin` and checks it against the stored admin.
pub fn require_admin(env: &Env, admin: &Address) -> Result<LedgerConfig, Error> {
    admin.require_auth();
    let config = get_config(env)?;
    if *admin != config.admin {
        return Err(Error::Unauthorized);
    }
    Ok(config)
}

pub fn do_set_min_topup(env: &Env, admin: Address, min_topup: i128) -> Result<(), Error> {
    let mut config = require_admin(env, &admin)?;
    extend_instance_ttl(env);
    if min_topup < 0 {
        return Err(Error::InvalidAmount);
    }
    config.min_topup = min_topup;
    env.storage().instance().set(&DataKey::Config, &config);

    env.events()
        .publish((symbol_short!("min_topup"), admin), min_topup);
    Ok(())
}

pub fn do_rotate_admin(env: &Env, current_admin: Address, new_admin: Address) -> Result<(), Error> {
    let mut config = require_admin(env, &current_admin)?;
    extend_instance_ttl(env);
    config.admin = new_admin.clone();
    env.storage().instance().set(&DataKey::Config, &config);

    env.events().publish(
        (Symbol::new(env, "admin_rotated"), current_admin.clone()),
        (current_admin, new_admin, env.ledger().timestamp()),
    );
    Ok(())
}

/// Client for the configured SEP-41 token.
pub fn token_client(env: &Env) -> Result<token::Client<'static>, Error> {
    let config = get_config(env)?;
    Ok(token::Client::new(env, &config.token))
}
