//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the protocol.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key            | Type      | Description                          |
//! |----------------|-----------|--------------------------------------|
//! | `Token`        | `Address` | Funding token shared by all projects |
//! | `ProjectCount` | `u64`     | Registry length / next project ID    |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                      | Type            | Description                     |
//! |--------------------------|-----------------|---------------------------------|
//! | `ProjConfig(id)`         | `ProjectConfig` | Immutable project configuration |
//! | `ProjState(id)`          | `ProjectState`  | Mutable project counters        |
//! | `Contribution(id, addr)` | `i128`          | Outstanding contribution        |
//! | `Request(id, index)`     | `Request`       | Spend request                   |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! Loaders return `Option`; mapping a missing entry to a contract error is
//! left to the entry points.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{ProjectConfig, ProjectState, Request};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Funding token address (Instance).
    Token,
    /// Number of registered projects (Instance).
    ProjectCount,
    /// Immutable project configuration keyed by ID (Persistent).
    ProjConfig(u64),
    /// Mutable project state keyed by ID (Persistent).
    ProjState(u64),
    /// Outstanding contribution of an address to a project (Persistent).
    Contribution(u64, Address),
    /// Spend request keyed by project ID and request index (Persistent).
    Request(u64, u32),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn set_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::Token, token);
    bump_instance(env);
}

pub fn get_token(env: &Env) -> Option<Address> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Token)
}

pub fn get_project_count(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

/// Reads, increments, and stores the project counter.
/// Returns the ID to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> u64 {
    let current = get_project_count(env);
    env.storage()
        .instance()
        .set(&DataKey::ProjectCount, &(current + 1));
    current
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Read a persistent entry, bumping its TTL if it exists.
fn load<T>(env: &Env, key: &DataKey) -> Option<T>
where
    T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value: Option<T> = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

fn store<T>(env: &Env, key: &DataKey, value: &T)
where
    T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

/// Write the config and an empty state for a freshly created project.
pub fn save_new_project(env: &Env, config: &ProjectConfig) {
    store(env, &DataKey::ProjConfig(config.id), config);
    store(env, &DataKey::ProjState(config.id), &ProjectState::default());
}

pub fn load_project_config(env: &Env, id: u64) -> Option<ProjectConfig> {
    load(env, &DataKey::ProjConfig(id))
}

pub fn load_project_state(env: &Env, id: u64) -> Option<ProjectState> {
    load(env, &DataKey::ProjState(id))
}

pub fn save_project_state(env: &Env, id: u64, state: &ProjectState) {
    store(env, &DataKey::ProjState(id), state);
}

/// Outstanding contribution of `contributor`; `0` when none was ever made.
pub fn get_contribution(env: &Env, id: u64, contributor: &Address) -> i128 {
    load(env, &DataKey::Contribution(id, contributor.clone())).unwrap_or(0)
}

pub fn set_contribution(env: &Env, id: u64, contributor: &Address, amount: i128) {
    store(env, &DataKey::Contribution(id, contributor.clone()), &amount);
}

pub fn load_request(env: &Env, id: u64, index: u32) -> Option<Request> {
    load(env, &DataKey::Request(id, index))
}

pub fn save_request(env: &Env, id: u64, index: u32, request: &Request) {
    store(env, &DataKey::Request(id, index), request);
}
