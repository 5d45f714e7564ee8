//! Contract events.
//!
//! Every successful state change publishes one event with topic
//! `(symbol, project_id)` and one of the structs below as data. The off-chain
//! indexer keys on the leading symbol.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub manager: Address,
    pub target_amount: i128,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsSent {
    pub project_id: u64,
    pub contributor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestCreated {
    pub project_id: u64,
    pub request_index: u32,
    pub recipient: Address,
    pub value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentMade {
    pub project_id: u64,
    pub request_index: u32,
    pub recipient: Address,
    pub value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Refunded {
    pub project_id: u64,
    pub contributor: Address,
    pub amount: i128,
}

pub fn emit_project_created(
    env: &Env,
    project_id: u64,
    manager: Address,
    target_amount: i128,
    deadline: u64,
) {
    env.events().publish(
        (symbol_short!("created"), project_id),
        ProjectCreated {
            project_id,
            manager,
            target_amount,
            deadline,
        },
    );
}

pub fn emit_funds_sent(env: &Env, project_id: u64, contributor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("funded"), project_id),
        FundsSent {
            project_id,
            contributor,
            amount,
        },
    );
}

pub fn emit_request_created(
    env: &Env,
    project_id: u64,
    request_index: u32,
    recipient: Address,
    value: i128,
) {
    env.events().publish(
        (symbol_short!("request"), project_id),
        RequestCreated {
            project_id,
            request_index,
            recipient,
            value,
        },
    );
}

pub fn emit_payment_made(
    env: &Env,
    project_id: u64,
    request_index: u32,
    recipient: Address,
    value: i128,
) {
    env.events().publish(
        (symbol_short!("paid"), project_id),
        PaymentMade {
            project_id,
            request_index,
            recipient,
            value,
        },
    );
}

pub fn emit_refunded(env: &Env, project_id: u64, contributor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"), project_id),
        Refunded {
            project_id,
            contributor,
            amount,
        },
    );
}
