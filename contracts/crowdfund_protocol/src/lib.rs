//! # Crowdfund Protocol Contract
//!
//! A single Soroban contract that acts as the project factory and hosts the
//! ledger of every project it creates. Each project raises a single funding
//! token towards a target before a relative deadline; its manager spends
//! raised funds through requests, and contributors reclaim their money if the
//! campaign fails.
//!
//! | Phase     | Entry Point(s)                                   |
//! |-----------|--------------------------------------------------|
//! | Bootstrap | `__constructor`                                  |
//! | Registry  | [`CrowdfundProtocol::create_project`], `all_projects`, `project_count` |
//! | Funding   | [`CrowdfundProtocol::send_funds`]                |
//! | Spending  | [`CrowdfundProtocol::create_request`], [`CrowdfundProtocol::make_payment`] |
//! | Refunds   | [`CrowdfundProtocol::refund`]                    |
//! | Queries   | `get_project`, `get_balance`, `manager`, `target_amount`, `raised_amount`, `deadline`, `num_requests`, `requests`, `all_requests`, `fund_contributors`, `token` |
//!
//! ## Architecture
//!
//! Accounting rules live in [`ledger`] as pure transitions; storage access is
//! delegated to [`storage`]. Entry points load, run the transition, persist,
//! and only then move tokens or publish events. An entry point that returns an
//! error has written nothing.
//!
//! `create_request` and `make_payment` are restricted to the project manager.
//! Everything else is open to any address that authorizes the call.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env, String, Vec};

mod events;
mod ledger;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use events::{FundsSent, PaymentMade, ProjectCreated, Refunded, RequestCreated};
pub use types::{Project, Request};

use types::{ProjectConfig, ProjectState};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    ProjectNotFound         = 1,
    NotManager              = 2,
    NotEligibleForRefund    = 3,
    RequestNotFound         = 4,
    RequestAlreadyCompleted = 5,
    InsufficientBalance     = 6,
    InvalidAmount           = 7,
    InvalidDeadline         = 8,
    Overflow                = 9,
    NotInitialized          = 10,
}

impl Error {
    /// Human-readable reason for the failure.
    pub fn message(&self) -> &'static str {
        match self {
            Error::ProjectNotFound => "Project does not exist",
            Error::NotManager => "Only manager can call this function",
            Error::NotEligibleForRefund => "You are not eligible for refund",
            Error::RequestNotFound => "Request does not exist",
            Error::RequestAlreadyCompleted => "Request has already been completed",
            Error::InsufficientBalance => "Insufficient balance",
            Error::InvalidAmount => "Amount must be positive",
            Error::InvalidDeadline => "Deadline is out of range",
            Error::Overflow => "Arithmetic overflow",
            Error::NotInitialized => "Funding token not set",
        }
    }
}

#[contract]
pub struct CrowdfundProtocol;

fn project_config(env: &Env, project_id: u64) -> Result<ProjectConfig, Error> {
    storage::load_project_config(env, project_id).ok_or(Error::ProjectNotFound)
}

fn project_state(env: &Env, project_id: u64) -> Result<ProjectState, Error> {
    storage::load_project_state(env, project_id).ok_or(Error::ProjectNotFound)
}

fn require_manager(config: &ProjectConfig, caller: &Address) -> Result<(), Error> {
    if *caller != config.manager {
        return Err(Error::NotManager);
    }
    Ok(())
}

fn token_client(env: &Env) -> Result<token::Client<'_>, Error> {
    let token = storage::get_token(env).ok_or(Error::NotInitialized)?;
    Ok(token::Client::new(env, &token))
}

#[contractimpl]
impl CrowdfundProtocol {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Fix the funding token used by every project of this contract.
    pub fn __constructor(env: Env, token: Address) {
        storage::set_token(&env, &token);
    }

    // ─────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────

    /// Create a project managed by `manager`.
    ///
    /// - `target_amount` is the amount the campaign must raise.
    /// - `deadline` is a duration in seconds from now; once it elapses with the
    ///   target missed, contributors may claim refunds.
    ///
    /// Returns the new project's ID, which is also its position in
    /// [`CrowdfundProtocol::all_projects`].
    pub fn create_project(
        env: Env,
        manager: Address,
        target_amount: i128,
        deadline: u64,
    ) -> Result<u64, Error> {
        manager.require_auth();

        if target_amount < 0 {
            return Err(Error::InvalidAmount);
        }

        let created_at = env.ledger().timestamp();
        if created_at.checked_add(deadline).is_none() {
            return Err(Error::InvalidDeadline);
        }

        let id = storage::get_and_increment_project_id(&env);
        let config = ProjectConfig {
            id,
            manager: manager.clone(),
            target_amount,
            deadline,
            created_at,
        };
        storage::save_new_project(&env, &config);

        events::emit_project_created(&env, id, manager, target_amount, deadline);
        Ok(id)
    }

    /// Every project ID in creation order.
    pub fn all_projects(env: Env) -> Vec<u64> {
        let mut ids = Vec::new(&env);
        for id in 0..storage::get_project_count(&env) {
            ids.push_back(id);
        }
        ids
    }

    pub fn project_count(env: Env) -> u64 {
        storage::get_project_count(&env)
    }

    pub fn get_project(env: Env, project_id: u64) -> Result<Project, Error> {
        let config = project_config(&env, project_id)?;
        let state = project_state(&env, project_id)?;
        Ok(Project::from_parts(config, state))
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        storage::get_token(&env).ok_or(Error::NotInitialized)
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` of the funding token to a project.
    ///
    /// Open to anyone, at any time; contributions above the target and after
    /// the deadline are accepted.
    pub fn send_funds(
        env: Env,
        project_id: u64,
        contributor: Address,
        amount: i128,
    ) -> Result<(), Error> {
        contributor.require_auth();

        let state = project_state(&env, project_id)?;
        let contributed = storage::get_contribution(&env, project_id, &contributor);
        let (next, total) = ledger::contribute(&state, contributed, amount)?;

        token_client(&env)?.transfer(&contributor, &env.current_contract_address(), &amount);

        storage::save_project_state(&env, project_id, &next);
        storage::set_contribution(&env, project_id, &contributor, total);

        events::emit_funds_sent(&env, project_id, contributor, amount);
        Ok(())
    }

    /// Funds currently held for the project.
    pub fn get_balance(env: Env, project_id: u64) -> Result<i128, Error> {
        Ok(project_state(&env, project_id)?.balance)
    }

    // ─────────────────────────────────────────────────────────
    // Spending (manager only)
    // ─────────────────────────────────────────────────────────

    /// Append a pending spend request. Returns its index.
    ///
    /// `value` is not compared with the balance here; `make_payment` does that.
    pub fn create_request(
        env: Env,
        project_id: u64,
        caller: Address,
        description: String,
        recipient: Address,
        value: i128,
    ) -> Result<u32, Error> {
        caller.require_auth();

        let config = project_config(&env, project_id)?;
        require_manager(&config, &caller)?;

        let state = project_state(&env, project_id)?;
        let (next, index) = ledger::open_request(&state, value)?;

        let request = Request {
            description,
            recipient: recipient.clone(),
            value,
            completed: false,
        };
        storage::save_request(&env, project_id, index, &request);
        storage::save_project_state(&env, project_id, &next);

        events::emit_request_created(&env, project_id, index, recipient, value);
        Ok(index)
    }

    /// Pay out request `request_index` to its recipient.
    ///
    /// Fails if the request was already paid or the project holds less than
    /// its value. The request is marked completed before the transfer.
    pub fn make_payment(
        env: Env,
        project_id: u64,
        caller: Address,
        request_index: u32,
    ) -> Result<(), Error> {
        caller.require_auth();

        let config = project_config(&env, project_id)?;
        require_manager(&config, &caller)?;

        let state = project_state(&env, project_id)?;
        let request = storage::load_request(&env, project_id, request_index)
            .ok_or(Error::RequestNotFound)?;
        let (next, paid) = ledger::pay(&state, &request)?;
        let token = token_client(&env)?;

        storage::save_request(&env, project_id, request_index, &paid);
        storage::save_project_state(&env, project_id, &next);

        token.transfer(&env.current_contract_address(), &paid.recipient, &paid.value);

        events::emit_payment_made(&env, project_id, request_index, paid.recipient, paid.value);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Refunds
    // ─────────────────────────────────────────────────────────

    /// Return `contributor`'s whole outstanding contribution.
    ///
    /// Allowed once the deadline has elapsed, while `raised_amount` is below
    /// the target, and only for a nonzero contribution. The ledger entry is
    /// zeroed and persisted before the tokens leave the contract.
    ///
    /// Returns the refunded amount.
    pub fn refund(env: Env, project_id: u64, contributor: Address) -> Result<i128, Error> {
        contributor.require_auth();

        let config = project_config(&env, project_id)?;
        let state = project_state(&env, project_id)?;
        let contributed = storage::get_contribution(&env, project_id, &contributor);
        let next = ledger::refund(&config, &state, contributed, env.ledger().timestamp())?;
        let token = token_client(&env)?;

        storage::set_contribution(&env, project_id, &contributor, 0);
        storage::save_project_state(&env, project_id, &next);

        token.transfer(&env.current_contract_address(), &contributor, &contributed);

        events::emit_refunded(&env, project_id, contributor, contributed);
        Ok(contributed)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn manager(env: Env, project_id: u64) -> Result<Address, Error> {
        Ok(project_config(&env, project_id)?.manager)
    }

    pub fn target_amount(env: Env, project_id: u64) -> Result<i128, Error> {
        Ok(project_config(&env, project_id)?.target_amount)
    }

    /// Relative deadline in seconds, as passed to `create_project`.
    pub fn deadline(env: Env, project_id: u64) -> Result<u64, Error> {
        Ok(project_config(&env, project_id)?.deadline)
    }

    pub fn raised_amount(env: Env, project_id: u64) -> Result<i128, Error> {
        Ok(project_state(&env, project_id)?.raised_amount)
    }

    pub fn num_requests(env: Env, project_id: u64) -> Result<u32, Error> {
        Ok(project_state(&env, project_id)?.num_requests)
    }

    /// The request at `index`.
    pub fn requests(env: Env, project_id: u64, index: u32) -> Result<Request, Error> {
        project_state(&env, project_id)?;
        storage::load_request(&env, project_id, index).ok_or(Error::RequestNotFound)
    }

    /// Every request of the project, by index.
    pub fn all_requests(env: Env, project_id: u64) -> Result<Vec<Request>, Error> {
        let state = project_state(&env, project_id)?;
        let mut requests = Vec::new(&env);
        for index in 0..state.num_requests {
            let request =
                storage::load_request(&env, project_id, index).ok_or(Error::RequestNotFound)?;
            requests.push_back(request);
        }
        Ok(requests)
    }

    /// Outstanding contribution of `contributor`; `0` if they never
    /// contributed or were refunded.
    pub fn fund_contributors(env: Env, project_id: u64, contributor: Address) -> i128 {
        storage::get_contribution(&env, project_id, &contributor)
    }
}
